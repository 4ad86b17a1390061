use std::fs;

use bics_lib::RawClassEntry;
use chrono::NaiveDate;
use clap::Parser;

use crate::options::{Command, Options, OutputOptions};

mod options;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    let args = Options::parse();

    match args.command {
        Command::Fetch {
            username,
            term,
            first_monday,
            output,
        } => {
            let password = rpassword::prompt_password("Password: ")?;
            let entries = bics_lib::fetch_schedule(&username, &password, &term).await?;
            write_calendar(&entries, first_monday, &output)?;
        }
        Command::Convert {
            file,
            first_monday,
            output,
        } => {
            let entries: Vec<RawClassEntry> = serde_json::from_str(&fs::read_to_string(&file)?)?;
            write_calendar(&entries, first_monday, &output)?;
        }
    }

    Ok(())
}

// Both subcommands funnel through here; the transformation core never
// cares where the entries came from.
fn write_calendar(
    entries: &[RawClassEntry],
    first_monday: NaiveDate,
    output: &OutputOptions,
) -> Result<(), Error> {
    let occurrences = bics_lib::expand_entries(entries, first_monday)?;
    let payload = bics_lib::render_calendar(&output.title, &occurrences);
    fs::write(&output.output, payload)?;
    println!("calendar written to {}", output.output.display());
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    ScheduleFailed(#[from] bics_lib::ScheduleError),
    #[error(transparent)]
    ParseFailed(#[from] bics_lib::ParseError),
    #[error(transparent)]
    JsonDeserializeFailed(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
