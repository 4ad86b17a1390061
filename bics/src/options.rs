use std::path::PathBuf;

use bics_lib::Term;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Options {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in to the campus portal and export one term's schedule
    ///
    /// The SSO password is prompted for on the terminal, never taken as an
    /// argument.
    Fetch {
        /// SSO username (student ID)
        username: String,
        /// Term code to query (e.g. 2024-2025-1; autumn: 1, spring: 2, summer: 3)
        term: Term,
        /// Date of the first Monday of the semester (e.g. 2024-09-02)
        first_monday: NaiveDate,
        #[command(flatten)]
        output: OutputOptions,
    },
    /// Convert a previously saved arranged-class JSON file
    Convert {
        /// Path to a file holding the arranged-class JSON array
        file: PathBuf,
        /// Date of the first Monday of the semester (e.g. 2024-09-02)
        first_monday: NaiveDate,
        #[command(flatten)]
        output: OutputOptions,
    },
}

#[derive(Debug, Args)]
pub struct OutputOptions {
    /// File to write the calendar to
    #[arg(long, default_value = "calendar.ics")]
    pub output: PathBuf,
    /// Calendar display name
    #[arg(long, default_value = "calendar")]
    pub title: String,
}
