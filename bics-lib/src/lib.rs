mod ics;
mod ids;
mod model;
mod parser;
mod session;

pub use ics::render_calendar;
pub use ids::{ParseIdError, Season, Term};
pub use model::{CellDetail, RawClassEntry};
pub use parser::{expand_entries, parse_weeks, ClassOccurrence, ParseError};
pub use session::{Session, SessionError};

use hyper::Client;
use hyper_rustls::HttpsConnectorBuilder;

/// Log in to the campus portal and fetch the arranged-class list for `term`.
///
/// This is the one-shot convenience wrapper around [`Session`]: it builds an
/// HTTPS client, runs the SSO login, and pulls the term schedule. An empty
/// result is an error, since it almost always means the term code is wrong
/// rather than a genuinely empty timetable.
pub async fn fetch_schedule(
    username: &str,
    password: &str,
    term: &Term,
) -> Result<Vec<RawClassEntry>, ScheduleError> {
    let client = Client::builder().build(
        HttpsConnectorBuilder::new()
            .with_native_roots()
            .https_only()
            .enable_http1()
            .build(),
    );
    let mut session = Session::new(client);
    session.login(username, password).await?;
    let entries = session.schedule(term).await?;
    if entries.is_empty() {
        return Err(ScheduleError::EmptySchedule(term.code()));
    }
    Ok(entries)
}

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error(transparent)]
    SessionFailed(#[from] SessionError),
    #[error("server returned no scheduled classes for term `{0}`")]
    EmptySchedule(String),
}
