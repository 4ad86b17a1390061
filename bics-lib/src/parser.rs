use std::collections::BTreeSet;

use chrono::{Days, NaiveDate, NaiveTime};
use regex::Regex;
use thiserror::Error;

use crate::model::RawClassEntry;

const WEEK_TOKEN_FORMAT: &str = r"(\d+)-(\d+)周|(\d+)周";
const CLOCK_FORMAT: &str = "%H:%M";

/// One concrete class meeting on a specific calendar date.
///
/// Constructed once per (entry, week) pair by [`expand_entries`] and never
/// mutated afterwards; the serializer is its only consumer.
#[derive(Debug, Clone)]
pub struct ClassOccurrence {
    pub course_id: String,
    pub course_name: String,
    pub teacher: String,
    pub credit: String,
    /// Display form of the class hours, e.g. `08:00~09:40`.
    pub course_time: String,
    /// Lesson label, e.g. `1-2` for the first two periods of the day.
    pub lessons: String,
    pub location: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Extract the set of semester weeks from free-form detail text like
/// `张三/1周,3-4周`.
///
/// Tokens are `N周` (one week) or `N-M周` (inclusive range); duplicates
/// collapse and the result is ascending. Anything that doesn't match the
/// token shape is skipped without error, so text with no recognizable
/// token yields an empty set and the class silently drops out of the
/// output. That mirrors the upstream data contract, lax as it is.
pub fn parse_weeks(text: &str) -> Result<Vec<u32>, ParseError> {
    let re = Regex::new(WEEK_TOKEN_FORMAT).unwrap();
    let mut weeks = BTreeSet::new();
    for caps in re.captures_iter(text) {
        match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(start), Some(end), _) => {
                let start: u32 = start.as_str().parse()?;
                let end: u32 = end.as_str().parse()?;
                weeks.extend(start..=end);
            }
            (_, _, Some(week)) => {
                weeks.insert(week.as_str().parse()?);
            }
            _ => {}
        }
    }
    // Week numbering is 1-based; a stray `0周` token is dropped with the
    // rest of the unparsable text.
    weeks.remove(&0);
    Ok(weeks.into_iter().collect())
}

/// Expand every raw entry into concrete per-date occurrences.
///
/// Occurrences come out in entry-iteration order, ascending by week within
/// an entry. Nothing is deduplicated across entries: if the upstream data
/// schedules two classes on the same date and time, both are emitted.
pub fn expand_entries(
    entries: &[RawClassEntry],
    first_monday: NaiveDate,
) -> Result<Vec<ClassOccurrence>, ParseError> {
    let mut occurrences = Vec::new();
    for entry in entries {
        expand_entry(entry, first_monday, &mut occurrences)?;
    }
    Ok(occurrences)
}

fn expand_entry(
    entry: &RawClassEntry,
    first_monday: NaiveDate,
    occurrences: &mut Vec<ClassOccurrence>,
) -> Result<(), ParseError> {
    let detail = entry
        .title_detail
        .len()
        .checked_sub(2)
        .and_then(|index| entry.title_detail.get(index))
        .ok_or(ParseError::MissingDetail)?;
    if detail.is_empty() {
        return Err(ParseError::EmptyDetail);
    }
    let teacher = match detail.split_once('/') {
        Some((teacher, _)) => teacher,
        None => detail.as_str(),
    };

    let lessons = lesson_label(entry)?;
    let start = parse_clock(&entry.begin_time)?;
    let end = parse_clock(&entry.end_time)?;
    let day_offset = entry
        .day_of_week
        .checked_sub(1)
        .ok_or(ParseError::InvalidDayOfWeek(entry.day_of_week))?;

    for week in parse_weeks(detail)? {
        let date = first_monday
            .checked_add_days(Days::new(
                u64::from(day_offset) + 7 * u64::from(week - 1),
            ))
            .ok_or(ParseError::DateOutOfRange)?;
        occurrences.push(ClassOccurrence {
            course_id: entry.course_code.clone(),
            course_name: entry.course_name.clone(),
            teacher: teacher.to_owned(),
            credit: entry.credit_text(),
            course_time: format!("{}~{}", entry.begin_time, entry.end_time),
            lessons: lessons.clone(),
            location: entry.place_name.clone(),
            date,
            start,
            end,
        });
    }
    Ok(())
}

// `cellDetail[3]` reads like `1-2节`; the label is everything before the
// trailing 节.
fn lesson_label(entry: &RawClassEntry) -> Result<String, ParseError> {
    let text = &entry
        .cell_detail
        .get(3)
        .ok_or(ParseError::MissingLessonCell)?
        .text;
    let mut chars = text.chars();
    chars.next_back();
    Ok(chars.as_str().to_owned())
}

fn parse_clock(text: &str) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(text, CLOCK_FORMAT)
        .map_err(|_| ParseError::InvalidClockTime(text.to_owned()))
}

/// Represents errors over the shape of upstream schedule records.
///
/// All of these are fatal for the whole run: skipping a bad entry would
/// silently misrepresent the schedule.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("class entry has no teacher/weeks detail text")]
    MissingDetail,
    #[error("teacher/weeks detail text is empty")]
    EmptyDetail,
    #[error("class entry has no lesson-label cell")]
    MissingLessonCell,
    #[error("week number does not fit an integer")]
    InvalidWeekNumber(#[from] std::num::ParseIntError),
    #[error("day-of-week index `{0}` is not 1-based")]
    InvalidDayOfWeek(u32),
    #[error("clock time `{0}` is not in HH:MM form")]
    InvalidClockTime(String),
    #[error("computed class date is out of range")]
    DateOutOfRange,
}
