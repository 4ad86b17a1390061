use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// An academic term, identified by the year the academic year starts in and a
/// season. The schedule endpoint addresses terms by codes like `2024-2025-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    start_year: u32,
    season: Season,
}

impl Term {
    pub fn new(start_year: u32, season: Season) -> Self {
        Self { start_year, season }
    }

    /// The term code the schedule endpoint expects, e.g. `2024-2025-1`.
    pub fn code(&self) -> String {
        format!(
            "{}-{}-{}",
            self.start_year,
            self.start_year + 1,
            self.season.id()
        )
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Term {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseIdError::MalformedTerm(s.to_owned());
        let mut parts = s.split('-');
        let start_year = parts
            .next()
            .and_then(|year| year.parse::<u32>().ok())
            .ok_or_else(malformed)?;
        let end_year = parts
            .next()
            .and_then(|year| year.parse::<u32>().ok())
            .ok_or_else(malformed)?;
        let season = parts.next().ok_or_else(malformed)?.parse()?;
        if parts.next().is_some() {
            return Err(malformed());
        }
        if end_year != start_year + 1 {
            return Err(ParseIdError::NonConsecutiveYears(start_year, end_year));
        }
        Ok(Term::new(start_year, season))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Autumn,
    Spring,
    Summer,
}

impl Season {
    pub fn id(self) -> u32 {
        match self {
            Season::Autumn => 1,
            Season::Spring => 2,
            Season::Summer => 3,
        }
    }
}

impl FromStr for Season {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Season::Autumn),
            "2" => Ok(Season::Spring),
            "3" => Ok(Season::Summer),
            _ => Err(ParseIdError::UnknownSeason(s.to_owned())),
        }
    }
}

/// Represents errors that can occur parsing a term code.
#[derive(Debug, Error)]
pub enum ParseIdError {
    #[error("term code `{0}` is not in `YYYY-YYYY-N` form")]
    MalformedTerm(String),
    #[error("term years {0}-{1} are not consecutive")]
    NonConsecutiveYears(u32, u32),
    #[error("unknown season code `{0}`, expected 1 (autumn), 2 (spring) or 3 (summer)")]
    UnknownSeason(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_code_round_trips() {
        let term: Term = "2024-2025-1".parse().unwrap();
        assert_eq!(term, Term::new(2024, Season::Autumn));
        assert_eq!(term.code(), "2024-2025-1");
    }

    #[test]
    fn spring_and_summer_codes() {
        assert_eq!("2023-2024-2".parse::<Term>().unwrap().code(), "2023-2024-2");
        assert_eq!("2023-2024-3".parse::<Term>().unwrap().code(), "2023-2024-3");
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(matches!(
            "2024".parse::<Term>(),
            Err(ParseIdError::MalformedTerm(_))
        ));
        assert!(matches!(
            "2024-2025-1-1".parse::<Term>(),
            Err(ParseIdError::MalformedTerm(_))
        ));
        assert!(matches!(
            "2024-2026-1".parse::<Term>(),
            Err(ParseIdError::NonConsecutiveYears(2024, 2026))
        ));
        assert!(matches!(
            "2024-2025-4".parse::<Term>(),
            Err(ParseIdError::UnknownSeason(_))
        ));
    }
}
