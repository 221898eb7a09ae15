use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A billing period granular to the month, written on the wire as `MM-YYYY`.
///
/// Stored as the first day of the month so that SQL `DATE` comparisons and
/// the derived `Ord` agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthYear(NaiveDate);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonthYearError {
    #[error("expected MM-YYYY, got {0:?}")]
    Format(String),

    #[error("month out of range in {0:?}")]
    Month(String),
}

impl MonthYear {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// First day of the month, as persisted.
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Truncates any date to its month.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }
}

impl FromStr for MonthYear {
    type Err = MonthYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[2] == b'-'
            && bytes[..2].iter().all(u8::is_ascii_digit)
            && bytes[3..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(MonthYearError::Format(s.to_string()));
        }

        // Both slices are ASCII digits at this point.
        let month: u32 = s[..2]
            .parse()
            .map_err(|_| MonthYearError::Format(s.to_string()))?;
        let year: i32 = s[3..]
            .parse()
            .map_err(|_| MonthYearError::Format(s.to_string()))?;

        MonthYear::new(year, month).ok_or_else(|| MonthYearError::Month(s.to_string()))
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}

impl Serialize for MonthYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
