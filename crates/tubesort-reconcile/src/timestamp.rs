//! Sort keys parsed from item titles.
//!
//! A title carries a timestamp when it contains six whitespace-separated
//! numbers `YYYY M D H M S` (non-year fields one or two digits). The first
//! such run in the title is used.

use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "timestamp_tests.rs"]
mod tests;

static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII digits only; `\d` would also match other scripts' digits.
    Regex::new(r"([0-9]{4})\s+([0-9]{1,2})\s+([0-9]{1,2})\s+([0-9]{1,2})\s+([0-9]{1,2})\s+([0-9]{1,2})")
        .expect("valid timestamp pattern")
});

/// Timestamp embedded in an item title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Parse the first `YYYY M D H M S` run in `label`.
    ///
    /// Returns `None` when the label has no such run or when the numbers do
    /// not form a real calendar date and time.
    pub fn parse(label: &str) -> Option<Self> {
        let caps = TIMESTAMP_PATTERN.captures(label)?;
        let field = |i: usize| caps[i].parse::<u32>().ok();

        let year = caps[1].parse::<i32>().ok()?;
        let date = NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?;
        let datetime = date.and_hms_opt(field(4)?, field(5)?, field(6)?)?;
        Some(Self(datetime))
    }

    /// Build a timestamp from its parts.
    pub fn from_parts(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, minute, second)
            .map(Self)
    }

    /// The underlying date and time.
    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}
