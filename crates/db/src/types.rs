use chrono::{DateTime, NaiveDate, NaiveDateTime};
use strum_macros::{Display, EnumString};

pub const DEFAULT_PRIORITY: i32 = 1;

/// Named priority levels. Stored and transmitted as the bare integer, so a
/// row may carry a level outside this set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, Display, Default)]
#[strum(serialize_all = "title_case", ascii_case_insensitive)]
pub enum Priority {
    #[default]
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    pub fn level(self) -> i32 {
        self as i32
    }

    pub fn from_level(level: i32) -> Option<Self> {
        match level {
            1 => Some(Priority::Low),
            2 => Some(Priority::Medium),
            3 => Some(Priority::High),
            _ => None,
        }
    }

    /// Unknown levels are shown as `Low`.
    pub fn display_level(level: i32) -> Self {
        Self::from_level(level).unwrap_or_default()
    }
}

/// Parses a due date as sent by clients: a plain `YYYY-MM-DD`, an RFC 3339
/// timestamp, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamp. Only the date
/// part is kept. Blank input means "no due date".
pub fn parse_due_date(raw: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(timestamp.date_naive()));
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Some(timestamp.date()));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|ts| Some(ts.date()))
}

/// `deserialize_with` adapter for [`parse_due_date`]; `null` and `""` both map to `None`.
pub mod due_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse_due_date(&raw)
                .map_err(|err| D::Error::custom(format!("invalid dueDate '{raw}': {err}"))),
            None => Ok(None),
        }
    }
}
