//! `HH:MM` serde helpers for wall-clock times

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

pub const FORMAT: &str = "%H:%M";

/// Parse `HH:MM` (seconds are accepted and dropped)
pub fn parse(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

pub fn format(t: &NaiveTime) -> String {
    t.format(FORMAT).to_string()
}

/// `Option<NaiveTime>` <-> `"HH:MM"` / `null`
///
/// Empty strings deserialize to `None`.
pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => serializer.serialize_str(&super::format(t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time `{s}`, expected HH:MM"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        let t = parse("09:05").unwrap();
        assert_eq!(format(&t), "09:05");
        // seconds are truncated
        assert_eq!(format(&parse("17:30:59").unwrap()), "17:30");
        assert!(parse("25:00").is_none());
        assert!(parse("nine").is_none());
    }
}
