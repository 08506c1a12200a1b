use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use chrono_tz::Tz;
use std::fmt;

/// Time zone value object accepted by date aggregations and range queries.
///
/// Built from a named zone or an explicit offset. Offset text such as
/// `"+00:00"` is not a zone and is rejected by [`TimeZone::from_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeZone {
    name: String,
    offset: FixedOffset,
}

impl TimeZone {
    pub fn utc() -> Self {
        Self {
            name: "UTC".to_string(),
            offset: Utc.fix(),
        }
    }

    pub fn from_offset(offset: FixedOffset) -> Self {
        let mut zone = Self {
            name: String::new(),
            offset,
        };
        zone.name = zone.to_offset_string();
        zone
    }

    /// Resolve an IANA zone name (`Europe/Oslo`, `UTC`, `Etc/GMT+3`, ..)
    /// using the offset in effect right now.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::from_name_at(name, Utc::now())
    }

    /// Resolve an IANA zone name using the offset in effect at `at`, so
    /// zones with daylight saving time resolve to the right side of the
    /// transition.
    pub fn from_name_at(name: &str, at: DateTime<Utc>) -> Result<Self> {
        let trimmed = name.trim();
        if trimmed.starts_with(['+', '-']) || trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(Error::Validation(format!(
                "'{}' is an offset, not a time zone",
                name
            )));
        }

        let tz: Tz = trimmed
            .parse()
            .map_err(|_| Error::Validation(format!("unknown time zone '{}'", name)))?;
        Ok(Self {
            name: trimmed.to_string(),
            offset: at.with_timezone(&tz).offset().fix(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Canonical `+HH:MM` representation sent to the engine.
    pub fn to_offset_string(&self) -> String {
        let seconds = self.offset.local_minus_utc();
        let sign = if seconds < 0 { '-' } else { '+' };
        let seconds = seconds.abs();
        format!("{}{:02}:{:02}", sign, seconds / 3600, (seconds % 3600) / 60)
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
