//! Time related utils.

use crate::{Error, Result};
use chrono::{TimeZone, Utc};

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: `20220301`
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format time into ISO8601: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parse RFC3339 time like `2015-08-30T12:36:00Z`.
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| Error::invalid_argument(format!("invalid rfc3339 time: {s}")).with_source(e))?;
    Ok(t.with_timezone(&Utc))
}

/// Convert seconds since unix epoch into datetime.
pub fn from_epoch_secs(secs: u64) -> Result<DateTime> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or_else(|| Error::invalid_argument(format!("epoch seconds out of range: {secs}")))
}
