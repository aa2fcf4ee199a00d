//! Time utilities: local wall-clock parsing and timezone conversion.
//!
//! The engines work on naive local times; conversion to UTC only happens at
//! the edges (calendar export, "now" lookup).

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse().map_err(|_| anyhow!("invalid timezone: {tz}"))
}

/// Parse an ISO-8601-ish local timestamp. An explicit offset (`Z`,
/// `+02:00`) is accepted and dropped; a bare date means midnight.
pub fn parse_local_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in LOCAL_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ndt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid datetime '{s}' (expected YYYY-MM-DDTHH:MM[:SS])"))?;
    Ok(date.and_time(chrono::NaiveTime::MIN))
}

/// Interpret `local` as wall-clock time in `tz`, returning UTC.
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    let local_dt = tz
        .from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| anyhow!("nonexistent local time (DST gap?): {local} {tz}"))?;
    Ok(local_dt.with_timezone(&Utc))
}

/// Current wall-clock time in `tz`.
pub fn now_in(tz: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}
