//! Calendar epochs to Julian Dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use neo_core::constants::{SECONDS_PER_DAY, UNIX_EPOCH_JD};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EpochError {
    #[error(
        "unrecognised epoch '{0}' (expected a Julian Date, YYYY-MM-DD, 'YYYY-MM-DD HH:MM' or RFC 3339)"
    )]
    Unrecognised(String),
}

/// Julian Date of a UTC instant.
pub fn jd_from_datetime(instant: &DateTime<Utc>) -> f64 {
    let seconds = instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_nanos()) * 1e-9;
    UNIX_EPOCH_JD + seconds / SECONDS_PER_DAY
}

/// UTC instant of a Julian Date, if it is representable.
pub fn datetime_from_jd(jd: f64) -> Option<DateTime<Utc>> {
    if !jd.is_finite() {
        return None;
    }
    let millis = ((jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY * 1_000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

/// `YYYY-MM-DD HH:MM UTC` label for a Julian Date, falling back to the raw JD.
pub fn format_jd(jd: f64) -> String {
    match datetime_from_jd(jd) {
        Some(instant) => instant.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => format!("JD {jd}"),
    }
}

/// Parse a Julian Date or a UTC calendar string.
pub fn parse_epoch(input: &str) -> Result<f64, EpochError> {
    let text = input.trim();
    let unrecognised = || EpochError::Unrecognised(input.to_string());

    let jd_text = text.strip_prefix("JD").map(str::trim).unwrap_or(text);
    if let Ok(jd) = jd_text.parse::<f64>() {
        return if jd.is_finite() { Ok(jd) } else { Err(unrecognised()) };
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(jd_from_datetime(&instant.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(jd_from_datetime(&naive.and_utc()));
        }
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| unrecognised())?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(unrecognised)?;
    Ok(jd_from_datetime(&midnight.and_utc()))
}
