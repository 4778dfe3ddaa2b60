use chrono::{Local, TimeZone};

use crate::error::{Result, ScError};

pub const DISPLAY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const NEVER: &str = "Never";

/// Converts an epoch (seconds, possibly fractional) to local time in
/// `DISPLAY_FORMAT`.
pub fn format_epoch(epoch: &str) -> Result<String> {
    let invalid = || ScError::InvalidField {
        field: "epoch",
        value: epoch.to_string(),
    };
    let secs: f64 = epoch.trim().parse().map_err(|_| invalid())?;
    if !secs.is_finite() {
        return Err(invalid());
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1_000_000_000.0) as u32;
    let dt = Local
        .timestamp_opt(whole as i64, nanos.min(999_999_999))
        .single()
        .ok_or_else(invalid)?;
    Ok(dt.format(DISPLAY_FORMAT).to_string())
}

/// `-1` marks a rule that never expires.
pub fn format_expiry(expires: &str) -> Result<String> {
    if expires.trim() == "-1" {
        Ok(NEVER.to_string())
    } else {
        format_epoch(expires)
    }
}
