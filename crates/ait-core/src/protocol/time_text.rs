//! `mm:ss.t` remaining-time text.
//!
//! Minutes and seconds are always two digits, tenths one digit. Minutes are
//! not wrapped at the hour; a 90 minute workout renders as `90:00.0`.

use crate::error::TimeTextError;

const MILLIS_PER_TENTH: u64 = 100;

/// Render milliseconds as `mm:ss.t`, truncating below the tenth.
pub fn format_millis(millis: u64) -> String {
    format_tenths(millis / MILLIS_PER_TENTH)
}

/// Render tenths of a second as `mm:ss.t`.
pub fn format_tenths(tenths: u64) -> String {
    let minutes = tenths / 600;
    let seconds = (tenths / 10) % 60;
    let tenth = tenths % 10;
    format!("{minutes:02}:{seconds:02}.{tenth}")
}

/// Render whole seconds as `mm:ss.t`.
pub fn format_seconds(seconds: u64) -> String {
    format_tenths(seconds.saturating_mul(10))
}

/// Parse `mm:ss.t` back into tenths of a second.
pub fn parse_tenths(text: &str) -> Result<u64, TimeTextError> {
    let malformed = || TimeTextError {
        text: text.to_string(),
    };

    let (minutes, rest) = text.split_once(':').ok_or_else(malformed)?;
    let (seconds, tenth) = rest.split_once('.').ok_or_else(malformed)?;
    if minutes.len() < 2 || seconds.len() != 2 || tenth.len() != 1 {
        return Err(malformed());
    }
    if ![minutes, seconds, tenth]
        .iter()
        .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(malformed());
    }

    let minutes: u64 = minutes.parse().map_err(|_| malformed())?;
    let seconds: u64 = seconds.parse().map_err(|_| malformed())?;
    let tenth: u64 = tenth.parse().map_err(|_| malformed())?;
    if seconds >= 60 {
        return Err(malformed());
    }
    Ok(minutes * 600 + seconds * 10 + tenth)
}

/// Parse `mm:ss.t` into seconds.
pub fn parse_seconds(text: &str) -> Result<f64, TimeTextError> {
    parse_tenths(text).map(|tenths| tenths as f64 / 10.0)
}
