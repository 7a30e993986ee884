//! Token conversion for grammar matches
//!
//! Values and attributes that cannot be represented are reported as `None`
//! and the caller skips the match. Timestamps never fail: a token the
//! calendar rejects is kept verbatim.

use crate::models::MeasurementTimestamp;
use chrono::NaiveDate;

/// Parse a value token (`57.962`, `+7.`, `6.001E+00`)
pub fn parse_value(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse an attribute token
pub fn parse_attribute(token: &str) -> Option<u32> {
    token.parse::<u32>().ok()
}

/// Normalize a `D.M.YYYY/h:m:s` token
pub fn parse_timestamp(token: &str) -> MeasurementTimestamp {
    match to_datetime(token) {
        Some(dt) => MeasurementTimestamp::Normalized(dt),
        None => MeasurementTimestamp::Unnormalized {
            raw: token.to_string(),
        },
    }
}

fn to_datetime(token: &str) -> Option<chrono::NaiveDateTime> {
    let (date, time) = token.split_once('/')?;
    let [day, month, year] = split_components(date, '.')?;
    let [hour, minute, second] = split_components(time, ':')?;

    NaiveDate::from_ymd_opt(year as i32, month, day)?.and_hms_opt(hour, minute, second)
}

fn split_components(part: &str, separator: char) -> Option<[u32; 3]> {
    let mut components = part.split(separator).map(|c| c.parse::<u32>().ok());
    let parsed = [components.next()??, components.next()??, components.next()??];
    components.next().is_none().then_some(parsed)
}
