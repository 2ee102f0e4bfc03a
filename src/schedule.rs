use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Render a timestamp the way it is stored: RFC 3339, UTC, millisecond precision.
/// Fixed width keeps text order equal to chronological order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored or user-supplied timestamp.
///
/// Accepts full RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    let day = parse_day(trimmed)?;
    Ok(start_of_day(day))
}

/// Serde adapter for optional body timestamps; accepts what `parse_timestamp` accepts.
/// Null and blank strings read as absent.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => parse_timestamp(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Parse a calendar day in `YYYY-MM-DD` or `DD/MM/YYYY` form
pub fn parse_day(value: &str) -> Result<NaiveDate, String> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD or DD/MM/YYYY", value))
}

/// 00:00:00.000 of the given day
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// 23:59:59.999 of the given day
pub fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    let last_milli = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&day.and_time(last_milli))
}

/// Day/month/year display form used for exact-date equality ("05/03/2025")
pub fn display_day(ts: &DateTime<Utc>) -> String {
    ts.format("%d/%m/%Y").to_string()
}

/// Normalize a user-supplied day to the display form; unparseable input is kept as-is
pub fn normalize_display_day(value: &str) -> String {
    match parse_day(value) {
        Ok(day) => day.format("%d/%m/%Y").to_string(),
        Err(_) => value.trim().to_string(),
    }
}
