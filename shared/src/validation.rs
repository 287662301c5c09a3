//! Validation and parsing helpers for the Turkey Climate Map API
//!
//! Request parsing rules shared by the backend handlers and the weather
//! engine: plate-code normalization, date-range handling, and the
//! fractional-hour arithmetic used by nearest-hour resolution.

use chrono::NaiveDate;

/// Normalize a province plate code: trim whitespace and left-pad a
/// single-digit code to the canonical two-character form.
pub fn normalize_plate_code(code: &str) -> String {
    let trimmed = code.trim();
    if trimmed.len() == 1 {
        format!("0{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| "Tarih formati YYYY-MM-DD olmali")
}

/// Clamp an end date that lies before the start date up to the start date.
pub fn clamp_date_range(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    if end < start {
        (start, start)
    } else {
        (start, end)
    }
}

/// Interpret a query flag the way the original API did: `true`, `1` and
/// `yes` select hourly data, anything else selects daily.
pub fn parse_bool_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Parse an `HH:MM` string into a fractional hour of day in `[0, 24)`.
pub fn parse_time_fraction(value: &str) -> Result<f64, &'static str> {
    let parts: Vec<&str> = value.split(':').collect();
    let [hour_str, minute_str] = parts.as_slice() else {
        return Err("Saat formati HH:MM olmali");
    };

    let hour: i32 = hour_str.parse().map_err(|_| "Saat formati HH:MM olmali")?;
    let minute: i32 = minute_str
        .parse()
        .map_err(|_| "Saat formati HH:MM olmali")?;

    if !(0..=23).contains(&hour) || !(0..=59).contains(&minute) {
        return Err("Saat degeri gecersiz");
    }

    Ok(f64::from(hour) + f64::from(minute) / 60.0)
}

/// Extract the fractional hour of day from a provider timestamp such as
/// `2025-01-15T12:30`. Returns `None` for anything unparseable so the
/// caller can skip the sample.
pub fn extract_hour_fraction(timestamp: &str) -> Option<f64> {
    let (_, time_part) = timestamp.split_once('T')?;
    let (hour_str, rest) = time_part.split_once(':')?;

    let hour: i32 = hour_str.parse().ok()?;
    let minute: i32 = rest.get(..2)?.parse().ok()?;

    Some(f64::from(hour) + f64::from(minute) / 60.0)
}
