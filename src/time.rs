//! Minute-of-day helpers shared by the time filter and the slider label.

use anyhow::{Result, bail};
use chrono::{NaiveTime, Timelike};

/// Number of minutes in a day; valid minute-of-day values are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Returns `hour * 60 + minute` for a wall-clock timestamp. Date and seconds are ignored.
pub fn minutes_since_midnight<T: Timelike>(timestamp: &T) -> u32 {
    timestamp.hour() * 60 + timestamp.minute()
}

/// Formats a minute-of-day as a short 12-hour clock string, e.g. `"2:30 PM"`.
pub fn format_time(minutes: u32) -> String {
    let minutes = minutes.min(MINUTES_PER_DAY - 1);
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        .unwrap_or(NaiveTime::MIN)
        .format("%-I:%M %p")
        .to_string()
}

/// Parses a time-of-day given either as `HH:MM` or as a bare minute count.
pub fn parse_time_of_day(input: &str) -> Result<u32> {
    let input = input.trim();

    if let Ok(minutes) = input.parse::<u32>() {
        if minutes >= MINUTES_PER_DAY {
            bail!("minute of day must be below {MINUTES_PER_DAY}, got {minutes}");
        }
        return Ok(minutes);
    }

    match NaiveTime::parse_from_str(input, "%H:%M") {
        Ok(time) => Ok(minutes_since_midnight(&time)),
        Err(e) => bail!("invalid time of day '{input}': {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_minutes_since_midnight_ignores_date_and_seconds() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_milli_opt(8, 10, 59, 999)
            .unwrap();
        assert_eq!(minutes_since_midnight(&ts), 490);
    }

    #[test]
    fn test_minutes_since_midnight_bounds() {
        assert_eq!(minutes_since_midnight(&NaiveTime::MIN), 0);
        let last = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        assert_eq!(minutes_since_midnight(&last), 1439);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "12:00 AM");
        assert_eq!(format_time(490), "8:10 AM");
        assert_eq!(format_time(720), "12:00 PM");
        assert_eq!(format_time(870), "2:30 PM");
        assert_eq!(format_time(1439), "11:59 PM");
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("08:00").unwrap(), 480);
        assert_eq!(parse_time_of_day("20:00").unwrap(), 1200);
        assert_eq!(parse_time_of_day(" 1200 ").unwrap(), 1200);
        assert!(parse_time_of_day("1440").is_err());
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("noon").is_err());
    }
}
