//! Input normalization and validation helpers.
//!
//! Calendar dates travel as `YYYY-MM-DD` and times of day as `HH:MM` or
//! `HH:MM:SS`. The parsers here are shared by request validation and by
//! the services that turn validated requests into stored values.

use chrono::{NaiveDate, NaiveTime};
use validator::ValidationError;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical format for times of day.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Normalizes an email for storage and comparison: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Parses a `YYYY-MM-DD` calendar date. Surrounding whitespace is ignored.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Parses a time of day given as `HH:MM` or `HH:MM:SS`.
///
/// `HH:MM` is widened to `HH:MM:00`; any other shape is rejected.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    let widened = match trimmed.len() {
        5 => format!("{}:00", trimmed),
        8 => trimmed.to_string(),
        _ => return None,
    };

    NaiveTime::parse_from_str(&widened, TIME_FORMAT).ok()
}

/// Renders a time of day in canonical `HH:MM:SS` form.
pub fn format_time_of_day(time: &NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Renders a calendar date as `YYYY-MM-DD`.
pub fn format_calendar_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Validates a `YYYY-MM-DD` calendar date field.
pub fn validate_calendar_date(value: &str) -> Result<(), ValidationError> {
    if parse_calendar_date(value).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("calendar_date");
        err.message = Some("Date must be in YYYY-MM-DD format".into());
        Err(err)
    }
}

/// Validates an `HH:MM` or `HH:MM:SS` time-of-day field.
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    if parse_time_of_day(value).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("time_of_day");
        err.message = Some("Time must be in HH:MM or HH:MM:SS format".into());
        Err(err)
    }
}

/// Validates that a string is not blank once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_email("bob@example.com"), "bob@example.com");
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(
            parse_calendar_date("2025-03-01"),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(
            parse_calendar_date(" 2024-02-29 "),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(parse_calendar_date("2023-02-29").is_none());
        assert!(parse_calendar_date("03/01/2025").is_none());
        assert!(parse_calendar_date("").is_none());
    }

    #[test]
    fn test_parse_time_of_day_widens_short_form() {
        assert_eq!(parse_time_of_day("18:30"), NaiveTime::from_hms_opt(18, 30, 0));
        assert_eq!(
            parse_time_of_day("07:05:09"),
            NaiveTime::from_hms_opt(7, 5, 9)
        );
        assert_eq!(parse_time_of_day(" 09:00 "), NaiveTime::from_hms_opt(9, 0, 0));
    }

    #[test]
    fn test_parse_time_of_day_rejects_bad_shapes() {
        assert!(parse_time_of_day("9:00").is_none());
        assert!(parse_time_of_day("25:00").is_none());
        assert!(parse_time_of_day("18:30:00.000").is_none());
        assert!(parse_time_of_day("noon!").is_none());
        assert!(parse_time_of_day("").is_none());
    }

    #[test]
    fn test_format_helpers() {
        let time = NaiveTime::from_hms_opt(18, 30, 0).unwrap();
        assert_eq!(format_time_of_day(&time), "18:30:00");

        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(format_calendar_date(&date), "2025-12-31");
    }

    #[test]
    fn test_validate_calendar_date_error_message() {
        let err = validate_calendar_date("tomorrow").unwrap_err();
        assert_eq!(err.code, "calendar_date");
        assert!(err.message.unwrap().contains("YYYY-MM-DD"));
        assert!(validate_calendar_date("2025-06-15").is_ok());
    }

    #[test]
    fn test_validate_time_of_day_error_message() {
        let err = validate_time_of_day("6pm").unwrap_err();
        assert_eq!(err.code, "time_of_day");
        assert!(validate_time_of_day("18:30").is_ok());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("x").is_ok());
    }
}
