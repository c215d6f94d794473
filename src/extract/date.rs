//! Publication date normalization
//!
//! Sites publish dates in many shapes. Everything is normalized to a
//! timestamp with an explicit offset; values without one are taken as UTC.

use crate::{ExtractionError, ExtractionResult};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// Zoned formats not covered by RFC 3339 / RFC 2822
const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S %z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%Y/%m/%d"];

/// Parses a publication date found at `url`
///
/// # Example
///
/// ```
/// use post_tally::extract::normalize_date;
///
/// let date = normalize_date("2017-03-04 10:00", "https://example.com/post").unwrap();
/// assert_eq!(date.to_rfc3339(), "2017-03-04T10:00:00+00:00");
/// ```
pub fn normalize_date(value: &str, url: &str) -> ExtractionResult<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date);
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Ok(date);
    }
    for format in ZONED_FORMATS {
        if let Ok(date) = DateTime::parse_from_str(value, format) {
            return Ok(date);
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Some(midnight) = NaiveDate::parse_from_str(value, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(midnight.and_utc().fixed_offset());
        }
    }

    Err(ExtractionError::InvalidDate {
        url: url.to_string(),
        value: value.to_string(),
    })
}
