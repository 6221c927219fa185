//! Calendar-date parsing shared by the aggregator, the query pipeline and the
//! timeline views. Every record date goes through [`parse_date`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{ChronicleError, Result};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a record date. Timestamps keep the date as written; no timezone
/// conversion is applied.
pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate> {
    let value = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }

    // Year and month only, e.g. "2019-06".
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.naive_local().date());
    }

    for format in DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(timestamp.date());
        }
    }

    Err(ChronicleError::MalformedRecord {
        field,
        value: raw.to_string(),
    })
}

/// Like [`parse_date`], but a blank value means "not set".
pub fn parse_optional_date(field: &'static str, raw: &str) -> Result<Option<NaiveDate>> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(field, raw).map(Some)
    }
}
