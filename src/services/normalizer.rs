//! Date normalization for spreadsheet cells
//!
//! Converts legacy spreadsheet day serials and calendar strings into
//! `NaiveDateTime`. Total over all cell types: anything unconvertible
//! becomes `None`, never an error.

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Datetime formats tried for string cells, most common in the export first.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"];

/// Date-only formats tried after the datetime formats; midnight is assumed.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Serials beyond this magnitude are treated as plain numbers, not dates.
const MAX_SERIAL_DAYS: f64 = 2_000_000.0;

/// Day zero of the legacy spreadsheet serial scheme.
///
/// The scheme counts 1900 as a leap year, so day zero lands on 1899-12-30
/// and conversion is a plain day offset with no correction around the
/// phantom 1900-02-29. This matches the source export tool bit for bit:
/// serial 0 is 1899-12-30, serial 1 is 1899-12-31.
fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()
}

/// Convert a numeric day serial into a datetime. The fractional part is the
/// fraction of a day, rounded to whole seconds.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL_DAYS {
        return None;
    }

    let mut days = serial.floor() as i64;
    let mut secs = ((serial - serial.floor()) * 86_400.0).round() as i64;
    if secs >= 86_400 {
        days += 1;
        secs = 0;
    }

    let date = serial_epoch().checked_add_signed(Duration::days(days))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, 0)?;
    Some(NaiveDateTime::new(date, time))
}

/// Parse a calendar string through the known format lists.
pub fn parse_date_string(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Normalize one date-like cell.
///
/// Numeric cells are interpreted as day serials, string cells go through the
/// calendar formats, spreadsheet datetime cells convert via their serial.
/// Everything else (blanks, booleans, cell errors) is `None`.
pub fn normalize_date_cell(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::Int(i) => from_excel_serial(*i as f64),
        Data::Float(f) => from_excel_serial(*f),
        Data::DateTime(dt) => from_excel_serial(dt.as_f64()),
        Data::DateTimeIso(s) | Data::String(s) => parse_date_string(s),
        _ => None,
    }
}
