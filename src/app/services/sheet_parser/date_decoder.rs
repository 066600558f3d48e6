//! Date decoding for spreadsheet cells
//!
//! Date columns are filled in two ways: as real date cells, whose underlying
//! value is a day serial in the 1900 date system, or as text typed by an
//! operator. [`decode_date`] reads the raw cell text and tries the serial
//! interpretation first, then an ordered list of text layouts.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;

use crate::app::models::SampleDate;
use crate::constants::MISSING_VALUE_MARKER;
use crate::{Error, Result};

/// Tolerance when flooring a serial that carries floating point noise
const SERIAL_EPSILON: f64 = 1e-9;

/// Serial of the fictitious 1900-02-29 kept by the 1900 date system
const PHANTOM_LEAP_DAY: u64 = 60;

/// Two-digit years at or above this are 19xx, below it 20xx
const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

/// How the year of a text layout is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YearDigits {
    Four,
    Two,
}

/// Text layouts tried in order: shape guard, chrono format and year width
///
/// chrono accepts a single-digit `%d` and any-length `%Y`, so each layout is
/// guarded by a regex that pins the digit counts. Two-digit years are widened
/// against [`TWO_DIGIT_YEAR_PIVOT`] before the four-digit format is applied.
const TEXT_LAYOUTS: &[(&str, &str, YearDigits)] = &[
    (r"^\d{2}-[A-Za-z]{3}-\d{4}$", "%d-%b-%Y", YearDigits::Four),
    (r"^\d{1,2}-[A-Za-z]{3}-\d{4}$", "%d-%b-%Y", YearDigits::Four),
    (r"^\d{2}/\d{2}/\d{4}$", "%d/%m/%Y", YearDigits::Four),
    (r"^\d{1,2}/\d{2}/\d{4}$", "%d/%m/%Y", YearDigits::Four),
    (r"^\d{2}-[A-Za-z]{3}-\d{2}$", "%d-%b-%Y", YearDigits::Two),
    (r"^\d{1,2}-[A-Za-z]{3}-\d{2}$", "%d-%b-%Y", YearDigits::Two),
];

static TEXT_PATTERNS: LazyLock<Vec<(Regex, &'static str, YearDigits)>> = LazyLock::new(|| {
    TEXT_LAYOUTS
        .iter()
        .filter_map(|(guard, format, digits)| {
            Regex::new(guard).ok().map(|re| (re, *format, *digits))
        })
        .collect()
});

fn day_before_epoch() -> NaiveDate {
    // Serial 1 is 1900-01-01
    NaiveDate::from_ymd_opt(1899, 12, 31).unwrap_or(NaiveDate::MIN)
}

fn epoch_after_leap_bug() -> NaiveDate {
    // Serials from 61 onward count from here, absorbing the phantom leap day
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

/// Decode a raw cell value into a date
///
/// Empty text and `NA` are the absent date, never an error. Text that neither
/// parses as a serial nor matches a known layout is [`Error::UnparseableDate`].
pub fn decode_date(raw: &str) -> Result<SampleDate> {
    let value = raw.trim();
    if value.is_empty() || value == MISSING_VALUE_MARKER {
        return Ok(SampleDate::absent());
    }

    if let Ok(serial) = value.parse::<f64>() {
        if serial.is_finite() {
            return serial_to_date(serial)
                .map(SampleDate::new)
                .ok_or_else(|| Error::unparseable_date(raw));
        }
    }

    parse_text_date(value)
        .map(SampleDate::new)
        .ok_or_else(|| Error::unparseable_date(raw))
}

/// Try each text layout in order; the first full match wins
pub fn parse_text_date(value: &str) -> Option<NaiveDate> {
    TEXT_PATTERNS
        .iter()
        .filter(|(guard, _, _)| guard.is_match(value))
        .find_map(|(_, format, digits)| match digits {
            YearDigits::Four => NaiveDate::parse_from_str(value, format).ok(),
            YearDigits::Two => {
                let widened = widen_two_digit_year(value)?;
                NaiveDate::parse_from_str(&widened, format).ok()
            }
        })
}

/// Rewrite `D-Mon-YY` as `D-Mon-YYYY`
fn widen_two_digit_year(value: &str) -> Option<String> {
    let (day_month, yy) = value.rsplit_once('-')?;
    let yy: i32 = yy.parse().ok()?;
    let year = if yy >= TWO_DIGIT_YEAR_PIVOT {
        1900 + yy
    } else {
        2000 + yy
    };
    Some(format!("{}-{}", day_month, year))
}

/// Convert a 1900-system day serial to a calendar date
///
/// The fractional time of day is dropped. Serial 60, the phantom 1900-02-29,
/// maps to 1900-02-28. Negative serials have no date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let days = (serial + SERIAL_EPSILON).floor();
    if days > u32::MAX as f64 {
        return None;
    }
    let days = days as u64;

    match days {
        PHANTOM_LEAP_DAY => NaiveDate::from_ymd_opt(1900, 2, 28),
        d if d > PHANTOM_LEAP_DAY => epoch_after_leap_bug().checked_add_days(Days::new(d)),
        d => day_before_epoch().checked_add_days(Days::new(d)),
    }
}

/// Convert a calendar date to its 1900-system day serial
pub fn date_to_serial(date: NaiveDate) -> f64 {
    let first_after_leap_bug = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap_or(NaiveDate::MIN);
    let epoch = if date >= first_after_leap_bug {
        epoch_after_leap_bug()
    } else {
        day_before_epoch()
    };
    (date - epoch).num_days() as f64
}
