//! OLE automation date serials.
//!
//! A `VT_DATE` is an f64 day count from 1899-12-30, with the time of day in the
//! fractional part. The epoch sits one day before the spreadsheet's own 1900-01-00 so
//! that serials from 61 (1900-03-01) onward agree with the spreadsheet despite its
//! fictitious 1900-02-29 at serial 60. Below 61 the two disagree by a day: serial 60
//! converts to 1900-02-28 here, and serial 1 to 1899-12-31.
//!
//! For negative serials the fraction still counts forward from midnight, so -1.25 is
//! 1899-12-29 06:00.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Format used when a timestamp is rendered as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serial of 0100-01-01, the earliest date automation accepts.
pub const MIN_SERIAL: f64 = -657_434.0;

/// Serial just before 10000-01-01.
pub const MAX_SERIAL: f64 = 2_958_466.0;

const MS_PER_DAY: i64 = 86_400_000;

fn epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Convert an OLE date serial to a wall-clock timestamp, rounded to the millisecond.
///
/// Returns `None` for non-finite serials or serials outside years 100..=9999.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < MIN_SERIAL || serial >= MAX_SERIAL {
        return None;
    }

    let whole = serial.trunc();
    let mut days = whole as i64;
    let mut ms = ((serial - whole).abs() * MS_PER_DAY as f64).round() as i64;
    if ms >= MS_PER_DAY {
        // Rounded up to the next midnight. The fraction counts forward for
        // negative serials too, so this is always the following day.
        ms -= MS_PER_DAY;
        days += 1;
    }

    epoch()?
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::milliseconds(ms))
}

/// Convert a timestamp to an OLE date serial.
pub fn datetime_to_serial(t: NaiveDateTime) -> f64 {
    let Some(epoch) = epoch() else {
        return 0.0;
    };
    let days = (t.date() - epoch.date()).num_days();
    let time = t.time();
    let ms = i64::from(time.num_seconds_from_midnight()) * 1000
        + i64::from(time.nanosecond() / 1_000_000);
    let fraction = ms as f64 / MS_PER_DAY as f64;

    if days < 0 {
        days as f64 - fraction
    } else {
        days as f64 + fraction
    }
}

/// Render a timestamp the way [`crate::stringify`] does.
pub fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}
