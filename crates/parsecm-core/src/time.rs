//! Conversion between calendar dates and CXC seconds.
//!
//! Command products stamp events with dates like `2009:033:12:00:00.000`
//! (UTC, year and day of year). Records also carry the same instant as CXC
//! seconds: seconds of Terrestrial Time elapsed since 1998-01-01T00:00:00 TT.

use crate::error::{ParseCmError, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};

/// Maps a calendar date string to numeric seconds and back.
pub trait TimeConverter {
    fn date_to_secs(&self, date: &str) -> Result<f64>;
    fn secs_to_date(&self, secs: f64) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Leap seconds
// ---------------------------------------------------------------------------

/// TT - TAI
const TT_MINUS_TAI: f64 = 32.184;

/// TAI - UTC in effect before the first entry of `LEAP_SECONDS`.
const BASE_TAI_MINUS_UTC: f64 = 31.0;

/// UTC dates (year, month, day) at 00:00 of which TAI - UTC grew by one second.
const LEAP_SECONDS: &[(i32, u32, u32)] = &[
    (1999, 1, 1),
    (2006, 1, 1),
    (2009, 1, 1),
    (2012, 7, 1),
    (2015, 7, 1),
    (2017, 1, 1),
];

fn leap_instants() -> impl Iterator<Item = DateTime<Utc>> {
    LEAP_SECONDS.iter().filter_map(|&(y, m, d)| {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single()
    })
}

fn tai_minus_utc(utc: DateTime<Utc>) -> f64 {
    BASE_TAI_MINUS_UTC + leap_instants().filter(|t| utc >= *t).count() as f64
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(883_612_800) // 1998-01-01T00:00:00Z
}

/// UTC instant `elapsed` seconds after the epoch, to the millisecond.
fn utc_at(elapsed: f64) -> Option<DateTime<Utc>> {
    let millis = (elapsed * 1000.0).round();
    if !(i64::MIN as f64..i64::MAX as f64).contains(&millis) {
        return None;
    }
    let delta = TimeDelta::try_milliseconds(millis as i64)?;
    epoch().checked_add_signed(delta)
}

// ---------------------------------------------------------------------------
// ChandraTime
// ---------------------------------------------------------------------------

/// CXC seconds converter for `YYYY:DDD:hh:mm:ss.sss` dates.
///
/// Limits of the built-in leap-second handling:
/// - a `:60` second is read as the first second of the next minute;
/// - seconds values that fall inside an inserted leap second have no UTC
///   label and are written as one of the neighbouring seconds;
/// - dates before 1998 all use the 1998 TAI - UTC offset of 31 s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChandraTime;

const DATE_FORMAT: &str = "%Y:%j:%H:%M:%S%.3f";

impl ChandraTime {
    fn parse_utc(date: &str) -> Result<DateTime<Utc>> {
        let date = date.trim();
        let invalid = || ParseCmError::InvalidDate(date.to_string());

        let mut parts = date.splitn(3, ':');
        let (Some(year), Some(doy), rest) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let doy: u32 = doy.parse().map_err(|_| invalid())?;
        let day = NaiveDate::from_yo_opt(year, doy).ok_or_else(invalid)?;

        let mut hms = rest.unwrap_or("0").split(':');
        let mut field = |default: &str| hms.next().unwrap_or(default).to_string();
        let (h, m, s) = (field("0"), field("0"), field("0"));
        if hms.next().is_some() {
            return Err(invalid());
        }
        let h: u32 = h.parse().map_err(|_| invalid())?;
        let m: u32 = m.parse().map_err(|_| invalid())?;
        let s: f64 = s.parse().map_err(|_| invalid())?;
        if !(0.0..61.0).contains(&s) {
            return Err(invalid());
        }
        let whole = s.trunc();
        let nanos = ((s - whole) * 1e9).round() as i64;
        let naive: NaiveDateTime = day.and_hms_opt(h, m, 0).ok_or_else(invalid)?;
        Ok(naive.and_utc() + Duration::seconds(whole as i64) + Duration::nanoseconds(nanos))
    }
}

impl TimeConverter for ChandraTime {
    fn date_to_secs(&self, date: &str) -> Result<f64> {
        let utc = Self::parse_utc(date)?;
        let elapsed = (utc - epoch())
            .num_nanoseconds()
            .ok_or_else(|| ParseCmError::InvalidDate(date.to_string()))?;
        Ok(elapsed as f64 / 1e9 + TT_MINUS_TAI + tai_minus_utc(utc))
    }

    fn secs_to_date(&self, secs: f64) -> Result<String> {
        if !secs.is_finite() {
            return Err(ParseCmError::InvalidSecs(secs));
        }
        let out_of_range = || ParseCmError::InvalidSecs(secs);
        // TAI - UTC depends on the UTC instant, so guess with the base offset
        // and settle once the leap count is known.
        let mut offset = TT_MINUS_TAI + BASE_TAI_MINUS_UTC;
        let mut utc = utc_at(secs - offset).ok_or_else(out_of_range)?;
        for _ in 0..LEAP_SECONDS.len() + 1 {
            let next = TT_MINUS_TAI + tai_minus_utc(utc);
            if next == offset {
                break;
            }
            offset = next;
            utc = utc_at(secs - offset).ok_or_else(out_of_range)?;
        }
        Ok(utc.format(DATE_FORMAT).to_string())
    }
}
