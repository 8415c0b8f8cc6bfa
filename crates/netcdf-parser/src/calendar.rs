//! CF-convention time axis decoding.
//!
//! Climate model output stores time as numeric offsets from a reference date
//! (`units = "days since 0001-01-01 00:00:00"`) under a named calendar. CESM
//! and most CMIP models use `noleap`, so decoding cannot go through a
//! Gregorian-only date library for every calendar.
//!
//! Supported calendars:
//! - `standard`, `gregorian`, `proleptic_gregorian` (decoded with chrono,
//!   proleptic for all years; dates before 1582-10-15 differ from the CF
//!   mixed Julian/Gregorian calendar)
//! - `noleap` / `365_day`, `all_leap` / `366_day`, `360_day`
//!
//! `julian` and any other calendar name is rejected with
//! [`NetCdfError::TimeDecode`].

use chrono::{NaiveDate, TimeDelta, NaiveDateTime, NaiveTime, Datelike, Timelike};
use std::fmt;

use crate::error::{NetCdfError, NetCdfResult};

const SECONDS_PER_DAY: i64 = 86_400;

/// Calendars defined by the CF conventions that we know how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    ProlepticGregorian,
    NoLeap,
    AllLeap,
    Day360,
}

impl Calendar {
    /// Parse a CF `calendar` attribute. A missing attribute means `standard`.
    pub fn from_attribute(value: Option<&str>) -> NetCdfResult<Self> {
        let Some(value) = value else {
            return Ok(Calendar::ProlepticGregorian);
        };
        match value.trim().to_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => Ok(Calendar::ProlepticGregorian),
            "noleap" | "365_day" => Ok(Calendar::NoLeap),
            "all_leap" | "366_day" => Ok(Calendar::AllLeap),
            "360_day" => Ok(Calendar::Day360),
            other => Err(NetCdfError::TimeDecode(format!("unsupported calendar '{}'", other))),
        }
    }

    fn month_lengths(&self) -> [i64; 12] {
        match self {
            Calendar::NoLeap | Calendar::ProlepticGregorian => {
                [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
            }
            Calendar::AllLeap => [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31],
            Calendar::Day360 => [30; 12],
        }
    }

    fn year_length(&self) -> i64 {
        self.month_lengths().iter().sum()
    }
}

/// A decoded date-time in an arbitrary CF calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CfDateTime {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CfDateTime {
    /// Format as `YYYY-MM-DD`, zero-padding the year to four digits.
    pub fn format_date(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for CfDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}T{:02}:{:02}:{:02}",
            self.format_date(),
            self.hour,
            self.minute,
            self.second
        )
    }
}

/// Parsed `"<unit> since <reference>"` time units.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnits {
    /// Length of one unit in seconds
    pub unit_seconds: f64,
    pub reference: CfDateTime,
}

impl TimeUnits {
    pub fn parse(units: &str) -> NetCdfResult<Self> {
        let lower = units.trim().to_lowercase();
        let (unit, reference) = lower
            .split_once(" since ")
            .ok_or_else(|| NetCdfError::TimeDecode(format!("units '{}' lack 'since'", units)))?;

        let unit_seconds = match unit.trim() {
            "days" | "day" | "d" => 86_400.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3_600.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            other => {
                return Err(NetCdfError::TimeDecode(format!("unsupported time unit '{}'", other)))
            }
        };

        Ok(Self {
            unit_seconds,
            reference: parse_reference(reference.trim())?,
        })
    }
}

/// Parse a CF reference date such as `0001-01-01 00:00:00`, `1850-1-1` or
/// `2000-01-01T12:00:00Z`. Time zone suffixes are ignored.
fn parse_reference(text: &str) -> NetCdfResult<CfDateTime> {
    let bad = || NetCdfError::TimeDecode(format!("bad reference date '{}'", text));

    let mut parts = text.splitn(2, |c| c == ' ' || c == 't');
    let date = parts.next().ok_or_else(bad)?;
    let time = parts.next().unwrap_or("").trim();

    // Leading '-' would be a negative year; CF files in the wild do not use it.
    let mut fields = date.split('-');
    let year: i64 = fields.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    let month: u32 = fields.next().map_or(Some(1), |s| s.parse().ok()).ok_or_else(bad)?;
    let day: u32 = fields.next().map_or(Some(1), |s| s.parse().ok()).ok_or_else(bad)?;

    let time = time.trim_end_matches('z');
    let time = time.split(|c| c == '+' || c == ' ').next().unwrap_or("");
    let mut hms = time.split(':').filter(|s| !s.is_empty());
    let hour: u32 = hms.next().map_or(Some(0), |s| s.parse().ok()).ok_or_else(bad)?;
    let minute: u32 = hms.next().map_or(Some(0), |s| s.parse().ok()).ok_or_else(bad)?;
    let second: u32 = hms
        .next()
        .map_or(Some(0.0), |s| s.parse::<f64>().ok())
        .map(|s| s.floor() as u32)
        .ok_or_else(bad)?;

    if !(1..=12).contains(&month) || day == 0 || hour > 23 || minute > 59 || second > 60 {
        return Err(bad());
    }

    Ok(CfDateTime {
        year,
        month,
        day,
        hour,
        minute,
        second,
    })
}

/// Decode raw time values under the given units and calendar.
pub fn decode_times(values: &[f64], units: &TimeUnits, calendar: Calendar) -> NetCdfResult<Vec<CfDateTime>> {
    values
        .iter()
        .map(|&value| decode_time(value, units, calendar))
        .collect()
}

/// Decode one raw time value.
pub fn decode_time(value: f64, units: &TimeUnits, calendar: Calendar) -> NetCdfResult<CfDateTime> {
    if !value.is_finite() {
        return Err(NetCdfError::TimeDecode(format!("non-finite time value {}", value)));
    }
    let offset_ms = (value * units.unit_seconds * 1000.0).round();
    // `as` saturates; anything this large is garbage, not a date
    if offset_ms.abs() >= i64::MAX as f64 {
        return Err(NetCdfError::TimeDecode(format!("time value {} out of range", value)));
    }
    let offset_ms = offset_ms as i64;

    match calendar {
        Calendar::ProlepticGregorian => decode_gregorian(offset_ms, &units.reference),
        _ => decode_fixed_year(offset_ms, &units.reference, calendar),
    }
}

fn decode_gregorian(offset_ms: i64, reference: &CfDateTime) -> NetCdfResult<CfDateTime> {
    let out_of_range = || {
        NetCdfError::TimeDecode(format!("reference date {} out of range", reference))
    };
    let year = i32::try_from(reference.year).map_err(|_| out_of_range())?;
    let date = NaiveDate::from_ymd_opt(year, reference.month, reference.day).ok_or_else(out_of_range)?;
    let time = NaiveTime::from_hms_opt(reference.hour, reference.minute, reference.second.min(59))
        .ok_or_else(out_of_range)?;

    let offset = TimeDelta::try_milliseconds(offset_ms).ok_or_else(out_of_range)?;
    let decoded = NaiveDateTime::new(date, time)
        .checked_add_signed(offset)
        .ok_or_else(out_of_range)?;

    Ok(CfDateTime {
        year: decoded.year() as i64,
        month: decoded.month(),
        day: decoded.day(),
        hour: decoded.hour(),
        minute: decoded.minute(),
        second: decoded.second(),
    })
}

/// Calendars where every year has the same length reduce to plain arithmetic.
fn decode_fixed_year(offset_ms: i64, reference: &CfDateTime, calendar: Calendar) -> NetCdfResult<CfDateTime> {
    let overflow = || {
        NetCdfError::TimeDecode(format!(
            "{} ms after {} overflows the {:?} calendar",
            offset_ms, reference, calendar
        ))
    };
    let months = calendar.month_lengths();
    let year_length = calendar.year_length();

    let day_of_year: i64 = months[..(reference.month as usize - 1)].iter().sum::<i64>()
        + (reference.day as i64 - 1).min(months[reference.month as usize - 1] - 1);
    let reference_second = reference.hour as i64 * 3600 + reference.minute as i64 * 60 + reference.second as i64;

    let total_seconds = reference
        .year
        .checked_mul(year_length)
        .and_then(|days| days.checked_add(day_of_year))
        .and_then(|days| days.checked_mul(SECONDS_PER_DAY))
        .and_then(|secs| secs.checked_add(reference_second))
        .and_then(|secs| secs.checked_add(offset_ms.div_euclid(1000)))
        .ok_or_else(overflow)?;
    let day_number = total_seconds.div_euclid(SECONDS_PER_DAY);
    let second_of_day = total_seconds.rem_euclid(SECONDS_PER_DAY);

    let year = day_number.div_euclid(year_length);
    let mut remaining = day_number.rem_euclid(year_length);
    let mut month = 1u32;
    for length in months {
        if remaining < length {
            break;
        }
        remaining -= length;
        month += 1;
    }

    Ok(CfDateTime {
        year,
        month,
        day: remaining as u32 + 1,
        hour: (second_of_day / 3600) as u32,
        minute: ((second_of_day % 3600) / 60) as u32,
        second: (second_of_day % 60) as u32,
    })
}
