// src/nmea/fields.rs
//! Typed parsing of individual NMEA fields
//!
//! Every parser takes the raw field text and returns a plain message on
//! failure; the caller attaches the field index. Empty fields map to `None`
//! wherever the value is optional in practice.

use chrono::{NaiveDate, NaiveTime};
use std::str::FromStr;

/// Knots to metres per second (a nautical mile is exactly 1852 m)
pub const KNOTS_TO_MPS: f64 = 1852.0 / 3600.0;

/// Round to six decimal places, about 0.1 m of latitude
fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

fn all_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

/// Required integer field
pub fn parse_int<T: FromStr>(value: &str) -> Result<T, String> {
    if value.is_empty() {
        return Err("required value is empty".to_string());
    }
    value
        .parse::<T>()
        .map_err(|_| format!("invalid integer: {:?}", value))
}

/// Optional integer field
pub fn parse_optional_int<T: FromStr>(value: &str) -> Result<Option<T>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_int(value).map(Some)
}

pub fn parse_float(value: &str) -> Result<Option<f64>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| format!("invalid number: {:?}", value))
}

/// First character of a single-letter flag field (status, mode)
pub fn parse_flag(value: &str) -> Result<Option<char>, String> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) => Ok(Some(c)),
        _ => Err(format!("expected a single character: {:?}", value)),
    }
}

pub fn parse_text(value: &str) -> Result<Option<String>, String> {
    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// UTC time in `HHMMSS[.sss]` format
pub fn parse_time(value: &str) -> Result<Option<NaiveTime>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    if value.len() < 6 || !value.is_ascii() {
        return Err(format!("time must be at least 6 characters long: {:?}", value));
    }

    let (hms, fraction) = value.split_at(6);
    let fraction = match fraction.strip_prefix('.') {
        Some(digits) => digits,
        None if fraction.is_empty() => "",
        None => return Err(format!("invalid time: {:?}", value)),
    };
    if !all_digits(hms) || !all_digits(fraction) {
        return Err(format!("invalid time: {:?}", value));
    }

    let hours: u32 = hms[..2].parse().map_err(|_| format!("invalid time: {:?}", value))?;
    let minutes: u32 = hms[2..4].parse().map_err(|_| format!("invalid time: {:?}", value))?;
    let seconds: u32 = hms[4..].parse().map_err(|_| format!("invalid time: {:?}", value))?;

    // Pad or truncate the fraction to nanoseconds
    let nanos = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));

    NaiveTime::from_hms_nano_opt(hours, minutes, seconds, nanos)
        .map(Some)
        .ok_or_else(|| format!("invalid time: {:?}", value))
}

/// Date in `DDMMYY` format. Two-digit years roll over at 1980.
pub fn parse_date(value: &str) -> Result<Option<NaiveDate>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    if value.len() != 6 {
        return Err(format!("date must be 6 characters long: {:?}", value));
    }
    if !all_digits(value) {
        return Err(format!("invalid date: {:?}", value));
    }

    let day: u32 = value[..2].parse().map_err(|_| format!("invalid date: {:?}", value))?;
    let month: u32 = value[2..4].parse().map_err(|_| format!("invalid date: {:?}", value))?;
    let two_digit_year: i32 = value[4..].parse().map_err(|_| format!("invalid date: {:?}", value))?;

    let mut year = 1900 + two_digit_year;
    if year < 1980 {
        year += 100;
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .map(Some)
        .ok_or_else(|| format!("invalid date: {:?}", value))
}

/// Degrees in `[DDD]MM.mmmm` form to decimal degrees.
///
/// The last two digits before the decimal point are whole minutes, anything
/// in front of them is whole degrees.
pub fn parse_degrees(value: &str) -> Result<f64, String> {
    if value.is_empty() {
        return Err("cannot parse degrees from an empty value".to_string());
    }
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
        return Err(format!("invalid degrees: {:?}", value));
    }

    let split = whole.len().saturating_sub(2);
    let degrees = if split == 0 {
        0.0
    } else {
        whole[..split]
            .parse::<f64>()
            .map_err(|_| format!("invalid degrees: {:?}", value))?
    };
    let minutes = if fraction.is_empty() {
        whole[split..].parse::<f64>()
    } else {
        format!("{}.{}", &whole[split..], fraction).parse::<f64>()
    }
    .map_err(|_| format!("invalid degrees: {:?}", value))?;

    if minutes >= 60.0 {
        return Err(format!("minutes out of range: {:?}", value));
    }
    Ok(round6(degrees + minutes / 60.0))
}

fn parse_hemisphere(
    value: &str,
    hemisphere: &str,
    positive: char,
    negative: char,
    limit: f64,
    name: &str,
) -> Result<Option<f64>, String> {
    if value.is_empty() && hemisphere.is_empty() {
        return Ok(None);
    }
    let degrees = parse_degrees(value)?;
    if degrees > limit {
        return Err(format!("{} out of range: {:?}", name, value));
    }
    match hemisphere.to_ascii_uppercase() {
        h if h.len() == 1 && h.starts_with(positive) => Ok(Some(degrees)),
        h if h.len() == 1 && h.starts_with(negative) => Ok(Some(-degrees)),
        _ => Err(format!("{} has bad direction: {:?}", name, hemisphere)),
    }
}

/// Latitude with `N`/`S` hemisphere, north positive
pub fn parse_latitude(value: &str, hemisphere: &str) -> Result<Option<f64>, String> {
    parse_hemisphere(value, hemisphere, 'N', 'S', 90.0, "latitude")
}

/// Longitude with `E`/`W` hemisphere, east positive
pub fn parse_longitude(value: &str, hemisphere: &str) -> Result<Option<f64>, String> {
    parse_hemisphere(value, hemisphere, 'E', 'W', 180.0, "longitude")
}

/// Magnetic declination in degrees, east positive
pub fn parse_declination(value: &str, direction: &str) -> Result<Option<f64>, String> {
    let degrees = match parse_float(value)? {
        Some(degrees) => degrees,
        None => return Ok(None),
    };
    match direction.to_ascii_uppercase().as_str() {
        "E" => Ok(Some(degrees)),
        "W" => Ok(Some(-degrees)),
        _ => Err(format!("declination has bad direction: {:?}", direction)),
    }
}

/// Altitude in metres; metres are the only unit receivers send
pub fn parse_altitude(value: &str, units: &str) -> Result<Option<f64>, String> {
    let altitude = match parse_float(value)? {
        Some(altitude) => altitude,
        None => return Ok(None),
    };
    if units.eq_ignore_ascii_case("M") {
        Ok(Some(altitude))
    } else {
        Err(format!("unknown altitude units: {:?}", units))
    }
}

pub fn knots_to_mps(knots: f64) -> f64 {
    round6(knots * KNOTS_TO_MPS)
}
