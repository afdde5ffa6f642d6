//! UTCTime and GeneralizedTime in their DER forms.
//!
//! DER requires the `Z` suffix, no time zone offset and seconds always
//! present. GeneralizedTime fractions drop trailing zeros and omit the dot
//! when there is no fraction.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

fn digits(s: &[u8], what: &'static str) -> Result<u32, String> {
    if s.is_empty() || !s.iter().all(u8::is_ascii_digit) {
        return Err(format!("{}: expected digits", what));
    }
    Ok(s.iter().fold(0, |n, d| n * 10 + u32::from(d - b'0')))
}

fn assemble(year: i32, rest: &[u8], nanos: u32) -> Result<NaiveDateTime, String> {
    let month = digits(&rest[0..2], "month")?;
    let day = digits(&rest[2..4], "day")?;
    let hour = digits(&rest[4..6], "hour")?;
    let minute = digits(&rest[6..8], "minute")?;
    let second = digits(&rest[8..10], "second")?;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_nano_opt(hour, minute, second, nanos))
        .ok_or_else(|| "date or time out of range".to_string())
}

/// `YYMMDDHHMMSSZ`. Years 50..=99 are 19xx, 00..=49 are 20xx.
pub fn parse_utc_time(content: &[u8]) -> Result<NaiveDateTime, String> {
    if content.len() != 13 || content[12] != b'Z' {
        return Err("expected YYMMDDHHMMSSZ".to_string());
    }
    let yy = digits(&content[0..2], "year")? as i32;
    let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
    assemble(year, &content[2..12], 0)
}

pub fn format_utc_time(time: &NaiveDateTime) -> Result<Vec<u8>, String> {
    if !(1950..=2049).contains(&time.year()) {
        return Err(format!("year {} is outside the UTCTime range", time.year()));
    }
    if time.nanosecond() != 0 {
        return Err("UTCTime has no fractional seconds".to_string());
    }
    Ok(time.format("%y%m%d%H%M%SZ").to_string().into_bytes())
}

/// `YYYYMMDDHHMMSS[.f+]Z`.
pub fn parse_generalized_time(content: &[u8]) -> Result<NaiveDateTime, String> {
    if content.len() < 15 || content.last() != Some(&b'Z') {
        return Err("expected YYYYMMDDHHMMSS[.fff]Z".to_string());
    }
    let year = digits(&content[0..4], "year")? as i32;
    let frac = &content[14..content.len() - 1];
    let nanos = match frac {
        [] => 0,
        [b'.', f @ ..] => {
            if f.is_empty() || f.len() > 9 || f.last() == Some(&b'0') {
                return Err("fraction must have 1 to 9 digits without trailing zeros".to_string());
            }
            digits(f, "fraction")? * 10u32.pow(9 - f.len() as u32)
        }
        _ => return Err("time zone offsets are not allowed".to_string()),
    };
    assemble(year, &content[4..14], nanos)
}

pub fn format_generalized_time(time: &NaiveDateTime) -> Result<Vec<u8>, String> {
    if !(0..=9999).contains(&time.year()) {
        return Err(format!("year {} is outside the GeneralizedTime range", time.year()));
    }
    let mut s = time.format("%Y%m%d%H%M%S").to_string();
    let nanos = time.nanosecond();
    if nanos != 0 {
        let frac = format!("{:09}", nanos);
        s.push('.');
        s.push_str(frac.trim_end_matches('0'));
    }
    s.push('Z');
    Ok(s.into_bytes())
}
