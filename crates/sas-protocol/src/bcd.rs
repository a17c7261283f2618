//! Byte and BCD codec for SAS long-poll fields.
//!
//! This module holds the pure conversion functions every parser is built
//! on: binary-coded decimal, fixed-width binary in both byte orders, ASCII
//! fields and the BCD date/time formats.
//!
//! # BCD Layout
//!
//! Two decimal digits are packed per byte, most significant digit first:
//!
//! ```text
//! 1234 in 3 bytes -> [0x00, 0x12, 0x34]
//! ```
//!
//! Any nibble above 9 makes the whole field invalid.
//!
//! # Overflow Policy
//!
//! Encoding a value that does not fit its field width is an error
//! ([`Error::BcdOverflow`] / [`Error::BinaryOverflow`]). Nothing is silently
//! truncated; parsers turn the error into a NACK.
//!
//! # Examples
//!
//! ```
//! use sas_protocol::bcd;
//!
//! assert_eq!(bcd::to_bcd(1234, 3).unwrap(), vec![0x00, 0x12, 0x34]);
//! assert_eq!(bcd::from_bcd(&[0x00, 0x12, 0x34]).unwrap(), 1234);
//!
//! // 0x1A contains the nibble 0xA
//! assert!(bcd::from_bcd(&[0x1A]).is_err());
//!
//! // 100 needs three digits
//! assert!(bcd::to_bcd(100, 1).is_err());
//! ```

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use sas_core::{Error, Result};

/// Encode `value` as `byte_count` BCD bytes, most significant digit first.
///
/// # Errors
/// Returns `Error::BcdOverflow` if the value needs more than
/// `2 * byte_count` digits.
pub fn to_bcd(value: u64, byte_count: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; byte_count];
    let mut remaining = value;

    for byte in out.iter_mut().rev() {
        let lo = (remaining % 10) as u8;
        remaining /= 10;
        let hi = (remaining % 10) as u8;
        remaining /= 10;
        *byte = (hi << 4) | lo;
    }

    if remaining != 0 {
        return Err(Error::BcdOverflow {
            value,
            digits: byte_count * 2,
        });
    }

    Ok(out)
}

/// Decode BCD bytes, most significant digit first.
///
/// # Errors
/// Returns `Error::InvalidBcd` if any nibble is above 9, or
/// `Error::InvalidFieldFormat` if the number does not fit in a `u64`.
pub fn from_bcd(bytes: &[u8]) -> Result<u64> {
    let mut value: u64 = 0;

    for (position, &byte) in bytes.iter().enumerate() {
        let hi = byte >> 4;
        let lo = byte & 0x0F;
        if hi > 9 || lo > 9 {
            return Err(Error::InvalidBcd { byte, position });
        }
        value = value
            .checked_mul(100)
            .and_then(|v| v.checked_add(u64::from(hi * 10 + lo)))
            .ok_or_else(|| Error::invalid_field("BCD value exceeds 64 bits"))?;
    }

    Ok(value)
}

/// Smallest number of BCD bytes that holds `value` (at least one).
///
/// ```
/// use sas_protocol::bcd::min_bcd_width;
///
/// assert_eq!(min_bcd_width(0), 1);
/// assert_eq!(min_bcd_width(99), 1);
/// assert_eq!(min_bcd_width(100), 2);
/// assert_eq!(min_bcd_width(12_345_678), 4);
/// ```
#[must_use]
pub fn min_bcd_width(value: u64) -> usize {
    let mut digits: usize = 1;
    let mut remaining = value / 10;
    while remaining > 0 {
        digits += 1;
        remaining /= 10;
    }
    digits.div_ceil(2)
}

/// Returns `true` if every nibble of `bytes` is a decimal digit.
#[must_use]
pub fn is_valid_bcd(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| (b >> 4) <= 9 && (b & 0x0F) <= 9)
}

/// Encode `value` as `byte_count` big-endian binary bytes.
///
/// # Errors
/// Returns `Error::BinaryOverflow` if the value does not fit.
pub fn to_binary(value: u64, byte_count: usize) -> Result<Vec<u8>> {
    let mut out = to_binary_le(value, byte_count)?;
    out.reverse();
    Ok(out)
}

/// Encode `value` as `byte_count` binary bytes, least significant byte first.
///
/// # Errors
/// Returns `Error::BinaryOverflow` if the value does not fit.
pub fn to_binary_le(value: u64, byte_count: usize) -> Result<Vec<u8>> {
    if byte_count < 8 && value >> (byte_count * 8) != 0 {
        return Err(Error::BinaryOverflow {
            value,
            bytes: byte_count,
        });
    }

    Ok((0..byte_count)
        .map(|i| if i < 8 { (value >> (i * 8)) as u8 } else { 0 })
        .collect())
}

/// Decode big-endian binary bytes.
///
/// # Errors
/// Returns `Error::InvalidFieldFormat` for fields wider than 8 bytes.
pub fn from_binary(bytes: &[u8]) -> Result<u64> {
    if bytes.len() > 8 {
        return Err(Error::invalid_field(format!(
            "Binary field of {} bytes exceeds 64 bits",
            bytes.len()
        )));
    }
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Decode binary bytes sent least significant byte first.
///
/// # Errors
/// Returns `Error::InvalidFieldFormat` for fields wider than 8 bytes.
pub fn from_binary_le(bytes: &[u8]) -> Result<u64> {
    if bytes.len() > 8 {
        return Err(Error::invalid_field(format!(
            "Binary field of {} bytes exceeds 64 bits",
            bytes.len()
        )));
    }
    Ok(bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Format `value` as a zero-padded decimal string of exactly `width` digits.
///
/// # Errors
/// Returns `Error::BcdOverflow` if the value has more than `width` digits.
///
/// # Examples
///
/// ```
/// use sas_protocol::bcd::to_ascii_digits;
///
/// assert_eq!(to_ascii_digits(9450, 4).unwrap(), "9450");
/// assert_eq!(to_ascii_digits(7, 3).unwrap(), "007");
/// assert!(to_ascii_digits(12345, 4).is_err());
/// ```
pub fn to_ascii_digits(value: u64, width: usize) -> Result<String> {
    let text = format!("{value:0width$}");
    if text.len() > width {
        return Err(Error::BcdOverflow {
            value,
            digits: width,
        });
    }
    Ok(text)
}

/// Fit text into a fixed-width ASCII field.
///
/// Longer text keeps its leftmost `width` characters; shorter text is
/// left-padded with `'0'`. Non-ASCII characters are replaced by `'?'`.
///
/// # Examples
///
/// ```
/// use sas_protocol::bcd::fit_ascii;
///
/// assert_eq!(fit_ascii("AB1234567", 6), b"AB1234".to_vec());
/// assert_eq!(fit_ascii("42", 6), b"000042".to_vec());
/// ```
#[must_use]
pub fn fit_ascii(text: &str, width: usize) -> Vec<u8> {
    let mut bytes: Vec<u8> = text
        .chars()
        .take(width)
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect();

    if bytes.len() < width {
        let mut padded = vec![b'0'; width - bytes.len()];
        padded.append(&mut bytes);
        return padded;
    }

    bytes
}

/// Replace non-ASCII characters and cap `text` at `max` characters.
#[must_use]
pub fn ascii_prefix(text: &str, max: usize) -> Vec<u8> {
    text.chars()
        .take(max)
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}

/// Encode a date as 4 BCD bytes, `MMDDYYYY`.
///
/// # Errors
/// Returns `Error::InvalidDateTime` for years outside 0-9999.
pub fn date_to_bcd(date: NaiveDate) -> Result<Vec<u8>> {
    let year = u64::try_from(date.year())
        .ok()
        .filter(|&y| y <= 9999)
        .ok_or_else(|| Error::InvalidDateTime {
            message: format!("Year {} cannot be encoded", date.year()),
        })?;
    let value = u64::from(date.month()) * 1_000_000 + u64::from(date.day()) * 10_000 + year;
    to_bcd(value, 4)
}

/// Encode a time of day as 3 BCD bytes, `HHMMSS`.
///
/// # Errors
/// Never fails for a valid `NaiveTime`; the `Result` mirrors the codec API.
pub fn time_to_bcd(time: NaiveTime) -> Result<Vec<u8>> {
    let value =
        u64::from(time.hour()) * 10_000 + u64::from(time.minute()) * 100 + u64::from(time.second());
    to_bcd(value, 3)
}

/// Decode a 4-byte BCD `MMDDYYYY` date.
///
/// # Errors
/// Returns `Error::InvalidBcd` for invalid nibbles and `Error::InvalidDateTime`
/// for calendar values that do not exist.
pub fn bcd_to_date(bytes: &[u8]) -> Result<NaiveDate> {
    if bytes.len() != 4 {
        return Err(Error::LengthMismatch {
            declared: 4,
            actual: bytes.len(),
        });
    }
    let value = from_bcd(bytes)?;
    let month = (value / 1_000_000) as u32;
    let day = ((value / 10_000) % 100) as u32;
    let year = (value % 10_000) as i32;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| Error::InvalidDateTime {
        message: format!("{month:02}/{day:02}/{year:04} is not a calendar date"),
    })
}

/// Decode a 3-byte BCD `HHMMSS` time.
///
/// # Errors
/// Returns `Error::InvalidBcd` for invalid nibbles and `Error::InvalidDateTime`
/// for out-of-range components.
pub fn bcd_to_time(bytes: &[u8]) -> Result<NaiveTime> {
    if bytes.len() != 3 {
        return Err(Error::LengthMismatch {
            declared: 3,
            actual: bytes.len(),
        });
    }
    let value = from_bcd(bytes)?;
    let hour = (value / 10_000) as u32;
    let minute = ((value / 100) % 100) as u32;
    let second = (value % 100) as u32;

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| Error::InvalidDateTime {
        message: format!("{hour:02}:{minute:02}:{second:02} is not a time of day"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1, vec![0x00])]
    #[case(99, 1, vec![0x99])]
    #[case(1234, 2, vec![0x12, 0x34])]
    #[case(1234, 4, vec![0x00, 0x00, 0x12, 0x34])]
    #[case(1_234_567_890, 5, vec![0x12, 0x34, 0x56, 0x78, 0x90])]
    fn test_to_bcd(#[case] value: u64, #[case] bytes: usize, #[case] expected: Vec<u8>) {
        assert_eq!(to_bcd(value, bytes).unwrap(), expected);
    }

    #[rstest]
    #[case(100, 1)]
    #[case(10_000, 2)]
    #[case(100_000_000, 4)]
    fn test_to_bcd_overflow(#[case] value: u64, #[case] bytes: usize) {
        assert_eq!(
            to_bcd(value, bytes).unwrap_err(),
            Error::BcdOverflow {
                value,
                digits: bytes * 2
            }
        );
    }

    #[test]
    fn test_to_bcd_max_u64() {
        let encoded = to_bcd(u64::MAX, 10).unwrap();
        assert_eq!(from_bcd(&encoded).unwrap(), u64::MAX);
    }

    #[rstest]
    #[case(&[0x0A], 0)]
    #[case(&[0x12, 0xA0], 1)]
    #[case(&[0x00, 0x00, 0x0F], 2)]
    fn test_from_bcd_invalid_nibble(#[case] bytes: &[u8], #[case] position: usize) {
        match from_bcd(bytes) {
            Err(Error::InvalidBcd { position: p, .. }) => assert_eq!(p, position),
            other => panic!("expected InvalidBcd, got {other:?}"),
        }
        assert!(!is_valid_bcd(bytes));
    }

    #[test]
    fn test_from_bcd_empty_is_zero() {
        assert_eq!(from_bcd(&[]).unwrap(), 0);
    }

    #[test]
    fn test_binary_big_endian() {
        assert_eq!(to_binary(0x0102_0304, 4).unwrap(), vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(from_binary(&[0x01, 0x02, 0x03, 0x04]).unwrap(), 0x0102_0304);
    }

    #[test]
    fn test_binary_little_endian() {
        assert_eq!(to_binary_le(0x0A0B0C, 3).unwrap(), vec![0x0C, 0x0B, 0x0A]);
        assert_eq!(from_binary_le(&[0x0C, 0x0B, 0x0A]).unwrap(), 0x0A0B0C);
    }

    #[test]
    fn test_binary_overflow() {
        assert!(to_binary(0x1_0000, 2).is_err());
        assert!(to_binary_le(0x1_0000_0000, 4).is_err());
        assert!(to_binary(u64::MAX, 8).is_ok());
    }

    #[test]
    fn test_fit_ascii_exact_width() {
        assert_eq!(fit_ascii("ABCDEF", 6), b"ABCDEF".to_vec());
        assert_eq!(fit_ascii("", 2), b"00".to_vec());
        assert_eq!(fit_ascii("é1", 2), b"?1".to_vec());
    }

    #[test]
    fn test_date_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let encoded = date_to_bcd(date).unwrap();
        assert_eq!(encoded, vec![0x02, 0x29, 0x20, 0x24]);
        assert_eq!(bcd_to_date(&encoded).unwrap(), date);
    }

    #[test]
    fn test_time_round_trip() {
        let time = NaiveTime::from_hms_opt(23, 5, 9).unwrap();
        let encoded = time_to_bcd(time).unwrap();
        assert_eq!(encoded, vec![0x23, 0x05, 0x09]);
        assert_eq!(bcd_to_time(&encoded).unwrap(), time);
    }

    #[rstest]
    #[case(&[0x02, 0x30, 0x20, 0x24])] // February 30th
    #[case(&[0x13, 0x01, 0x20, 0x24])] // month 13
    #[case(&[0x00, 0x01, 0x20, 0x24])] // month 0
    fn test_invalid_calendar_date(#[case] bytes: &[u8]) {
        assert!(matches!(
            bcd_to_date(bytes),
            Err(Error::InvalidDateTime { .. })
        ));
    }

    #[test]
    fn test_invalid_time() {
        assert!(bcd_to_time(&[0x24, 0x00, 0x00]).is_err());
        assert!(bcd_to_time(&[0x12, 0x60, 0x00]).is_err());
    }
}
