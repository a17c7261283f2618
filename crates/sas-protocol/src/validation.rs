//! Shape checks shared by the long poll parsers.
//!
//! Every function returns `Err` on the first violation; parsers propagate it
//! with `?` and the parser boundary turns it into a NACK.
//!
//! # Examples
//!
//! ```
//! use sas_protocol::validation::{expect_len, validate_code, validate_flag};
//!
//! assert!(expect_len(&[0x00, 0x01, 0x01], 3).is_ok());
//! assert!(expect_len(&[0x00, 0x01], 3).is_err());
//!
//! assert_eq!(validate_flag("enable", 0x01).unwrap(), true);
//! assert!(validate_flag("enable", 0x02).is_err());
//!
//! assert!(validate_code("lock code", 0x80, &[0x00, 0x80, 0xFF]).is_ok());
//! ```

use sas_core::{Error, Result, constants::MAX_PROGRESSIVE_LEVEL};

/// Payload must be exactly `expected` bytes.
///
/// # Errors
/// Returns `Error::LengthMismatch`.
pub fn expect_len(payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() != expected {
        return Err(Error::LengthMismatch {
            declared: expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

/// Payload must be empty.
///
/// # Errors
/// Returns `Error::TrailingData` with the number of unexpected bytes.
pub fn expect_empty(payload: &[u8]) -> Result<()> {
    if !payload.is_empty() {
        return Err(Error::TrailingData {
            remaining: payload.len(),
        });
    }
    Ok(())
}

/// A 0/1 flag byte.
///
/// # Errors
/// Returns `Error::InvalidCode` for anything but 0 or 1.
pub fn validate_flag(field: &'static str, value: u8) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(Error::invalid_code(field, value)),
    }
}

/// Enumerated byte that must be one of `allowed`.
///
/// # Errors
/// Returns `Error::InvalidCode`.
pub fn validate_code(field: &'static str, value: u8, allowed: &[u8]) -> Result<u8> {
    if allowed.contains(&value) {
        Ok(value)
    } else {
        Err(Error::invalid_code(field, value))
    }
}

/// Byte inside an inclusive range.
///
/// # Errors
/// Returns `Error::InvalidCode`.
pub fn validate_range(field: &'static str, value: u8, min: u8, max: u8) -> Result<u8> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(Error::invalid_code(field, value))
    }
}

/// Progressive level 1 through 32.
pub fn validate_progressive_level(level: u8) -> Result<u8> {
    validate_range("progressive level", level, 1, MAX_PROGRESSIVE_LEVEL)
}

/// Asset number carried by the request must match the machine's.
///
/// # Errors
/// Returns `Error::AssetMismatch`.
pub fn validate_asset(expected: u32, actual: u32) -> Result<()> {
    if expected != actual {
        return Err(Error::AssetMismatch { expected, actual });
    }
    Ok(())
}

/// Item count must be within `min..=max`.
///
/// # Errors
/// Returns `Error::InvalidFieldFormat`.
pub fn validate_count(field: &'static str, count: usize, min: usize, max: usize) -> Result<()> {
    if count < min || count > max {
        return Err(Error::invalid_field(format!(
            "{field} count {count} outside {min}-{max}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], 0, true)]
    #[case(&[0x01], 1, true)]
    #[case(&[0x01], 2, false)]
    #[case(&[0x01, 0x02, 0x03], 2, false)]
    fn test_expect_len(#[case] payload: &[u8], #[case] expected: usize, #[case] ok: bool) {
        assert_eq!(expect_len(payload, expected).is_ok(), ok);
    }

    #[test]
    fn test_expect_empty() {
        assert!(expect_empty(&[]).is_ok());
        assert_eq!(
            expect_empty(&[0x00, 0x00]),
            Err(Error::TrailingData { remaining: 2 })
        );
    }

    #[rstest]
    #[case(0x00, Some(false))]
    #[case(0x01, Some(true))]
    #[case(0x02, None)]
    #[case(0xFF, None)]
    fn test_validate_flag(#[case] value: u8, #[case] expected: Option<bool>) {
        assert_eq!(validate_flag("flag", value).ok(), expected);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(32, true)]
    #[case(33, false)]
    fn test_progressive_level(#[case] level: u8, #[case] ok: bool) {
        assert_eq!(validate_progressive_level(level).is_ok(), ok);
    }

    #[test]
    fn test_validate_asset() {
        assert!(validate_asset(1234, 1234).is_ok());
        assert_eq!(
            validate_asset(1234, 4321),
            Err(Error::AssetMismatch {
                expected: 1234,
                actual: 4321
            })
        );
    }

    #[test]
    fn test_validate_count() {
        assert!(validate_count("meter", 1, 1, 12).is_ok());
        assert!(validate_count("meter", 0, 1, 12).is_err());
        assert!(validate_count("meter", 13, 1, 12).is_err());
    }
}
