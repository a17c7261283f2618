//! Payload readers for long poll request data.
//!
//! [`FieldReader`] walks a payload front to back, failing on overrun instead
//! of panicking. [`TaggedRecords`] decodes the `[code][length][data]` record
//! lists used by receipt and ticket text commands.
//!
//! # Three-state text fields
//!
//! A tagged text field can be:
//!
//! - absent: [`FieldValue::Default`], keep the machine's own value
//! - present with length zero: [`FieldValue::Blank`], print nothing
//! - present with text: [`FieldValue::Value`]
//!
//! # Example
//!
//! ```
//! use sas_protocol::field::{FieldSpec, FieldValue, TaggedRecords};
//!
//! const SPECS: &[FieldSpec] = &[FieldSpec::new(0x00, 22), FieldSpec::new(0x01, 22)];
//!
//! // location "CASINO", address line 1 explicitly blank
//! let data = [0x00, 0x06, b'C', b'A', b'S', b'I', b'N', b'O', 0x01, 0x00];
//! let records = TaggedRecords::parse(&data, SPECS).unwrap();
//!
//! assert_eq!(records.get(0x00), FieldValue::Value("CASINO".to_string()));
//! assert_eq!(records.get(0x01), FieldValue::Blank);
//! assert_eq!(records.get(0x02), FieldValue::Default);
//! ```

use crate::bcd;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sas_core::{Error, Result, constants::GAME_NUMBER_LENGTH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cursor over request data.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        FieldReader { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `count` bytes.
    ///
    /// # Errors
    /// Returns `Error::PayloadTooShort` if fewer bytes remain.
    pub fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::PayloadTooShort {
                needed: self.position + count,
                available: self.data.len(),
            });
        }
        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Take everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.position..];
        self.position = self.data.len();
        slice
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Fixed-width array, e.g. a registration key.
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// BCD field of `width` bytes.
    pub fn bcd(&mut self, width: usize) -> Result<u64> {
        bcd::from_bcd(self.take(width)?)
    }

    /// BCD field of `width` bytes that must fit a `u32`.
    pub fn bcd_u32(&mut self, width: usize) -> Result<u32> {
        let value = self.bcd(width)?;
        u32::try_from(value).map_err(|_| Error::BinaryOverflow { value, bytes: 4 })
    }

    /// 2-byte BCD game number. Any invalid nibble rejects the field.
    pub fn game_number(&mut self) -> Result<u16> {
        Ok(self.bcd(GAME_NUMBER_LENGTH)? as u16)
    }

    /// Big-endian binary field.
    pub fn binary(&mut self, width: usize) -> Result<u64> {
        bcd::from_binary(self.take(width)?)
    }

    /// Binary field sent least significant byte first.
    pub fn binary_le(&mut self, width: usize) -> Result<u64> {
        bcd::from_binary_le(self.take(width)?)
    }

    pub fn u16_le(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn u32_be(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn u32_le(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// 4-byte BCD `MMDDYYYY` date.
    pub fn date(&mut self) -> Result<NaiveDate> {
        bcd::bcd_to_date(self.take(4)?)
    }

    /// 3-byte BCD `HHMMSS` time.
    pub fn time(&mut self) -> Result<NaiveTime> {
        bcd::bcd_to_time(self.take(3)?)
    }

    pub fn date_time(&mut self) -> Result<NaiveDateTime> {
        let date = self.date()?;
        let time = self.time()?;
        Ok(date.and_time(time))
    }

    /// Read a length byte that must describe exactly the rest of the data.
    ///
    /// # Errors
    /// Returns `Error::LengthMismatch` when the declared length is not the
    /// number of bytes that follow it.
    pub fn length_prefixed_exact(&mut self) -> Result<FieldReader<'a>> {
        let declared = usize::from(self.u8()?);
        let actual = self.remaining();
        if declared != actual {
            return Err(Error::LengthMismatch { declared, actual });
        }
        Ok(FieldReader::new(self.rest()))
    }

    /// Read a length byte and take that many bytes.
    ///
    /// # Errors
    /// Returns `Error::PayloadTooShort` when the length overruns the data.
    pub fn length_prefixed(&mut self) -> Result<&'a [u8]> {
        let length = usize::from(self.u8()?);
        self.take(length)
    }

    /// Length-prefixed ASCII text of at most `max` characters.
    pub fn prefixed_text(&mut self, code: u8, max: usize) -> Result<FieldValue> {
        let data = self.length_prefixed()?;
        FieldValue::from_bytes(code, data, max)
    }

    /// Fail if any data is left over.
    ///
    /// # Errors
    /// Returns `Error::TrailingData` with the count of unread bytes.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(Error::TrailingData { remaining }),
        }
    }
}

/// State of an optional text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Field not sent: keep the machine's default
    #[default]
    Default,

    /// Field sent with length zero
    Blank,

    /// Field sent with text
    Value(String),
}

impl FieldValue {
    /// Decode a present field, enforcing its length cap.
    ///
    /// # Errors
    /// Returns `Error::FieldTooLong` above `max` bytes and
    /// `Error::InvalidFieldFormat` for non-ASCII data.
    pub fn from_bytes(code: u8, data: &[u8], max: usize) -> Result<Self> {
        if data.len() > max {
            return Err(Error::FieldTooLong {
                code,
                max,
                actual: data.len(),
            });
        }
        if data.is_empty() {
            return Ok(FieldValue::Blank);
        }
        if !data.is_ascii() {
            return Err(Error::invalid_field(format!(
                "Field 0x{code:02X} contains non-ASCII data"
            )));
        }
        Ok(FieldValue::Value(String::from_utf8_lossy(data).into_owned()))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, FieldValue::Default)
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Blank)
    }

    /// Text of an explicit value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Value(text) => Some(text),
            _ => None,
        }
    }

    /// Resolve the field against the machine's current value.
    pub fn resolve<'s>(&'s self, default: &'s str) -> &'s str {
        match self {
            FieldValue::Default => default,
            FieldValue::Blank => "",
            FieldValue::Value(text) => text,
        }
    }
}

/// Known record code and its maximum length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub code: u8,
    pub max_len: usize,
}

impl FieldSpec {
    pub const fn new(code: u8, max_len: usize) -> Self {
        FieldSpec { code, max_len }
    }
}

/// Decoded `[code][length][data]` records.
///
/// Only codes listed in the field specs are kept; unknown codes are skipped
/// after their length has been accounted for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedRecords {
    fields: BTreeMap<u8, FieldValue>,
}

impl TaggedRecords {
    /// Parse a record list that must span all of `data`.
    ///
    /// # Errors
    /// - `Error::PayloadTooShort` when a record header or its data overruns
    ///   the list
    /// - `Error::FieldTooLong` when a known field exceeds its cap
    /// - `Error::InvalidFieldFormat` for non-ASCII text
    pub fn parse(data: &[u8], specs: &[FieldSpec]) -> Result<Self> {
        let mut reader = FieldReader::new(data);
        let mut fields = BTreeMap::new();

        while !reader.is_empty() {
            let code = reader.u8()?;
            let value = reader.length_prefixed()?;

            if let Some(spec) = specs.iter().find(|spec| spec.code == code) {
                fields.insert(code, FieldValue::from_bytes(code, value, spec.max_len)?);
            }
        }

        Ok(TaggedRecords { fields })
    }

    /// State of the field with `code`; [`FieldValue::Default`] when absent.
    pub fn get(&self, code: u8) -> FieldValue {
        self.fields.get(&code).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &FieldValue)> {
        self.fields.iter().map(|(code, value)| (*code, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[FieldSpec] = &[FieldSpec::new(0x00, 40), FieldSpec::new(0x10, 16)];

    #[test]
    fn test_reader_fields() {
        let data = [0x12, 0x34, 0x01, 0x00, 0x00, 0x00, 0x02, 0x01];
        let mut reader = FieldReader::new(&data);
        assert_eq!(reader.game_number().unwrap(), 1234);
        assert_eq!(reader.u32_be().unwrap(), 0x0100_0000);
        assert_eq!(reader.u16_le().unwrap(), 0x0102);
        reader.finish().unwrap();
    }

    #[test]
    fn test_reader_overrun() {
        let mut reader = FieldReader::new(&[0x01, 0x02]);
        assert_eq!(
            reader.take(3),
            Err(Error::PayloadTooShort {
                needed: 3,
                available: 2
            })
        );
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_reader_invalid_game_number() {
        let mut reader = FieldReader::new(&[0x00, 0x0A]);
        assert!(matches!(
            reader.game_number(),
            Err(Error::InvalidBcd { byte: 0x0A, .. })
        ));
    }

    #[test]
    fn test_trailing_data() {
        let mut reader = FieldReader::new(&[0x01, 0x02, 0x03]);
        reader.u8().unwrap();
        assert_eq!(reader.finish(), Err(Error::TrailingData { remaining: 2 }));
    }

    #[test]
    fn test_length_prefixed_exact() {
        let mut reader = FieldReader::new(&[0x02, 0xAA, 0xBB]);
        let mut inner = reader.length_prefixed_exact().unwrap();
        assert_eq!(inner.rest(), &[0xAA, 0xBB]);
        assert!(reader.is_empty());

        for data in [[0x01, 0xAA, 0xBB], [0x03, 0xAA, 0xBB]] {
            let mut reader = FieldReader::new(&data);
            assert!(matches!(
                reader.length_prefixed_exact(),
                Err(Error::LengthMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_tagged_records_unknown_codes_skipped() {
        let data = [0x7E, 0x02, b'X', b'Y', 0x10, 0x03, b'A', b'B', b'C'];
        let records = TaggedRecords::parse(&data, SPECS).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records.get(0x10).as_str(), Some("ABC"));
        assert!(records.get(0x7E).is_default());
    }

    #[test]
    fn test_tagged_records_overrun() {
        // second record claims 4 bytes, 3 present
        let data = [0x00, 0x01, b'A', 0x10, 0x04, b'A', b'B', b'C'];
        assert!(matches!(
            TaggedRecords::parse(&data, SPECS),
            Err(Error::PayloadTooShort { .. })
        ));
    }

    #[test]
    fn test_tagged_records_dangling_header() {
        let data = [0x00, 0x01, b'A', 0x10];
        assert!(TaggedRecords::parse(&data, SPECS).is_err());
    }

    #[test]
    fn test_tagged_records_cap() {
        let mut data = vec![0x10, 17];
        data.extend_from_slice(&[b'T'; 17]);
        assert_eq!(
            TaggedRecords::parse(&data, SPECS),
            Err(Error::FieldTooLong {
                code: 0x10,
                max: 16,
                actual: 17
            })
        );
    }

    #[test]
    fn test_field_value_resolve() {
        assert_eq!(FieldValue::Default.resolve("HOUSE"), "HOUSE");
        assert_eq!(FieldValue::Blank.resolve("HOUSE"), "");
        assert_eq!(FieldValue::Value("MINE".to_string()).resolve("HOUSE"), "MINE");
    }

    #[test]
    fn test_field_value_non_ascii() {
        assert!(FieldValue::from_bytes(0x00, &[0xC3, 0xA9], 40).is_err());
    }
}
