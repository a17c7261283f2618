//! Reply builder.
//!
//! Replies start with the echoed address and command code. Variable-length
//! replies reserve their length byte with [`ReplyBuilder::length`]; `build`
//! fills it in and rejects content over 255 bytes. List encoders check
//! [`ReplyBuilder::remaining_content`] to stop before the cap.

use crate::{bcd, frame::Reply};
use bytes::{BufMut, BytesMut};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sas_core::{
    Error, Result,
    constants::{GAME_NUMBER_LENGTH, MAX_CONTENT_LENGTH},
};

/// Builder for long poll replies with a fluent API
///
/// Every reply starts with the echoed address and command code. Numeric
/// writers are fallible: a value that does not fit its field is an error,
/// never a truncated field.
///
/// A reply may carry one content-length byte. [`ReplyBuilder::length`] reserves
/// it at the current position and [`ReplyBuilder::build`] fills it with the
/// number of bytes written after it.
///
/// # Example
/// ```
/// use sas_protocol::ReplyBuilder;
///
/// let reply = ReplyBuilder::new(0x01, 0x54)
///     .length()
///     .bytes(b"603")
///     .bytes(b"SN42")
///     .build()
///     .unwrap();
///
/// assert_eq!(reply.as_bytes(), b"\x01\x54\x07603SN42");
/// ```
#[derive(Debug, Clone)]
pub struct ReplyBuilder {
    buf: BytesMut,
    length_at: Option<usize>,
}

impl ReplyBuilder {
    /// Create a builder for a reply echoing `address` and `code`
    pub fn new(address: u8, code: u8) -> Self {
        let mut buf = BytesMut::with_capacity(32);
        buf.put_u8(address);
        buf.put_u8(code);
        ReplyBuilder {
            buf,
            length_at: None,
        }
    }

    /// Reserve the content-length byte at the current position
    pub fn length(mut self) -> Self {
        self.length_at = Some(self.buf.len());
        self.buf.put_u8(0);
        self
    }

    /// Bytes written after the length byte (or after the header when the
    /// reply has no length byte)
    pub fn content_len(&self) -> usize {
        match self.length_at {
            Some(at) => self.buf.len() - at - 1,
            None => self.buf.len() - 2,
        }
    }

    /// Content bytes still available under the one-byte length budget
    pub fn remaining_content(&self) -> usize {
        MAX_CONTENT_LENGTH.saturating_sub(self.content_len())
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.buf.put_u8(value);
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.buf.put_slice(value);
        self
    }

    /// Fixed-width BCD field
    ///
    /// # Errors
    /// Returns `Error::BcdOverflow` if the value does not fit.
    pub fn bcd(self, value: u64, width: usize) -> Result<Self> {
        let encoded = bcd::to_bcd(value, width)?;
        Ok(self.bytes(&encoded))
    }

    /// Size byte followed by the value in the fewest BCD bytes that hold it
    pub fn sized_bcd(self, value: u64) -> Result<Self> {
        let width = bcd::min_bcd_width(value);
        self.u8(width as u8).bcd(value, width)
    }

    /// 2-byte BCD game number
    pub fn game_number(self, game_number: u16) -> Result<Self> {
        self.bcd(u64::from(game_number), GAME_NUMBER_LENGTH)
    }

    /// Big-endian binary field
    pub fn binary(self, value: u64, width: usize) -> Result<Self> {
        let encoded = bcd::to_binary(value, width)?;
        Ok(self.bytes(&encoded))
    }

    /// Least significant byte first binary field
    pub fn binary_le(self, value: u64, width: usize) -> Result<Self> {
        let encoded = bcd::to_binary_le(value, width)?;
        Ok(self.bytes(&encoded))
    }

    pub fn u16_le(mut self, value: u16) -> Self {
        self.buf.put_u16_le(value);
        self
    }

    pub fn u32_be(mut self, value: u32) -> Self {
        self.buf.put_u32(value);
        self
    }

    pub fn u32_le(mut self, value: u32) -> Self {
        self.buf.put_u32_le(value);
        self
    }

    /// Fixed-width ASCII field, see [`bcd::fit_ascii`]
    pub fn ascii(self, text: &str, width: usize) -> Self {
        let fitted = bcd::fit_ascii(text, width);
        self.bytes(&fitted)
    }

    /// Length byte followed by at most `max` ASCII characters of `text`
    pub fn prefixed_ascii(self, text: &str, max: usize) -> Self {
        let capped = bcd::ascii_prefix(text, max);
        self.u8(capped.len() as u8).bytes(&capped)
    }

    /// 4-byte BCD `MMDDYYYY` date
    pub fn date(self, date: NaiveDate) -> Result<Self> {
        let encoded = bcd::date_to_bcd(date)?;
        Ok(self.bytes(&encoded))
    }

    /// 3-byte BCD `HHMMSS` time
    pub fn time(self, time: NaiveTime) -> Result<Self> {
        let encoded = bcd::time_to_bcd(time)?;
        Ok(self.bytes(&encoded))
    }

    /// Date followed by time
    pub fn date_time(self, value: NaiveDateTime) -> Result<Self> {
        self.date(value.date())?.time(value.time())
    }

    /// Finish the reply, filling in the length byte
    ///
    /// # Errors
    /// Returns `Error::BinaryOverflow` if the content after the length byte
    /// exceeds 255 bytes.
    pub fn build(mut self) -> Result<Reply> {
        if let Some(at) = self.length_at {
            let content = self.buf.len() - at - 1;
            let length = u8::try_from(content).map_err(|_| Error::BinaryOverflow {
                value: content as u64,
                bytes: 1,
            })?;
            self.buf[at] = length;
        }
        Ok(Reply::Data(self.buf.freeze()))
    }
}
