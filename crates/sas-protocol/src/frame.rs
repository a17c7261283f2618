//! Long poll frame envelope.
//!
//! Every inbound long poll starts with the machine address and the command
//! code. Polls with request data end with a CRC-16 sent least significant
//! byte first:
//!
//! ```text
//! [address][code][payload...][crc lo][crc hi]
//! ```
//!
//! Replies echo the address. The three canonical short replies are:
//!
//! | Reply | Bytes                  |
//! |-------|------------------------|
//! | ACK   | `[address]`            |
//! | NACK  | `[address \| 0x80]`    |
//! | Busy  | `[address, 0x00]`      |
//!
//! A fourth outcome, [`Reply::NoReply`], means the machine stays silent. It is
//! distinct from both ACK and NACK.

use crate::{builder::ReplyBuilder, commands::LongPollCode};
use bytes::{BufMut, Bytes, BytesMut};
use sas_core::{
    Error, Result,
    constants::{BUSY_MARKER, CRC_LENGTH, HEADER_LENGTH, NACK_BIT},
};
use std::fmt;

/// CRC-16 used on SAS links (CRC-16/KERMIT, polynomial 0x1021 reflected).
///
/// # Example
/// ```
/// use sas_protocol::crc16;
///
/// assert_eq!(crc16(b"123456789"), 0x2189);
/// ```
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        let mut q = (crc ^ u16::from(byte)) & 0x0F;
        crc = (crc >> 4) ^ (q * 0x1081);
        q = (crc ^ (u16::from(byte) >> 4)) & 0x0F;
        crc = (crc >> 4) ^ (q * 0x1081);
    }
    crc
}

/// Borrowed view of one inbound long poll, CRC excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongPoll<'a> {
    address: u8,
    code: u8,
    payload: &'a [u8],
}

impl<'a> LongPoll<'a> {
    pub fn new(address: u8, code: u8, payload: &'a [u8]) -> Self {
        Self {
            address,
            code,
            payload,
        }
    }

    /// Split `[address, code, payload...]` into a long poll view.
    ///
    /// # Errors
    /// Returns `Error::PayloadTooShort` if fewer than two bytes are given.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        match bytes {
            [address, code, payload @ ..] => Ok(Self::new(*address, *code, payload)),
            _ => Err(Error::PayloadTooShort {
                needed: HEADER_LENGTH,
                available: bytes.len(),
            }),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Raw command byte (byte 1 of the frame).
    pub fn command_code(&self) -> u8 {
        self.code
    }

    /// Typed command code, if the byte is a supported long poll.
    pub fn command(&self) -> Option<LongPollCode> {
        LongPollCode::from_u8(self.code).ok()
    }

    /// Request data following the command code.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn ack(&self) -> Reply {
        Reply::ack(self.address)
    }

    pub fn nack(&self) -> Reply {
        Reply::nack(self.address)
    }

    pub fn busy(&self) -> Reply {
        Reply::busy(self.address)
    }

    /// Start a data reply that echoes this poll's address and code.
    pub fn reply(&self) -> ReplyBuilder {
        ReplyBuilder::new(self.address, self.code)
    }
}

impl fmt::Display for LongPoll<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "address {} code 0x{:02X} ({} payload bytes)",
            self.address,
            self.code,
            self.payload.len()
        )
    }
}

/// Owned inbound frame as delivered by the transport.
///
/// # Example
/// ```
/// use sas_protocol::{Frame, crc16};
///
/// let mut raw = vec![0x01, 0x01];
/// raw.extend_from_slice(&crc16(&raw).to_le_bytes());
///
/// let frame = Frame::from_bytes(&raw, true);
/// assert!(frame.verify_crc().unwrap());
///
/// let poll = frame.long_poll().unwrap();
/// assert_eq!(poll.address(), 0x01);
/// assert_eq!(poll.command_code(), 0x01);
/// assert!(poll.payload().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw bytes, CRC included when `has_crc` is set
    data: Bytes,

    /// Whether the last two bytes are a CRC
    has_crc: bool,
}

impl Frame {
    pub fn new(data: Bytes, has_crc: bool) -> Self {
        Frame { data, has_crc }
    }

    pub fn from_bytes(bytes: &[u8], has_crc: bool) -> Self {
        Self::new(Bytes::copy_from_slice(bytes), has_crc)
    }

    /// Build a frame from raw link bytes, deciding CRC presence from the
    /// command code.
    ///
    /// Unknown codes are assumed to carry a CRC when more than the two header
    /// bytes are present.
    pub fn from_wire(bytes: &[u8]) -> Self {
        let has_crc = match bytes.get(1).map(|code| LongPollCode::from_u8(*code)) {
            Some(Ok(code)) => code.has_crc(),
            Some(Err(_)) => bytes.len() > HEADER_LENGTH,
            None => false,
        };
        Self::from_bytes(bytes, has_crc)
    }

    /// Frame a poll for sending, appending the CRC.
    pub fn encode(address: u8, code: u8, payload: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(HEADER_LENGTH + payload.len() + CRC_LENGTH);
        buf.put_u8(address);
        buf.put_u8(code);
        buf.put_slice(payload);
        let crc = crc16(&buf);
        buf.put_u16_le(crc);
        Frame {
            data: buf.freeze(),
            has_crc: true,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn has_crc(&self) -> bool {
        self.has_crc
    }

    /// Bytes covered by the CRC (everything but the CRC itself).
    fn body(&self) -> &[u8] {
        if self.has_crc && self.data.len() >= CRC_LENGTH {
            &self.data[..self.data.len() - CRC_LENGTH]
        } else {
            &self.data
        }
    }

    /// CRC carried by the frame, if any.
    pub fn crc(&self) -> Option<u16> {
        if !self.has_crc || self.data.len() < HEADER_LENGTH + CRC_LENGTH {
            return None;
        }
        let tail = &self.data[self.data.len() - CRC_LENGTH..];
        Some(u16::from_le_bytes([tail[0], tail[1]]))
    }

    /// CRC computed over the frame body.
    pub fn calculate_crc(&self) -> u16 {
        crc16(self.body())
    }

    /// Verify the trailing CRC.
    ///
    /// Returns `Ok(false)` for frames without a CRC.
    ///
    /// # Errors
    /// Returns `Error::CrcMismatch` if the carried CRC does not match.
    pub fn verify_crc(&self) -> Result<bool> {
        let Some(actual) = self.crc() else {
            return Ok(false);
        };
        let expected = self.calculate_crc();
        if expected != actual {
            return Err(Error::CrcMismatch { expected, actual });
        }
        Ok(true)
    }

    /// Long poll view over the frame, CRC stripped.
    ///
    /// # Errors
    /// Returns `Error::PayloadTooShort` if the frame has no address and code.
    pub fn long_poll(&self) -> Result<LongPoll<'_>> {
        let needed = if self.has_crc {
            HEADER_LENGTH + CRC_LENGTH
        } else {
            HEADER_LENGTH
        };
        if self.data.len() < needed {
            return Err(Error::PayloadTooShort {
                needed,
                available: self.data.len(),
            });
        }
        LongPoll::from_bytes(self.body())
    }
}

impl From<Bytes> for Frame {
    fn from(data: Bytes) -> Self {
        Frame::new(data, false)
    }
}

/// Outcome of parsing one long poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Bytes to send back, CRC excluded
    Data(Bytes),

    /// Protocol silence: nothing is sent
    NoReply,
}

impl Reply {
    /// `[address]`
    pub fn ack(address: u8) -> Self {
        Reply::Data(Bytes::copy_from_slice(&[address]))
    }

    /// `[address | 0x80]`
    pub fn nack(address: u8) -> Self {
        Reply::Data(Bytes::copy_from_slice(&[address | NACK_BIT]))
    }

    /// `[address, 0x00]`
    pub fn busy(address: u8) -> Self {
        Reply::Data(Bytes::copy_from_slice(&[address, BUSY_MARKER]))
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        Reply::Data(Bytes::copy_from_slice(bytes))
    }

    /// Reply bytes; empty for [`Reply::NoReply`].
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Reply::Data(bytes) => bytes,
            Reply::NoReply => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn is_no_reply(&self) -> bool {
        matches!(self, Reply::NoReply)
    }

    /// Single byte reply without the NACK bit.
    pub fn is_ack(&self) -> bool {
        matches!(self.as_bytes(), [byte] if byte & NACK_BIT == 0)
    }

    /// Single byte reply with the NACK bit set.
    pub fn is_nack(&self) -> bool {
        matches!(self.as_bytes(), [byte] if byte & NACK_BIT != 0)
    }

    /// Reply with a CRC appended, ready for the link. `None` when silent.
    pub fn with_crc(&self) -> Option<Bytes> {
        match self {
            Reply::NoReply => None,
            Reply::Data(bytes) => {
                let mut buf = BytesMut::with_capacity(bytes.len() + CRC_LENGTH);
                buf.put_slice(bytes);
                buf.put_u16_le(crc16(bytes));
                Some(buf.freeze())
            }
        }
    }

    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            Reply::Data(bytes) => Some(bytes),
            Reply::NoReply => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::NoReply => write!(f, "<no reply>"),
            Reply::Data(bytes) => {
                for (index, byte) in bytes.iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
        }
    }
}
