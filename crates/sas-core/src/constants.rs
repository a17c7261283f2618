//! Core constants for the SAS long-poll implementation.
//!
//! This module defines the wire-level constants shared by the codec and the
//! per-command parsers. They are fixed by the hardware protocol; changing any
//! of them breaks interoperability with gaming machines and hosts.
//!
//! # Frame Structure
//!
//! ```text
//! inbound:  [ADDRESS][COMMAND][PAYLOAD...][CRC_LO][CRC_HI]
//! outbound: [ADDRESS][COMMAND]?[LENGTH]?[PAYLOAD...]
//! ```
//!
//! Where:
//! - `ADDRESS` - Gaming machine address (1-127), echoed in every reply
//! - `COMMAND` - Long poll code
//! - `LENGTH` - Optional content length (bytes after the length byte)
//! - `CRC` - CRC-16/KERMIT, least significant byte first
//!
//! # Usage
//!
//! ```
//! use sas_core::constants::*;
//!
//! let address = 0x01;
//! assert_eq!(address | NACK_BIT, 0x81);
//! assert_eq!(MAX_CONTENT_LENGTH, 255);
//! ```

// ============================================================================
// Addressing
// ============================================================================

/// Lowest valid gaming machine address.
pub const MIN_ADDRESS: u8 = 1;

/// Highest valid gaming machine address.
pub const MAX_ADDRESS: u8 = 127;

/// Bit ORed into the echoed address byte to signal a negative acknowledgment.
///
/// # Examples
///
/// ```
/// use sas_core::constants::NACK_BIT;
///
/// assert_eq!(0x01 | NACK_BIT, 0x81);
/// ```
pub const NACK_BIT: u8 = 0x80;

/// Second byte of the "device busy" reply: `[address, BUSY_MARKER]`.
pub const BUSY_MARKER: u8 = 0x00;

// ============================================================================
// Frame Layout
// ============================================================================

/// Number of header bytes (address + command code) in every frame.
pub const HEADER_LENGTH: usize = 2;

/// Number of CRC bytes appended to type S and type M frames.
pub const CRC_LENGTH: usize = 2;

/// Maximum number of content bytes a one-byte length field can describe.
pub const MAX_CONTENT_LENGTH: usize = 255;

// ============================================================================
// Field Widths
// ============================================================================

/// Width in bytes of a BCD game number.
pub const GAME_NUMBER_LENGTH: usize = 2;

/// Highest game number representable in four BCD digits.
pub const MAX_GAME_NUMBER: u16 = 9999;

/// Width in bytes of a standard BCD meter.
pub const METER_LENGTH: usize = 4;

/// Width in bytes of a BCD currency amount (cents).
pub const AMOUNT_LENGTH: usize = 5;

/// Width in bytes of an AFT registration key.
pub const REGISTRATION_KEY_LENGTH: usize = 20;

/// Maximum length of an AFT transaction ID.
pub const MAX_TRANSACTION_ID_LENGTH: usize = 20;

/// Maximum length of the gaming machine serial number (long poll 0x54).
pub const MAX_SERIAL_NUMBER_LENGTH: usize = 40;

/// Maximum length of the floor location (long poll 0xB7).
pub const MAX_FLOOR_LOCATION_LENGTH: usize = 32;

/// Maximum length of ticket location and address lines.
pub const MAX_TICKET_TEXT_LENGTH: usize = 40;

/// Maximum length of restricted and debit ticket titles.
pub const MAX_TICKET_TITLE_LENGTH: usize = 16;

/// Maximum length of an AFT receipt line.
pub const MAX_RECEIPT_LINE_LENGTH: usize = 22;

/// Maximum length of game and paytable names (long poll 0xB5).
pub const MAX_GAME_NAME_LENGTH: usize = 20;

/// Highest progressive level number.
pub const MAX_PROGRESSIVE_LEVEL: u8 = 32;

// ============================================================================
// Multi-Denomination Preamble
// ============================================================================

/// Denomination code meaning "no specific denomination" in the preamble.
pub const LEGACY_DENOMINATION_CODE: u8 = 0x00;

// ============================================================================
// Defaults
// ============================================================================

/// Default SAS version reported by long poll 0x54.
pub const DEFAULT_SAS_VERSION: &str = "603";

/// Default gaming machine address.
pub const DEFAULT_ADDRESS: u8 = 1;
