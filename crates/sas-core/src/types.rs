use crate::{
    Result,
    constants::{MAX_ADDRESS, MIN_ADDRESS, NACK_BIT},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gaming machine address (1-127)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(u8);

impl Address {
    /// Create a new address with validation.
    ///
    /// # Errors
    /// Returns `Error::Config` if the address is outside the valid range (1-127).
    pub fn new(address: u8) -> Result<Self> {
        if !(MIN_ADDRESS..=MAX_ADDRESS).contains(&address) {
            return Err(Error::config(format!(
                "Address must be {MIN_ADDRESS}-{MAX_ADDRESS}, got {address}"
            )));
        }
        Ok(Address(address))
    }

    /// Get the raw address as u8.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Address byte with the NACK bit set.
    #[must_use]
    pub fn nack_byte(&self) -> u8 {
        self.0 | NACK_BIT
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

impl TryFrom<u8> for Address {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Address::new(value)
    }
}

/// Denomination code table: code, value in millicents (1/1000 of a cent).
const DENOMINATION_TABLE: [(u8, u64); 31] = [
    (0x01, 1_000),
    (0x02, 5_000),
    (0x03, 10_000),
    (0x04, 25_000),
    (0x05, 50_000),
    (0x06, 100_000),
    (0x07, 500_000),
    (0x08, 1_000_000),
    (0x09, 2_000_000),
    (0x0A, 10_000_000),
    (0x0B, 20_000),
    (0x0C, 200_000),
    (0x0D, 250_000),
    (0x0E, 2_500_000),
    (0x0F, 5_000_000),
    (0x10, 20_000_000),
    (0x11, 25_000_000),
    (0x12, 50_000_000),
    (0x13, 100_000_000),
    (0x14, 200_000_000),
    (0x15, 250_000_000),
    (0x16, 500_000_000),
    (0x17, 2_000),
    (0x18, 3_000),
    (0x19, 15_000),
    (0x1A, 40_000),
    (0x1B, 500),
    (0x1C, 250),
    (0x1D, 200),
    (0x1E, 100),
    (0x1F, 50),
];

/// A denomination from the fixed SAS denomination code table.
///
/// Only codes present in the table can be represented; code `0x00` ("no
/// denomination") is modelled as `Option::<Denomination>::None` by callers.
///
/// # Examples
///
/// ```
/// use sas_core::Denomination;
///
/// let quarter = Denomination::from_code(0x04).unwrap();
/// assert_eq!(quarter.cents(), 25);
/// assert_eq!(Denomination::from_millicents(25_000), Some(quarter));
///
/// assert!(Denomination::from_code(0x00).is_none());
/// assert!(Denomination::from_code(0x20).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Denomination(u8);

impl Denomination {
    /// Look up a denomination by its wire code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        DENOMINATION_TABLE
            .iter()
            .any(|&(c, _)| c == code)
            .then_some(Denomination(code))
    }

    /// Look up a denomination by its value in millicents.
    #[must_use]
    pub fn from_millicents(millicents: u64) -> Option<Self> {
        DENOMINATION_TABLE
            .iter()
            .find(|&&(_, value)| value == millicents)
            .map(|&(code, _)| Denomination(code))
    }

    /// Look up a whole-cent denomination.
    #[must_use]
    pub fn from_cents(cents: u64) -> Option<Self> {
        cents
            .checked_mul(1_000)
            .and_then(Self::from_millicents)
    }

    /// Wire code of this denomination.
    #[must_use]
    pub fn code(self) -> u8 {
        self.0
    }

    /// Value in millicents.
    #[must_use]
    pub fn millicents(self) -> u64 {
        DENOMINATION_TABLE
            .iter()
            .find(|&&(code, _)| code == self.0)
            .map(|&(_, value)| value)
            .unwrap_or_default()
    }

    /// Value in whole cents (fractional-cent denominations round down to 0).
    #[must_use]
    pub fn cents(self) -> u64 {
        self.millicents() / 1_000
    }

    /// All denominations in code order.
    pub fn all() -> impl Iterator<Item = Denomination> {
        DENOMINATION_TABLE.iter().map(|&(code, _)| Denomination(code))
    }
}

impl TryFrom<u8> for Denomination {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Denomination::from_code(code).ok_or(Error::invalid_code("denomination", code))
    }
}

impl From<Denomination> for u8 {
    fn from(denom: Denomination) -> u8 {
        denom.code()
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let millicents = self.millicents();
        write!(f, "${}.{:05}", millicents / 100_000, millicents % 100_000)
    }
}

/// SAS meter code.
///
/// Codes below 0x100 come from the SAS meter table and can be requested by
/// the selected-meter long polls. Codes in the `0xFF00` range are machine
/// counters reported only by fixed-layout meter polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeterCode(pub u16);

impl MeterCode {
    pub const TOTAL_COIN_IN: MeterCode = MeterCode(0x00);
    pub const TOTAL_COIN_OUT: MeterCode = MeterCode(0x01);
    pub const TOTAL_JACKPOT: MeterCode = MeterCode(0x02);
    pub const TOTAL_HAND_PAID_CANCELLED_CREDITS: MeterCode = MeterCode(0x03);
    pub const TOTAL_CANCELLED_CREDITS: MeterCode = MeterCode(0x04);
    pub const GAMES_PLAYED: MeterCode = MeterCode(0x05);
    pub const GAMES_WON: MeterCode = MeterCode(0x06);
    pub const GAMES_LOST: MeterCode = MeterCode(0x07);
    pub const TRUE_COIN_IN: MeterCode = MeterCode(0x08);
    pub const TRUE_COIN_OUT: MeterCode = MeterCode(0x09);
    pub const TOTAL_BILLS: MeterCode = MeterCode(0x0B);
    pub const CURRENT_CREDITS: MeterCode = MeterCode(0x0C);
    pub const CASHABLE_TICKET_IN_CENTS: MeterCode = MeterCode(0x0D);
    pub const CASHABLE_TICKET_OUT_CENTS: MeterCode = MeterCode(0x0E);
    pub const RESTRICTED_TICKET_IN_CENTS: MeterCode = MeterCode(0x0F);
    pub const RESTRICTED_TICKET_OUT_CENTS: MeterCode = MeterCode(0x10);
    pub const TOTAL_DROP: MeterCode = MeterCode(0x24);
    pub const GAMES_SINCE_POWER_UP: MeterCode = MeterCode(0x25);
    pub const GAMES_SINCE_DOOR_CLOSE: MeterCode = MeterCode(0x26);
    pub const BILLS_1: MeterCode = MeterCode(0x40);
    pub const BILLS_2: MeterCode = MeterCode(0x41);
    pub const BILLS_5: MeterCode = MeterCode(0x42);
    pub const BILLS_10: MeterCode = MeterCode(0x43);
    pub const BILLS_20: MeterCode = MeterCode(0x44);
    pub const BILLS_50: MeterCode = MeterCode(0x46);
    pub const BILLS_100: MeterCode = MeterCode(0x47);
    pub const BILLS_200: MeterCode = MeterCode(0x48);
    pub const BILLS_500: MeterCode = MeterCode(0x4A);
    pub const BILLS_1000: MeterCode = MeterCode(0x4B);
    pub const SLOT_DOOR_OPENED: MeterCode = MeterCode(0xFF01);
    pub const POWER_RESET: MeterCode = MeterCode(0xFF02);
    pub const HOPPER_LEVEL: MeterCode = MeterCode(0xFF03);

    /// Width in BCD bytes used when this meter is reported by a
    /// selected-meter long poll.
    ///
    /// Currency meters kept in cents (0x0D-0x10 and the even codes of the
    /// 0x80 block) are five bytes wide, all others four.
    ///
    /// # Examples
    ///
    /// ```
    /// use sas_core::MeterCode;
    ///
    /// assert_eq!(MeterCode::TOTAL_COIN_IN.bcd_width(), 4);
    /// assert_eq!(MeterCode::CASHABLE_TICKET_IN_CENTS.bcd_width(), 5);
    /// assert_eq!(MeterCode(0x80).bcd_width(), 5);
    /// assert_eq!(MeterCode(0x81).bcd_width(), 4);
    /// ```
    #[must_use]
    pub fn bcd_width(self) -> usize {
        match self.0 {
            0x0D..=0x10 => 5,
            0x80..=0xFE if self.0 % 2 == 0 => 5,
            _ => 4,
        }
    }

    /// Raw code value.
    #[must_use]
    pub fn as_u16(self) -> u16 {
        self.0
    }
}

impl From<u8> for MeterCode {
    fn from(code: u8) -> Self {
        MeterCode(u16::from(code))
    }
}

impl fmt::Display for MeterCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}
