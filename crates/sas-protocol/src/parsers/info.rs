//! Machine information and event polls.

use crate::{
    commands::LongPollCode,
    frame::{LongPoll, Reply},
    handler::SharedHandler,
    parser::{LongPollParser, respond},
    validation::{expect_empty, expect_len},
};
use chrono::NaiveDateTime;
use sas_core::{
    Result,
    constants::{AMOUNT_LENGTH, MAX_SERIAL_NUMBER_LENGTH, METER_LENGTH},
};
use serde::{Deserialize, Serialize};

/// Pending handpay, reported by 0x1B.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandpayInfo {
    pub progressive_group: u8,
    pub level: u8,
    /// Amount in credits
    pub amount: u64,
    pub partial_pay: u16,
    pub reset_id: u8,
}

/// 0x1B send handpay information.
///
/// `[address, 1B, group, level, amount (BCD 5), partial pay (BCD 2), reset ID]`.
/// With no pending handpay every field is zero.
pub struct HandpayInfoParser {
    handler: SharedHandler<(), HandpayInfo>,
}

impl HandpayInfoParser {
    pub fn new(handler: SharedHandler<(), HandpayInfo>) -> Self {
        HandpayInfoParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let info = self.handler.handle(()).unwrap_or_default();

        poll.reply()
            .u8(info.progressive_group)
            .u8(info.level)
            .bcd(info.amount, AMOUNT_LENGTH)?
            .bcd(u64::from(info.partial_pay), 2)?
            .u8(info.reset_id)
            .build()
    }
}

impl LongPollParser for HandpayInfoParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendHandpayInformation
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0x21 ROM signature verification.
///
/// The request carries a 2-byte seed (LSB first); the reply carries the
/// signature the same way. The machine stays silent until it has a signature.
pub struct RomSignatureParser {
    handler: SharedHandler<u16, u16>,
}

impl RomSignatureParser {
    pub fn new(handler: SharedHandler<u16, u16>) -> Self {
        RomSignatureParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 2)?;
        let seed = u16::from_le_bytes([poll.payload()[0], poll.payload()[1]]);

        match self.handler.handle(seed) {
            Some(signature) => poll.reply().u16_le(signature).build(),
            None => Ok(Reply::NoReply),
        }
    }
}

impl LongPollParser for RomSignatureParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::RomSignatureVerification
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastAcceptedBill {
    pub country_code: u8,
    pub denomination_code: u8,
    pub count: u32,
}

/// 0x48 send last accepted bill information.
///
/// `[address, 48, country (BCD 1), denomination (BCD 1), count (BCD 4)]`.
pub struct LastAcceptedBillParser {
    handler: SharedHandler<(), LastAcceptedBill>,
}

impl LastAcceptedBillParser {
    pub fn new(handler: SharedHandler<(), LastAcceptedBill>) -> Self {
        LastAcceptedBillParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let bill = self.handler.handle(()).unwrap_or_default();

        poll.reply()
            .bcd(u64::from(bill.country_code), 1)?
            .bcd(u64::from(bill.denomination_code), 1)?
            .bcd(u64::from(bill.count), METER_LENGTH)?
            .build()
    }
}

impl LongPollParser for LastAcceptedBillParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendLastAcceptedBill
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0x54 send SAS version ID and machine serial number.
///
/// `[address, 54, length, version (3), serial (0-40)]`. The version comes
/// from the client configuration; a missing serial number is sent empty.
pub struct VersionAndSerialParser {
    sas_version: String,
    handler: SharedHandler<(), String>,
}

impl VersionAndSerialParser {
    pub fn new(sas_version: impl Into<String>, handler: SharedHandler<(), String>) -> Self {
        VersionAndSerialParser {
            sas_version: sas_version.into(),
            handler,
        }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let serial = self.handler.handle(()).unwrap_or_default();
        let serial = crate::bcd::ascii_prefix(&serial, MAX_SERIAL_NUMBER_LENGTH);

        poll.reply()
            .length()
            .ascii(&self.sas_version, 3)
            .bytes(&serial)
            .build()
    }
}

impl LongPollParser for VersionAndSerialParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendVersionAndSerialNumber
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Cashout type reported when nothing is pending.
pub const NO_PENDING_CASHOUT: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCashout {
    pub cashout_type: u8,
    /// Amount in cents
    pub amount: u64,
}

impl Default for PendingCashout {
    fn default() -> Self {
        PendingCashout {
            cashout_type: NO_PENDING_CASHOUT,
            amount: 0,
        }
    }
}

/// 0x57 send pending cashout information: `[address, 57, type, amount (BCD 5)]`.
pub struct PendingCashoutParser {
    handler: SharedHandler<(), PendingCashout>,
}

impl PendingCashoutParser {
    pub fn new(handler: SharedHandler<(), PendingCashout>) -> Self {
        PendingCashoutParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let pending = self.handler.handle(()).unwrap_or_default();

        poll.reply()
            .u8(pending.cashout_type)
            .bcd(pending.amount, AMOUNT_LENGTH)?
            .build()
    }
}

impl LongPollParser for PendingCashoutParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendPendingCashoutInformation
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0x7E send current date and time: `[address, 7E, MMDDYYYY, HHMMSS]`.
pub struct SendDateTimeParser {
    handler: SharedHandler<(), NaiveDateTime>,
}

impl SendDateTimeParser {
    pub fn new(handler: SharedHandler<(), NaiveDateTime>) -> Self {
        SendDateTimeParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        match self.handler.handle(()) {
            Some(now) => poll.reply().date_time(now)?.build(),
            None => Ok(poll.nack()),
        }
    }
}

impl LongPollParser for SendDateTimeParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendDateTime
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Poker hand, reported by 0x8E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    /// 0x00 dealt hand, 0x01 final hand
    pub hand_type: u8,
    pub cards: [u8; 5],
}

/// 0x8E send card information: `[address, 8E, hand type, 5 cards]`.
pub struct CardInfoParser {
    handler: SharedHandler<(), CardInfo>,
}

impl CardInfoParser {
    pub fn new(handler: SharedHandler<(), CardInfo>) -> Self {
        CardInfoParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        match self.handler.handle(()) {
            Some(hand) => poll.reply().u8(hand.hand_type).bytes(&hand.cards).build(),
            None => Ok(poll.nack()),
        }
    }
}

impl LongPollParser for CardInfoParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendCardInformation
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0x8F send physical reel stop information: `[address, 8F, 9 stops]`.
pub struct ReelStopParser {
    handler: SharedHandler<(), [u8; 9]>,
}

impl ReelStopParser {
    pub fn new(handler: SharedHandler<(), [u8; 9]>) -> Self {
        ReelStopParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        match self.handler.handle(()) {
            Some(stops) => poll.reply().bytes(&stops).build(),
            None => Ok(poll.nack()),
        }
    }
}

impl LongPollParser for ReelStopParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendReelStopInformation
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandpayResetStatus {
    Reset = 0x00,
    UnableToReset = 0x01,
    NotInHandpay = 0x02,
}

/// 0x94 remote handpay reset: `[address, 94, reset code]`.
pub struct RemoteHandpayResetParser {
    handler: SharedHandler<(), HandpayResetStatus>,
}

impl RemoteHandpayResetParser {
    pub fn new(handler: SharedHandler<(), HandpayResetStatus>) -> Self {
        RemoteHandpayResetParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        match self.handler.handle(()) {
            Some(status) => poll.reply().u8(status as u8).build(),
            None => Ok(poll.nack()),
        }
    }
}

impl LongPollParser for RemoteHandpayResetParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::RemoteHandpayReset
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[test]
    fn test_handpay_info() {
        let parser = HandpayInfoParser::new(Arc::new(|()| {
            Some(HandpayInfo {
                progressive_group: 1,
                level: 2,
                amount: 125_000,
                partial_pay: 50,
                reset_id: 0,
            })
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0x1B, &[]));
        assert_eq!(
            reply.as_bytes(),
            &[0x01, 0x1B, 0x01, 0x02, 0x00, 0x00, 0x12, 0x50, 0x00, 0x00, 0x50, 0x00]
        );
    }

    #[test]
    fn test_handpay_info_defaults_to_zero() {
        let parser = HandpayInfoParser::new(Arc::new(|()| None::<HandpayInfo>));
        let reply = parser.parse(&LongPoll::new(0x01, 0x1B, &[]));
        assert_eq!(reply.len(), 12);
        assert!(reply.as_bytes()[2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_rom_signature() {
        let parser = RomSignatureParser::new(Arc::new(|seed: u16| (seed == 0x1234).then_some(0xBEEFu16)));
        let reply = parser.parse(&LongPoll::new(0x01, 0x21, &[0x34, 0x12]));
        assert_eq!(reply.as_bytes(), &[0x01, 0x21, 0xEF, 0xBE]);

        let reply = parser.parse(&LongPoll::new(0x01, 0x21, &[0x00, 0x00]));
        assert!(reply.is_no_reply());

        let reply = parser.parse(&LongPoll::new(0x01, 0x21, &[0x00]));
        assert!(reply.is_nack());
    }

    #[test]
    fn test_last_accepted_bill() {
        let parser = LastAcceptedBillParser::new(Arc::new(|()| {
            Some(LastAcceptedBill {
                country_code: 51,
                denomination_code: 5,
                count: 1_024,
            })
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0x48, &[]));
        assert_eq!(
            reply.as_bytes(),
            &[0x01, 0x48, 0x51, 0x05, 0x00, 0x00, 0x10, 0x24]
        );
    }

    #[test]
    fn test_version_and_serial() {
        let parser = VersionAndSerialParser::new("603", Arc::new(|()| Some("SN-0042".to_string())));
        let reply = parser.parse(&LongPoll::new(0x01, 0x54, &[]));
        assert_eq!(reply.as_bytes(), b"\x01\x54\x0A603SN-0042");
    }

    #[test]
    fn test_version_and_serial_caps_serial() {
        let parser = VersionAndSerialParser::new("603", Arc::new(|()| Some("9".repeat(50))));
        let reply = parser.parse(&LongPoll::new(0x01, 0x54, &[]));
        assert_eq!(reply.as_bytes()[2], 43);
        assert_eq!(reply.len(), 46);
    }

    #[test]
    fn test_pending_cashout_default() {
        let parser = PendingCashoutParser::new(Arc::new(|()| None::<PendingCashout>));
        let reply = parser.parse(&LongPoll::new(0x01, 0x57, &[]));
        assert_eq!(
            reply.as_bytes(),
            &[0x01, 0x57, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_send_date_time() {
        let now = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let parser = SendDateTimeParser::new(Arc::new(move |()| Some(now)));
        let reply = parser.parse(&LongPoll::new(0x01, 0x7E, &[]));
        assert_eq!(
            reply.as_bytes(),
            &[0x01, 0x7E, 0x01, 0x02, 0x20, 0x25, 0x03, 0x04, 0x05]
        );
    }

    #[test]
    fn test_card_and_reel_info() {
        let parser = CardInfoParser::new(Arc::new(|()| {
            Some(CardInfo {
                hand_type: 0x01,
                cards: [0x0C, 0x1C, 0x2C, 0x3C, 0x4E],
            })
        }));
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0x8E, &[])).as_bytes(),
            &[0x01, 0x8E, 0x01, 0x0C, 0x1C, 0x2C, 0x3C, 0x4E]
        );

        let parser = ReelStopParser::new(Arc::new(|()| Some([1u8, 2, 3, 4, 5, 0xFF, 0xFF, 0xFF, 0xFF])));
        assert_eq!(parser.parse(&LongPoll::new(0x01, 0x8F, &[])).len(), 11);
    }

    #[test]
    fn test_remote_handpay_reset() {
        let parser = RemoteHandpayResetParser::new(Arc::new(|()| Some(HandpayResetStatus::NotInHandpay)));
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0x94, &[])).as_bytes(),
            &[0x01, 0x94, 0x02]
        );
    }
}
