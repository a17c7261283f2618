//! Ticketing and validation polls.
//!
//! Covers the secure-enhanced validation exchange (0x4C, 0x4D, 0x50, 0x58),
//! ticket redemption (0x70, 0x71) and the host-supplied ticket text
//! (0x7B-0x7D).

use crate::{
    commands::LongPollCode,
    field::{FieldReader, FieldSpec, FieldValue, TaggedRecords},
    frame::{LongPoll, Reply},
    handler::SharedHandler,
    parser::{LongPollParser, respond},
    validation::{expect_empty, expect_len, validate_code},
};
use chrono::NaiveDateTime;
use sas_core::{
    Error, Result,
    constants::{AMOUNT_LENGTH, MAX_TICKET_TEXT_LENGTH, MAX_TICKET_TITLE_LENGTH, METER_LENGTH},
};
use serde::{Deserialize, Serialize};

/// BCD width of a validation number.
pub const VALIDATION_NUMBER_LENGTH: usize = 8;

/// Longest validation data a 0x70 reply carries.
pub const MAX_VALIDATION_DATA_LENGTH: usize = 32;

/// Status byte for "no ticket information available".
pub const NO_TICKET_STATUS: u8 = 0xFF;

fn flag_reply(poll: &LongPoll<'_>, stored: Option<bool>) -> Result<Reply> {
    match stored {
        Some(stored) => poll.reply().u8(u8::from(stored)).build(),
        None => Ok(poll.nack()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashOutTicket {
    pub validation_number: u32,
    /// Amount in cents
    pub amount: u64,
}

/// 0x3D send cash out ticket information: `[address, 3D, B(4), B(5)]`.
pub struct CashOutTicketParser {
    handler: SharedHandler<(), CashOutTicket>,
}

impl CashOutTicketParser {
    pub fn new(handler: SharedHandler<(), CashOutTicket>) -> Self {
        CashOutTicketParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let ticket = self.handler.handle(()).unwrap_or_default();

        poll.reply()
            .bcd(u64::from(ticket.validation_number), METER_LENGTH)?
            .bcd(ticket.amount, AMOUNT_LENGTH)?
            .build()
    }
}

impl LongPollParser for CashOutTicketParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendCashOutTicketInformation
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Machine ID and starting sequence number for secure-enhanced validation.
/// Both are 3-byte values sent least significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureValidationId {
    pub machine_id: u32,
    pub sequence_number: u32,
}

/// 0x4C set secure enhanced validation ID.
///
/// The handler returns the ID and sequence number now in effect, which are
/// echoed in the same LSB-first layout.
pub struct SecureValidationIdParser {
    handler: SharedHandler<SecureValidationId, SecureValidationId>,
}

impl SecureValidationIdParser {
    pub fn new(handler: SharedHandler<SecureValidationId, SecureValidationId>) -> Self {
        SecureValidationIdParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 6)?;
        let mut reader = FieldReader::new(poll.payload());
        let request = SecureValidationId {
            machine_id: reader.binary_le(3)? as u32,
            sequence_number: reader.binary_le(3)? as u32,
        };

        match self.handler.handle(request) {
            Some(current) => poll
                .reply()
                .binary_le(u64::from(current.machine_id), 3)?
                .binary_le(u64::from(current.sequence_number), 3)?
                .build(),
            None => Ok(poll.nack()),
        }
    }
}

impl LongPollParser for SecureValidationIdParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SetSecureEnhancedValidationId
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Which validation record a 0x4D poll asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationRecordQuery {
    /// 0x00: oldest pending record, which the read acknowledges
    Pending,
    /// 0x01-0x1F: buffer index
    Index(u8),
    /// 0xFF: peek at the pending record without acknowledging it
    LookAhead,
}

impl ValidationRecordQuery {
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0x00 => Ok(ValidationRecordQuery::Pending),
            0x01..=0x1F => Ok(ValidationRecordQuery::Index(code)),
            0xFF => Ok(ValidationRecordQuery::LookAhead),
            _ => Err(Error::invalid_code("validation function", code)),
        }
    }
}

/// One stored enhanced validation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub validation_type: u8,
    pub index: u8,
    pub issued_at: NaiveDateTime,
    pub validation_number: u64,
    /// Amount in cents
    pub amount: u64,
    pub ticket_number: u16,
    pub validation_system_id: u8,
    pub expiration: u32,
    pub pool_id: u16,
}

/// 0x4D send enhanced validation information.
///
/// `[address, 4D, type, index, B(4) date, B(3) time, B(8) number, B(5) amount,
/// B(2) ticket, B(1) system ID, B(4) expiration, L(2) pool]`. The machine is
/// silent when it has no record to report.
pub struct EnhancedValidationParser {
    handler: SharedHandler<ValidationRecordQuery, ValidationRecord>,
}

impl EnhancedValidationParser {
    pub fn new(handler: SharedHandler<ValidationRecordQuery, ValidationRecord>) -> Self {
        EnhancedValidationParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 1)?;
        let query = ValidationRecordQuery::from_code(poll.payload()[0])?;

        let Some(record) = self.handler.handle(query) else {
            return Ok(Reply::NoReply);
        };

        poll.reply()
            .u8(record.validation_type)
            .u8(record.index)
            .date_time(record.issued_at)?
            .bcd(record.validation_number, VALIDATION_NUMBER_LENGTH)?
            .bcd(record.amount, AMOUNT_LENGTH)?
            .bcd(u64::from(record.ticket_number), 2)?
            .bcd(u64::from(record.validation_system_id), 1)?
            .bcd(u64::from(record.expiration), METER_LENGTH)?
            .u16_le(record.pool_id)
            .build()
    }
}

impl LongPollParser for EnhancedValidationParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendEnhancedValidationInformation
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMeters {
    pub count: u32,
    /// Total in cents
    pub amount: u64,
}

/// 0x50 send validation meters: `type → [type, B(4) count, B(5) amount]`.
/// Meters the handler does not supply are reported as zero.
pub struct ValidationMetersParser {
    handler: SharedHandler<u8, ValidationMeters>,
}

impl ValidationMetersParser {
    pub fn new(handler: SharedHandler<u8, ValidationMeters>) -> Self {
        ValidationMetersParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 1)?;
        let validation_type = poll.payload()[0];
        let meters = self.handler.handle(validation_type).unwrap_or_default();

        poll.reply()
            .u8(validation_type)
            .bcd(u64::from(meters.count), METER_LENGTH)?
            .bcd(meters.amount, AMOUNT_LENGTH)?
            .build()
    }
}

impl LongPollParser for ValidationMetersParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendValidationMeters
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Validation number assigned by the host (0x58).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostValidation {
    /// 0 rejects the pending cashout
    pub validation_system_id: u8,
    pub validation_number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ValidationNumberStatus {
    Acknowledged = 0x00,
    NotInCashout = 0x80,
    ImproperValidationRejected = 0x81,
}

/// 0x58 receive validation number: `B(1) system ID, B(8) number → [status]`.
pub struct ReceiveValidationNumberParser {
    handler: SharedHandler<HostValidation, ValidationNumberStatus>,
}

impl ReceiveValidationNumberParser {
    pub fn new(handler: SharedHandler<HostValidation, ValidationNumberStatus>) -> Self {
        ReceiveValidationNumberParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 1 + VALIDATION_NUMBER_LENGTH)?;
        let mut reader = FieldReader::new(poll.payload());
        let request = HostValidation {
            validation_system_id: reader.bcd(1)? as u8,
            validation_number: reader.bcd(VALIDATION_NUMBER_LENGTH)?,
        };

        match self.handler.handle(request) {
            Some(status) => poll.reply().u8(status as u8).build(),
            None => Ok(poll.nack()),
        }
    }
}

impl LongPollParser for ReceiveValidationNumberParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::ReceiveValidationNumber
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Ticket waiting in the acceptor, reported by 0x70.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketValidationData {
    pub ticket_status: u8,
    /// Amount in cents
    pub amount: u64,
    pub parsing_code: u8,
    pub validation_data: Vec<u8>,
}

/// 0x70 send ticket validation data.
///
/// `[address, 70, len, status, B(5) amount, parsing code, data]`, or
/// `[address, 70, 01, FF]` when no ticket is in escrow.
pub struct TicketValidationDataParser {
    handler: SharedHandler<(), TicketValidationData>,
}

impl TicketValidationDataParser {
    pub fn new(handler: SharedHandler<(), TicketValidationData>) -> Self {
        TicketValidationDataParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let Some(ticket) = self.handler.handle(()) else {
            return poll.reply().length().u8(NO_TICKET_STATUS).build();
        };
        if ticket.validation_data.len() > MAX_VALIDATION_DATA_LENGTH {
            return Err(Error::FieldTooLong {
                code: poll.command_code(),
                max: MAX_VALIDATION_DATA_LENGTH,
                actual: ticket.validation_data.len(),
            });
        }

        poll.reply()
            .length()
            .u8(ticket.ticket_status)
            .bcd(ticket.amount, AMOUNT_LENGTH)?
            .u8(ticket.parsing_code)
            .bytes(&ticket.validation_data)
            .build()
    }
}

impl LongPollParser for TicketValidationDataParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendTicketValidationData
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Host decision on an escrowed ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRedemption {
    pub transfer_code: u8,
    /// Amount in cents
    pub amount: u64,
    pub parsing_code: u8,
    pub validation_number: u64,
    pub expiration: Option<u32>,
    pub pool_id: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedeemTicketRequest {
    /// `len = 1, FF`: report the redemption status only
    Status,
    Redeem(TicketRedemption),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionStatus {
    pub machine_status: u8,
    /// Amount in cents
    pub amount: u64,
    pub parsing_code: u8,
    pub validation_number: u64,
}

/// Content length of a redemption without and with the restricted fields.
const REDEMPTION_LENGTH: usize = 1 + AMOUNT_LENGTH + 1 + VALIDATION_NUMBER_LENGTH;
const RESTRICTED_REDEMPTION_LENGTH: usize = REDEMPTION_LENGTH + METER_LENGTH + 2;

/// 0x71 redeem ticket.
///
/// Request `len, transfer code, B(5) amount, parsing code (0x00), B(8)
/// validation number [, B(4) expiration, L(2) pool ID]` or the status query
/// `len = 1, FF`. Reply `[address, 71, len, status, B(5), parsing code, B(8)]`.
pub struct RedeemTicketParser {
    handler: SharedHandler<RedeemTicketRequest, RedemptionStatus>,
}

impl RedeemTicketParser {
    pub fn new(handler: SharedHandler<RedeemTicketRequest, RedemptionStatus>) -> Self {
        RedeemTicketParser { handler }
    }

    fn read_request(payload: &[u8]) -> Result<RedeemTicketRequest> {
        let mut body = FieldReader::new(payload).length_prefixed_exact()?;
        let length = body.remaining();

        if length == 1 {
            validate_code("redeem status query", body.u8()?, &[0xFF])?;
            return Ok(RedeemTicketRequest::Status);
        }
        if length != REDEMPTION_LENGTH && length != RESTRICTED_REDEMPTION_LENGTH {
            return Err(Error::LengthMismatch {
                declared: REDEMPTION_LENGTH,
                actual: length,
            });
        }

        let transfer_code = body.u8()?;
        let amount = body.bcd(AMOUNT_LENGTH)?;
        let parsing_code = validate_code("parsing code", body.u8()?, &[0x00])?;
        let validation_number = body.bcd(VALIDATION_NUMBER_LENGTH)?;
        let (expiration, pool_id) = if body.is_empty() {
            (None, None)
        } else {
            (Some(body.bcd_u32(METER_LENGTH)?), Some(body.u16_le()?))
        };
        body.finish()?;

        Ok(RedeemTicketRequest::Redeem(TicketRedemption {
            transfer_code,
            amount,
            parsing_code,
            validation_number,
            expiration,
            pool_id,
        }))
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        let request = Self::read_request(poll.payload())?;

        let Some(status) = self.handler.handle(request) else {
            return poll.reply().length().u8(NO_TICKET_STATUS).build();
        };

        poll.reply()
            .length()
            .u8(status.machine_status)
            .bcd(status.amount, AMOUNT_LENGTH)?
            .u8(status.parsing_code)
            .bcd(status.validation_number, VALIDATION_NUMBER_LENGTH)?
            .build()
    }
}

impl LongPollParser for RedeemTicketParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::RedeemTicket
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Changes requested by a 0x7B poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedValidationUpdate {
    /// Bits of `status_bits` the host wants to change
    pub control_mask: u16,
    pub status_bits: u16,
    /// Days; 0 leaves the current value
    pub cashable_expiration: u16,
    pub restricted_expiration: u16,
}

/// Validation configuration now in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedValidationConfig {
    pub status_bits: u16,
    pub cashable_expiration: u16,
    pub restricted_expiration: u16,
}

/// 0x7B extended validation status.
///
/// Request `len = 8, L(2) mask, L(2) bits, B(2), B(2)`; reply
/// `[address, 7B, 0A, N(4) asset, L(2) bits, B(2), B(2)]`.
pub struct ExtendedValidationStatusParser {
    asset_number: u32,
    handler: SharedHandler<ExtendedValidationUpdate, ExtendedValidationConfig>,
}

impl ExtendedValidationStatusParser {
    pub fn new(
        asset_number: u32,
        handler: SharedHandler<ExtendedValidationUpdate, ExtendedValidationConfig>,
    ) -> Self {
        ExtendedValidationStatusParser {
            asset_number,
            handler,
        }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        let mut body = FieldReader::new(poll.payload()).length_prefixed_exact()?;
        if body.remaining() != 8 {
            return Err(Error::LengthMismatch {
                declared: 8,
                actual: body.remaining(),
            });
        }
        let update = ExtendedValidationUpdate {
            control_mask: body.u16_le()?,
            status_bits: body.u16_le()?,
            cashable_expiration: body.bcd(2)? as u16,
            restricted_expiration: body.bcd(2)? as u16,
        };

        let Some(config) = self.handler.handle(update) else {
            return Ok(poll.nack());
        };

        poll.reply()
            .length()
            .u32_be(self.asset_number)
            .u16_le(config.status_bits)
            .bcd(u64::from(config.cashable_expiration), 2)?
            .bcd(u64::from(config.restricted_expiration), 2)?
            .build()
    }
}

impl LongPollParser for ExtendedValidationStatusParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::ExtendedValidationStatus
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

pub const TICKET_LOCATION: u8 = 0x00;
pub const TICKET_ADDRESS_1: u8 = 0x01;
pub const TICKET_ADDRESS_2: u8 = 0x02;
pub const RESTRICTED_TICKET_TITLE: u8 = 0x10;
pub const DEBIT_TICKET_TITLE: u8 = 0x20;

const EXTENDED_TICKET_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(TICKET_LOCATION, MAX_TICKET_TEXT_LENGTH),
    FieldSpec::new(TICKET_ADDRESS_1, MAX_TICKET_TEXT_LENGTH),
    FieldSpec::new(TICKET_ADDRESS_2, MAX_TICKET_TEXT_LENGTH),
    FieldSpec::new(RESTRICTED_TICKET_TITLE, MAX_TICKET_TITLE_LENGTH),
    FieldSpec::new(DEBIT_TICKET_TITLE, MAX_TICKET_TITLE_LENGTH),
];

/// 0x7C set extended ticket data: `len` + tagged records → `[flag]`.
pub struct ExtendedTicketDataParser {
    handler: SharedHandler<TaggedRecords, bool>,
}

impl ExtendedTicketDataParser {
    pub fn new(handler: SharedHandler<TaggedRecords, bool>) -> Self {
        ExtendedTicketDataParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        let mut body = FieldReader::new(poll.payload()).length_prefixed_exact()?;
        let records = TaggedRecords::parse(body.rest(), EXTENDED_TICKET_FIELDS)?;
        flag_reply(poll, self.handler.handle(records))
    }
}

impl LongPollParser for ExtendedTicketDataParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SetExtendedTicketData
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Ticket text and host settings carried by 0x7D.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketData {
    pub host_id: u16,
    /// Days
    pub expiration: u8,
    pub location: FieldValue,
    pub address_1: FieldValue,
    pub address_2: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetTicketDataRequest {
    /// `len = 0`: report whether ticket data is set
    Query,
    Set(TicketData),
}

/// 0x7D set ticket data.
///
/// `len, L(2) host ID, B(1) expiration, location, address 1, address 2`
/// where each text field is length-prefixed (at most 40 bytes). Text fields
/// missing from the end keep the machine's defaults.
pub struct SetTicketDataParser {
    handler: SharedHandler<SetTicketDataRequest, bool>,
}

impl SetTicketDataParser {
    pub fn new(handler: SharedHandler<SetTicketDataRequest, bool>) -> Self {
        SetTicketDataParser { handler }
    }

    fn read_text(body: &mut FieldReader<'_>, code: u8) -> Result<FieldValue> {
        if body.is_empty() {
            return Ok(FieldValue::Default);
        }
        body.prefixed_text(code, MAX_TICKET_TEXT_LENGTH)
    }

    fn read_request(payload: &[u8]) -> Result<SetTicketDataRequest> {
        let mut body = FieldReader::new(payload).length_prefixed_exact()?;
        if body.is_empty() {
            return Ok(SetTicketDataRequest::Query);
        }

        let host_id = body.u16_le()?;
        let expiration = body.bcd(1)? as u8;
        let location = Self::read_text(&mut body, TICKET_LOCATION)?;
        let address_1 = Self::read_text(&mut body, TICKET_ADDRESS_1)?;
        let address_2 = Self::read_text(&mut body, TICKET_ADDRESS_2)?;
        body.finish()?;

        Ok(SetTicketDataRequest::Set(TicketData {
            host_id,
            expiration,
            location,
            address_1,
            address_2,
        }))
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        let request = Self::read_request(poll.payload())?;
        flag_reply(poll, self.handler.handle(request))
    }
}

impl LongPollParser for SetTicketDataParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SetTicketData
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn test_cash_out_ticket() {
        let parser = CashOutTicketParser::new(Arc::new(|()| {
            Some(CashOutTicket {
                validation_number: 1234,
                amount: 2_500,
            })
        }));
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0x3D, &[])).as_bytes(),
            &[0x01, 0x3D, 0x00, 0x00, 0x12, 0x34, 0x00, 0x00, 0x00, 0x25, 0x00]
        );
    }

    #[test]
    fn test_secure_validation_id_is_lsb_first() {
        let parser = SecureValidationIdParser::new(Arc::new(|id: SecureValidationId| {
            Some(SecureValidationId {
                machine_id: id.machine_id,
                sequence_number: id.sequence_number + 1,
            })
        }));
        let poll = LongPoll::new(0x01, 0x4C, &[0x56, 0x34, 0x12, 0x01, 0x00, 0x00]);
        assert_eq!(
            parser.parse(&poll).as_bytes(),
            &[0x01, 0x4C, 0x56, 0x34, 0x12, 0x02, 0x00, 0x00]
        );
    }

    fn record() -> ValidationRecord {
        ValidationRecord {
            validation_type: 0x00,
            index: 0x01,
            issued_at: NaiveDate::from_ymd_opt(2024, 12, 31)
                .unwrap()
                .and_hms_opt(23, 59, 58)
                .unwrap(),
            validation_number: 1_234_567_890_123_456,
            amount: 10_000,
            ticket_number: 42,
            validation_system_id: 0,
            expiration: 30,
            pool_id: 0x0102,
        }
    }

    #[test]
    fn test_enhanced_validation_record() {
        let parser = EnhancedValidationParser::new(Arc::new(|query: ValidationRecordQuery| {
            (query == ValidationRecordQuery::Index(1)).then(record)
        }));

        let reply = parser.parse(&LongPoll::new(0x01, 0x4D, &[0x01]));
        assert_eq!(reply.len(), 33);
        assert_eq!(
            reply.as_bytes(),
            &[
                0x01, 0x4D, 0x00, 0x01, 0x12, 0x31, 0x20, 0x24, 0x23, 0x59, 0x58, 0x12, 0x34,
                0x56, 0x78, 0x90, 0x12, 0x34, 0x56, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x42,
                0x00, 0x00, 0x00, 0x00, 0x30, 0x02, 0x01
            ]
        );

        assert!(parser.parse(&LongPoll::new(0x01, 0x4D, &[0x00])).is_no_reply());
    }

    #[rstest]
    #[case::past_buffer(&[0x20])]
    #[case::unknown(&[0x80])]
    #[case::missing(&[])]
    fn test_enhanced_validation_rejects(#[case] payload: &[u8]) {
        let parser = EnhancedValidationParser::new(Arc::new(|_: ValidationRecordQuery| Some(record())));
        assert!(parser.parse(&LongPoll::new(0x01, 0x4D, payload)).is_nack());
    }

    #[test]
    fn test_validation_meters() {
        let parser = ValidationMetersParser::new(Arc::new(|kind: u8| {
            (kind == 0x00).then_some(ValidationMeters {
                count: 7,
                amount: 35_000,
            })
        }));
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0x50, &[0x00])).as_bytes(),
            &[0x01, 0x50, 0x00, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x03, 0x50, 0x00]
        );
        assert_eq!(parser.parse(&LongPoll::new(0x01, 0x50, &[0x80])).len(), 12);
    }

    #[test]
    fn test_receive_validation_number() {
        let parser = ReceiveValidationNumberParser::new(Arc::new(|host: HostValidation| {
            Some(if host.validation_system_id == 0 {
                ValidationNumberStatus::ImproperValidationRejected
            } else {
                ValidationNumberStatus::Acknowledged
            })
        }));
        let accepted = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x12, 0x34];
        let rejected = [0x00; 9];
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0x58, &accepted)).as_bytes(),
            &[0x01, 0x58, 0x00]
        );
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0x58, &rejected)).as_bytes(),
            &[0x01, 0x58, 0x81]
        );
    }

    #[test]
    fn test_ticket_validation_data() {
        let parser = TicketValidationDataParser::new(Arc::new(|()| {
            Some(TicketValidationData {
                ticket_status: 0x00,
                amount: 500,
                parsing_code: 0x00,
                validation_data: vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77],
            })
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0x70, &[]));
        assert_eq!(reply.as_bytes()[2], 15);
        assert_eq!(&reply.as_bytes()[3..10], &[0x00, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00]);

        let empty = TicketValidationDataParser::new(Arc::new(|()| None::<TicketValidationData>));
        assert_eq!(
            empty.parse(&LongPoll::new(0x01, 0x70, &[])).as_bytes(),
            &[0x01, 0x70, 0x01, 0xFF]
        );
    }

    #[test]
    fn test_redeem_ticket() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let parser = RedeemTicketParser::new(Arc::new(move |request: RedeemTicketRequest| {
            sink.lock().unwrap().push(request);
            Some(RedemptionStatus {
                machine_status: 0x20,
                amount: 500,
                parsing_code: 0x00,
                validation_number: 99,
            })
        }));

        let mut payload = vec![0x0F, 0x00, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00];
        payload.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x99]);
        let reply = parser.parse(&LongPoll::new(0x01, 0x71, &payload));
        assert_eq!(reply.len(), 18);
        assert_eq!(&reply.as_bytes()[..4], &[0x01, 0x71, 0x0F, 0x20]);

        let status = parser.parse(&LongPoll::new(0x01, 0x71, &[0x01, 0xFF]));
        assert_eq!(status.len(), 18);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[1], RedeemTicketRequest::Status);
        assert_eq!(
            seen[0],
            RedeemTicketRequest::Redeem(TicketRedemption {
                transfer_code: 0x00,
                amount: 500,
                parsing_code: 0x00,
                validation_number: 99,
                expiration: None,
                pool_id: None,
            })
        );
    }

    #[test]
    fn test_redeem_ticket_restricted_fields() {
        let parser = RedeemTicketParser::new(Arc::new(|request: RedeemTicketRequest| match request {
            RedeemTicketRequest::Redeem(redemption) => {
                assert_eq!(redemption.expiration, Some(1_312_025));
                assert_eq!(redemption.pool_id, Some(0x0201));
                None
            }
            RedeemTicketRequest::Status => None,
        }));
        let payload = [
            0x15, 0x01, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x01, 0x31, 0x20, 0x25, 0x01, 0x02,
        ];
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0x71, &payload)).as_bytes(),
            &[0x01, 0x71, 0x01, 0xFF]
        );
    }

    #[rstest]
    #[case::status_not_ff(&[0x01, 0x00])]
    #[case::bad_parsing_code(&[
        0x0F, 0x00, 0x00, 0x00, 0x00, 0x05, 0x00, 0x01,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x99,
    ])]
    #[case::odd_length(&[0x02, 0x00, 0x00])]
    #[case::length_mismatch(&[0x0F, 0x00, 0x00])]
    fn test_redeem_ticket_rejects(#[case] payload: &[u8]) {
        let parser = RedeemTicketParser::new(Arc::new(|_: RedeemTicketRequest| None::<RedemptionStatus>));
        assert!(parser.parse(&LongPoll::new(0x01, 0x71, payload)).is_nack());
    }

    #[test]
    fn test_extended_validation_status() {
        let parser = ExtendedValidationStatusParser::new(
            0x0000_1234,
            Arc::new(|update: ExtendedValidationUpdate| {
                Some(ExtendedValidationConfig {
                    status_bits: update.status_bits & update.control_mask,
                    cashable_expiration: update.cashable_expiration,
                    restricted_expiration: 30,
                })
            }),
        );
        let poll = LongPoll::new(
            0x01,
            0x7B,
            &[0x08, 0x03, 0x00, 0x01, 0x00, 0x01, 0x20, 0x00, 0x00],
        );
        assert_eq!(
            parser.parse(&poll).as_bytes(),
            &[0x01, 0x7B, 0x0A, 0x00, 0x00, 0x12, 0x34, 0x01, 0x00, 0x01, 0x20, 0x00, 0x30]
        );
    }

    #[test]
    fn test_extended_ticket_data() {
        let parser = ExtendedTicketDataParser::new(Arc::new(|records: TaggedRecords| {
            Some(records.get(TICKET_LOCATION).as_str() == Some("CASINO"))
        }));
        let mut payload = vec![0x0B, 0x00, 0x06];
        payload.extend_from_slice(b"CASINO");
        payload.extend_from_slice(&[0x10, 0x01, b'X']);
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0x7C, &payload)).as_bytes(),
            &[0x01, 0x7C, 0x01]
        );

        let mut too_long = vec![0x13, 0x10, 0x11];
        too_long.extend_from_slice(&[b'T'; 17]);
        assert!(parser.parse(&LongPoll::new(0x01, 0x7C, &too_long)).is_nack());
    }

    #[rstest]
    #[case::outer_length_long(0, 1)]
    #[case::outer_length_short(0, -1)]
    #[case::location_overrun(2, 1)]
    #[case::location_short(2, -1)]
    #[case::title_overrun(10, 1)]
    fn test_extended_ticket_data_bad_lengths_never_reach_handler(
        #[case] offset: usize,
        #[case] delta: i16,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let parser = ExtendedTicketDataParser::new(Arc::new(move |_: TaggedRecords| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(true)
        }));

        let mut payload = vec![0x0B, 0x00, 0x06];
        payload.extend_from_slice(b"CASINO");
        payload.extend_from_slice(&[0x10, 0x01, b'X']);
        payload[offset] = (i16::from(payload[offset]) + delta) as u8;

        assert!(parser.parse(&LongPoll::new(0x01, 0x7C, &payload)).is_nack());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_ticket_data() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let parser = SetTicketDataParser::new(Arc::new(move |request: SetTicketDataRequest| {
            sink.lock().unwrap().push(request);
            Some(true)
        }));

        let mut payload = vec![0x09, 0x34, 0x12, 0x30, 0x04];
        payload.extend_from_slice(b"MAIN");
        payload.push(0x00);
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0x7D, &payload)).as_bytes(),
            &[0x01, 0x7D, 0x01]
        );
        assert!(!parser.parse(&LongPoll::new(0x01, 0x7D, &[0x00])).is_nack());

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0],
            SetTicketDataRequest::Set(TicketData {
                host_id: 0x1234,
                expiration: 30,
                location: FieldValue::Value("MAIN".to_string()),
                address_1: FieldValue::Blank,
                address_2: FieldValue::Default,
            })
        );
        assert_eq!(seen[1], SetTicketDataRequest::Query);
    }
}
