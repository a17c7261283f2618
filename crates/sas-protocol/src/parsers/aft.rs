//! Advanced funds transfer (AFT) polls.
//!
//! AFT requests carry the machine's asset number. Registration (0x73) and
//! lock/status (0x74) NACK a request whose asset number is not this
//! machine's; transfer requests (0x72) hand the asset number to the handler,
//! which reports a mismatch through the transfer status.

use crate::{
    commands::LongPollCode,
    field::{FieldReader, FieldSpec, TaggedRecords},
    frame::{LongPoll, Reply},
    handler::SharedHandler,
    parser::{LongPollParser, respond},
    validation::{expect_len, validate_asset, validate_code, validate_count},
};
use chrono::NaiveDateTime;
use sas_core::{
    Error, Result,
    constants::{
        AMOUNT_LENGTH, MAX_RECEIPT_LINE_LENGTH, MAX_TRANSACTION_ID_LENGTH, METER_LENGTH,
        REGISTRATION_KEY_LENGTH,
    },
};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Transfer status for "no transfer information available".
pub const NO_TRANSFER_INFO: u8 = 0xFF;

/// Transfer code of an interrogation request.
const INTERROGATE: u8 = 0xFF;

/// Transfer code of a cancel request.
const CANCEL: u8 = 0x80;

/// Transfer codes that start a transfer: full amount only, or partial allowed.
const TRANSFER_CODES: [u8; 2] = [0x00, 0x01];

/// Accepted transfer types: in-house to machine, bonus, debit, in-house to
/// host, win to host and their variants.
pub const TRANSFER_TYPES: [u8; 8] = [0x00, 0x10, 0x11, 0x20, 0x40, 0x60, 0x80, 0x90];

pub const RECEIPT_SOURCE_DESTINATION: u8 = 0x00;
pub const RECEIPT_PATRON_NAME: u8 = 0x40;
pub const RECEIPT_PATRON_ACCOUNT: u8 = 0x41;

const TRANSFER_RECEIPT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(RECEIPT_SOURCE_DESTINATION, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(RECEIPT_PATRON_NAME, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(RECEIPT_PATRON_ACCOUNT, MAX_RECEIPT_LINE_LENGTH),
];

/// A funds transfer requested by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AftTransfer {
    /// 0x00 full transfer only, 0x01 partial transfer allowed
    pub transfer_code: u8,
    pub transaction_index: u8,
    pub transfer_type: u8,
    /// Amounts in cents
    pub cashable_amount: u64,
    pub restricted_amount: u64,
    pub nonrestricted_amount: u64,
    pub transfer_flags: u8,
    pub asset_number: u32,
    pub registration_key: [u8; REGISTRATION_KEY_LENGTH],
    pub transaction_id: String,
    pub expiration: u32,
    pub pool_id: u16,
    pub receipt_data: TaggedRecords,
    /// Hundredths of a second
    pub lock_timeout: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AftTransferRequest {
    /// Report the transfer in the history buffer at `index` (0 = current)
    Interrogate { index: u8 },
    /// Cancel the pending transfer
    Cancel,
    Transfer(AftTransfer),
}

impl AftTransferRequest {
    /// History position the "no transfer information" reply refers to.
    pub fn index(&self) -> u8 {
        match self {
            AftTransferRequest::Interrogate { index } => *index,
            AftTransferRequest::Cancel => 0,
            AftTransferRequest::Transfer(transfer) => transfer.transaction_index,
        }
    }
}

/// State of one transfer as reported by 0x72.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AftTransferStatus {
    pub buffer_position: u8,
    pub transfer_status: u8,
    pub receipt_status: u8,
    pub transfer_type: u8,
    pub cashable_amount: u64,
    pub restricted_amount: u64,
    pub nonrestricted_amount: u64,
    pub transfer_flags: u8,
    pub asset_number: u32,
    pub transaction_id: String,
    /// `None` while the transfer is pending
    pub completed_at: Option<NaiveDateTime>,
    pub expiration: u32,
    pub pool_id: u16,
    pub cumulative_cashable: u64,
    pub cumulative_restricted: u64,
    pub cumulative_nonrestricted: u64,
}

/// 0x72 AFT transfer funds.
pub struct AftTransferParser {
    handler: SharedHandler<AftTransferRequest, AftTransferStatus>,
}

impl AftTransferParser {
    pub fn new(handler: SharedHandler<AftTransferRequest, AftTransferStatus>) -> Self {
        AftTransferParser { handler }
    }

    fn read_request(payload: &[u8]) -> Result<AftTransferRequest> {
        let mut body = FieldReader::new(payload).length_prefixed_exact()?;
        let transfer_code = body.u8()?;

        match transfer_code {
            INTERROGATE => {
                let index = body.u8()?;
                body.finish()?;
                return Ok(AftTransferRequest::Interrogate { index });
            }
            CANCEL => {
                body.finish()?;
                return Ok(AftTransferRequest::Cancel);
            }
            _ => {
                validate_code("transfer code", transfer_code, &TRANSFER_CODES)?;
            }
        }

        let transaction_index = body.u8()?;
        let transfer_type = validate_code("transfer type", body.u8()?, &TRANSFER_TYPES)?;
        let cashable_amount = body.bcd(AMOUNT_LENGTH)?;
        let restricted_amount = body.bcd(AMOUNT_LENGTH)?;
        let nonrestricted_amount = body.bcd(AMOUNT_LENGTH)?;
        let transfer_flags = body.u8()?;
        let asset_number = body.u32_be()?;
        let registration_key = body.array::<REGISTRATION_KEY_LENGTH>()?;

        let id = body.length_prefixed()?;
        validate_count("transaction ID length", id.len(), 1, MAX_TRANSACTION_ID_LENGTH)?;
        if !id.is_ascii() {
            return Err(Error::invalid_field("Transaction ID contains non-ASCII data"));
        }
        let transaction_id = String::from_utf8_lossy(id).into_owned();

        let expiration = body.bcd_u32(METER_LENGTH)?;
        let pool_id = body.u16_le()?;
        let receipt_data = TaggedRecords::parse(body.length_prefixed()?, TRANSFER_RECEIPT_FIELDS)?;
        let lock_timeout = body.bcd(2)? as u16;
        body.finish()?;

        Ok(AftTransferRequest::Transfer(AftTransfer {
            transfer_code,
            transaction_index,
            transfer_type,
            cashable_amount,
            restricted_amount,
            nonrestricted_amount,
            transfer_flags,
            asset_number,
            registration_key,
            transaction_id,
            expiration,
            pool_id,
            receipt_data,
            lock_timeout,
        }))
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        let request = Self::read_request(poll.payload())?;
        let index = request.index();
        trace!(?request, "AFT transfer request");

        let status = match self.handler.handle(request) {
            Some(status) if status.transfer_status != NO_TRANSFER_INFO => status,
            _ => {
                return poll.reply().length().u8(index).u8(NO_TRANSFER_INFO).build();
            }
        };

        let mut reply = poll
            .reply()
            .length()
            .u8(status.buffer_position)
            .u8(status.transfer_status)
            .u8(status.receipt_status)
            .u8(status.transfer_type)
            .bcd(status.cashable_amount, AMOUNT_LENGTH)?
            .bcd(status.restricted_amount, AMOUNT_LENGTH)?
            .bcd(status.nonrestricted_amount, AMOUNT_LENGTH)?
            .u8(status.transfer_flags)
            .u32_be(status.asset_number)
            .prefixed_ascii(&status.transaction_id, MAX_TRANSACTION_ID_LENGTH);

        reply = match status.completed_at {
            Some(at) => reply.date_time(at)?,
            None => reply.bcd(0, 4)?.bcd(0, 3)?,
        };

        reply
            .bcd(u64::from(status.expiration), METER_LENGTH)?
            .u16_le(status.pool_id)
            .sized_bcd(status.cumulative_cashable)?
            .sized_bcd(status.cumulative_restricted)?
            .sized_bcd(status.cumulative_nonrestricted)?
            .build()
    }
}

impl LongPollParser for AftTransferParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::AftTransferFunds
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Content length of a registration request and reply.
const REGISTRATION_LENGTH: usize = 1 + 4 + REGISTRATION_KEY_LENGTH + 4;

/// Registration request codes.
pub const REGISTRATION_CODES: [u8; 4] = [0x00, 0x01, 0x40, 0x80];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AftRegistration {
    /// 0x00 initialize, 0x01 register, 0x40 request operator
    /// acknowledgement, 0x80 unregister
    pub registration_code: u8,
    pub asset_number: u32,
    pub registration_key: [u8; REGISTRATION_KEY_LENGTH],
    pub pos_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AftRegistrationRequest {
    /// `len = 1, FF`: read the current registration
    Query,
    Register(AftRegistration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AftRegistrationStatus {
    pub registration_status: u8,
    pub registration_key: [u8; REGISTRATION_KEY_LENGTH],
    pub pos_id: u32,
}

/// 0x73 AFT register gaming machine.
///
/// Reply `[address, 73, 1D, status, N(4) asset, key (20), N(4) POS ID]`.
pub struct AftRegistrationParser {
    asset_number: u32,
    handler: SharedHandler<AftRegistrationRequest, AftRegistrationStatus>,
}

impl AftRegistrationParser {
    pub fn new(
        asset_number: u32,
        handler: SharedHandler<AftRegistrationRequest, AftRegistrationStatus>,
    ) -> Self {
        AftRegistrationParser {
            asset_number,
            handler,
        }
    }

    fn read_request(&self, payload: &[u8]) -> Result<AftRegistrationRequest> {
        let mut body = FieldReader::new(payload).length_prefixed_exact()?;
        if body.remaining() == 1 {
            validate_code("registration query", body.u8()?, &[0xFF])?;
            return Ok(AftRegistrationRequest::Query);
        }
        if body.remaining() != REGISTRATION_LENGTH {
            return Err(Error::LengthMismatch {
                declared: REGISTRATION_LENGTH,
                actual: body.remaining(),
            });
        }

        let registration_code = validate_code("registration code", body.u8()?, &REGISTRATION_CODES)?;
        let asset_number = body.u32_be()?;
        validate_asset(self.asset_number, asset_number)?;

        Ok(AftRegistrationRequest::Register(AftRegistration {
            registration_code,
            asset_number,
            registration_key: body.array::<REGISTRATION_KEY_LENGTH>()?,
            pos_id: body.u32_be()?,
        }))
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        let request = self.read_request(poll.payload())?;
        let Some(status) = self.handler.handle(request) else {
            return Ok(poll.nack());
        };

        poll.reply()
            .length()
            .u8(status.registration_status)
            .u32_be(self.asset_number)
            .bytes(&status.registration_key)
            .u32_be(status.pos_id)
            .build()
    }
}

impl LongPollParser for AftRegistrationParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::AftRegisterGamingMachine
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AftLockCode {
    RequestLock = 0x00,
    CancelLock = 0x80,
    Interrogate = 0xFF,
}

impl TryFrom<u8> for AftLockCode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0x00 => Ok(AftLockCode::RequestLock),
            0x80 => Ok(AftLockCode::CancelLock),
            0xFF => Ok(AftLockCode::Interrogate),
            _ => Err(Error::invalid_code("lock code", code)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AftLockRequest {
    pub lock_code: AftLockCode,
    /// Bit field of transfers the lock is for
    pub transfer_condition: u8,
    /// Hundredths of a second
    pub lock_timeout: u16,
}

/// Machine AFT state reported by 0x74.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AftGameStatus {
    pub game_lock_status: u8,
    pub available_transfers: u8,
    pub host_cashout_status: u8,
    pub aft_status: u8,
    pub max_buffer_index: u8,
    /// Amounts in cents
    pub cashable_amount: u64,
    pub restricted_amount: u64,
    pub nonrestricted_amount: u64,
    pub transfer_limit: u64,
    pub restricted_expiration: u32,
    pub restricted_pool_id: u16,
}

/// 0x74 AFT game lock and status request.
///
/// Request `N(4) asset, lock code, transfer condition, B(2) timeout`; reply
/// `[address, 74, 23, N(4) asset, lock status, available transfers, host
/// cashout status, AFT status, max buffer index, B(5) × 4, B(4), L(2)]`.
pub struct AftLockStatusParser {
    asset_number: u32,
    handler: SharedHandler<AftLockRequest, AftGameStatus>,
}

impl AftLockStatusParser {
    pub fn new(asset_number: u32, handler: SharedHandler<AftLockRequest, AftGameStatus>) -> Self {
        AftLockStatusParser {
            asset_number,
            handler,
        }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 8)?;
        let mut reader = FieldReader::new(poll.payload());
        validate_asset(self.asset_number, reader.u32_be()?)?;
        let request = AftLockRequest {
            lock_code: AftLockCode::try_from(reader.u8()?)?,
            transfer_condition: reader.u8()?,
            lock_timeout: reader.bcd(2)? as u16,
        };

        let Some(status) = self.handler.handle(request) else {
            return Ok(poll.nack());
        };

        poll.reply()
            .length()
            .u32_be(self.asset_number)
            .u8(status.game_lock_status)
            .u8(status.available_transfers)
            .u8(status.host_cashout_status)
            .u8(status.aft_status)
            .u8(status.max_buffer_index)
            .bcd(status.cashable_amount, AMOUNT_LENGTH)?
            .bcd(status.restricted_amount, AMOUNT_LENGTH)?
            .bcd(status.nonrestricted_amount, AMOUNT_LENGTH)?
            .bcd(status.transfer_limit, AMOUNT_LENGTH)?
            .bcd(u64::from(status.restricted_expiration), METER_LENGTH)?
            .u16_le(status.restricted_pool_id)
            .build()
    }
}

impl LongPollParser for AftLockStatusParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::AftGameLockAndStatus
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

pub const RECEIPT_LOCATION: u8 = 0x00;
pub const RECEIPT_ADDRESS_1: u8 = 0x01;
pub const RECEIPT_ADDRESS_2: u8 = 0x02;

const RECEIPT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(RECEIPT_LOCATION, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(RECEIPT_ADDRESS_1, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(RECEIPT_ADDRESS_2, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(0x10, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(0x11, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(0x12, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(0x13, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(0x20, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(0x21, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(0x22, MAX_RECEIPT_LINE_LENGTH),
    FieldSpec::new(0x23, MAX_RECEIPT_LINE_LENGTH),
];

/// 0x75 set AFT receipt data: `len` + tagged records → ACK/NACK.
///
/// Records 0x10-0x13 are the in-house receipt lines, 0x20-0x23 the debit
/// receipt lines.
pub struct AftReceiptDataParser {
    handler: SharedHandler<TaggedRecords, bool>,
}

impl AftReceiptDataParser {
    pub fn new(handler: SharedHandler<TaggedRecords, bool>) -> Self {
        AftReceiptDataParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        let mut body = FieldReader::new(poll.payload()).length_prefixed_exact()?;
        let records = TaggedRecords::parse(body.rest(), RECEIPT_FIELDS)?;

        Ok(match self.handler.handle(records) {
            Some(true) => poll.ack(),
            _ => poll.nack(),
        })
    }
}

impl LongPollParser for AftReceiptDataParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SetAftReceiptData
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}
