//! Machine control and configuration polls.
//!
//! Control polls (0x01-0x07, 0x0A, 0x0B) carry no data and answer ACK or
//! NACK. A shutdown the handler has nothing to say about stays silent.
//!
//! Configuration polls carry a small fixed payload. They answer ACK/NACK,
//! except 0x09 (which has a busy outcome) and 0xA8 (which returns an ACK
//! code).

use crate::{
    commands::LongPollCode,
    field::FieldReader,
    frame::{LongPoll, Reply},
    handler::SharedHandler,
    parser::{LongPollParser, respond},
    validation::{expect_empty, expect_len, validate_code, validate_flag, validate_range},
};
use chrono::NaiveDateTime;
use sas_core::Result;
use serde::{Deserialize, Serialize};

fn ack_or_nack(poll: &LongPoll<'_>, accepted: Option<bool>) -> Reply {
    match accepted {
        Some(true) => poll.ack(),
        _ => poll.nack(),
    }
}

/// Request handed to control handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    pub command: LongPollCode,
    pub client_number: u8,
}

/// Data-less control poll: shutdown, startup, sound, bill acceptor and
/// maintenance mode.
pub struct ControlParser {
    command: LongPollCode,
    client_number: u8,
    handler: SharedHandler<ControlRequest, bool>,
}

impl ControlParser {
    /// Codes served by this parser.
    pub const COMMANDS: [LongPollCode; 9] = [
        LongPollCode::Shutdown,
        LongPollCode::Startup,
        LongPollCode::SoundOff,
        LongPollCode::SoundOn,
        LongPollCode::GameSoundsDisable,
        LongPollCode::EnableBillAcceptor,
        LongPollCode::DisableBillAcceptor,
        LongPollCode::EnterMaintenanceMode,
        LongPollCode::ExitMaintenanceMode,
    ];

    pub fn new(
        command: LongPollCode,
        client_number: u8,
        handler: SharedHandler<ControlRequest, bool>,
    ) -> Self {
        debug_assert!(command.is_control());
        ControlParser {
            command,
            client_number,
            handler,
        }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;

        let request = ControlRequest {
            command: self.command,
            client_number: self.client_number,
        };
        Ok(match self.handler.handle(request) {
            None if self.command == LongPollCode::Shutdown => Reply::NoReply,
            accepted => ack_or_nack(poll, accepted),
        })
    }
}

impl LongPollParser for ControlParser {
    fn command(&self) -> LongPollCode {
        self.command
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// What the machine does after accepting a bill (0x08).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillAcceptorAction {
    DisableAfterAccept,
    KeepEnabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillDenominationRequest {
    /// Bit 0 = $1, bit 1 = $2, ...
    pub denominations: u32,
    pub action: BillAcceptorAction,
}

/// 0x08 configure bill denominations.
pub struct BillDenominationsParser {
    handler: SharedHandler<BillDenominationRequest, bool>,
}

impl BillDenominationsParser {
    pub fn new(handler: SharedHandler<BillDenominationRequest, bool>) -> Self {
        BillDenominationsParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 5)?;
        let mut reader = FieldReader::new(poll.payload());
        let denominations = reader.u32_le()?;
        let action = if validate_flag("bill acceptor action", reader.u8()?)? {
            BillAcceptorAction::KeepEnabled
        } else {
            BillAcceptorAction::DisableAfterAccept
        };

        let request = BillDenominationRequest {
            denominations,
            action,
        };
        Ok(ack_or_nack(poll, self.handler.handle(request)))
    }
}

impl LongPollParser for BillDenominationsParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::ConfigureBillDenominations
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEnableRequest {
    pub game_number: u16,
    pub enable: bool,
}

/// Outcome of enabling or disabling a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEnableStatus {
    Success,
    Failed,
    /// A game round is in progress
    Busy,
}

/// 0x09 enable/disable game N.
pub struct GameEnableParser {
    handler: SharedHandler<GameEnableRequest, GameEnableStatus>,
}

impl GameEnableParser {
    pub fn new(handler: SharedHandler<GameEnableRequest, GameEnableStatus>) -> Self {
        GameEnableParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 3)?;
        let mut reader = FieldReader::new(poll.payload());
        let game_number = reader.game_number()?;
        let enable = validate_flag("game enable", reader.u8()?)?;

        let request = GameEnableRequest {
            game_number,
            enable,
        };
        Ok(match self.handler.handle(request) {
            Some(GameEnableStatus::Success) => poll.ack(),
            Some(GameEnableStatus::Busy) => poll.busy(),
            Some(GameEnableStatus::Failed) | None => poll.nack(),
        })
    }
}

impl LongPollParser for GameEnableParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::EnableDisableGameN
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRequest {
    pub command: LongPollCode,
    pub enabled: bool,
}

/// Single 0/1 flag poll: 0x0E real time events, 0xAA auto rebet.
pub struct FlagParser {
    command: LongPollCode,
    handler: SharedHandler<FlagRequest, bool>,
}

impl FlagParser {
    pub fn new(command: LongPollCode, handler: SharedHandler<FlagRequest, bool>) -> Self {
        FlagParser { command, handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 1)?;
        let enabled = validate_flag("enable flag", poll.payload()[0])?;

        let request = FlagRequest {
            command: self.command,
            enabled,
        };
        Ok(ack_or_nack(poll, self.handler.handle(request)))
    }
}

impl LongPollParser for FlagParser {
    fn command(&self) -> LongPollCode {
        self.command
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayGameRequest {
    /// Delay in units of 100 ms
    pub delay: u16,
}

impl DelayGameRequest {
    pub fn as_millis(&self) -> u64 {
        u64::from(self.delay) * 100
    }
}

/// 0x2E delay game.
pub struct DelayGameParser {
    handler: SharedHandler<DelayGameRequest, bool>,
}

impl DelayGameParser {
    pub fn new(handler: SharedHandler<DelayGameRequest, bool>) -> Self {
        DelayGameParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 2)?;
        let delay = FieldReader::new(poll.payload()).bcd(2)? as u16;
        Ok(ack_or_nack(poll, self.handler.handle(DelayGameRequest { delay })))
    }
}

impl LongPollParser for DelayGameParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::DelayGame
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0x7F receive date and time.
pub struct ReceiveDateTimeParser {
    handler: SharedHandler<NaiveDateTime, bool>,
}

impl ReceiveDateTimeParser {
    pub fn new(handler: SharedHandler<NaiveDateTime, bool>) -> Self {
        ReceiveDateTimeParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 7)?;
        let value = FieldReader::new(poll.payload()).date_time()?;
        Ok(ack_or_nack(poll, self.handler.handle(value)))
    }
}

impl LongPollParser for ReceiveDateTimeParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::ReceiveDateTime
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Tax treatment of a legacy bonus award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TaxStatus {
    Deductible = 0x00,
    NonDeductible = 0x01,
    WagerMatch = 0x02,
}

impl TaxStatus {
    fn from_u8(value: u8) -> Result<Self> {
        match validate_range("tax status", value, 0x00, 0x02)? {
            0x00 => Ok(TaxStatus::Deductible),
            0x01 => Ok(TaxStatus::NonDeductible),
            _ => Ok(TaxStatus::WagerMatch),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyBonusRequest {
    /// Award in credits
    pub amount: u32,
    pub tax_status: TaxStatus,
}

/// 0x8A initiate legacy bonus pay.
pub struct LegacyBonusParser {
    handler: SharedHandler<LegacyBonusRequest, bool>,
}

impl LegacyBonusParser {
    pub fn new(handler: SharedHandler<LegacyBonusRequest, bool>) -> Self {
        LegacyBonusParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 5)?;
        let mut reader = FieldReader::new(poll.payload());
        let amount = reader.bcd_u32(4)?;
        let tax_status = TaxStatus::from_u8(reader.u8()?)?;

        let request = LegacyBonusRequest { amount, tax_status };
        Ok(ack_or_nack(poll, self.handler.handle(request)))
    }
}

impl LongPollParser for LegacyBonusParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::InitiateLegacyBonusPay
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandpayResetMethod {
    StandardHandpay = 0x00,
    ResetToCreditMeter = 0x01,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResetMethodAck {
    Accepted = 0x00,
    UnableToEnable = 0x01,
    NotCurrentlyInHandpay = 0x02,
}

/// 0xA8 enable jackpot handpay reset method.
pub struct JackpotResetMethodParser {
    handler: SharedHandler<HandpayResetMethod, ResetMethodAck>,
}

impl JackpotResetMethodParser {
    pub fn new(handler: SharedHandler<HandpayResetMethod, ResetMethodAck>) -> Self {
        JackpotResetMethodParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 1)?;
        let method = match validate_code("reset method", poll.payload()[0], &[0x00, 0x01])? {
            0x00 => HandpayResetMethod::StandardHandpay,
            _ => HandpayResetMethod::ResetToCreditMeter,
        };

        match self.handler.handle(method) {
            Some(ack) => poll.reply().u8(ack as u8).build(),
            None => Ok(poll.nack()),
        }
    }
}

impl LongPollParser for JackpotResetMethodParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::EnableJackpotHandpayResetMethod
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}
