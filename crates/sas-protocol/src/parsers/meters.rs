//! Meter polls.
//!
//! All meter polls share one handler: the parser lists the meters it needs in
//! a [`MeterRequest`] and reads them back from the [`MeterResponse`]. Polls
//! with a fixed layout report a meter the handler left out as zero; the
//! selected-meter polls (0x2F, 0x6F, 0xAF) report only what the handler
//! supplied.
//!
//! Most meter polls are multi-denomination aware. Called directly they
//! report all denominations; inside the 0xB0 preamble they receive the
//! preamble's denomination.

use crate::{
    commands::LongPollCode,
    field::FieldReader,
    frame::{LongPoll, Reply},
    handler::SharedHandler,
    parser::{LongPollParser, MultiDenomAwareParser, respond},
    validation::{expect_empty, expect_len, validate_count},
};
use sas_core::{
    Denomination, Error, MeterCode, Result,
    constants::{GAME_NUMBER_LENGTH, MAX_CONTENT_LENGTH, METER_LENGTH},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Most one-byte meter codes a 0x2F length byte can describe.
const MAX_SELECTED_METERS: usize = MAX_CONTENT_LENGTH - GAME_NUMBER_LENGTH;

/// Most two-byte meter codes a 0x6F/0xAF length byte can describe.
const MAX_EXTENDED_METERS: usize = (MAX_CONTENT_LENGTH - GAME_NUMBER_LENGTH) / 2;

/// Meters requested by one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterRequest {
    pub command: LongPollCode,
    pub meters: Vec<MeterCode>,
    /// 0 for machine-wide meters
    pub game_number: u16,
    /// `None` reports all denominations
    pub denomination: Option<Denomination>,
}

/// Meter values returned by the handler.
///
/// ```
/// use sas_core::MeterCode;
/// use sas_protocol::parsers::MeterResponse;
///
/// let response = MeterResponse::new()
///     .with(MeterCode::TOTAL_COIN_IN, 12_500)
///     .with(MeterCode::GAMES_PLAYED, 310);
///
/// assert_eq!(response.get(MeterCode::TOTAL_COIN_IN), Some(12_500));
/// assert_eq!(response.get(MeterCode::TOTAL_DROP), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterResponse {
    values: BTreeMap<MeterCode, u64>,
}

impl MeterResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, meter: MeterCode, value: u64) -> Self {
        self.values.insert(meter, value);
        self
    }

    pub fn insert(&mut self, meter: MeterCode, value: u64) {
        self.values.insert(meter, value);
    }

    pub fn get(&self, meter: MeterCode) -> Option<u64> {
        self.values.get(&meter).copied()
    }

    /// Value of `meter`, zero when the handler did not supply it.
    pub fn value_or_zero(&self, meter: MeterCode) -> u64 {
        self.get(meter).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(MeterCode, u64)> for MeterResponse {
    fn from_iter<I: IntoIterator<Item = (MeterCode, u64)>>(iter: I) -> Self {
        MeterResponse {
            values: iter.into_iter().collect(),
        }
    }
}

pub type MeterHandler = SharedHandler<MeterRequest, MeterResponse>;

fn query(
    handler: &MeterHandler,
    command: LongPollCode,
    meters: Vec<MeterCode>,
    game_number: u16,
    denomination: Option<Denomination>,
) -> Option<MeterResponse> {
    trace!(%command, meters = meters.len(), game_number, "Meter query");
    handler.handle(MeterRequest {
        command,
        meters,
        game_number,
        denomination,
    })
}

fn multi_denom_view<P: MultiDenomAwareParser>(
    parser: &P,
    command: LongPollCode,
) -> Option<&dyn MultiDenomAwareParser> {
    if command.is_multi_denom_aware() {
        Some(parser)
    } else {
        None
    }
}

/// Single-meter polls and the meter each reports.
pub const SINGLE_METER_POLLS: [(LongPollCode, MeterCode); 23] = [
    (LongPollCode::SendCancelledCreditsMeter, MeterCode::TOTAL_CANCELLED_CREDITS),
    (LongPollCode::SendCoinInMeter, MeterCode::TOTAL_COIN_IN),
    (LongPollCode::SendCoinOutMeter, MeterCode::TOTAL_COIN_OUT),
    (LongPollCode::SendDropMeter, MeterCode::TOTAL_DROP),
    (LongPollCode::SendJackpotMeter, MeterCode::TOTAL_JACKPOT),
    (LongPollCode::SendGamesPlayedMeter, MeterCode::GAMES_PLAYED),
    (LongPollCode::SendGamesWonMeter, MeterCode::GAMES_WON),
    (LongPollCode::SendGamesLostMeter, MeterCode::GAMES_LOST),
    (LongPollCode::SendCurrentCredits, MeterCode::CURRENT_CREDITS),
    (LongPollCode::SendTotalBillsMeter, MeterCode::TOTAL_BILLS),
    (LongPollCode::SendTrueCoinInMeter, MeterCode::TRUE_COIN_IN),
    (LongPollCode::SendTrueCoinOutMeter, MeterCode::TRUE_COIN_OUT),
    (LongPollCode::SendHopperLevel, MeterCode::HOPPER_LEVEL),
    (LongPollCode::SendOneDollarBillsMeter, MeterCode::BILLS_1),
    (LongPollCode::SendTwoDollarBillsMeter, MeterCode::BILLS_2),
    (LongPollCode::SendFiveDollarBillsMeter, MeterCode::BILLS_5),
    (LongPollCode::SendTenDollarBillsMeter, MeterCode::BILLS_10),
    (LongPollCode::SendTwentyDollarBillsMeter, MeterCode::BILLS_20),
    (LongPollCode::SendFiftyDollarBillsMeter, MeterCode::BILLS_50),
    (LongPollCode::SendHundredDollarBillsMeter, MeterCode::BILLS_100),
    (LongPollCode::SendFiveHundredDollarBillsMeter, MeterCode::BILLS_500),
    (LongPollCode::SendThousandDollarBillsMeter, MeterCode::BILLS_1000),
    (LongPollCode::SendTwoHundredDollarBillsMeter, MeterCode::BILLS_200),
];

/// Poll answering one 4-byte BCD meter: `[address, code, meter]`.
pub struct SingleMeterParser {
    command: LongPollCode,
    meter: MeterCode,
    handler: MeterHandler,
}

impl SingleMeterParser {
    pub fn new(command: LongPollCode, meter: MeterCode, handler: MeterHandler) -> Self {
        SingleMeterParser {
            command,
            meter,
            handler,
        }
    }

    /// Parser for a code listed in [`SINGLE_METER_POLLS`].
    pub fn for_command(command: LongPollCode, handler: MeterHandler) -> Option<Self> {
        SINGLE_METER_POLLS
            .iter()
            .find(|(code, _)| *code == command)
            .map(|(_, meter)| Self::new(command, *meter, handler))
    }

    fn try_parse(&self, poll: &LongPoll<'_>, denomination: Option<Denomination>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let Some(response) = query(&self.handler, self.command, vec![self.meter], 0, denomination)
        else {
            return Ok(poll.nack());
        };
        poll.reply()
            .bcd(response.value_or_zero(self.meter), METER_LENGTH)?
            .build()
    }
}

impl LongPollParser for SingleMeterParser {
    fn command(&self) -> LongPollCode {
        self.command
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll, None))
    }

    fn as_multi_denom(&self) -> Option<&dyn MultiDenomAwareParser> {
        multi_denom_view(self, self.command)
    }
}

impl MultiDenomAwareParser for SingleMeterParser {
    fn parse_for_denomination(
        &self,
        poll: &LongPoll<'_>,
        denomination: Option<Denomination>,
    ) -> Reply {
        respond(poll, self.try_parse(poll, denomination))
    }
}

const METERS_10_TO_15: &[MeterCode] = &[
    MeterCode::TOTAL_CANCELLED_CREDITS,
    MeterCode::TOTAL_COIN_IN,
    MeterCode::TOTAL_COIN_OUT,
    MeterCode::TOTAL_DROP,
    MeterCode::TOTAL_JACKPOT,
    MeterCode::GAMES_PLAYED,
];

const METERS_11_TO_15: &[MeterCode] = &[
    MeterCode::TOTAL_COIN_IN,
    MeterCode::TOTAL_COIN_OUT,
    MeterCode::TOTAL_DROP,
    MeterCode::TOTAL_JACKPOT,
    MeterCode::GAMES_PLAYED,
];

const GAMING_MACHINE_METERS: &[MeterCode] = &[
    MeterCode::TOTAL_COIN_IN,
    MeterCode::TOTAL_COIN_OUT,
    MeterCode::TOTAL_DROP,
    MeterCode::TOTAL_JACKPOT,
    MeterCode::GAMES_PLAYED,
    MeterCode::GAMES_WON,
    MeterCode::SLOT_DOOR_OPENED,
    MeterCode::POWER_RESET,
];

const BILL_METERS: &[MeterCode] = &[
    MeterCode::BILLS_1,
    MeterCode::BILLS_5,
    MeterCode::BILLS_10,
    MeterCode::BILLS_20,
    MeterCode::BILLS_50,
    MeterCode::BILLS_100,
];

const GAMES_SINCE_METERS: &[MeterCode] = &[
    MeterCode::GAMES_SINCE_POWER_UP,
    MeterCode::GAMES_SINCE_DOOR_CLOSE,
];

/// Fixed meter group polls.
pub const METER_GROUP_POLLS: [LongPollCode; 5] = [
    LongPollCode::SendMeters10To15,
    LongPollCode::SendGamesSincePowerUp,
    LongPollCode::SendMeters11To15,
    LongPollCode::SendMeters,
    LongPollCode::SendBillMeters,
];

/// Poll answering a fixed list of meters back to back.
pub struct MeterGroupParser {
    command: LongPollCode,
    meters: &'static [MeterCode],
    width: usize,
    handler: MeterHandler,
}

impl MeterGroupParser {
    /// Parser for a code listed in [`METER_GROUP_POLLS`].
    pub fn for_command(command: LongPollCode, handler: MeterHandler) -> Option<Self> {
        let (meters, width) = match command {
            LongPollCode::SendMeters10To15 => (METERS_10_TO_15, METER_LENGTH),
            LongPollCode::SendMeters11To15 => (METERS_11_TO_15, METER_LENGTH),
            LongPollCode::SendMeters => (GAMING_MACHINE_METERS, METER_LENGTH),
            LongPollCode::SendBillMeters => (BILL_METERS, METER_LENGTH),
            LongPollCode::SendGamesSincePowerUp => (GAMES_SINCE_METERS, 2),
            _ => return None,
        };
        Some(MeterGroupParser {
            command,
            meters,
            width,
            handler,
        })
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let Some(response) = query(&self.handler, self.command, self.meters.to_vec(), 0, None)
        else {
            return Ok(poll.nack());
        };

        let mut reply = poll.reply();
        for meter in self.meters {
            reply = reply.bcd(response.value_or_zero(*meter), self.width)?;
        }
        reply.build()
    }
}

impl LongPollParser for MeterGroupParser {
    fn command(&self) -> LongPollCode {
        self.command
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0x2D hand paid cancelled credits for game N.
pub struct HandPaidCancelledCreditsParser {
    handler: MeterHandler,
}

impl HandPaidCancelledCreditsParser {
    pub fn new(handler: MeterHandler) -> Self {
        HandPaidCancelledCreditsParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), GAME_NUMBER_LENGTH)?;
        let game_number = FieldReader::new(poll.payload()).game_number()?;
        let meter = MeterCode::TOTAL_HAND_PAID_CANCELLED_CREDITS;

        let Some(response) = query(
            &self.handler,
            LongPollCode::SendHandPaidCancelledCredits,
            vec![meter],
            game_number,
            None,
        ) else {
            return Ok(poll.nack());
        };
        poll.reply()
            .game_number(game_number)?
            .bcd(response.value_or_zero(meter), METER_LENGTH)?
            .build()
    }
}

impl LongPollParser for HandPaidCancelledCreditsParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendHandPaidCancelledCredits
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

const GAME_N_METERS: &[MeterCode] = &[
    MeterCode::TOTAL_COIN_IN,
    MeterCode::TOTAL_COIN_OUT,
    MeterCode::TOTAL_JACKPOT,
    MeterCode::GAMES_PLAYED,
];

/// 0x52 game N meters.
pub struct GameMetersParser {
    handler: MeterHandler,
}

impl GameMetersParser {
    pub fn new(handler: MeterHandler) -> Self {
        GameMetersParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>, denomination: Option<Denomination>) -> Result<Reply> {
        expect_len(poll.payload(), GAME_NUMBER_LENGTH)?;
        let game_number = FieldReader::new(poll.payload()).game_number()?;

        let Some(response) = query(
            &self.handler,
            LongPollCode::SendGameNMeters,
            GAME_N_METERS.to_vec(),
            game_number,
            denomination,
        ) else {
            return Ok(poll.nack());
        };

        let mut reply = poll.reply().game_number(game_number)?;
        for meter in GAME_N_METERS {
            reply = reply.bcd(response.value_or_zero(*meter), METER_LENGTH)?;
        }
        reply.build()
    }
}

impl LongPollParser for GameMetersParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendGameNMeters
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll, None))
    }

    fn as_multi_denom(&self) -> Option<&dyn MultiDenomAwareParser> {
        Some(self)
    }
}

impl MultiDenomAwareParser for GameMetersParser {
    fn parse_for_denomination(
        &self,
        poll: &LongPoll<'_>,
        denomination: Option<Denomination>,
    ) -> Reply {
        respond(poll, self.try_parse(poll, denomination))
    }
}

/// 0x2F selected meters for game N.
///
/// Request: `[length, game (BCD 2), meter code...]` with one-byte codes.
/// Reply: `[address, 2F, length, game, (code, meter)...]`, each meter in the
/// BCD width of its code. Meters the handler did not supply are left out.
pub struct SelectedMetersParser {
    handler: MeterHandler,
}

impl SelectedMetersParser {
    pub fn new(handler: MeterHandler) -> Self {
        SelectedMetersParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>, denomination: Option<Denomination>) -> Result<Reply> {
        let mut outer = FieldReader::new(poll.payload());
        let mut reader = outer.length_prefixed_exact()?;
        let game_number = reader.game_number()?;
        let meters: Vec<MeterCode> = reader.rest().iter().map(|&code| MeterCode::from(code)).collect();
        validate_count("meter", meters.len(), 1, MAX_SELECTED_METERS)?;

        let Some(response) = query(
            &self.handler,
            LongPollCode::SendSelectedMetersForGameN,
            meters.clone(),
            game_number,
            denomination,
        ) else {
            return Ok(poll.nack());
        };

        let mut reply = poll.reply().length().game_number(game_number)?;
        for meter in meters {
            let Some(value) = response.get(meter) else {
                continue;
            };
            let width = meter.bcd_width();
            if reply.remaining_content() < 1 + width {
                break;
            }
            reply = reply.u8(meter.as_u16() as u8).bcd(value, width)?;
        }
        reply.build()
    }
}

impl LongPollParser for SelectedMetersParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendSelectedMetersForGameN
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll, None))
    }

    fn as_multi_denom(&self) -> Option<&dyn MultiDenomAwareParser> {
        Some(self)
    }
}

impl MultiDenomAwareParser for SelectedMetersParser {
    fn parse_for_denomination(
        &self,
        poll: &LongPoll<'_>,
        denomination: Option<Denomination>,
    ) -> Reply {
        respond(poll, self.try_parse(poll, denomination))
    }
}

/// 0x6F and 0xAF extended meters for game N.
///
/// Request: `[length, game (BCD 2), meter code (2 bytes, LSB first)...]`.
/// Reply: `[address, code, length, game, (meter code, size, meter)...]`.
/// 0x6F leaves out meters the handler did not supply; 0xAF reports them with
/// size zero.
pub struct ExtendedMetersParser {
    command: LongPollCode,
    handler: MeterHandler,
}

impl ExtendedMetersParser {
    pub fn new(command: LongPollCode, handler: MeterHandler) -> Self {
        debug_assert!(matches!(
            command,
            LongPollCode::SendExtendedMetersForGameN | LongPollCode::SendExtendedMetersForGameNAlt
        ));
        ExtendedMetersParser { command, handler }
    }

    fn reports_unsupported(&self) -> bool {
        self.command == LongPollCode::SendExtendedMetersForGameNAlt
    }

    fn try_parse(&self, poll: &LongPoll<'_>, denomination: Option<Denomination>) -> Result<Reply> {
        let mut outer = FieldReader::new(poll.payload());
        let mut reader = outer.length_prefixed_exact()?;
        let game_number = reader.game_number()?;
        if reader.remaining() % 2 != 0 {
            return Err(Error::invalid_field("Meter code list has an odd length"));
        }
        let mut meters = Vec::with_capacity(reader.remaining() / 2);
        while !reader.is_empty() {
            meters.push(MeterCode(reader.u16_le()?));
        }
        validate_count("meter", meters.len(), 1, MAX_EXTENDED_METERS)?;

        let Some(response) = query(
            &self.handler,
            self.command,
            meters.clone(),
            game_number,
            denomination,
        ) else {
            return Ok(poll.nack());
        };

        let mut reply = poll.reply().length().game_number(game_number)?;
        for meter in meters {
            let entry = match response.get(meter) {
                Some(value) => Some((meter.bcd_width(), value)),
                None if self.reports_unsupported() => None,
                None => continue,
            };
            let size = entry.map_or(0, |(width, _)| width);
            if reply.remaining_content() < 3 + size {
                break;
            }
            reply = reply.u16_le(meter.as_u16()).u8(size as u8);
            if let Some((width, value)) = entry {
                reply = reply.bcd(value, width)?;
            }
        }
        reply.build()
    }
}

impl LongPollParser for ExtendedMetersParser {
    fn command(&self) -> LongPollCode {
        self.command
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll, None))
    }

    fn as_multi_denom(&self) -> Option<&dyn MultiDenomAwareParser> {
        Some(self)
    }
}

impl MultiDenomAwareParser for ExtendedMetersParser {
    fn parse_for_denomination(
        &self,
        poll: &LongPoll<'_>,
        denomination: Option<Denomination>,
    ) -> Reply {
        respond(poll, self.try_parse(poll, denomination))
    }
}
