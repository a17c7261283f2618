//! Denomination and machine numbering polls.

use crate::{
    commands::LongPollCode,
    field::{FieldReader, FieldValue},
    frame::{LongPoll, Reply},
    handler::SharedHandler,
    parser::{LongPollParser, respond},
    validation::expect_empty,
};
use sas_core::{
    Denomination, Result,
    constants::{LEGACY_DENOMINATION_CODE, MAX_CONTENT_LENGTH, MAX_FLOOR_LOCATION_LENGTH},
};
use serde::{Deserialize, Serialize};

/// Most denomination codes a 0xB2 reply can carry after its count byte.
pub const MAX_REPORTED_DENOMINATIONS: usize = MAX_CONTENT_LENGTH - 1;

/// 0xB1 current player denomination and 0xB3 token denomination:
/// `[address, code, denomination]`, code 0 when the handler has none.
pub struct DenominationParser {
    command: LongPollCode,
    handler: SharedHandler<(), Denomination>,
}

impl DenominationParser {
    pub fn new(command: LongPollCode, handler: SharedHandler<(), Denomination>) -> Self {
        debug_assert!(matches!(
            command,
            LongPollCode::SendCurrentPlayerDenomination | LongPollCode::SendTokenDenomination
        ));
        DenominationParser { command, handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let code = self
            .handler
            .handle(())
            .map_or(LEGACY_DENOMINATION_CODE, Denomination::code);
        poll.reply().u8(code).build()
    }
}

impl LongPollParser for DenominationParser {
    fn command(&self) -> LongPollCode {
        self.command
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0xB2 send enabled player denominations: `[address, B2, len, count, codes...]`.
pub struct EnabledDenominationsParser {
    handler: SharedHandler<(), Vec<Denomination>>,
}

impl EnabledDenominationsParser {
    pub fn new(handler: SharedHandler<(), Vec<Denomination>>) -> Self {
        EnabledDenominationsParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let enabled = self.handler.handle(()).unwrap_or_default();
        let reported = &enabled[..enabled.len().min(MAX_REPORTED_DENOMINATIONS)];

        let codes: Vec<u8> = reported.iter().map(|denom| denom.code()).collect();
        poll.reply()
            .length()
            .u8(codes.len() as u8)
            .bytes(&codes)
            .build()
    }
}

impl LongPollParser for EnabledDenominationsParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendEnabledPlayerDenominations
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Bit 0 of the 0xB7 control flags: set the asset number.
pub const SET_ASSET_NUMBER: u8 = 0x01;

/// Bit 1 of the 0xB7 control flags: set the floor location.
pub const SET_FLOOR_LOCATION: u8 = 0x02;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineNumbersRequest {
    pub control_flags: u8,
    pub asset_number: u32,
    pub floor_location: FieldValue,
}

impl MachineNumbersRequest {
    pub fn sets_asset_number(&self) -> bool {
        self.control_flags & SET_ASSET_NUMBER != 0
    }

    pub fn sets_floor_location(&self) -> bool {
        self.control_flags & SET_FLOOR_LOCATION != 0
    }
}

/// Numbers in effect after a 0xB7 poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineNumbers {
    pub control_flags: u8,
    pub asset_number: u32,
    pub floor_location: String,
}

/// 0xB7 set machine numbers.
///
/// Request `len, control flags, N(4) asset, floor location length, floor
/// location (at most 32)`; the reply has the same shape with the values now
/// in effect.
pub struct MachineNumbersParser {
    handler: SharedHandler<MachineNumbersRequest, MachineNumbers>,
}

impl MachineNumbersParser {
    pub fn new(handler: SharedHandler<MachineNumbersRequest, MachineNumbers>) -> Self {
        MachineNumbersParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        let mut body = FieldReader::new(poll.payload()).length_prefixed_exact()?;
        let control_flags = body.u8()?;
        let asset_number = body.u32_be()?;
        let floor_location = body.prefixed_text(0x00, MAX_FLOOR_LOCATION_LENGTH)?;
        body.finish()?;

        let request = MachineNumbersRequest {
            control_flags,
            asset_number,
            floor_location,
        };
        let Some(current) = self.handler.handle(request) else {
            return Ok(poll.nack());
        };

        poll.reply()
            .length()
            .u8(current.control_flags)
            .u32_be(current.asset_number)
            .prefixed_ascii(&current.floor_location, MAX_FLOOR_LOCATION_LENGTH)
            .build()
    }
}

impl LongPollParser for MachineNumbersParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SetMachineNumbers
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_player_and_token_denomination() {
        let player = DenominationParser::new(
            LongPollCode::SendCurrentPlayerDenomination,
            Arc::new(|()| Denomination::from_cents(25)),
        );
        let token = DenominationParser::new(
            LongPollCode::SendTokenDenomination,
            Arc::new(|()| None::<Denomination>),
        );

        assert_eq!(
            player.parse(&LongPoll::new(0x01, 0xB1, &[])).as_bytes(),
            &[0x01, 0xB1, 0x04]
        );
        assert_eq!(
            token.parse(&LongPoll::new(0x01, 0xB3, &[])).as_bytes(),
            &[0x01, 0xB3, 0x00]
        );
        assert!(player.parse(&LongPoll::new(0x01, 0xB1, &[0x00])).is_nack());
    }

    #[test]
    fn test_enabled_denominations() {
        let parser = EnabledDenominationsParser::new(Arc::new(|()| {
            Some(vec![
                Denomination::from_cents(1).unwrap(),
                Denomination::from_cents(5).unwrap(),
                Denomination::from_cents(25).unwrap(),
            ])
        }));
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0xB2, &[])).as_bytes(),
            &[0x01, 0xB2, 0x04, 0x03, 0x01, 0x02, 0x04]
        );

        let none = EnabledDenominationsParser::new(Arc::new(|()| None::<Vec<Denomination>>));
        assert_eq!(
            none.parse(&LongPoll::new(0x01, 0xB2, &[])).as_bytes(),
            &[0x01, 0xB2, 0x01, 0x00]
        );
    }

    #[test]
    fn test_enabled_denominations_truncated() {
        let parser = EnabledDenominationsParser::new(Arc::new(|()| {
            Some(Denomination::all().collect::<Vec<_>>().into_iter().cycle().take(300).collect::<Vec<_>>())
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0xB2, &[]));
        assert_eq!(reply.as_bytes()[2] as usize, MAX_CONTENT_LENGTH);
        assert_eq!(reply.as_bytes()[3] as usize, MAX_REPORTED_DENOMINATIONS);
        assert_eq!(reply.len(), 3 + MAX_CONTENT_LENGTH);
    }

    #[test]
    fn test_set_machine_numbers() {
        let parser = MachineNumbersParser::new(Arc::new(|request: MachineNumbersRequest| {
            assert!(request.sets_asset_number());
            assert!(!request.sets_floor_location());
            Some(MachineNumbers {
                control_flags: request.control_flags,
                asset_number: request.asset_number,
                floor_location: "A-12".to_string(),
            })
        }));

        let payload = [0x06, 0x01, 0x00, 0x00, 0x30, 0x39, 0x00];
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0xB7, &payload)).as_bytes(),
            &[0x01, 0xB7, 0x0A, 0x01, 0x00, 0x00, 0x30, 0x39, 0x04, b'A', b'-', b'1', b'2']
        );
    }

    #[test]
    fn test_set_machine_numbers_rejects_long_floor_location() {
        let parser = MachineNumbersParser::new(Arc::new(|_: MachineNumbersRequest| {
            Some(MachineNumbers::default())
        }));
        let mut payload = vec![39, 0x02, 0x00, 0x00, 0x00, 0x01, 33];
        payload.extend_from_slice(&[b'F'; 33]);
        assert!(parser.parse(&LongPoll::new(0x01, 0xB7, &payload)).is_nack());
    }
}
