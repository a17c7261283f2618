//! Game information polls.
//!
//! Fixed-width ASCII fields (game ID, paytable ID, base percentage) are fitted
//! to their width: longer text keeps its leftmost characters, shorter text is
//! left-padded with `'0'`.

use crate::{
    commands::LongPollCode,
    field::FieldReader,
    frame::{LongPoll, Reply},
    handler::SharedHandler,
    parser::{LongPollParser, MultiDenomAwareParser, respond},
    validation::{expect_empty, expect_len},
};
use sas_core::{
    Denomination, Result,
    constants::{GAME_NUMBER_LENGTH, MAX_CONTENT_LENGTH, MAX_GAME_NAME_LENGTH},
};
use serde::{Deserialize, Serialize};

/// Game selected by a game-N poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRequest {
    /// 0 is the gaming machine itself
    pub game_number: u16,
    pub denomination: Option<Denomination>,
}

fn read_game(poll: &LongPoll<'_>, denomination: Option<Denomination>) -> Result<GameRequest> {
    expect_len(poll.payload(), GAME_NUMBER_LENGTH)?;
    let game_number = FieldReader::new(poll.payload()).game_number()?;
    Ok(GameRequest {
        game_number,
        denomination,
    })
}

/// Game identification and configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfiguration {
    /// Two ASCII characters
    pub game_id: String,
    /// Three ASCII characters
    pub additional_id: String,
    /// Denomination code of the game (0x53 only)
    pub denomination: u8,
    pub max_bet: u8,
    pub progressive_group: u8,
    pub game_options: u16,
    /// Six ASCII characters
    pub paytable_id: String,
    /// Four ASCII digits, e.g. "9350" for 93.50%
    pub base_percentage: String,
}

const GAME_ID_WIDTH: usize = 2;
const ADDITIONAL_ID_WIDTH: usize = 3;
const PAYTABLE_ID_WIDTH: usize = 6;
const BASE_PERCENTAGE_WIDTH: usize = 4;

/// 0x1F send gaming machine ID and information.
///
/// `[address, 1F, game ID (2), additional ID (3), accounting denomination,
/// max bet, progressive group, game options (LSB first), paytable ID (6),
/// base percentage (4)]`
pub struct MachineIdParser {
    accounting_denomination: u8,
    handler: SharedHandler<(), GameConfiguration>,
}

impl MachineIdParser {
    pub fn new(accounting_denomination: u8, handler: SharedHandler<(), GameConfiguration>) -> Self {
        MachineIdParser {
            accounting_denomination,
            handler,
        }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let Some(info) = self.handler.handle(()) else {
            return Ok(poll.nack());
        };

        poll.reply()
            .ascii(&info.game_id, GAME_ID_WIDTH)
            .ascii(&info.additional_id, ADDITIONAL_ID_WIDTH)
            .u8(self.accounting_denomination)
            .u8(info.max_bet)
            .u8(info.progressive_group)
            .u16_le(info.game_options)
            .ascii(&info.paytable_id, PAYTABLE_ID_WIDTH)
            .ascii(&info.base_percentage, BASE_PERCENTAGE_WIDTH)
            .build()
    }
}

impl LongPollParser for MachineIdParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendMachineIdInformation
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0x53 send game N configuration.
pub struct GameConfigurationParser {
    handler: SharedHandler<GameRequest, GameConfiguration>,
}

impl GameConfigurationParser {
    pub fn new(handler: SharedHandler<GameRequest, GameConfiguration>) -> Self {
        GameConfigurationParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>, denomination: Option<Denomination>) -> Result<Reply> {
        let request = read_game(poll, denomination)?;
        let Some(info) = self.handler.handle(request) else {
            return Ok(poll.nack());
        };

        poll.reply()
            .game_number(request.game_number)?
            .ascii(&info.game_id, GAME_ID_WIDTH)
            .ascii(&info.additional_id, ADDITIONAL_ID_WIDTH)
            .u8(info.denomination)
            .u8(info.max_bet)
            .u8(info.progressive_group)
            .u16_le(info.game_options)
            .ascii(&info.paytable_id, PAYTABLE_ID_WIDTH)
            .ascii(&info.base_percentage, BASE_PERCENTAGE_WIDTH)
            .build()
    }
}

impl LongPollParser for GameConfigurationParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendGameNConfiguration
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll, None))
    }

    fn as_multi_denom(&self) -> Option<&dyn MultiDenomAwareParser> {
        Some(self)
    }
}

impl MultiDenomAwareParser for GameConfigurationParser {
    fn parse_for_denomination(
        &self,
        poll: &LongPoll<'_>,
        denomination: Option<Denomination>,
    ) -> Reply {
        respond(poll, self.try_parse(poll, denomination))
    }
}

/// Game number answer without request data: 0x51 number of games
/// implemented, 0x55 selected game number.
pub struct GameNumberParser {
    command: LongPollCode,
    handler: SharedHandler<(), u16>,
}

impl GameNumberParser {
    pub fn new(command: LongPollCode, handler: SharedHandler<(), u16>) -> Self {
        debug_assert!(matches!(
            command,
            LongPollCode::SendNumberOfGames | LongPollCode::SendSelectedGameNumber
        ));
        GameNumberParser { command, handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        match self.handler.handle(()) {
            Some(value) => poll.reply().game_number(value)?.build(),
            None => Ok(poll.nack()),
        }
    }
}

impl LongPollParser for GameNumberParser {
    fn command(&self) -> LongPollCode {
        self.command
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0x56 send enabled game numbers.
///
/// `[address, 56, length, count, game...]`. Lists that would exceed the
/// one-byte length are cut to the first 127 games.
pub struct EnabledGamesParser {
    handler: SharedHandler<Option<Denomination>, Vec<u16>>,
}

impl EnabledGamesParser {
    pub fn new(handler: SharedHandler<Option<Denomination>, Vec<u16>>) -> Self {
        EnabledGamesParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>, denomination: Option<Denomination>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let Some(games) = self.handler.handle(denomination) else {
            return Ok(poll.nack());
        };

        let fits = (MAX_CONTENT_LENGTH - 1) / GAME_NUMBER_LENGTH;
        let games = &games[..games.len().min(fits)];

        let mut reply = poll.reply().length().u8(games.len() as u8);
        for game in games {
            reply = reply.game_number(*game)?;
        }
        reply.build()
    }
}

impl LongPollParser for EnabledGamesParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendEnabledGameNumbers
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll, None))
    }

    fn as_multi_denom(&self) -> Option<&dyn MultiDenomAwareParser> {
        Some(self)
    }
}

impl MultiDenomAwareParser for EnabledGamesParser {
    fn parse_for_denomination(
        &self,
        poll: &LongPoll<'_>,
        denomination: Option<Denomination>,
    ) -> Reply {
        respond(poll, self.try_parse(poll, denomination))
    }
}

/// Feature bytes reported by 0xA0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledFeatures {
    pub features1: u8,
    pub features2: u8,
    pub features3: u8,
}

/// 0xA0 send enabled features: `[address, A0, game, f1, f2, f3, 00, 00]`.
pub struct EnabledFeaturesParser {
    handler: SharedHandler<GameRequest, EnabledFeatures>,
}

impl EnabledFeaturesParser {
    pub fn new(handler: SharedHandler<GameRequest, EnabledFeatures>) -> Self {
        EnabledFeaturesParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        let request = read_game(poll, None)?;
        let Some(features) = self.handler.handle(request) else {
            return Ok(poll.nack());
        };

        poll.reply()
            .game_number(request.game_number)?
            .u8(features.features1)
            .u8(features.features2)
            .u8(features.features3)
            .bytes(&[0x00, 0x00])
            .build()
    }
}

impl LongPollParser for EnabledFeaturesParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendEnabledFeatures
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0xA4 send cash out limit: `[address, A4, game, limit (BCD 2)]`.
pub struct CashOutLimitParser {
    handler: SharedHandler<GameRequest, u16>,
}

impl CashOutLimitParser {
    pub fn new(handler: SharedHandler<GameRequest, u16>) -> Self {
        CashOutLimitParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        let request = read_game(poll, None)?;
        let Some(limit) = self.handler.handle(request) else {
            return Ok(poll.nack());
        };

        poll.reply()
            .game_number(request.game_number)?
            .bcd(u64::from(limit), 2)?
            .build()
    }
}

impl LongPollParser for CashOutLimitParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendCashOutLimit
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagerCategoryRequest {
    pub game_number: u16,
    pub category: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagerCategoryInfo {
    /// Four ASCII digits
    pub payback_percentage: String,
    pub coin_in: u64,
}

/// 0xB4 send wager category information.
///
/// `[address, B4, length, game, category (BCD 2), payback (4), size,
/// coin in (BCD size)]`. Without handler data the payback is `"0000"` and the
/// coin in meter is omitted (size zero).
pub struct WagerCategoryParser {
    handler: SharedHandler<WagerCategoryRequest, WagerCategoryInfo>,
}

impl WagerCategoryParser {
    pub fn new(handler: SharedHandler<WagerCategoryRequest, WagerCategoryInfo>) -> Self {
        WagerCategoryParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 4)?;
        let mut reader = FieldReader::new(poll.payload());
        let request = WagerCategoryRequest {
            game_number: reader.game_number()?,
            category: reader.bcd(2)? as u16,
        };

        let reply = poll
            .reply()
            .length()
            .game_number(request.game_number)?
            .bcd(u64::from(request.category), 2)?;

        match self.handler.handle(request) {
            Some(info) => reply
                .ascii(&info.payback_percentage, 4)
                .sized_bcd(info.coin_in)?
                .build(),
            None => reply.bytes(b"0000").u8(0).build(),
        }
    }
}

impl LongPollParser for WagerCategoryParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendWagerCategoryInformation
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedGameInfo {
    pub max_bet: u16,
    pub progressive_group: u8,
    /// Bit 0 = level 1, ...
    pub progressive_levels: u32,
    pub name: String,
    pub paytable_name: String,
    pub wager_categories: u16,
    /// Denominations the game can be played at, in reporting order
    pub denominations: Vec<Denomination>,
}

/// 0xB5 send extended game N information.
///
/// `[address, B5, length, game, max bet (BCD 2), progressive group,
/// levels (LSB first 4), name length, name, paytable length, paytable,
/// wager categories (BCD 2), denomination count, denomination codes...]`.
/// Names are cut to 20 characters. The denomination list keeps as many
/// leading entries as fit the 255-byte content budget and the count byte
/// reports how many were sent.
pub struct ExtendedGameInfoParser {
    handler: SharedHandler<GameRequest, ExtendedGameInfo>,
}

impl ExtendedGameInfoParser {
    pub fn new(handler: SharedHandler<GameRequest, ExtendedGameInfo>) -> Self {
        ExtendedGameInfoParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>, denomination: Option<Denomination>) -> Result<Reply> {
        let request = read_game(poll, denomination)?;
        let Some(info) = self.handler.handle(request) else {
            return Ok(poll.nack());
        };

        let reply = poll
            .reply()
            .length()
            .game_number(request.game_number)?
            .bcd(u64::from(info.max_bet), 2)?
            .u8(info.progressive_group)
            .u32_le(info.progressive_levels)
            .prefixed_ascii(&info.name, MAX_GAME_NAME_LENGTH)
            .prefixed_ascii(&info.paytable_name, MAX_GAME_NAME_LENGTH)
            .bcd(u64::from(info.wager_categories), 2)?;

        let room = reply.remaining_content().saturating_sub(1);
        let codes: Vec<u8> = info
            .denominations
            .iter()
            .take(room)
            .map(|denom| denom.code())
            .collect();
        reply.u8(codes.len() as u8).bytes(&codes).build()
    }
}

impl LongPollParser for ExtendedGameInfoParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendExtendedGameInformation
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll, None))
    }

    fn as_multi_denom(&self) -> Option<&dyn MultiDenomAwareParser> {
        Some(self)
    }
}

impl MultiDenomAwareParser for ExtendedGameInfoParser {
    fn parse_for_denomination(
        &self,
        poll: &LongPoll<'_>,
        denomination: Option<Denomination>,
    ) -> Reply {
        respond(poll, self.try_parse(poll, denomination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn machine_info(paytable_id: &str) -> GameConfiguration {
        GameConfiguration {
            game_id: "AB".to_string(),
            additional_id: "7".to_string(),
            denomination: 0x02,
            max_bet: 5,
            progressive_group: 1,
            game_options: 0x0102,
            paytable_id: paytable_id.to_string(),
            base_percentage: "9350".to_string(),
        }
    }

    #[test]
    fn test_machine_id_truncates_paytable() {
        let info = machine_info("PT123456789");
        let parser = MachineIdParser::new(0x01, Arc::new(move |()| Some(info.clone())));
        let reply = parser.parse(&LongPoll::new(0x01, 0x1F, &[]));

        let mut expected = vec![0x01, 0x1F];
        expected.extend_from_slice(b"AB007");
        expected.extend_from_slice(&[0x01, 0x05, 0x01, 0x02, 0x01]);
        expected.extend_from_slice(b"PT1234");
        expected.extend_from_slice(b"9350");
        assert_eq!(reply.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_machine_id_pads_short_paytable() {
        let info = machine_info("42");
        let parser = MachineIdParser::new(0x01, Arc::new(move |()| Some(info.clone())));
        let reply = parser.parse(&LongPoll::new(0x01, 0x1F, &[]));
        assert_eq!(&reply.as_bytes()[12..18], b"000042");
        assert_eq!(reply.len(), 22);
    }

    #[test]
    fn test_machine_id_without_info() {
        let parser = MachineIdParser::new(0x01, Arc::new(|()| None::<GameConfiguration>));
        assert_eq!(parser.parse(&LongPoll::new(0x01, 0x1F, &[])).as_bytes(), &[0x81]);
    }

    #[test]
    fn test_game_configuration() {
        let parser = GameConfigurationParser::new(Arc::new(|request: GameRequest| {
            (request.game_number == 3).then(|| machine_info("ABCDEF"))
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0x53, &[0x00, 0x03]));
        assert_eq!(&reply.as_bytes()[..4], &[0x01, 0x53, 0x00, 0x03]);
        assert_eq!(reply.as_bytes()[9], 0x02);
        assert_eq!(reply.len(), 24);

        let reply = parser.parse(&LongPoll::new(0x01, 0x53, &[0x00, 0x04]));
        assert_eq!(reply.as_bytes(), &[0x81]);
    }

    #[test]
    fn test_game_number_parsers() {
        let parser = GameNumberParser::new(LongPollCode::SendNumberOfGames, Arc::new(|()| Some(12u16)));
        assert_eq!(
            parser.parse(&LongPoll::new(0x01, 0x51, &[])).as_bytes(),
            &[0x01, 0x51, 0x00, 0x12]
        );

        let parser =
            GameNumberParser::new(LongPollCode::SendSelectedGameNumber, Arc::new(|()| None::<u16>));
        assert_eq!(parser.parse(&LongPoll::new(0x01, 0x55, &[])).as_bytes(), &[0x81]);
    }

    #[test]
    fn test_enabled_games() {
        let parser = EnabledGamesParser::new(Arc::new(|_: Option<Denomination>| {
            Some(vec![1, 2, 10])
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0x56, &[]));
        assert_eq!(
            reply.as_bytes(),
            &[0x01, 0x56, 0x07, 0x03, 0x00, 0x01, 0x00, 0x02, 0x00, 0x10]
        );
    }

    #[test]
    fn test_enabled_games_truncates_whole_entries() {
        let parser = EnabledGamesParser::new(Arc::new(|_: Option<Denomination>| {
            Some((1..=200).collect())
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0x56, &[]));
        let bytes = reply.as_bytes();
        assert_eq!(bytes[2], 255);
        assert_eq!(bytes[3], 127);
        assert_eq!(bytes.len(), 3 + 255);
        assert_eq!(&bytes[bytes.len() - 2..], &[0x01, 0x27]);
    }

    #[test]
    fn test_enabled_features() {
        let parser = EnabledFeaturesParser::new(Arc::new(|_: GameRequest| {
            Some(EnabledFeatures {
                features1: 0x81,
                features2: 0x02,
                features3: 0x00,
            })
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0xA0, &[0x00, 0x00]));
        assert_eq!(
            reply.as_bytes(),
            &[0x01, 0xA0, 0x00, 0x00, 0x81, 0x02, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_cash_out_limit() {
        let parser = CashOutLimitParser::new(Arc::new(|_: GameRequest| Some(1_200u16)));
        let reply = parser.parse(&LongPoll::new(0x01, 0xA4, &[0x00, 0x01]));
        assert_eq!(reply.as_bytes(), &[0x01, 0xA4, 0x00, 0x01, 0x12, 0x00]);
    }

    #[test]
    fn test_wager_category() {
        let parser = WagerCategoryParser::new(Arc::new(|request: WagerCategoryRequest| {
            (request.category == 2).then(|| WagerCategoryInfo {
                payback_percentage: "9125".to_string(),
                coin_in: 12_345,
            })
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0xB4, &[0x00, 0x01, 0x00, 0x02]));
        let mut expected = vec![0x01, 0xB4, 0x0C, 0x00, 0x01, 0x00, 0x02];
        expected.extend_from_slice(b"9125");
        expected.extend_from_slice(&[0x03, 0x01, 0x23, 0x45]);
        assert_eq!(reply.as_bytes(), expected.as_slice());

        let reply = parser.parse(&LongPoll::new(0x01, 0xB4, &[0x00, 0x01, 0x00, 0x03]));
        let mut expected = vec![0x01, 0xB4, 0x09, 0x00, 0x01, 0x00, 0x03];
        expected.extend_from_slice(b"0000");
        expected.push(0x00);
        assert_eq!(reply.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_extended_game_info() {
        let parser = ExtendedGameInfoParser::new(Arc::new(|_: GameRequest| {
            Some(ExtendedGameInfo {
                max_bet: 250,
                progressive_group: 0,
                progressive_levels: 0x0000_0003,
                name: "DOUBLE DIAMOND DELUXE EDITION".to_string(),
                paytable_name: "DD95".to_string(),
                wager_categories: 1,
                denominations: vec![
                    Denomination::from_cents(1).unwrap(),
                    Denomination::from_cents(25).unwrap(),
                ],
            })
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0xB5, &[0x00, 0x01]));
        let bytes = reply.as_bytes();

        // game 2 + max bet 2 + group 1 + levels 4 + 21 name + 5 paytable + 2
        // + count 1 + 2 denominations
        assert_eq!(bytes[2] as usize, 40);
        assert_eq!(bytes.len(), 3 + 40);
        assert_eq!(&bytes[5..7], &[0x02, 0x50]);
        assert_eq!(&bytes[8..12], &[0x03, 0x00, 0x00, 0x00]);
        assert_eq!(bytes[12], 20);
        assert_eq!(&bytes[13..33], b"DOUBLE DIAMOND DELUX");
        assert_eq!(bytes[33], 4);
        assert_eq!(&bytes[34..38], b"DD95");
        assert_eq!(&bytes[38..40], &[0x00, 0x01]);
        assert_eq!(&bytes[40..], &[0x02, 0x01, 0x04]);
    }

    #[test]
    fn test_extended_game_info_truncates_denominations() {
        let table: Vec<Denomination> = Denomination::all().collect();
        let offered: Vec<Denomination> = table.iter().copied().cycle().take(300).collect();
        let expected: Vec<u8> = offered.iter().map(|denom| denom.code()).collect();
        let parser = ExtendedGameInfoParser::new(Arc::new(move |_: GameRequest| {
            Some(ExtendedGameInfo {
                name: "N".repeat(30),
                paytable_name: "P".repeat(30),
                denominations: offered.clone(),
                ..ExtendedGameInfo::default()
            })
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0xB5, &[0x00, 0x01]));
        let bytes = reply.as_bytes();

        // fixed part: game 2 + max bet 2 + group 1 + levels 4 + 21 + 21 + 2
        let count_at = 3 + 53;
        let sent = MAX_CONTENT_LENGTH - 53 - 1;
        assert_eq!(bytes[2] as usize, MAX_CONTENT_LENGTH);
        assert_eq!(bytes.len(), 3 + MAX_CONTENT_LENGTH);
        assert_eq!(bytes[count_at] as usize, sent);
        assert_eq!(&bytes[count_at + 1..], &expected[..sent]);
    }

    #[test]
    fn test_extended_game_info_without_denominations() {
        let parser = ExtendedGameInfoParser::new(Arc::new(|_: GameRequest| {
            Some(ExtendedGameInfo::default())
        }));
        let reply = parser.parse(&LongPoll::new(0x01, 0xB5, &[0x00, 0x01]));
        // game 2 + max bet 2 + group 1 + levels 4 + 1 + 1 + 2 + count 1
        assert_eq!(reply.as_bytes()[2], 14);
        assert_eq!(reply.as_bytes().last(), Some(&0x00));
    }

    #[test]
    fn test_invalid_game_number_nacks() {
        let parser = ExtendedGameInfoParser::new(Arc::new(|_: GameRequest| None::<ExtendedGameInfo>));
        assert_eq!(parser.parse(&LongPoll::new(0x01, 0xB5, &[0x0B, 0x00])).as_bytes(), &[0x81]);
    }
}
