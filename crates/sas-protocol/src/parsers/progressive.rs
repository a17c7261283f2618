//! Progressive polls.
//!
//! The host pushes level amounts with 0x80 and 0x86; the machine reports
//! wins with 0x83-0x87. Levels run from 1 to 32.

use crate::{
    commands::LongPollCode,
    field::FieldReader,
    frame::{LongPoll, Reply},
    handler::SharedHandler,
    parser::{LongPollParser, respond},
    validation::{expect_empty, expect_len, validate_progressive_level},
};
use sas_core::{
    Error, Result,
    constants::{AMOUNT_LENGTH, GAME_NUMBER_LENGTH, MAX_CONTENT_LENGTH, METER_LENGTH},
};
use serde::{Deserialize, Serialize};

/// Level number followed by a `B(5)` amount.
const LEVEL_RECORD_LENGTH: usize = 1 + AMOUNT_LENGTH;

/// Most level records a 0x87 reply can carry after group and count.
pub const MAX_REPORTED_WINS: usize = (MAX_CONTENT_LENGTH - 2) / LEVEL_RECORD_LENGTH;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveLevel {
    pub level: u8,
    /// Amount in cents
    pub amount: u64,
}

impl ProgressiveLevel {
    pub fn new(level: u8, amount: u64) -> Self {
        ProgressiveLevel { level, amount }
    }
}

fn read_level(reader: &mut FieldReader<'_>) -> Result<ProgressiveLevel> {
    let level = validate_progressive_level(reader.u8()?)?;
    let amount = reader.bcd(AMOUNT_LENGTH)?;
    Ok(ProgressiveLevel { level, amount })
}

fn ack_or_nack(poll: &LongPoll<'_>, accepted: Option<bool>) -> Reply {
    match accepted {
        Some(true) => poll.ack(),
        _ => poll.nack(),
    }
}

/// Single level amount sent by the host (0x80).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveAmount {
    pub group: u8,
    pub level: ProgressiveLevel,
}

/// 0x80 receive progressive amount: `group, level, B(5)`.
pub struct ProgressiveAmountParser {
    handler: SharedHandler<ProgressiveAmount, bool>,
}

impl ProgressiveAmountParser {
    pub fn new(handler: SharedHandler<ProgressiveAmount, bool>) -> Self {
        ProgressiveAmountParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), 1 + LEVEL_RECORD_LENGTH)?;
        let mut reader = FieldReader::new(poll.payload());
        let group = reader.u8()?;
        let level = read_level(&mut reader)?;

        let accepted = self.handler.handle(ProgressiveAmount { group, level });
        Ok(ack_or_nack(poll, accepted))
    }
}

impl LongPollParser for ProgressiveAmountParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::ReceiveProgressiveAmount
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Several levels of one group, used both by the host (0x86) and in the
/// machine's win report (0x87).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveLevels {
    pub group: u8,
    pub levels: Vec<ProgressiveLevel>,
}

/// 0x86 receive multiple progressive levels: `len, group, n × (level, B(5))`.
pub struct MultipleLevelsParser {
    handler: SharedHandler<ProgressiveLevels, bool>,
}

impl MultipleLevelsParser {
    pub fn new(handler: SharedHandler<ProgressiveLevels, bool>) -> Self {
        MultipleLevelsParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        let mut body = FieldReader::new(poll.payload()).length_prefixed_exact()?;
        let group = body.u8()?;

        let records = body.remaining();
        if records == 0 || records % LEVEL_RECORD_LENGTH != 0 {
            return Err(Error::invalid_field(format!(
                "{records} bytes do not hold whole level records"
            )));
        }

        let mut levels = Vec::with_capacity(records / LEVEL_RECORD_LENGTH);
        while !body.is_empty() {
            levels.push(read_level(&mut body)?);
        }

        let accepted = self.handler.handle(ProgressiveLevels { group, levels });
        Ok(ack_or_nack(poll, accepted))
    }
}

impl LongPollParser for MultipleLevelsParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::ReceiveMultipleProgressiveLevels
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0x83 send cumulative progressive wins for game N: `G → [G, B(4)]`.
pub struct CumulativeWinsParser {
    handler: SharedHandler<u16, u64>,
}

impl CumulativeWinsParser {
    pub fn new(handler: SharedHandler<u16, u64>) -> Self {
        CumulativeWinsParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_len(poll.payload(), GAME_NUMBER_LENGTH)?;
        let game_number = FieldReader::new(poll.payload()).game_number()?;

        match self.handler.handle(game_number) {
            Some(total) => poll
                .reply()
                .game_number(game_number)?
                .bcd(total, METER_LENGTH)?
                .build(),
            None => Ok(poll.nack()),
        }
    }
}

impl LongPollParser for CumulativeWinsParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendCumulativeProgressiveWins
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// Most recent win of one level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveWin {
    pub group: u8,
    pub level: ProgressiveLevel,
}

/// 0x84 and 0x85: `[address, code, group, level, B(5)]`.
///
/// 0x84 NACKs when the handler has no win; 0x85 reports zeros.
pub struct ProgressiveWinParser {
    command: LongPollCode,
    handler: SharedHandler<(), ProgressiveWin>,
}

impl ProgressiveWinParser {
    pub fn new(command: LongPollCode, handler: SharedHandler<(), ProgressiveWin>) -> Self {
        debug_assert!(matches!(
            command,
            LongPollCode::SendProgressiveWinAmount | LongPollCode::SendSasProgressiveWinAmount
        ));
        ProgressiveWinParser { command, handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let win = match self.handler.handle(()) {
            Some(win) => win,
            None if self.command == LongPollCode::SendSasProgressiveWinAmount => {
                ProgressiveWin::default()
            }
            None => return Ok(poll.nack()),
        };

        poll.reply()
            .u8(win.group)
            .u8(win.level.level)
            .bcd(win.level.amount, AMOUNT_LENGTH)?
            .build()
    }
}

impl LongPollParser for ProgressiveWinParser {
    fn command(&self) -> LongPollCode {
        self.command
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}

/// 0x87 send multiple SAS progressive win amounts.
///
/// `[address, 87, len, group, count, (level, B(5))...]`. Reports at most
/// [`MAX_REPORTED_WINS`] wins; with nothing pending it sends group and count
/// zero.
pub struct MultipleWinsParser {
    handler: SharedHandler<(), ProgressiveLevels>,
}

impl MultipleWinsParser {
    pub fn new(handler: SharedHandler<(), ProgressiveLevels>) -> Self {
        MultipleWinsParser { handler }
    }

    fn try_parse(&self, poll: &LongPoll<'_>) -> Result<Reply> {
        expect_empty(poll.payload())?;
        let wins = self.handler.handle(()).unwrap_or_default();
        let reported = &wins.levels[..wins.levels.len().min(MAX_REPORTED_WINS)];

        let mut reply = poll
            .reply()
            .length()
            .u8(wins.group)
            .u8(reported.len() as u8);
        for win in reported {
            reply = reply.u8(win.level).bcd(win.amount, AMOUNT_LENGTH)?;
        }
        reply.build()
    }
}

impl LongPollParser for MultipleWinsParser {
    fn command(&self) -> LongPollCode {
        LongPollCode::SendMultipleSasProgressiveWins
    }

    fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        respond(poll, self.try_parse(poll))
    }
}
