//! Multi-denomination preamble (0xB0).
//!
//! The preamble wraps another long poll and names the denomination it
//! should answer for:
//!
//! ```text
//! request  [address][B0][length][denom code][inner code][inner data...]
//! reply    [address][B0][length][denom code][inner code][inner reply...]
//! ```
//!
//! Denomination code 0 is the legacy meaning (all denominations). Failures
//! are reported as `[address, B0, 02, 00, error]`, never as a bare NACK.
//! ACK, NACK and silence from the inner parser pass through unwrapped.

use crate::{
    builder::ReplyBuilder,
    commands::LongPollCode,
    field::FieldReader,
    frame::{LongPoll, Reply},
    handler::SharedHandler,
    parser::respond,
    registry::ParserRegistry,
};
use sas_core::{Denomination, Error, Result, constants::LEGACY_DENOMINATION_CODE};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Error code carried by a preamble error reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MultiDenomError {
    NotValidPlayerDenom = 0x01,
    NotMultiDenomAware = 0x02,
    LongPollNotSupported = 0x03,
}

impl MultiDenomError {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MultiDenomError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            MultiDenomError::NotValidPlayerDenom => "not a valid player denomination",
            MultiDenomError::NotMultiDenomAware => "long poll is not multi-denomination aware",
            MultiDenomError::LongPollNotSupported => "long poll not supported",
        };
        f.write_str(text)
    }
}

/// Dispatcher for the 0xB0 preamble.
///
/// Without a player-denomination handler every code in the denomination
/// table is accepted. With one, only the denominations it returns are; a
/// handler that returns `None` leaves the table unrestricted.
#[derive(Clone, Default)]
pub struct MultiDenomPreamble {
    player_denominations: Option<SharedHandler<(), Vec<Denomination>>>,
}

impl MultiDenomPreamble {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the preamble to the machine's enabled player denominations.
    pub fn with_player_denominations(handler: SharedHandler<(), Vec<Denomination>>) -> Self {
        MultiDenomPreamble {
            player_denominations: Some(handler),
        }
    }

    pub fn command(&self) -> LongPollCode {
        LongPollCode::MultiDenomPreamble
    }

    /// Answer one preamble poll, resolving the inner command in `registry`.
    pub fn parse(&self, poll: &LongPoll<'_>, registry: &ParserRegistry) -> Reply {
        respond(poll, self.try_parse(poll, registry))
    }

    fn try_parse(&self, poll: &LongPoll<'_>, registry: &ParserRegistry) -> Result<Reply> {
        let mut body = FieldReader::new(poll.payload()).length_prefixed_exact()?;
        if body.remaining() < 2 {
            return Err(Error::PayloadTooShort {
                needed: 2,
                available: body.remaining(),
            });
        }
        let denom_code = body.u8()?;
        let inner_code = body.u8()?;
        let inner_data = body.rest();

        let denomination = match self.resolve_denomination(denom_code) {
            Ok(denomination) => denomination,
            Err(error) => return error_reply(poll, error),
        };

        let Some(parser) = registry.get_parser(inner_code) else {
            return error_reply(poll, MultiDenomError::LongPollNotSupported);
        };
        let Some(aware) = parser.as_multi_denom() else {
            return error_reply(poll, MultiDenomError::NotMultiDenomAware);
        };

        let inner = LongPoll::new(poll.address(), inner_code, inner_data);
        let reply = aware.parse_for_denomination(&inner, denomination);

        if reply.len() <= 1 {
            return Ok(reply);
        }
        ReplyBuilder::new(poll.address(), poll.command_code())
            .length()
            .u8(denom_code)
            .bytes(&reply.as_bytes()[1..])
            .build()
    }

    fn resolve_denomination(
        &self,
        code: u8,
    ) -> std::result::Result<Option<Denomination>, MultiDenomError> {
        if code == LEGACY_DENOMINATION_CODE {
            return Ok(None);
        }
        let denomination =
            Denomination::from_code(code).ok_or(MultiDenomError::NotValidPlayerDenom)?;

        let enabled = self
            .player_denominations
            .as_ref()
            .and_then(|handler| handler.handle(()));
        match enabled {
            Some(enabled) if !enabled.contains(&denomination) => {
                Err(MultiDenomError::NotValidPlayerDenom)
            }
            _ => Ok(Some(denomination)),
        }
    }
}

fn error_reply(poll: &LongPoll<'_>, error: MultiDenomError) -> Result<Reply> {
    debug!(address = poll.address(), %error, "Multi-denomination preamble rejected");
    poll.reply()
        .length()
        .u8(LEGACY_DENOMINATION_CODE)
        .u8(error.as_u8())
        .build()
}

impl fmt::Debug for MultiDenomPreamble {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MultiDenomPreamble")
            .field("restricted", &self.player_denominations.is_some())
            .finish()
    }
}
