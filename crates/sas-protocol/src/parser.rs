//! Long poll parser contract.
//!
//! A parser owns exactly one [`LongPollCode`]. It validates the request
//! payload, builds a typed request, calls its handler once and encodes the
//! answer. Shape problems never reach the handler: they come back as a NACK.
//!
//! Parsers write their body as a function returning `Result<Reply>` and hand
//! the outcome to [`respond`], which maps every error to a NACK and logs it.
//!
//! ```
//! use sas_protocol::{LongPoll, LongPollCode, LongPollParser, Reply, respond};
//! use sas_protocol::validation::expect_empty;
//!
//! struct Ping;
//!
//! impl LongPollParser for Ping {
//!     fn command(&self) -> LongPollCode {
//!         LongPollCode::Startup
//!     }
//!
//!     fn parse(&self, poll: &LongPoll<'_>) -> Reply {
//!         respond(poll, expect_empty(poll.payload()).map(|()| poll.ack()))
//!     }
//! }
//!
//! assert_eq!(Ping.parse(&LongPoll::new(1, 0x02, &[])).as_bytes(), &[0x01]);
//! assert_eq!(Ping.parse(&LongPoll::new(1, 0x02, &[0x00])).as_bytes(), &[0x81]);
//! ```

use crate::{
    commands::LongPollCode,
    frame::{LongPoll, Reply},
};
use sas_core::{Denomination, Result};
use tracing::{debug, warn};

/// One command's parser/encoder.
pub trait LongPollParser: Send + Sync {
    /// Command code this parser answers.
    fn command(&self) -> LongPollCode;

    /// Parse one poll and build the reply.
    fn parse(&self, poll: &LongPoll<'_>) -> Reply;

    /// Multi-denomination view of this parser, if it has one.
    fn as_multi_denom(&self) -> Option<&dyn MultiDenomAwareParser> {
        None
    }
}

/// Parser that can answer inside the multi-denomination preamble.
pub trait MultiDenomAwareParser: LongPollParser {
    /// Parse with a denomination context. `None` is the legacy meaning
    /// (all denominations) and must match [`LongPollParser::parse`].
    fn parse_for_denomination(
        &self,
        poll: &LongPoll<'_>,
        denomination: Option<Denomination>,
    ) -> Reply;
}

/// Answer for codes no parser is registered for: always NACK.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnhandledParser;

impl UnhandledParser {
    pub fn parse(&self, poll: &LongPoll<'_>) -> Reply {
        debug!(code = poll.command_code(), "No parser registered, sending NACK");
        poll.nack()
    }
}

/// Turn a parser body's outcome into the reply sent on the wire.
///
/// Errors become a NACK. Encoding overflows are logged at `warn!` since
/// they point at handler data that cannot be represented; everything else
/// is a malformed poll and logged at `debug!`.
pub fn respond(poll: &LongPoll<'_>, outcome: Result<Reply>) -> Reply {
    match outcome {
        Ok(reply) => reply,
        Err(error) if error.is_overflow() => {
            warn!(
                address = poll.address(),
                code = poll.command_code(),
                %error,
                "Reply field overflow, sending NACK"
            );
            poll.nack()
        }
        Err(error) => {
            debug!(
                address = poll.address(),
                code = poll.command_code(),
                %error,
                "Rejected long poll"
            );
            poll.nack()
        }
    }
}
