pub mod bcd;
pub mod builder;
pub mod commands;
pub mod field;
pub mod frame;
pub mod handler;
pub mod multi_denom;
pub mod parser;
pub mod parsers;
pub mod registry;
pub mod validation;

pub use builder::ReplyBuilder;
pub use commands::LongPollCode;
pub use field::{FieldReader, FieldValue, TaggedRecords};
pub use frame::{Frame, LongPoll, Reply, crc16};
pub use handler::{LongPollHandler, SharedHandler};
pub use multi_denom::{MultiDenomError, MultiDenomPreamble};
pub use parser::{LongPollParser, MultiDenomAwareParser, UnhandledParser, respond};
pub use registry::{ParserRegistry, SasHandlers};
