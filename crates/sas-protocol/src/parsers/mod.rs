//! Long poll parsers, grouped by command family.
//!
//! Every parser owns one command code, or a small family sharing a layout,
//! and is constructed with the handler it calls. The standard table that
//! wires them together lives in [`crate::registry`].

pub mod aft;
pub mod control;
pub mod denom;
pub mod game;
pub mod info;
pub mod meters;
pub mod progressive;
pub mod ticket;

pub use aft::*;
pub use control::*;
pub use denom::*;
pub use game::*;
pub use info::*;
pub use meters::*;
pub use progressive::*;
pub use ticket::*;
