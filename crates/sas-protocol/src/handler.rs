//! Business-logic seam called by the parsers.
//!
//! A parser decodes the request, calls its handler exactly once and encodes
//! whatever comes back. `None` means "nothing to report"; each command decides
//! whether that is silence, a NACK or a structured empty reply.
//!
//! Any `Fn(Req) -> Option<Resp>` closure is a handler:
//!
//! ```
//! use std::sync::Arc;
//! use sas_protocol::handler::{LongPollHandler, SharedHandler};
//!
//! let credits: SharedHandler<(), u64> = Arc::new(|_: ()| Some(1_500u64));
//! assert_eq!(credits.handle(()), Some(1_500));
//! ```

use std::sync::Arc;

/// Handler for one request type.
pub trait LongPollHandler<Req, Resp>: Send + Sync {
    fn handle(&self, request: Req) -> Option<Resp>;
}

impl<Req, Resp, F> LongPollHandler<Req, Resp> for F
where
    F: Fn(Req) -> Option<Resp> + Send + Sync,
{
    fn handle(&self, request: Req) -> Option<Resp> {
        self(request)
    }
}

/// Handler shared between parsers (several meter polls use the same one).
pub type SharedHandler<Req, Resp> = Arc<dyn LongPollHandler<Req, Resp>>;
