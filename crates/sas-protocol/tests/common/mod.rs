//! Common test utilities for integration tests.
//!
//! Handlers built here record every request they receive so tests can
//! assert both the reply bytes and whether (and with what) the business
//! logic was called.

#![allow(dead_code)]

use sas_core::SasClientConfig;
use sas_protocol::{ParserRegistry, Reply, SasHandlers, SharedHandler};
use sas_protocol::parsers::GameConfiguration;
use std::sync::{Arc, Mutex};

/// Gaming machine address used across the integration tests.
pub const ADDRESS: u8 = 0x01;

/// Records the requests a handler receives.
#[derive(Clone)]
pub struct Recorder<Req> {
    calls: Arc<Mutex<Vec<Req>>>,
}

impl<Req> Recorder<Req>
where
    Req: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Recorder {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handler that records each request and answers `response`.
    pub fn handler<Resp>(&self, response: Option<Resp>) -> SharedHandler<Req, Resp>
    where
        Resp: Clone + Send + Sync + 'static,
    {
        let calls = Arc::clone(&self.calls);
        Arc::new(move |request: Req| {
            calls.lock().expect("recorder lock poisoned").push(request);
            response.clone()
        })
    }

    pub fn calls(&self) -> Vec<Req> {
        self.calls.lock().expect("recorder lock poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().expect("recorder lock poisoned").len()
    }
}

/// Configuration for address [`ADDRESS`], client 0, penny accounting.
pub fn config() -> SasClientConfig {
    SasClientConfig {
        address: ADDRESS,
        asset_number: 1234,
        ..SasClientConfig::default()
    }
}

/// Standard registry over [`config`].
pub fn registry(handlers: SasHandlers) -> ParserRegistry {
    ParserRegistry::standard(&config(), handlers).expect("Test helper: standard registry")
}

/// Game configuration used by the machine information polls.
pub fn sample_game() -> GameConfiguration {
    GameConfiguration {
        game_id: "AB".to_string(),
        additional_id: "001".to_string(),
        denomination: 0x01,
        max_bet: 5,
        progressive_group: 0,
        game_options: 0x0102,
        paytable_id: "PT0042".to_string(),
        base_percentage: "9350".to_string(),
    }
}

/// Send `[ADDRESS, code, payload...]` through `registry`.
pub fn poll(registry: &ParserRegistry, code: u8, payload: &[u8]) -> Reply {
    let mut frame = vec![ADDRESS, code];
    frame.extend_from_slice(payload);
    registry.process(&frame)
}

/// Assert that `reply` is exactly `[ADDRESS | 0x80]`.
pub fn assert_nack(reply: &Reply) {
    assert_eq!(reply.as_bytes(), &[ADDRESS | 0x80], "expected NACK, got {reply:?}");
}

/// Assert that `reply` is exactly `[ADDRESS]`.
pub fn assert_ack(reply: &Reply) {
    assert_eq!(reply.as_bytes(), &[ADDRESS], "expected ACK, got {reply:?}");
}
