//! Shared `StationContext` test double. Kept outside `#[cfg(test)]` module
//! boundaries of individual files so `resolver`, `manager`, and `service`
//! tests can all reach for the same fake station.

use std::sync::atomic::{AtomicUsize, Ordering};

use device_model_types::{Evse, StationContext};

pub struct FakeStation {
    pub heartbeat_interval: u32,
    pub ws_ping_interval: u32,
    pub evses: Vec<Evse>,
    pub heartbeat_restarts: AtomicUsize,
    pub ws_ping_restarts: AtomicUsize,
}

impl Default for FakeStation {
    fn default() -> Self {
        Self {
            heartbeat_interval: 60,
            ws_ping_interval: 0,
            evses: Vec::new(),
            heartbeat_restarts: AtomicUsize::new(0),
            ws_ping_restarts: AtomicUsize::new(0),
        }
    }
}

impl StationContext for FakeStation {
    fn log_prefix(&self) -> String {
        "[TEST]".to_string()
    }

    fn heartbeat_interval(&self) -> u32 {
        self.heartbeat_interval
    }

    fn ws_ping_interval(&self) -> u32 {
        self.ws_ping_interval
    }

    fn restart_heartbeat(&self) {
        self.heartbeat_restarts.fetch_add(1, Ordering::Relaxed);
    }

    fn restart_websocket_ping(&self) {
        self.ws_ping_restarts.fetch_add(1, Ordering::Relaxed);
    }

    fn evses(&self) -> Vec<Evse> {
        self.evses.clone()
    }
}
