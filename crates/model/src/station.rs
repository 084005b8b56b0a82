//! The Station Context contract consumed by the resolver and manager (§6).
//!
//! Transport, transaction lifecycle, and everything else that makes up a
//! full simulated station live outside this crate; callers implement this
//! trait over whatever station type they already have.

/// A single EVSE's exposed connector ids, as seen by the device model.
#[derive(Debug, Clone)]
pub struct Evse {
    pub id: u32,
    pub connector_ids: Vec<u32>,
}

/// Live runtime parameters and side-effect hooks a station exposes to the
/// device model. Resolved lazily on every call — never cached by the
/// manager, so changes made by the rest of the station are picked up
/// immediately on the next request.
pub trait StationContext {
    /// Prefix used in log lines, e.g. `"[CS001]"`.
    fn log_prefix(&self) -> String;

    /// Current heartbeat interval in seconds (resolver fallback for
    /// `OCPPCommCtrlr/HeartbeatInterval`).
    fn heartbeat_interval(&self) -> u32;

    /// Current WebSocket ping interval in seconds (resolver fallback for
    /// `OCPPCommCtrlr/WebSocketPingInterval`).
    fn ws_ping_interval(&self) -> u32;

    /// Requests the station restart its heartbeat timer with the latest
    /// configured interval. Fire-and-forget; the manager does not await
    /// completion (§5).
    fn restart_heartbeat(&self);

    /// Requests the station restart its WebSocket ping timer.
    fn restart_websocket_ping(&self);

    /// EVSEs currently attached to the station, in id order.
    fn evses(&self) -> Vec<Evse>;
}
