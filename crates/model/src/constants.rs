//! Protocol-wide constants for the device model.
//!
//! Mirrors OCPP 2.0.1 §N "Device Model" defaults. These are compile-time
//! fallbacks; `device_model.toml` (see the `device-model` crate's `config`
//! module) can override the size limits for a given deployment.

/// Hard upper bound on any `Actual`/`Target` attribute value, in UTF-8 code
/// points, regardless of `ValueSize`/`ReportingValueSize` configuration.
pub const OCPP_VALUE_ABSOLUTE_MAX_LENGTH: usize = 2500;

/// Fallback for `SampledDataCtrlr/TxUpdatedInterval` when no configuration
/// key or runtime override is present.
pub const DEFAULT_TX_UPDATED_INTERVAL: &str = "60";

/// `additionalInfo` on any rejection result is truncated to this many
/// UTF-8 code points before being handed back to the caller.
pub const ADDITIONAL_INFO_MAX_LEN: usize = 50;

/// The three size-control variables that the startup self-check is allowed
/// to find missing from the `ConfigurationKey` store (they gate each
/// other and therefore cannot depend on themselves being pre-seeded).
pub const SIZE_CONTROL_VARIABLES: &[&str] = &["ConfigurationValueSize", "ValueSize", "ReportingValueSize"];

/// Variable name consulted by the write-size invariant (Invariant 5).
pub const CONFIGURATION_VALUE_SIZE_VAR: &str = "ConfigurationValueSize";
/// Variable name consulted by the read/write-size invariant (Invariants 5 and 6).
pub const VALUE_SIZE_VAR: &str = "ValueSize";
/// Variable name consulted by the read-size invariant (Invariant 6).
pub const REPORTING_VALUE_SIZE_VAR: &str = "ReportingValueSize";

/// Well-known variable names with a live fallback in the resolver (§4.3 step 4).
pub const HEARTBEAT_INTERVAL_VAR: &str = "HeartbeatInterval";
pub const WEBSOCKET_PING_INTERVAL_VAR: &str = "WebSocketPingInterval";
pub const TX_UPDATED_INTERVAL_VAR: &str = "TxUpdatedInterval";
