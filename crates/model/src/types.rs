//! Wire-facing data model for the OCPP 2.0.1 device model: components,
//! variables, attributes and the request/result envelopes exchanged with
//! the surrounding OCPP request-handling layer.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Closed enumeration of protocol-addressable components this station
/// claims to implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ComponentName {
    AuthCtrlr,
    ChargingStation,
    ClockCtrlr,
    DeviceDataCtrlr,
    OCPPCommCtrlr,
    SampledDataCtrlr,
    SecurityCtrlr,
    TxCtrlr,
    EVSE,
    Connector,
}

/// A protocol-addressable unit of the station, optionally indexed by
/// instance (e.g. an `EVSE` or `Connector` id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Component {
    pub name: ComponentName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl Component {
    pub fn new(name: ComponentName) -> Self {
        Self { name, instance: None }
    }

    pub fn with_instance(name: ComponentName, instance: impl Into<String>) -> Self {
        Self { name, instance: Some(instance.into()) }
    }
}

/// A named settable/readable datum under a component, optionally indexed
/// by its own instance (e.g. a measurand or network profile slot).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), instance: None }
    }

    pub fn with_instance(name: impl Into<String>, instance: impl Into<String>) -> Self {
        Self { name: name.into(), instance: Some(instance.into()) }
    }
}

/// Sub-view of a variable requested or mutated by a single operation.
/// Default is `Actual` when the wire envelope omits the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum AttributeKind {
    Actual,
    Target,
    MinSet,
    MaxSet,
}

impl Default for AttributeKind {
    fn default() -> Self {
        AttributeKind::Actual
    }
}

/// Protocol value type. Serialized spelling follows OCPP 2.0.1 exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "string")]
    Str,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "decimal")]
    Decimal,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "dateTime")]
    DateTime,
    OptionList,
    SequenceList,
    MemberList,
}

impl DataType {
    /// Data types whose `VariableCharacteristics` may legitimately carry a
    /// `valuesList`. Used to decide whether `enumValues` is meaningful.
    pub fn is_enumerated(self) -> bool {
        matches!(self, DataType::OptionList | DataType::SequenceList | DataType::MemberList)
    }
}

/// Whether writes are allowed for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutability {
    ReadOnly,
    ReadWrite,
    WriteOnly,
}

/// Whether a variable's value survives a process restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Persistence {
    Persistent,
    Volatile,
}

/// Structured rejection reason, drawn from the closed set in §4.4, plus the
/// façade-level additions from §4.7 (`TooManyElements`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ReasonCode {
    InvalidValue,
    ValueTooLow,
    ValueTooHigh,
    UnsupportedParam,
    ReadOnly,
    WriteOnly,
    NotFound,
    TooLargeElement,
    TooManyElements,
    InternalError,
    NoError,
}

/// Outcome of a single `GetVariable`/`SetVariable` item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum AttributeStatus {
    Accepted,
    Rejected,
    UnknownComponent,
    UnknownVariable,
    NotSupportedAttributeType,
    RebootRequired,
}

/// `{ ok, reasonCode?, info? }` — the Validator's (C4) verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub ok: bool,
    pub reason_code: Option<ReasonCode>,
    pub info: Option<String>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self { ok: true, reason_code: None, info: None }
    }

    pub fn reject(reason_code: ReasonCode, info: impl Into<String>) -> Self {
        Self { ok: false, reason_code: Some(reason_code), info: Some(truncate_additional_info(&info.into())) }
    }
}

/// Truncates `additionalInfo` to `ADDITIONAL_INFO_MAX_LEN` UTF-8 code points (§7).
pub fn truncate_additional_info(info: &str) -> String {
    info.chars().take(crate::constants::ADDITIONAL_INFO_MAX_LEN).collect()
}

/// Optional `{ reasonCode, additionalInfo }` attached to non-trivial results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub reason_code: ReasonCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl StatusInfo {
    pub fn new(reason_code: ReasonCode, additional_info: impl Into<String>) -> Self {
        Self { reason_code, additional_info: Some(truncate_additional_info(&additional_info.into())) }
    }

    pub fn bare(reason_code: ReasonCode) -> Self {
        Self { reason_code, additional_info: None }
    }
}

/// One `GetVariables.req` item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetVariableData {
    pub component: Component,
    pub variable: Variable,
    #[serde(default)]
    pub attribute_type: Option<AttributeKind>,
}

/// One `GetVariables.conf` item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetVariableResult {
    pub component: Component,
    pub variable: Variable,
    pub attribute_type: AttributeKind,
    pub attribute_status: AttributeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_status_info: Option<StatusInfo>,
}

/// One `SetVariables.req` item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetVariableData {
    pub component: Component,
    pub variable: Variable,
    #[serde(default)]
    pub attribute_type: Option<AttributeKind>,
    pub attribute_value: String,
}

/// One `SetVariables.conf` item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetVariableResult {
    pub component: Component,
    pub variable: Variable,
    pub attribute_type: AttributeKind,
    pub attribute_status: AttributeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_status_info: Option<StatusInfo>,
}

/// Requested inventory shape for `GetBaseReport`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReportBase {
    ConfigurationInventory,
    FullInventory,
    SummaryInventory,
}

impl ReportBase {
    /// Parses the wire string; unsupported spellings are reported back
    /// unchanged so the façade can surface `NotSupported` with context.
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "ConfigurationInventory" => Ok(ReportBase::ConfigurationInventory),
            "FullInventory" => Ok(ReportBase::FullInventory),
            "SummaryInventory" => Ok(ReportBase::SummaryInventory),
            other => Err(other.to_string()),
        }
    }
}

/// `GetBaseReport.req`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBaseReportRequest {
    pub request_id: i64,
    pub report_base: String,
}

/// Status returned synchronously from `handleGetBaseReport` (the report
/// contents themselves are delivered later via `NotifyReport`, out of scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum GenericDeviceModelStatus {
    Accepted,
    Rejected,
    NotSupported,
    EmptyResultSet,
}

/// `GetBaseReport.conf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBaseReportResponse {
    pub status: GenericDeviceModelStatus,
}

/// One attribute record inside a `ReportData` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableAttribute {
    #[serde(rename = "type")]
    pub kind: AttributeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub mutability: Mutability,
    pub persistent: bool,
    pub constant: bool,
}

/// Static characteristics of a variable, independent of its current value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableCharacteristics {
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values_list: Option<String>,
    pub supports_monitoring: bool,
}

/// One entry of a `GetBaseReport` inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub component: Component,
    pub variable: Variable,
    pub variable_attribute: Vec<VariableAttribute>,
    pub variable_characteristics: VariableCharacteristics,
}
