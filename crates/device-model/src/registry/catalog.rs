//! The concrete catalog: every `(Component, Variable)` this simulator
//! claims to support, grouped by component as OCPP 2.0.1 Part 2 does.
//!
//! This is a representative slice of the full standard table, not an
//! exhaustive transcription — enough of each component's variables to
//! exercise every data type, mutability, persistence, and attribute-kind
//! combination the Variable Manager has to handle.

use std::sync::OnceLock;

use device_model_types::{AttributeKind, ComponentName, DataType, Mutability, Persistence, StationContext, VariableMetadata};

use AttributeKind::{Actual, MaxSet, MinSet, Target};
use ComponentName::*;
use DataType as D;
use Mutability::{ReadOnly, ReadWrite, WriteOnly};
use Persistence::{Persistent, Volatile};

const ACTUAL_ONLY: &[AttributeKind] = &[Actual];
const ACTUAL_TARGET: &[AttributeKind] = &[Actual, Target];
const ACTUAL_MIN_MAX: &[AttributeKind] = &[Actual, MinSet, MaxSet];

const AVAILABILITY_STATES: &[&str] = &["Available", "Occupied", "Reserved", "Unavailable", "Faulted"];
const TIME_SOURCES: &[&str] = &["Heartbeat", "NTP", "GPS", "RealTimeClock", "MobileNetwork", "RadioTimeTransmitter"];
const TX_MEASURANDS: &[&str] = &["Energy.Active.Import.Register", "Power.Active.Import", "Current.Import", "Voltage"];
const TX_EVENTS: &[&str] = &["ParkingBayOccupancy", "EVConnected", "Authorized", "DataSigned", "PowerPathClosed", "EnergyTransfer"];
const FILE_TRANSFER_PROTOCOLS: &[&str] = &["FTP", "FTPS", "HTTP", "HTTPS", "SFTP"];
const CONNECTOR_TYPES: &[&str] = &[
    "cCCS1", "cCCS2", "cG105", "cTesla", "cType1", "cType2", "s309-1P-16A", "s309-1P-32A",
    "s309-3P-16A", "s309-3P-32A", "sBS1361", "sCEE-7-7", "sType2", "sType3", "Other1PhMax16A",
    "Other1PhOver16A", "Other3Ph", "Pan", "wInductive", "wResonant", "Undetermined", "Unknown",
];

/// Base template; individual entries override only the fields that differ
/// from this baseline (`ReadWrite`/`Persistent`/`Actual`-only/no hooks).
const fn base(component: ComponentName, variable: &'static str, data_type: DataType) -> VariableMetadata {
    VariableMetadata {
        component,
        variable,
        instance: None,
        data_type,
        mutability: ReadWrite,
        persistence: Persistent,
        supported_attributes: ACTUAL_ONLY,
        supports_monitoring: false,
        default_value: None,
        min: None,
        max: None,
        enum_values: None,
        pattern: None,
        resolve: None,
        post_process: None,
        reboot_required: false,
        supports_target: false,
        flatten_instance: false,
    }
}

fn resolve_availability_state(_station: &dyn StationContext) -> Option<String> {
    Some("Available".to_string())
}

fn resolve_clock_date_time(_station: &dyn StationContext) -> Option<String> {
    Some(chrono::Utc::now().to_rfc3339())
}

fn resolve_zero(_station: &dyn StationContext) -> Option<String> {
    Some("0".to_string())
}

fn trim_post_process(_station: &dyn StationContext, raw: &str) -> String {
    raw.trim().to_string()
}

/// Process-wide, lazily built catalog. Built once and reused for the life
/// of the process; entries are immutable after boot (§3).
pub fn entries() -> &'static [VariableMetadata] {
    static ENTRIES: OnceLock<Vec<VariableMetadata>> = OnceLock::new();
    ENTRIES.get_or_init(build)
}

fn build() -> Vec<VariableMetadata> {
    vec![
        // --- AuthCtrlr ---------------------------------------------------
        VariableMetadata {
            default_value: Some("false"),
            ..base(AuthCtrlr, "AuthorizeRemoteStart", D::Boolean)
        },
        VariableMetadata {
            default_value: Some("true"),
            ..base(AuthCtrlr, "AuthCacheEnabled", D::Boolean)
        },
        VariableMetadata {
            default_value: Some("86400"),
            min: Some(0.0),
            ..base(AuthCtrlr, "AuthCacheLifeTime", D::Integer)
        },
        VariableMetadata {
            default_value: Some("true"),
            ..base(AuthCtrlr, "LocalAuthorizeOffline", D::Boolean)
        },
        VariableMetadata {
            default_value: Some("false"),
            ..base(AuthCtrlr, "LocalPreAuthorize", D::Boolean)
        },
        VariableMetadata {
            default_value: Some("false"),
            ..base(AuthCtrlr, "OfflineTxForUnknownIdEnabled", D::Boolean)
        },
        // --- ChargingStation ----------------------------------------------
        VariableMetadata {
            mutability: ReadOnly,
            default_value: Some("SimCS-1"),
            post_process: Some(trim_post_process),
            ..base(ChargingStation, "Model", D::Str)
        },
        VariableMetadata {
            mutability: ReadOnly,
            default_value: Some("OpenSimCharge"),
            post_process: Some(trim_post_process),
            ..base(ChargingStation, "VendorName", D::Str)
        },
        VariableMetadata {
            mutability: ReadOnly,
            default_value: Some("SIM0000001"),
            ..base(ChargingStation, "SerialNumber", D::Str)
        },
        VariableMetadata {
            mutability: ReadOnly,
            default_value: Some("1.0.0"),
            ..base(ChargingStation, "FirmwareVersion", D::Str)
        },
        VariableMetadata {
            default_value: Some("true"),
            reboot_required: true,
            ..base(ChargingStation, "AllowReset", D::Boolean)
        },
        VariableMetadata {
            mutability: ReadOnly,
            persistence: Volatile,
            supports_monitoring: true,
            enum_values: Some(AVAILABILITY_STATES),
            resolve: Some(resolve_availability_state),
            ..base(ChargingStation, "AvailabilityState", D::OptionList)
        },
        // --- ClockCtrlr -----------------------------------------------------
        VariableMetadata {
            mutability: ReadOnly,
            persistence: Volatile,
            resolve: Some(resolve_clock_date_time),
            ..base(ClockCtrlr, "DateTime", D::DateTime)
        },
        VariableMetadata {
            default_value: Some("Heartbeat"),
            enum_values: Some(TIME_SOURCES),
            ..base(ClockCtrlr, "TimeSource", D::SequenceList)
        },
        VariableMetadata {
            default_value: Some("UTC"),
            ..base(ClockCtrlr, "TimeZone", D::Str)
        },
        VariableMetadata {
            default_value: Some("pool.ntp.org"),
            ..base(ClockCtrlr, "NtpServerUri", D::Str)
        },
        // --- DeviceDataCtrlr -----------------------------------------------
        VariableMetadata {
            default_value: Some("10"),
            min: Some(1.0),
            ..base(DeviceDataCtrlr, "ItemsPerMessageGetVariables", D::Integer)
        },
        VariableMetadata {
            default_value: Some("10"),
            min: Some(1.0),
            ..base(DeviceDataCtrlr, "ItemsPerMessageSetVariables", D::Integer)
        },
        VariableMetadata {
            default_value: Some("4096"),
            min: Some(0.0),
            ..base(DeviceDataCtrlr, "BytesPerMessageGetVariables", D::Integer)
        },
        VariableMetadata {
            default_value: Some("4096"),
            min: Some(0.0),
            ..base(DeviceDataCtrlr, "BytesPerMessageSetVariables", D::Integer)
        },
        VariableMetadata {
            default_value: Some("1000"),
            min: Some(0.0),
            ..base(DeviceDataCtrlr, "ConfigurationValueSize", D::Integer)
        },
        VariableMetadata {
            default_value: Some("2500"),
            min: Some(0.0),
            ..base(DeviceDataCtrlr, "ValueSize", D::Integer)
        },
        VariableMetadata {
            default_value: Some("2500"),
            min: Some(0.0),
            ..base(DeviceDataCtrlr, "ReportingValueSize", D::Integer)
        },
        // --- OCPPCommCtrlr ---------------------------------------------------
        VariableMetadata {
            default_value: Some("60"),
            min: Some(0.0),
            supported_attributes: ACTUAL_MIN_MAX,
            ..base(OCPPCommCtrlr, "HeartbeatInterval", D::Integer)
        },
        VariableMetadata {
            default_value: Some("0"),
            min: Some(0.0),
            ..base(OCPPCommCtrlr, "WebSocketPingInterval", D::Integer)
        },
        VariableMetadata {
            default_value: Some("1"),
            pattern: Some(r"^\d+(,\d+)*$"),
            ..base(OCPPCommCtrlr, "NetworkConfigurationPriority", D::Str)
        },
        VariableMetadata {
            default_value: Some("3"),
            min: Some(0.0),
            ..base(OCPPCommCtrlr, "OfflineThreshold", D::Integer)
        },
        VariableMetadata {
            default_value: Some("60"),
            min: Some(0.0),
            flatten_instance: true,
            ..base(OCPPCommCtrlr, "MessageAttemptInterval", D::Integer)
        },
        VariableMetadata {
            default_value: Some("3"),
            min: Some(0.0),
            ..base(OCPPCommCtrlr, "MessageAttempts", D::Integer)
        },
        VariableMetadata {
            default_value: Some("30"),
            min: Some(0.0),
            ..base(OCPPCommCtrlr, "MessageTimeout", D::Integer)
        },
        VariableMetadata {
            default_value: Some("0"),
            min: Some(0.0),
            ..base(OCPPCommCtrlr, "MinimumStatusDuration", D::Integer)
        },
        VariableMetadata {
            default_value: Some("false"),
            ..base(OCPPCommCtrlr, "ResumeTransactionsOnBoot", D::Boolean)
        },
        VariableMetadata {
            mutability: ReadOnly,
            default_value: Some("HTTP,HTTPS"),
            enum_values: Some(FILE_TRANSFER_PROTOCOLS),
            ..base(OCPPCommCtrlr, "FileTransferProtocols", D::MemberList)
        },
        // --- SampledDataCtrlr ------------------------------------------------
        VariableMetadata {
            default_value: Some("true"),
            ..base(SampledDataCtrlr, "SampledDataEnabled", D::Boolean)
        },
        VariableMetadata {
            persistence: Volatile,
            ..base(SampledDataCtrlr, "TxUpdatedInterval", D::Integer)
        },
        VariableMetadata {
            default_value: Some("Energy.Active.Import.Register"),
            enum_values: Some(TX_MEASURANDS),
            ..base(SampledDataCtrlr, "TxUpdatedMeasurands", D::MemberList)
        },
        VariableMetadata {
            default_value: Some("Energy.Active.Import.Register"),
            enum_values: Some(TX_MEASURANDS),
            ..base(SampledDataCtrlr, "TxEndedMeasurands", D::MemberList)
        },
        VariableMetadata {
            default_value: Some("0"),
            min: Some(0.0),
            ..base(SampledDataCtrlr, "SampledDataTxEndedInterval", D::Integer)
        },
        // --- SecurityCtrlr -----------------------------------------------------
        VariableMetadata {
            mutability: ReadOnly,
            default_value: Some("1"),
            min: Some(0.0),
            max: Some(3.0),
            ..base(SecurityCtrlr, "SecurityProfile", D::Integer)
        },
        VariableMetadata {
            default_value: Some("Simulated Charge Point Operator"),
            ..base(SecurityCtrlr, "OrganizationName", D::Str)
        },
        VariableMetadata {
            mutability: ReadOnly,
            persistence: Volatile,
            resolve: Some(resolve_zero),
            ..base(SecurityCtrlr, "CertificateEntries", D::Integer)
        },
        VariableMetadata {
            default_value: Some("10000"),
            min: Some(0.0),
            ..base(SecurityCtrlr, "MaxCertificateChainSize", D::Integer)
        },
        // --- TxCtrlr -------------------------------------------------------
        VariableMetadata {
            default_value: Some("30"),
            min: Some(0.0),
            ..base(TxCtrlr, "EVConnectionTimeOut", D::Integer)
        },
        VariableMetadata {
            default_value: Some("0"),
            min: Some(0.0),
            ..base(TxCtrlr, "MaxEnergyOnInvalidId", D::Integer)
        },
        VariableMetadata {
            default_value: Some("true"),
            ..base(TxCtrlr, "StopTxOnEVSideDisconnect", D::Boolean)
        },
        VariableMetadata {
            default_value: Some("true"),
            ..base(TxCtrlr, "StopTxOnInvalidId", D::Boolean)
        },
        VariableMetadata {
            default_value: Some("false"),
            ..base(TxCtrlr, "TxBeforeAcceptedEnabled", D::Boolean)
        },
        VariableMetadata {
            default_value: Some("EVConnected,Authorized"),
            enum_values: Some(TX_EVENTS),
            ..base(TxCtrlr, "TxStartPoint", D::MemberList)
        },
        VariableMetadata {
            default_value: Some("EVConnected,Authorized"),
            enum_values: Some(TX_EVENTS),
            ..base(TxCtrlr, "TxStopPoint", D::MemberList)
        },
        // --- EVSE / Connector (component-instance-scoped) -------------------
        VariableMetadata {
            mutability: ReadOnly,
            persistence: Volatile,
            supports_monitoring: true,
            enum_values: Some(AVAILABILITY_STATES),
            resolve: Some(resolve_availability_state),
            ..base(EVSE, "AvailabilityState", D::OptionList)
        },
        VariableMetadata {
            mutability: ReadOnly,
            persistence: Volatile,
            supports_monitoring: true,
            enum_values: Some(AVAILABILITY_STATES),
            resolve: Some(resolve_availability_state),
            ..base(Connector, "AvailabilityState", D::OptionList)
        },
        VariableMetadata {
            mutability: ReadOnly,
            default_value: Some("cType2"),
            enum_values: Some(CONNECTOR_TYPES),
            ..base(Connector, "ConnectorType", D::OptionList)
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_duplicate_component_variable_instance_triples() {
        let mut seen = std::collections::HashSet::new();
        for e in entries() {
            let key = (e.component, e.variable.to_lowercase(), e.instance.map(str::to_lowercase));
            assert!(seen.insert(key), "duplicate entry for {:?}/{}", e.component, e.variable);
        }
    }

    #[test]
    fn persistent_non_write_only_entries_all_have_a_default_or_are_allowlisted() {
        use device_model_types::SIZE_CONTROL_VARIABLES;
        for e in entries() {
            let is_size_control = SIZE_CONTROL_VARIABLES.contains(&e.variable);
            if e.persistence == Persistent && e.mutability != WriteOnly && !is_size_control && !e.is_component_instance_scoped() {
                assert!(e.default_value.is_some(), "{:?}/{} has no default and is not allowlisted", e.component, e.variable);
            }
        }
    }
}
