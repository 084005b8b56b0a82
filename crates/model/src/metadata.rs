//! Catalog entry shape for the Variable Registry (C1). Instances are
//! immutable `'static` data built once by the registry at first access.

use crate::station::StationContext;
use crate::types::{AttributeKind, ComponentName, DataType, Mutability, Persistence};

/// A live-value source consulted before the persistent/volatile paths
/// (§4.3 step 1), e.g. reading the station's current heartbeat interval.
pub type ResolveHook = fn(&dyn StationContext) -> Option<String>;

/// Normalization applied unconditionally after the value is resolved
/// (§4.3 step 5), e.g. canonicalizing a boolean's casing.
pub type PostProcessHook = fn(&dyn StationContext, &str) -> String;

/// Immutable catalog entry describing one `(Component, Variable[, instance])`
/// the station's Registry claims to support.
#[derive(Clone, Copy)]
pub struct VariableMetadata {
    pub component: ComponentName,
    pub variable: &'static str,
    /// `Some` only for entries registered against a specific instance
    /// (rare — most entries are instance-agnostic and matched via the
    /// registry's fallback lookup, §4.1).
    pub instance: Option<&'static str>,
    pub data_type: DataType,
    pub mutability: Mutability,
    pub persistence: Persistence,
    pub supported_attributes: &'static [AttributeKind],
    pub supports_monitoring: bool,
    pub default_value: Option<&'static str>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub enum_values: Option<&'static [&'static str]>,
    pub pattern: Option<&'static str>,
    pub resolve: Option<ResolveHook>,
    pub post_process: Option<PostProcessHook>,
    pub reboot_required: bool,
    pub supports_target: bool,
    /// Registry-carried replacement for the source's `shouldFlattenInstance`
    /// special case (§9 Open Questions): when `true`, the `ConfigurationKey`
    /// store key omits this variable's instance segment even though the
    /// catalog entry itself may be instance-scoped.
    pub flatten_instance: bool,
}

impl VariableMetadata {
    pub fn supports(&self, kind: AttributeKind) -> bool {
        self.supported_attributes.contains(&kind)
    }

    /// Whether this catalog entry's *component* carries a runtime instance
    /// that the registry could not have enumerated in advance (EVSE /
    /// Connector ids). Such entries are exempt from the self-check's
    /// "must already exist in the store" requirement (§4.5.3) because they
    /// are materialized lazily as EVSEs/Connectors are attached.
    pub fn is_component_instance_scoped(&self) -> bool {
        matches!(self.component, ComponentName::EVSE | ComponentName::Connector)
    }
}
