//! Key & Size Utilities (C2).
//!
//! Two distinct composite keys are in play: the Variable Manager's own
//! internal-state key (invalid/runtime/min-set/max-set maps), which is
//! scoped by *component* identity, and the `ConfigurationKey` store key,
//! which is scoped by *variable* identity the way OCPP 1.6 configuration
//! keys were — a flat namespace, occasionally suffixed by a variable
//! instance (§3, §9 Open Questions).

use device_model_types::{Component, Variable};

use crate::registry::VariableMetadata;

/// Builds the lower-cased `component[.componentInstance]/variable` key
/// used by the manager's override and invalid-variable sets.
pub fn build_manager_key(component: &Component, variable: &Variable) -> String {
    let mut key = component.name.to_string().to_lowercase();
    if let Some(instance) = &component.instance {
        key.push('.');
        key.push_str(&instance.to_lowercase());
    }
    key.push('/');
    key.push_str(&variable.name.to_lowercase());
    key
}

/// Builds the `ConfigurationKey` store key for `variable`, honoring the
/// registry's `flatten_instance` override.
pub fn build_store_key(metadata: &VariableMetadata, variable: &Variable) -> String {
    match (&variable.instance, metadata.flatten_instance) {
        (Some(instance), false) => format!("{}.{}", variable.name, instance),
        _ => variable.name.clone(),
    }
}

/// Truncates `value` to `limit` Unicode code points (the protocol's unit
/// of "length" for `ValueSize`/`ReportingValueSize`). Non-positive limits
/// are a no-op, matching the source's treatment of unset limits.
pub fn enforce_reporting_value_size(value: &str, limit: i64) -> String {
    if limit <= 0 {
        return value.to_string();
    }
    value.chars().take(limit as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_model_types::ComponentName;

    #[test]
    fn manager_key_lowercases_and_includes_component_instance() {
        let c = Component::with_instance(ComponentName::EVSE, "1");
        let v = Variable::new("AvailabilityState");
        assert_eq!(build_manager_key(&c, &v), "evse.1/availabilitystate");
    }

    #[test]
    fn manager_key_omits_instance_when_absent() {
        let c = Component::new(ComponentName::OCPPCommCtrlr);
        let v = Variable::new("HeartbeatInterval");
        assert_eq!(build_manager_key(&c, &v), "ocppcommctrlr/heartbeatinterval");
    }

    #[test]
    fn reporting_size_truncates_by_code_points() {
        assert_eq!(enforce_reporting_value_size("Heartbeat,NTP,GPS", 10), "Heartbeat,");
        assert_eq!(enforce_reporting_value_size("abc", 0), "abc");
        assert_eq!(enforce_reporting_value_size("abc", -1), "abc");
    }
}
