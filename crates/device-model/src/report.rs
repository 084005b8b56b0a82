//! Base Report Builder (C6, §4.6). Assembles the `ReportData` sequence
//! for `GetBaseReport`; actual delivery to the central system happens via
//! `NotifyReport`, out of scope here (§6).

use std::collections::HashSet;

use device_model_types::{
    AttributeKind, Component, ComponentName, GetVariableData, Persistence, ReportBase, ReportData, StationContext, Variable,
    VariableAttribute, VariableCharacteristics,
};

use crate::key::build_store_key;
use crate::manager::VariableManager;
use crate::registry::{Registry, VariableMetadata};

/// Builds the inventory for `report_base`. An empty vector for an input
/// the Request Service façade (C7) already rejected as unsupported is also
/// the correct output for a recognized-but-empty inventory (§4.6) — the
/// façade is what tells those two cases apart for the caller.
pub fn build(report_base: ReportBase, station: &dyn StationContext, manager: &VariableManager) -> Vec<ReportData> {
    match report_base {
        ReportBase::ConfigurationInventory => configuration_inventory(station, manager),
        ReportBase::FullInventory => full_inventory(station, manager),
        ReportBase::SummaryInventory => summary_inventory(station, manager),
    }
}

fn configuration_inventory(station: &dyn StationContext, manager: &VariableManager) -> Vec<ReportData> {
    let Ok(entries) = manager.store().visible_entries() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for entry in entries {
        if let Some((metadata, component, variable)) = registry_entry_for_store_key(&entry.key) {
            out.push(report_entry(station, manager, metadata, &component, &variable));
        }
    }
    out
}

fn full_inventory(station: &dyn StationContext, manager: &VariableManager) -> Vec<ReportData> {
    let mut seen = HashSet::new();
    let mut out = configuration_inventory(station, manager);
    for report in &out {
        seen.insert(dedup_key(&report.component, &report.variable));
    }

    for metadata in Registry::shared().all() {
        if metadata.is_component_instance_scoped() {
            for_each_instance(station, metadata, |component| {
                let variable = Variable::new(metadata.variable);
                let key = dedup_key(&component, &variable);
                if seen.insert(key) {
                    out.push(report_entry(station, manager, metadata, &component, &variable));
                }
            });
        } else {
            let component = Component::new(metadata.component);
            let variable = Variable::new(metadata.variable);
            let key = dedup_key(&component, &variable);
            if seen.insert(key) {
                out.push(report_entry(station, manager, metadata, &component, &variable));
            }
        }
    }
    out
}

fn summary_inventory(station: &dyn StationContext, manager: &VariableManager) -> Vec<ReportData> {
    let mut out = Vec::new();
    for metadata in Registry::shared().all() {
        if !metadata.supports_monitoring {
            continue;
        }
        if metadata.is_component_instance_scoped() {
            for_each_instance(station, metadata, |component| {
                let variable = Variable::new(metadata.variable);
                out.push(report_entry(station, manager, metadata, &component, &variable));
            });
        } else {
            let component = Component::new(metadata.component);
            let variable = Variable::new(metadata.variable);
            out.push(report_entry(station, manager, metadata, &component, &variable));
        }
    }
    out
}

fn for_each_instance(station: &dyn StationContext, metadata: &VariableMetadata, mut f: impl FnMut(Component)) {
    for evse in station.evses() {
        match metadata.component {
            ComponentName::EVSE => f(Component::with_instance(ComponentName::EVSE, evse.id.to_string())),
            ComponentName::Connector => {
                for connector_id in &evse.connector_ids {
                    f(Component::with_instance(ComponentName::Connector, connector_id.to_string()));
                }
            }
            _ => {}
        }
    }
}

type DedupTuple = (ComponentName, String, Option<String>);

fn dedup_key(component: &Component, variable: &Variable) -> DedupTuple {
    (component.name, variable.name.to_lowercase(), component.instance.clone())
}

fn report_attribute_kinds(metadata: &VariableMetadata) -> Vec<AttributeKind> {
    if metadata.data_type == device_model_types::DataType::Boolean {
        vec![AttributeKind::Actual]
    } else {
        metadata.supported_attributes.to_vec()
    }
}

fn report_entry(station: &dyn StationContext, manager: &VariableManager, metadata: &VariableMetadata, component: &Component, variable: &Variable) -> ReportData {
    let mut attributes = Vec::new();
    for kind in report_attribute_kinds(metadata) {
        let result = manager.get_variable(
            station,
            &GetVariableData { component: component.clone(), variable: variable.clone(), attribute_type: Some(kind) },
        );
        attributes.push(VariableAttribute {
            kind,
            value: result.attribute_value,
            mutability: metadata.mutability,
            persistent: metadata.persistence == Persistence::Persistent,
            constant: metadata.mutability == device_model_types::Mutability::ReadOnly && metadata.persistence == Persistence::Persistent,
        });
    }

    ReportData {
        component: component.clone(),
        variable: variable.clone(),
        variable_attribute: attributes,
        variable_characteristics: VariableCharacteristics {
            data_type: metadata.data_type,
            max_limit: metadata.max,
            min_limit: metadata.min,
            values_list: metadata.enum_values.map(|vals| vals.join(",")),
            supports_monitoring: metadata.supports_monitoring,
        },
    }
}

/// Reverse-maps a `ConfigurationKey` store key to its registry entry. Keys
/// for `flatten_instance` variables are bare variable names; keys for
/// ordinary instance-scoped variables carry a `.instance` suffix that does
/// not itself correspond to a registered instance (§4.2) — stripped before
/// the lookup.
fn registry_entry_for_store_key(store_key: &str) -> Option<(&'static VariableMetadata, Component, Variable)> {
    let (base_name, instance) = match store_key.split_once('.') {
        Some((name, instance)) => (name, Some(instance)),
        None => (store_key, None),
    };

    for metadata in Registry::shared().all() {
        if metadata.is_component_instance_scoped() {
            continue;
        }
        let candidate_variable = match instance {
            Some(instance) => Variable::with_instance(metadata.variable, instance),
            None => Variable::new(metadata.variable),
        };
        if build_store_key(metadata, &candidate_variable).eq_ignore_ascii_case(store_key) {
            return Some((metadata, Component::new(metadata.component), candidate_variable));
        }
        if metadata.variable.eq_ignore_ascii_case(base_name) && instance.is_none() {
            return Some((metadata, Component::new(metadata.component), Variable::new(metadata.variable)));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::FakeStation;
    use device_model_types::GenericDeviceModelStatus;
    use std::sync::Arc;

    #[test]
    fn configuration_inventory_contains_heartbeat_interval_after_self_check() {
        let manager = VariableManager::new(Arc::new(MemoryStore::new()));
        let station = FakeStation::default();
        manager.self_check(&station);
        let report = build(ReportBase::ConfigurationInventory, &station, &manager);
        assert!(report.iter().any(|r| r.variable.name == "HeartbeatInterval" && r.component.name == ComponentName::OCPPCommCtrlr));
    }

    #[test]
    fn empty_configuration_inventory_on_blank_store_and_no_evses() {
        let manager = VariableManager::new(Arc::new(MemoryStore::new()));
        let station = FakeStation::default();
        let report = build(ReportBase::ConfigurationInventory, &station, &manager);
        assert!(report.is_empty());
    }

    #[test]
    fn full_inventory_includes_registry_variables_without_store_entries() {
        let manager = VariableManager::new(Arc::new(MemoryStore::new()));
        let station = FakeStation::default();
        let report = build(ReportBase::FullInventory, &station, &manager);
        assert!(report.iter().any(|r| r.variable.name == "HeartbeatInterval"));
        assert!(report.iter().any(|r| r.variable.name == "Model"));
    }

    #[test]
    fn summary_inventory_includes_monitoring_availability_state() {
        let manager = VariableManager::new(Arc::new(MemoryStore::new()));
        let station = FakeStation::default();
        let report = build(ReportBase::SummaryInventory, &station, &manager);
        let cs_state = report.iter().find(|r| r.variable.name == "AvailabilityState" && r.component.name == ComponentName::ChargingStation);
        let cs_state = cs_state.expect("ChargingStation/AvailabilityState must be present");
        assert!(cs_state.variable_characteristics.supports_monitoring);
    }

    #[test]
    fn truncation_applies_to_reported_values() {
        let manager = VariableManager::new(Arc::new(MemoryStore::new()));
        let station = FakeStation::default();
        manager.self_check(&station);
        manager
            .set_variable(&station, &device_model_types::SetVariableData {
                component: Component::new(ComponentName::DeviceDataCtrlr),
                variable: Variable::new("ReportingValueSize"),
                attribute_type: None,
                attribute_value: "10".to_string(),
            });
        manager
            .set_variable(&station, &device_model_types::SetVariableData {
                component: Component::new(ComponentName::ClockCtrlr),
                variable: Variable::new("TimeSource"),
                attribute_type: None,
                attribute_value: "Heartbeat,NTP,GPS,RealTimeClock,MobileNetwork,RadioTimeTransmitter".to_string(),
            });
        let report = build(ReportBase::FullInventory, &station, &manager);
        let time_source = report
            .iter()
            .find(|r| r.variable.name == "TimeSource")
            .expect("TimeSource must be present");
        let actual = time_source.variable_attribute.iter().find(|a| a.kind == AttributeKind::Actual).unwrap();
        let value = actual.value.clone().unwrap();
        assert_eq!(value.chars().count(), 10);
        assert!("Heartbeat,NTP,GPS,RealTimeClock,MobileNetwork,RadioTimeTransmitter".starts_with(&value));
    }

    #[test]
    fn status_mapping_matches_length() {
        assert_eq!(status_for_len(0), GenericDeviceModelStatus::EmptyResultSet);
        assert_eq!(status_for_len(1), GenericDeviceModelStatus::Accepted);
    }

    fn status_for_len(len: usize) -> GenericDeviceModelStatus {
        crate::service::status_for_report_len(len)
    }
}
