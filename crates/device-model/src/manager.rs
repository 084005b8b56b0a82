//! Variable Manager (C5, §4.5) — the core of the device model. Owns the
//! three process-wide override maps (§5) and dispatches `getVariable`/
//! `setVariable` against the registry, the resolver, and the validator.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use device_model_types::{
    AttributeKind, AttributeStatus, Component, ConfigurationKeyOpts, ConfigurationKeyStore, DataType, GetVariableData,
    GetVariableResult, Mutability, Persistence, ReasonCode, SetVariableData, SetVariableResult, StationContext, StatusInfo,
    Variable, VariableMetadata, CONFIGURATION_VALUE_SIZE_VAR, OCPP_VALUE_ABSOLUTE_MAX_LENGTH, REPORTING_VALUE_SIZE_VAR,
    HEARTBEAT_INTERVAL_VAR, SIZE_CONTROL_VARIABLES, VALUE_SIZE_VAR, WEBSOCKET_PING_INTERVAL_VAR,
};

use crate::key::{build_manager_key, build_store_key, enforce_reporting_value_size};
use crate::registry::Registry;
use crate::resolver;
use crate::store::MemoryStore;
use crate::validator;

/// Process-wide `Volatile` attribute values, keyed by the store key
/// (§4.3 step 3). Shared state; see §5 on cross-station coupling.
#[derive(Default)]
pub struct RuntimeOverrides(RwLock<HashMap<String, String>>);

impl RuntimeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.0.read().expect("runtime overrides lock poisoned").get(key).cloned()
    }

    pub fn set(&self, key: &str, value: &str) {
        self.0.write().expect("runtime overrides lock poisoned").insert(key.to_string(), value.to_string());
    }

    pub fn clear(&self) {
        self.0.write().expect("runtime overrides lock poisoned").clear();
    }
}

#[derive(Default)]
struct BoundOverrides {
    min: RwLock<HashMap<String, f64>>,
    max: RwLock<HashMap<String, f64>>,
}

impl BoundOverrides {
    fn get_min(&self, key: &str) -> Option<f64> {
        self.min.read().expect("bound overrides lock poisoned").get(key).copied()
    }

    fn get_max(&self, key: &str) -> Option<f64> {
        self.max.read().expect("bound overrides lock poisoned").get(key).copied()
    }

    fn set_min(&self, key: &str, v: f64) {
        self.min.write().expect("bound overrides lock poisoned").insert(key.to_string(), v);
    }

    fn set_max(&self, key: &str, v: f64) {
        self.max.write().expect("bound overrides lock poisoned").insert(key.to_string(), v);
    }

    fn clear(&self) {
        self.min.write().expect("bound overrides lock poisoned").clear();
        self.max.write().expect("bound overrides lock poisoned").clear();
    }
}

/// Constructible Variable Manager (§5 "Singleton to instance"). One
/// instance per process is the common case; nothing in this type prevents
/// instantiating several for isolated test stations.
pub struct VariableManager {
    store: Arc<dyn ConfigurationKeyStore + Send + Sync>,
    runtime_overrides: RuntimeOverrides,
    bound_overrides: BoundOverrides,
    invalid_variables: RwLock<HashSet<String>>,
    absolute_max_value_length: AtomicI64,
}

impl VariableManager {
    pub fn new(store: Arc<dyn ConfigurationKeyStore + Send + Sync>) -> Self {
        Self {
            store,
            runtime_overrides: RuntimeOverrides::new(),
            bound_overrides: BoundOverrides::default(),
            invalid_variables: RwLock::new(HashSet::new()),
            absolute_max_value_length: AtomicI64::new(OCPP_VALUE_ABSOLUTE_MAX_LENGTH as i64),
        }
    }

    /// Process-wide convenience instance backed by the in-memory store
    /// (§5). Most call sites should prefer [`VariableManager::new`].
    pub fn shared() -> &'static VariableManager {
        static MANAGER: OnceLock<VariableManager> = OnceLock::new();
        MANAGER.get_or_init(|| VariableManager::new(Arc::new(MemoryStore::new())))
    }

    /// Applied by the runtime configuration layer on load/hot-reload (C8).
    pub fn set_absolute_max_value_length(&self, limit: i64) {
        self.absolute_max_value_length.store(limit, Ordering::Relaxed);
    }

    /// Exposes the backing store to the Base Report Builder (C6), which
    /// needs to enumerate visible `ConfigurationKey` entries directly.
    pub fn store(&self) -> &(dyn ConfigurationKeyStore + Send + Sync) {
        self.store.as_ref()
    }

    fn absolute_max(&self) -> i64 {
        self.absolute_max_value_length.load(Ordering::Relaxed)
    }

    /// Startup self-check, `validatePersistentMappings` (§4.5.3). Run once
    /// per top-level `getVariables`/`setVariables` batch by the façade
    /// (C7), not per individual item.
    pub fn self_check(&self, station: &dyn StationContext) {
        self.invalid_variables.write().expect("invalid variables lock poisoned").clear();
        for entry in Registry::shared().all() {
            if entry.persistence != Persistence::Persistent || entry.mutability == Mutability::WriteOnly {
                continue;
            }
            if entry.is_component_instance_scoped() || SIZE_CONTROL_VARIABLES.contains(&entry.variable) {
                continue;
            }
            let variable = Variable::new(entry.variable);
            let store_key = build_store_key(entry, &variable);
            match self.store.get(&store_key) {
                Ok(Some(_)) => {}
                Ok(None) => self.materialize_or_invalidate(station, entry, &variable, &store_key),
                Err(e) => log::error!(
                    "{} self-check: store lookup failed for {}/{}: {e}",
                    station.log_prefix(),
                    entry.component,
                    entry.variable
                ),
            }
        }
    }

    fn materialize_or_invalidate(&self, station: &dyn StationContext, entry: &VariableMetadata, variable: &Variable, store_key: &str) {
        if let Some(default) = entry.default_value {
            if let Err(e) = self.store.add(store_key, default, ConfigurationKeyOpts { visible: true, ..Default::default() }, false) {
                log::error!("{} self-check: failed to materialize default for {store_key}: {e}", station.log_prefix());
            } else {
                log::info!("{} self-check: materialized default for {store_key} = {default}", station.log_prefix());
            }
        } else {
            let component = Component::new(entry.component);
            let key = build_manager_key(&component, variable);
            self.invalid_variables.write().expect("invalid variables lock poisoned").insert(key.clone());
            log::error!("{} self-check: {key} has no ConfigurationKey and no default; marked invalid", station.log_prefix());
        }
    }

    /// Clears the volatile override map (§4.5.4); used by tests and
    /// station reboots.
    pub fn reset_runtime_overrides(&self) {
        self.runtime_overrides.clear();
        self.bound_overrides.clear();
    }

    fn effective_write_limit(&self) -> i64 {
        let config_value_size = self.read_size_control(CONFIGURATION_VALUE_SIZE_VAR);
        let value_size = self.read_size_control(VALUE_SIZE_VAR);
        [config_value_size, value_size, Some(self.absolute_max())]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or_else(|| self.absolute_max())
    }

    fn effective_read_limit(&self) -> i64 {
        let value_size = self.read_size_control(VALUE_SIZE_VAR);
        let reporting_value_size = self.read_size_control(REPORTING_VALUE_SIZE_VAR);
        [value_size, reporting_value_size, Some(self.absolute_max())]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or_else(|| self.absolute_max())
    }

    fn read_size_control(&self, variable: &str) -> Option<i64> {
        let entry = self.store.get(variable).ok().flatten()?;
        let parsed = entry.value.parse::<i64>().ok()?;
        (parsed > 0).then_some(parsed)
    }

    /// `getVariable` (§4.5.1). Does not run the self-check; callers that
    /// implement a batch `getVariables` should call [`Self::self_check`]
    /// once before the first item.
    pub fn get_variable(&self, station: &dyn StationContext, req: &GetVariableData) -> GetVariableResult {
        let attribute = req.attribute_type.unwrap_or_default();

        if !Registry::shared().supports_component(req.component.name) {
            return self.get_result(req, attribute, AttributeStatus::UnknownComponent, Some(ReasonCode::NotFound), None);
        }

        let Some(metadata) = Registry::shared().lookup(req.component.name, &req.variable.name, req.variable.instance.as_deref()) else {
            return self.get_result(req, attribute, AttributeStatus::UnknownVariable, Some(ReasonCode::NotFound), None);
        };

        if attribute == AttributeKind::Actual && metadata.mutability == Mutability::WriteOnly {
            log::warn!("{} get {} rejected: write-only", station.log_prefix(), build_manager_key(&req.component, &req.variable));
            return self.get_result(req, attribute, AttributeStatus::Rejected, Some(ReasonCode::WriteOnly), None);
        }

        if !metadata.supports(attribute) {
            return self.get_result(req, attribute, AttributeStatus::NotSupportedAttributeType, Some(ReasonCode::UnsupportedParam), None);
        }

        let manager_key = build_manager_key(&req.component, &req.variable);
        if self.invalid_variables.read().expect("invalid variables lock poisoned").contains(&manager_key) {
            log::warn!("{} get {manager_key} rejected: internal error (invalid variable)", station.log_prefix());
            return self.get_result(req, attribute, AttributeStatus::Rejected, Some(ReasonCode::InternalError), None);
        }

        if matches!(attribute, AttributeKind::MinSet | AttributeKind::MaxSet) {
            return self.get_bound(req, attribute, metadata, &manager_key);
        }

        let value = resolver::resolve(metadata, &req.variable, station, self.store.as_ref(), &self.runtime_overrides);

        if value.is_empty() {
            if attribute == AttributeKind::Target && metadata.supports_target {
                return self.get_result(req, attribute, AttributeStatus::Accepted, None, Some(String::new()));
            }
            log::warn!("{} get {manager_key} rejected: empty value", station.log_prefix());
            return self.get_result(req, attribute, AttributeStatus::Rejected, Some(ReasonCode::InvalidValue), None);
        }

        let truncated = enforce_reporting_value_size(&value, self.effective_read_limit());
        self.get_result(req, attribute, AttributeStatus::Accepted, None, Some(truncated))
    }

    fn get_bound(&self, req: &GetVariableData, attribute: AttributeKind, metadata: &VariableMetadata, manager_key: &str) -> GetVariableResult {
        let overridden = match attribute {
            AttributeKind::MinSet => self.bound_overrides.get_min(manager_key).or(metadata.min),
            AttributeKind::MaxSet => self.bound_overrides.get_max(manager_key).or(metadata.max),
            _ => unreachable!(),
        };
        match overridden {
            Some(v) => self.get_result(req, attribute, AttributeStatus::Accepted, None, Some(format_decimal(v))),
            None => self.get_result(req, attribute, AttributeStatus::NotSupportedAttributeType, Some(ReasonCode::UnsupportedParam), None),
        }
    }

    fn get_result(
        &self,
        req: &GetVariableData,
        attribute: AttributeKind,
        status: AttributeStatus,
        reason: Option<ReasonCode>,
        value: Option<String>,
    ) -> GetVariableResult {
        GetVariableResult {
            component: req.component.clone(),
            variable: req.variable.clone(),
            attribute_type: attribute,
            attribute_status: status,
            attribute_value: value,
            attribute_status_info: reason.map(StatusInfo::bare),
        }
    }

    /// `setVariable` (§4.5.2).
    pub fn set_variable(&self, station: &dyn StationContext, req: &SetVariableData) -> SetVariableResult {
        let attribute = req.attribute_type.unwrap_or_default();

        if !Registry::shared().supports_component(req.component.name) {
            return self.set_result(req, attribute, AttributeStatus::UnknownComponent, Some(ReasonCode::NotFound));
        }
        let Some(metadata) = Registry::shared().lookup(req.component.name, &req.variable.name, req.variable.instance.as_deref()) else {
            return self.set_result(req, attribute, AttributeStatus::UnknownVariable, Some(ReasonCode::NotFound));
        };
        if !metadata.supports(attribute) {
            return self.set_result(req, attribute, AttributeStatus::NotSupportedAttributeType, Some(ReasonCode::UnsupportedParam));
        }

        let manager_key = build_manager_key(&req.component, &req.variable);
        if attribute == AttributeKind::Actual
            && metadata.mutability != Mutability::WriteOnly
            && self.invalid_variables.read().expect("invalid variables lock poisoned").contains(&manager_key)
        {
            log::warn!("{} set {manager_key} rejected: internal error (invalid variable)", station.log_prefix());
            return self.set_result(req, attribute, AttributeStatus::Rejected, Some(ReasonCode::InternalError));
        }

        if matches!(attribute, AttributeKind::MinSet | AttributeKind::MaxSet) {
            return self.set_bound(req, attribute, metadata, &manager_key, station);
        }

        self.set_actual(station, req, metadata, &manager_key)
    }

    fn set_bound(
        &self,
        req: &SetVariableData,
        attribute: AttributeKind,
        metadata: &VariableMetadata,
        manager_key: &str,
        station: &dyn StationContext,
    ) -> SetVariableResult {
        if metadata.data_type != DataType::Integer {
            return self.set_result(req, attribute, AttributeStatus::NotSupportedAttributeType, Some(ReasonCode::UnsupportedParam));
        }

        let outcome = validator::validate(metadata, &req.attribute_value);
        if !outcome.ok {
            log::warn!("{} set {manager_key} {attribute} rejected: {:?}", station.log_prefix(), outcome.reason_code);
            return self.set_result_with_info(req, attribute, AttributeStatus::Rejected, outcome.reason_code.unwrap(), outcome.info);
        }
        let new_value: f64 = req.attribute_value.parse().expect("validated integer parses");

        match attribute {
            AttributeKind::MinSet => {
                let effective_max = self.bound_overrides.get_max(manager_key).or(metadata.max);
                if let Some(max) = effective_max {
                    if new_value > max {
                        return self.set_result_with_info(req, attribute, AttributeStatus::Rejected, ReasonCode::InvalidValue, Some("MinSet higher than MaxSet".to_string()));
                    }
                }
                self.bound_overrides.set_min(manager_key, new_value);
            }
            AttributeKind::MaxSet => {
                let effective_min = self.bound_overrides.get_min(manager_key).or(metadata.min);
                if let Some(min) = effective_min {
                    if new_value < min {
                        return self.set_result_with_info(req, attribute, AttributeStatus::Rejected, ReasonCode::InvalidValue, Some("MaxSet lower than MinSet".to_string()));
                    }
                }
                self.bound_overrides.set_max(manager_key, new_value);
            }
            _ => unreachable!(),
        }
        self.set_result(req, attribute, AttributeStatus::Accepted, None)
    }

    fn set_actual(&self, station: &dyn StationContext, req: &SetVariableData, metadata: &VariableMetadata, manager_key: &str) -> SetVariableResult {
        let attribute = req.attribute_type.unwrap_or_default();

        if metadata.mutability == Mutability::ReadOnly {
            log::warn!("{} set {manager_key} rejected: read-only", station.log_prefix());
            return self.set_result(req, attribute, AttributeStatus::Rejected, Some(ReasonCode::ReadOnly));
        }

        let write_limit = self.effective_write_limit();
        if req.attribute_value.chars().count() as i64 > write_limit {
            log::warn!("{} set {manager_key} rejected: too large", station.log_prefix());
            return self.set_result(req, attribute, AttributeStatus::Rejected, Some(ReasonCode::TooLargeElement));
        }

        let outcome = validator::validate(metadata, &req.attribute_value);
        if !outcome.ok {
            log::warn!("{} set {manager_key} rejected: {:?}", station.log_prefix(), outcome.reason_code);
            return self.set_result_with_info(req, attribute, AttributeStatus::Rejected, outcome.reason_code.unwrap(), outcome.info);
        }

        if metadata.data_type == DataType::Integer {
            if let Ok(n) = req.attribute_value.parse::<f64>() {
                if let Some(min) = self.bound_overrides.get_min(manager_key).or(metadata.min) {
                    if n < min {
                        return self.set_result(req, attribute, AttributeStatus::Rejected, Some(ReasonCode::ValueTooLow));
                    }
                }
                if let Some(max) = self.bound_overrides.get_max(manager_key).or(metadata.max) {
                    if n > max {
                        return self.set_result(req, attribute, AttributeStatus::Rejected, Some(ReasonCode::ValueTooHigh));
                    }
                }
            }
        }

        let variable = &req.variable;
        let store_key = build_store_key(metadata, variable);
        let old_value = resolver::resolve(metadata, variable, station, self.store.as_ref(), &self.runtime_overrides);

        if metadata.persistence == Persistence::Persistent && metadata.mutability != Mutability::WriteOnly {
            if let Err(e) = self.store.set_value(&store_key, &req.attribute_value) {
                log::error!("{} set {manager_key} failed to persist: {e}", station.log_prefix());
                return self.set_result(req, attribute, AttributeStatus::Rejected, Some(ReasonCode::InternalError));
            }
        }
        if metadata.persistence == Persistence::Volatile && metadata.mutability != Mutability::ReadOnly {
            self.runtime_overrides.set(&store_key, &req.attribute_value);
        }

        if metadata.mutability == Mutability::WriteOnly {
            self.invalid_variables.write().expect("invalid variables lock poisoned").remove(manager_key);
        }

        self.apply_side_effects(station, &req.variable.name, &req.attribute_value);

        let new_value = resolver::resolve(metadata, variable, station, self.store.as_ref(), &self.runtime_overrides);
        let store_reboot_flag = self.store.get(&store_key).ok().flatten().map(|e| e.reboot).unwrap_or(false);
        let requires_reboot = metadata.reboot_required || store_reboot_flag;

        if requires_reboot && old_value != new_value {
            log::info!("{} set {manager_key} accepted, reboot required", station.log_prefix());
            self.set_result(req, attribute, AttributeStatus::RebootRequired, None)
        } else {
            log::info!("{} set {manager_key} accepted", station.log_prefix());
            self.set_result(req, attribute, AttributeStatus::Accepted, None)
        }
    }

    fn apply_side_effects(&self, station: &dyn StationContext, variable_name: &str, value: &str) {
        if variable_name.eq_ignore_ascii_case(HEARTBEAT_INTERVAL_VAR) {
            if let Ok(n) = value.parse::<i64>() {
                if n > 0 {
                    log::info!("{} restarting heartbeat timer", station.log_prefix());
                    station.restart_heartbeat();
                }
            }
        } else if variable_name.eq_ignore_ascii_case(WEBSOCKET_PING_INTERVAL_VAR) {
            if let Ok(n) = value.parse::<i64>() {
                if n >= 0 {
                    log::info!("{} restarting WebSocket ping timer", station.log_prefix());
                    station.restart_websocket_ping();
                }
            }
        }
    }

    fn set_result(&self, req: &SetVariableData, attribute: AttributeKind, status: AttributeStatus, reason: Option<ReasonCode>) -> SetVariableResult {
        SetVariableResult {
            component: req.component.clone(),
            variable: req.variable.clone(),
            attribute_type: attribute,
            attribute_status: status,
            attribute_status_info: reason.map(StatusInfo::bare),
        }
    }

    fn set_result_with_info(
        &self,
        req: &SetVariableData,
        attribute: AttributeKind,
        status: AttributeStatus,
        reason: ReasonCode,
        info: Option<String>,
    ) -> SetVariableResult {
        SetVariableResult {
            component: req.component.clone(),
            variable: req.variable.clone(),
            attribute_type: attribute,
            attribute_status: status,
            attribute_status_info: Some(match info {
                Some(info) => StatusInfo::new(reason, info),
                None => StatusInfo::bare(reason),
            }),
        }
    }
}

fn format_decimal(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeStation;
    use device_model_types::ComponentName;

    fn manager_with_memory_store() -> VariableManager {
        VariableManager::new(Arc::new(MemoryStore::new()))
    }

    fn get(component: ComponentName, variable: &str) -> GetVariableData {
        GetVariableData { component: Component::new(component), variable: Variable::new(variable), attribute_type: None }
    }

    fn set(component: ComponentName, variable: &str, value: &str) -> SetVariableData {
        SetVariableData {
            component: Component::new(component),
            variable: Variable::new(variable),
            attribute_type: None,
            attribute_value: value.to_string(),
        }
    }

    #[test]
    fn self_check_materializes_defaults() {
        let mgr = manager_with_memory_store();
        let station = FakeStation::default();
        mgr.self_check(&station);
        let result = mgr.get_variable(&station, &get(ComponentName::OCPPCommCtrlr, "HeartbeatInterval"));
        assert_eq!(result.attribute_status, AttributeStatus::Accepted);
        assert_eq!(result.attribute_value.as_deref(), Some("60"));
    }

    #[test]
    fn set_read_only_is_rejected() {
        let mgr = manager_with_memory_store();
        let station = FakeStation::default();
        mgr.self_check(&station);
        let result = mgr.set_variable(&station, &set(ComponentName::ChargingStation, "Model", "whatever"));
        assert_eq!(result.attribute_status, AttributeStatus::Rejected);
        assert_eq!(result.attribute_status_info.unwrap().reason_code, ReasonCode::ReadOnly);
    }

    #[test]
    fn invalid_boolean_is_rejected_with_exact_message() {
        let mgr = manager_with_memory_store();
        let station = FakeStation::default();
        mgr.self_check(&station);
        let result = mgr.set_variable(&station, &set(ComponentName::AuthCtrlr, "AuthorizeRemoteStart", "maybe"));
        assert_eq!(result.attribute_status, AttributeStatus::Rejected);
        let info = result.attribute_status_info.unwrap();
        assert_eq!(info.reason_code, ReasonCode::InvalidValue);
        assert_eq!(info.additional_info.as_deref(), Some("AuthorizeRemoteStart must be \"true\" or \"false\""));
    }

    #[test]
    fn min_set_then_max_set_lower_is_rejected() {
        let mgr = manager_with_memory_store();
        let station = FakeStation::default();
        mgr.self_check(&station);

        let mut min_req = set(ComponentName::OCPPCommCtrlr, "HeartbeatInterval", "30");
        min_req.attribute_type = Some(AttributeKind::MinSet);
        let min_result = mgr.set_variable(&station, &min_req);
        assert_eq!(min_result.attribute_status, AttributeStatus::Accepted);

        let mut max_req = set(ComponentName::OCPPCommCtrlr, "HeartbeatInterval", "20");
        max_req.attribute_type = Some(AttributeKind::MaxSet);
        let max_result = mgr.set_variable(&station, &max_req);
        assert_eq!(max_result.attribute_status, AttributeStatus::Rejected);
        assert_eq!(max_result.attribute_status_info.unwrap().additional_info.as_deref(), Some("MaxSet lower than MinSet"));
    }

    #[test]
    fn idempotent_set_does_not_report_reboot_required_twice() {
        let mgr = manager_with_memory_store();
        let station = FakeStation::default();
        mgr.self_check(&station);
        let req = set(ComponentName::ChargingStation, "AllowReset", "false");
        let first = mgr.set_variable(&station, &req);
        let second = mgr.set_variable(&station, &req);
        assert_ne!(first.attribute_status, AttributeStatus::Rejected);
        assert_eq!(second.attribute_status, AttributeStatus::Accepted);
    }

    #[test]
    fn case_insensitive_round_trip() {
        let mgr = manager_with_memory_store();
        let station = FakeStation::default();
        mgr.self_check(&station);
        let lower = mgr.get_variable(&station, &GetVariableData {
            component: Component::new(ComponentName::AuthCtrlr),
            variable: Variable::new("authorizeremotestart"),
            attribute_type: None,
        });
        let proper = mgr.get_variable(&station, &get(ComponentName::AuthCtrlr, "AuthorizeRemoteStart"));
        assert_eq!(lower.attribute_value, proper.attribute_value);
    }

    #[test]
    fn unknown_component_is_rejected() {
        let mgr = manager_with_memory_store();
        let station = FakeStation::default();
        let result = mgr.get_variable(&station, &get(ComponentName::AuthCtrlr, "NoSuchVariable"));
        assert_eq!(result.attribute_status, AttributeStatus::UnknownVariable);
    }
}
