//! Request Service façade (C7, §4.7). The only entry point OCPP message
//! handlers should call — it owns the self-check-per-batch rule (§4.5.1)
//! and the per-message size gates that the manager itself does not know
//! about.

use device_model_types::{
    AttributeStatus, GenericDeviceModelStatus, GetBaseReportRequest, GetBaseReportResponse, GetVariableData, GetVariableResult,
    ReasonCode, ReportBase, SetVariableData, SetVariableResult, StationContext, StatusInfo,
};

use crate::manager::VariableManager;
use crate::report;

/// Per-message limits consulted by `get_variables`/`set_variables`
/// (§4.8's `[limits]` table; `0` means unbounded).
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageLimits {
    pub get_items_per_message: u32,
    pub get_bytes_per_message: u32,
    pub set_items_per_message: u32,
    pub set_bytes_per_message: u32,
}

pub struct RequestService<'a> {
    manager: &'a VariableManager,
    limits: MessageLimits,
}

impl<'a> RequestService<'a> {
    pub fn new(manager: &'a VariableManager, limits: MessageLimits) -> Self {
        Self { manager, limits }
    }

    pub fn get_variables(&self, station: &dyn StationContext, items: &[GetVariableData]) -> Vec<GetVariableResult> {
        self.manager.self_check(station);

        if let Some(rejected) = self.reject_oversized_get(items) {
            return rejected;
        }

        let results: Vec<GetVariableResult> = items.iter().map(|item| self.manager.get_variable(station, item)).collect();

        if exceeds_bytes(&results, self.limits.get_bytes_per_message) {
            return items.iter().map(|item| too_large_get_result(item, ReasonCode::TooLargeElement)).collect();
        }

        results
    }

    pub fn set_variables(&self, station: &dyn StationContext, items: &[SetVariableData]) -> Vec<SetVariableResult> {
        self.manager.self_check(station);

        if let Some(rejected) = self.reject_oversized_set(items) {
            return rejected;
        }

        let results: Vec<SetVariableResult> = items.iter().map(|item| self.manager.set_variable(station, item)).collect();

        if exceeds_bytes(&results, self.limits.set_bytes_per_message) {
            return items.iter().map(|item| too_large_set_result(item, ReasonCode::TooLargeElement)).collect();
        }

        results
    }

    pub fn handle_get_base_report(&self, station: &dyn StationContext, req: &GetBaseReportRequest) -> GetBaseReportResponse {
        let Ok(report_base) = ReportBase::parse(&req.report_base) else {
            return GetBaseReportResponse { status: GenericDeviceModelStatus::NotSupported };
        };
        self.manager.self_check(station);
        let entries = report::build(report_base, station, self.manager);
        GetBaseReportResponse { status: status_for_report_len(entries.len()) }
    }

    fn reject_oversized_get(&self, items: &[GetVariableData]) -> Option<Vec<GetVariableResult>> {
        let reason = oversized_reason(items.len(), self.limits.get_items_per_message, || exceeds_bytes(items, self.limits.get_bytes_per_message))?;
        Some(items.iter().map(|item| too_large_get_result(item, reason)).collect())
    }

    fn reject_oversized_set(&self, items: &[SetVariableData]) -> Option<Vec<SetVariableResult>> {
        let reason = oversized_reason(items.len(), self.limits.set_items_per_message, || exceeds_bytes(items, self.limits.set_bytes_per_message))?;
        Some(items.iter().map(|item| too_large_set_result(item, reason)).collect())
    }
}

/// Decides which of the two size gates (§4.7) tripped, if any: too many
/// items takes `TooManyElements`, an oversized serialized body takes
/// `TooLargeElement`. Item-count is checked first since it is cheaper.
fn oversized_reason(count: usize, items_limit: u32, bytes_exceeded: impl FnOnce() -> bool) -> Option<ReasonCode> {
    if exceeds_items(count, items_limit) {
        Some(ReasonCode::TooManyElements)
    } else if bytes_exceeded() {
        Some(ReasonCode::TooLargeElement)
    } else {
        None
    }
}

pub(crate) fn status_for_report_len(len: usize) -> GenericDeviceModelStatus {
    if len == 0 {
        GenericDeviceModelStatus::EmptyResultSet
    } else {
        GenericDeviceModelStatus::Accepted
    }
}

fn exceeds_items(count: usize, limit: u32) -> bool {
    limit > 0 && count as u32 > limit
}

/// Serializes `values` the way they would be sent on the wire and compares
/// the byte length against `limit` (`0` means unbounded). Used both as a
/// pre-flight check on the incoming request and, after execution, on the
/// assembled response (§4.7).
fn exceeds_bytes<T: serde::Serialize>(values: &[T], limit: u32) -> bool {
    if limit == 0 {
        return false;
    }
    match serde_json::to_vec(values) {
        Ok(bytes) => bytes.len() as u32 > limit,
        Err(_) => false,
    }
}

fn too_large_get_result(item: &GetVariableData, reason: ReasonCode) -> GetVariableResult {
    GetVariableResult {
        component: item.component.clone(),
        variable: item.variable.clone(),
        attribute_type: item.attribute_type.unwrap_or_default(),
        attribute_status: AttributeStatus::Rejected,
        attribute_value: None,
        attribute_status_info: Some(StatusInfo::bare(reason)),
    }
}

fn too_large_set_result(item: &SetVariableData, reason: ReasonCode) -> SetVariableResult {
    SetVariableResult {
        component: item.component.clone(),
        variable: item.variable.clone(),
        attribute_type: item.attribute_type.unwrap_or_default(),
        attribute_status: AttributeStatus::Rejected,
        attribute_status_info: Some(StatusInfo::bare(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::FakeStation;
    use device_model_types::{Component, ComponentName, Variable};
    use std::sync::Arc;

    #[test]
    fn items_per_message_limit_rejects_whole_batch() {
        let manager = VariableManager::new(Arc::new(MemoryStore::new()));
        let station = FakeStation::default();
        let svc = RequestService::new(&manager, MessageLimits { get_items_per_message: 1, ..Default::default() });
        let items = vec![
            GetVariableData { component: Component::new(ComponentName::ChargingStation), variable: Variable::new("Model"), attribute_type: None },
            GetVariableData { component: Component::new(ComponentName::ChargingStation), variable: Variable::new("VendorName"), attribute_type: None },
        ];
        let results = svc.get_variables(&station, &items);
        assert!(results.iter().all(|r| r.attribute_status == AttributeStatus::Rejected));
        assert!(results.iter().all(|r| r.attribute_status_info.as_ref().unwrap().reason_code == ReasonCode::TooManyElements));
    }

    #[test]
    fn bytes_per_message_limit_rejects_with_too_large_element() {
        let manager = VariableManager::new(Arc::new(MemoryStore::new()));
        let station = FakeStation::default();
        let svc = RequestService::new(&manager, MessageLimits { get_bytes_per_message: 1, ..Default::default() });
        let items = vec![GetVariableData { component: Component::new(ComponentName::ChargingStation), variable: Variable::new("Model"), attribute_type: None }];
        let results = svc.get_variables(&station, &items);
        assert!(results.iter().all(|r| r.attribute_status == AttributeStatus::Rejected));
        assert!(results.iter().all(|r| r.attribute_status_info.as_ref().unwrap().reason_code == ReasonCode::TooLargeElement));
    }

    #[test]
    fn within_limits_passes_through_to_manager() {
        let manager = VariableManager::new(Arc::new(MemoryStore::new()));
        let station = FakeStation::default();
        let svc = RequestService::new(&manager, MessageLimits::default());
        let items = vec![GetVariableData { component: Component::new(ComponentName::ChargingStation), variable: Variable::new("Model"), attribute_type: None }];
        let results = svc.get_variables(&station, &items);
        assert_eq!(results[0].attribute_status, AttributeStatus::Accepted);
    }

    #[test]
    fn base_report_unsupported_report_base_is_not_supported() {
        let manager = VariableManager::new(Arc::new(MemoryStore::new()));
        let station = FakeStation::default();
        let svc = RequestService::new(&manager, MessageLimits::default());
        let resp = svc.handle_get_base_report(&station, &GetBaseReportRequest { request_id: 4, report_base: "UnsupportedReportBase".to_string() });
        assert_eq!(resp.status, GenericDeviceModelStatus::NotSupported);
    }

    #[test]
    fn base_report_configuration_inventory_accepted_after_self_check() {
        let manager = VariableManager::new(Arc::new(MemoryStore::new()));
        let station = FakeStation::default();
        let svc = RequestService::new(&manager, MessageLimits::default());
        let resp = svc.handle_get_base_report(&station, &GetBaseReportRequest { request_id: 1, report_base: "ConfigurationInventory".to_string() });
        assert_eq!(resp.status, GenericDeviceModelStatus::Accepted);
    }
}
