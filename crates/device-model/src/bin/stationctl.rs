//! Demo CLI: boots a Variable Manager against a `device_model.toml` and
//! runs a handful of `GetVariables`/`SetVariables`/`GetBaseReport` calls
//! against a minimal in-process fake station, printing the results.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use device_model::config::{Config, StoreBackend};
use device_model::service::{MessageLimits, RequestService};
use device_model::store::{MemoryStore, SqliteStore};
use device_model::VariableManager;
use device_model_types::{
    Component, ComponentName, ConfigurationKeyStore, Evse, GetBaseReportRequest, GetVariableData, SetVariableData, StationContext,
    Variable,
};
use log::info;

/// A fixed, single-EVSE station used only to demonstrate the manager.
struct DemoStation;

impl StationContext for DemoStation {
    fn log_prefix(&self) -> String {
        "[DEMO-CS01]".to_string()
    }

    fn heartbeat_interval(&self) -> u32 {
        60
    }

    fn ws_ping_interval(&self) -> u32 {
        0
    }

    fn restart_heartbeat(&self) {
        info!("demo station: heartbeat timer restart requested");
    }

    fn restart_websocket_ping(&self) {
        info!("demo station: WebSocket ping timer restart requested");
    }

    fn evses(&self) -> Vec<Evse> {
        vec![Evse { id: 1, connector_ids: vec![1, 2] }]
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = find_config_file();
    let cfg = Config::load(&config_path)?;

    let level: log::LevelFilter = cfg.logging.level.parse().unwrap_or(log::LevelFilter::Info);
    let _logger = device_model::logger::init_logger(level, &cfg.logging.directory)?;
    info!("device_model.toml loaded from {}", config_path.display());

    let store: Arc<dyn ConfigurationKeyStore + Send + Sync> = match cfg.store.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Sqlite => Arc::new(SqliteStore::open(&cfg.store.sqlite_path)?),
    };

    let manager = VariableManager::new(store);
    manager.set_absolute_max_value_length(cfg.limits.absolute_max_value_length);

    let limits = MessageLimits {
        get_items_per_message: cfg.limits.get_items_per_message,
        get_bytes_per_message: cfg.limits.get_bytes_per_message,
        set_items_per_message: cfg.limits.set_items_per_message,
        set_bytes_per_message: cfg.limits.set_bytes_per_message,
    };
    let service = RequestService::new(&manager, limits);
    let station = DemoStation;

    let get_results = service.get_variables(
        &station,
        &[GetVariableData {
            component: Component::new(ComponentName::OCPPCommCtrlr),
            variable: Variable::new("HeartbeatInterval"),
            attribute_type: None,
        }],
    );
    println!("GetVariables: {get_results:?}");

    let set_results = service.set_variables(
        &station,
        &[SetVariableData {
            component: Component::new(ComponentName::AuthCtrlr),
            variable: Variable::new("AuthorizeRemoteStart"),
            attribute_type: None,
            attribute_value: "true".to_string(),
        }],
    );
    println!("SetVariables: {set_results:?}");

    let report = service.handle_get_base_report(&station, &GetBaseReportRequest { request_id: 1, report_base: "FullInventory".to_string() });
    println!("GetBaseReport: {report:?}");

    Ok(())
}

fn find_config_file() -> PathBuf {
    let mut path = env::current_exe().unwrap_or_default();
    path.pop();
    path.push("device_model.toml");
    if path.exists() {
        return path;
    }
    PathBuf::from("device_model.toml")
}
