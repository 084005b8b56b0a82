pub mod constants;
pub mod errors;
pub mod metadata;
pub mod station;
pub mod store;
pub mod types;

pub use constants::*;
pub use errors::{ConfigError, StoreError};
pub use metadata::VariableMetadata;
pub use station::{Evse, StationContext};
pub use store::{ConfigurationKeyEntry, ConfigurationKeyOpts, ConfigurationKeyStore};
pub use types::*;
