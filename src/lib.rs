// Banking - Core Library
// Exposes the account model, registry and scenario replay for the CLI and tests

pub mod config;
pub mod entities;
pub mod error;
pub mod scenario;

// Re-export commonly used types
pub use config::{OutputFormat, ReplayConfig};
pub use entities::{Account, AccountRegistry};
pub use error::{
    AccountError, AccountResult, ConfigError, RegistryError, RegistryResult, ScenarioError,
};
pub use scenario::{Operation, Rejection, ReplayReport, Scenario};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
