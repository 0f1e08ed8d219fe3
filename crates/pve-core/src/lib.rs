pub mod config;
pub mod error;
pub mod types;

pub use config::{Credentials, ExporterConfig, ModuleConfig};
pub use error::{ConfigError, ConfigResult};
pub use types::*;
