//! pve.toml configuration parser.
//!
//! A config file holds one or more named modules. Each module carries the
//! credentials and connection settings used to reach a PVE API; a scrape
//! request selects a module by name and supplies the target host.
//!
//! ```toml
//! [modules.default]
//! user = "prometheus@pve"
//! token_name = "exporter"
//! token_value = "00000000-0000-0000-0000-000000000000"
//! verify_ssl = false
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Default PVE API port.
pub const DEFAULT_PORT: u16 = 8006;

/// Name of the module used when a request does not pick one.
pub const DEFAULT_MODULE: &str = "default";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExporterConfig {
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleConfig {
    /// API user including realm, e.g. `prometheus@pve`.
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token_name: Option<String>,
    #[serde(default)]
    pub token_value: Option<String>,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_verify_ssl() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    5
}

/// Authentication material resolved from a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials<'a> {
    Token { name: &'a str, value: &'a str },
    Password(&'a str),
}

impl ModuleConfig {
    /// Resolve which authentication scheme this module uses.
    ///
    /// API tokens win over passwords when both are configured.
    pub fn credentials(&self) -> Option<Credentials<'_>> {
        match (&self.token_name, &self.token_value, &self.password) {
            (Some(name), Some(value), _) => Some(Credentials::Token { name, value }),
            (_, _, Some(password)) => Some(Credentials::Password(password)),
            _ => None,
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self, name: &str) -> ConfigResult<()> {
        let invalid = |reason: &str| ConfigError::InvalidModule {
            module: name.to_string(),
            reason: reason.to_string(),
        };

        if self.user.is_empty() {
            return Err(invalid("user must not be empty"));
        }
        if self.token_name.is_some() != self.token_value.is_some() {
            return Err(invalid("token_name and token_value must be set together"));
        }
        if self.credentials().is_none() {
            return Err(invalid("either password or token_name/token_value is required"));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs must be positive"));
        }
        Ok(())
    }
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: ExporterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a single `default` module from `PVE_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ExporterConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let user = lookup("PVE_USER").ok_or_else(|| ConfigError::MissingEnv("PVE_USER".into()))?;
        let verify_ssl = lookup("PVE_VERIFY_SSL")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or_else(default_verify_ssl);

        let module = ModuleConfig {
            user,
            password: lookup("PVE_PASSWORD"),
            token_name: lookup("PVE_TOKEN_NAME"),
            token_value: lookup("PVE_TOKEN_VALUE"),
            verify_ssl,
            port: None,
            timeout_secs: default_timeout_secs(),
        };

        let config = ExporterConfig {
            modules: BTreeMap::from([(DEFAULT_MODULE.to_string(), module)]),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.get(name)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (name, module) in &self.modules {
            module.validate(name)?;
        }
        Ok(())
    }
}
