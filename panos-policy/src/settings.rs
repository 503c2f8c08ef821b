//! Optional TOML settings file.
//!
//! ```toml
//! [device]
//! address = "fixtures/panorama-running.xml"
//! username = "admin"
//! devicegroup = "DeviceGroupB"
//!
//! [rule_defaults]
//! action = "deny"
//! log_start = true
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the file.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::rule::{Action, RuleSpec, RuleType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub device: DeviceSettings,
    pub rule_defaults: RuleDefaults,
}

/// Connection parameters for the target device.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceSettings {
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub devicegroup: Option<String>,
}

impl std::fmt::Debug for DeviceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("DeviceSettings")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("api_key", &redacted(&self.api_key))
            .field("devicegroup", &self.devicegroup)
            .finish()
    }
}

/// Site defaults for new rules, applied before command-line overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleDefaults {
    pub action: Option<Action>,
    pub rule_type: Option<RuleType>,
    pub log_start: Option<bool>,
    pub log_end: Option<bool>,
}

impl RuleDefaults {
    pub fn apply(&self, spec: &mut RuleSpec) {
        if let Some(action) = self.action {
            spec.action = action;
        }
        if let Some(rule_type) = self.rule_type {
            spec.rule_type = rule_type;
        }
        if let Some(log_start) = self.log_start {
            spec.log_start = log_start;
        }
        if let Some(log_end) = self.log_end {
            spec.log_end = log_end;
        }
    }
}

/// Errors returned when loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Load settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_settings(&raw, path.display().to_string())
}

fn parse_settings(raw: &str, path: String) -> Result<Settings, SettingsError> {
    toml::from_str(raw).map_err(|source| SettingsError::Parse { path, source })
}
