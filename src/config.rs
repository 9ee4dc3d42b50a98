//! Transport configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON file, then CLI
//! flags. Only the last layer that sets a key wins.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TOPIC: &str = "/navigate_to_goal/goal";
pub const DEFAULT_MESSAGE_TYPE: &str = "multi_map_nav/NavigateToGoalActionGoal";

pub fn default_transport_command() -> Vec<String> {
    ["rostopic", "pub", "-1", "{topic}", "{type}", "{payload}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    pub topic: String,
    pub message_type: String,
    pub transport_command: Vec<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            message_type: DEFAULT_MESSAGE_TYPE.to_string(),
            transport_command: default_transport_command(),
        }
    }
}

/// One configuration layer. Unset keys fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub transport_command: Option<Vec<String>>,
}

impl TransportConfig {
    pub fn apply(mut self, layer: ConfigOverrides) -> Self {
        if let Some(topic) = layer.topic {
            self.topic = topic;
        }
        if let Some(message_type) = layer.message_type {
            self.message_type = message_type;
        }
        if let Some(cmd) = layer.transport_command {
            self.transport_command = cmd;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::EmptyField("topic"));
        }
        if self.message_type.trim().is_empty() {
            return Err(ConfigError::EmptyField("message_type"));
        }
        if self
            .transport_command
            .first()
            .map_or(true, |p| p.trim().is_empty())
        {
            return Err(ConfigError::EmptyTransportCommand);
        }
        Ok(())
    }
}

/// `<config_dir>/nav-goal/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nav-goal").join("config.json"))
}

pub fn load_file(path: &Path) -> Result<ConfigOverrides, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the effective configuration.
///
/// An explicit `path` must exist. The default location is optional and
/// silently skipped when absent.
pub fn resolve(
    path: Option<&Path>,
    cli: ConfigOverrides,
) -> Result<TransportConfig, ConfigError> {
    let file_layer = match path {
        Some(p) => Some(load_file(p)?),
        None => match default_config_path() {
            Some(p) if p.is_file() => Some(load_file(&p)?),
            _ => None,
        },
    };

    let mut cfg = TransportConfig::default();
    if let Some(layer) = file_layer {
        cfg = cfg.apply(layer);
    }
    let cfg = cfg.apply(cli);
    cfg.validate()?;
    tracing::debug!(?cfg, "resolved transport config");
    Ok(cfg)
}
