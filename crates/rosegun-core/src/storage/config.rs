//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Poll interval of the running countdown
//! - How long ephemeral notices stay up
//! - Whether to ask the host to keep the display awake
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Countdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Period of the poll that drives a running countdown. Sub-second so
    /// the displayed value never lags a full second behind.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Ephemeral notice configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    #[serde(default = "default_notice_ttl_ms")]
    pub interrupted_ttl_ms: u64,
    #[serde(default = "default_notice_ttl_ms")]
    pub rank_up_ttl_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeLockConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notices: NoticeConfig,
    #[serde(default)]
    pub wake_lock: WakeLockConfig,
}

fn default_poll_interval_ms() -> u64 {
    250
}
fn default_notice_ttl_ms() -> u64 {
    5_000
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            interrupted_ttl_ms: default_notice_ttl_ms(),
            rank_up_ttl_ms: default_notice_ttl_ms(),
        }
    }
}

impl Default for WakeLockConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Walk `section.field` through the serialized form.
    fn lookup<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
        key.split('.').try_fold(root, |node, part| node.get(part))
    }

    /// Replace one leaf, coercing `raw` to the type already stored there.
    fn assign(root: &mut serde_json::Value, key: &str, raw: &str) -> Result<(), ConfigError> {
        use serde_json::Value;

        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (section, field) = key.rsplit_once('.').unwrap_or(("", key));
        let parent = if section.is_empty() {
            root
        } else {
            section
                .split('.')
                .try_fold(root, |node, part| node.get_mut(part))
                .ok_or_else(unknown)?
        };
        let slot = parent
            .as_object_mut()
            .and_then(|fields| fields.get_mut(field))
            .ok_or_else(unknown)?;

        *slot = match *slot {
            Value::Bool(_) => Value::Bool(
                raw.parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            Value::Number(_) => Value::from(
                raw.parse::<u64>()
                    .map_err(|_| invalid(format!("expected a whole number, got '{raw}'")))?,
            ),
            Value::Object(_) | Value::Array(_) => {
                return Err(invalid("a whole section cannot be set".to_string()));
            }
            _ => Value::String(raw.to_string()),
        };
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::lookup(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::assign(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.poll_interval_ms, 250);
        assert_eq!(parsed.notices.interrupted_ttl_ms, 5_000);
        assert!(parsed.wake_lock.enabled);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let parsed: Config = toml::from_str("[timer]\npoll_interval_ms = 100\n").unwrap();
        assert_eq!(parsed.timer.poll_interval_ms, 100);
        assert_eq!(parsed.notices.rank_up_ttl_ms, 5_000);
        assert!(parsed.wake_lock.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("wake_lock.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("timer.poll_interval_ms").as_deref(), Some("250"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("timer").is_none());
    }

    #[test]
    fn apply_updates_nested_bool() {
        let mut cfg = Config::default();
        cfg.apply("wake_lock.enabled", "false").unwrap();
        assert!(!cfg.wake_lock.enabled);
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("notices.rank_up_ttl_ms", "3000").unwrap();
        assert_eq!(cfg.notices.rank_up_ttl_ms, 3_000);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let result = cfg.apply("timer.nonexistent_key", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.apply("wake_lock.enabled", "not_a_bool");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert!(cfg.wake_lock.enabled);
    }

    #[test]
    fn apply_rejects_section_replacement() {
        let mut cfg = Config::default();
        assert!(cfg.apply("timer", "{}").is_err());
    }
}
