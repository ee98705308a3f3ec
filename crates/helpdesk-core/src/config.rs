//! Runtime configuration for a helpdesk session.
//!
//! Loaded from `config.toml`; every field has a default, so an empty or
//! missing file yields the stock dashboard behaviour.

use crate::conversation::DEFAULT_PREVIEW_CHARS;
use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "helpdesk";
const CONFIG_FILE: &str = "config.toml";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DeskConfig {
    /// Load the demo conversations when a session starts.
    pub seed_demo_data: bool,
    pub simulation: SimulationConfig,
    pub delivery: DeliveryConfig,
    pub notifications: NotificationConfig,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
            simulation: SimulationConfig::default(),
            delivery: DeliveryConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

/// Live-traffic simulator settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub tick_interval_ms: u64,
    /// Chance per tick of an inbound message on a random live conversation.
    pub inbound_probability: f64,
    /// Chance per tick of a brand new live conversation.
    pub new_conversation_probability: f64,
    pub inbound_text: String,
    pub greeting_text: String,
    pub assigned_agent: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_ms: 10_000,
            inbound_probability: 0.30,
            new_conversation_probability: 0.05,
            inbound_text: "This is a new incoming message from customer".to_string(),
            greeting_text: "Hi, I need help with my account. Can someone assist me?".to_string(),
            assigned_agent: Some("You".to_string()),
        }
    }
}

impl SimulationConfig {
    /// Tick period, never shorter than one millisecond.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Delays of the simulated delivery confirmations, measured from send time.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DeliveryConfig {
    pub delivered_after_ms: u64,
    pub read_after_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            delivered_after_ms: 1_000,
            read_after_ms: 3_000,
        }
    }
}

impl DeliveryConfig {
    pub fn delivered_after(&self) -> Duration {
        Duration::from_millis(self.delivered_after_ms)
    }

    pub fn read_after(&self) -> Duration {
        Duration::from_millis(self.read_after_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationConfig {
    pub preview_chars: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl DeskConfig {
    /// `<config dir>/helpdesk/config.toml`, e.g. `~/.config/helpdesk/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| DeskError::config("Could not determine config directory"))
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, a serialization error
    /// if it is not valid TOML, or a config error if validation fails.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Like [`DeskConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("[DeskConfig] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        for (name, p) in [
            ("simulation.inbound_probability", sim.inbound_probability),
            (
                "simulation.new_conversation_probability",
                sim.new_conversation_probability,
            ),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(DeskError::config(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        if sim.tick_interval_ms == 0 {
            return Err(DeskError::config(
                "simulation.tick_interval_ms must be greater than zero",
            ));
        }
        if self.delivery.read_after_ms < self.delivery.delivered_after_ms {
            return Err(DeskError::config(format!(
                "delivery.read_after_ms ({}) must not be less than delivery.delivered_after_ms ({})",
                self.delivery.read_after_ms, self.delivery.delivered_after_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_dashboard_behaviour() {
        let config = DeskConfig::default();
        assert!(config.seed_demo_data);
        assert_eq!(config.simulation.tick_interval(), Duration::from_secs(10));
        assert_eq!(config.simulation.inbound_probability, 0.30);
        assert_eq!(config.simulation.new_conversation_probability, 0.05);
        assert_eq!(config.delivery.delivered_after(), Duration::from_secs(1));
        assert_eq!(config.delivery.read_after(), Duration::from_secs(3));
        assert_eq!(config.notifications.preview_chars, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = DeskConfig::from_toml_str("").unwrap();
        assert_eq!(config, DeskConfig::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = DeskConfig::from_toml_str(
            r#"
            seed_demo_data = false

            [simulation]
            tick_interval_ms = 500
            "#,
        )
        .unwrap();
        assert!(!config.seed_demo_data);
        assert_eq!(config.simulation.tick_interval_ms, 500);
        assert_eq!(config.simulation.inbound_probability, 0.30);
        assert_eq!(config.delivery, DeliveryConfig::default());
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let err = DeskConfig::from_toml_str("[simulation]\ninbound_probability = 1.5").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_rejects_read_before_delivered() {
        let err = DeskConfig::from_toml_str(
            "[delivery]\ndelivered_after_ms = 2000\nread_after_ms = 1000",
        )
        .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_rejects_zero_tick() {
        let err = DeskConfig::from_toml_str("[simulation]\ntick_interval_ms = 0").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_tick_interval_is_never_zero() {
        let sim = SimulationConfig {
            tick_interval_ms: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(sim.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_invalid_toml_is_serialization_error() {
        let err = DeskConfig::from_toml_str("seed_demo_data = ").unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[notifications]\npreview_chars = 20").unwrap();
        let config = DeskConfig::load(file.path()).unwrap();
        assert_eq!(config.notifications.preview_chars, 20);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = DeskConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, DeskConfig::default());
        assert!(DeskConfig::load(&dir.path().join("absent.toml")).unwrap_err().is_io());
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let text = DeskConfig::default().to_toml_string().unwrap();
        assert_eq!(DeskConfig::from_toml_str(&text).unwrap(), DeskConfig::default());
    }
}
