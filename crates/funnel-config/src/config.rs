//! Configuration types and loading for the funnel tracker.
//!
//! The main entry point is [`FunnelConfig`], which represents the contents
//! of `.funnel/config.yaml`. Configuration is loaded with [`load_config`]
//! and saved with [`save_config`].

use funnel_core::stage::{Stage, StageCatalog, StageRequirements};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration file contained invalid YAML.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// The `.funnel/` directory was not found.
    #[error("no .funnel directory found (run 'fnl init' first)")]
    FunnelDirNotFound,

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue {
        /// The configuration key that had an invalid value.
        key: String,
        /// A description of why the value is invalid.
        reason: String,
    },
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// One pipeline stage as written in the config file.
///
/// The requirement flags are optional in YAML; a bare `id`/`name` pair is a
/// plain stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stable snake_case identifier.
    pub id: String,

    /// Board column title.
    pub name: String,

    /// Entering this stage requires scheduling a call.
    #[serde(default, rename = "requires-call")]
    pub requires_call: bool,

    /// Entering this stage requires converting the lead into a client.
    #[serde(default, rename = "requires-conversion")]
    pub requires_conversion: bool,
}

impl From<&Stage> for StageConfig {
    fn from(stage: &Stage) -> Self {
        Self {
            id: stage.id.clone(),
            name: stage.name.clone(),
            requires_call: stage.requirements.call,
            requires_conversion: stage.requirements.conversion,
        }
    }
}

impl From<&StageConfig> for Stage {
    fn from(cfg: &StageConfig) -> Self {
        Self {
            id: cfg.id.clone(),
            name: cfg.name.clone(),
            requirements: StageRequirements {
                call: cfg.requires_call,
                conversion: cfg.requires_conversion,
            },
        }
    }
}

/// Follow-up scheduling configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpConfig {
    /// Days without stage movement before a lead is flagged as stale.
    #[serde(default = "default_stale_after_days", rename = "stale-after-days")]
    pub stale_after_days: i64,
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self {
            stale_after_days: default_stale_after_days(),
        }
    }
}

fn default_stale_after_days() -> i64 {
    7
}

// ---------------------------------------------------------------------------
// Main config struct
// ---------------------------------------------------------------------------

/// The full funnel configuration, corresponding to `.funnel/config.yaml`.
///
/// All fields use `serde` defaults so that a partially-specified YAML file
/// deserializes correctly with sensible default values. An empty or absent
/// `stages` list means the reference pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FunnelConfig {
    /// Actor identity recorded on writes.
    #[serde(default)]
    pub actor: Option<String>,

    /// Output JSON instead of human-readable text.
    #[serde(default)]
    pub json: bool,

    /// Database path override.
    #[serde(default)]
    pub db: Option<String>,

    /// Pipeline stages in board order. Empty means the reference pipeline.
    #[serde(default)]
    pub stages: Vec<StageConfig>,

    /// Follow-up scheduling configuration.
    #[serde(default)]
    pub followup: FollowUpConfig,
}

impl FunnelConfig {
    /// Builds the stage catalog from the configured stages, falling back to
    /// the reference pipeline when none are configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a configured stage list
    /// contains duplicate identifiers.
    pub fn stage_catalog(&self) -> Result<StageCatalog> {
        if self.stages.is_empty() {
            return Ok(StageCatalog::default());
        }
        for (i, stage) in self.stages.iter().enumerate() {
            if self.stages[..i].iter().any(|s| s.id == stage.id) {
                return Err(ConfigError::InvalidValue {
                    key: "stages".to_string(),
                    reason: format!("duplicate stage id '{}'", stage.id),
                });
            }
        }
        Ok(StageCatalog::new(self.stages.iter().map(Stage::from).collect()))
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Load configuration from `.funnel/config.yaml` inside the given
/// `.funnel/` directory.
///
/// If the file does not exist, a default [`FunnelConfig`] is returned.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
/// or [`ConfigError::ParseError`] if it contains invalid YAML.
pub fn load_config(funnel_dir: &Path) -> Result<FunnelConfig> {
    let config_path = funnel_dir.join("config.yaml");

    if !config_path.exists() {
        return Ok(FunnelConfig::default());
    }

    let content = std::fs::read_to_string(&config_path)?;

    // An empty file is valid and yields default config.
    if content.trim().is_empty() {
        return Ok(FunnelConfig::default());
    }

    let config: FunnelConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to `.funnel/config.yaml` inside the given `.funnel/`
/// directory.
///
/// The directory is created if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] on I/O failure or
/// [`ConfigError::ParseError`] if serialization fails.
pub fn save_config(funnel_dir: &Path, config: &FunnelConfig) -> Result<()> {
    std::fs::create_dir_all(funnel_dir)?;

    let config_path = funnel_dir.join("config.yaml");
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(config_path, yaml)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let cfg = FunnelConfig::default();
        assert!(cfg.actor.is_none());
        assert!(!cfg.json);
        assert!(cfg.stages.is_empty());
        assert_eq!(cfg.followup.stale_after_days, 7);
    }

    #[test]
    fn test_default_stage_catalog_is_reference_pipeline() {
        let catalog = FunnelConfig::default().stage_catalog().unwrap();
        assert_eq!(catalog.entry_stage(), Some("nuevo"));
        assert_eq!(catalog.stages().len(), 7);
    }

    #[test]
    fn test_load_missing_config_returns_default() {
        let dir = PathBuf::from("/nonexistent/path/.funnel");
        let cfg = load_config(&dir).unwrap();
        assert!(cfg.actor.is_none());
    }

    #[test]
    fn test_roundtrip_config() {
        let dir = tempfile::tempdir().unwrap();
        let funnel_dir = dir.path().join(".funnel");

        let mut cfg = FunnelConfig::default();
        cfg.actor = Some("sales-bot".to_string());
        cfg.followup.stale_after_days = 14;

        save_config(&funnel_dir, &cfg).unwrap();
        let loaded = load_config(&funnel_dir).unwrap();

        assert_eq!(loaded.actor.as_deref(), Some("sales-bot"));
        assert_eq!(loaded.followup.stale_after_days, 14);
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let yaml = "actor: nico\njson: true\n";
        let cfg: FunnelConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.actor.as_deref(), Some("nico"));
        assert!(cfg.json);
        // Everything else should be default
        assert_eq!(cfg.followup.stale_after_days, 7);
        assert!(cfg.stages.is_empty());
    }

    #[test]
    fn test_custom_stages_yaml() {
        let yaml = "\
stages:
  - id: intake
    name: Intake
  - id: demo
    name: Demo
    requires-call: true
  - id: won
    name: Won
    requires-conversion: true
";
        let cfg: FunnelConfig = serde_yaml::from_str(yaml).unwrap();
        let catalog = cfg.stage_catalog().unwrap();
        assert_eq!(catalog.entry_stage(), Some("intake"));
        assert!(catalog.requirements("demo").unwrap().call);
        assert!(catalog.requirements("won").unwrap().conversion);
    }

    #[test]
    fn test_duplicate_stage_ids_rejected() {
        let yaml = "\
stages:
  - id: intake
    name: Intake
  - id: intake
    name: Intake again
";
        let cfg: FunnelConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            cfg.stage_catalog(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
