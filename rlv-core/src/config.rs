//! Engine configuration: blacklist seeding, default permissive mode, and
//! forced-action batch-size warnings, loaded from an optional TOML file
//! (SPEC_FULL.md §10.3).

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing;

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub blacklist: BlacklistConfig,
    #[serde(default)]
    pub permissive: PermissiveConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl EngineConfig {
    /// Loads `<root>/rlv.toml` if present, else `EngineConfig::default()`.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let path = root.join("rlv.toml");
        if path.exists() {
            let text = fs::read_to_string(&path)?;
            Ok(toml::from_str(&text)?)
        } else {
            tracing::info!("no config file found at {}, using EngineConfig::default()", path.display());
            Ok(EngineConfig::default())
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            blacklist: BlacklistConfig::default(),
            permissive: PermissiveConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Behavior names disabled before any restriction is ever received.
#[derive(Debug, Clone, Deserialize)]
pub struct BlacklistConfig {
    #[serde(default)]
    pub names: Vec<String>,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self { names: Vec::new() }
    }
}

/// The permissive-mode value in effect before any `@permissive` restriction
/// has been seen (spec.md §4.5).
#[derive(Debug, Clone, Deserialize)]
pub struct PermissiveConfig {
    #[serde(default = "PermissiveConfig::default_enabled")]
    pub default_enabled: bool,
}

impl PermissiveConfig {
    fn default_enabled() -> bool {
        false
    }
}

impl Default for PermissiveConfig {
    fn default() -> Self {
        Self { default_enabled: Self::default_enabled() }
    }
}

/// Non-binding thresholds used only to decide when to log a `warn!` about an
/// unusually large forced-action batch (spec.md §9 notes no hard cap).
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "LimitsConfig::default_forced_action_warn_threshold")]
    pub forced_action_warn_threshold: usize,
}

impl LimitsConfig {
    fn default_forced_action_warn_threshold() -> usize {
        64
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { forced_action_warn_threshold: Self::default_forced_action_warn_threshold() }
    }
}
