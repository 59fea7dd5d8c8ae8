//! Analysis configuration for tender-offer evaluation.
//!
//! Project teams tune the anomaly threshold and scoring weights per
//! consultation, and attach the economist's budget estimate for each lot.
//! The file can be TOML (default), YAML or JSON.

use crate::error::{ChantierError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable pointing at the configuration file.
pub const CONFIG_ENV_VAR: &str = "CHANTIER_CONFIG";

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "chantier.toml";

/// Complete offer-analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Thresholds and scoring weights
    #[serde(default)]
    pub analysis: AnalysisSection,

    /// Budget estimate per lot id
    #[serde(default)]
    pub estimates: HashMap<String, f64>,
}

// ── Analysis ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    /// Deviation from the average (percent) beyond which an offer is anomalous
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f64,

    #[serde(default)]
    pub weights: WeightsConfig,
}

fn default_anomaly_threshold() -> f64 { 15.0 }

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            anomaly_threshold: default_anomaly_threshold(),
            weights: WeightsConfig::default(),
        }
    }
}

// ── Weights ───────────────────────────────────────────────────────────────────

/// Relative weight of price competitiveness and conformity in the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_price_weight")]
    pub price: f64,

    #[serde(default = "default_conformity_weight")]
    pub conformity: f64,
}

fn default_price_weight() -> f64 { 0.7 }
fn default_conformity_weight() -> f64 { 0.3 }

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            price: default_price_weight(),
            conformity: default_conformity_weight(),
        }
    }
}

impl WeightsConfig {
    /// True when the weights sum to 1.0 (within 0.01).
    pub fn sums_to_one(&self) -> bool {
        (self.price + self.conformity - 1.0).abs() < 0.01
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl AnalysisConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a file, picking the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        debug!("Reading analysis configuration from {:?}", path);
        match ext.as_str() {
            "toml" => Self::from_toml(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            other => Err(ChantierError::UnsupportedFormat(format!(
                "configuration file {} has extension '{other}' (expected toml, yaml or json)",
                path.display()
            ))),
        }
    }

    /// Load configuration.
    /// Checks CHANTIER_CONFIG first, then chantier.toml in the current
    /// directory, and falls back to defaults when neither exists.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !Path::new(&path).exists() {
                return Err(ChantierError::Config(format!(
                    "{CONFIG_ENV_VAR} points to {path}, which does not exist"
                )));
            }
            info!("Loading configuration from {path} ({CONFIG_ENV_VAR})");
            return Self::from_path(&path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            info!("Loading configuration from {DEFAULT_CONFIG_FILE}");
            return Self::from_path(DEFAULT_CONFIG_FILE);
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Budget estimate for a lot, if the economist supplied one.
    pub fn estimate_for(&self, lot_id: &str) -> Option<f64> {
        self.estimates.get(lot_id).copied()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
