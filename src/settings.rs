//! Engine settings
//!
//! Plain serde struct; loadable from a JSON file on native targets.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_EPSILON, DEFAULT_MAX_IMPACTS};
use crate::error::EngineError;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Bracket width (seconds) at which golden-section and bisection searches stop
    pub epsilon: f64,
    /// Impacts resolved within one `advance` before the rest of the frame is
    /// simulated without collisions
    pub max_impacts_per_advance: usize,
    /// Invoke `Body::handle_impact` on both bodies after each resolved impact
    pub notify_impacts: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            max_impacts_per_advance: DEFAULT_MAX_IMPACTS,
            notify_impacts: false,
        }
    }
}

impl EngineSettings {
    /// Check that every field is usable by the engine
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(EngineError::InvalidConfiguration {
                reason: format!("epsilon must be positive and finite (got {})", self.epsilon),
            });
        }
        if self.max_impacts_per_advance == 0 {
            return Err(EngineError::InvalidConfiguration {
                reason: "max_impacts_per_advance must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidConfiguration {
                reason: e.to_string(),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> String {
        // A struct of plain numbers and bools always serializes.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Load settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| EngineError::SettingsIo {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
