// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Navigator tuning knobs, loadable from JSON.

use serde::{Deserialize, Serialize};
use vecnav_core::{Precision, TOLERANCE};

use crate::error::ConfigError;

/// Step limit used when the caller does not supply one. JSON has no
/// infinity, so the default is a large finite value.
pub const DEFAULT_STEP_MAX: Precision = 1e30;

/// Configuration for a [`crate::Navigator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Step limit for queries that do not pass one.
    pub default_step_max: Precision,
    /// Extra distance moved past a boundary after a step so the relocated
    /// point lands strictly inside the next volume.
    pub boundary_push: Precision,
    /// Cap on path capacity; `None` uses the depth of the tree.
    pub max_depth: Option<usize>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            default_step_max: DEFAULT_STEP_MAX,
            boundary_push: TOLERANCE,
            max_depth: None,
        }
    }
}

impl NavigatorConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serializes to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_step_max.is_nan() || self.default_step_max <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "default_step_max must be positive, got {}",
                self.default_step_max
            )));
        }
        if !self.boundary_push.is_finite() || self.boundary_push < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "boundary_push must be finite and non-negative, got {}",
                self.boundary_push
            )));
        }
        if self.max_depth == Some(0) {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        Ok(())
    }
}
