//! Run configuration loaded from JSON files or built from CLI flags.

use crate::error::SimError;
use formica_core::{AntParams, ParamError, WorldConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a simulation run.
///
/// Every top-level field has a default, so a config file only needs the
/// values it changes. The nested `ant` block is all-or-nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Number of ants placed at random
    pub ant_count: usize,

    /// Simulated seconds to run
    pub duration_secs: f64,

    /// Ticks between recorded frames
    pub record_step: usize,

    /// Arena and pheromone settings
    pub world: WorldConfig,

    /// Parameters given to every ant
    pub ant: AntParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ant_count: 100,
            duration_secs: 10.0,
            record_step: 1,
            world: WorldConfig::default(),
            ant: AntParams::default(),
        }
    }
}

impl SimConfig {
    /// Parses and validates a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SimError::io(path.display(), e))?;
        Self::from_json(&text)
    }

    /// Checks the world and ant blocks plus the run settings.
    pub fn validate(&self) -> Result<(), ParamError> {
        self.world.validate()?;
        self.ant.validate()?;
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(ParamError::invalid(
                "duration_secs",
                format!("must be >= 0, got {}", self.duration_secs),
            ));
        }
        if self.record_step == 0 {
            return Err(ParamError::invalid("record_step", "must be >= 1"));
        }
        Ok(())
    }

    /// Number of ticks that fit into `duration_secs`.
    pub fn total_ticks(&self) -> u64 {
        (self.duration_secs / self.world.delta_time).round() as u64
    }
}

/// Live update payload: a full ant parameter set and, optionally, a new
/// world delta time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LiveParams {
    pub ant: AntParams,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_time: Option<f64>,
}

impl LiveParams {
    pub fn from_json(json: &str) -> Result<Self, ParamError> {
        let live: LiveParams = serde_json::from_str(json)?;
        Ok(live)
    }
}
