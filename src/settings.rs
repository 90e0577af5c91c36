//! Simulation settings
//!
//! The step counts and thresholds are a stability/performance tradeoff tuned for
//! a few tens of objects. They live here instead of being hardcoded so a host can
//! trade CPU for accuracy, or load them from a JSON file next to its level data.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{PhysicsError, Result};

/// Tunable physics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Integration sub-steps per frame
    pub simulation_updates: u32,
    /// Overlap resolution passes per sub-step
    pub max_simulation_steps: u32,
    /// Vertical acceleration applied to airborne balls (negative = down)
    pub gravity: f32,
    /// Outer radius multiplier used for collision prediction
    pub outer_radius_factor: f32,
    /// Slack used by overlap tests
    pub overlap_epsilon: f32,
    /// Speeds/times below this are treated as zero
    pub stable: f32,
    /// Rebound speed below which a landing ball settles
    pub landing_rebound: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            simulation_updates: SIMULATION_UPDATES,
            max_simulation_steps: MAX_SIMULATION_STEPS,
            gravity: ACCELERATION_EARTH,
            outer_radius_factor: OUTER_RADIUS_FACTOR,
            overlap_epsilon: OVERLAP_EPSILON,
            stable: STABLE,
            landing_rebound: LANDING_REBOUND,
        }
    }
}

impl PhysicsSettings {
    /// Parse settings from JSON (missing fields take their defaults)
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded physics settings from {}", path.display());
        Ok(settings)
    }

    /// Reject settings that would stall or destabilize the simulation
    pub fn validate(&self) -> Result<()> {
        if self.simulation_updates == 0 {
            return Err(PhysicsError::InvalidSettings(
                "simulation_updates must be >= 1".into(),
            ));
        }
        if self.max_simulation_steps == 0 {
            return Err(PhysicsError::InvalidSettings(
                "max_simulation_steps must be >= 1".into(),
            ));
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidSettings("gravity must be finite".into()));
        }
        if !(self.outer_radius_factor >= 1.0 && self.outer_radius_factor.is_finite()) {
            return Err(PhysicsError::InvalidSettings(format!(
                "outer_radius_factor {} must be >= 1",
                self.outer_radius_factor
            )));
        }
        if !(self.overlap_epsilon >= 0.0) || !(self.stable >= 0.0) || !(self.landing_rebound >= 0.0)
        {
            return Err(PhysicsError::InvalidSettings(
                "epsilon, stable and landing_rebound must be >= 0".into(),
            ));
        }
        Ok(())
    }
}
