//! Tunable parameters for ants and worlds.
//!
//! Both structs validate as a whole: a parameter set is either entirely
//! valid and applied, or rejected without touching the previous one.

use crate::error::ParamError;
use serde::{Deserialize, Serialize};

/// Per-ant behaviour parameters, all settable at runtime.
///
/// Speeds are in world units per second, angles in degrees, turn rate in
/// degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AntParams {
    /// Upper speed bound
    pub max_speed: f64,

    /// Lower speed bound
    pub min_speed: f64,

    /// Maximum heading change per second of behaviour time
    pub max_turn_angle: f64,

    /// Linear speed change per second
    pub acceleration: f64,

    /// Body length; head and tail sit `length / 2` from the center
    pub length: f64,

    /// Radius of the all-around collision check
    pub center_radius: f64,

    /// Radius of the forward collision sector and of antenna sampling
    pub head_radius: f64,

    /// Full opening angle of the forward sector; antennae sit at ±half of it
    pub head_angle: f64,

    /// Standard deviation of the steering noise
    pub signal_noise: f64,

    /// Trail signal at or above which the ant slows down
    pub phero_speed_down_threshold: f64,
}

impl Default for AntParams {
    fn default() -> Self {
        Self {
            max_speed: 100.0,
            min_speed: 20.0,
            max_turn_angle: 360.0,
            acceleration: 100.0,
            length: 10.0,
            center_radius: 10.0,
            head_radius: 8.0,
            head_angle: 100.0,
            signal_noise: 0.1,
            phero_speed_down_threshold: 0.5,
        }
    }
}

impl AntParams {
    /// Parses a complete parameter set from JSON and validates it.
    ///
    /// Missing and unknown fields are rejected.
    pub fn from_json(json: &str) -> Result<Self, ParamError> {
        let params: AntParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Checks every field, returning the first violation.
    pub fn validate(&self) -> Result<(), ParamError> {
        let fields = [
            ("max_speed", self.max_speed),
            ("min_speed", self.min_speed),
            ("max_turn_angle", self.max_turn_angle),
            ("acceleration", self.acceleration),
            ("length", self.length),
            ("center_radius", self.center_radius),
            ("head_radius", self.head_radius),
            ("head_angle", self.head_angle),
            ("signal_noise", self.signal_noise),
            ("phero_speed_down_threshold", self.phero_speed_down_threshold),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ParamError::invalid(name, format!("must be finite, got {value}")));
            }
        }

        // Every field except the threshold is a magnitude.
        for &(name, value) in &fields[..fields.len() - 1] {
            if value < 0.0 {
                return Err(ParamError::invalid(name, format!("must be >= 0, got {value}")));
            }
        }

        if self.max_speed < self.min_speed {
            return Err(ParamError::invalid(
                "max_speed",
                format!("must be >= min_speed ({} < {})", self.max_speed, self.min_speed),
            ));
        }
        if self.head_angle > 360.0 {
            return Err(ParamError::invalid(
                "head_angle",
                format!("must be <= 360, got {}", self.head_angle),
            ));
        }
        Ok(())
    }

    /// Clamps a speed into `[min_speed, max_speed]`.
    pub fn clamp_speed(&self, speed: f64) -> f64 {
        speed.clamp(self.min_speed, self.max_speed)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Arena width and height; the arena spans `[-d/2, d/2)` on each axis
    pub dimensions: [f64; 2],

    /// Integration step used for position updates (seconds)
    pub delta_time: f64,

    /// Pheromone cells per world unit
    pub pheromone_resolution: f64,

    /// Exponential pheromone decay rate (1/s)
    pub evaporation_rate: f64,

    /// Pheromone diffusion rate toward the neighbour mean (1/s)
    pub diffusion_rate: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dimensions: [400.0, 400.0],
            delta_time: 1.0 / 40.0,
            pheromone_resolution: 0.5,
            evaporation_rate: 0.5,
            diffusion_rate: 0.1,
        }
    }
}

impl WorldConfig {
    /// Checks every field, returning the first violation.
    pub fn validate(&self) -> Result<(), ParamError> {
        for (axis, value) in self.dimensions.iter().enumerate() {
            if !value.is_finite() || *value <= 0.0 {
                let field = if axis == 0 { "dimensions.x" } else { "dimensions.y" };
                return Err(ParamError::invalid(field, format!("must be > 0, got {value}")));
            }
        }
        validate_delta_time(self.delta_time)?;
        if !self.pheromone_resolution.is_finite() || self.pheromone_resolution <= 0.0 {
            return Err(ParamError::invalid(
                "pheromone_resolution",
                format!("must be > 0, got {}", self.pheromone_resolution),
            ));
        }
        for (name, value) in [
            ("evaporation_rate", self.evaporation_rate),
            ("diffusion_rate", self.diffusion_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ParamError::invalid(name, format!("must be >= 0, got {value}")));
            }
        }
        Ok(())
    }
}

/// A time step must be finite and strictly positive.
pub fn validate_delta_time(delta_time: f64) -> Result<(), ParamError> {
    if !delta_time.is_finite() || delta_time <= 0.0 {
        return Err(ParamError::invalid(
            "delta_time",
            format!("must be > 0, got {delta_time}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AntParams::default().validate().is_ok());
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_speed_bounds_must_be_ordered() {
        let params = AntParams {
            max_speed: 10.0,
            min_speed: 20.0,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(matches!(err, ParamError::Invalid { field: "max_speed", .. }));
    }

    #[test]
    fn test_negative_and_nan_rejected() {
        let negative = AntParams {
            head_radius: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let nan = AntParams {
            signal_noise: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_threshold_may_be_negative() {
        // A negative threshold simply means "always slow down when trailing".
        let params = AntParams {
            phero_speed_down_threshold: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_head_angle_upper_bound() {
        let params = AntParams {
            head_angle: 400.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_from_json_roundtrip() {
        let json = serde_json::to_string(&AntParams::default()).unwrap();
        assert_eq!(AntParams::from_json(&json).unwrap(), AntParams::default());
    }

    #[test]
    fn test_from_json_missing_field() {
        let err = AntParams::from_json(r#"{"max_speed": 10.0}"#).unwrap_err();
        assert!(matches!(err, ParamError::Malformed(_)));
    }

    #[test]
    fn test_from_json_unknown_field() {
        let mut value = serde_json::to_value(AntParams::default()).unwrap();
        value["wing_span"] = serde_json::json!(3.0);
        let err = AntParams::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, ParamError::Malformed(_)));
    }

    #[test]
    fn test_world_config_rejects_bad_delta() {
        let config = WorldConfig {
            delta_time: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(validate_delta_time(-0.1).is_err());
        assert!(validate_delta_time(0.1).is_ok());
    }

    #[test]
    fn test_world_config_partial_json_uses_defaults() {
        let config: WorldConfig = serde_json::from_str(r#"{"dimensions": [100.0, 50.0]}"#).unwrap();
        assert_eq!(config.dimensions, [100.0, 50.0]);
        assert_eq!(config.delta_time, WorldConfig::default().delta_time);
    }
}
