//! Per-tick invariant checks shared by all scenarios.

use formica_core::{PheromoneField, World};
use thiserror::Error;

/// Tolerance on the unit-heading check.
const HEADING_TOLERANCE: f64 = 1e-9;

/// A broken invariant, reported as a scenario failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("ant {id} heading has length {norm}")]
    Heading { id: u32, norm: f64 },

    #[error("ant {id} speed {speed} outside [{min}, {max}]")]
    Speed { id: u32, speed: f64, min: f64, max: f64 },

    #[error("ant {id} at ({x}, {y}) is outside the arena")]
    Position { id: u32, x: f64, y: f64 },

    #[error("turn of {turn} deg exceeds limit {limit} deg")]
    TurnRate { turn: f64, limit: f64 },
}

/// Checks heading, speed and position of every ant in `world`.
pub fn check_world<F: PheromoneField>(world: &World<F>) -> Result<(), InvariantViolation> {
    let half = world.dimensions() / 2.0;
    for ant in world.ants() {
        let norm = ant.direction().norm();
        if (norm - 1.0).abs() > HEADING_TOLERANCE {
            return Err(InvariantViolation::Heading { id: ant.id(), norm });
        }

        let params = ant.params();
        if ant.speed() < params.min_speed || ant.speed() > params.max_speed {
            return Err(InvariantViolation::Speed {
                id: ant.id(),
                speed: ant.speed(),
                min: params.min_speed,
                max: params.max_speed,
            });
        }

        let p = ant.position();
        if !(p.x >= -half.x && p.x < half.x && p.y >= -half.y && p.y < half.y) {
            return Err(InvariantViolation::Position { id: ant.id(), x: p.x, y: p.y });
        }
    }
    Ok(())
}

/// Checks the largest turn of the last tick against `max_turn_angle * delta`.
pub fn check_turn_rate<F: PheromoneField>(
    world: &World<F>,
    max_turn_angle: f64,
    delta: f64,
) -> Result<(), InvariantViolation> {
    let turn = world.last_stats().max_turn_degrees;
    let limit = max_turn_angle * delta;
    if turn > limit + 1e-9 {
        return Err(InvariantViolation::TurnRate { turn, limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_core::{AntParams, Vec2, WorldConfig};

    #[test]
    fn test_fresh_world_passes() {
        let mut world = World::new(&WorldConfig::default(), 1).unwrap();
        world.spawn_random(10, AntParams::default()).unwrap();
        assert_eq!(check_world(&world), Ok(()));
    }

    #[test]
    fn test_turn_rate_guard() {
        let mut world = World::new(&WorldConfig::default(), 1).unwrap();
        world.add_ant(Vec2::zeros(), Vec2::new(1.0, 0.0), AntParams::default()).unwrap();
        world.step();

        // Noisy random walk always turns a little.
        assert!(world.last_stats().max_turn_degrees > 0.0);
        assert!(check_turn_rate(&world, 360.0, world.delta_time()).is_ok());
        assert!(matches!(
            check_turn_rate(&world, 0.0, 1.0),
            Err(InvariantViolation::TurnRate { .. })
        ));
    }
}
