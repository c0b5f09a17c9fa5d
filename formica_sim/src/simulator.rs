//! Simulator - drives a world for a number of steps or seconds and records it.

use crate::config::{LiveParams, SimConfig};
use crate::error::SimError;
use crate::exporter::Recording;
use formica_core::params::validate_delta_time;
use formica_core::World;
use std::path::Path;
use tracing::{debug, info};

/// A configured world plus the settings it was built from.
pub struct Simulator {
    config: SimConfig,
    world: World,
}

impl Simulator {
    /// Builds the world and spawns `config.ant_count` random ants.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut world = World::new(&config.world, config.seed)?;
        world.spawn_random(config.ant_count, config.ant)?;
        info!(
            ants = world.ant_count(),
            seed = config.seed,
            "Simulator ready"
        );
        Ok(Self { config, world })
    }

    /// Wraps an already populated world.
    pub fn from_world(config: SimConfig, world: World) -> Self {
        Self { config, world }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Runs `steps` ticks at the world's delta time.
    pub fn simulate_steps(&mut self, steps: u64) {
        for step in 0..steps {
            self.world.step();
            if step % 100 == 0 {
                debug!(
                    tick = self.world.tick_count(),
                    evading = self.world.last_stats().evading,
                    trailing = self.world.last_stats().trailing,
                    "simulating"
                );
            }
        }
    }

    /// Runs for `seconds` and keeps a frame every `step` ticks.
    ///
    /// The number of ticks is `seconds / delta_time`; the first frame is
    /// taken after the first tick.
    pub fn record(&mut self, seconds: f64, step: usize) -> Result<Recording, SimError> {
        if step == 0 {
            return Err(SimError::recording("record step must be >= 1"));
        }
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(SimError::recording(format!("duration must be >= 0, got {seconds}")));
        }

        let ticks = (seconds / self.world.delta_time()).round() as u64;
        let mut recording = Recording::new(self.world.recording_meta(), step).with_seed(self.config.seed);
        info!(ticks, step, "Recording started");

        for tick in 0..ticks {
            self.world.step();
            if tick % step as u64 == 0 {
                recording.add_frame(self.world.snapshot());
            }
            if tick % 100 == 0 {
                debug!(tick, frames = recording.frames.len(), "recording");
            }
        }

        info!(frames = recording.frames.len(), "Recording finished");
        Ok(recording)
    }

    /// Applies a live parameter update to every ant and, if present, the
    /// world delta time.
    ///
    /// Everything is validated before anything changes.
    pub fn apply_live(&mut self, live: &LiveParams) -> Result<usize, SimError> {
        live.ant.validate()?;
        if let Some(dt) = live.delta_time {
            validate_delta_time(dt)?;
        }

        let changed = self.world.reconfigure(live.ant)?;
        self.config.ant = live.ant;
        if let Some(dt) = live.delta_time {
            self.world.set_delta_time(dt)?;
            self.config.world.delta_time = dt;
        }
        Ok(changed)
    }

    /// Reads a [`LiveParams`] JSON file and applies it.
    pub fn reload_params(&mut self, path: impl AsRef<Path>) -> Result<usize, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SimError::io(path.display(), e))?;
        let live = LiveParams::from_json(&text)?;
        self.apply_live(&live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formica_core::{AntParams, WorldConfig};

    fn small_config() -> SimConfig {
        SimConfig {
            seed: 3,
            ant_count: 20,
            duration_secs: 1.0,
            world: WorldConfig {
                dimensions: [80.0, 80.0],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_new_spawns_ants() {
        let sim = Simulator::new(small_config()).unwrap();
        assert_eq!(sim.world().ant_count(), 20);
    }

    #[test]
    fn test_simulate_steps_advances_ticks() {
        let mut sim = Simulator::new(small_config()).unwrap();
        sim.simulate_steps(15);
        assert_eq!(sim.world().tick_count(), 15);
    }

    #[test]
    fn test_record_frame_count() {
        let mut sim = Simulator::new(small_config()).unwrap();
        // 1 s at 40 Hz = 40 ticks, every 4th kept.
        let rec = sim.record(1.0, 4).unwrap();
        assert_eq!(rec.metadata.frame_count, 10);
        assert_eq!(rec.frames.len(), 10);
        assert_eq!(rec.metadata.ant_count, 20);
        assert_eq!(rec.frames[0].tick, 1);
        assert_eq!(rec.frames[1].tick, 5);
        assert_eq!(sim.world().tick_count(), 40);
    }

    #[test]
    fn test_record_rejects_zero_step() {
        let mut sim = Simulator::new(small_config()).unwrap();
        assert!(matches!(sim.record(1.0, 0), Err(SimError::Recording(_))));
    }

    #[test]
    fn test_apply_live_changes_params_and_delta() {
        let mut sim = Simulator::new(small_config()).unwrap();
        let live = LiveParams {
            ant: AntParams {
                max_speed: 50.0,
                ..Default::default()
            },
            delta_time: Some(0.05),
        };
        assert_eq!(sim.apply_live(&live).unwrap(), 20);
        assert_eq!(sim.world().delta_time(), 0.05);
        assert!(sim.world().ants().iter().all(|a| a.params().max_speed == 50.0));
    }

    #[test]
    fn test_apply_live_bad_delta_changes_nothing() {
        let mut sim = Simulator::new(small_config()).unwrap();
        let live = LiveParams {
            ant: AntParams {
                max_speed: 50.0,
                ..Default::default()
            },
            delta_time: Some(-1.0),
        };
        assert!(sim.apply_live(&live).is_err());
        assert!(sim.world().ants().iter().all(|a| a.params().max_speed == 100.0));
        assert_eq!(sim.world().delta_time(), 1.0 / 40.0);
    }
}
