//! Scenario runner - executes colony scenarios and checks invariants every tick.

use crate::invariants::{check_turn_rate, check_world};
use crate::scenarios::ScenarioId;

use formica_core::{AntParams, PheromoneField, RunMetrics, Vec2, World, WorldConfig};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Total ticks executed
    pub total_ticks: u64,

    /// Final simulation time in seconds
    pub final_time_secs: f64,

    /// Number of ants at the end
    pub final_ant_count: usize,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioMetrics {
    /// Per-tick aggregates folded over the run
    #[serde(flatten)]
    pub run: RunMetrics,

    /// Pheromone left in the field at the end
    pub final_pheromone: f64,
}

/// Hook called after every tick with the tick index.
type TickHook<'a> = dyn FnMut(u64, &mut World) -> Result<(), String> + 'a;

/// Runs colony scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Number of ants for the colony scenarios
    num_ants: usize,

    /// Maximum duration in seconds
    max_duration_secs: f64,

    /// Arena settings for the colony scenarios
    world: WorldConfig,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64, num_ants: usize) -> Self {
        Self {
            seed,
            num_ants,
            max_duration_secs: 10.0,
            world: WorldConfig::default(),
        }
    }

    /// Sets the maximum duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = secs;
        self
    }

    /// Sets the arena used by the colony scenarios.
    pub fn with_world(mut self, world: WorldConfig) -> Self {
        self.world = world;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let outcome = match scenario {
            ScenarioId::RandomColony => self.run_random_colony(),
            ScenarioId::HeadOn => self.run_head_on(),
            ScenarioId::BoundaryCrossing => self.run_boundary_crossing(),
            ScenarioId::TrailFollow => self.run_trail_follow(),
            ScenarioId::DenseSwarm => self.run_dense_swarm(),
            ScenarioId::LiveReconfigure => self.run_live_reconfigure(),
        };

        match outcome {
            Ok(result) => result.into_result(scenario, self.seed),
            Err(reason) => {
                warn!("Scenario {} could not be set up: {}", scenario.name(), reason);
                ScenarioResult {
                    scenario,
                    seed: self.seed,
                    passed: false,
                    total_ticks: 0,
                    final_time_secs: 0.0,
                    final_ant_count: 0,
                    failure_reason: Some(reason),
                    metrics: ScenarioMetrics::default(),
                }
            }
        }
    }

    /// FRM-001: RandomColony - trails must form from random starts.
    fn run_random_colony(&self) -> Result<Outcome, String> {
        info!("FRM-001: RandomColony - {} ants", self.num_ants);
        let mut world = self.colony(self.world.clone(), self.num_ants)?;
        let ticks = self.ticks_for(&world);

        let mut outcome = drive(&mut world, ticks, &mut |_, _| Ok(()));
        outcome.require(&world, |world, metrics| {
            if world.field().total() <= 0.0 {
                return Err("no pheromone in the field".to_string());
            }
            if metrics.peak_trailing_ratio <= 0.0 {
                return Err("no ant ever followed a trail".to_string());
            }
            Ok(())
        });
        Ok(outcome.finish(&world))
    }

    /// FRM-002: HeadOn - two ants 1 unit apart must both evade and slow down.
    fn run_head_on(&self) -> Result<Outcome, String> {
        info!("FRM-002: HeadOn");
        let mut world = World::new(&self.world, self.seed).map_err(|e| e.to_string())?;
        let params = quiet_params();
        let a = world.add_ant(Vec2::zeros(), Vec2::new(1.0, 0.0), params).map_err(|e| e.to_string())?;
        let b = world.add_ant(Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0), params).map_err(|e| e.to_string())?;
        let start_speed = 50.0;
        for id in [a, b] {
            if let Some(ant) = world.ant_mut(id) {
                ant.set_speed(start_speed);
            }
        }
        let ticks = self.ticks_for(&world);

        let mut outcome = drive(&mut world, ticks, &mut |tick, world| {
            if tick != 0 {
                return Ok(());
            }
            if world.last_stats().evading != 2 {
                return Err(format!("expected both ants to evade, got {}", world.last_stats().evading));
            }
            match world.ants().iter().find(|ant| ant.speed() >= start_speed) {
                Some(ant) => Err(format!("ant {} did not slow down", ant.id())),
                None => Ok(()),
            }
        });
        Ok(outcome.finish(&world))
    }

    /// FRM-003: BoundaryCrossing - ant at x=199 wraps to x=-181 in one tick.
    fn run_boundary_crossing(&self) -> Result<Outcome, String> {
        info!("FRM-003: BoundaryCrossing");
        let config = WorldConfig {
            dimensions: [400.0, 400.0],
            delta_time: 0.1,
            ..self.world.clone()
        };
        let mut world = World::new(&config, self.seed).map_err(|e| e.to_string())?;
        let params = AntParams {
            max_speed: 200.0,
            ..quiet_params()
        };
        let id = world
            .add_ant(Vec2::new(199.0, 0.0), Vec2::new(1.0, 0.0), params)
            .map_err(|e| e.to_string())?;
        if let Some(ant) = world.ant_mut(id) {
            ant.set_speed(200.0);
        }
        let ticks = self.ticks_for(&world);

        let mut outcome = drive(&mut world, ticks, &mut |tick, world| {
            if tick != 0 {
                return Ok(());
            }
            let x = world.ants()[0].position().x;
            if world.last_stats().wrapped != 1 || (x + 181.0).abs() > 1e-6 {
                return Err(format!("expected wrap to x=-181, got x={x}"));
            }
            Ok(())
        });
        outcome.require(&world, |_, metrics| {
            if metrics.wraps == 0 {
                Err("ant never crossed the edge".to_string())
            } else {
                Ok(())
            }
        });
        Ok(outcome.finish(&world))
    }

    /// FRM-004: TrailFollow - an ant with a trail on its left turns left.
    fn run_trail_follow(&self) -> Result<Outcome, String> {
        info!("FRM-004: TrailFollow");
        let config = WorldConfig {
            dimensions: [400.0, 400.0],
            ..self.world.clone()
        };
        let mut world = World::new(&config, self.seed).map_err(|e| e.to_string())?;
        for x in -150..=150 {
            world.field_mut().add_concentration(Vec2::new(f64::from(x), 8.0), 20.0);
        }
        world
            .add_ant(Vec2::new(-100.0, 0.0), Vec2::new(1.0, 0.0), quiet_params())
            .map_err(|e| e.to_string())?;
        let ticks = self.ticks_for(&world);

        let mut outcome = drive(&mut world, ticks, &mut |tick, world| {
            if tick != 0 {
                return Ok(());
            }
            let heading = world.ants()[0].direction();
            if world.last_stats().trailing != 1 || heading.y <= 0.0 {
                return Err(format!("ant did not turn toward the trail: {heading:?}"));
            }
            Ok(())
        });
        Ok(outcome.finish(&world))
    }

    /// FRM-005: DenseSwarm - ten times the ants in a quarter of the space.
    fn run_dense_swarm(&self) -> Result<Outcome, String> {
        let count = self.num_ants.max(1) * 10;
        info!("FRM-005: DenseSwarm - {} ants", count);
        let config = WorldConfig {
            dimensions: [
                self.world.dimensions[0] / 2.0,
                self.world.dimensions[1] / 2.0,
            ],
            ..self.world.clone()
        };
        let mut world = self.colony(config, count)?;
        let ticks = self.ticks_for(&world);

        let mut outcome = drive(&mut world, ticks, &mut |_, _| Ok(()));
        outcome.require(&world, |_, metrics| {
            if metrics.evasions == 0 {
                Err("no collision avoidance in a crowded arena".to_string())
            } else {
                Ok(())
            }
        });
        Ok(outcome.finish(&world))
    }

    /// FRM-006: LiveReconfigure - parameters change halfway through.
    fn run_live_reconfigure(&self) -> Result<Outcome, String> {
        info!("FRM-006: LiveReconfigure - {} ants", self.num_ants);
        let mut world = self.colony(self.world.clone(), self.num_ants)?;
        let ticks = self.ticks_for(&world);
        let switch_at = ticks / 2;
        let slow = AntParams {
            max_speed: 40.0,
            min_speed: 10.0,
            max_turn_angle: 180.0,
            ..AntParams::default()
        };

        let mut outcome = drive(&mut world, ticks, &mut |tick, world| {
            if tick != switch_at {
                return Ok(());
            }
            let broken = AntParams {
                min_speed: 500.0,
                ..slow
            };
            if world.reconfigure(broken).is_ok() {
                return Err("invalid parameters were accepted".to_string());
            }
            if world.ants().iter().any(|ant| *ant.params() != AntParams::default()) {
                return Err("rejected update leaked into ant parameters".to_string());
            }
            world.reconfigure(slow).map_err(|e| e.to_string())?;
            world.set_delta_time(0.02).map_err(|e| e.to_string())?;
            debug!(tick, "Parameters switched");
            Ok(())
        });
        outcome.require(&world, |world, _| {
            if world.ants().iter().all(|ant| *ant.params() == slow) {
                Ok(())
            } else {
                Err("not every ant picked up the new parameters".to_string())
            }
        });
        Ok(outcome.finish(&world))
    }

    /// World of `count` randomly placed ants.
    fn colony(&self, config: WorldConfig, count: usize) -> Result<World, String> {
        let mut world = World::new(&config, self.seed).map_err(|e| e.to_string())?;
        world
            .spawn_random(count, AntParams::default())
            .map_err(|e| e.to_string())?;
        Ok(world)
    }

    fn ticks_for<F: PheromoneField>(&self, world: &World<F>) -> u64 {
        (self.max_duration_secs / world.delta_time()).round() as u64
    }
}

fn quiet_params() -> AntParams {
    AntParams {
        signal_noise: 0.0,
        ..AntParams::default()
    }
}

/// Steps `world` for `ticks`, checking invariants after every tick.
///
/// Stops at the first violation or hook failure.
fn drive(world: &mut World, ticks: u64, hook: &mut TickHook<'_>) -> Outcome {
    let mut metrics = RunMetrics::default();
    for tick in 0..ticks {
        world.step();
        metrics.record(world.last_stats());

        let max_turn = world
            .ants()
            .iter()
            .map(|ant| ant.params().max_turn_angle)
            .fold(0.0, f64::max);
        let mut checked = check_world(&*world)
            .and_then(|()| check_turn_rate(&*world, max_turn, world.delta_time()))
            .map_err(|v| format!("tick {tick}: {v}"));
        if checked.is_ok() {
            checked = hook(tick, world).map_err(|e| format!("tick {tick}: {e}"));
        }

        if let Err(reason) = checked {
            return Outcome {
                metrics,
                failure: Some(reason),
                ..Default::default()
            };
        }
        if tick % 100 == 0 {
            debug!(
                "  t={:.2}s | evading={} | trailing={}",
                world.elapsed(),
                world.last_stats().evading,
                world.last_stats().trailing
            );
        }
    }
    Outcome {
        metrics,
        ..Default::default()
    }
}

/// Result of driving a world, before it is turned into a [`ScenarioResult`].
#[derive(Debug, Default)]
struct Outcome {
    metrics: RunMetrics,
    failure: Option<String>,
    final_time_secs: f64,
    final_ant_count: usize,
    final_pheromone: f64,
}

impl Outcome {
    /// Applies a final check unless the run already failed.
    fn require<C>(&mut self, world: &World, check: C)
    where
        C: FnOnce(&World, &RunMetrics) -> Result<(), String>,
    {
        if self.failure.is_none() {
            self.failure = check(world, &self.metrics).err();
        }
    }

    fn finish(mut self, world: &World) -> Self {
        self.final_time_secs = world.elapsed();
        self.final_ant_count = world.ant_count();
        self.final_pheromone = world.field().total();
        self
    }

    fn into_result(self, scenario: ScenarioId, seed: u64) -> ScenarioResult {
        ScenarioResult {
            scenario,
            seed,
            passed: self.failure.is_none(),
            total_ticks: self.metrics.ticks,
            final_time_secs: self.final_time_secs,
            final_ant_count: self.final_ant_count,
            failure_reason: self.failure,
            metrics: ScenarioMetrics {
                run: self.metrics,
                final_pheromone: self.final_pheromone,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_random_colony_scenario() {
        let runner = ScenarioRunner::new(42, 100).with_duration(5.0);

        let result = runner.run(ScenarioId::RandomColony);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.total_ticks, 200);
        assert!(result.metrics.final_pheromone > 0.0);
    }

    #[test]
    fn test_head_on_scenario() {
        let runner = ScenarioRunner::new(42, 6).with_duration(1.0);

        let result = runner.run(ScenarioId::HeadOn);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.run.evasions >= 2);
    }

    #[test]
    fn test_boundary_crossing_scenario() {
        let runner = ScenarioRunner::new(42, 6).with_duration(1.0);

        let result = runner.run(ScenarioId::BoundaryCrossing);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.total_ticks, 10);
        assert_eq!(result.final_ant_count, 1);
    }

    #[test]
    fn test_trail_follow_scenario() {
        let runner = ScenarioRunner::new(42, 6).with_duration(1.0);

        let result = runner.run(ScenarioId::TrailFollow);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.run.peak_trailing_ratio > 0.0);
    }

    #[test]
    fn test_dense_swarm_scenario() {
        let runner = ScenarioRunner::new(42, 20).with_duration(1.0);

        let result = runner.run(ScenarioId::DenseSwarm);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.final_ant_count, 200);
        assert!(result.metrics.run.evasions > 0);
    }

    #[test]
    fn test_live_reconfigure_scenario() {
        let runner = ScenarioRunner::new(42, 30).with_duration(1.0);

        let result = runner.run(ScenarioId::LiveReconfigure);

        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let runner1 = ScenarioRunner::new(7, 40).with_duration(1.0);
        let runner2 = ScenarioRunner::new(7, 40).with_duration(1.0);

        let r1 = runner1.run(ScenarioId::RandomColony);
        let r2 = runner2.run(ScenarioId::RandomColony);

        assert_eq!(r1.metrics.run, r2.metrics.run);
        assert_eq!(r1.metrics.final_pheromone, r2.metrics.final_pheromone);
    }

    #[test]
    fn test_invalid_world_fails_cleanly() {
        let runner = ScenarioRunner::new(1, 5).with_world(WorldConfig {
            delta_time: -1.0,
            ..Default::default()
        });

        let result = runner.run(ScenarioId::RandomColony);

        assert!(!result.passed);
        assert_eq!(result.total_ticks, 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_scripted_scenarios_pass_for_any_seed(seed in any::<u64>()) {
            let runner = ScenarioRunner::new(seed, 10).with_duration(0.5);
            for scenario in [ScenarioId::HeadOn, ScenarioId::BoundaryCrossing, ScenarioId::TrailFollow] {
                let result = runner.run(scenario);
                prop_assert!(result.passed, "{}: {:?}", scenario.name(), result.failure_reason);
            }
        }
    }
}
