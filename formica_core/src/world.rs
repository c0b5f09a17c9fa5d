//! World - the arena that owns the ants and the pheromone field.
//!
//! A tick has two phases:
//! 1. **Read**: the spatial index is bulk-loaded from pre-tick positions and
//!    every ant updates against it and the pre-tick field.
//! 2. **Commit**: deposits are written in ant order, then the field runs its
//!    own dynamics (diffusion, evaporation).
//!
//! No ant ever sees another ant's same-tick move or deposit, so the result
//! is independent of update order and the `parallel` feature changes
//! nothing but wall-clock time.

use crate::ant::{wrap_toroidal, Ant, AntStep, TickView};
use crate::error::{ParamError, WorldError};
use crate::geometry::{normalize, Vec2};
use crate::metrics::TickStats;
use crate::params::{validate_delta_time, AntParams, WorldConfig};
use crate::pheromone::{PheromoneField, PheromoneGrid};
use crate::rng::{ant_rng, spawn_rng};
use crate::snapshot::{pack_ants, FrameSnapshot, RecordingMeta, ANT_CHANNELS, SNAPSHOT_VERSION};
use crate::spatial::{LinearScan, NeighborQuery, SpatialIndex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Simulation arena.
///
/// Generic over the pheromone medium; [`PheromoneGrid`] is the default.
pub struct World<F: PheromoneField = PheromoneGrid> {
    dimensions: Vec2,
    delta_time: f64,
    ants: Vec<Ant>,
    field: F,

    /// Master seed for all per-ant noise streams
    seed: u64,

    /// Placement stream for `spawn_random`
    spawn_rng: ChaCha8Rng,

    next_id: u32,
    tick_count: u64,
    elapsed: f64,
    last_stats: TickStats,
}

impl World<PheromoneGrid> {
    /// Creates an empty world with a [`PheromoneGrid`] sized from `config`.
    pub fn new(config: &WorldConfig, seed: u64) -> Result<Self, ParamError> {
        config.validate()?;
        let dimensions = Vec2::new(config.dimensions[0], config.dimensions[1]);
        let field = PheromoneGrid::new(
            dimensions,
            config.pheromone_resolution,
            config.evaporation_rate,
            config.diffusion_rate,
        );
        Self::with_field(config, field, seed)
    }

    /// Captures ants and pheromone for recording.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            tick: self.tick_count,
            time: self.elapsed,
            ant_shape: [ANT_CHANNELS, self.ants.len(), 2],
            ants: pack_ants(&self.ants),
            pheromone_shape: self.field.shape(),
            pheromone: self.field.as_slice().to_vec(),
        }
    }

    /// Applies a new world config between ticks.
    ///
    /// Delta time and field rates change; arena size and grid resolution are
    /// fixed for the lifetime of a world and must match.
    pub fn reconfigure_world(&mut self, config: &WorldConfig) -> Result<(), ParamError> {
        config.validate()?;
        if config.dimensions != [self.dimensions.x, self.dimensions.y] {
            return Err(ParamError::invalid("dimensions", "cannot change during a run"));
        }
        if config.pheromone_resolution != self.field.resolution() {
            return Err(ParamError::invalid(
                "pheromone_resolution",
                "cannot change during a run",
            ));
        }
        self.delta_time = config.delta_time;
        self.field.set_rates(config.evaporation_rate, config.diffusion_rate);
        debug!(delta_time = config.delta_time, "World reconfigured");
        Ok(())
    }

    /// Static world description for a recording header.
    pub fn recording_meta(&self) -> RecordingMeta {
        RecordingMeta {
            version: SNAPSHOT_VERSION.to_string(),
            world_dimensions: [self.dimensions.x, self.dimensions.y],
            world_delta_time: self.delta_time,
            phero_resolution: self.field.resolution(),
            ant_count: self.ants.len(),
        }
    }
}

impl<F: PheromoneField> World<F> {
    /// Creates an empty world around an existing field.
    ///
    /// # Arguments
    /// * `config` - Dimensions and delta time (field settings are ignored)
    /// * `field` - Pheromone medium
    /// * `seed` - Master seed for placement and noise
    pub fn with_field(config: &WorldConfig, field: F, seed: u64) -> Result<Self, ParamError> {
        config.validate()?;
        let dimensions = Vec2::new(config.dimensions[0], config.dimensions[1]);
        debug!(
            width = dimensions.x,
            height = dimensions.y,
            delta_time = config.delta_time,
            seed,
            "World created"
        );
        Ok(Self {
            dimensions,
            delta_time: config.delta_time,
            ants: Vec::new(),
            field,
            seed,
            spawn_rng: spawn_rng(seed),
            next_id: 0,
            tick_count: 0,
            elapsed: 0.0,
            last_stats: TickStats::default(),
        })
    }

    // =========================================================================
    // POPULATION
    // =========================================================================

    /// Adds one ant and returns its id.
    ///
    /// The position is wrapped into the arena; the ant starts at
    /// `params.min_speed`.
    pub fn add_ant(&mut self, position: Vec2, direction: Vec2, params: AntParams) -> Result<u32, WorldError> {
        let id = self.next_id;
        let (position, _) = wrap_toroidal(position, self.dimensions);
        let ant = Ant::new(id, position, direction, params, ant_rng(self.seed, id))?;
        self.ants.push(ant);
        self.next_id += 1;
        Ok(id)
    }

    /// Adds `count` ants at uniformly random positions and headings.
    ///
    /// Returns the new ids. Nothing is added when `params` is invalid.
    pub fn spawn_random(&mut self, count: usize, params: AntParams) -> Result<Vec<u32>, WorldError> {
        params.validate()?;
        let half = self.dimensions / 2.0;
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let position = Vec2::new(
                self.spawn_rng.gen_range(-half.x..half.x),
                self.spawn_rng.gen_range(-half.y..half.y),
            );
            let direction = loop {
                let candidate = Vec2::new(self.spawn_rng.gen_range(-1.0..1.0), self.spawn_rng.gen_range(-1.0..1.0));
                if let Ok(unit) = normalize(candidate) {
                    break unit;
                }
            };
            ids.push(self.add_ant(position, direction, params)?);
        }
        debug!(count, total = self.ants.len(), "Spawned random ants");
        Ok(ids)
    }

    // =========================================================================
    // SIMULATION
    // =========================================================================

    /// Advances every ant by one tick of `delta` seconds of behaviour time.
    ///
    /// Movement always integrates with the world's own `delta_time`. A
    /// non-positive or non-finite `delta` is rejected with a warning and the
    /// world is left untouched.
    pub fn tick(&mut self, delta: f64) {
        if let Err(e) = validate_delta_time(delta) {
            warn!(delta, "Skipping tick: {}", e);
            return;
        }

        let index = SpatialIndex::build(self.ants.iter().map(|a| (a.id(), a.position())));
        let view = TickView {
            index: &index,
            field: &self.field,
            dimensions: self.dimensions,
            delta_time: self.delta_time,
        };

        #[cfg(feature = "parallel")]
        let steps: Vec<AntStep> = self.ants.par_iter_mut().map(|ant| ant.update(delta, &view)).collect();

        #[cfg(not(feature = "parallel"))]
        let steps: Vec<AntStep> = self.ants.iter_mut().map(|ant| ant.update(delta, &view)).collect();

        for step in &steps {
            step.deposit.apply(&mut self.field);
        }
        self.field.step(delta);

        self.last_stats = TickStats::collect(&self.ants, &steps);
        self.tick_count += 1;
        self.elapsed += delta;
    }

    /// One tick using the world's own delta time.
    pub fn step(&mut self) {
        self.tick(self.delta_time);
    }

    // =========================================================================
    // LIVE RECONFIGURATION
    // =========================================================================

    /// Applies `params` to every ant.
    ///
    /// Positions and headings are kept and speeds re-clamped. On a
    /// validation error no ant changes. Returns the number of ants updated.
    pub fn reconfigure(&mut self, params: AntParams) -> Result<usize, ParamError> {
        params.validate()?;
        for ant in &mut self.ants {
            ant.apply_params(params);
        }
        info!("changed params of {} ants", self.ants.len());
        Ok(self.ants.len())
    }

    /// Parses a full parameter set from JSON and applies it.
    pub fn reconfigure_from_json(&mut self, json: &str) -> Result<usize, ParamError> {
        let params = AntParams::from_json(json)?;
        self.reconfigure(params)
    }

    /// Changes the integration step used for movement.
    pub fn set_delta_time(&mut self, delta_time: f64) -> Result<(), ParamError> {
        validate_delta_time(delta_time)?;
        debug!(old = self.delta_time, new = delta_time, "World delta time changed");
        self.delta_time = delta_time;
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// True when any ant other than `exclude` is within `radius` of
    /// `position`.
    pub fn any_ant_within(&self, position: Vec2, radius: f64, exclude: Option<u32>) -> bool {
        let scan = LinearScan::build(self.ants.iter().map(|a| (a.id(), a.position())));
        !scan.positions_in_radius(position, radius, exclude).is_empty()
    }

    /// Index over the current positions.
    pub fn build_index(&self) -> SpatialIndex {
        SpatialIndex::build(self.ants.iter().map(|a| (a.id(), a.position())))
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn ant(&self, id: u32) -> Option<&Ant> {
        self.ants.iter().find(|a| a.id() == id)
    }

    pub fn ant_mut(&mut self, id: u32) -> Option<&mut Ant> {
        self.ants.iter_mut().find(|a| a.id() == id)
    }

    pub fn ant_count(&self) -> usize {
        self.ants.len()
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut F {
        &mut self.field
    }

    pub fn dimensions(&self) -> Vec2 {
        self.dimensions
    }

    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks completed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Behaviour time accumulated over all ticks.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Aggregates of the most recent tick.
    pub fn last_stats(&self) -> &TickStats {
        &self.last_stats
    }
}
