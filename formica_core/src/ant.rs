//! A single ant and its per-tick state transition.
//!
//! Each tick an ant:
//! 1. drops pheromone at its tail,
//! 2. steers away from crowding neighbours, or else follows the trail under
//!    its antennae (random walk when there is none),
//! 3. slows down when evading or on a strong trail, speeds up otherwise,
//! 4. moves forward and wraps around the arena edges.
//!
//! The ant never writes to the world directly. It reads a [`TickView`] built
//! from pre-tick state and hands its deposit back in an [`AntStep`].

use crate::error::{GeometryError, ParamError, WorldError};
use crate::geometry::{normalize, oriented_angle, rotate, Vec2};
use crate::params::AntParams;
use crate::pheromone::{Deposit, PheromoneField};
use crate::spatial::{Neighbor, NeighborQuery};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Pheromone dropped per unit of speed per second.
pub const DEPOSIT_RATE: f64 = 100.0;

/// Read-only world state an ant sees during one tick.
pub struct TickView<'a, Q: NeighborQuery + ?Sized, F: PheromoneField + ?Sized> {
    /// Positions of all ants before anyone moved this tick
    pub index: &'a Q,

    /// Pheromone field before this tick's deposits
    pub field: &'a F,

    /// Arena width and height
    pub dimensions: Vec2,

    /// World integration step used for movement
    pub delta_time: f64,
}

/// What one ant did during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AntStep {
    /// Pheromone to commit once every ant has been updated
    pub deposit: Deposit,

    /// Whether collision avoidance ran (and trail following was skipped)
    pub evaded: bool,

    /// Collision vector used for avoidance, if any
    pub collision: Option<Vec2>,

    /// Trail strength in [0, 1]; zero when evading or off-trail
    pub trail_signal: f64,

    /// Signed heading change in degrees (positive is counter-clockwise)
    pub turn_degrees: f64,

    /// Whether the ant crossed an arena edge
    pub wrapped: bool,
}

/// Serializable kinematic state of an ant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntState {
    pub id: u32,

    /// Arena position `[x, y]`
    pub position: [f64; 2],

    /// Unit heading `[x, y]`
    pub direction: [f64; 2],

    /// Units per second
    pub speed: f64,

    /// Steering magnitude of the last trail-following tick
    pub trail_signal: f64,

    /// Whether the last tick ran collision avoidance
    pub evading: bool,
}

/// A simulated ant.
#[derive(Debug, Clone)]
pub struct Ant {
    id: u32,
    position: Vec2,

    /// Unit heading
    direction: Vec2,
    speed: f64,
    params: AntParams,

    /// Private noise stream
    rng: ChaCha8Rng,

    last_signal: f64,
    evading: bool,
}

impl Ant {
    /// Creates an ant moving at `params.min_speed`.
    ///
    /// # Arguments
    /// * `id` - Unique id within the world
    /// * `position` - Starting position
    /// * `direction` - Initial heading; normalized, must be non-zero
    /// * `params` - Behaviour parameters (validated)
    /// * `rng` - Noise stream owned by this ant
    pub fn new(
        id: u32,
        position: Vec2,
        direction: Vec2,
        params: AntParams,
        rng: ChaCha8Rng,
    ) -> Result<Self, WorldError> {
        params.validate()?;
        let direction = normalize(direction)?;
        Ok(Self {
            id,
            position,
            direction,
            speed: params.min_speed,
            params,
            rng,
            last_signal: 0.0,
            evading: false,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn params(&self) -> &AntParams {
        &self.params
    }

    /// Trail signal from the last tick.
    pub fn last_signal(&self) -> f64 {
        self.last_signal
    }

    /// Whether the last tick was spent avoiding neighbours.
    pub fn is_evading(&self) -> bool {
        self.evading
    }

    /// Sets the speed, clamped to the current bounds.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = self.params.clamp_speed(speed);
    }

    /// Replaces the behaviour parameters.
    ///
    /// Position and heading are kept; speed is re-clamped to the new bounds.
    /// On error nothing changes.
    pub fn reconfigure(&mut self, params: AntParams) -> Result<(), ParamError> {
        params.validate()?;
        self.apply_params(params);
        Ok(())
    }

    /// Applies an already validated parameter set.
    pub(crate) fn apply_params(&mut self, params: AntParams) {
        self.params = params;
        self.speed = params.clamp_speed(self.speed);
    }

    /// Snapshot of the kinematic state.
    pub fn state(&self) -> AntState {
        AntState {
            id: self.id,
            position: [self.position.x, self.position.y],
            direction: [self.direction.x, self.direction.y],
            speed: self.speed,
            trail_signal: self.last_signal,
            evading: self.evading,
        }
    }

    /// Front of the body, `length / 2` ahead of the center.
    pub fn head_position(&self) -> Vec2 {
        self.position + self.direction * (self.params.length / 2.0)
    }

    /// Back of the body, where pheromone is dropped.
    pub fn tail_position(&self) -> Vec2 {
        self.position - self.direction * (self.params.length / 2.0)
    }

    /// Left antenna tip (counter-clockwise side).
    pub fn left_antenna_position(&self) -> Vec2 {
        self.antenna_position(self.params.head_angle / 2.0)
    }

    /// Right antenna tip (clockwise side).
    pub fn right_antenna_position(&self) -> Vec2 {
        self.antenna_position(-self.params.head_angle / 2.0)
    }

    fn antenna_position(&self, degrees: f64) -> Vec2 {
        self.head_position() + rotate(self.direction * self.params.head_radius, degrees)
    }

    /// Mean of the unit vectors pointing from each neighbour to this ant.
    ///
    /// Neighbours at exactly this ant's position have no direction and are
    /// skipped. Returns zero when nothing contributes.
    pub fn weighted_collision_vector(&self, neighbors: &[Neighbor]) -> Vec2 {
        let mut sum = Vec2::zeros();
        let mut count = 0usize;
        for neighbor in neighbors {
            if let Ok(away) = normalize(self.position - neighbor.position) {
                sum += away;
                count += 1;
            }
        }
        if count == 0 {
            Vec2::zeros()
        } else {
            sum / count as f64
        }
    }

    /// Advances the ant by one tick.
    ///
    /// # Arguments
    /// * `delta` - Behaviour time for this tick (turn and speed rates)
    /// * `view` - Pre-tick world state
    pub fn update<Q, F>(&mut self, delta: f64, view: &TickView<'_, Q, F>) -> AntStep
    where
        Q: NeighborQuery + ?Sized,
        F: PheromoneField + ?Sized,
    {
        let deposit = Deposit {
            position: self.tail_position(),
            amount: DEPOSIT_RATE * delta * self.speed,
        };

        let (evaded, collision, mut turn_degrees) = match self.evade_objects(delta, view.index) {
            Some((collision, turn)) => (true, Some(collision), turn),
            None => (false, None, 0.0),
        };

        let mut trail_signal = 0.0;
        if !evaded {
            let (signal, turn) = self.follow_trail(delta, view.field);
            trail_signal = signal;
            turn_degrees = turn;
        }

        if evaded || trail_signal >= self.params.phero_speed_down_threshold {
            self.speed_down(delta);
        } else {
            self.speed_up(delta);
        }

        self.position += self.direction * self.speed * view.delta_time;
        let (position, wrapped) = wrap_toroidal(self.position, view.dimensions);
        self.position = position;

        self.evading = evaded;
        self.last_signal = trail_signal;

        AntStep {
            deposit,
            evaded,
            collision,
            trail_signal,
            turn_degrees,
            wrapped,
        }
    }

    /// Steers away from neighbours around the body and in front of the head.
    ///
    /// Returns the collision vector and the applied turn, or `None` when no
    /// neighbour is in range.
    fn evade_objects<Q>(&mut self, delta: f64, index: &Q) -> Option<(Vec2, f64)>
    where
        Q: NeighborQuery + ?Sized,
    {
        let mut nearby = index.positions_in_radius(self.position, self.params.center_radius, Some(self.id));
        let ahead = index.positions_in_sector(
            self.head_position(),
            self.direction,
            self.params.head_radius,
            self.params.head_angle,
            Some(self.id),
        );
        if nearby.is_empty() && ahead.is_empty() {
            return None;
        }
        nearby.extend(ahead);

        let collision = self.weighted_collision_vector(&nearby);
        let turn = self.avoidance_turn(collision, delta);
        self.turn(turn);
        Some((collision, turn))
    }

    /// Signed turn toward `direction + collision`, limited to
    /// `max_turn_angle * delta`.
    fn avoidance_turn(&self, collision: Vec2, delta: f64) -> f64 {
        let limit = self.params.max_turn_angle * delta;
        match oriented_angle(self.direction, self.direction + collision) {
            Ok(angle) if angle.orientation == 0 => {
                if angle.unsigned > 0.0 {
                    // Target straight behind: break the tie counter-clockwise.
                    angle.unsigned.min(limit)
                } else {
                    0.0
                }
            }
            Ok(angle) if angle.unsigned > limit => limit * f64::from(angle.orientation),
            Ok(angle) => angle.signed,
            Err(GeometryError::ZeroLength) => {
                trace!(ant = self.id, "collision cancels heading, keeping direction");
                0.0
            }
        }
    }

    /// Samples both antennae and turns toward the stronger side.
    ///
    /// Returns `(trail_signal, turn_degrees)`.
    fn follow_trail<F>(&mut self, delta: f64, field: &F) -> (f64, f64)
    where
        F: PheromoneField + ?Sized,
    {
        let left = field.get_concentration(self.left_antenna_position(), self.params.head_radius);
        let right = field.get_concentration(self.right_antenna_position(), self.params.head_radius);
        let noise = self.steering_noise();

        let (steer, signal) = if left + right > 0.0 {
            let steer = (squash(left - right) + noise).clamp(-1.0, 1.0);
            (steer, steer.abs())
        } else {
            (noise.clamp(-1.0, 1.0), 0.0)
        };

        let turn = self.params.max_turn_angle * steer * delta;
        self.turn(turn);
        (signal, turn)
    }

    /// One draw from N(0, signal_noise); zero when the noise is disabled.
    fn steering_noise(&mut self) -> f64 {
        if self.params.signal_noise == 0.0 {
            return 0.0;
        }
        match Normal::new(0.0, self.params.signal_noise) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => 0.0,
        }
    }

    fn turn(&mut self, degrees: f64) {
        if degrees == 0.0 {
            return;
        }
        match normalize(rotate(self.direction, degrees)) {
            Ok(direction) => self.direction = direction,
            Err(_) => trace!(ant = self.id, degrees, "degenerate rotation, keeping direction"),
        }
    }

    fn speed_up(&mut self, delta: f64) {
        self.speed = self.params.clamp_speed(self.speed + self.params.acceleration * delta);
    }

    fn speed_down(&mut self, delta: f64) {
        self.speed = self.params.clamp_speed(self.speed - self.params.acceleration * delta);
    }
}

/// Maps a concentration difference onto (-1, 1): `2 / (1 + e^(-4a)) - 1`.
pub fn squash(difference: f64) -> f64 {
    2.0 / (1.0 + (-4.0 * difference).exp()) - 1.0
}

/// Wraps `position` into `[-d/2, d/2)` on each axis.
///
/// Returns the wrapped position and whether any axis crossed an edge.
/// Coordinates already inside the arena are returned untouched.
pub fn wrap_toroidal(position: Vec2, dimensions: Vec2) -> (Vec2, bool) {
    let mut wrapped = false;
    let mut out = position;
    for axis in 0..2 {
        let size = dimensions[axis];
        let shifted = position[axis] + size / 2.0;
        if (0.0..size).contains(&shifted) {
            continue;
        }
        let mut inside = shifted.rem_euclid(size);
        if inside >= size {
            inside = 0.0;
        }
        out[axis] = inside - size / 2.0;
        wrapped = true;
    }
    (out, wrapped)
}
