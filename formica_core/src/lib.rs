//! Formica Core - Stigmergic Ant Colony Simulation
//!
//! Ants coordinate only through the environment: each one drops pheromone
//! behind itself, steers toward stronger trails under its antennae and
//! sidesteps crowding neighbours. Trails emerge from these local rules.
//!
//! ```text
//!   ┌──────────────┐  pre-tick positions  ┌──────────────┐
//!   │    World     │ ───────────────────▶ │ SpatialIndex │
//!   │  (ants, dt)  │                      │   (R*-tree)  │
//!   └──────┬───────┘                      └──────┬───────┘
//!          │ TickView                            │ neighbours
//!          ▼                                     ▼
//!   ┌──────────────┐  antenna sampling    ┌──────────────┐
//!   │  Ant::update │ ◀─────────────────── │ PheromoneGrid│
//!   └──────┬───────┘                      └──────▲───────┘
//!          │ AntStep { deposit, .. }             │ commit + evaporate
//!          └─────────────────────────────────────┘
//! ```
//!
//! Every tick reads a frozen pre-tick state and commits deposits afterwards,
//! so runs are reproducible from a seed.

pub mod ant;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod params;
pub mod pheromone;
pub mod rng;
pub mod snapshot;
pub mod spatial;
pub mod world;

// Re-export key types for convenience
pub use ant::{Ant, AntState, AntStep, TickView};
pub use error::{GeometryError, ParamError, WorldError};
pub use geometry::{angle_between, normalize, oriented_angle, rotate, OrientedAngle, Vec2};
pub use metrics::{RunMetrics, TickStats};
pub use params::{AntParams, WorldConfig};
pub use pheromone::{Deposit, PheromoneField, PheromoneGrid};
pub use snapshot::{FrameSnapshot, RecordingMeta};
pub use spatial::{LinearScan, Neighbor, NeighborQuery, SpatialIndex};
pub use world::World;
