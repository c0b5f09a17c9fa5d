//! Formica Simulation Driver
//!
//! Runs [`formica_core`] worlds deterministically from a single seed:
//! - **Simulator**: steps a configured colony and records frames
//! - **Scenarios**: scripted colonies with per-tick invariant checks
//! - **Exporter**: JSON recordings with a metadata header
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  Simulator                   │
//! │  SimConfig ──▶ World ──▶ Recording (JSON)    │
//! │                  ▲                           │
//! │        LiveParams│(reconfigure, delta)       │
//! └──────────────────────────────────────────────┘
//! ┌──────────────────────────────────────────────┐
//! │               ScenarioRunner                 │
//! │  ScenarioId ──▶ World ──▶ invariants/tick    │
//! │                       ──▶ ScenarioResult     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use formica_sim::{SimConfig, Simulator};
//!
//! let mut sim = Simulator::new(SimConfig::default())?;
//! let recording = sim.record(10.0, 4)?;
//! recording.write_to_file("colony.json")?;
//! ```

mod config;
mod error;
mod exporter;
mod invariants;
mod runner;
mod simulator;
pub mod scenarios;

pub use config::{LiveParams, SimConfig};
pub use error::SimError;
pub use exporter::{Recording, RecordingMetadata};
pub use invariants::{check_turn_rate, check_world, InvariantViolation};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use simulator::Simulator;
