//! Colony scenarios for deterministic runs.

use crate::error::SimError;
use std::str::FromStr;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// FRM-001: random colony, trails must appear
    RandomColony,

    /// FRM-002: two ants meeting nose to nose
    HeadOn,

    /// FRM-003: single ant crossing the arena edge
    BoundaryCrossing,

    /// FRM-004: ant picking up a pre-laid trail
    TrailFollow,

    /// FRM-005: crowded arena, avoidance dominates
    DenseSwarm,

    /// FRM-006: parameters changed mid-run
    LiveReconfigure,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::RandomColony,
            ScenarioId::HeadOn,
            ScenarioId::BoundaryCrossing,
            ScenarioId::TrailFollow,
            ScenarioId::DenseSwarm,
            ScenarioId::LiveReconfigure,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::RandomColony => "random_colony",
            ScenarioId::HeadOn => "head_on",
            ScenarioId::BoundaryCrossing => "boundary_crossing",
            ScenarioId::TrailFollow => "trail_follow",
            ScenarioId::DenseSwarm => "dense_swarm",
            ScenarioId::LiveReconfigure => "live_reconfigure",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::RandomColony => "Random colony in a 400x400 arena, pheromone trails must form",
            ScenarioId::HeadOn => "Two ants 1 unit apart, both must evade and slow down",
            ScenarioId::BoundaryCrossing => "Ant at the +x edge wraps to the -x side at full speed",
            ScenarioId::TrailFollow => "Ant beside a laid trail turns toward it",
            ScenarioId::DenseSwarm => "10x ant density, avoidance keeps invariants intact",
            ScenarioId::LiveReconfigure => "Params and delta time changed mid-run, bad update rejected",
        }
    }
}

impl FromStr for ScenarioId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioId::all()
            .into_iter()
            .find(|id| id.name() == s.to_lowercase())
            .ok_or_else(|| SimError::UnknownScenario(s.to_string()))
    }
}
