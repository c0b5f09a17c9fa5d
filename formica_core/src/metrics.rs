//! Formica Metrics Module
//! ======================
//!
//! Per-tick aggregates over the [`AntStep`] records returned by the ant
//! updates. They drive the scenario checks and the CLI summary:
//! - **Evading / trailing counts**: how the colony splits between behaviours
//! - **Mean speed and signal**: whether trails are forming
//! - **Max turn**: guards the turn-rate limit

use crate::ant::{Ant, AntStep};
use serde::{Deserialize, Serialize};

/// Aggregates of one world tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickStats {
    /// Ants updated
    pub ants: usize,

    /// Ants that ran collision avoidance
    pub evading: usize,

    /// Ants with a non-zero trail signal
    pub trailing: usize,

    /// Ants that crossed an arena edge
    pub wrapped: usize,

    /// Mean speed after the update
    pub mean_speed: f64,

    /// Mean trail signal
    pub mean_trail_signal: f64,

    /// Largest absolute heading change (degrees)
    pub max_turn_degrees: f64,

    /// Pheromone committed this tick
    pub deposited: f64,
}

impl TickStats {
    /// Folds the step records of one tick, paired with the updated ants.
    pub fn collect(ants: &[Ant], steps: &[AntStep]) -> Self {
        let mut stats = TickStats {
            ants: steps.len(),
            ..Default::default()
        };
        if steps.is_empty() {
            return stats;
        }

        for step in steps {
            stats.evading += usize::from(step.evaded);
            stats.trailing += usize::from(step.trail_signal > 0.0);
            stats.wrapped += usize::from(step.wrapped);
            stats.mean_trail_signal += step.trail_signal;
            stats.max_turn_degrees = stats.max_turn_degrees.max(step.turn_degrees.abs());
            stats.deposited += step.deposit.amount;
        }
        stats.mean_trail_signal /= steps.len() as f64;
        stats.mean_speed = ants.iter().map(Ant::speed).sum::<f64>() / ants.len().max(1) as f64;
        stats
    }

    /// Fraction of ants currently following a trail.
    pub fn trailing_ratio(&self) -> f64 {
        if self.ants == 0 {
            0.0
        } else {
            self.trailing as f64 / self.ants as f64
        }
    }
}

/// Running aggregates over many ticks, as reported by the scenario runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub ticks: u64,
    pub evasions: u64,
    pub wraps: u64,
    pub peak_trailing_ratio: f64,
    pub mean_speed_sum: f64,
    pub max_turn_degrees: f64,
}

impl RunMetrics {
    /// Adds one tick.
    pub fn record(&mut self, stats: &TickStats) {
        self.ticks += 1;
        self.evasions += stats.evading as u64;
        self.wraps += stats.wrapped as u64;
        self.peak_trailing_ratio = self.peak_trailing_ratio.max(stats.trailing_ratio());
        self.mean_speed_sum += stats.mean_speed;
        self.max_turn_degrees = self.max_turn_degrees.max(stats.max_turn_degrees);
    }

    /// Mean of the per-tick mean speeds.
    pub fn mean_speed(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.mean_speed_sum / self.ticks as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;
    use crate::params::AntParams;
    use crate::pheromone::Deposit;
    use crate::rng::ant_rng;

    fn step(evaded: bool, trail_signal: f64, turn: f64) -> AntStep {
        AntStep {
            deposit: Deposit {
                position: Vec2::zeros(),
                amount: 2.0,
            },
            evaded,
            collision: None,
            trail_signal,
            turn_degrees: turn,
            wrapped: false,
        }
    }

    #[test]
    fn test_collect_counts_behaviours() {
        let ants: Vec<Ant> = (0..3)
            .map(|id| Ant::new(id, Vec2::zeros(), Vec2::new(1.0, 0.0), AntParams::default(), ant_rng(0, id)).unwrap())
            .collect();
        let steps = [step(true, 0.0, 4.0), step(false, 0.6, -9.0), step(false, 0.0, 1.0)];
        let stats = TickStats::collect(&ants, &steps);

        assert_eq!(stats.ants, 3);
        assert_eq!(stats.evading, 1);
        assert_eq!(stats.trailing, 1);
        assert_eq!(stats.max_turn_degrees, 9.0);
        assert_eq!(stats.deposited, 6.0);
        assert_eq!(stats.mean_speed, 20.0);
        assert!((stats.trailing_ratio() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_tick() {
        let stats = TickStats::collect(&[], &[]);
        assert_eq!(stats, TickStats::default());
        assert_eq!(stats.trailing_ratio(), 0.0);
    }

    #[test]
    fn test_run_metrics_accumulate() {
        let mut run = RunMetrics::default();
        run.record(&TickStats {
            ants: 2,
            trailing: 1,
            mean_speed: 10.0,
            ..Default::default()
        });
        run.record(&TickStats {
            ants: 2,
            mean_speed: 30.0,
            evading: 2,
            ..Default::default()
        });
        assert_eq!(run.ticks, 2);
        assert_eq!(run.evasions, 2);
        assert_eq!(run.peak_trailing_ratio, 0.5);
        assert_eq!(run.mean_speed(), 20.0);
    }
}
