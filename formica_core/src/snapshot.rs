//! Frame snapshots for recording and visualisation.
//!
//! Ant state is packed into a flat `f64` array of shape `(3, ants, 2)`:
//! channel 0 is the position, channel 1 the heading and channel 2 holds
//! `[speed, trail_signal]`. The pheromone grid is a flat `f32` array of
//! shape `(rows, cols)`.

use crate::ant::Ant;
use serde::{Deserialize, Serialize};

/// Schema version written into recordings.
pub const SNAPSHOT_VERSION: &str = "0.4";

/// Number of ant channels in a frame.
pub const ANT_CHANNELS: usize = 3;

/// Ant channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Position = 0,
    Direction = 1,
    /// `[speed, trail_signal]`
    Motion = 2,
}

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Ticks completed when the frame was taken
    pub tick: u64,

    /// Simulated seconds elapsed
    pub time: f64,

    /// `[3, ant_count, 2]`
    pub ant_shape: [usize; 3],

    /// Row-major ant channels
    pub ants: Vec<f64>,

    /// `[rows, cols]`
    pub pheromone_shape: [usize; 2],

    /// Row-major pheromone concentrations
    pub pheromone: Vec<f32>,
}

impl FrameSnapshot {
    /// Number of ants in the frame.
    pub fn ant_count(&self) -> usize {
        self.ant_shape[1]
    }

    /// `[x, y]` pair of `channel` for the ant at `slot`.
    pub fn ant_value(&self, channel: Channel, slot: usize) -> Option<[f64; 2]> {
        let count = self.ant_count();
        if slot >= count {
            return None;
        }
        let base = (channel as usize).checked_mul(count)?.checked_add(slot)?.checked_mul(2)?;
        match self.ants.get(base..base.checked_add(2)?)? {
            &[x, y] => Some([x, y]),
            _ => None,
        }
    }

    /// Pheromone concentration at `(row, col)`.
    pub fn pheromone_at(&self, row: usize, col: usize) -> Option<f32> {
        let [rows, cols] = self.pheromone_shape;
        if row < rows && col < cols {
            self.pheromone.get(row.checked_mul(cols)?.checked_add(col)?).copied()
        } else {
            None
        }
    }
}

/// Packs ants into the `(3, n, 2)` channel layout.
pub fn pack_ants(ants: &[Ant]) -> Vec<f64> {
    let n = ants.len();
    let mut packed = vec![0.0; ANT_CHANNELS * n * 2];
    for (slot, ant) in ants.iter().enumerate() {
        let position = ant.position();
        let direction = ant.direction();
        let rows = [
            [position.x, position.y],
            [direction.x, direction.y],
            [ant.speed(), ant.last_signal()],
        ];
        for (channel, pair) in rows.iter().enumerate() {
            let base = (channel * n + slot) * 2;
            packed[base..base + 2].copy_from_slice(pair);
        }
    }
    packed
}

/// Static description of a world, stored once per recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMeta {
    pub version: String,
    pub world_dimensions: [f64; 2],
    pub world_delta_time: f64,
    pub phero_resolution: f64,
    pub ant_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;
    use crate::params::AntParams;
    use crate::rng::ant_rng;

    #[test]
    fn test_pack_ants_layout() {
        let ants: Vec<Ant> = [(1.0, 2.0), (3.0, 4.0)]
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| {
                Ant::new(id as u32, Vec2::new(x, y), Vec2::new(0.0, 1.0), AntParams::default(), ant_rng(0, id as u32))
                    .unwrap()
            })
            .collect();
        let frame = FrameSnapshot {
            tick: 0,
            time: 0.0,
            ant_shape: [ANT_CHANNELS, ants.len(), 2],
            ants: pack_ants(&ants),
            pheromone_shape: [1, 1],
            pheromone: vec![0.5],
        };

        assert_eq!(frame.ants.len(), 12);
        assert_eq!(frame.ant_value(Channel::Position, 1), Some([3.0, 4.0]));
        assert_eq!(frame.ant_value(Channel::Direction, 0), Some([0.0, 1.0]));
        assert_eq!(frame.ant_value(Channel::Motion, 0), Some([20.0, 0.0]));
        assert_eq!(frame.ant_value(Channel::Position, 2), None);
        assert_eq!(frame.pheromone_at(0, 0), Some(0.5));
        assert_eq!(frame.pheromone_at(1, 0), None);
    }

    #[test]
    fn test_short_frame_lookups_are_bounded() {
        let frame: FrameSnapshot = serde_json::from_str(
            r#"{"tick": 3, "time": 0.1, "ant_shape": [3, 4, 2], "ants": [1.0, 2.0, 3.0],
                "pheromone_shape": [2, 2], "pheromone": [0.5]}"#,
        )
        .unwrap();

        assert_eq!(frame.ant_value(Channel::Position, 0), Some([1.0, 2.0]));
        assert_eq!(frame.ant_value(Channel::Position, 1), None);
        assert_eq!(frame.ant_value(Channel::Motion, 3), None);
        assert_eq!(frame.pheromone_at(0, 0), Some(0.5));
        assert_eq!(frame.pheromone_at(1, 1), None);

        let huge = FrameSnapshot {
            ant_shape: [3, usize::MAX, 2],
            pheromone_shape: [usize::MAX, usize::MAX],
            ..frame
        };
        assert_eq!(huge.ant_value(Channel::Motion, 5), None);
        assert_eq!(huge.pheromone_at(7, 7), None);
    }
}
