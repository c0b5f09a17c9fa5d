//! JSON exporter for recorded runs.
//!
//! A recording is one metadata block followed by the frames taken every
//! `record_step` ticks.

use crate::error::SimError;
use formica_core::{FrameSnapshot, RecordingMeta};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Recording header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    /// Snapshot schema version
    pub version: String,

    /// Frames stored
    pub frame_count: usize,

    /// Ticks between frames
    pub record_step: usize,

    pub world_dimensions: [f64; 2],
    pub world_delta_time: f64,
    pub phero_resolution: f64,
    pub ant_count: usize,

    /// Master seed of the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl RecordingMetadata {
    /// Header for an empty recording of the described world.
    pub fn new(meta: RecordingMeta, record_step: usize) -> Self {
        Self {
            version: meta.version,
            frame_count: 0,
            record_step,
            world_dimensions: meta.world_dimensions,
            world_delta_time: meta.world_delta_time,
            phero_resolution: meta.phero_resolution,
            ant_count: meta.ant_count,
            seed: None,
        }
    }
}

/// Complete recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub metadata: RecordingMetadata,
    pub frames: Vec<FrameSnapshot>,
}

impl Recording {
    /// Creates an empty recording.
    pub fn new(meta: RecordingMeta, record_step: usize) -> Self {
        Self {
            metadata: RecordingMetadata::new(meta, record_step),
            frames: Vec::new(),
        }
    }

    /// Tags the recording with the run seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.metadata.seed = Some(seed);
        self
    }

    /// Appends a frame.
    pub fn add_frame(&mut self, frame: FrameSnapshot) {
        self.frames.push(frame);
        self.metadata.frame_count = self.frames.len();
    }

    /// Simulated time of the last frame.
    pub fn duration_secs(&self) -> f64 {
        self.frames.last().map_or(0.0, |f| f.time)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path).map_err(|e| SimError::io(path.display(), e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| SimError::io(path.display(), e))?;
        Ok(())
    }

    /// Reads a recording back from a JSON file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SimError::io(path.display(), e))?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn meta() -> RecordingMeta {
        RecordingMeta {
            version: "0.4".to_string(),
            world_dimensions: [10.0, 10.0],
            world_delta_time: 0.025,
            phero_resolution: 0.5,
            ant_count: 1,
        }
    }

    fn frame(tick: u64) -> FrameSnapshot {
        FrameSnapshot {
            tick,
            time: tick as f64 * 0.025,
            ant_shape: [3, 1, 2],
            ants: vec![0.0, 0.0, 1.0, 0.0, 20.0, 0.0],
            pheromone_shape: [5, 5],
            pheromone: vec![0.0; 25],
        }
    }

    #[test]
    fn test_frame_count_tracks_frames() {
        let mut rec = Recording::new(meta(), 2).with_seed(9);
        rec.add_frame(frame(0));
        rec.add_frame(frame(2));
        assert_eq!(rec.metadata.frame_count, 2);
        assert_eq!(rec.metadata.record_step, 2);
        assert_eq!(rec.metadata.seed, Some(9));
        assert_relative_eq!(rec.duration_secs(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_write_and_read_back() {
        let mut rec = Recording::new(meta(), 1);
        rec.add_frame(frame(1));

        let path = std::env::temp_dir().join(format!("formica_rec_{}.json", std::process::id()));
        rec.write_to_file(&path).unwrap();
        let back = Recording::read_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back, rec);
    }

    #[test]
    fn test_metadata_keys() {
        let rec = Recording::new(meta(), 3);
        let value = serde_json::to_value(&rec).unwrap();
        for key in [
            "version",
            "frame_count",
            "record_step",
            "world_dimensions",
            "world_delta_time",
            "phero_resolution",
            "ant_count",
        ] {
            assert!(value["metadata"].get(key).is_some(), "missing {key}");
        }
        assert!(value["metadata"].get("seed").is_none());
    }
}
