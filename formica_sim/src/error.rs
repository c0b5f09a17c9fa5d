//! Error types for the simulation driver.

use formica_core::{ParamError, WorldError};
use thiserror::Error;

/// Errors that can occur while configuring, running or recording a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Config or export file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A parameter set was rejected
    #[error(transparent)]
    Params(#[from] ParamError),

    /// The world could not be populated
    #[error(transparent)]
    World(#[from] WorldError),

    /// Recording arguments are out of range
    #[error("Invalid recording request: {0}")]
    Recording(String),

    /// Unknown scenario name
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
}

impl SimError {
    /// Creates an I/O error tagged with the offending path.
    pub fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }

    /// Creates a recording error.
    pub fn recording(msg: impl Into<String>) -> Self {
        Self::Recording(msg.into())
    }
}
