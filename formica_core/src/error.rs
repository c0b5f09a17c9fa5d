//! Error types for the formica core.

use thiserror::Error;

/// Errors raised by the geometry helpers.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// A vector with zero (or non-finite) length was used where a direction
    /// is required.
    #[error("Zero-length vector cannot be normalized or measured")]
    ZeroLength,
}

/// Errors raised when validating or parsing parameter sets.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    /// A field holds a value outside its allowed range.
    #[error("Invalid parameter `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    /// The payload could not be parsed (malformed, missing or unknown fields).
    #[error("Malformed parameters: {0}")]
    Malformed(String),
}

impl ParamError {
    /// Creates an invalid-field error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a malformed-payload error.
    pub fn malformed(msg: impl std::fmt::Display) -> Self {
        Self::Malformed(msg.to_string())
    }
}

impl From<serde_json::Error> for ParamError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err)
    }
}

/// Errors raised while building or populating a world.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error(transparent)]
    Param(#[from] ParamError),

    /// An ant was given a zero initial direction.
    #[error("Ant direction must be non-zero: {0}")]
    Direction(#[from] GeometryError),
}
