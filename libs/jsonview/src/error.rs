//! Error types for the view engine

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// View compilation errors
///
/// Interpretation itself never fails: absent paths and failed transforms are data.
/// Only turning JSON into a pattern tree can be rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid pattern at {location}: {message}")]
    InvalidPattern { location: String, message: String },

    #[error("Unknown transform at {location}: '{name}'")]
    UnknownTransform { location: String, name: String },
}

impl Error {
    pub(crate) fn invalid(location: &str, message: impl Into<String>) -> Self {
        Error::InvalidPattern {
            location: location.to_string(),
            message: message.into(),
        }
    }
}
