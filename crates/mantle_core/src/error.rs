//! # Error Types
//!
//! The core reports "not found" as `None`, never as an error.
//! What remains here are the few conditions a caller can actually act on.

use thiserror::Error;

use crate::ids::TypeTag;

/// Errors surfaced by the fallible corners of the core.
#[derive(Error, Debug)]
pub enum MantleError {
    /// Every identifier below the invalid sentinel is in use for this tag.
    #[error("identifiers exhausted for {tag}")]
    IdsExhausted {
        /// The tag whose table is full.
        tag: TypeTag,
    },

    /// Configuration could not be parsed or holds invalid values.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for MantleError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for fallible core operations.
pub type MantleResult<T> = Result<T, MantleError>;
