//! Error types for wikilookup
//!
//! Defines the crate error type using thiserror for clear error propagation.
//! The enum derives `Clone` because a single fetch outcome is shared with
//! every caller coalesced onto the same in-flight request.

use thiserror::Error;

/// Main error type for the wikilookup crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Upstream explicitly reports the requested title does not exist
    #[error("Page not found: {0}")]
    MissingPage(String),

    /// Transport failure, malformed response body, or missing expected
    /// response substructure
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A node references a source name that cannot be resolved
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// Scanner given an empty or non-existent container
    #[error("Construction error: {0}")]
    Construction(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Referenced node is not part of the scanned set
    #[error("Node not found: {0}")]
    NodeNotFound(usize),
}

/// Convenience Result type using the wikilookup Error
pub type Result<T> = std::result::Result<T, Error>;
