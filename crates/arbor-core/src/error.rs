//! Error types shared by the registry, storage and topology assembly

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Arbor core operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A referenced device (or any device at all) does not exist
    #[error("{0}")]
    NotFound(String),
    /// Uniqueness violation at the storage boundary
    #[error("{0}")]
    Conflict(String),
    /// Malformed input rejected before reaching the registry
    #[error("{0}")]
    Validation(String),
    /// The uplink relation loops back on itself
    #[error("{0}")]
    CycleDetected(String),
    /// A downlink chain is deeper than the assembler allows
    #[error("{0}")]
    DepthExceeded(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse error classification preserved across layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    CycleDetected,
    DepthExceeded,
    Storage,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Validation(_) => ErrorKind::Validation,
            Self::CycleDetected(_) => ErrorKind::CycleDetected,
            Self::DepthExceeded(_) => ErrorKind::DepthExceeded,
            Self::Io(_) | Self::Serialization(_) => ErrorKind::Storage,
        }
    }
}
