use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while configuring or running a search.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller handed us something unusable: an empty keyword, empty
    /// reference values, or a custom sequence that does not cover the keyword.
    #[error("invalid search input: {0}")]
    InvalidArgument(String),

    /// The configured file path does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// A worker failed to open or read the target file.
    #[error("i/o failure during search: {0}")]
    Io(#[from] std::io::Error),

    /// Invariant violation inside the matcher or the pool. Seeing this is a
    /// bug in relscan, not in the caller's configuration.
    #[error("internal error: {0}")]
    Internal(String),
}
