//! Error types for pgs-proc

use thiserror::Error;

/// Process execution errors
#[derive(Error, Debug)]
pub enum ProcError {
    /// P001: The command could not be spawned at all
    #[error("[P001] Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// P002: The command exceeded its deadline and was killed
    #[error("[P002] '{program}' exceeded its {timeout_secs}s deadline and was killed")]
    Timeout { program: String, timeout_secs: u64 },
}

/// Result type alias for ProcError
pub type ProcResult<T> = Result<T, ProcError>;
