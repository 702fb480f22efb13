//! Error types for pgs-db

use thiserror::Error;

/// Probe query errors
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Q001: Connection to the instance failed
    #[error("[Q001] Connection to {host}/{database} failed: {message}")]
    Connection {
        host: String,
        database: String,
        message: String,
    },

    /// Q002: The probe query failed
    #[error("[Q002] Query against {host}/{database} failed: {message}")]
    Query {
        host: String,
        database: String,
        message: String,
    },
}

/// Result type alias for ProbeError
pub type ProbeResult<T> = Result<T, ProbeError>;
