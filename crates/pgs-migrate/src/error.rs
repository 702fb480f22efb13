//! Error types for pgs-migrate

use thiserror::Error;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// M001: A source database is active (or its activity is unknown),
    /// fatal before any mutation
    #[error("[M001] Source databases in use or unreadable: {databases}")]
    GateUnsafe { databases: String },

    /// M002: The target instance already exists and reuse is disallowed
    #[error("[M002] Target instance '{identifier}' already exists and reuse_existing is false")]
    ReuseDisallowed { identifier: String },

    /// M003: A restore step's required dump artifact is absent;
    /// recoverable, the step is skipped and the run continues
    #[error("[M003] Dump artifact missing: {path}")]
    ArtifactMissing { path: String },

    /// M004: A configured role name fails the identifier grammar
    #[error("[M004] Invalid role name: '{name}'")]
    InvalidRoleName { name: String },

    /// Instance directory failure
    #[error(transparent)]
    Cloud(#[from] pgs_cloud::CloudError),

    /// External process failure
    #[error(transparent)]
    Proc(#[from] pgs_proc::ProcError),

    /// Configuration or artifact-store failure
    #[error(transparent)]
    Core(#[from] pgs_core::CoreError),
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
