//! Error types for pgs-cloud

use thiserror::Error;

/// Instance directory errors
#[derive(Error, Debug)]
pub enum CloudError {
    /// C001: No instance with the given identifier exists
    #[error("[C001] Instance not found: {identifier}")]
    NotFound { identifier: String },

    /// C002: The creation request was rejected by the control plane
    #[error("[C002] Provisioning rejected for '{identifier}': {message}")]
    Provisioning { identifier: String, message: String },

    /// C003: The instance did not become available within the wait bound
    #[error("[C003] Instance '{identifier}' not available after {waited_secs}s")]
    ProvisioningTimeout { identifier: String, waited_secs: u64 },

    /// C004: The control-plane response could not be parsed
    #[error("[C004] Failed to parse control-plane response: {message}")]
    Parse { message: String },

    /// C005: The control-plane CLI failed for a reason other than NotFound
    #[error("[C005] Control-plane call failed: {message}")]
    Tool { message: String },

    /// C006: The creation request payload could not be staged on disk
    #[error("[C006] Failed to stage request payload: {0}")]
    Payload(#[from] std::io::Error),

    /// Process-level failure running the control-plane CLI
    #[error(transparent)]
    Proc(#[from] pgs_proc::ProcError),
}

/// Result type alias for CloudError
pub type CloudResult<T> = Result<T, CloudError>;
