//! Core library for pgshift
//!
//! Shared types used across the workspace: the migration configuration,
//! the dump artifact store, verification records, and the core error type.

pub mod artifact;
pub mod config;
pub mod error;
pub mod verification;

pub use artifact::{ArtifactStore, DumpDirPolicy};
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use verification::VerificationRecord;
