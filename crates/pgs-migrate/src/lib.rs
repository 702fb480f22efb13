//! Migration engine for pgshift
//!
//! Sequences one end-to-end resize/migration run: pre-flight activity
//! gate, provisioning of the target instance, globals and per-database
//! dump/restore, credential restoration, and the final parity report.
//! Everything here is driven through the trait seams of the lower crates
//! (`CommandRunner`, `InstanceDirectory`, `DbProbe`), so the whole engine
//! is unit testable with recording mocks.

pub mod coordinator;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod state;
pub mod tools;
pub mod verify;

pub use coordinator::{Coordinator, StepOutcome};
pub use error::{MigrateError, MigrateResult};
pub use orchestrator::{Orchestrator, RunOptions, RunSummary, StepReport};
pub use state::{MigrationRun, RunPhase};
