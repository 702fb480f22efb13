//! Dump/restore coordinator
//!
//! The five step kinds of a migration run, strictly ordered by the
//! orchestrator: dump globals, restore globals, dump each database,
//! restore each database, restore credentials. Each step is idempotent
//! with respect to artifact presence; the coordinator holds no progress
//! marker beyond the artifacts themselves.

use crate::error::{MigrateError, MigrateResult};
use crate::tools::{credential_statements, PgTools};
use pgs_core::ArtifactStore;
use pgs_proc::CommandRunner;
use std::path::Path;

/// How one step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step ran and its tool exited zero
    Completed,
    /// The artifact already existed; the dump was not re-run
    SkippedExisting,
    /// The tool exited non-zero; logged, run continues
    ToolFailed { exit_code: i32 },
}

impl StepOutcome {
    /// Whether the step left its artifact or effect in place
    pub fn is_done(&self) -> bool {
        matches!(self, StepOutcome::Completed | StepOutcome::SkippedExisting)
    }
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepOutcome::Completed => write!(f, "completed"),
            StepOutcome::SkippedExisting => write!(f, "skipped (artifact exists)"),
            StepOutcome::ToolFailed { exit_code } => write!(f, "tool failed (exit {exit_code})"),
        }
    }
}

/// Drives the external dump/restore/credential tools for one run
pub struct Coordinator<'a> {
    runner: &'a dyn CommandRunner,
    store: &'a ArtifactStore,
    tools: PgTools,
}

impl<'a> Coordinator<'a> {
    pub fn new(runner: &'a dyn CommandRunner, store: &'a ArtifactStore, tools: PgTools) -> Self {
        Self {
            runner,
            store,
            tools,
        }
    }

    /// Run a dump command, keeping the artifact marker truthful: a tool
    /// failure removes whatever partial file the tool left behind, so a
    /// later run does not mistake it for a completed dump.
    async fn run_dump(
        &self,
        spec: pgs_proc::CommandSpec,
        artifact: &Path,
    ) -> MigrateResult<StepOutcome> {
        let output = self.runner.run(&spec).await?;
        if output.success() {
            Ok(StepOutcome::Completed)
        } else {
            if artifact.exists() {
                if let Err(e) = std::fs::remove_file(artifact) {
                    log::warn!("Could not remove partial dump {}: {e}", artifact.display());
                }
            }
            Ok(StepOutcome::ToolFailed {
                exit_code: output.exit_code,
            })
        }
    }

    /// Dump cluster-wide roles and grants from the source instance
    pub async fn dump_globals(&self, source_host: &str) -> MigrateResult<StepOutcome> {
        let artifact = self.store.globals_path();
        if self.store.has_globals() {
            log::info!("Globals artifact exists, skipping dump");
            return Ok(StepOutcome::SkippedExisting);
        }
        log::info!("Dumping globals from {source_host}");
        let spec = self.tools.dump_globals(source_host, &artifact);
        self.run_dump(spec, &artifact).await
    }

    /// Apply the globals artifact to the target instance
    pub async fn restore_globals(&self, target_host: &str) -> MigrateResult<StepOutcome> {
        let artifact = self.store.globals_path();
        if !self.store.has_globals() {
            return Err(MigrateError::ArtifactMissing {
                path: artifact.display().to_string(),
            });
        }
        log::info!("Restoring globals to {target_host}");
        let spec = self.tools.restore_globals(target_host, &artifact);
        let output = self.runner.run(&spec).await?;
        if output.success() {
            Ok(StepOutcome::Completed)
        } else {
            Ok(StepOutcome::ToolFailed {
                exit_code: output.exit_code,
            })
        }
    }

    /// Dump one database from the source instance
    pub async fn dump_database(
        &self,
        source_host: &str,
        database: &str,
    ) -> MigrateResult<StepOutcome> {
        let artifact = self.store.database_path(database);
        if self.store.has_database(database) {
            log::info!("Artifact for '{database}' exists, skipping dump");
            return Ok(StepOutcome::SkippedExisting);
        }
        log::info!("Dumping '{database}' from {source_host}");
        let spec = self.tools.dump_database(source_host, database, &artifact);
        self.run_dump(spec, &artifact).await
    }

    /// Restore one database into the target instance, creating it
    pub async fn restore_database(
        &self,
        target_host: &str,
        database: &str,
    ) -> MigrateResult<StepOutcome> {
        let artifact = self.store.database_path(database);
        if !self.store.has_database(database) {
            return Err(MigrateError::ArtifactMissing {
                path: artifact.display().to_string(),
            });
        }
        log::info!("Restoring '{database}' to {target_host}");
        let spec = self.tools.restore_database(target_host, &artifact);
        let output = self.runner.run(&spec).await?;
        if output.success() {
            Ok(StepOutcome::Completed)
        } else {
            Ok(StepOutcome::ToolFailed {
                exit_code: output.exit_code,
            })
        }
    }

    /// Reset `role`'s password and re-enable its login on the target.
    ///
    /// Exactly two statements, in order; the login statement is not
    /// issued if the password reset fails.
    pub async fn restore_credentials(
        &self,
        target_host: &str,
        role: &str,
        password: &str,
    ) -> MigrateResult<StepOutcome> {
        let statements = credential_statements(role, password)?;
        log::info!("Restoring credentials for '{role}' on {target_host}");
        for sql in &statements {
            let spec = self.tools.statement(target_host, "postgres", sql);
            let output = self.runner.run(&spec).await?;
            if !output.success() {
                return Ok(StepOutcome::ToolFailed {
                    exit_code: output.exit_code,
                });
            }
        }
        Ok(StepOutcome::Completed)
    }
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
