//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pgs_core::Config;
use pgs_migrate::MigrateError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Exit code when the run is refused because a source database is in use
pub(crate) const EXIT_GATE_UNSAFE: i32 = 2;

/// Exit code when the run is refused because the target instance already
/// exists and reuse is not configured
pub(crate) const EXIT_TARGET_EXISTS: i32 = 3;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error. If anyhow's Display chain ever reaches this
        // (e.g. downcast_ref fails in main.rs), we don't want "exit code N"
        // leaking into stderr.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the migration config using the global CLI arguments.
///
/// Returns the config and the project root the dump directory resolves
/// against.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<(Config, PathBuf)> {
    let root = PathBuf::from(&global.project_dir);
    let mut config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load configuration")?;
    if let Some(dump_dir) = &global.dump_dir {
        config.dump_dir = dump_dir.clone();
    }
    Ok((config, root))
}

/// Map refusal errors to their dedicated exit codes
pub(crate) fn refusal_exit_code(err: &MigrateError) -> Option<i32> {
    match err {
        MigrateError::GateUnsafe { .. } => Some(EXIT_GATE_UNSAFE),
        MigrateError::ReuseDisallowed { .. } => Some(EXIT_TARGET_EXISTS),
        _ => None,
    }
}

/// Generic wrapper for command results written to JSON.
///
/// Both subcommands produce a JSON file with the same envelope: a
/// timestamp, elapsed seconds, success/failure counts, and a vec of
/// per-item results. `CommandResults<T>` captures that pattern so each
/// command only needs to define its per-item result type.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CommandResults<T: Serialize> {
    pub timestamp: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<T>,
}

/// Serialize `data` as pretty-printed JSON and write it to `path`.
///
/// Creates any missing parent directories before writing.
pub(crate) fn write_json_results<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create results directory")?;
    }
    let json = serde_json::to_string_pretty(data).context("Failed to serialize results")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
