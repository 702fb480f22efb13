//! External process execution for pgshift
//!
//! Every dump, restore, credential, and control-plane step ultimately runs
//! an external command. This crate provides the one place that happens:
//! a [`CommandRunner`] trait seam and the [`TokioCommandRunner`] backend
//! that spawns the process, enforces a per-invocation deadline, captures
//! both output streams, and logs them.
//!
//! A non-zero exit is deliberately not an error here. The runner reports
//! it (warn-level log, `success == false`) and leaves the decision of
//! whether the step is fatal to the caller.

mod error;
mod runner;

pub use error::{ProcError, ProcResult};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, TokioCommandRunner};
