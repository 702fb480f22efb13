//! In-memory state of one migration run
//!
//! `MigrationRun` is created at run start, mutated monotonically (items
//! move from pending to done, the phase only advances), and discarded at
//! run end. It is never persisted: idempotence across runs comes from
//! dump artifact presence on disk, not from this state.

use chrono::{DateTime, Utc};

/// Phases of the orchestrator state machine, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    Start,
    GateChecked,
    Provisioned,
    GlobalsRestored,
    DatabasesRestored,
    CredentialsRestored,
    Verified,
    Done,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunPhase::Start => "start",
            RunPhase::GateChecked => "gate-checked",
            RunPhase::Provisioned => "provisioned",
            RunPhase::GlobalsRestored => "globals-restored",
            RunPhase::DatabasesRestored => "databases-restored",
            RunPhase::CredentialsRestored => "credentials-restored",
            RunPhase::Verified => "verified",
            RunPhase::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Orchestration state for one execution
#[derive(Debug, Clone)]
pub struct MigrationRun {
    phase: RunPhase,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Resolved network address of the source instance
    pub source_address: String,

    /// Resolved address of the target; set once provisioning completes
    pub target_address: Option<String>,

    /// Databases not yet dumped
    pub pending_dumps: Vec<String>,

    /// Databases not yet restored
    pub pending_restores: Vec<String>,

    /// Roles not yet re-credentialed
    pub pending_credentials: Vec<String>,
}

impl MigrationRun {
    /// Start a run against a resolved source address
    pub fn new(source_address: String, databases: &[String], users: &[String]) -> Self {
        Self {
            phase: RunPhase::Start,
            started_at: Utc::now(),
            source_address,
            target_address: None,
            pending_dumps: databases.to_vec(),
            pending_restores: databases.to_vec(),
            pending_credentials: users.to_vec(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Advance to `phase`. The phase never moves backwards; a stale
    /// advance is ignored.
    pub fn advance(&mut self, phase: RunPhase) {
        if phase > self.phase {
            log::debug!("run phase: {} -> {}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Record that `database` was dumped (or its dump was skipped as done)
    pub fn mark_dumped(&mut self, database: &str) {
        self.pending_dumps.retain(|d| d != database);
    }

    /// Record that `database` was restored on the target
    pub fn mark_restored(&mut self, database: &str) {
        self.pending_restores.retain(|d| d != database);
    }

    /// Record that `role`'s credentials were applied on the target
    pub fn mark_credentialed(&mut self, role: &str) {
        self.pending_credentials.retain(|r| r != role);
    }

    /// Whether every pending item has been worked off
    pub fn is_complete(&self) -> bool {
        self.pending_dumps.is_empty()
            && self.pending_restores.is_empty()
            && self.pending_credentials.is_empty()
    }
}
