//! Dump artifact store
//!
//! One file per completed dump: `{dump_dir}/globals.sql` for cluster-wide
//! objects and `{dump_dir}/{database}.dump` per database. Presence of a
//! file is the durable marker that the corresponding dump already
//! succeeded; the coordinator skips re-dumping when the artifact exists.

use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the globals artifact
pub const GLOBALS_FILE: &str = "globals.sql";

/// Extension of per-database artifacts (custom-format pg_dump archives)
pub const DUMP_EXTENSION: &str = "dump";

/// What to do with a dump directory left over from a prior run.
///
/// `Resume` keeps existing artifacts so completed dumps are skipped on
/// replay. `Fresh` wipes the directory before the first dump, trading
/// replay for a guarantee that no stale dump is restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DumpDirPolicy {
    /// Keep existing artifacts and skip the dumps they mark as done
    #[default]
    Resume,
    /// Clear the directory and dump everything again
    Fresh,
}

impl std::fmt::Display for DumpDirPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DumpDirPolicy::Resume => write!(f, "resume"),
            DumpDirPolicy::Fresh => write!(f, "fresh"),
        }
    }
}

/// Filesystem layout of the local dump directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root`. No filesystem access happens here;
    /// call [`prepare`](Self::prepare) before the first dump.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The dump directory itself
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the globals artifact
    pub fn globals_path(&self) -> PathBuf {
        self.root.join(GLOBALS_FILE)
    }

    /// Path of the artifact for one database
    pub fn database_path(&self, database: &str) -> PathBuf {
        self.root.join(format!("{database}.{DUMP_EXTENSION}"))
    }

    /// Whether the globals dump already succeeded
    pub fn has_globals(&self) -> bool {
        self.globals_path().is_file()
    }

    /// Whether the dump for `database` already succeeded
    pub fn has_database(&self, database: &str) -> bool {
        self.database_path(database).is_file()
    }

    /// Prepare the directory for a run according to `policy`.
    ///
    /// `Fresh` removes any existing directory first; both policies ensure
    /// the directory exists afterwards.
    pub fn prepare(&self, policy: DumpDirPolicy) -> CoreResult<()> {
        if policy == DumpDirPolicy::Fresh && self.root.exists() {
            log::info!("Clearing dump directory {}", self.root.display());
            std::fs::remove_dir_all(&self.root)?;
        }
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_artifact_paths() {
        let store = ArtifactStore::new("/data/dumps");
        assert_eq!(
            store.globals_path(),
            PathBuf::from("/data/dumps/globals.sql")
        );
        assert_eq!(
            store.database_path("orders"),
            PathBuf::from("/data/dumps/orders.dump")
        );
    }

    #[test]
    fn test_presence_checks() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(!store.has_globals());
        assert!(!store.has_database("orders"));

        std::fs::write(store.globals_path(), "-- roles").unwrap();
        std::fs::write(store.database_path("orders"), b"PGDMP").unwrap();
        assert!(store.has_globals());
        assert!(store.has_database("orders"));
        assert!(!store.has_database("inventory"));
    }

    #[test]
    fn test_prepare_resume_keeps_artifacts() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("dumps"));
        store.prepare(DumpDirPolicy::Resume).unwrap();
        std::fs::write(store.database_path("orders"), b"PGDMP").unwrap();

        store.prepare(DumpDirPolicy::Resume).unwrap();
        assert!(store.has_database("orders"));
    }

    #[test]
    fn test_prepare_fresh_clears_artifacts() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("dumps"));
        store.prepare(DumpDirPolicy::Resume).unwrap();
        std::fs::write(store.database_path("orders"), b"PGDMP").unwrap();

        store.prepare(DumpDirPolicy::Fresh).unwrap();
        assert!(store.root().exists());
        assert!(!store.has_database("orders"));
    }

    #[test]
    fn test_prepare_fresh_on_missing_dir() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("never-created"));
        store.prepare(DumpDirPolicy::Fresh).unwrap();
        assert!(store.root().exists());
    }
}
