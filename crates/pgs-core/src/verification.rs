//! Post-migration verification records

use serde::Serialize;

/// Paired source/destination counts for one database.
///
/// Produced at the end of a run and reported for human review; never
/// persisted. `None` means the count could not be obtained.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationRecord {
    /// Database the counts refer to
    pub database: String,

    /// Active connections on the source instance
    pub source_connections: Option<i64>,

    /// Active connections on the destination instance
    pub target_connections: Option<i64>,

    /// Base tables on the source instance
    pub source_tables: Option<i64>,

    /// Base tables on the destination instance
    pub target_tables: Option<i64>,
}

impl VerificationRecord {
    /// Whether source and destination table counts match.
    ///
    /// Unobtainable counts never match; connection counts are expected to
    /// differ between a live source and an idle destination, so they are
    /// excluded here.
    pub fn tables_match(&self) -> bool {
        match (self.source_tables, self.target_tables) {
            (Some(s), Some(t)) => s == t,
            _ => false,
        }
    }
}
