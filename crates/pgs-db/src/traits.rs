//! Probe trait definition

use crate::error::ProbeResult;
use async_trait::async_trait;

/// Read-only counts against a named database on a named host.
///
/// Implementations must be Send + Sync for async operation. Every call
/// opens its own connection, runs one bounded query, and closes the
/// connection on all paths; no handles are held across calls.
#[async_trait]
pub trait DbProbe: Send + Sync {
    /// Number of server-side connections in the active state for `database`
    async fn active_connections(&self, host: &str, database: &str) -> ProbeResult<i64>;

    /// Number of user-schema base tables in `database`
    async fn table_count(&self, host: &str, database: &str) -> ProbeResult<i64>;
}
