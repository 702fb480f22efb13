//! Pre-flight activity gate
//!
//! Refuses a migration while any source database serves live connections.
//! This is a point-in-time check, not a lock: a database can become
//! active between the check and the dump. That race is accepted for an
//! operator-triggered, one-shot run.

use pgs_db::DbProbe;

/// Names of databases unsafe to migrate: any with a positive active
/// connection count, or whose count could not be obtained at all
/// (treated conservatively as in use).
pub async fn unsafe_databases(probe: &dyn DbProbe, host: &str, databases: &[String]) -> Vec<String> {
    let mut unsafe_dbs = Vec::new();
    for database in databases {
        match probe.active_connections(host, database).await {
            Ok(0) => {
                log::debug!("'{database}' has no active connections");
            }
            Ok(count) => {
                log::warn!("'{database}' has {count} active connections");
                unsafe_dbs.push(database.clone());
            }
            Err(e) => {
                log::warn!("Could not determine activity for '{database}': {e}");
                unsafe_dbs.push(database.clone());
            }
        }
    }
    unsafe_dbs
}

/// Whether it is unsafe to proceed with any of the named databases
pub async fn check_in_use(probe: &dyn DbProbe, host: &str, databases: &[String]) -> bool {
    !unsafe_databases(probe, host, databases).await.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pgs_db::{ProbeError, ProbeResult};
    use std::collections::HashMap;

    struct FixedProbe {
        counts: HashMap<String, i64>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl DbProbe for FixedProbe {
        async fn active_connections(&self, host: &str, database: &str) -> ProbeResult<i64> {
            if self.failing.iter().any(|d| d == database) {
                return Err(ProbeError::Connection {
                    host: host.to_string(),
                    database: database.to_string(),
                    message: "connection refused".to_string(),
                });
            }
            Ok(*self.counts.get(database).unwrap_or(&0))
        }

        async fn table_count(&self, _host: &str, _database: &str) -> ProbeResult<i64> {
            Ok(0)
        }
    }

    fn dbs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_idle_databases_are_safe() {
        let probe = FixedProbe {
            counts: HashMap::new(),
            failing: Vec::new(),
        };
        assert!(!check_in_use(&probe, "src", &dbs(&["orders", "inventory"])).await);
    }

    #[tokio::test]
    async fn test_active_database_is_unsafe() {
        let probe = FixedProbe {
            counts: HashMap::from([("orders".to_string(), 2)]),
            failing: Vec::new(),
        };
        let found = unsafe_databases(&probe, "src", &dbs(&["orders", "inventory"])).await;
        assert_eq!(found, vec!["orders"]);
        assert!(check_in_use(&probe, "src", &dbs(&["orders"])).await);
    }

    #[tokio::test]
    async fn test_unreadable_count_is_unsafe() {
        let probe = FixedProbe {
            counts: HashMap::new(),
            failing: vec!["inventory".to_string()],
        };
        let found = unsafe_databases(&probe, "src", &dbs(&["orders", "inventory"])).await;
        assert_eq!(found, vec!["inventory"]);
    }
}
