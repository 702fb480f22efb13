//! tokio-postgres probe backend

use crate::error::{ProbeError, ProbeResult};
use crate::traits::DbProbe;
use async_trait::async_trait;
use std::time::Duration;
use tokio_postgres::{Client, NoTls};

const ACTIVE_CONNECTIONS_QUERY: &str =
    "SELECT count(*) FROM pg_stat_activity WHERE datname = $1 AND state = 'active'";

const TABLE_COUNT_QUERY: &str = "SELECT count(*) FROM information_schema.tables \
     WHERE table_type = 'BASE TABLE' \
     AND table_schema NOT IN ('pg_catalog', 'information_schema')";

/// Probe backed by tokio-postgres
pub struct PgProbe {
    user: String,
    password: String,
    port: u16,
    connect_timeout: Duration,
}

impl PgProbe {
    pub fn new(user: impl Into<String>, password: impl Into<String>, port: u16) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            port,
            connect_timeout: Duration::from_secs(15),
        }
    }

    /// Open a connection scoped to one query sequence.
    ///
    /// The connection driver runs on its own task and ends when the
    /// returned client is dropped, so the connection closes on every
    /// path, including errors.
    async fn connect(&self, host: &str, database: &str) -> ProbeResult<Client> {
        let mut config = tokio_postgres::Config::new();
        config
            .host(host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(database)
            .connect_timeout(self.connect_timeout);

        let (client, connection) =
            config
                .connect(NoTls)
                .await
                .map_err(|e| ProbeError::Connection {
                    host: host.to_string(),
                    database: database.to_string(),
                    message: e.to_string(),
                })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::debug!("probe connection closed: {e}");
            }
        });

        Ok(client)
    }

    async fn query_count(
        &self,
        host: &str,
        database: &str,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> ProbeResult<i64> {
        let client = self.connect(host, database).await?;
        let row = client
            .query_one(query, params)
            .await
            .map_err(|e| ProbeError::Query {
                host: host.to_string(),
                database: database.to_string(),
                message: e.to_string(),
            })?;
        Ok(row.get(0))
    }
}

#[async_trait]
impl DbProbe for PgProbe {
    async fn active_connections(&self, host: &str, database: &str) -> ProbeResult<i64> {
        self.query_count(host, database, ACTIVE_CONNECTIONS_QUERY, &[&database])
            .await
    }

    async fn table_count(&self, host: &str, database: &str) -> ProbeResult<i64> {
        self.query_count(host, database, TABLE_COUNT_QUERY, &[])
            .await
    }
}
