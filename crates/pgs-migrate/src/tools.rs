//! Postgres tool command builders
//!
//! Argument vectors for pg_dumpall, pg_dump, pg_restore, and psql. The
//! password always travels via `PGPASSWORD` in the invocation's
//! environment, never on the command line.

use crate::error::{MigrateError, MigrateResult};
use pgs_proc::CommandSpec;
use std::path::Path;
use std::time::Duration;

/// Connection parameters shared by every tool invocation
#[derive(Debug, Clone)]
pub struct PgTools {
    admin_user: String,
    admin_password: String,
    port: u16,
    timeout: Duration,
}

impl PgTools {
    pub fn new(
        admin_user: impl Into<String>,
        admin_password: impl Into<String>,
        port: u16,
        timeout: Duration,
    ) -> Self {
        Self {
            admin_user: admin_user.into(),
            admin_password: admin_password.into(),
            port,
            timeout,
        }
    }

    fn base(&self, program: &str, host: &str) -> CommandSpec {
        CommandSpec::new(program)
            .args(["-h", host])
            .args(["-p", &self.port.to_string()])
            .args(["-U", &self.admin_user])
            .arg("--no-password")
            .env("PGPASSWORD", &self.admin_password)
            .timeout(self.timeout)
    }

    /// Dump cluster-wide objects, excluding role passwords (they are
    /// restored separately and explicitly, never carried in the bulk dump)
    pub fn dump_globals(&self, host: &str, out: &Path) -> CommandSpec {
        self.base("pg_dumpall", host)
            .arg("--globals-only")
            .arg("--no-role-passwords")
            .args(["-f", &out.display().to_string()])
    }

    /// Apply a globals artifact to an instance
    pub fn restore_globals(&self, host: &str, artifact: &Path) -> CommandSpec {
        self.base("psql", host)
            .args(["-d", "postgres"])
            .args(["-f", &artifact.display().to_string()])
    }

    /// Dump one database as a custom-format archive
    pub fn dump_database(&self, host: &str, database: &str, out: &Path) -> CommandSpec {
        self.base("pg_dump", host)
            .args(["-F", "c"])
            .args(["-f", &out.display().to_string()])
            .arg(database)
    }

    /// Restore one database from its archive, creating the database
    pub fn restore_database(&self, host: &str, artifact: &Path) -> CommandSpec {
        self.base("pg_restore", host)
            .args(["-d", "postgres"])
            .arg("--create")
            .arg(artifact.display().to_string())
    }

    /// Execute one SQL statement against a named database
    pub fn statement(&self, host: &str, database: &str, sql: &str) -> CommandSpec {
        self.base("psql", host)
            .args(["-d", database])
            .args(["-c", sql])
    }
}

/// Validate a role name against a strict identifier grammar.
///
/// `ALTER ROLE` cannot take the role name as a bound parameter, so the
/// name is validated before it is ever formatted into a statement.
pub fn validate_role_name(name: &str) -> MigrateResult<()> {
    let mut chars = name.chars();
    let valid_first = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid_first && valid_rest {
        Ok(())
    } else {
        Err(MigrateError::InvalidRoleName {
            name: name.to_string(),
        })
    }
}

/// Quote a string as a SQL literal (single quotes doubled)
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// The two statements of a credential restore, in issue order: reset the
/// password, then explicitly re-enable login (a role's login privilege is
/// not guaranteed to survive the globals restore).
pub fn credential_statements(role: &str, password: &str) -> MigrateResult<[String; 2]> {
    validate_role_name(role)?;
    Ok([
        format!("ALTER ROLE \"{role}\" WITH PASSWORD {}", quote_literal(password)),
        format!("ALTER ROLE \"{role}\" WITH LOGIN"),
    ])
}
