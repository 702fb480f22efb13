//! Configuration types and parsing for pgshift.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted when `admin_password` is absent from the config
pub const ADMIN_PASSWORD_ENV: &str = "PGSHIFT_ADMIN_PASSWORD";

/// Fallback environment variable, matching the convention of the Postgres tools
pub const PGPASSWORD_ENV: &str = "PGPASSWORD";

/// Main migration configuration from pgshift.yml
///
/// Created once at startup and never mutated; every component receives it
/// by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Identifier of the running master instance to migrate from
    pub source_instance: String,

    /// Identifier of the instance to create (or reuse) as the destination
    pub target_instance: String,

    /// Allocated storage for the new instance, in GiB
    pub allocated_storage: i64,

    /// Storage autoscaling ceiling for the new instance, in GiB
    #[serde(default)]
    pub max_allocated_storage: Option<i64>,

    /// Administrative role used for dumps, restores, and probe queries
    #[serde(default = "default_admin_user")]
    pub admin_user: String,

    /// Administrative password. When omitted, resolved from
    /// `PGSHIFT_ADMIN_PASSWORD` or `PGPASSWORD` at load time.
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Databases to migrate, in order
    pub databases: Vec<String>,

    /// Role passwords to restore on the new instance after the globals
    /// restore (role name -> password)
    #[serde(default)]
    pub users: BTreeMap<String, String>,

    /// Proceed against an already-existing target instance instead of
    /// aborting
    #[serde(default)]
    pub reuse_existing: bool,

    /// Local directory holding dump artifacts
    #[serde(default = "default_dump_dir")]
    pub dump_dir: String,

    /// What to do with a dump directory left over from a prior run
    #[serde(default)]
    pub dump_dir_policy: crate::artifact::DumpDirPolicy,

    /// Cloud region passed to the control-plane CLI
    #[serde(default)]
    pub region: Option<String>,

    /// Postgres port on both instances
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline for each external tool invocation, in seconds
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Maximum time to wait for the new instance to become available,
    /// in seconds
    #[serde(default = "default_provision_wait_secs")]
    pub provision_wait_secs: u64,

    /// Interval between readiness polls, in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_admin_user() -> String {
    "admin".to_string()
}

fn default_dump_dir() -> String {
    "dumps".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_tool_timeout_secs() -> u64 {
    3600
}

fn default_provision_wait_secs() -> u64 {
    1800
}

fn default_poll_interval_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for pgshift.yml or pgshift.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("pgshift.yml");
        let yaml_path = dir.join("pgshift.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.source_instance.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "source_instance cannot be empty".to_string(),
            });
        }
        if self.target_instance.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "target_instance cannot be empty".to_string(),
            });
        }
        if self.source_instance == self.target_instance {
            return Err(CoreError::ConfigInvalid {
                message: "source_instance and target_instance must differ".to_string(),
            });
        }
        if self.databases.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "at least one database must be listed".to_string(),
            });
        }
        if self.allocated_storage <= 0 {
            return Err(CoreError::ConfigInvalid {
                message: "allocated_storage must be positive".to_string(),
            });
        }
        if let Some(max) = self.max_allocated_storage {
            if max < self.allocated_storage {
                return Err(CoreError::ConfigInvalid {
                    message: "max_allocated_storage must be >= allocated_storage".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Resolve the administrative password.
    ///
    /// Precedence: config field, then `PGSHIFT_ADMIN_PASSWORD`, then
    /// `PGPASSWORD` (the convention the Postgres tools already use).
    pub fn admin_password(&self) -> CoreResult<String> {
        if let Some(pw) = &self.admin_password {
            return Ok(pw.clone());
        }
        std::env::var(ADMIN_PASSWORD_ENV)
            .or_else(|_| std::env::var(PGPASSWORD_ENV))
            .map_err(|_| CoreError::MissingSecret {
                field: "admin_password".to_string(),
                env_var: ADMIN_PASSWORD_ENV.to_string(),
            })
    }

    /// Get the absolute dump directory relative to a root directory
    pub fn dump_dir_absolute(&self, root: &Path) -> PathBuf {
        let dir = Path::new(&self.dump_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            root.join(dir)
        }
    }

    /// Per-invocation deadline for external tools
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Maximum readiness wait after instance creation
    pub fn provision_wait(&self) -> Duration {
        Duration::from_secs(self.provision_wait_secs)
    }

    /// Interval between readiness polls
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
