//! Instance directory trait and the CLI-backed implementation

use crate::descriptor::{DescribeResponse, InstanceDescriptor};
use crate::error::{CloudError, CloudResult};
use crate::spec::CreateInstanceSpec;
use async_trait::async_trait;
use pgs_proc::{CommandRunner, CommandSpec};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Error marker the provider CLI prints when an identifier is unknown
const NOT_FOUND_MARKER: &str = "DBInstanceNotFound";

/// Directory of managed database instances.
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait InstanceDirectory: Send + Sync {
    /// Look up one instance by identifier
    async fn describe(&self, identifier: &str) -> CloudResult<InstanceDescriptor>;

    /// Submit a creation request
    async fn create(&self, spec: &CreateInstanceSpec) -> CloudResult<()>;

    /// Block until the instance reports the available status, polling at
    /// a bounded interval. The single long-running suspension point of a
    /// migration run; exceeding `max_wait` is a fatal timeout.
    async fn await_ready(
        &self,
        identifier: &str,
        max_wait: Duration,
    ) -> CloudResult<InstanceDescriptor>;

    /// Whether an instance with this identifier exists.
    ///
    /// NotFound maps to `false`; any other failure propagates, since a
    /// transport error is not evidence of absence.
    async fn exists(&self, identifier: &str) -> CloudResult<bool> {
        match self.describe(identifier).await {
            Ok(_) => Ok(true),
            Err(CloudError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Directory backed by the provider's `aws rds` CLI, driven through a
/// [`CommandRunner`] and parsed with serde.
pub struct AwsCliDirectory<R: CommandRunner> {
    runner: R,
    region: Option<String>,
    poll_interval: Duration,
}

impl<R: CommandRunner> AwsCliDirectory<R> {
    pub fn new(runner: R, region: Option<String>, poll_interval: Duration) -> Self {
        Self {
            runner,
            region,
            poll_interval,
        }
    }

    fn base_command(&self, subcommand: &str) -> CommandSpec {
        let mut spec = CommandSpec::new("aws")
            .arg("rds")
            .arg(subcommand)
            .args(["--output", "json"]);
        if let Some(region) = &self.region {
            spec = spec.args(["--region", region.as_str()]);
        }
        spec
    }
}

/// Write a creation payload to a private temp file.
///
/// tempfile creates the file with owner-only permissions; it is removed
/// when the returned handle drops, after the CLI call completes.
fn stage_payload(payload: &str) -> CloudResult<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("pgshift-create-")
        .suffix(".json")
        .tempfile()?;
    file.write_all(payload.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[async_trait]
impl<R: CommandRunner> InstanceDirectory for AwsCliDirectory<R> {
    async fn describe(&self, identifier: &str) -> CloudResult<InstanceDescriptor> {
        let spec = self
            .base_command("describe-db-instances")
            .args(["--db-instance-identifier", identifier]);
        let output = self.runner.run(&spec).await?;

        if !output.success() {
            if output.stderr.contains(NOT_FOUND_MARKER) {
                return Err(CloudError::NotFound {
                    identifier: identifier.to_string(),
                });
            }
            return Err(CloudError::Tool {
                message: output.stderr.trim().to_string(),
            });
        }

        DescribeResponse::parse_single(&output.stdout, identifier)
    }

    async fn create(&self, spec: &CreateInstanceSpec) -> CloudResult<()> {
        let payload = serde_json::to_string(spec).map_err(|e| CloudError::Parse {
            message: e.to_string(),
        })?;
        // The payload carries the master password; argv only names the
        // staged file, so neither process listings nor runner logs see it
        let staged = stage_payload(&payload)?;
        let command = self
            .base_command("create-db-instance")
            .arg("--cli-input-json")
            .arg(format!("file://{}", staged.path().display()));
        let output = self.runner.run(&command).await?;

        if !output.success() {
            return Err(CloudError::Provisioning {
                identifier: spec.identifier.clone(),
                message: output.stderr.trim().to_string(),
            });
        }
        log::info!("Creation request accepted for '{}'", spec.identifier);
        Ok(())
    }

    async fn await_ready(
        &self,
        identifier: &str,
        max_wait: Duration,
    ) -> CloudResult<InstanceDescriptor> {
        let started = std::time::Instant::now();
        loop {
            let descriptor = self.describe(identifier).await?;
            if descriptor.is_available() {
                log::info!("Instance '{identifier}' is available");
                return Ok(descriptor);
            }
            if started.elapsed() >= max_wait {
                return Err(CloudError::ProvisioningTimeout {
                    identifier: identifier.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            log::info!(
                "Instance '{identifier}' is '{}', polling again in {}s",
                descriptor.status,
                self.poll_interval.as_secs()
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
