//! Top-level migration orchestrator
//!
//! Owns the control and error flow of one run: gate, provision, restore,
//! verify. Gate and provisioning failures abort the run before any data
//! is touched; per-database tool failures and missing restore artifacts
//! are isolated so one bad database does not block the others. There is
//! no rollback of a partially provisioned target; operator intervention
//! is expected.

use crate::coordinator::Coordinator;
use crate::error::{MigrateError, MigrateResult};
use crate::gate;
use crate::state::{MigrationRun, RunPhase};
use crate::tools::PgTools;
use crate::verify;
use pgs_cloud::{derive_spec, InstanceDirectory, SpecOverrides};
use pgs_core::{ArtifactStore, Config, VerificationRecord};
use pgs_db::DbProbe;
use pgs_proc::CommandRunner;
use serde::Serialize;

/// Per-run options from the CLI
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip the final verification report
    pub skip_verify: bool,
}

/// One line of the run summary
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub outcome: String,
}

/// What a completed run produced
#[derive(Debug)]
pub struct RunSummary {
    pub run: MigrationRun,
    pub steps: Vec<StepReport>,
    pub records: Vec<VerificationRecord>,
    pub report: Option<String>,
}

/// Sequences one end-to-end migration run
pub struct Orchestrator<'a> {
    config: &'a Config,
    directory: &'a dyn InstanceDirectory,
    probe: &'a dyn DbProbe,
    runner: &'a dyn CommandRunner,
    store: &'a ArtifactStore,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a Config,
        directory: &'a dyn InstanceDirectory,
        probe: &'a dyn DbProbe,
        runner: &'a dyn CommandRunner,
        store: &'a ArtifactStore,
    ) -> Self {
        Self {
            config,
            directory,
            probe,
            runner,
            store,
        }
    }

    fn tools(&self) -> MigrateResult<PgTools> {
        Ok(PgTools::new(
            &self.config.admin_user,
            self.config.admin_password()?,
            self.config.port,
            self.config.tool_timeout(),
        ))
    }

    /// Run the full migration
    pub async fn execute(&self, options: &RunOptions) -> MigrateResult<RunSummary> {
        let config = self.config;
        let mut steps = Vec::new();

        // Resolve the source before anything else; a missing source is
        // fatal for every later step.
        let source = self.directory.describe(&config.source_instance).await?;
        let source_address = source.address()?.to_string();
        log::info!("Source '{}' at {source_address}", config.source_instance);

        let users: Vec<String> = config.users.keys().cloned().collect();
        let mut run = MigrationRun::new(source_address.clone(), &config.databases, &users);

        // Gate: abort before any mutation if a source database is live
        let busy = gate::unsafe_databases(self.probe, &source_address, &config.databases).await;
        if !busy.is_empty() {
            return Err(MigrateError::GateUnsafe {
                databases: busy.join(", "),
            });
        }
        run.advance(RunPhase::GateChecked);

        // Provision the target, or resolve an existing one
        let target_address = if self.directory.exists(&config.target_instance).await? {
            if !config.reuse_existing {
                return Err(MigrateError::ReuseDisallowed {
                    identifier: config.target_instance.clone(),
                });
            }
            log::info!("Reusing existing target '{}'", config.target_instance);
            let target = self.directory.describe(&config.target_instance).await?;
            target.address()?.to_string()
        } else {
            let overrides = SpecOverrides {
                identifier: config.target_instance.clone(),
                allocated_storage: config.allocated_storage,
                max_allocated_storage: config.max_allocated_storage,
                master_user_password: config.admin_password()?,
            };
            let spec = derive_spec(&source, &overrides);
            log::info!(
                "Creating '{}' ({} {} on {}, {} GiB)",
                spec.identifier,
                spec.engine,
                spec.engine_version,
                spec.instance_class,
                spec.allocated_storage
            );
            self.directory.create(&spec).await?;
            let target = self
                .directory
                .await_ready(&config.target_instance, config.provision_wait())
                .await?;
            target.address()?.to_string()
        };
        run.target_address = Some(target_address.clone());
        run.advance(RunPhase::Provisioned);

        // Local dump directory, per the configured policy
        self.store.prepare(config.dump_dir_policy)?;

        let tools = self.tools()?;
        let coordinator = Coordinator::new(self.runner, self.store, tools);

        // Globals first: databases depend on roles and tablespaces
        let outcome = coordinator.dump_globals(&source_address).await?;
        steps.push(StepReport {
            step: "dump globals".to_string(),
            outcome: outcome.to_string(),
        });
        match coordinator.restore_globals(&target_address).await {
            Ok(outcome) => steps.push(StepReport {
                step: "restore globals".to_string(),
                outcome: outcome.to_string(),
            }),
            Err(MigrateError::ArtifactMissing { path }) => {
                log::error!("Globals restore skipped, artifact missing: {path}");
                steps.push(StepReport {
                    step: "restore globals".to_string(),
                    outcome: "skipped (artifact missing)".to_string(),
                });
            }
            Err(e) => return Err(e),
        }
        run.advance(RunPhase::GlobalsRestored);

        // All dumps, then all restores
        for database in &config.databases {
            let outcome = coordinator.dump_database(&source_address, database).await?;
            if outcome.is_done() {
                run.mark_dumped(database);
            }
            steps.push(StepReport {
                step: format!("dump {database}"),
                outcome: outcome.to_string(),
            });
        }
        for database in &config.databases {
            match coordinator.restore_database(&target_address, database).await {
                Ok(outcome) => {
                    if outcome.is_done() {
                        run.mark_restored(database);
                    }
                    steps.push(StepReport {
                        step: format!("restore {database}"),
                        outcome: outcome.to_string(),
                    });
                }
                Err(MigrateError::ArtifactMissing { path }) => {
                    log::error!("Restore of '{database}' skipped, artifact missing: {path}");
                    steps.push(StepReport {
                        step: format!("restore {database}"),
                        outcome: "skipped (artifact missing)".to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        run.advance(RunPhase::DatabasesRestored);

        // Credentials last; one bad role does not block the rest
        for (role, password) in &config.users {
            match coordinator
                .restore_credentials(&target_address, role, password)
                .await
            {
                Ok(outcome) => {
                    if outcome.is_done() {
                        run.mark_credentialed(role);
                    }
                    steps.push(StepReport {
                        step: format!("credentials {role}"),
                        outcome: outcome.to_string(),
                    });
                }
                Err(MigrateError::InvalidRoleName { name }) => {
                    log::error!("Skipping credentials for invalid role name '{name}'");
                    steps.push(StepReport {
                        step: format!("credentials {role}"),
                        outcome: "skipped (invalid role name)".to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        run.advance(RunPhase::CredentialsRestored);

        let (records, report) = if options.skip_verify {
            (Vec::new(), None)
        } else {
            let records = verify::collect_records(
                self.probe,
                &source_address,
                &target_address,
                &config.databases,
            )
            .await;
            let report = verify::render_report(&records);
            (records, Some(report))
        };
        run.advance(RunPhase::Verified);

        run.advance(RunPhase::Done);
        log::info!("Migration done, target at {target_address}");

        Ok(RunSummary {
            run,
            steps,
            records,
            report,
        })
    }

    /// Collect the parity report without migrating anything.
    ///
    /// Both instances must already exist; all queries are read-only.
    pub async fn verify_only(&self) -> MigrateResult<Vec<VerificationRecord>> {
        let source = self.directory.describe(&self.config.source_instance).await?;
        let target = self.directory.describe(&self.config.target_instance).await?;
        Ok(verify::collect_records(
            self.probe,
            source.address()?,
            target.address()?,
            &self.config.databases,
        )
        .await)
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
