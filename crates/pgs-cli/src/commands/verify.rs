//! Verify command implementation

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::commands::common::{self, ExitCode};
use pgs_cloud::AwsCliDirectory;
use pgs_core::ArtifactStore;
use pgs_db::PgProbe;
use pgs_migrate::{verify, Orchestrator};
use pgs_proc::TokioCommandRunner;

/// Execute the verify command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let (config, root) = common::load_config(global)?;

    let admin_password = config
        .admin_password()
        .context("Failed to resolve the administrative password")?;

    let runner = TokioCommandRunner::new(config.tool_timeout());
    let directory = AwsCliDirectory::new(
        TokioCommandRunner::new(config.tool_timeout()),
        config.region.clone(),
        config.poll_interval(),
    );
    let probe = PgProbe::new(&config.admin_user, admin_password, config.port);
    let store = ArtifactStore::new(config.dump_dir_absolute(&root));

    let orchestrator = Orchestrator::new(&config, &directory, &probe, &runner, &store);
    let records = orchestrator.verify_only().await?;

    print!("{}", verify::render_report(&records));

    let mismatched = records.iter().filter(|r| !r.tables_match()).count();
    if mismatched > 0 {
        eprintln!("{mismatched} database(s) differ in table count");
        return Err(ExitCode(1).into());
    }
    Ok(())
}
