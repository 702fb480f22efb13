//! Run command implementation

use anyhow::{Context, Result};
use chrono::Utc;
use std::time::Instant;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{self, CommandResults, ExitCode};
use pgs_cloud::AwsCliDirectory;
use pgs_core::{ArtifactStore, DumpDirPolicy};
use pgs_db::PgProbe;
use pgs_migrate::{Orchestrator, RunOptions, RunSummary};
use pgs_proc::TokioCommandRunner;

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let started = Instant::now();
    let (mut config, root) = common::load_config(global)?;
    if args.fresh {
        config.dump_dir_policy = DumpDirPolicy::Fresh;
    }

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

    if global.verbose {
        eprintln!(
            "[verbose] Migrating '{}' -> '{}' ({} databases)",
            config.source_instance,
            config.target_instance,
            config.databases.len()
        );
    }

    let orchestrator = Orchestrator::new(&config, &directory, &probe, &runner, &store);
    let options = RunOptions {
        skip_verify: args.skip_verify,
    };

    let summary = match orchestrator.execute(&options).await {
        Ok(summary) => summary,
        Err(e) => {
            if let Some(code) = common::refusal_exit_code(&e) {
                eprintln!("{e}");
                return Err(ExitCode(code).into());
            }
            return Err(e.into());
        }
    };

    report_summary(&summary, started.elapsed().as_secs_f64());

    let failure_count = failed_steps(&summary);
    let envelope = CommandResults {
        timestamp: Utc::now(),
        elapsed_secs: started.elapsed().as_secs_f64(),
        success_count: summary.steps.len() - failure_count,
        failure_count,
        results: summary.steps.clone(),
    };
    let results_path = store.root().join("run_results.json");
    common::write_json_results(&results_path, &envelope)?;
    if global.verbose {
        eprintln!("[verbose] Results written to {}", results_path.display());
    }

    if failure_count > 0 {
        eprintln!("{failure_count} step(s) failed; see {}", results_path.display());
        return Err(ExitCode(1).into());
    }
    Ok(())
}

fn failed_steps(summary: &RunSummary) -> usize {
    summary
        .steps
        .iter()
        .filter(|s| s.outcome.starts_with("tool failed") || s.outcome.starts_with("skipped (artifact missing"))
        .count()
}

fn report_summary(summary: &RunSummary, elapsed_secs: f64) {
    for step in &summary.steps {
        println!("  {}: {}", step.step, step.outcome);
    }
    println!();
    if let Some(target) = &summary.run.target_address {
        println!("Migration finished in {elapsed_secs:.1}s");
        println!("Target: {target}");
    }
    if let Some(report) = &summary.report {
        println!();
        println!("{report}");
        let mismatched = summary
            .records
            .iter()
            .filter(|r| !r.tables_match())
            .count();
        if mismatched > 0 {
            println!("{mismatched} database(s) differ in table count");
        }
    }
}
