use super::*;
use async_trait::async_trait;
use pgs_cloud::descriptor::DescribeResponse;
use pgs_cloud::{CloudError, CloudResult, CreateInstanceSpec, InstanceDescriptor};
use pgs_core::artifact::DumpDirPolicy;
use pgs_db::{ProbeError, ProbeResult};
use pgs_proc::{CommandOutput, CommandSpec, ProcResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

type EventLog = Arc<Mutex<Vec<String>>>;

fn descriptor(identifier: &str, address: &str) -> InstanceDescriptor {
    let json = format!(
        r#"{{"DBInstances": [{{
            "DBInstanceIdentifier": "{identifier}",
            "DBInstanceStatus": "available",
            "Engine": "postgres",
            "EngineVersion": "11.11",
            "DBInstanceClass": "db.t3.medium",
            "MasterUsername": "admin",
            "AllocatedStorage": 20,
            "Endpoint": {{"Address": "{address}", "Port": 5432}}
        }}]}}"#
    );
    DescribeResponse::parse_single(&json, identifier).unwrap()
}

struct MockDirectory {
    events: EventLog,
    source_id: String,
    target_id: String,
    target_exists: bool,
}

#[async_trait]
impl InstanceDirectory for MockDirectory {
    async fn describe(&self, identifier: &str) -> CloudResult<InstanceDescriptor> {
        self.events
            .lock()
            .unwrap()
            .push(format!("describe:{identifier}"));
        if identifier == self.source_id {
            Ok(descriptor(identifier, "src.example.com"))
        } else if identifier == self.target_id && self.target_exists {
            Ok(descriptor(identifier, "dst.example.com"))
        } else {
            Err(CloudError::NotFound {
                identifier: identifier.to_string(),
            })
        }
    }

    async fn create(&self, spec: &CreateInstanceSpec) -> CloudResult<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("create:{}", spec.identifier));
        Ok(())
    }

    async fn await_ready(
        &self,
        identifier: &str,
        _max_wait: Duration,
    ) -> CloudResult<InstanceDescriptor> {
        self.events
            .lock()
            .unwrap()
            .push(format!("await_ready:{identifier}"));
        Ok(descriptor(identifier, "dst.example.com"))
    }
}

struct MockProbe {
    events: EventLog,
    active: HashMap<String, i64>,
    fail_activity: bool,
}

#[async_trait]
impl pgs_db::DbProbe for MockProbe {
    async fn active_connections(&self, host: &str, database: &str) -> ProbeResult<i64> {
        self.events
            .lock()
            .unwrap()
            .push(format!("activity:{host}:{database}"));
        if self.fail_activity {
            return Err(ProbeError::Connection {
                host: host.to_string(),
                database: database.to_string(),
                message: "refused".to_string(),
            });
        }
        Ok(*self.active.get(database).unwrap_or(&0))
    }

    async fn table_count(&self, host: &str, database: &str) -> ProbeResult<i64> {
        self.events
            .lock()
            .unwrap()
            .push(format!("tables:{host}:{database}"));
        Ok(12)
    }
}

/// Records invocations and emulates the dump tools' `-f <path>` side
/// effect so restore steps find their artifacts.
struct MockRunner {
    events: EventLog,
    fail: HashMap<String, i32>,
}

#[async_trait]
impl pgs_proc::CommandRunner for MockRunner {
    async fn run(&self, spec: &CommandSpec) -> ProcResult<CommandOutput> {
        self.events.lock().unwrap().push(format!("run:{}", spec.display()));
        if let Some(code) = self.fail.get(&spec.program) {
            return Ok(CommandOutput {
                exit_code: *code,
                stdout: String::new(),
                stderr: "tool error".to_string(),
            });
        }
        if let Some(pos) = spec.args.iter().position(|a| a == "-f") {
            if let Some(path) = spec.args.get(pos + 1) {
                if spec.program != "psql" {
                    std::fs::write(path, b"artifact").unwrap();
                }
            }
        }
        Ok(CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

struct Harness {
    events: EventLog,
    config: Config,
    directory: MockDirectory,
    probe: MockProbe,
    runner: MockRunner,
    store: ArtifactStore,
    _dir: tempfile::TempDir,
}

fn harness(target_exists: bool, reuse_existing: bool) -> Harness {
    let events: EventLog = Arc::new(Mutex::new(Vec::new()));
    let dir = tempdir().unwrap();
    let dump_dir = dir.path().join("dumps");

    let config = Config {
        source_instance: "prod-db".to_string(),
        target_instance: "prod-db-resized".to_string(),
        allocated_storage: 50,
        max_allocated_storage: None,
        admin_user: "admin".to_string(),
        admin_password: Some("hunter2".to_string()),
        databases: vec!["orders".to_string(), "inventory".to_string()],
        users: BTreeMap::from([("app_rw".to_string(), "s3cret".to_string())]),
        reuse_existing,
        dump_dir: dump_dir.display().to_string(),
        dump_dir_policy: DumpDirPolicy::Resume,
        region: None,
        port: 5432,
        tool_timeout_secs: 60,
        provision_wait_secs: 60,
        poll_interval_secs: 1,
    };

    Harness {
        config,
        directory: MockDirectory {
            events: Arc::clone(&events),
            source_id: "prod-db".to_string(),
            target_id: "prod-db-resized".to_string(),
            target_exists,
        },
        probe: MockProbe {
            events: Arc::clone(&events),
            active: HashMap::new(),
            fail_activity: false,
        },
        runner: MockRunner {
            events: Arc::clone(&events),
            fail: HashMap::new(),
        },
        store: ArtifactStore::new(dump_dir),
        events,
        _dir: dir,
    }
}

impl Harness {
    fn orchestrator(&self) -> Orchestrator<'_> {
        Orchestrator::new(
            &self.config,
            &self.directory,
            &self.probe,
            &self.runner,
            &self.store,
        )
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn position(&self, needle: &str) -> usize {
        self.events()
            .iter()
            .position(|e| e.contains(needle))
            .unwrap_or_else(|| panic!("no event containing '{needle}'"))
    }
}

#[tokio::test]
async fn test_happy_path_sequence() {
    let h = harness(false, false);
    let summary = h.orchestrator().execute(&RunOptions::default()).await.unwrap();

    assert_eq!(summary.run.phase(), RunPhase::Done);
    assert!(summary.run.is_complete());
    assert_eq!(
        summary.run.target_address.as_deref(),
        Some("dst.example.com")
    );
    assert!(summary.report.is_some());
    assert_eq!(summary.records.len(), 2);

    // Gate on both databases before anything is created
    assert!(h.position("activity:src.example.com:orders") < h.position("create:"));
    assert!(h.position("activity:src.example.com:inventory") < h.position("create:"));
    // Create, then await-ready with the same identifier, before any tool runs
    assert!(h.position("create:prod-db-resized") < h.position("await_ready:prod-db-resized"));
    assert!(h.position("await_ready:prod-db-resized") < h.position("run:pg_dumpall"));
    // Globals before databases, dumps before restores, restores in order
    assert!(h.position("run:pg_dumpall") < h.position("run:psql"));
    assert!(h.position("run:psql") < h.position("run:pg_dump "));
    let dump_orders = h.position("run:pg_dump -h src.example.com -p 5432 -U admin --no-password -F c");
    assert!(dump_orders < h.position("run:pg_restore"));
    assert!(h.position("orders.dump") < h.position("inventory.dump"));
    // Credentials after restores, two statements in order, target only
    let pw = h.position("ALTER ROLE \"app_rw\" WITH PASSWORD");
    let login = h.position("ALTER ROLE \"app_rw\" WITH LOGIN");
    assert!(h.position("run:pg_restore") < pw);
    assert!(pw < login);
    let events = h.events();
    assert!(events[pw].contains("-h dst.example.com"));
    assert!(events[login].contains("-h dst.example.com"));
    // Verification ran against both hosts
    assert!(h.position("tables:src.example.com:orders") > login);
    assert!(events.iter().any(|e| e == "tables:dst.example.com:inventory"));
}

#[tokio::test]
async fn test_gate_unsafe_aborts_before_any_mutation() {
    let mut h = harness(false, false);
    h.probe.active = HashMap::from([("orders".to_string(), 2)]);

    let err = h.orchestrator().execute(&RunOptions::default()).await.unwrap_err();
    assert!(matches!(err, MigrateError::GateUnsafe { .. }));
    assert!(err.to_string().contains("orders"));

    let events = h.events();
    assert!(!events.iter().any(|e| e.starts_with("create:")));
    assert!(!events.iter().any(|e| e.starts_with("run:")));
    assert!(!h.store.root().exists());
}

#[tokio::test]
async fn test_unreadable_activity_is_treated_as_unsafe() {
    let mut h = harness(false, false);
    h.probe.fail_activity = true;

    let err = h.orchestrator().execute(&RunOptions::default()).await.unwrap_err();
    assert!(matches!(err, MigrateError::GateUnsafe { .. }));
}

#[tokio::test]
async fn test_existing_target_without_reuse_aborts() {
    let h = harness(true, false);

    let err = h.orchestrator().execute(&RunOptions::default()).await.unwrap_err();
    assert!(matches!(err, MigrateError::ReuseDisallowed { .. }));

    let events = h.events();
    assert!(!events.iter().any(|e| e.starts_with("create:")));
    assert!(!events.iter().any(|e| e.starts_with("run:")));
    // No artifact files were created
    assert!(!h.store.root().exists());
}

#[tokio::test]
async fn test_existing_target_with_reuse_is_resolved() {
    let h = harness(true, true);
    let summary = h.orchestrator().execute(&RunOptions::default()).await.unwrap();

    assert_eq!(
        summary.run.target_address.as_deref(),
        Some("dst.example.com")
    );
    let events = h.events();
    assert!(!events.iter().any(|e| e.starts_with("create:")));
    assert!(!events.iter().any(|e| e.starts_with("await_ready:")));
    assert!(events.iter().any(|e| e.starts_with("run:pg_restore")));
}

#[tokio::test]
async fn test_skip_verify() {
    let h = harness(false, false);
    let summary = h
        .orchestrator()
        .execute(&RunOptions { skip_verify: true })
        .await
        .unwrap();

    assert!(summary.report.is_none());
    assert!(summary.records.is_empty());
    assert!(!h.events().iter().any(|e| e.starts_with("tables:")));
    assert_eq!(summary.run.phase(), RunPhase::Done);
}

#[tokio::test]
async fn test_existing_artifact_skips_dump_but_not_restore() {
    let h = harness(false, false);
    h.store.prepare(DumpDirPolicy::Resume).unwrap();
    std::fs::write(h.store.database_path("orders"), b"PGDMP").unwrap();

    let summary = h.orchestrator().execute(&RunOptions::default()).await.unwrap();

    let events = h.events();
    // No dump tool invocation names the orders artifact
    assert!(!events
        .iter()
        .any(|e| e.starts_with("run:pg_dump ") && e.contains("orders.dump")));
    // The restore tool still runs for it
    assert!(events
        .iter()
        .any(|e| e.starts_with("run:pg_restore") && e.contains("orders.dump")));
    let step = summary
        .steps
        .iter()
        .find(|s| s.step == "dump orders")
        .unwrap();
    assert_eq!(step.outcome, "skipped (artifact exists)");
}

#[tokio::test]
async fn test_failed_dump_leaves_database_pending() {
    let mut h = harness(false, false);
    h.runner.fail = HashMap::from([("pg_dump".to_string(), 1)]);

    let summary = h.orchestrator().execute(&RunOptions::default()).await.unwrap();

    // Failed dumps stay pending, as do the restores that depend on them
    assert!(!summary.run.is_complete());
    assert_eq!(summary.run.pending_dumps, vec!["orders", "inventory"]);
    assert_eq!(summary.run.pending_restores, vec!["orders", "inventory"]);
    assert!(summary.run.pending_credentials.is_empty());

    let dump = summary
        .steps
        .iter()
        .find(|s| s.step == "dump orders")
        .unwrap();
    assert_eq!(dump.outcome, "tool failed (exit 1)");
    let restore = summary
        .steps
        .iter()
        .find(|s| s.step == "restore orders")
        .unwrap();
    assert_eq!(restore.outcome, "skipped (artifact missing)");
}

#[tokio::test]
async fn test_verify_only_touches_no_tools() {
    let h = harness(true, true);
    let records = h.orchestrator().verify_only().await.unwrap();

    assert_eq!(records.len(), 2);
    let events = h.events();
    assert!(!events.iter().any(|e| e.starts_with("run:")));
    assert!(!events.iter().any(|e| e.starts_with("create:")));
    assert!(events.iter().any(|e| e == "tables:src.example.com:orders"));
    assert!(events.iter().any(|e| e == "tables:dst.example.com:orders"));
}

#[tokio::test]
async fn test_missing_source_is_fatal() {
    let mut h = harness(false, false);
    h.directory.source_id = "other".to_string();

    let err = h.orchestrator().execute(&RunOptions::default()).await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Cloud(CloudError::NotFound { .. })
    ));
}
