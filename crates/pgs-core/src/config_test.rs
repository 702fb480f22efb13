use super::*;
use crate::artifact::DumpDirPolicy;

fn minimal_yaml() -> &'static str {
    r#"
source_instance: prod-db
target_instance: prod-db-resized
allocated_storage: 50
databases:
  - orders
"#
}

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str(minimal_yaml()).unwrap();
    assert_eq!(config.source_instance, "prod-db");
    assert_eq!(config.target_instance, "prod-db-resized");
    assert_eq!(config.allocated_storage, 50);
    assert_eq!(config.databases, vec!["orders"]);
    // Defaults
    assert_eq!(config.admin_user, "admin");
    assert_eq!(config.dump_dir, "dumps");
    assert_eq!(config.dump_dir_policy, DumpDirPolicy::Resume);
    assert_eq!(config.port, 5432);
    assert!(!config.reuse_existing);
    assert!(config.users.is_empty());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
source_instance: prod-db
target_instance: prod-db-resized
allocated_storage: 50
max_allocated_storage: 200
admin_user: postgres
admin_password: hunter2
databases:
  - orders
  - inventory
users:
  app_rw: s3cret
  reporting: r3port
reuse_existing: true
dump_dir: /var/tmp/pgshift
dump_dir_policy: fresh
region: us-west-2
port: 5433
tool_timeout_secs: 120
provision_wait_secs: 600
poll_interval_secs: 5
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.databases.len(), 2);
    assert_eq!(config.users.get("app_rw").map(String::as_str), Some("s3cret"));
    assert_eq!(config.max_allocated_storage, Some(200));
    assert_eq!(config.dump_dir_policy, DumpDirPolicy::Fresh);
    assert!(config.reuse_existing);
    assert_eq!(config.tool_timeout().as_secs(), 120);
    assert_eq!(config.provision_wait().as_secs(), 600);
    assert_eq!(config.poll_interval().as_secs(), 5);
}

#[test]
fn test_unknown_field_rejected() {
    let yaml = format!("{}\nnot_a_field: 1\n", minimal_yaml());
    let result: Result<Config, _> = serde_yaml::from_str(&yaml);
    assert!(result.is_err());
}

#[test]
fn test_validate_same_source_and_target() {
    let yaml = r#"
source_instance: prod-db
target_instance: prod-db
allocated_storage: 50
databases: [orders]
"#;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pgshift.yml");
    std::fs::write(&path, yaml).unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("must differ"));
}

#[test]
fn test_validate_empty_databases() {
    let yaml = r#"
source_instance: prod-db
target_instance: prod-db-resized
allocated_storage: 50
databases: []
"#;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pgshift.yml");
    std::fs::write(&path, yaml).unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("at least one database"));
}

#[test]
fn test_validate_max_storage_below_allocated() {
    let yaml = r#"
source_instance: prod-db
target_instance: prod-db-resized
allocated_storage: 50
max_allocated_storage: 20
databases: [orders]
"#;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pgshift.yml");
    std::fs::write(&path, yaml).unwrap();
    assert!(Config::load(&path).is_err());
}

#[test]
fn test_load_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pgshift.yml"), minimal_yaml()).unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.source_instance, "prod-db");
}

#[test]
fn test_load_from_dir_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_admin_password_from_config() {
    let mut config: Config = serde_yaml::from_str(minimal_yaml()).unwrap();
    config.admin_password = Some("hunter2".to_string());
    assert_eq!(config.admin_password().unwrap(), "hunter2");
}

#[test]
#[serial_test::serial]
fn test_admin_password_from_env() {
    let config: Config = serde_yaml::from_str(minimal_yaml()).unwrap();
    std::env::set_var(ADMIN_PASSWORD_ENV, "from-env");
    let resolved = config.admin_password();
    std::env::remove_var(ADMIN_PASSWORD_ENV);
    assert_eq!(resolved.unwrap(), "from-env");
}

#[test]
#[serial_test::serial]
fn test_admin_password_missing() {
    let config: Config = serde_yaml::from_str(minimal_yaml()).unwrap();
    std::env::remove_var(ADMIN_PASSWORD_ENV);
    std::env::remove_var(PGPASSWORD_ENV);
    let err = config.admin_password().unwrap_err();
    assert!(matches!(err, CoreError::MissingSecret { .. }));
}

#[test]
fn test_dump_dir_absolute() {
    let config: Config = serde_yaml::from_str(minimal_yaml()).unwrap();
    let root = std::path::PathBuf::from("/work");
    assert_eq!(config.dump_dir_absolute(&root), root.join("dumps"));

    let mut abs = config.clone();
    abs.dump_dir = "/var/tmp/pgshift".to_string();
    assert_eq!(
        abs.dump_dir_absolute(&root),
        std::path::PathBuf::from("/var/tmp/pgshift")
    );
}
