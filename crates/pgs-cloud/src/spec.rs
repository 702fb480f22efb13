//! Creation request for a new managed instance

use serde::Serialize;

/// Parameters submitted to the control plane when creating an instance.
///
/// Built by [`derive_spec`](crate::plan::derive_spec) from a master
/// descriptor plus configured overrides. Encryption-at-rest and
/// monitoring-role fields are deliberately absent: faithfully copying
/// them requires companion parameters (KMS key, monitoring role ARN)
/// this tool does not manage, and a partial copy makes creation fail.
#[derive(Debug, Clone, Serialize)]
pub struct CreateInstanceSpec {
    #[serde(rename = "DBInstanceIdentifier")]
    pub identifier: String,

    #[serde(rename = "DBName", skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,

    #[serde(rename = "Engine")]
    pub engine: String,

    #[serde(rename = "EngineVersion")]
    pub engine_version: String,

    #[serde(rename = "DBInstanceClass")]
    pub instance_class: String,

    #[serde(rename = "MasterUsername")]
    pub master_username: String,

    #[serde(rename = "MasterUserPassword")]
    pub master_user_password: String,

    #[serde(rename = "AllocatedStorage")]
    pub allocated_storage: i64,

    #[serde(rename = "MaxAllocatedStorage", skip_serializing_if = "Option::is_none")]
    pub max_allocated_storage: Option<i64>,

    #[serde(rename = "VpcSecurityGroupIds", skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<String>,

    #[serde(rename = "DBSubnetGroupName", skip_serializing_if = "Option::is_none")]
    pub subnet_group_name: Option<String>,

    #[serde(rename = "AvailabilityZone", skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,

    #[serde(
        rename = "PreferredMaintenanceWindow",
        skip_serializing_if = "Option::is_none"
    )]
    pub maintenance_window: Option<String>,

    #[serde(
        rename = "BackupRetentionPeriod",
        skip_serializing_if = "Option::is_none"
    )]
    pub backup_retention_period: Option<i64>,

    #[serde(rename = "AutoMinorVersionUpgrade")]
    pub auto_minor_version_upgrade: bool,

    #[serde(rename = "CopyTagsToSnapshot")]
    pub copy_tags_to_snapshot: bool,

    #[serde(rename = "DeletionProtection")]
    pub deletion_protection: bool,

    #[serde(
        rename = "EnableCloudwatchLogsExports",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub log_exports: Vec<String>,
}
