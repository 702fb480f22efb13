//! Typed snapshot of a managed database instance
//!
//! Field names carry explicit serde renames matching the control plane's
//! JSON. A descriptor is owned transiently by whichever component just
//! queried the directory; it is never cached, because it goes stale the
//! moment a new instance is created.

use crate::error::{CloudError, CloudResult};
use serde::Deserialize;

/// Status string the control plane reports once an instance is reachable
pub const STATUS_AVAILABLE: &str = "available";

/// Network endpoint of a ready instance
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "Address")]
    pub address: String,

    #[serde(rename = "Port", default)]
    pub port: Option<u16>,
}

/// Security group membership as the control plane reports it
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityGroupMembership {
    #[serde(rename = "VpcSecurityGroupId")]
    pub id: String,

    #[serde(rename = "Status", default)]
    pub status: Option<String>,
}

/// Subnet group attachment
#[derive(Debug, Clone, Deserialize)]
pub struct SubnetGroup {
    #[serde(rename = "DBSubnetGroupName")]
    pub name: String,
}

/// One managed database instance
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceDescriptor {
    #[serde(rename = "DBInstanceIdentifier")]
    pub identifier: String,

    #[serde(rename = "DBInstanceStatus")]
    pub status: String,

    #[serde(rename = "DBName", default)]
    pub db_name: Option<String>,

    #[serde(rename = "Engine")]
    pub engine: String,

    #[serde(rename = "EngineVersion")]
    pub engine_version: String,

    #[serde(rename = "DBInstanceClass")]
    pub instance_class: String,

    #[serde(rename = "MasterUsername")]
    pub master_username: String,

    #[serde(rename = "AllocatedStorage")]
    pub allocated_storage: i64,

    /// Absent until the instance is ready
    #[serde(rename = "Endpoint", default)]
    pub endpoint: Option<Endpoint>,

    #[serde(rename = "VpcSecurityGroups", default)]
    pub security_groups: Vec<SecurityGroupMembership>,

    #[serde(rename = "DBSubnetGroup", default)]
    pub subnet_group: Option<SubnetGroup>,

    #[serde(rename = "AvailabilityZone", default)]
    pub availability_zone: Option<String>,

    #[serde(rename = "PreferredMaintenanceWindow", default)]
    pub maintenance_window: Option<String>,

    #[serde(rename = "PreferredBackupWindow", default)]
    pub backup_window: Option<String>,

    #[serde(rename = "BackupRetentionPeriod", default)]
    pub backup_retention_period: Option<i64>,

    #[serde(rename = "AutoMinorVersionUpgrade", default)]
    pub auto_minor_version_upgrade: bool,

    #[serde(rename = "CopyTagsToSnapshot", default)]
    pub copy_tags_to_snapshot: bool,

    #[serde(rename = "DeletionProtection", default)]
    pub deletion_protection: bool,

    #[serde(rename = "StorageEncrypted", default)]
    pub storage_encrypted: bool,

    #[serde(rename = "EnabledCloudwatchLogsExports", default)]
    pub log_exports: Vec<String>,
}

impl InstanceDescriptor {
    /// Whether the instance reports the available status
    pub fn is_available(&self) -> bool {
        self.status == STATUS_AVAILABLE
    }

    /// Network address of the instance.
    ///
    /// Fails while the instance is still provisioning and has no endpoint.
    pub fn address(&self) -> CloudResult<&str> {
        self.endpoint
            .as_ref()
            .map(|e| e.address.as_str())
            .ok_or_else(|| CloudError::Parse {
                message: format!("instance '{}' has no endpoint yet", self.identifier),
            })
    }

    /// Security group identifiers, flattened from the membership objects
    pub fn security_group_ids(&self) -> Vec<String> {
        self.security_groups.iter().map(|g| g.id.clone()).collect()
    }
}

/// Envelope of a describe-instances response
#[derive(Debug, Deserialize)]
pub struct DescribeResponse {
    #[serde(rename = "DBInstances", default)]
    pub instances: Vec<InstanceDescriptor>,
}

impl DescribeResponse {
    /// Parse a describe response and take its single instance
    pub fn parse_single(json: &str, identifier: &str) -> CloudResult<InstanceDescriptor> {
        let response: DescribeResponse =
            serde_json::from_str(json).map_err(|e| CloudError::Parse {
                message: e.to_string(),
            })?;
        response
            .instances
            .into_iter()
            .next()
            .ok_or_else(|| CloudError::NotFound {
                identifier: identifier.to_string(),
            })
    }
}
