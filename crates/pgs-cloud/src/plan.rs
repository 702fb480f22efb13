//! Provisioning planner
//!
//! Derives the creation spec for the new instance from the master's
//! descriptor: operationally equivalent to the master except for
//! identity, capacity, and the administrative password, so resize
//! testing against the clone is representative.

use crate::descriptor::InstanceDescriptor;
use crate::spec::CreateInstanceSpec;

/// Configured values that replace master attributes in the derived spec
#[derive(Debug, Clone)]
pub struct SpecOverrides {
    /// Identifier of the instance to create
    pub identifier: String,
    /// Allocated storage in GiB
    pub allocated_storage: i64,
    /// Storage autoscaling ceiling in GiB
    pub max_allocated_storage: Option<i64>,
    /// Administrative password for the new instance
    pub master_user_password: String,
}

/// Derive a creation spec by copying the master descriptor and applying
/// the configured overrides.
pub fn derive_spec(master: &InstanceDescriptor, overrides: &SpecOverrides) -> CreateInstanceSpec {
    CreateInstanceSpec {
        identifier: overrides.identifier.clone(),
        db_name: master.db_name.clone(),
        engine: master.engine.clone(),
        engine_version: master.engine_version.clone(),
        instance_class: master.instance_class.clone(),
        master_username: master.master_username.clone(),
        master_user_password: overrides.master_user_password.clone(),
        allocated_storage: overrides.allocated_storage,
        max_allocated_storage: overrides.max_allocated_storage,
        security_group_ids: master.security_group_ids(),
        subnet_group_name: master.subnet_group.as_ref().map(|g| g.name.clone()),
        availability_zone: master.availability_zone.clone(),
        maintenance_window: master.maintenance_window.clone(),
        backup_retention_period: master.backup_retention_period,
        auto_minor_version_upgrade: master.auto_minor_version_upgrade,
        copy_tags_to_snapshot: master.copy_tags_to_snapshot,
        deletion_protection: master.deletion_protection,
        log_exports: master.log_exports.clone(),
    }
}
