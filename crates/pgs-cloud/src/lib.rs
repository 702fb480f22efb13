//! Instance directory client and provisioning planner for pgshift
//!
//! The control plane of the managed-database provider is treated as an
//! opaque directory of instances: look one up, create one, wait until it
//! is ready. The seam is the [`InstanceDirectory`] trait; the shipped
//! implementation drives the provider's CLI as a subprocess and parses
//! its JSON output into typed structs.

pub mod descriptor;
pub mod directory;
pub mod error;
pub mod plan;
pub mod spec;

pub use descriptor::InstanceDescriptor;
pub use directory::{AwsCliDirectory, InstanceDirectory};
pub use error::{CloudError, CloudResult};
pub use plan::{derive_spec, SpecOverrides};
pub use spec::CreateInstanceSpec;
