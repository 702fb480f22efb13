//! Command implementations for the pgshift CLI

pub(crate) mod common;
pub mod run;
pub mod verify;
