//! Relational probe for pgshift
//!
//! Read-only queries against a named database on a named host: the active
//! connection count feeding the pre-flight activity gate, and the base
//! table count feeding the post-migration verification report. The seam
//! is the [`DbProbe`] trait; [`PgProbe`] is the tokio-postgres backend.

mod error;
mod postgres;
mod traits;

pub use error::{ProbeError, ProbeResult};
pub use postgres::PgProbe;
pub use traits::DbProbe;
