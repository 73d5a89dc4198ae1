//! Persistence layer for the Stride server.
//!
//! sqlite-backed storage for the historical incident dataset the safety
//! scorer queries.

pub mod db;
pub mod incidents;

pub use db::{init_database, Database};
pub use incidents::SqliteIncidentStore;
