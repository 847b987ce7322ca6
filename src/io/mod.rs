//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - accepted-point CSV exports (`export`)
//! - best-fit mapping JSON read/write (`mapping`)
//! - SQLite copy of the input tables (`store`)

pub mod export;
pub mod ingest;
pub mod mapping;
pub mod store;

pub use export::*;
pub use ingest::*;
pub use mapping::*;
pub use store::*;
