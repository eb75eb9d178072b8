//! stepdeck-core library.
//!
//! Projects own test cases, test cases own ordered steps, and versions
//! snapshot a case with its steps at a point in time. The modules split
//! along those responsibilities:
//!
//! - [`ordering`]: pure position math for one sibling set
//! - [`coordinator`]: structural mutations (create, reorder, bulk delete,
//!   clone), each committed as a single store transaction
//! - [`version`]: append-only case snapshots and their retrieval
//! - [`db`]: SQLite store with pragmas, schema migrations, row adapters
//!
//! # Conventions
//!
//! - **Errors**: core operations return [`error::Error`]; the store-open
//!   path uses `anyhow::Result` with context.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Timestamps**: integer wall-clock microseconds (`*_at_us`).

pub mod clock;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod model;
pub mod ordering;
pub mod version;

pub use error::{Error, Result};
