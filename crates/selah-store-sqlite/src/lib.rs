//! SQLite backend for the reader's local state.
//!
//! Holds the commentary cache and the reading session in one key-value table.
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
