//! Core types and trait definitions for the Selah scripture reader.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The API server, the SQLite store and the terminal client all depend on it.

// Native `async fn` in traits; the returned futures carry explicit `Send`
// bounds where the runtime needs them.
#![allow(async_fn_in_trait)]

pub mod commentary;
pub mod corpus;
pub mod error;
pub mod navigation;
pub mod protocol;
pub mod reader;
pub mod reference;
pub mod session;

pub use error::{Error, Result};
