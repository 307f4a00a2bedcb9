//! MongoDB integration.
//!
//! `models` holds the persisted documents, `repository` the collection
//! wrappers. The store is the source of truth everywhere; caches layered on
//! top are advisory.

pub mod models;
pub mod repository;

mod mongo;

pub use mongo::Database;
