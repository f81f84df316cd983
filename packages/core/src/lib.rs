//! PageGraph Core Query Layer
//!
//! This crate sits between a page renderer and an in-memory node store. It
//! answers node lookups and structured queries for one render context at a
//! time and records which nodes or connections each rendered page depended
//! on, so incremental rebuilds know what to invalidate.
//!
//! # Architecture
//!
//! - **Schema oracle**: single source of truth for which types exist and
//!   which concrete types stand behind an interface
//! - **Node store**: owns storage and query execution; the layer only
//!   delegates to it
//! - **Dependency sink**: receives dependency facts synchronously, never
//!   fails the read that produced them
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, type handles, query arguments, dependency records)
//! - [`schema`] - Schema oracle trait and in-memory registry
//! - [`db`] - Node store trait and in-memory store
//! - [`services`] - Type resolution, node access, dependency tracking and the `NodeModel` facade

pub mod db;
pub mod models;
pub mod schema;
pub mod services;

// Re-export commonly used types
pub use models::*;
pub use services::{NodeModel, NodeModelConfig, NodeModelError};
