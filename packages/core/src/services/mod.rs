//! Query Services
//!
//! - `NodeModel` - the query facade handed to each render context
//! - `type_resolver` - type reference to concrete node-backed type names
//! - `node_accessor` - id-or-node reference to node
//! - `DependencyTracker` - dependency recording, with its sinks
//!
//! Services sit between resolvers and the node store: they decide which
//! concrete types a query covers and what a render path depends on, and
//! leave lookups and query execution to the store.

pub mod config;
pub mod dependency_tracker;
pub mod error;
pub mod node_accessor;
pub mod node_model;
pub mod type_resolver;

pub use config::{NodeModelConfig, DEFAULT_NODE_INTERFACE};
pub use dependency_tracker::{
    BroadcastSink, DependencySink, DependencyTracker, MemorySink, TrackedNodes,
};
pub use error::{NodeModelError, Result};
pub use node_accessor::resolve_node;
pub use node_model::NodeModel;
pub use type_resolver::{concrete_types, resolve_concrete_types, resolve_type};
