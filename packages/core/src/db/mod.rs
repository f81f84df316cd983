//! Node Store Layer
//!
//! - [`NodeStore`] - the read interface the query layer delegates to
//! - [`MemoryNodeStore`] - in-memory implementation with its own filter
//!   and sort evaluation

mod filter;
mod memory_store;
mod node_store;

pub use memory_store::MemoryNodeStore;
pub use node_store::{NodePredicate, NodeStore, StoreQuery};
