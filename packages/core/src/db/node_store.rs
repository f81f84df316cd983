//! NodeStore Trait - Node Store Abstraction
//!
//! The query layer delegates every lookup, listing and query execution to a
//! `NodeStore`. It never touches storage, indexes or the filter engine
//! itself.
//!
//! # Design Decisions
//!
//! 1. **Only query execution is async**: lookups against an in-memory store
//!    complete synchronously; `run_query` may suspend while the engine works
//! 2. **Error Handling**: Uses `anyhow::Result`; the query layer passes store
//!    errors through untouched
//! 3. **Concurrent reads**: implementations must be `Send + Sync` so several
//!    facades can share one store
//!
//! # Examples
//!
//! ```rust
//! use pagegraph_core::db::{MemoryNodeStore, NodeStore};
//! use pagegraph_core::models::Node;
//!
//! # fn example() -> anyhow::Result<()> {
//! let store = MemoryNodeStore::new();
//! store.add_node(Node::new("a", "Post"));
//!
//! assert_eq!(store.get_node("a")?.map(|n| n.id), Some("a".to_string()));
//! assert_eq!(store.get_types()?, vec!["Post".to_string()]);
//! # Ok(())
//! # }
//! ```

use crate::models::{Node, QueryDefinition, TypeHandle};
use anyhow::Result;
use async_trait::async_trait;

/// Predicate used while walking up the parent chain
pub type NodePredicate = dyn Fn(&Node) -> bool + Send + Sync;

/// Query request handed to [`NodeStore::run_query`]
#[derive(Debug, Clone)]
pub struct StoreQuery {
    /// Filter and sort, forwarded verbatim from the caller
    pub query_args: QueryDefinition,
    /// Caller only needs the first match
    pub first_only: bool,
    /// The schema type being queried
    pub gql_type: TypeHandle,
    /// Explicit node subset to query instead of the nodes of `gql_type`.
    ///
    /// Set when `gql_type` is abstract, so the engine only ever sees
    /// concrete nodes.
    pub nodes: Option<Vec<Node>>,
}

/// Read interface of the node store
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Get node by ID
    ///
    /// - `Ok(Some(node))` if node exists
    /// - `Ok(None)` if node doesn't exist (not an error)
    fn get_node(&self, id: &str) -> Result<Option<Node>>;

    /// All nodes in the store
    fn get_nodes(&self) -> Result<Vec<Node>>;

    /// All nodes whose type tag equals `type_name`
    fn get_nodes_by_type(&self, type_name: &str) -> Result<Vec<Node>>;

    /// Distinct type tags present in the store
    fn get_types(&self) -> Result<Vec<String>>;

    /// Execute a filter/sort query
    ///
    /// Returns the matching nodes in result order. When `first_only` is set
    /// the store may stop after the first match.
    async fn run_query(&self, query: StoreQuery) -> Result<Vec<Node>>;

    /// Walk up the parent chain of `node`
    ///
    /// Without a predicate returns the top-most ancestor (or `node` itself
    /// when it has no resolvable parent). With a predicate returns the
    /// nearest node on the chain, starting at `node`, that satisfies it, or
    /// `None`.
    fn find_root_node_ancestor(
        &self,
        node: &Node,
        predicate: Option<&NodePredicate>,
    ) -> Result<Option<Node>>;
}
