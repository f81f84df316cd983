//! Node Accessor
//!
//! Resolves an id-or-node reference to a node. A node that already carries
//! an id is returned as is, which saves a store round-trip when a resolver
//! passes along a node it fetched earlier.

use super::error::Result;
use crate::db::NodeStore;
use crate::models::{Node, NodeRef};

pub fn resolve_node(store: &dyn NodeStore, node_ref: Option<NodeRef>) -> Result<Option<Node>> {
    match node_ref {
        Some(NodeRef::Node(node)) if !node.id.is_empty() => Ok(Some(*node)),
        Some(NodeRef::Id(id)) if !id.is_empty() => Ok(store.get_node(&id)?),
        _ => Ok(None),
    }
}
