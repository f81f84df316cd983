//! In-memory node store
//!
//! Keeps nodes in insertion order behind a `RwLock` so one store can be
//! shared by many facades. Query execution runs the filter and sort
//! evaluation from [`super::filter`] over a snapshot of the candidates.

use super::filter::{sort_nodes, CompiledFilter};
use super::node_store::{NodePredicate, NodeStore, StoreQuery};
use crate::models::Node;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

#[derive(Default)]
struct StoreState {
    order: Vec<String>,
    nodes: HashMap<String, Node>,
}

impl StoreState {
    fn ordered(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }
}

/// `NodeStore` over an in-process map
#[derive(Default)]
pub struct MemoryNodeStore {
    state: RwLock<StoreState>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from nodes, in order
    pub fn with_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let store = Self::new();
        for node in nodes {
            store.add_node(node);
        }
        store
    }

    /// Insert or replace a node. Replacing keeps the original position.
    pub fn add_node(&self, node: Node) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.nodes.contains_key(&node.id) {
            state.order.push(node.id.clone());
        }
        state.nodes.insert(node.id.clone(), node);
    }

    /// Remove a node, returning it if it was present
    pub fn remove_node(&self, id: &str) -> Option<Node> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let removed = state.nodes.remove(id)?;
        state.order.retain(|existing| existing != id);
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    fn get_node(&self, id: &str) -> Result<Option<Node>> {
        Ok(self.read().nodes.get(id).cloned())
    }

    fn get_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.read().ordered().cloned().collect())
    }

    fn get_nodes_by_type(&self, type_name: &str) -> Result<Vec<Node>> {
        Ok(self
            .read()
            .ordered()
            .filter(|node| node.node_type() == type_name)
            .cloned()
            .collect())
    }

    fn get_types(&self) -> Result<Vec<String>> {
        let state = self.read();
        let mut seen = HashSet::new();
        Ok(state
            .ordered()
            .map(|node| node.node_type())
            .filter(|t| seen.insert(*t))
            .map(str::to_string)
            .collect())
    }

    async fn run_query(&self, query: StoreQuery) -> Result<Vec<Node>> {
        let filter = CompiledFilter::compile(&query.query_args.filter)?;
        let candidates = match query.nodes {
            Some(nodes) => nodes,
            None => self.get_nodes_by_type(&query.gql_type.name)?,
        };

        let mut results: Vec<Node> = candidates
            .into_iter()
            .filter(|node| filter.matches(node))
            .collect();
        sort_nodes(&mut results, query.query_args.sort.as_ref())?;

        if query.first_only {
            results.truncate(1);
        }
        tracing::trace!(
            gql_type = %query.gql_type.name,
            matched = results.len(),
            "MemoryNodeStore query executed"
        );
        Ok(results)
    }

    fn find_root_node_ancestor(
        &self,
        node: &Node,
        predicate: Option<&NodePredicate>,
    ) -> Result<Option<Node>> {
        let state = self.read();
        let mut current = node.clone();
        let mut visited = HashSet::from([current.id.clone()]);

        loop {
            if predicate.map_or(false, |p| p(&current)) {
                return Ok(Some(current));
            }
            let parent = current
                .parent
                .as_deref()
                .and_then(|id| state.nodes.get(id))
                .filter(|parent| visited.insert(parent.id.clone()));
            match parent {
                Some(parent) => current = parent.clone(),
                None => break,
            }
        }

        Ok(match predicate {
            Some(_) => None,
            None => Some(current),
        })
    }
}
