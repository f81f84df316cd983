//! NodeModel - Node Query Facade
//!
//! One `NodeModel` serves one render context. It resolves type references
//! against the schema oracle, delegates lookups and queries to the node
//! store, and records what the render path depended on before handing each
//! result back.
//!
//! # Tracking
//!
//! `get_node_by_id`, `get_nodes_by_ids` and `run_query` always track their
//! result. `get_all_nodes` only tracks when a [`PageDependency`] is passed
//! explicitly, since plain listings are mostly introspection. `get_types`
//! and `find_root_node_ancestor` never track.
//!
//! # Examples
//!
//! ```rust
//! use pagegraph_core::db::MemoryNodeStore;
//! use pagegraph_core::models::{Node, QueryArgs, TypeHandle};
//! use pagegraph_core::schema::SchemaRegistry;
//! use pagegraph_core::services::{MemorySink, NodeModel, NodeModelConfig};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let schema = Arc::new(
//!     SchemaRegistry::new().with_type(TypeHandle::object("Post", &["Node"])),
//! );
//! let store = Arc::new(MemoryNodeStore::with_nodes([
//!     Node::new("a", "Post").with_field("slug", json!("/a")),
//! ]));
//! let sink = Arc::new(MemorySink::new());
//!
//! let model = NodeModel::new(schema, store, sink.clone(), NodeModelConfig::for_path("/a"))?;
//! let post = model
//!     .run_query(QueryArgs::new("Post", json!({ "slug": { "eq": "/a" } })).first_only(), None)
//!     .await?
//!     .into_option();
//!
//! assert_eq!(post.map(|n| n.id), Some("a".to_string()));
//! assert_eq!(sink.len(), 1);
//! # Ok(())
//! # }
//! ```

use super::config::NodeModelConfig;
use super::dependency_tracker::{DependencySink, DependencyTracker, TrackedNodes};
use super::error::{NodeModelError, Result};
use super::node_accessor::resolve_node;
use super::type_resolver::{concrete_types, resolve_concrete_types, resolve_type};
use crate::db::{NodePredicate, NodeStore, StoreQuery};
use crate::models::{
    AllNodesArgs, Node, NodeByIdArgs, NodesByIdsArgs, PageDependency, QueryArgs, QueryResult,
    ResolvedType, TypeRef,
};
use crate::schema::SchemaOracle;
use std::sync::Arc;

/// Query facade bound to one render path
#[derive(Clone)]
pub struct NodeModel {
    schema: Arc<dyn SchemaOracle>,
    store: Arc<dyn NodeStore>,
    tracker: DependencyTracker,
    node_interface: String,
}

impl NodeModel {
    /// Create a facade over the given collaborators
    ///
    /// # Errors
    ///
    /// Returns `NodeModelError::Config` if the configuration is invalid.
    pub fn new(
        schema: Arc<dyn SchemaOracle>,
        store: Arc<dyn NodeStore>,
        sink: Arc<dyn DependencySink>,
        config: NodeModelConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            schema,
            store,
            tracker: DependencyTracker::new(sink, config.path),
            node_interface: config.node_interface,
        })
    }

    /// Facade for another render path, sharing all collaborators
    pub fn with_context(&self, path: impl Into<String>) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            store: Arc::clone(&self.store),
            tracker: self.tracker.with_path(Some(path.into())),
            node_interface: self.node_interface.clone(),
        }
    }

    /// The render path dependencies are recorded against by default
    pub fn path(&self) -> Option<&str> {
        self.tracker.path()
    }

    /// Get a node by id, optionally requiring it to be of a given type
    ///
    /// Returns `Ok(None)` when the node is missing or its type tag is not
    /// among the concrete types `args.type_ref` resolves to.
    pub fn get_node_by_id(
        &self,
        args: NodeByIdArgs,
        deps: Option<&PageDependency>,
    ) -> Result<Option<Node>> {
        let result = match resolve_node(self.store.as_ref(), args.id)? {
            Some(node) => match &args.type_ref {
                Some(type_ref) => {
                    let types = self.concrete_type_names(type_ref)?;
                    Some(node).filter(|n| types.iter().any(|t| t == n.node_type()))
                }
                None => Some(node),
            },
            None => None,
        };
        Ok(self.tracker.track(result, deps))
    }

    /// Get nodes by ids, in id order, skipping ids that do not resolve
    ///
    /// `args.ids` of `None` (not a list) yields an empty result.
    pub fn get_nodes_by_ids(
        &self,
        args: NodesByIdsArgs,
        deps: Option<&PageDependency>,
    ) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        for node_ref in args.ids.unwrap_or_default() {
            if let Some(node) = resolve_node(self.store.as_ref(), node_ref)? {
                nodes.push(node);
            }
        }

        match &args.type_ref {
            Some(type_ref) if !nodes.is_empty() => {
                let types = self.concrete_type_names(type_ref)?;
                nodes.retain(|n| types.iter().any(|t| t == n.node_type()));
            }
            _ => {}
        }
        Ok(self.tracker.track(nodes, deps))
    }

    /// List all nodes, or all nodes of the concrete types behind a type
    ///
    /// Only tracked when `deps` is given.
    pub fn get_all_nodes(
        &self,
        args: AllNodesArgs,
        deps: Option<&PageDependency>,
    ) -> Result<Vec<Node>> {
        let nodes = match &args.type_ref {
            Some(type_ref) => self.nodes_of_type(type_ref)?,
            None => self.store.get_nodes()?,
        };
        Ok(match deps {
            Some(deps) => self.tracker.track(nodes, Some(deps)),
            None => nodes,
        })
    }

    /// Run a filter/sort query against a type
    ///
    /// Interface types are expanded to their node-backed implementations
    /// first and the store queries that explicit node set. Unknown type
    /// names yield an empty result without consulting the store.
    ///
    /// # Errors
    ///
    /// Returns `NodeModelError::UnsupportedUnionQuery` if the type is a
    /// union, whatever the filter and sort say.
    pub async fn run_query(
        &self,
        args: QueryArgs,
        deps: Option<&PageDependency>,
    ) -> Result<QueryResult> {
        let QueryArgs {
            type_ref,
            query,
            first_only,
        } = args;

        let (gql_type, nodes) = match resolve_type(self.schema.as_ref(), &type_ref)? {
            None => {
                tracing::debug!(type_name = %type_ref.name(), "Query against unknown type");
                let empty = QueryResult::from_nodes(Vec::new(), first_only);
                return Ok(self.tracker.track(empty, deps));
            }
            Some(ResolvedType::Union { handle, .. }) => {
                tracing::warn!(type_name = %handle.name, "Rejected query against union type");
                return Err(NodeModelError::unsupported_union_query(handle.name));
            }
            Some(ResolvedType::Concrete(handle)) => (handle, None),
            Some(resolved @ ResolvedType::Abstract { .. }) => {
                let mut nodes = Vec::new();
                for type_name in concrete_types(&resolved, &self.node_interface) {
                    nodes.extend(self.store.get_nodes_by_type(&type_name)?);
                }
                tracing::debug!(
                    type_name = %resolved.handle().name,
                    candidates = nodes.len(),
                    "Expanded abstract type for query"
                );
                (resolved.handle().clone(), Some(nodes))
            }
        };

        let found = self
            .store
            .run_query(StoreQuery {
                query_args: query,
                first_only,
                gql_type,
                nodes,
            })
            .await?;

        let result = QueryResult::from_nodes(found, first_only);
        Ok(self.tracker.track(result, deps))
    }

    /// Type tags present in the store. Not tracked.
    pub fn get_types(&self) -> Result<Vec<String>> {
        Ok(self.store.get_types()?)
    }

    /// Walk up the parent chain of `node`. Not tracked.
    pub fn find_root_node_ancestor(
        &self,
        node: &Node,
        predicate: Option<&NodePredicate>,
    ) -> Result<Option<Node>> {
        Ok(self.store.find_root_node_ancestor(node, predicate)?)
    }

    /// Record that the bound render path (or `deps`) depends on `result`
    ///
    /// For resolvers that obtained nodes some other way.
    pub fn track_page_dependencies<T: TrackedNodes>(
        &self,
        result: T,
        deps: Option<&PageDependency>,
    ) -> T {
        self.tracker.track(result, deps)
    }

    fn concrete_type_names(&self, type_ref: &TypeRef) -> Result<Vec<String>> {
        resolve_concrete_types(self.schema.as_ref(), type_ref, &self.node_interface)
    }

    /// Per-type store listings concatenated in resolved type order
    fn nodes_of_type(&self, type_ref: &TypeRef) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        for type_name in self.concrete_type_names(type_ref)? {
            nodes.extend(self.store.get_nodes_by_type(&type_name)?);
        }
        Ok(nodes)
    }
}
