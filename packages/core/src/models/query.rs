//! Query Arguments and Results
//!
//! Argument structs mirror what upstream resolvers hand over as JSON, so
//! they all deserialize with camelCase keys. Filter and sort expressions
//! stay opaque `serde_json::Value`s; only the node store interprets them.

use super::node::Node;
use super::schema::TypeRef;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Either a node identifier or a node the caller already holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
    Id(String),
    Node(Box<Node>),
}

impl From<&str> for NodeRef {
    fn from(id: &str) -> Self {
        NodeRef::Id(id.to_string())
    }
}

impl From<String> for NodeRef {
    fn from(id: String) -> Self {
        NodeRef::Id(id)
    }
}

impl From<Node> for NodeRef {
    fn from(node: Node) -> Self {
        NodeRef::Node(Box::new(node))
    }
}

/// Arguments for a single-node lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeByIdArgs {
    #[serde(default)]
    pub id: Option<NodeRef>,
    #[serde(default, rename = "type")]
    pub type_ref: Option<TypeRef>,
}

impl NodeByIdArgs {
    pub fn new(id: impl Into<NodeRef>) -> Self {
        Self {
            id: Some(id.into()),
            type_ref: None,
        }
    }

    pub fn with_type(mut self, type_ref: impl Into<TypeRef>) -> Self {
        self.type_ref = Some(type_ref.into());
        self
    }
}

/// Arguments for a multi-node lookup.
///
/// `ids` deserializes to `None` when the input is not an array, and any
/// element that is neither an id nor a node becomes `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesByIdsArgs {
    #[serde(default, deserialize_with = "lenient_ids")]
    pub ids: Option<Vec<Option<NodeRef>>>,
    #[serde(default, rename = "type")]
    pub type_ref: Option<TypeRef>,
}

impl NodesByIdsArgs {
    pub fn new<I, R>(ids: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<NodeRef>,
    {
        Self {
            ids: Some(ids.into_iter().map(|id| Some(id.into())).collect()),
            type_ref: None,
        }
    }

    pub fn with_type(mut self, type_ref: impl Into<TypeRef>) -> Self {
        self.type_ref = Some(type_ref.into());
        self
    }
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Option<Vec<Option<NodeRef>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value::<NodeRef>(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Arguments for a full or per-type node listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllNodesArgs {
    #[serde(default, rename = "type")]
    pub type_ref: Option<TypeRef>,
}

impl AllNodesArgs {
    pub fn of_type(type_ref: impl Into<TypeRef>) -> Self {
        Self {
            type_ref: Some(type_ref.into()),
        }
    }
}

/// Filter and sort expressions, forwarded verbatim to the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDefinition {
    #[serde(default)]
    pub filter: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
}

/// Arguments for a structured query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryArgs {
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub query: QueryDefinition,
    #[serde(default)]
    pub first_only: bool,
}

impl QueryArgs {
    pub fn new(type_ref: impl Into<TypeRef>, filter: Value) -> Self {
        Self {
            type_ref: type_ref.into(),
            query: QueryDefinition { filter, sort: None },
            first_only: false,
        }
    }

    pub fn with_sort(mut self, sort: Value) -> Self {
        self.query.sort = Some(sort);
        self
    }

    pub fn first_only(mut self) -> Self {
        self.first_only = true;
        self
    }
}

/// Result of a structured query.
///
/// `firstOnly` queries produce `None` or `One`, list queries produce
/// `Many`. Serializes to `null`, a node object or an array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    None,
    One(Node),
    Many(Vec<Node>),
}

impl QueryResult {
    /// Shape a store result according to the `firstOnly` flag
    pub fn from_nodes(nodes: Vec<Node>, first_only: bool) -> Self {
        if first_only {
            nodes
                .into_iter()
                .next()
                .map_or(QueryResult::None, QueryResult::One)
        } else {
            QueryResult::Many(nodes)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueryResult::None => 0,
            QueryResult::One(_) => 1,
            QueryResult::Many(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first node, if any
    pub fn into_option(self) -> Option<Node> {
        match self {
            QueryResult::None => None,
            QueryResult::One(node) => Some(node),
            QueryResult::Many(nodes) => nodes.into_iter().next(),
        }
    }

    pub fn into_vec(self) -> Vec<Node> {
        match self {
            QueryResult::None => Vec::new(),
            QueryResult::One(node) => vec![node],
            QueryResult::Many(nodes) => nodes,
        }
    }
}
