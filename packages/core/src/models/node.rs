//! Node Data Structures
//!
//! Nodes are owned by the node store. This layer only reads the identifier
//! and the internal type tag and forwards whole node values.
//!
//! # Examples
//!
//! ```rust
//! use pagegraph_core::models::Node;
//! use serde_json::json;
//!
//! let post = Node::new("post-1", "MarkdownRemark")
//!     .with_parent("file-1")
//!     .with_field("frontmatter", json!({ "title": "Hello" }));
//!
//! assert_eq!(post.node_type(), "MarkdownRemark");
//! assert_eq!(post.parent.as_deref(), Some("file-1"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Internal bookkeeping attached to every node by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInternal {
    /// Concrete type tag, e.g. `MarkdownRemark`
    #[serde(rename = "type")]
    pub node_type: String,

    /// Plugin or source that created the node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Digest of the source content, used by the store for change detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_digest: Option<String>,
}

/// A graph node as held by the node store.
///
/// # Fields
///
/// - `id`: Unique identifier
/// - `parent`: Optional identifier of the node this one was derived from
/// - `children`: Identifiers of nodes derived from this one
/// - `internal`: Store bookkeeping, including the concrete type tag
/// - `fields`: Every other field, kept as raw JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default)]
    pub children: Vec<String>,

    pub internal: NodeInternal,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Node {
    /// Create a node with the given id and type tag and no other fields
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            children: Vec::new(),
            internal: NodeInternal {
                node_type: node_type.into(),
                owner: None,
                content_digest: None,
            },
            fields: Map::new(),
        }
    }

    /// Set the parent node id
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set a top-level field
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Concrete type tag (`internal.type`)
    pub fn node_type(&self) -> &str {
        &self.internal.node_type
    }

    /// Look up a field by dotted path, e.g. `frontmatter.title`.
    ///
    /// `id`, `parent` and `internal.*` resolve against the structural
    /// fields; everything else against `fields`.
    pub fn field(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;
        let root = match head {
            "id" => Value::String(self.id.clone()),
            "parent" => self.parent.clone().map(Value::String)?,
            "children" => Value::from(self.children.clone()),
            "internal" => serde_json::to_value(&self.internal).ok()?,
            other => self.fields.get(other)?.clone(),
        };
        segments.try_fold(root, |value, segment| value.get(segment).cloned())
    }
}
