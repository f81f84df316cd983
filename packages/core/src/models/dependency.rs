//! Page Dependency Types
//!
//! A `PageDependency` is what callers pass to describe who depends on a
//! result. A `DependencyRecord` is the fact handed to the dependency sink.

use serde::{Deserialize, Serialize};

/// Descriptor of the render context that depends on a result.
///
/// Both fields are optional overrides. Missing `path` falls back to the
/// path the facade is bound to. A `connection_type` switches tracking from
/// individual nodes to the whole named connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDependency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
}

impl PageDependency {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            connection_type: None,
        }
    }

    pub fn connection(connection_type: impl Into<String>) -> Self {
        Self {
            path: None,
            connection_type: Some(connection_type.into()),
        }
    }

    pub fn with_connection(mut self, connection_type: impl Into<String>) -> Self {
        self.connection_type = Some(connection_type.into());
        self
    }

    /// Overlay these overrides on a bound default path.
    ///
    /// Each field is defaulted independently: `path` from `bound_path`,
    /// `connection_type` from nothing.
    pub fn resolve(&self, bound_path: Option<&str>) -> PageDependency {
        PageDependency {
            path: self
                .path
                .clone()
                .or_else(|| bound_path.map(str::to_string)),
            connection_type: self.connection_type.clone(),
        }
    }
}

/// A single dependency fact emitted to the sink
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyRecord {
    /// The output at `path` depends on one node
    #[serde(rename_all = "camelCase")]
    Node { path: String, node_id: String },
    /// The output at `path` depends on a whole connection
    Connection { path: String, connection: String },
}

impl DependencyRecord {
    pub fn node(path: impl Into<String>, node_id: impl Into<String>) -> Self {
        DependencyRecord::Node {
            path: path.into(),
            node_id: node_id.into(),
        }
    }

    pub fn connection(path: impl Into<String>, connection: impl Into<String>) -> Self {
        DependencyRecord::Connection {
            path: path.into(),
            connection: connection.into(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            DependencyRecord::Node { path, .. } => path,
            DependencyRecord::Connection { path, .. } => path,
        }
    }
}
