//! Configuration for the query layer
use super::error::{NodeModelError, Result};
use serde::{Deserialize, Serialize};

/// Name of the interface that marks node-backed types
pub const DEFAULT_NODE_INTERFACE: &str = "Node";

/// Construction-time settings of a [`super::NodeModel`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeModelConfig {
    /// Interface a concrete type must declare to count as node-backed
    pub node_interface: String,

    /// Render path dependencies are recorded against by default
    pub path: Option<String>,
}

impl Default for NodeModelConfig {
    fn default() -> Self {
        Self {
            node_interface: DEFAULT_NODE_INTERFACE.to_string(),
            path: None,
        }
    }
}

impl NodeModelConfig {
    /// Default configuration bound to a render path
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Parse configuration from JSON. Missing keys take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| NodeModelError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_interface.trim().is_empty() {
            return Err(NodeModelError::config("nodeInterface must not be empty"));
        }
        Ok(())
    }
}
