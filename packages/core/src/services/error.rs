//! Service Layer Error Types
//!
//! Resolution misses (unknown types, missing ids) are not errors; they
//! yield empty results. What remains is the union-query precondition and
//! failures of the collaborators, which pass through unchanged.

use thiserror::Error;

/// Query layer errors
#[derive(Error, Debug)]
pub enum NodeModelError {
    /// Filtering and sorting over a union type is not supported
    #[error("Querying union types is not supported: {type_name}")]
    UnsupportedUnionQuery { type_name: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Schema oracle or node store failure
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl NodeModelError {
    /// Create an unsupported union query error
    pub fn unsupported_union_query(type_name: impl Into<String>) -> Self {
        Self::UnsupportedUnionQuery {
            type_name: type_name.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, NodeModelError>;
