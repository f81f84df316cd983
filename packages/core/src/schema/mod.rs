//! Schema Oracle
//!
//! The query layer never inspects the type system directly. It asks a
//! `SchemaOracle` which types exist, which are abstract and which concrete
//! types stand behind an abstract one.
//!
//! `SchemaRegistry` is the in-memory oracle used by embedding applications
//! and tests.

mod registry;

pub use registry::SchemaRegistry;

use crate::models::TypeHandle;
use anyhow::Result;

/// Read-only view of the schema type system
pub trait SchemaOracle: Send + Sync {
    /// Look up a type by name
    ///
    /// Returns `Ok(None)` for unknown names; that is not an error.
    fn get_type(&self, name: &str) -> Result<Option<TypeHandle>>;

    /// Whether the type is an interface or a union
    fn is_abstract_type(&self, handle: &TypeHandle) -> bool {
        handle.kind.is_abstract()
    }

    /// Concrete types that may stand behind `handle`, in stable order
    fn possible_types(&self, handle: &TypeHandle) -> Result<Vec<TypeHandle>>;
}
