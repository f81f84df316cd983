//! Schema Type Handles
//!
//! Type handles are what the schema oracle hands out. A `TypeRef` is what
//! callers pass in: either a bare type name or a handle they already hold.

use serde::{Deserialize, Serialize};

/// Kind of a schema type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// Concrete object type
    Object,
    /// Abstract interface type, implemented by object types
    Interface,
    /// Abstract union of object types
    Union,
}

impl TypeKind {
    /// Interfaces and unions are abstract
    pub fn is_abstract(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Union)
    }
}

/// A schema type as reported by the oracle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeHandle {
    pub name: String,
    pub kind: TypeKind,
    /// Names of the interfaces this type declares
    #[serde(default)]
    pub interfaces: Vec<String>,
}

impl TypeHandle {
    pub fn object(name: impl Into<String>, interfaces: &[&str]) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Object,
            interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn interface(name: impl Into<String>, interfaces: &[&str]) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Interface,
            interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn union(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Union,
            interfaces: Vec::new(),
        }
    }

    /// Whether this type declares the given interface
    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|i| i == interface)
    }
}

/// A reference to a schema type, by name or by handle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TypeRef {
    Name(String),
    Handle(TypeHandle),
}

impl TypeRef {
    /// The referenced type name
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Name(name) => name,
            TypeRef::Handle(handle) => &handle.name,
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Name(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::Name(name)
    }
}

impl From<TypeHandle> for TypeRef {
    fn from(handle: TypeHandle) -> Self {
        TypeRef::Handle(handle)
    }
}

/// A type reference after lookup, tagged by how it must be queried.
///
/// Produced once per call by the type resolver; every consumer matches on
/// this instead of re-inspecting the handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    /// Object type, queried directly
    Concrete(TypeHandle),
    /// Interface type with the oracle's possible types, in oracle order
    Abstract {
        handle: TypeHandle,
        possible_types: Vec<TypeHandle>,
    },
    /// Union type. Members need not share fields, so it cannot be queried
    Union {
        handle: TypeHandle,
        possible_types: Vec<TypeHandle>,
    },
}

impl ResolvedType {
    pub fn handle(&self) -> &TypeHandle {
        match self {
            ResolvedType::Concrete(handle) => handle,
            ResolvedType::Abstract { handle, .. } => handle,
            ResolvedType::Union { handle, .. } => handle,
        }
    }
}
