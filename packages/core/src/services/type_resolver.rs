//! Type Resolver
//!
//! Turns a type reference into the ordered set of concrete, node-backed type
//! names it denotes. Stateless: the schema is consulted on every call so
//! results track schema changes between builds.

use super::error::Result;
use crate::models::{ResolvedType, TypeHandle, TypeKind, TypeRef};
use crate::schema::SchemaOracle;
use std::collections::HashSet;

/// Look up a type reference and classify it.
///
/// Returns `Ok(None)` when a type name is unknown to the schema.
pub fn resolve_type(oracle: &dyn SchemaOracle, type_ref: &TypeRef) -> Result<Option<ResolvedType>> {
    let handle = match type_ref {
        TypeRef::Name(name) => match oracle.get_type(name)? {
            Some(handle) => handle,
            None => {
                tracing::debug!(type_name = %name, "Type not found in schema");
                return Ok(None);
            }
        },
        TypeRef::Handle(handle) => handle.clone(),
    };

    // Unions are classified by kind alone, regardless of `is_abstract_type`
    if handle.kind == TypeKind::Union {
        let possible_types = oracle.possible_types(&handle)?;
        return Ok(Some(ResolvedType::Union {
            handle,
            possible_types,
        }));
    }

    if !oracle.is_abstract_type(&handle) {
        return Ok(Some(ResolvedType::Concrete(handle)));
    }

    let possible_types = oracle.possible_types(&handle)?;
    Ok(Some(ResolvedType::Abstract {
        handle,
        possible_types,
    }))
}

/// Concrete node-backed type names behind an already resolved type.
///
/// Keeps the oracle's order and drops duplicates and every type that does
/// not declare `node_interface`.
pub fn concrete_types(resolved: &ResolvedType, node_interface: &str) -> Vec<String> {
    let candidates: &[TypeHandle] = match resolved {
        ResolvedType::Concrete(handle) => std::slice::from_ref(handle),
        ResolvedType::Abstract { possible_types, .. }
        | ResolvedType::Union { possible_types, .. } => possible_types,
    };

    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter(|t| t.implements(node_interface))
        .filter(|t| seen.insert(t.name.as_str()))
        .map(|t| t.name.clone())
        .collect()
}

/// Resolve a type reference straight to its concrete node-backed type names.
///
/// Unknown names resolve to an empty list.
pub fn resolve_concrete_types(
    oracle: &dyn SchemaOracle,
    type_ref: &TypeRef,
    node_interface: &str,
) -> Result<Vec<String>> {
    let types = match resolve_type(oracle, type_ref)? {
        Some(resolved) => concrete_types(&resolved, node_interface),
        None => Vec::new(),
    };
    tracing::trace!(type_name = %type_ref.name(), ?types, "Resolved concrete types");
    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use crate::services::error::NodeModelError;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
            .with_type(TypeHandle::interface("Node", &[]))
            .with_type(TypeHandle::interface("Content", &[]))
            .with_type(TypeHandle::object("Page", &["Node", "Content"]))
            .with_type(TypeHandle::object("Inline", &["Content"]))
            .with_type(TypeHandle::object("Post", &["Node", "Content"]))
            .with_union("Hit", &["Post", "Inline", "Post"])
    }

    fn resolve(registry: &SchemaRegistry, name: &str) -> Vec<String> {
        resolve_concrete_types(registry, &TypeRef::from(name), "Node").unwrap()
    }

    #[test]
    fn test_concrete_type_resolves_to_itself_only_when_node_backed() {
        let registry = registry();
        assert_eq!(resolve(&registry, "Post"), vec!["Post"]);
        assert!(resolve(&registry, "Inline").is_empty());
    }

    #[test]
    fn test_interface_expands_in_oracle_order() {
        let registry = registry();
        assert_eq!(resolve(&registry, "Content"), vec!["Page", "Post"]);
    }

    #[test]
    fn test_union_expands_without_duplicates() {
        let registry = registry();
        assert_eq!(resolve(&registry, "Hit"), vec!["Post"]);
        assert!(matches!(
            resolve_type(&registry, &TypeRef::from("Hit")).unwrap(),
            Some(ResolvedType::Union { .. })
        ));
    }

    #[test]
    fn test_unknown_name_is_empty_not_error() {
        let registry = registry();
        assert!(resolve(&registry, "Nope").is_empty());
        assert!(resolve_type(&registry, &TypeRef::from("Nope"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_handle_reference_skips_name_lookup() {
        let registry = SchemaRegistry::new();
        let handle = TypeHandle::object("Detached", &["Node"]);
        assert_eq!(
            resolve_concrete_types(&registry, &TypeRef::from(handle), "Node").unwrap(),
            vec!["Detached"]
        );
    }

    #[test]
    fn test_custom_node_interface() {
        let registry = registry();
        let types = resolve_concrete_types(&registry, &TypeRef::from("Content"), "Content").unwrap();
        assert_eq!(types, vec!["Page", "Inline", "Post"]);
    }

    struct BrokenOracle;

    impl SchemaOracle for BrokenOracle {
        fn get_type(&self, _name: &str) -> anyhow::Result<Option<TypeHandle>> {
            anyhow::bail!("schema unavailable")
        }

        fn possible_types(&self, _handle: &TypeHandle) -> anyhow::Result<Vec<TypeHandle>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_oracle_failure_propagates() {
        let err = resolve_concrete_types(&BrokenOracle, &TypeRef::from("Post"), "Node").unwrap_err();
        assert!(matches!(err, NodeModelError::Store(_)));
        assert_eq!(err.to_string(), "schema unavailable");
    }
}
