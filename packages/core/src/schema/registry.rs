//! In-memory schema registry
//!
//! Types are kept in registration order, which is also the order
//! `possible_types` reports implementations of an interface in.

use super::SchemaOracle;
use crate::models::{TypeHandle, TypeKind};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Default)]
struct RegistryState {
    types: Vec<TypeHandle>,
    by_name: HashMap<String, usize>,
    union_members: HashMap<String, Vec<String>>,
}

/// Mutable, shareable `SchemaOracle` implementation
///
/// Registering a type under an existing name replaces it in place, keeping
/// its position.
#[derive(Default)]
pub struct SchemaRegistry {
    state: RwLock<RegistryState>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object or interface type
    pub fn add_type(&self, handle: TypeHandle) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match state.by_name.get(&handle.name) {
            Some(&index) => state.types[index] = handle,
            None => {
                let index = state.types.len();
                state.by_name.insert(handle.name.clone(), index);
                state.types.push(handle);
            }
        }
    }

    /// Register a union type over the named member types
    pub fn add_union(&self, name: impl Into<String>, members: &[&str]) {
        let name = name.into();
        self.add_type(TypeHandle::union(name.clone()));
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state
            .union_members
            .insert(name, members.iter().map(|m| m.to_string()).collect());
    }

    /// Builder form of [`SchemaRegistry::add_type`]
    pub fn with_type(self, handle: TypeHandle) -> Self {
        self.add_type(handle);
        self
    }

    /// Builder form of [`SchemaRegistry::add_union`]
    pub fn with_union(self, name: impl Into<String>, members: &[&str]) -> Self {
        self.add_union(name, members);
        self
    }

    /// Names of all registered types, in registration order
    pub fn type_names(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.types.iter().map(|t| t.name.clone()).collect()
    }
}

impl SchemaOracle for SchemaRegistry {
    fn get_type(&self, name: &str) -> Result<Option<TypeHandle>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.by_name.get(name).map(|&i| state.types[i].clone()))
    }

    fn possible_types(&self, handle: &TypeHandle) -> Result<Vec<TypeHandle>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let types = match handle.kind {
            TypeKind::Object => vec![handle.clone()],
            TypeKind::Interface => state
                .types
                .iter()
                .filter(|t| t.kind == TypeKind::Object && t.implements(&handle.name))
                .cloned()
                .collect(),
            TypeKind::Union => state
                .union_members
                .get(&handle.name)
                .into_iter()
                .flatten()
                .filter_map(|member| state.by_name.get(member).map(|&i| state.types[i].clone()))
                .collect(),
        };
        Ok(types)
    }
}
