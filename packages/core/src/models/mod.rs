//! Data Models
//!
//! Plain data passed across the query layer:
//!
//! - `Node` - graph node as held by the store
//! - `TypeHandle` / `TypeRef` / `ResolvedType` - schema types and references
//! - `QueryArgs` and the lookup argument structs - resolver input
//! - `PageDependency` / `DependencyRecord` - dependency tracking facts

mod dependency;
mod node;
mod query;
mod schema;

pub use dependency::{DependencyRecord, PageDependency};
pub use node::{Node, NodeInternal};
pub use query::{
    AllNodesArgs, NodeByIdArgs, NodeRef, NodesByIdsArgs, QueryArgs, QueryDefinition, QueryResult,
};
pub use schema::{ResolvedType, TypeHandle, TypeKind, TypeRef};
