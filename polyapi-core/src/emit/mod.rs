//! Shared emission infrastructure: structured source files, escaping,
//! identifier casing, GraphQL type references and two-pass declaration.

pub mod artifact;
pub mod escape;
pub mod graphql;
pub mod naming;
pub mod registry;
pub mod sdl;
pub mod source;

pub use artifact::OutputArtifact;
pub use graphql::{ContractArg, ContractKind, ContractSurface, TypeRef};
pub use registry::TypeRegistry;
pub use source::{SourceFile, Stmt, Style, JS_STYLE, PHP_STYLE};
