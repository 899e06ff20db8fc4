pub mod analyzer;
pub mod ast;
pub mod config;
pub mod docs;
pub mod emit;
pub mod error;
pub mod generator;
pub mod inject;
pub mod parser;
pub mod plan;
pub mod profiles;
pub mod query;
pub mod sql;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use analyzer::{analyze, AnalyzedColumn, AnalyzedEntity, AnalyzedSchema};
pub use ast::*;
pub use config::GeneratorConfig;
pub use emit::{ContractSurface, OutputArtifact};
pub use error::{PolyApiError, Result};
pub use generator::{analyze_documents, write_artifacts, GenerationOutput, Generator};
pub use parser::{parse_backend_columns, parse_roles, parse_schema};
pub use plan::{EmissionPlan, PlanOptions};
pub use profiles::{ProfileKind, RenderedProfile, TargetProfile};
