//! Target emission profiles.
//!
//! A profile renders the shared [`EmissionPlan`] into source files for one
//! runtime style. Every profile reports the GraphQL surface it rendered as a
//! [`ContractSurface`] so that profiles can be compared after rendering.

pub mod node;
pub mod php;

use serde::{Deserialize, Serialize};

use crate::analyzer::AnalyzedSchema;
use crate::emit::{ContractSurface, OutputArtifact, TypeRegistry};
use crate::error::Result;
use crate::plan::{shared_enums, shared_inputs, EmissionPlan};
use crate::sql::SqlDialect;

pub use node::NodeSequelizeProfile;
pub use php::PhpPdoProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    PhpPdo,
    NodeSequelize,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 2] = [ProfileKind::PhpPdo, ProfileKind::NodeSequelize];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::PhpPdo => "php-pdo",
            ProfileKind::NodeSequelize => "node-sequelize",
        }
    }

    /// Artifact directory under the output root.
    pub fn directory(&self) -> &'static str {
        match self {
            ProfileKind::PhpPdo => "php",
            ProfileKind::NodeSequelize => "node",
        }
    }

    pub fn build(&self, node_dialect: SqlDialect) -> Box<dyn TargetProfile> {
        match self {
            ProfileKind::PhpPdo => Box::new(PhpPdoProfile::new()),
            ProfileKind::NodeSequelize => Box::new(NodeSequelizeProfile::new(node_dialect)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedProfile {
    pub kind: ProfileKind,
    pub artifacts: Vec<OutputArtifact>,
    pub contract: ContractSurface,
}

pub trait TargetProfile {
    fn kind(&self) -> ProfileKind;

    /// Pure: the same schema and plan always render the same artifacts.
    fn render(&self, schema: &AnalyzedSchema, plan: &EmissionPlan) -> Result<RenderedProfile>;
}

/// Pass 1 shared by all profiles: every type name the schema will declare,
/// shared vocabulary first, then per entity its object, page and input type.
pub(crate) fn declare_types<H>(
    registry: &mut TypeRegistry<H>,
    plan: &EmissionPlan,
    handle: impl Fn(&str) -> H,
) -> Result<()> {
    for decl in shared_enums() {
        registry.declare(decl.name, handle(decl.name))?;
    }
    for decl in shared_inputs() {
        registry.declare(decl.name, handle(decl.name))?;
    }
    for entity in &plan.entities {
        for name in [
            &entity.names.type_name,
            &entity.names.page_type,
            &entity.names.input_type,
        ] {
            registry.declare(name, handle(name))?;
        }
    }
    Ok(())
}
