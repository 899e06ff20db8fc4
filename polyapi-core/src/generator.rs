//! One generation run: documents in, artifacts and contracts out.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;

use crate::analyzer::{analyze, AnalyzedSchema};
use crate::ast::{
    BackendBinding, BackendHandledDocument, RoleBinding, RoleBindingDocument, SchemaDocument,
};
use crate::config::GeneratorConfig;
use crate::docs;
use crate::emit::{ContractSurface, OutputArtifact};
use crate::error::{PolyApiError, Result};
use crate::plan::EmissionPlan;
use crate::profiles::ProfileKind;

/// Resolve the role and backend-handled bindings, then analyze the schema.
pub fn analyze_documents(
    schema: &SchemaDocument,
    roles: &RoleBindingDocument,
    backend: &BackendHandledDocument,
) -> Result<AnalyzedSchema> {
    let roles = RoleBinding::from_document(roles);
    let backend = BackendBinding::resolve(backend, &roles)?;
    analyze(schema, roles, backend)
}

#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub artifacts: Vec<OutputArtifact>,
    pub contracts: IndexMap<ProfileKind, ContractSurface>,
}

#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Generator { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&self, schema: &AnalyzedSchema) -> Result<GenerationOutput> {
        log::info!(
            "generating {} entities for {} profiles",
            schema.len(),
            self.config.profiles.len()
        );

        let plan = EmissionPlan::build(schema, &self.config.plan_options())?;

        let mut artifacts = Vec::new();
        let mut contracts: IndexMap<ProfileKind, ContractSurface> = IndexMap::new();
        for kind in &self.config.profiles {
            if contracts.contains_key(kind) {
                log::warn!("profile '{}' requested twice, rendering once", kind.as_str());
                continue;
            }
            let rendered = kind.build(self.config.node_dialect).render(schema, &plan)?;
            log::debug!(
                "profile '{}' rendered {} artifacts",
                kind.as_str(),
                rendered.artifacts.len()
            );
            artifacts.extend(rendered.artifacts);
            contracts.insert(rendered.kind, rendered.contract);
        }

        check_contracts(&contracts)?;

        if self.config.emit_documents {
            artifacts.extend(docs::emit_documents(schema, &plan)?);
        }

        check_artifact_paths(&artifacts)?;

        log::info!("generated {} artifacts", artifacts.len());
        Ok(GenerationOutput {
            artifacts,
            contracts,
        })
    }
}

/// Every profile is compared against the first one rendered.
fn check_contracts(contracts: &IndexMap<ProfileKind, ContractSurface>) -> Result<()> {
    let mut iter = contracts.iter();
    let Some((first_kind, first)) = iter.next() else {
        return Ok(());
    };
    for (kind, contract) in iter {
        let details = first.diff(contract);
        if !details.is_empty() {
            return Err(PolyApiError::ContractMismatch {
                left: first_kind.as_str().to_string(),
                right: kind.as_str().to_string(),
                details,
            });
        }
    }
    Ok(())
}

fn is_safe_relative(path: &str) -> bool {
    let path = Path::new(path);
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Reject duplicate paths and paths that would land outside the output
/// directory.
pub fn check_artifact_paths(artifacts: &[OutputArtifact]) -> Result<()> {
    let mut seen = HashSet::new();
    for artifact in artifacts {
        if !is_safe_relative(&artifact.relative_path) {
            return Err(PolyApiError::UnsafeArtifactPath(artifact.relative_path.clone()));
        }
        if !seen.insert(artifact.relative_path.as_str()) {
            return Err(PolyApiError::DuplicateArtifact(artifact.relative_path.clone()));
        }
    }
    Ok(())
}

/// Write artifacts under `out_dir`. Nothing is written unless every path
/// passes [`check_artifact_paths`].
pub fn write_artifacts(out_dir: &Path, artifacts: &[OutputArtifact]) -> Result<Vec<PathBuf>> {
    check_artifact_paths(artifacts)?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = out_dir.join(&artifact.relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &artifact.text_content)?;
        log::debug!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
