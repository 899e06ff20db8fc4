//! Auxiliary documents derived from the analyzed schema. They are not read
//! back by the generator.

pub mod field_config;
pub mod labels;
pub mod manual;

use crate::analyzer::AnalyzedSchema;
use crate::emit::OutputArtifact;
use crate::error::Result;
use crate::plan::EmissionPlan;

pub use field_config::{DisplayElement, FieldConfig, FieldConfigDocument, OptionSource};
pub use labels::EntityLabels;

pub const FIELD_CONFIG_PATH: &str = "docs/fields.json";
pub const LABELS_PATH: &str = "docs/labels.json";
pub const MANUAL_PATH: &str = "docs/API.md";

pub fn emit_documents(schema: &AnalyzedSchema, plan: &EmissionPlan) -> Result<Vec<OutputArtifact>> {
    Ok(vec![
        OutputArtifact::new(FIELD_CONFIG_PATH, field_config::render(schema, plan)?),
        OutputArtifact::new(LABELS_PATH, labels::render(schema)?),
        OutputArtifact::new(MANUAL_PATH, manual::render(plan)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::shop_schema;
    use crate::plan::PlanOptions;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_regeneration_is_byte_stable() {
        let schema = shop_schema();
        let plan = EmissionPlan::build(&schema, &PlanOptions::default()).unwrap();

        let first = emit_documents(&schema, &plan).unwrap();
        let second = emit_documents(&schema, &plan).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
