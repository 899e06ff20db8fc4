//! Backend-handled column injection.
//!
//! For every entity that has a bound backend column, the column is removed
//! from the writable input and recorded as a server assignment on the
//! create or update path. Applying the injector again changes nothing.

use crate::analyzer::AnalyzedSchema;
use crate::ast::{BackendColumn, WritePhase};
use crate::plan::{EmissionPlan, EntityPlan, ServerAssignment};

pub struct BackendColumnInjector<'a> {
    columns: &'a [BackendColumn],
}

impl<'a> BackendColumnInjector<'a> {
    pub fn new(schema: &'a AnalyzedSchema) -> Self {
        BackendColumnInjector {
            columns: schema.backend().columns(),
        }
    }

    pub fn apply(&self, plan: &mut EmissionPlan) {
        for entity in &mut plan.entities {
            self.apply_entity(entity);
        }
    }

    fn apply_entity(&self, entity: &mut EntityPlan) {
        for backend in self.columns {
            if !entity.whitelist.iter().any(|c| c == &backend.column) {
                continue;
            }
            if backend.column == entity.primary_key.column {
                log::warn!(
                    "'{}.{}' is the primary key and cannot be backend-handled as {}",
                    entity.entity,
                    backend.column,
                    backend.role.key()
                );
                continue;
            }

            entity.inputs.retain(|field| field.column != backend.column);

            let assignments = match backend.phase {
                WritePhase::Create => &mut entity.create_assignments,
                WritePhase::Update => &mut entity.update_assignments,
            };
            if assignments.iter().any(|a| a.column == backend.column) {
                continue;
            }
            assignments.push(ServerAssignment {
                column: backend.column.clone(),
                role: backend.role.clone(),
                source: backend.source,
            });
            log::debug!(
                "'{}.{}' assigned from {:?} on {:?}",
                entity.entity,
                backend.column,
                backend.source,
                backend.phase
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::ast::*;
    use crate::fixtures::shop_schema;
    use crate::plan::PlanOptions;
    use pretty_assertions::assert_eq;

    fn columns(assignments: &[ServerAssignment]) -> Vec<&str> {
        assignments.iter().map(|a| a.column.as_str()).collect()
    }

    #[test]
    fn test_backend_columns_leave_input() {
        let schema = shop_schema();
        let plan = EmissionPlan::build(&schema, &PlanOptions::default()).unwrap();
        let order = plan.entity("order").unwrap();
        let inputs: Vec<&str> = order.inputs.iter().map(|f| f.column.as_str()).collect();

        assert_eq!(inputs, vec!["customer_id", "status", "total", "note", "is_active"]);
    }

    #[test]
    fn test_assignments_by_phase() {
        let schema = shop_schema();
        let plan = EmissionPlan::build(&schema, &PlanOptions::default()).unwrap();
        let order = plan.entity("order").unwrap();

        assert_eq!(columns(&order.create_assignments), vec!["time_add", "user_add", "ip_add"]);
        assert_eq!(columns(&order.update_assignments), vec!["time_edit", "user_edit"]);
        assert_eq!(order.update_assignments[0].source, ContextSource::Timestamp);
        assert_eq!(order.update_assignments[1].source, ContextSource::Actor);
    }

    #[test]
    fn test_only_entities_with_the_column() {
        let schema = shop_schema();
        let plan = EmissionPlan::build(&schema, &PlanOptions::default()).unwrap();

        let customer = plan.entity("customer").unwrap();
        assert!(customer.create_assignments.is_empty());
        assert_eq!(columns(&customer.update_assignments), vec!["time_edit"]);

        assert!(plan.entity("product").unwrap().update_assignments.is_empty());
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let schema = shop_schema();
        let mut plan = EmissionPlan::build(&schema, &PlanOptions::default()).unwrap();
        let once = plan.clone();

        BackendColumnInjector::new(&schema).apply(&mut plan);

        assert_eq!(plan, once);
    }

    #[test]
    fn test_primary_key_is_never_injected() {
        let mut doc = SchemaDocument::new();
        doc.add_entity(
            EntityDefinition::new("audit")
                .column(ColumnDefinition::new("stamp", "varchar(40)").primary(PrimaryKeyStrategy::ManualAll))
                .column(ColumnDefinition::new("note", "text")),
        );
        let roles = RoleBinding::default();
        let backend = BackendBinding::resolve(
            &BackendHandledDocument::default().bind("createdAt", "stamp"),
            &roles,
        )
        .unwrap();
        let schema = analyze(&doc, roles, backend).unwrap();
        let plan = EmissionPlan::build(&schema, &PlanOptions::default()).unwrap();
        let audit = plan.entity("audit").unwrap();

        assert!(audit.create_assignments.is_empty());
        assert!(audit.input("stamp").is_some());
    }
}
