//! The emission core: decides, per entity and independent of any target
//! syntax, which queries, mutations and relationship fields exist, what
//! they are called, what they accept and how mutations assign keys and
//! backend-handled columns.

pub mod mutation;
pub mod operation;

use std::collections::HashMap;

use crate::analyzer::{AnalyzedEntity, AnalyzedSchema};
use crate::emit::{naming, TypeRef};
use crate::error::{PolyApiError, Result};
use crate::inject::BackendColumnInjector;
use crate::query::{names, DEFAULT_PAGE_LIMIT};
use crate::types::{CanonicalType, GraphqlScalar};

pub use mutation::{
    ActivePlan, InputFieldPlan, KeyAssignment, PrimaryKeyPlan, ServerAssignment,
    MINTED_SUFFIX_HEX_WIDTH,
};
pub use operation::{
    list_args, page_fields, shared_enums, shared_inputs, ArgPlan, EnumDecl, InputDecl,
    OperationKind, OperationPlan, RootType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    pub look_aside_cache: bool,
    pub default_page_limit: u64,
}

impl Default for PlanOptions {
    fn default() -> Self {
        PlanOptions {
            look_aside_cache: false,
            default_page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// GraphQL names derived from one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractNames {
    pub type_name: String,
    pub page_type: String,
    pub input_type: String,
    pub single_query: String,
    pub list_query: String,
    pub create_mutation: String,
    pub update_mutation: String,
    pub delete_mutation: String,
    pub toggle_mutation: String,
}

impl ContractNames {
    pub fn for_entity(entity: &str) -> Self {
        let type_name = naming::type_name(entity);
        ContractNames {
            page_type: format!("{}Page", type_name),
            input_type: format!("{}Input", type_name),
            single_query: naming::field_name(entity),
            list_query: naming::list_field_name(entity),
            create_mutation: format!("create{}", type_name),
            update_mutation: format!("update{}", type_name),
            delete_mutation: format!("delete{}", type_name),
            toggle_mutation: format!("toggle{}Active", type_name),
            type_name,
        }
    }
}

/// A column field of the object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    pub column: String,
    pub type_ref: TypeRef,
    pub canonical: CanonicalType,
}

/// A lazily resolved foreign-key field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationPlan {
    pub field: String,
    pub column: String,
    pub target_entity: String,
    pub target_type: String,
    pub uses_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityPlan {
    pub entity: String,
    pub description: Option<String>,
    pub names: ContractNames,
    pub primary_key: PrimaryKeyPlan,
    pub fields: Vec<FieldPlan>,
    pub relations: Vec<RelationPlan>,
    pub inputs: Vec<InputFieldPlan>,
    /// Column names accepted in `filter` and `orderBy`
    pub whitelist: Vec<String>,
    pub operations: Vec<OperationPlan>,
    pub create_assignments: Vec<ServerAssignment>,
    pub update_assignments: Vec<ServerAssignment>,
    pub active: Option<ActivePlan>,
}

impl EntityPlan {
    pub fn operation(&self, kind: OperationKind) -> Option<&OperationPlan> {
        self.operations.iter().find(|op| op.kind == kind)
    }

    pub fn input(&self, column: &str) -> Option<&InputFieldPlan> {
        self.inputs.iter().find(|f| f.column == column)
    }

    /// Writable columns that are not the primary key.
    pub fn data_inputs(&self) -> impl Iterator<Item = &InputFieldPlan> {
        self.inputs.iter().filter(|f| !f.is_primary_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionPlan {
    pub entities: Vec<EntityPlan>,
    pub look_aside_cache: bool,
    pub default_page_limit: u64,
}

impl EmissionPlan {
    /// Build the plan for every entity in declaration order, with
    /// backend-handled columns already injected.
    pub fn build(schema: &AnalyzedSchema, options: &PlanOptions) -> Result<Self> {
        let mut plan = EmissionPlan {
            entities: schema
                .entities()
                .map(|entity| plan_entity(entity, schema, options))
                .collect::<Result<Vec<_>>>()?,
            look_aside_cache: options.look_aside_cache,
            default_page_limit: options.default_page_limit,
        };

        check_collisions(&plan)?;
        BackendColumnInjector::new(schema).apply(&mut plan);

        Ok(plan)
    }

    pub fn entity(&self, name: &str) -> Option<&EntityPlan> {
        self.entities.iter().find(|e| e.entity == name)
    }

    pub fn operations(&self, root: RootType) -> impl Iterator<Item = (&EntityPlan, &OperationPlan)> {
        self.entities.iter().flat_map(move |entity| {
            entity
                .operations
                .iter()
                .filter(move |op| op.root == root)
                .map(move |op| (entity, op))
        })
    }
}

fn plan_entity(
    entity: &AnalyzedEntity,
    schema: &AnalyzedSchema,
    options: &PlanOptions,
) -> Result<EntityPlan> {
    let names = ContractNames::for_entity(&entity.name);

    let fields = entity
        .columns
        .values()
        .map(|column| FieldPlan {
            column: column.name.clone(),
            type_ref: if column.is_primary_key {
                TypeRef::scalar(GraphqlScalar::Id).non_null()
            } else {
                TypeRef::scalar(column.graphql_scalar)
            },
            canonical: column.canonical_type,
        })
        .collect();

    let mut relations = Vec::new();
    for column in entity.foreign_keys() {
        let Some(target) = column.referenced_entity.as_deref() else {
            continue;
        };
        let target = schema.require_entity(target)?;
        let field = naming::relation_field_name(&column.name, |candidate| {
            entity.has_column(candidate)
                || relations.iter().any(|r: &RelationPlan| r.field == candidate)
        });
        relations.push(RelationPlan {
            field,
            column: column.name.clone(),
            target_entity: target.name.clone(),
            target_type: naming::type_name(&target.name),
            uses_cache: options.look_aside_cache,
        });
    }

    let active = entity.has_active_column.then(|| {
        let column = schema.roles().active_column().unwrap_or_default();
        ActivePlan {
            column: column.to_string(),
            canonical: entity
                .column(column)
                .map(|c| c.canonical_type)
                .unwrap_or(CanonicalType::Boolean),
        }
    });

    Ok(EntityPlan {
        entity: entity.name.clone(),
        description: entity.description.clone(),
        operations: operation::operations_for(&names, active.is_some(), options.look_aside_cache),
        names,
        primary_key: PrimaryKeyPlan::of(entity),
        fields,
        relations,
        inputs: mutation::candidate_inputs(entity),
        whitelist: entity.column_names().map(str::to_string).collect(),
        create_assignments: Vec::new(),
        update_assignments: Vec::new(),
        active,
    })
}

/// Type names and root field names must be unique across the whole schema.
fn check_collisions(plan: &EmissionPlan) -> Result<()> {
    let mut types: HashMap<String, String> = HashMap::new();
    for shared in [
        names::SORT_INPUT,
        names::FILTER_INPUT,
        names::SORT_DIRECTION,
        names::FILTER_OPERATOR,
        RootType::Query.type_name(),
        RootType::Mutation.type_name(),
    ] {
        types.insert(shared.to_string(), "built-in".to_string());
    }

    let mut roots: HashMap<(RootType, String), String> = HashMap::new();

    for entity in &plan.entities {
        for type_name in [
            &entity.names.type_name,
            &entity.names.page_type,
            &entity.names.input_type,
        ] {
            if let Some(first) = types.insert(type_name.clone(), entity.entity.clone()) {
                return Err(PolyApiError::NameCollision {
                    name: type_name.clone(),
                    first,
                    second: entity.entity.clone(),
                });
            }
        }

        for op in &entity.operations {
            if let Some(first) = roots.insert((op.root, op.field.clone()), entity.entity.clone()) {
                return Err(PolyApiError::NameCollision {
                    name: op.field.clone(),
                    first,
                    second: entity.entity.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::ast::*;
    use crate::fixtures::shop_schema;
    use pretty_assertions::assert_eq;

    fn plan() -> EmissionPlan {
        EmissionPlan::build(&shop_schema(), &PlanOptions::default()).unwrap()
    }

    // ─── NAMES ───

    #[test]
    fn test_contract_names() {
        let names = ContractNames::for_entity("order_item");

        assert_eq!(names.type_name, "OrderItem");
        assert_eq!(names.page_type, "OrderItemPage");
        assert_eq!(names.input_type, "OrderItemInput");
        assert_eq!(names.single_query, "orderItem");
        assert_eq!(names.list_query, "orderItems");
        assert_eq!(names.create_mutation, "createOrderItem");
        assert_eq!(names.update_mutation, "updateOrderItem");
        assert_eq!(names.delete_mutation, "deleteOrderItem");
        assert_eq!(names.toggle_mutation, "toggleOrderItemActive");
    }

    // ─── OPERATIONS ───

    #[test]
    fn test_toggle_only_with_active_column() {
        let plan = plan();

        assert!(plan.entity("order").unwrap().operation(OperationKind::ToggleActive).is_some());
        assert!(plan.entity("customer").unwrap().operation(OperationKind::ToggleActive).is_none());
    }

    #[test]
    fn test_operation_signatures() {
        let plan = plan();
        let order = plan.entity("order").unwrap();

        let signature = |kind| {
            let op = order.operation(kind).unwrap();
            let args: Vec<String> = op.args.iter().map(|a| format!("{}: {}", a.name, a.type_ref)).collect();
            format!("{}({}): {}", op.field, args.join(", "), op.returns)
        };

        assert_eq!(signature(OperationKind::GetById), "order(id: ID!): Order");
        assert_eq!(
            signature(OperationKind::List),
            "orders(limit: Int, offset: Int, page: Int, orderBy: [SortInput], filter: [FilterInput]): OrderPage"
        );
        assert_eq!(signature(OperationKind::Create), "createOrder(input: OrderInput!): Order");
        assert_eq!(signature(OperationKind::Update), "updateOrder(id: ID!, input: OrderInput!): Order");
        assert_eq!(signature(OperationKind::Delete), "deleteOrder(id: ID!): Boolean");
        assert_eq!(
            signature(OperationKind::ToggleActive),
            "toggleOrderActive(id: ID!, active: Boolean!): Order"
        );
    }

    #[test]
    fn test_cache_flag_reaches_lookups() {
        let options = PlanOptions {
            look_aside_cache: true,
            ..PlanOptions::default()
        };
        let plan = EmissionPlan::build(&shop_schema(), &options).unwrap();
        let order = plan.entity("order").unwrap();

        assert!(order.operation(OperationKind::GetById).unwrap().uses_cache);
        assert!(!order.operation(OperationKind::List).unwrap().uses_cache);
        assert!(order.relations.iter().all(|r| r.uses_cache));
    }

    // ─── FIELDS ───

    #[test]
    fn test_relations_follow_foreign_keys() {
        let plan = plan();
        let item = plan.entity("order_item").unwrap();
        let relations: Vec<(&str, &str)> = item
            .relations
            .iter()
            .map(|r| (r.field.as_str(), r.target_type.as_str()))
            .collect();

        assert_eq!(relations, vec![("order", "Order"), ("product", "Product")]);
    }

    #[test]
    fn test_mutual_references_are_planned() {
        let plan = plan();
        assert_eq!(plan.entity("employee").unwrap().relations[0].target_type, "Team");
        assert_eq!(plan.entity("team").unwrap().relations[0].target_type, "Employee");
    }

    #[test]
    fn test_primary_key_field_is_non_null_id() {
        let plan = plan();
        let order = plan.entity("order").unwrap();

        assert_eq!(order.fields[0].column, "order_id");
        assert_eq!(order.fields[0].type_ref.to_string(), "ID!");
        assert_eq!(order.fields[3].type_ref.to_string(), "Float");
    }

    #[test]
    fn test_whitelist_is_every_column() {
        let plan = plan();
        assert_eq!(plan.entity("customer").unwrap().whitelist, vec!["customer_id", "name", "email", "time_edit"]);
    }

    // ─── COLLISIONS ───

    #[test]
    fn test_root_field_collision() {
        let mut doc = SchemaDocument::new();
        for name in ["order", "orders"] {
            doc.add_entity(
                EntityDefinition::new(name)
                    .column(ColumnDefinition::new("id", "int").primary(PrimaryKeyStrategy::DatabaseDefault)),
            );
        }
        let schema = analyze(&doc, RoleBinding::default(), BackendBinding::default()).unwrap();
        let err = EmissionPlan::build(&schema, &PlanOptions::default()).unwrap_err();

        assert!(matches!(err, PolyApiError::NameCollision { name, .. } if name == "orders"));
    }

    #[test]
    fn test_type_collision_with_shared_types() {
        let mut doc = SchemaDocument::new();
        doc.add_entity(
            EntityDefinition::new("sort_input")
                .column(ColumnDefinition::new("id", "int").primary(PrimaryKeyStrategy::DatabaseDefault)),
        );
        let schema = analyze(&doc, RoleBinding::default(), BackendBinding::default()).unwrap();

        assert!(matches!(
            EmissionPlan::build(&schema, &PlanOptions::default()),
            Err(PolyApiError::NameCollision { .. })
        ));
    }
}
