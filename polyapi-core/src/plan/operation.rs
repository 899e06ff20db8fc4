use serde::Serialize;

use crate::emit::TypeRef;
use crate::query::{names, FilterOperator, SortDirection, ENVELOPE_FIELDS};
use crate::types::GraphqlScalar;

use super::ContractNames;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    GetById,
    List,
    Create,
    Update,
    Delete,
    ToggleActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RootType {
    Query,
    Mutation,
}

impl RootType {
    pub fn type_name(&self) -> &'static str {
        match self {
            RootType::Query => "Query",
            RootType::Mutation => "Mutation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgPlan {
    pub name: String,
    pub type_ref: TypeRef,
    /// GraphQL literal, e.g. `ASC`
    pub default: Option<String>,
}

impl ArgPlan {
    fn new(name: &str, type_ref: TypeRef) -> Self {
        ArgPlan {
            name: name.to_string(),
            type_ref,
            default: None,
        }
    }

    fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }
}

/// One root field: what it is called, what it takes, what it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPlan {
    pub kind: OperationKind,
    pub root: RootType,
    pub field: String,
    pub args: Vec<ArgPlan>,
    pub returns: TypeRef,
    /// Consults the look-aside cache before querying
    pub uses_cache: bool,
}

fn id_arg() -> ArgPlan {
    ArgPlan::new(names::ARG_ID, TypeRef::scalar(GraphqlScalar::Id).non_null())
}

/// Arguments shared by every list query.
pub fn list_args() -> Vec<ArgPlan> {
    let int = || TypeRef::scalar(GraphqlScalar::Int);
    vec![
        ArgPlan::new(names::ARG_LIMIT, int()),
        ArgPlan::new(names::ARG_OFFSET, int()),
        ArgPlan::new(names::ARG_PAGE, int()),
        ArgPlan::new(names::ARG_ORDER_BY, TypeRef::named(names::SORT_INPUT).list()),
        ArgPlan::new(names::ARG_FILTER, TypeRef::named(names::FILTER_INPUT).list()),
    ]
}

pub(crate) fn operations_for(
    names: &ContractNames,
    has_active: bool,
    look_aside_cache: bool,
) -> Vec<OperationPlan> {
    let entity = || TypeRef::named(names.type_name.clone());
    let input = || TypeRef::named(names.input_type.clone()).non_null();

    let mut ops = vec![
        OperationPlan {
            kind: OperationKind::GetById,
            root: RootType::Query,
            field: names.single_query.clone(),
            args: vec![id_arg()],
            returns: entity(),
            uses_cache: look_aside_cache,
        },
        OperationPlan {
            kind: OperationKind::List,
            root: RootType::Query,
            field: names.list_query.clone(),
            args: list_args(),
            returns: TypeRef::named(names.page_type.clone()),
            uses_cache: false,
        },
        OperationPlan {
            kind: OperationKind::Create,
            root: RootType::Mutation,
            field: names.create_mutation.clone(),
            args: vec![ArgPlan::new(names::ARG_INPUT, input())],
            returns: entity(),
            uses_cache: false,
        },
        OperationPlan {
            kind: OperationKind::Update,
            root: RootType::Mutation,
            field: names.update_mutation.clone(),
            args: vec![id_arg(), ArgPlan::new(names::ARG_INPUT, input())],
            returns: entity(),
            uses_cache: false,
        },
        OperationPlan {
            kind: OperationKind::Delete,
            root: RootType::Mutation,
            field: names.delete_mutation.clone(),
            args: vec![id_arg()],
            returns: TypeRef::scalar(GraphqlScalar::Boolean),
            uses_cache: false,
        },
    ];

    if has_active {
        ops.push(OperationPlan {
            kind: OperationKind::ToggleActive,
            root: RootType::Mutation,
            field: names.toggle_mutation.clone(),
            args: vec![
                id_arg(),
                ArgPlan::new(names::ARG_ACTIVE, TypeRef::scalar(GraphqlScalar::Boolean).non_null()),
            ],
            returns: entity(),
            uses_cache: false,
        });
    }

    ops
}

/// `EPage` fields in envelope order.
pub fn page_fields(item_type: &str) -> Vec<(&'static str, TypeRef)> {
    let int = || TypeRef::scalar(GraphqlScalar::Int).non_null();
    let boolean = || TypeRef::scalar(GraphqlScalar::Boolean).non_null();

    ENVELOPE_FIELDS
        .iter()
        .map(|name| {
            let type_ref = match *name {
                "items" => TypeRef::named(item_type).non_null().list().non_null(),
                "hasNext" | "hasPrevious" => boolean(),
                _ => int(),
            };
            (*name, type_ref)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub name: &'static str,
    pub values: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDecl {
    pub name: &'static str,
    pub fields: Vec<ArgPlan>,
}

/// `SortDirection` and `FilterOperator`.
pub fn shared_enums() -> Vec<EnumDecl> {
    vec![
        EnumDecl {
            name: names::SORT_DIRECTION,
            values: SortDirection::ALL.iter().map(SortDirection::as_graphql).collect(),
        },
        EnumDecl {
            name: names::FILTER_OPERATOR,
            values: FilterOperator::ALL.iter().map(FilterOperator::as_graphql).collect(),
        },
    ]
}

/// `SortInput` and `FilterInput`.
pub fn shared_inputs() -> Vec<InputDecl> {
    let string = || TypeRef::scalar(GraphqlScalar::String).non_null();
    vec![
        InputDecl {
            name: names::SORT_INPUT,
            fields: vec![
                ArgPlan::new(names::FIELD_FIELD, string()),
                ArgPlan::new(names::FIELD_DIRECTION, TypeRef::named(names::SORT_DIRECTION))
                    .with_default(SortDirection::default().as_graphql()),
            ],
        },
        InputDecl {
            name: names::FILTER_INPUT,
            fields: vec![
                ArgPlan::new(names::FIELD_FIELD, string()),
                ArgPlan::new(names::FIELD_VALUE, string()),
                ArgPlan::new(names::FIELD_OPERATOR, TypeRef::named(names::FILTER_OPERATOR))
                    .with_default(FilterOperator::default().as_graphql()),
            ],
        },
    ]
}
