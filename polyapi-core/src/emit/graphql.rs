//! GraphQL type references and the contract surface a profile renders.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::types::GraphqlScalar;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    NonNull(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> TypeRef {
        TypeRef::Named(name.into())
    }

    pub fn scalar(scalar: GraphqlScalar) -> TypeRef {
        TypeRef::Named(scalar.as_str().to_string())
    }

    pub fn non_null(self) -> TypeRef {
        match self {
            already @ TypeRef::NonNull(_) => already,
            other => TypeRef::NonNull(Box::new(other)),
        }
    }

    pub fn list(self) -> TypeRef {
        TypeRef::List(Box::new(self))
    }

    /// Innermost named type.
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::NonNull(inner) | TypeRef::List(inner) => inner.base_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }
}

/// SDL spelling: `[Order!]!`
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContractKind {
    Object,
    Input,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractArg {
    pub name: String,
    pub type_ref: String,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractField {
    pub name: String,
    pub type_ref: String,
    pub args: Vec<ContractArg>,
    /// Input object fields only
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractType {
    pub name: String,
    pub kind: ContractKind,
    pub fields: Vec<ContractField>,
    pub values: Vec<String>,
}

/// Everything externally observable about a rendered GraphQL schema: type,
/// field and argument names with their type spellings, and enum values.
///
/// Built from what was actually rendered: recorded entry by entry while a
/// profile writes its declarations, or read back from SDL text with
/// [`read_contract`](crate::emit::sdl::read_contract).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ContractSurface {
    types: IndexMap<String, ContractType>,
}

impl ContractSurface {
    pub fn new() -> Self {
        ContractSurface::default()
    }

    pub fn declare(&mut self, name: &str, kind: ContractKind) {
        self.types
            .entry(name.to_string())
            .or_insert_with(|| ContractType {
                name: name.to_string(),
                kind,
                fields: Vec::new(),
                values: Vec::new(),
            });
    }

    pub fn field(&mut self, type_name: &str, field: &str, type_ref: &TypeRef) {
        self.field_with_args(type_name, field, type_ref, Vec::new());
    }

    pub fn field_with_args(
        &mut self,
        type_name: &str,
        field: &str,
        type_ref: &TypeRef,
        args: Vec<ContractArg>,
    ) {
        if let Some(ty) = self.types.get_mut(type_name) {
            ty.fields.push(ContractField {
                name: field.to_string(),
                type_ref: type_ref.to_string(),
                args,
                default: None,
            });
        }
    }

    pub fn input_field(&mut self, type_name: &str, field: &str, type_ref: &TypeRef, default: Option<&str>) {
        if let Some(ty) = self.types.get_mut(type_name) {
            ty.fields.push(ContractField {
                name: field.to_string(),
                type_ref: type_ref.to_string(),
                args: Vec::new(),
                default: default.map(str::to_string),
            });
        }
    }

    pub fn enum_value(&mut self, type_name: &str, value: &str) {
        if let Some(ty) = self.types.get_mut(type_name) {
            ty.values.push(value.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&ContractType> {
        self.types.get(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Human-readable differences; empty when both surfaces match. Type
    /// declaration order is not part of the contract, field order is.
    pub fn diff(&self, other: &ContractSurface) -> Vec<String> {
        let mut differences = Vec::new();

        for (name, ty) in &self.types {
            match other.types.get(name) {
                None => differences.push(format!("type {} missing on the right", name)),
                Some(theirs) if theirs != ty => {
                    differences.push(format!("type {} differs: {:?} vs {:?}", name, ty, theirs))
                }
                Some(_) => {}
            }
        }
        for name in other.types.keys() {
            if !self.types.contains_key(name) {
                differences.push(format!("type {} missing on the left", name));
            }
        }

        differences
    }
}

impl ContractArg {
    pub fn new(name: &str, type_ref: &TypeRef) -> Self {
        ContractArg {
            name: name.to_string(),
            type_ref: type_ref.to_string(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_ref_display() {
        let items = TypeRef::named("Order").non_null().list().non_null();
        assert_eq!(items.to_string(), "[Order!]!");
        assert_eq!(items.base_name(), "Order");
        assert_eq!(TypeRef::scalar(GraphqlScalar::Id).non_null().non_null().to_string(), "ID!");
    }

    #[test]
    fn test_diff_ignores_type_order() {
        let mut left = ContractSurface::new();
        left.declare("A", ContractKind::Object);
        left.declare("B", ContractKind::Enum);
        left.enum_value("B", "X");

        let mut right = ContractSurface::new();
        right.declare("B", ContractKind::Enum);
        right.enum_value("B", "X");
        right.declare("A", ContractKind::Object);

        assert!(left.diff(&right).is_empty());
    }

    #[test]
    fn test_diff_reports_field_mismatch() {
        let mut left = ContractSurface::new();
        left.declare("A", ContractKind::Object);
        left.field("A", "id", &TypeRef::named("ID").non_null());

        let mut right = ContractSurface::new();
        right.declare("A", ContractKind::Object);
        right.field("A", "id", &TypeRef::named("ID"));

        assert_eq!(left.diff(&right).len(), 1);
    }
}
