//! Reads rendered SDL back into a [`ContractSurface`].
//!
//! Only the subset the SDL-first profiles write is understood: `type`,
//! `input` and `enum` blocks, block descriptions, field arguments and
//! argument defaults.

use crate::emit::{ContractArg, ContractKind, ContractSurface, TypeRef};
use crate::error::{PolyApiError, Result};

const DESCRIPTION: &str = "\"\"\"";

fn malformed(line: usize, message: impl Into<String>) -> PolyApiError {
    PolyApiError::MalformedSdl {
        line,
        message: message.into(),
    }
}

fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `[Order!]!` → `NonNull(List(NonNull(Named("Order"))))`
pub fn parse_type_ref(text: &str) -> Option<TypeRef> {
    let text = text.trim();
    if let Some(inner) = text.strip_suffix('!') {
        return match parse_type_ref(inner)? {
            TypeRef::NonNull(_) => None,
            inner => Some(TypeRef::NonNull(Box::new(inner))),
        };
    }
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return Some(parse_type_ref(inner)?.list());
    }
    is_name(text).then(|| TypeRef::named(text))
}

/// `name: Type` with an optional `= default`.
fn input_value(text: &str) -> Option<(&str, TypeRef, Option<&str>)> {
    let (declaration, default) = match text.split_once(" = ") {
        Some((declaration, default)) => (declaration, Some(default.trim())),
        None => (text, None),
    };
    let (name, type_ref) = declaration.split_once(':')?;
    let name = name.trim();
    if !is_name(name) {
        return None;
    }
    Some((name, parse_type_ref(type_ref)?, default))
}

/// `name(arg: Type, ...): Type` or `name: Type`.
fn object_field(text: &str) -> Option<(&str, Vec<ContractArg>, TypeRef)> {
    let Some(open) = text.find('(') else {
        let (name, type_ref, default) = input_value(text)?;
        return default.is_none().then_some((name, Vec::new(), type_ref));
    };
    let close = text.rfind(')')?;
    let name = text[..open].trim();
    let returns = text.get(close + 1..)?.trim().strip_prefix(':')?;
    if !is_name(name) || close < open {
        return None;
    }

    let mut args = Vec::new();
    let arg_text = text[open + 1..close].trim();
    if !arg_text.is_empty() {
        for arg in arg_text.split(", ") {
            let (arg_name, type_ref, default) = input_value(arg)?;
            let arg = ContractArg::new(arg_name, &type_ref);
            args.push(match default {
                Some(default) => arg.with_default(default),
                None => arg,
            });
        }
    }
    Some((name, args, parse_type_ref(returns)?))
}

pub fn read_contract(sdl: &str) -> Result<ContractSurface> {
    let mut contract = ContractSurface::new();
    let mut current: Option<(String, ContractKind)> = None;
    let mut in_description = false;
    let mut last_line = 0;

    for (index, raw) in sdl.lines().enumerate() {
        let line_no = index + 1;
        last_line = line_no;
        let line = raw.trim();

        if in_description {
            in_description = line != DESCRIPTION;
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(rest) = line.strip_prefix(DESCRIPTION) {
            in_description = rest.is_empty() || !rest.ends_with(DESCRIPTION);
            continue;
        }

        let Some((type_name, kind)) = current.clone() else {
            let header = line
                .strip_suffix('{')
                .map(str::trim)
                .ok_or_else(|| malformed(line_no, format!("expected a definition, found '{}'", line)))?;
            let (keyword, name) = header
                .split_once(' ')
                .ok_or_else(|| malformed(line_no, format!("definition '{}' has no name", header)))?;
            let kind = match keyword {
                "type" => ContractKind::Object,
                "input" => ContractKind::Input,
                "enum" => ContractKind::Enum,
                other => return Err(malformed(line_no, format!("unsupported definition '{}'", other))),
            };
            let name = name.trim();
            if !is_name(name) {
                return Err(malformed(line_no, format!("invalid type name '{}'", name)));
            }
            contract.declare(name, kind);
            current = Some((name.to_string(), kind));
            continue;
        };

        if line == "}" {
            current = None;
            continue;
        }

        match kind {
            ContractKind::Enum if is_name(line) => contract.enum_value(&type_name, line),
            ContractKind::Input => {
                let (name, type_ref, default) = input_value(line)
                    .ok_or_else(|| malformed(line_no, format!("invalid input field '{}'", line)))?;
                contract.input_field(&type_name, name, &type_ref, default);
            }
            ContractKind::Object => {
                let (name, args, type_ref) = object_field(line)
                    .ok_or_else(|| malformed(line_no, format!("invalid field '{}'", line)))?;
                contract.field_with_args(&type_name, name, &type_ref, args);
            }
            ContractKind::Enum => {
                return Err(malformed(line_no, format!("invalid enum value '{}'", line)));
            }
        }
    }

    if let Some((name, _)) = current {
        return Err(malformed(last_line, format!("'{}' is never closed", name)));
    }
    if in_description {
        return Err(malformed(last_line, "unterminated description"));
    }
    Ok(contract)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SDL: &str = r#"
enum SortDirection {
  ASC
  DESC
}

input SortInput {
  field: String!
  direction: SortDirection = ASC
}

"""
Customer orders
"""
type Order {
  order_id: ID!
  status: String
}

type Query {
  orders(limit: Int, orderBy: [SortInput]): [Order!]!
  order(id: ID!): Order
}
"#;

    #[test]
    fn test_read_contract() {
        let contract = read_contract(SDL).unwrap();

        let names: Vec<&str> = contract.type_names().collect();
        assert_eq!(names, vec!["SortDirection", "SortInput", "Order", "Query"]);

        let sort = contract.get("SortInput").unwrap();
        assert_eq!(sort.fields[1].type_ref, "SortDirection");
        assert_eq!(sort.fields[1].default.as_deref(), Some("ASC"));

        let query = contract.get("Query").unwrap();
        assert_eq!(query.fields[0].type_ref, "[Order!]!");
        assert_eq!(query.fields[0].args[1], ContractArg::new("orderBy", &TypeRef::named("SortInput").list()));
        assert_eq!(query.fields[1].args[0].type_ref, "ID!");
    }

    #[test]
    fn test_read_matches_recorded_surface() {
        let mut recorded = ContractSurface::new();
        recorded.declare("SortDirection", ContractKind::Enum);
        recorded.enum_value("SortDirection", "ASC");
        recorded.enum_value("SortDirection", "DESC");
        recorded.declare("SortInput", ContractKind::Input);
        recorded.input_field("SortInput", "field", &TypeRef::named("String").non_null(), None);
        recorded.input_field("SortInput", "direction", &TypeRef::named("SortDirection"), Some("ASC"));
        recorded.declare("Order", ContractKind::Object);
        recorded.field("Order", "order_id", &TypeRef::named("ID").non_null());
        recorded.field("Order", "status", &TypeRef::named("String"));
        recorded.declare("Query", ContractKind::Object);
        recorded.field_with_args(
            "Query",
            "orders",
            &TypeRef::named("Order").non_null().list().non_null(),
            vec![
                ContractArg::new("limit", &TypeRef::named("Int")),
                ContractArg::new("orderBy", &TypeRef::named("SortInput").list()),
            ],
        );
        recorded.field_with_args(
            "Query",
            "order",
            &TypeRef::named("Order"),
            vec![ContractArg::new("id", &TypeRef::named("ID").non_null())],
        );

        let read = read_contract(SDL).unwrap();
        assert!(recorded.diff(&read).is_empty(), "{:#?}", recorded.diff(&read));
    }

    #[test]
    fn test_parse_type_ref() {
        assert_eq!(
            parse_type_ref("[Order!]!"),
            Some(TypeRef::named("Order").non_null().list().non_null())
        );
        assert_eq!(parse_type_ref("Int!!"), None);
        assert_eq!(parse_type_ref("[Int"), None);
        assert_eq!(parse_type_ref("2nd"), None);
    }

    #[test]
    fn test_malformed_sdl_names_the_line() {
        let err = read_contract("type Order {\n  status String\n}\n").unwrap_err();
        assert!(matches!(err, PolyApiError::MalformedSdl { line: 2, .. }), "{}", err);

        let err = read_contract("scalar Date {\n}\n").unwrap_err();
        assert!(matches!(err, PolyApiError::MalformedSdl { line: 1, .. }));

        let err = read_contract("type Order {\n  status: String\n").unwrap_err();
        assert!(matches!(err, PolyApiError::MalformedSdl { line: 2, .. }));
    }
}
