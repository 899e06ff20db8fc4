use crate::emit::escape::php_string;
use crate::emit::{ContractArg, ContractKind, ContractSurface, SourceFile, Stmt, TypeRef, TypeRegistry};
use crate::error::Result;
use crate::plan::{page_fields, shared_enums, shared_inputs, EmissionPlan, EntityPlan, RootType};

use super::accessor;

const HEADER: [&str; 5] = ["<?php", "", "declare(strict_types=1);", "", "namespace App;"];

/// Resolve a type reference to a graphql-php type expression.
fn php_type(registry: &TypeRegistry<String>, type_ref: &TypeRef) -> Result<String> {
    Ok(match type_ref {
        TypeRef::Named(name) => registry.resolve(name)?.clone(),
        TypeRef::NonNull(inner) => format!("Type::nonNull({})", php_type(registry, inner)?),
        TypeRef::List(inner) => format!("Type::listOf({})", php_type(registry, inner)?),
    })
}

/// `'type' => ..., 'defaultValue' => ...`
fn value_spec(registry: &TypeRegistry<String>, type_ref: &TypeRef, default: Option<&str>) -> Result<String> {
    let mut spec = format!("'type' => {}", php_type(registry, type_ref)?);
    if let Some(default) = default {
        spec.push_str(&format!(", 'defaultValue' => {}", php_string(default)));
    }
    Ok(spec)
}

// Each writer below records into the contract the same name, type and
// default it writes.

fn name_entry(contract: &mut ContractSurface, name: &str, kind: ContractKind) -> Stmt {
    contract.declare(name, kind);
    Stmt::line(format!("'name' => {},", php_string(name)))
}

fn output_entry(
    registry: &TypeRegistry<String>,
    contract: &mut ContractSurface,
    owner: &str,
    name: &str,
    type_ref: &TypeRef,
) -> Result<Stmt> {
    let spec = value_spec(registry, type_ref, None)?;
    contract.field(owner, name, type_ref);
    Ok(Stmt::line(format!("{} => [{}],", php_string(name), spec)))
}

fn input_entry(
    registry: &TypeRegistry<String>,
    contract: &mut ContractSurface,
    owner: &str,
    name: &str,
    type_ref: &TypeRef,
    default: Option<&str>,
) -> Result<Stmt> {
    let spec = value_spec(registry, type_ref, default)?;
    contract.input_field(owner, name, type_ref, default);
    Ok(Stmt::line(format!("{} => [{}],", php_string(name), spec)))
}

/// An `'args'` entry and the argument it declares.
fn arg_entry(
    registry: &TypeRegistry<String>,
    name: &str,
    type_ref: &TypeRef,
    default: Option<&str>,
) -> Result<(Stmt, ContractArg)> {
    let spec = value_spec(registry, type_ref, default)?;
    let arg = ContractArg::new(name, type_ref);
    let arg = match default {
        Some(default) => arg.with_default(default),
        None => arg,
    };
    Ok((Stmt::line(format!("{} => [{}],", php_string(name), spec)), arg))
}

fn header(file: &mut SourceFile) {
    for line in HEADER {
        file.line(line);
    }
    file.blank();
}

/// `public static function order(): ObjectType` with a memoized body.
fn accessor_method(type_name: &str, class: &str, body: Vec<Stmt>) -> Vec<Stmt> {
    vec![
        Stmt::Blank,
        Stmt::line(format!(
            "public static function {}(): {}",
            accessor(type_name),
            class
        )),
        Stmt::block(
            "{",
            vec![Stmt::block(
                format!(
                    "return self::$types[{}] ??= new {}([",
                    php_string(type_name),
                    class
                ),
                body,
                "]);",
            )],
            "}",
        ),
    ]
}

fn lazy_fields(entries: Vec<Stmt>) -> Stmt {
    Stmt::block("'fields' => fn (): array => [", entries, "],")
}

/// Pass 2 for every declared type, written into `Types.php`.
pub(super) fn types_file(
    plan: &EmissionPlan,
    registry: &TypeRegistry<String>,
    contract: &mut ContractSurface,
) -> Result<SourceFile> {
    let mut file = SourceFile::new("php/src/Types.php");
    header(&mut file);
    for entity in &plan.entities {
        file.line(format!("use App\\Resolvers\\{}Resolver;", entity.names.type_name));
    }
    for class in ["EnumType", "InputObjectType", "ObjectType", "Type"] {
        file.line(format!("use GraphQL\\Type\\Definition\\{};", class));
    }
    file.blank();

    let mut body = vec![Stmt::line("private static array $types = [];")];

    for decl in shared_enums() {
        let name = name_entry(contract, decl.name, ContractKind::Enum);
        let mut values = Vec::new();
        for value in &decl.values {
            contract.enum_value(decl.name, value);
            values.push(php_string(value));
        }
        body.extend(accessor_method(
            decl.name,
            "EnumType",
            vec![name, Stmt::line(format!("'values' => [{}],", values.join(", ")))],
        ));
    }

    for decl in shared_inputs() {
        let name = name_entry(contract, decl.name, ContractKind::Input);
        let mut entries = Vec::new();
        for field in &decl.fields {
            entries.push(input_entry(
                registry,
                contract,
                decl.name,
                &field.name,
                &field.type_ref,
                field.default.as_deref(),
            )?);
        }
        body.extend(accessor_method(decl.name, "InputObjectType", vec![name, lazy_fields(entries)]));
    }

    for entity in &plan.entities {
        body.extend(object_type(entity, registry, contract)?);
        body.extend(page_type(entity, registry, contract)?);
        body.extend(input_type(entity, registry, contract)?);
    }

    file.line("final class Types");
    file.push(Stmt::block("{", body, "}"));
    Ok(file)
}

fn object_type(
    entity: &EntityPlan,
    registry: &TypeRegistry<String>,
    contract: &mut ContractSurface,
) -> Result<Vec<Stmt>> {
    let name = &entity.names.type_name;
    let mut body = vec![name_entry(contract, name, ContractKind::Object)];

    let mut entries = Vec::new();
    for field in &entity.fields {
        entries.push(output_entry(registry, contract, name, &field.column, &field.type_ref)?);
    }
    for relation in &entity.relations {
        let type_ref = TypeRef::named(relation.target_type.clone());
        let type_expression = php_type(registry, &type_ref)?;
        contract.field(name, &relation.field, &type_ref);
        entries.push(Stmt::block(
            format!("{} => [", php_string(&relation.field)),
            vec![
                Stmt::line(format!("'type' => {},", type_expression)),
                Stmt::line(format!(
                    "'resolve' => fn (array $row): ?array => {}Resolver::{}($row),",
                    name,
                    super::resolvers::relation_method(&relation.field)
                )),
            ],
            "],",
        ));
    }

    if let Some(description) = &entity.description {
        body.push(Stmt::line(format!("'description' => {},", php_string(description))));
    }
    body.push(lazy_fields(entries));

    Ok(accessor_method(name, "ObjectType", body))
}

fn page_type(
    entity: &EntityPlan,
    registry: &TypeRegistry<String>,
    contract: &mut ContractSurface,
) -> Result<Vec<Stmt>> {
    let name = &entity.names.page_type;
    let name_line = name_entry(contract, name, ContractKind::Object);

    let mut entries = Vec::new();
    for (field, type_ref) in page_fields(&entity.names.type_name) {
        entries.push(output_entry(registry, contract, name, field, &type_ref)?);
    }

    Ok(accessor_method(name, "ObjectType", vec![name_line, lazy_fields(entries)]))
}

fn input_type(
    entity: &EntityPlan,
    registry: &TypeRegistry<String>,
    contract: &mut ContractSurface,
) -> Result<Vec<Stmt>> {
    let name = &entity.names.input_type;
    let name_line = name_entry(contract, name, ContractKind::Input);

    let mut entries = Vec::new();
    for field in &entity.inputs {
        entries.push(input_entry(registry, contract, name, &field.column, &field.type_ref, None)?);
    }

    Ok(accessor_method(name, "InputObjectType", vec![name_line, lazy_fields(entries)]))
}

/// `Schema.php`: the `Query` and `Mutation` roots wired to the resolvers.
pub(super) fn schema_file(
    plan: &EmissionPlan,
    registry: &TypeRegistry<String>,
    contract: &mut ContractSurface,
) -> Result<SourceFile> {
    let mut file = SourceFile::new("php/src/Schema.php");
    header(&mut file);
    for entity in &plan.entities {
        file.line(format!("use App\\Resolvers\\{}Resolver;", entity.names.type_name));
    }
    file.line("use App\\Runtime\\RequestContext;");
    file.line("use GraphQL\\Type\\Definition\\ObjectType;");
    file.line("use GraphQL\\Type\\Definition\\Type;");
    file.line("use GraphQL\\Type\\Schema as GraphQLSchema;");
    file.blank();

    let mut roots = Vec::new();
    for root in [RootType::Query, RootType::Mutation] {
        let root_name = root.type_name();
        let name_line = name_entry(contract, root_name, ContractKind::Object);

        let mut fields = Vec::new();
        for (entity, op) in plan.operations(root) {
            let mut args = Vec::new();
            let mut declared = Vec::new();
            for arg in &op.args {
                let (entry, contract_arg) =
                    arg_entry(registry, &arg.name, &arg.type_ref, arg.default.as_deref())?;
                args.push(entry);
                declared.push(contract_arg);
            }
            let type_expression = php_type(registry, &op.returns)?;
            contract.field_with_args(root_name, &op.field, &op.returns, declared);

            fields.push(Stmt::block(
                format!("{} => [", php_string(&op.field)),
                vec![
                    Stmt::line(format!("'type' => {},", type_expression)),
                    Stmt::block("'args' => [", args, "],"),
                    Stmt::line(format!(
                        "'resolve' => fn ($root, array $args, RequestContext $context) => {}Resolver::{}($args, $context),",
                        entity.names.type_name,
                        super::resolvers::operation_method(op.kind)
                    )),
                ],
                "],",
            ));
        }

        roots.push(Stmt::block(
            format!("{} => new ObjectType([", php_string(&root_name.to_lowercase())),
            vec![name_line, Stmt::block("'fields' => [", fields, "],")],
            "]),",
        ));
    }

    file.line("final class Schema");
    file.push(Stmt::block(
        "{",
        vec![
            Stmt::line("public static function build(): GraphQLSchema"),
            Stmt::block(
                "{",
                vec![Stmt::block("return new GraphQLSchema([", roots, "]);")],
                "}",
            ),
        ],
        "}",
    ));
    Ok(file)
}
