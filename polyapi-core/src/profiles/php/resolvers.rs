use heck::ToUpperCamelCase;

use crate::analyzer::AnalyzedEntity;
use crate::ast::ContextSource;
use crate::emit::escape::php_string;
use crate::emit::{SourceFile, Stmt};
use crate::plan::{
    EmissionPlan, EntityPlan, KeyAssignment, OperationKind, OperationPlan, RelationPlan,
    ServerAssignment, MINTED_SUFFIX_HEX_WIDTH,
};
use crate::sql::{self, BooleanStorage, SqlDialect};

pub(super) fn operation_method(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::GetById => "get",
        OperationKind::List => "list",
        OperationKind::Create => "create",
        OperationKind::Update => "update",
        OperationKind::Delete => "delete",
        OperationKind::ToggleActive => "toggleActive",
    }
}

/// Relationship field `customer` → `resolveCustomer`.
pub(super) fn relation_method(field: &str) -> String {
    format!("resolve{}", field.to_upper_camel_case())
}

fn context_value(source: ContextSource) -> &'static str {
    match source {
        ContextSource::Timestamp => "$context->timestamp()",
        ContextSource::Actor => "$context->actor()",
        ContextSource::RemoteAddress => "$context->remoteAddress()",
    }
}

fn string_list(values: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let quoted: Vec<String> = values.into_iter().map(|v| php_string(v.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

fn method(signature: String, body: Vec<Stmt>) -> Vec<Stmt> {
    vec![Stmt::Blank, Stmt::line(signature), Stmt::block("{", body, "}")]
}

fn assignments(target: &str, assignments: &[ServerAssignment]) -> Vec<Stmt> {
    assignments
        .iter()
        .map(|a| {
            Stmt::line(format!(
                "${}[{}] = {};",
                target,
                php_string(&a.column),
                context_value(a.source)
            ))
        })
        .collect()
}

fn require_existing(entity: &EntityPlan) -> Stmt {
    Stmt::block(
        "if (self::findById($id) === null) {",
        vec![Stmt::line(format!(
            "throw new UserError(sprintf({}, $id));",
            php_string(&format!("{} %s not found", entity.entity))
        ))],
        "}",
    )
}

/// Cached when `cached`, otherwise a direct lookup.
fn lookup(entity_name: &str, class: &str, cached: bool) -> String {
    if cached {
        format!(
            "return LookAsideCache::remember({} . $id, fn () => {}::findById($id));",
            php_string(&format!("{}:", entity_name)),
            class
        )
    } else {
        format!("return {}::findById($id);", class)
    }
}

fn operation_body(
    analyzed: &AnalyzedEntity,
    entity: &EntityPlan,
    op: &OperationPlan,
    dialect: SqlDialect,
) -> Vec<Stmt> {
    let pk = php_string(&entity.primary_key.column);

    match op.kind {
        OperationKind::GetById => vec![
            Stmt::line("$id = $args['id'];"),
            Stmt::line(lookup(&entity.entity, "self", op.uses_cache)),
        ],
        OperationKind::List => vec![Stmt::line(
            "return ListQuery::run(self::TABLE, self::COLUMNS, self::PRIMARY_KEY, $args, self::DEFAULT_LIMIT);",
        )],
        OperationKind::Create => {
            let mut body = vec![Stmt::line("$row = Db::pick($args['input'], self::WRITABLE);")];
            match entity.primary_key.assignment {
                KeyAssignment::Mint => body.push(Stmt::line(format!(
                    "$row[{}] = IdGenerator::mint({});",
                    pk, MINTED_SUFFIX_HEX_WIDTH
                ))),
                KeyAssignment::ClientSupplied => body.push(Stmt::block(
                    format!("if (!isset($row[{}])) {{", pk),
                    vec![Stmt::line(format!(
                        "throw new UserError({});",
                        php_string(&format!("{} is required", entity.primary_key.column))
                    ))],
                    "}",
                )),
                KeyAssignment::LastInsertId => {}
            }
            body.extend(assignments("row", &entity.create_assignments));
            body.push(Stmt::line("Db::insert(self::TABLE, $row);"));
            body.push(Stmt::Blank);
            body.push(Stmt::line(match entity.primary_key.assignment {
                KeyAssignment::LastInsertId => "return self::findById(Db::pdo()->lastInsertId());".to_string(),
                _ => format!("return self::findById($row[{}]);", pk),
            }));
            body
        }
        OperationKind::Update => {
            let mut body = vec![Stmt::line("$id = $args['id'];"), require_existing(entity)];
            body.push(Stmt::line("$changes = Db::pick($args['input'], self::WRITABLE);"));
            body.push(Stmt::block(
                "if ($changes === []) {",
                vec![Stmt::line("throw new UserError('No fields to update');")],
                "}",
            ));
            body.extend(assignments("changes", &entity.update_assignments));
            body.push(Stmt::line("Db::update(self::TABLE, self::PRIMARY_KEY, $id, $changes);"));
            body.push(Stmt::Blank);
            if entity.primary_key.may_change_on_update() {
                body.push(Stmt::line(format!("return self::findById($changes[{}] ?? $id);", pk)));
            } else {
                body.push(Stmt::line("return self::findById($id);"));
            }
            body
        }
        OperationKind::Delete => vec![
            Stmt::line(format!(
                "$stmt = Db::pdo()->prepare({});",
                php_string(&sql::delete_by_id(analyzed, dialect))
            )),
            Stmt::line("$stmt->execute([$args['id']]);"),
            Stmt::Blank,
            Stmt::line("return $stmt->rowCount() > 0;"),
        ],
        OperationKind::ToggleActive => toggle_body(analyzed, entity, dialect),
    }
}

fn toggle_body(analyzed: &AnalyzedEntity, entity: &EntityPlan, dialect: SqlDialect) -> Vec<Stmt> {
    let Some(active) = &entity.active else {
        return Vec::new();
    };

    let flag = match active.storage(dialect.boolean_storage()) {
        BooleanStorage::Integer => "$args['active'] ? 1 : 0",
        BooleanStorage::Native => "(bool) $args['active']",
    };

    let mut columns = vec![active.column.as_str()];
    let mut params = vec![flag.to_string()];
    for assignment in &entity.update_assignments {
        columns.push(assignment.column.as_str());
        params.push(context_value(assignment.source).to_string());
    }
    params.push("$id".to_string());

    vec![
        Stmt::line("$id = $args['id'];"),
        require_existing(entity),
        Stmt::line(format!(
            "$stmt = Db::pdo()->prepare({});",
            php_string(&sql::update_by_id(analyzed, &columns, dialect))
        )),
        Stmt::line(format!("$stmt->execute([{}]);", params.join(", "))),
        Stmt::Blank,
        Stmt::line("return self::findById($id);"),
    ]
}

fn relation_body(relation: &RelationPlan) -> Vec<Stmt> {
    vec![
        Stmt::line(format!("$id = $row[{}] ?? null;", php_string(&relation.column))),
        Stmt::block("if ($id === null) {", vec![Stmt::line("return null;")], "}"),
        Stmt::Blank,
        Stmt::line(lookup(
            &relation.target_entity,
            &format!("{}Resolver", relation.target_type),
            relation.uses_cache,
        )),
    ]
}

pub(super) fn resolver_file(
    analyzed: &AnalyzedEntity,
    entity: &EntityPlan,
    plan: &EmissionPlan,
    dialect: SqlDialect,
) -> SourceFile {
    let class = format!("{}Resolver", entity.names.type_name);
    let mut file = SourceFile::new(format!("php/src/Resolvers/{}.php", class));

    for line in ["<?php", "", "declare(strict_types=1);", "", "namespace App\\Resolvers;", ""] {
        file.line(line);
    }
    file.line("use App\\Runtime\\Db;");
    if entity.primary_key.assignment == KeyAssignment::Mint {
        file.line("use App\\Runtime\\IdGenerator;");
    }
    file.line("use App\\Runtime\\ListQuery;");
    let cached = entity.operations.iter().any(|op| op.uses_cache)
        || entity.relations.iter().any(|r| r.uses_cache);
    if cached {
        file.line("use App\\Runtime\\LookAsideCache;");
    }
    file.line("use App\\Runtime\\RequestContext;");
    file.line("use GraphQL\\Error\\UserError;");
    file.blank();

    let mut body = vec![
        Stmt::line(format!("public const TABLE = {};", php_string(&entity.entity))),
        Stmt::line(format!(
            "public const PRIMARY_KEY = {};",
            php_string(&entity.primary_key.column)
        )),
        Stmt::line(format!("public const COLUMNS = {};", string_list(&entity.whitelist))),
        Stmt::line(format!(
            "public const WRITABLE = {};",
            string_list(entity.inputs.iter().map(|f| &f.column))
        )),
        Stmt::line(format!("public const DEFAULT_LIMIT = {};", plan.default_page_limit)),
    ];

    body.extend(method(
        "public static function findById($id): ?array".to_string(),
        vec![
            Stmt::line(format!(
                "$stmt = Db::pdo()->prepare({});",
                php_string(&sql::select_by_id(analyzed, dialect))
            )),
            Stmt::line("$stmt->execute([$id]);"),
            Stmt::line("$row = $stmt->fetch();"),
            Stmt::Blank,
            Stmt::line("return $row === false ? null : $row;"),
        ],
    ));

    for op in &entity.operations {
        let returns = match op.kind {
            OperationKind::List => "array",
            OperationKind::Delete => "bool",
            _ => "?array",
        };
        body.extend(method(
            format!(
                "public static function {}(array $args, RequestContext $context): {}",
                operation_method(op.kind),
                returns
            ),
            operation_body(analyzed, entity, op, dialect),
        ));
    }

    for relation in &entity.relations {
        body.extend(method(
            format!(
                "public static function {}(array $row): ?array",
                relation_method(&relation.field)
            ),
            relation_body(relation),
        ));
    }

    file.line(format!("final class {}", class));
    file.push(Stmt::block("{", body, "}"));
    file
}
