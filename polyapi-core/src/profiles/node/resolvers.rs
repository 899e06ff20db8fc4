use crate::emit::escape::js_string;
use crate::emit::{naming, SourceFile, Stmt, TypeRegistry};
use crate::error::Result;
use crate::plan::{
    EmissionPlan, EntityPlan, KeyAssignment, OperationKind, OperationPlan, RelationPlan,
    ServerAssignment, MINTED_SUFFIX_HEX_WIDTH,
};
use crate::sql::{BooleanStorage, SqlDialect};

use super::context_value;

fn js_list<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    let quoted: Vec<String> = values.into_iter().map(|v| js_string(v)).collect();
    format!("[{}]", quoted.join(", "))
}

fn assignments(target: &str, assignments: &[ServerAssignment]) -> Vec<Stmt> {
    assignments
        .iter()
        .map(|a| {
            Stmt::line(format!(
                "{}[{}] = {};",
                target,
                js_string(&a.column),
                context_value(a.source)
            ))
        })
        .collect()
}

fn require_existing(entity: &EntityPlan) -> Stmt {
    Stmt::block(
        "if ((await findById(id)) === null) {",
        vec![Stmt::line(format!(
            "throw contract.notFound({}, id);",
            js_string(&entity.entity)
        ))],
        "}",
    )
}

fn cached_lookup(entity_name: &str, lookup: &str, cached: bool) -> String {
    if cached {
        format!(
            "return cache.remember(`{}:${{id}}`, () => {});",
            entity_name, lookup
        )
    } else {
        format!("return {};", lookup)
    }
}

fn resolver(op: &OperationPlan, params: &str, body: Vec<Stmt>) -> Stmt {
    Stmt::block(format!("async {}({}) {{", op.field, params), body, "},")
}

fn operation(entity: &EntityPlan, model: &str, op: &OperationPlan, dialect: SqlDialect) -> Stmt {
    match op.kind {
        OperationKind::GetById => resolver(
            op,
            "_parent, { id }",
            vec![Stmt::line(cached_lookup(&entity.entity, "findById(id)", op.uses_cache))],
        ),
        OperationKind::List => resolver(
            op,
            "_parent, args",
            vec![
                Stmt::line("const window = contract.resolveWindow(args, DEFAULT_LIMIT);"),
                Stmt::line(format!(
                    "const where = contract.buildWhere({}, args.filter, COLUMNS);",
                    model
                )),
                Stmt::line(format!("const total = await {}.count({{ where }});", model)),
                Stmt::block(
                    format!("const rows = await {}.findAll({{", model),
                    vec![
                        Stmt::line("where,"),
                        Stmt::line("order: contract.buildOrder(args.orderBy, COLUMNS, PRIMARY_KEY),"),
                        Stmt::line("limit: window.limit,"),
                        Stmt::line("offset: window.offset,"),
                        Stmt::line("include: INCLUDE,"),
                    ],
                    "});",
                ),
                Stmt::line(
                    "return contract.envelope(rows.map((row) => row.get({ plain: true })), total, window);",
                ),
            ],
        ),
        OperationKind::Create => {
            let mut body = vec![Stmt::line("const row = contract.pick(input, WRITABLE);")];
            match entity.primary_key.assignment {
                KeyAssignment::Mint => body.push(Stmt::line(format!(
                    "row[PRIMARY_KEY] = mintId({});",
                    MINTED_SUFFIX_HEX_WIDTH
                ))),
                KeyAssignment::ClientSupplied => body.push(Stmt::block(
                    "if (row[PRIMARY_KEY] === undefined) {",
                    vec![Stmt::line(format!(
                        "throw contract.userError({});",
                        js_string(&format!("{} is required", entity.primary_key.column))
                    ))],
                    "}",
                )),
                KeyAssignment::LastInsertId => {}
            }
            body.extend(assignments("row", &entity.create_assignments));
            body.push(Stmt::line(format!("const created = await {}.create(row);", model)));
            body.push(Stmt::line("return findById(created.get(PRIMARY_KEY));"));
            resolver(op, "_parent, { input }, context", body)
        }
        OperationKind::Update => {
            let mut body = vec![
                require_existing(entity),
                Stmt::line("const changes = contract.pick(input, WRITABLE);"),
                Stmt::block(
                    "if (Object.keys(changes).length === 0) {",
                    vec![Stmt::line("throw contract.userError('No fields to update');")],
                    "}",
                ),
            ];
            body.extend(assignments("changes", &entity.update_assignments));
            body.push(Stmt::line(format!(
                "await {}.update(changes, {{ where: {{ [PRIMARY_KEY]: id }} }});",
                model
            )));
            body.push(Stmt::line(if entity.primary_key.may_change_on_update() {
                "return findById(changes[PRIMARY_KEY] ?? id);"
            } else {
                "return findById(id);"
            }));
            resolver(op, "_parent, { id, input }, context", body)
        }
        OperationKind::Delete => resolver(
            op,
            "_parent, { id }",
            vec![
                Stmt::line(format!(
                    "const affected = await {}.destroy({{ where: {{ [PRIMARY_KEY]: id }} }});",
                    model
                )),
                Stmt::line("return affected > 0;"),
            ],
        ),
        OperationKind::ToggleActive => {
            let Some(active) = &entity.active else {
                return resolver(op, "_parent, { id }", vec![Stmt::line("return findById(id);")]);
            };
            let flag = match active.storage(dialect.boolean_storage()) {
                BooleanStorage::Integer => "active ? 1 : 0",
                BooleanStorage::Native => "Boolean(active)",
            };
            let mut body = vec![
                require_existing(entity),
                Stmt::line(format!(
                    "const changes = {{ {}: {} }};",
                    js_string(&active.column),
                    flag
                )),
            ];
            body.extend(assignments("changes", &entity.update_assignments));
            body.push(Stmt::line(format!(
                "await {}.update(changes, {{ where: {{ [PRIMARY_KEY]: id }} }});",
                model
            )));
            body.push(Stmt::line("return findById(id);"));
            resolver(op, "_parent, { id, active }, context", body)
        }
    }
}

fn relation(relation: &RelationPlan, target_model: &str) -> Stmt {
    let field = js_string(&relation.field);
    Stmt::block(
        format!("async {}(parent) {{", relation.field),
        vec![
            Stmt::block(
                format!("if (parent[{}] !== undefined) {{", field),
                vec![Stmt::line(format!("return parent[{}];", field))],
                "}",
            ),
            Stmt::line(format!("const id = parent[{}];", js_string(&relation.column))),
            Stmt::block("if (id === null || id === undefined) {", vec![Stmt::line("return null;")], "}"),
            Stmt::line(cached_lookup(
                &relation.target_entity,
                &format!("{}.findByPk(id, {{ raw: true }})", target_model),
                relation.uses_cache,
            )),
        ],
        "},",
    )
}

/// `src/resolvers/<entity>.js`: `Query`, `Mutation` and relationship
/// resolvers for one entity.
pub(super) fn resolver_file(
    entity: &EntityPlan,
    plan: &EmissionPlan,
    models: &TypeRegistry<String>,
    dialect: SqlDialect,
) -> Result<SourceFile> {
    let model = models.resolve(&entity.names.type_name)?;
    let mut imported = vec![model.clone()];
    let mut include = Vec::new();
    let mut relation_resolvers = Vec::new();
    for rel in &entity.relations {
        let target = models.resolve(&rel.target_type)?;
        if !imported.contains(target) {
            imported.push(target.clone());
        }
        include.push(format!("{{ model: {}, as: {} }}", target, js_string(&rel.field)));
        relation_resolvers.push(relation(rel, target));
    }

    let mut file = SourceFile::new(format!(
        "node/src/resolvers/{}.js",
        naming::file_stem(&entity.entity)
    ));
    file.line("'use strict';");
    file.blank();
    file.line(format!("const {{ {} }} = require('../models');", imported.join(", ")));
    file.line("const contract = require('../runtime/contract');");
    if entity.primary_key.assignment == KeyAssignment::Mint {
        file.line("const { mintId } = require('../runtime/ids');");
    }
    if entity.operations.iter().any(|op| op.uses_cache) || entity.relations.iter().any(|r| r.uses_cache) {
        file.line("const cache = require('../runtime/cache');");
    }
    file.blank();
    file.line(format!("const COLUMNS = {};", js_list(&entity.whitelist)));
    file.line(format!(
        "const WRITABLE = {};",
        js_list(entity.inputs.iter().map(|f| &f.column))
    ));
    file.line(format!(
        "const PRIMARY_KEY = {};",
        js_string(&entity.primary_key.column)
    ));
    file.line(format!("const DEFAULT_LIMIT = {};", plan.default_page_limit));
    file.line(format!("const INCLUDE = [{}];", include.join(", ")));
    file.blank();
    file.push(Stmt::block(
        "async function findById(id) {",
        vec![Stmt::line(format!("return {}.findByPk(id, {{ raw: true }});", model))],
        "}",
    ));
    file.blank();

    let mut query = Vec::new();
    let mut mutation = Vec::new();
    for op in &entity.operations {
        let stmt = operation(entity, model, op, dialect);
        match op.kind {
            OperationKind::GetById | OperationKind::List => query.push(stmt),
            _ => mutation.push(stmt),
        }
    }

    let mut exports = vec![
        Stmt::block("Query: {", query, "},"),
        Stmt::block("Mutation: {", mutation, "},"),
    ];
    if !relation_resolvers.is_empty() {
        exports.push(Stmt::block(
            format!("{}: {{", entity.names.type_name),
            relation_resolvers,
            "},",
        ));
    }
    file.push(Stmt::block("module.exports = {", exports, "};"));
    Ok(file)
}
