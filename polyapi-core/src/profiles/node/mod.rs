//! `node-sequelize`: Apollo Server with SDL type definitions and awaited
//! Sequelize queries.

mod models;
mod resolvers;
mod schema;

use serde_json::json;

use crate::analyzer::AnalyzedSchema;
use crate::ast::ContextSource;
use crate::emit::escape::js_string;
use crate::emit::sdl::read_contract;
use crate::emit::{naming, ContractSurface, OutputArtifact, SourceFile, Stmt, TypeRegistry, JS_STYLE};
use crate::error::Result;
use crate::plan::EmissionPlan;
use crate::query::{Comparison, FilterOperator, PredicateShape, LIKE_ESCAPE};
use crate::sql::SqlDialect;
use crate::types::GraphqlScalar;

use super::{declare_types, ProfileKind, RenderedProfile, TargetProfile};

const RUNTIME: [(&str, &str); 5] = [
    ("node/src/runtime/contract.js", include_str!("runtime/contract.js")),
    ("node/src/runtime/ids.js", include_str!("runtime/ids.js")),
    ("node/src/context.js", include_str!("runtime/context.js")),
    ("node/src/server.js", include_str!("runtime/server.js")),
    ("node/src/runtime/cache.js", include_str!("runtime/cache.js")),
];

#[derive(Debug, Clone, Copy)]
pub struct NodeSequelizeProfile {
    dialect: SqlDialect,
}

impl NodeSequelizeProfile {
    pub fn new(dialect: SqlDialect) -> Self {
        NodeSequelizeProfile { dialect }
    }
}

pub(crate) fn context_value(source: ContextSource) -> &'static str {
    match source {
        ContextSource::Timestamp => "context.timestamp",
        ContextSource::Actor => "context.actor",
        ContextSource::RemoteAddress => "context.remoteAddress",
    }
}

/// `order_item` → `./order_item`, relative to `src/resolvers`.
fn resolver_module(entity: &str) -> String {
    format!("./{}", naming::file_stem(entity))
}

/// The contract a rendered `typeDefs.js` actually declares.
pub fn contract_from_type_defs(type_defs: &str) -> Result<ContractSurface> {
    read_contract(schema::sdl_text(type_defs)?)
}

fn sequelize_op(comparison: Comparison) -> &'static str {
    match comparison {
        Comparison::Eq => "Op.eq",
        Comparison::Ne => "Op.ne",
        Comparison::Gt => "Op.gt",
        Comparison::Gte => "Op.gte",
        Comparison::Lt => "Op.lt",
        Comparison::Lte => "Op.lte",
    }
}

/// `src/runtime/operators.js`: the operator table `contract.js` dispatches on.
fn operators_file() -> SourceFile {
    let entries = FilterOperator::ALL
        .iter()
        .map(|op| {
            let shape = op.shape();
            match shape {
                PredicateShape::Compare(comparison) => Stmt::line(format!(
                    "{}: {{ shape: {}, op: {} }},",
                    op.as_graphql(),
                    js_string(shape.name()),
                    sequelize_op(comparison)
                )),
                _ => Stmt::line(format!("{}: {{ shape: {} }},", op.as_graphql(), js_string(shape.name()))),
            }
        })
        .collect();

    let mut file = SourceFile::new("node/src/runtime/operators.js");
    file.line("'use strict';");
    file.blank();
    file.line("const { Op } = require('sequelize');");
    file.blank();
    file.push(Stmt::block("const OPERATORS = {", entries, "};"));
    file.blank();
    file.line(format!("const LIKE_ESCAPE = {};", js_string(&LIKE_ESCAPE.to_string())));
    file.blank();
    file.line("module.exports = { OPERATORS, LIKE_ESCAPE };");
    file
}

fn driver(dialect: SqlDialect) -> (&'static str, &'static str) {
    match dialect {
        SqlDialect::Mysql => ("mysql2", "^3.9.0"),
        SqlDialect::Postgres => ("pg", "^8.11.0"),
        SqlDialect::Sqlite => ("sqlite3", "^5.1.7"),
    }
}

impl NodeSequelizeProfile {
    fn package_json(&self) -> Result<OutputArtifact> {
        let (driver, version) = driver(self.dialect);
        let mut dependencies = serde_json::Map::new();
        dependencies.insert("@apollo/server".to_string(), json!("^4.10.0"));
        dependencies.insert("graphql".to_string(), json!("^16.8.0"));
        dependencies.insert("sequelize".to_string(), json!("^6.37.0"));
        dependencies.insert(driver.to_string(), json!(version));

        let package = json!({
            "name": "graphql-api",
            "private": true,
            "main": "src/server.js",
            "scripts": { "start": "node src/server.js" },
            "dependencies": dependencies,
        });

        let mut text = serde_json::to_string_pretty(&package)?;
        text.push('\n');
        Ok(OutputArtifact::new("node/package.json", text))
    }

    fn db_file(&self) -> SourceFile {
        let mut file = SourceFile::new("node/src/db.js");
        file.line("'use strict';");
        file.blank();
        file.line("const { Sequelize } = require('sequelize');");
        file.blank();
        match self.dialect {
            SqlDialect::Sqlite => {
                file.line("module.exports = new Sequelize({");
                file.line("  dialect: 'sqlite',");
                file.line("  storage: process.env.DB_STORAGE || 'database.sqlite',");
                file.line("  logging: false,");
                file.line("});");
            }
            dialect => {
                file.line("module.exports = new Sequelize(");
                file.line("  process.env.DB_NAME || 'app',");
                file.line("  process.env.DB_USER || 'root',");
                file.line("  process.env.DB_PASSWORD || '',");
                file.line(format!(
                    "  {{ host: process.env.DB_HOST || '127.0.0.1', dialect: '{}', logging: false }},",
                    dialect.as_str()
                ));
                file.line(");");
            }
        }
        file
    }

    fn resolvers_index(&self, plan: &EmissionPlan) -> SourceFile {
        let mut file = SourceFile::new("node/src/resolvers/index.js");
        file.line("'use strict';");
        file.blank();
        file.line("const parts = [");
        for entity in &plan.entities {
            file.line(format!("  require('{}'),", resolver_module(&entity.entity)));
        }
        file.line("];");
        file.blank();
        file.line("module.exports = parts.reduce((merged, part) => {");
        file.line("  for (const [type, fields] of Object.entries(part)) {");
        file.line("    merged[type] = { ...merged[type], ...fields };");
        file.line("  }");
        file.line("  return merged;");
        file.line("}, {});");
        file
    }
}

impl TargetProfile for NodeSequelizeProfile {
    fn kind(&self) -> ProfileKind {
        ProfileKind::NodeSequelize
    }

    fn render(&self, schema: &AnalyzedSchema, plan: &EmissionPlan) -> Result<RenderedProfile> {
        let profile = self.kind().as_str();

        // SDL names, checked before any body is written
        let mut sdl_types = TypeRegistry::new(profile);
        for scalar in [
            GraphqlScalar::String,
            GraphqlScalar::Int,
            GraphqlScalar::Float,
            GraphqlScalar::Boolean,
            GraphqlScalar::Id,
        ] {
            sdl_types.declare(scalar.as_str(), ())?;
        }
        declare_types(&mut sdl_types, plan, |_| ())?;

        // model identifiers for associations
        let mut model_names = TypeRegistry::new(profile);
        for entity in &plan.entities {
            model_names.declare(&entity.names.type_name, entity.names.type_name.clone())?;
        }

        let type_defs = schema::type_defs_file(plan, &sdl_types)?.render(&JS_STYLE);
        let contract = contract_from_type_defs(&type_defs.text_content)?;

        let mut artifacts = vec![
            self.package_json()?,
            self.db_file().render(&JS_STYLE),
            models::models_file(schema, plan, &model_names)?.render(&JS_STYLE),
            type_defs,
            self.resolvers_index(plan).render(&JS_STYLE),
            operators_file().render(&JS_STYLE),
        ];

        for entity in &plan.entities {
            log::debug!("node-sequelize: rendering resolvers for '{}'", entity.entity);
            artifacts.push(
                resolvers::resolver_file(entity, plan, &model_names, self.dialect)?
                    .render(&JS_STYLE),
            );
        }

        artifacts.extend(
            RUNTIME
                .iter()
                .filter(|(path, _)| plan.look_aside_cache || !path.ends_with("cache.js"))
                .map(|(path, text)| OutputArtifact::new(*path, *text)),
        );

        Ok(RenderedProfile {
            kind: self.kind(),
            artifacts,
            contract,
        })
    }
}
