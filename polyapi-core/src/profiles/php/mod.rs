//! `php-pdo`: graphql-php code-first schema with synchronous PDO resolvers.
//!
//! Object types live in a lazily populated `Types` registry whose field
//! lists are closures, so mutually referencing types resolve regardless of
//! declaration order.

mod resolvers;
mod types;

use crate::analyzer::AnalyzedSchema;
use crate::emit::escape::php_string;
use crate::emit::{naming, ContractSurface, OutputArtifact, SourceFile, Stmt, TypeRegistry, PHP_STYLE};
use crate::error::Result;
use crate::plan::EmissionPlan;
use crate::query::{FilterOperator, PredicateShape, LIKE_ESCAPE};
use crate::sql::SqlDialect;
use crate::types::GraphqlScalar;

use super::{declare_types, ProfileKind, RenderedProfile, TargetProfile};

const RUNTIME: [(&str, &str); 4] = [
    ("php/src/Runtime/Db.php", include_str!("runtime/Db.php")),
    ("php/src/Runtime/ListQuery.php", include_str!("runtime/ListQuery.php")),
    ("php/src/Runtime/IdGenerator.php", include_str!("runtime/IdGenerator.php")),
    ("php/src/Runtime/RequestContext.php", include_str!("runtime/RequestContext.php")),
];

const CACHE_RUNTIME: (&str, &str) = (
    "php/src/Runtime/LookAsideCache.php",
    include_str!("runtime/LookAsideCache.php"),
);

const ENTRY_POINT: (&str, &str) = ("php/public/graphql.php", include_str!("runtime/graphql.php"));

const COMPOSER: (&str, &str) = ("php/composer.json", include_str!("runtime/composer.json"));

const SCALARS: [(GraphqlScalar, &str); 5] = [
    (GraphqlScalar::String, "Type::string()"),
    (GraphqlScalar::Int, "Type::int()"),
    (GraphqlScalar::Float, "Type::float()"),
    (GraphqlScalar::Boolean, "Type::boolean()"),
    (GraphqlScalar::Id, "Type::id()"),
];

#[derive(Debug, Clone, Copy)]
pub struct PhpPdoProfile {
    dialect: SqlDialect,
}

impl PhpPdoProfile {
    pub fn new() -> Self {
        PhpPdoProfile {
            dialect: SqlDialect::Mysql,
        }
    }
}

impl Default for PhpPdoProfile {
    fn default() -> Self {
        PhpPdoProfile::new()
    }
}

/// `Runtime/Operators.php`: operator → `[shape, SQL comparison]` for
/// `ListQuery`.
fn operators_file() -> SourceFile {
    let shapes = FilterOperator::ALL
        .iter()
        .map(|op| {
            let shape = op.shape();
            let comparison = match shape {
                PredicateShape::Compare(comparison) => php_string(comparison.as_sql()),
                _ => "null".to_string(),
            };
            Stmt::line(format!(
                "{} => [{}, {}],",
                php_string(op.as_graphql()),
                php_string(shape.name()),
                comparison
            ))
        })
        .collect();

    let mut file = SourceFile::new("php/src/Runtime/Operators.php");
    for line in ["<?php", "", "declare(strict_types=1);", "", "namespace App\\Runtime;", ""] {
        file.line(line);
    }
    file.line("final class Operators");
    file.push(Stmt::block(
        "{",
        vec![
            Stmt::line(format!(
                "public const LIKE_ESCAPE = {};",
                php_string(&LIKE_ESCAPE.to_string())
            )),
            Stmt::Blank,
            Stmt::block("public const SHAPES = [", shapes, "];"),
        ],
        "}",
    ));
    file
}

/// `OrderPage` → `orderPage`, the static accessor on `Types`.
pub(crate) fn accessor(type_name: &str) -> String {
    naming::field_name(type_name)
}

impl TargetProfile for PhpPdoProfile {
    fn kind(&self) -> ProfileKind {
        ProfileKind::PhpPdo
    }

    fn render(&self, schema: &AnalyzedSchema, plan: &EmissionPlan) -> Result<RenderedProfile> {
        let mut registry = TypeRegistry::new(self.kind().as_str());
        for (scalar, expression) in SCALARS {
            registry.declare(scalar.as_str(), expression.to_string())?;
        }
        declare_types(&mut registry, plan, |name| format!("Types::{}()", accessor(name)))?;

        let mut contract = ContractSurface::new();
        let mut artifacts: Vec<OutputArtifact> = vec![
            types::types_file(plan, &registry, &mut contract)?.render(&PHP_STYLE),
            types::schema_file(plan, &registry, &mut contract)?.render(&PHP_STYLE),
            operators_file().render(&PHP_STYLE),
        ];

        for entity in &plan.entities {
            log::debug!("php-pdo: rendering resolver for '{}'", entity.entity);
            let analyzed = schema.require_entity(&entity.entity)?;
            artifacts.push(
                resolvers::resolver_file(analyzed, entity, plan, self.dialect).render(&PHP_STYLE),
            );
        }

        let mut static_files = RUNTIME.to_vec();
        if plan.look_aside_cache {
            static_files.push(CACHE_RUNTIME);
        }
        static_files.push(ENTRY_POINT);
        static_files.push(COMPOSER);
        artifacts.extend(
            static_files
                .into_iter()
                .map(|(path, text)| OutputArtifact::new(path, text)),
        );

        Ok(RenderedProfile {
            kind: self.kind(),
            artifacts,
            contract,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::shop_schema;
    use crate::plan::PlanOptions;

    fn render(options: PlanOptions) -> RenderedProfile {
        let schema = shop_schema();
        let plan = EmissionPlan::build(&schema, &options).unwrap();
        PhpPdoProfile::new().render(&schema, &plan).unwrap()
    }

    fn artifact<'a>(rendered: &'a RenderedProfile, path: &str) -> &'a str {
        &rendered
            .artifacts
            .iter()
            .find(|a| a.relative_path == path)
            .unwrap_or_else(|| panic!("missing {}", path))
            .text_content
    }

    #[test]
    fn test_artifact_set() {
        let rendered = render(PlanOptions::default());
        let paths: Vec<&str> = rendered.artifacts.iter().map(|a| a.relative_path.as_str()).collect();

        assert!(paths.contains(&"php/src/Types.php"));
        assert!(paths.contains(&"php/src/Schema.php"));
        assert!(paths.contains(&"php/src/Resolvers/OrderItemResolver.php"));
        assert!(paths.contains(&"php/public/graphql.php"));
        assert!(!paths.contains(&"php/src/Runtime/LookAsideCache.php"));
    }

    #[test]
    fn test_cache_runtime_only_when_enabled() {
        let rendered = render(PlanOptions {
            look_aside_cache: true,
            ..PlanOptions::default()
        });

        assert!(artifact(&rendered, "php/src/Runtime/LookAsideCache.php").contains("remember"));
        assert!(artifact(&rendered, "php/src/Resolvers/OrderResolver.php")
            .contains("LookAsideCache::remember('order:' . $id"));
    }

    #[test]
    fn test_runtime_list_query_whitelists() {
        let rendered = render(PlanOptions::default());
        let list = artifact(&rendered, "php/src/Runtime/ListQuery.php");

        assert!(list.contains("in_array($filter['field'], $columns, true)"));
        assert!(list.contains("'1 = 0'"));
    }

    #[test]
    fn test_operator_table() {
        let rendered = render(PlanOptions::default());
        let operators = artifact(&rendered, "php/src/Runtime/Operators.php");

        assert!(operators.contains("namespace App\\Runtime;"));
        assert!(operators.contains("    public const LIKE_ESCAPE = '!';\n"));
        assert!(operators.contains("        'NOT_EQUALS' => ['compare', '<>'],\n"));
        assert!(operators.contains("        'IN' => ['in', null],\n"));
    }
}
