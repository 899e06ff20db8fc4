use polyapi_core::generator::{analyze_documents, write_artifacts, Generator};
use polyapi_core::parser::{parse_backend_columns, parse_roles, parse_schema};
use polyapi_core::query::{FilterInput, FilterOperator, ListArgs, SortDirection};
use polyapi_core::sql::{compile_list, SqlDialect};
use polyapi_core::{AnalyzedSchema, GeneratorConfig, PolyApiError, ProfileKind};
use pretty_assertions::assert_eq;

const SCHEMA: &str = r#"
{
    "entities": [
        {
            "name": "order",
            "description": "Customer orders",
            "columns": [
                {"name": "order_id", "type": "int", "primaryKey": true, "autoIncrement": true},
                {"name": "customer_id", "type": "int"},
                {"name": "status", "type": "varchar", "length": 20},
                {"name": "total", "type": "decimal", "length": "10,2"},
                {"name": "is_active", "type": "tinyint", "length": 1},
                {"name": "time_add", "type": "datetime"},
                {"name": "time_edit", "type": "datetime"}
            ],
            "filters": ["status"]
        },
        {
            "name": "customer",
            "columns": [
                {"name": "customer_id", "type": "int", "primaryKey": true, "autoIncrement": true},
                {"name": "name", "type": "varchar", "length": 255}
            ]
        }
    ]
}
"#;

const ROLES: &str = r#"
{
    "columns": [
        {"key": "active", "name": "is_active"},
        {"key": "displayName", "name": "name"},
        {"key": "createdAt", "name": "time_add"}
    ]
}
"#;

const BACKEND: &str = r#"{"updatedAt": {"columnName": "time_edit"}}"#;

fn analyzed() -> AnalyzedSchema {
    analyze_documents(
        &parse_schema(SCHEMA).unwrap(),
        &parse_roles(ROLES).unwrap(),
        &parse_backend_columns(BACKEND).unwrap(),
    )
    .unwrap()
}

fn artifact<'a>(output: &'a polyapi_core::GenerationOutput, path: &str) -> &'a str {
    &output
        .artifacts
        .iter()
        .find(|a| a.relative_path == path)
        .unwrap_or_else(|| panic!("missing artifact {}", path))
        .text_content
}

#[test]
fn test_profiles_agree_on_contract() {
    let output = Generator::default().generate(&analyzed()).unwrap();

    let php = &output.contracts[&ProfileKind::PhpPdo];
    let node = &output.contracts[&ProfileKind::NodeSequelize];
    assert_eq!(php.diff(node), Vec::<String>::new());

    let query = php.get("Query").unwrap();
    let fields: Vec<&str> = query.fields.iter().map(|f| f.name.as_str()).collect();
    assert!(fields.contains(&"order"));
    assert!(fields.contains(&"orders"));
    assert!(fields.contains(&"customers"));
}

#[test]
fn test_foreign_key_becomes_relationship_field() {
    let schema = analyzed();
    let order = schema.entity("order").unwrap();
    let customer_id = order.column("customer_id").unwrap();

    assert!(customer_id.is_foreign_key);
    assert_eq!(customer_id.referenced_entity.as_deref(), Some("customer"));
    assert!(!order.column("order_id").unwrap().is_foreign_key);

    let output = Generator::default().generate(&schema).unwrap();
    let order_type = output.contracts[&ProfileKind::NodeSequelize].get("Order").unwrap();
    let relation = order_type.fields.iter().find(|f| f.name == "customer").unwrap();
    assert_eq!(relation.type_ref, "Customer");
}

#[test]
fn test_backend_handled_column_is_server_assigned() {
    let output = Generator::default().generate(&analyzed()).unwrap();

    let input = output.contracts[&ProfileKind::PhpPdo].get("OrderInput").unwrap();
    let names: Vec<&str> = input.fields.iter().map(|f| f.name.as_str()).collect();
    assert!(!names.contains(&"time_edit"));
    assert!(!names.contains(&"time_add"));
    assert!(!names.contains(&"order_id"));

    let node = artifact(&output, "node/src/resolvers/order.js");
    assert!(node.contains("changes['time_edit'] = context.timestamp;"));

    let php = artifact(&output, "php/src/Resolvers/OrderResolver.php");
    assert!(php.contains("$changes['time_edit'] = $context->timestamp();"));
}

#[test]
fn test_generation_is_deterministic() {
    let schema = analyzed();
    let config = GeneratorConfig {
        look_aside_cache: true,
        ..GeneratorConfig::default()
    };

    let first = Generator::new(config.clone()).generate(&schema).unwrap();
    let second = Generator::new(config).generate(&schema).unwrap();

    assert_eq!(first.artifacts, second.artifacts);
}

#[test]
fn test_list_whitelist_and_binding() {
    let schema = analyzed();
    let args = ListArgs::new()
        .filter(FilterInput::new("status", FilterOperator::Equals, "paid"))
        .filter(FilterInput::new("password; DROP TABLE order", FilterOperator::Equals, "x"))
        .order_by("nonexistent", SortDirection::Desc)
        .page(3);

    let compiled = compile_list(schema.entity("order").unwrap(), &args, SqlDialect::Postgres, 10);

    assert!(compiled.data.sql.contains("WHERE \"status\" = $1"));
    assert!(!compiled.data.sql.contains("DROP"));
    assert!(!compiled.data.sql.contains("nonexistent"));
    assert_eq!(compiled.data.params, vec!["paid"]);
    assert_eq!(compiled.window.offset, 20);
}

#[test]
fn test_missing_primary_key_fails() {
    let schema = parse_schema(r#"{"entities": [{"name": "log", "columns": [{"name": "message", "type": "int"}]}]}"#).unwrap();
    let err = analyze_documents(&schema, &Default::default(), &Default::default()).unwrap_err();

    assert!(matches!(err, PolyApiError::MissingPrimaryKey(entity) if entity == "log"));
}

#[test]
fn test_unknown_backend_role_fails() {
    let backend = parse_backend_columns(r#"{"deletedAt": {"columnName": "time_del"}}"#).unwrap();
    let err = analyze_documents(&parse_schema(SCHEMA).unwrap(), &parse_roles(ROLES).unwrap(), &backend)
        .unwrap_err();

    assert!(matches!(err, PolyApiError::UnknownRole(role) if role == "deletedAt"));
}

#[test]
fn test_write_generated_tree() {
    let dir = tempfile::tempdir().unwrap();
    let output = Generator::default().generate(&analyzed()).unwrap();

    let written = write_artifacts(dir.path(), &output.artifacts).unwrap();

    assert_eq!(written.len(), output.artifacts.len());
    assert!(dir.path().join("php/src/Types.php").is_file());
    assert!(dir.path().join("node/src/schema/typeDefs.js").is_file());
    assert!(dir.path().join("docs/API.md").is_file());
}
