//! Shared schemas for unit tests.

use crate::analyzer::{analyze, AnalyzedSchema};
use crate::ast::{
    BackendBinding, BackendHandledDocument, ColumnDefinition, EntityDefinition,
    PrimaryKeyStrategy, RoleBinding, RoleBindingDocument, SchemaDocument,
};

/// customer ← order ← order_item → product, plus a mutual pair
/// (employee.team_id / team.employee_id) to exercise forward references.
pub(crate) fn shop_document() -> SchemaDocument {
    let mut doc = SchemaDocument::new();

    let mut order = EntityDefinition::new("order")
        .column(
            ColumnDefinition::new("order_id", "int")
                .auto_increment()
                .primary(PrimaryKeyStrategy::DatabaseDefault),
        )
        .column(ColumnDefinition::new("customer_id", "int"))
        .column(ColumnDefinition::new("status", "varchar(20)"))
        .column(ColumnDefinition::new("total", "decimal(10,2)"))
        .column(ColumnDefinition::new("note", "text"))
        .column(ColumnDefinition::new("is_active", "tinyint").length(1))
        .column(ColumnDefinition::new("time_add", "datetime"))
        .column(ColumnDefinition::new("user_add", "varchar(64)"))
        .column(ColumnDefinition::new("ip_add", "varchar(45)"))
        .column(ColumnDefinition::new("time_edit", "datetime"))
        .column(ColumnDefinition::new("user_edit", "varchar(64)"));
    order.filters = vec!["status".to_string(), "customer_id".to_string()];
    order.textarea_columns = vec!["note".to_string()];
    order.description = Some("Customer orders".to_string());
    doc.add_entity(order);

    doc.add_entity(
        EntityDefinition::new("customer")
            .column(
                ColumnDefinition::new("customer_id", "int")
                    .auto_increment()
                    .primary(PrimaryKeyStrategy::DatabaseDefault),
            )
            .column(ColumnDefinition::new("name", "varchar(255)"))
            .column(ColumnDefinition::new("email", "varchar(255)"))
            .column(ColumnDefinition::new("time_edit", "datetime")),
    );

    doc.add_entity(
        EntityDefinition::new("product")
            .column(ColumnDefinition::new("product_id", "char(32)").primary(PrimaryKeyStrategy::Autogenerated))
            .column(ColumnDefinition::new("name", "varchar(255)"))
            .column(ColumnDefinition::new("price", "decimal(10,2)")),
    );

    doc.add_entity(
        EntityDefinition::new("order_item")
            .column(ColumnDefinition::new("order_item_id", "varchar(40)").primary(PrimaryKeyStrategy::ManualAll))
            .column(ColumnDefinition::new("order_id", "int"))
            .column(ColumnDefinition::new("product_id", "char(32)"))
            .column(ColumnDefinition::new("quantity", "int")),
    );

    doc.add_entity(
        EntityDefinition::new("employee")
            .column(ColumnDefinition::new("employee_id", "int").primary(PrimaryKeyStrategy::DatabaseDefault))
            .column(ColumnDefinition::new("team_id", "int"))
            .column(ColumnDefinition::new("name", "varchar(100)")),
    );

    doc.add_entity(
        EntityDefinition::new("team")
            .column(ColumnDefinition::new("team_id", "int").primary(PrimaryKeyStrategy::DatabaseDefault))
            .column(ColumnDefinition::new("employee_id", "int"))
            .column(ColumnDefinition::new("title", "varchar(100)")),
    );

    doc
}

pub(crate) fn shop_roles() -> RoleBindingDocument {
    RoleBindingDocument::default()
        .bind("active", "is_active")
        .bind("displayName", "name")
        .bind("createdAt", "time_add")
        .bind("createdBy", "user_add")
        .bind("createdFromAddress", "ip_add")
}

pub(crate) fn shop_backend() -> BackendHandledDocument {
    BackendHandledDocument::default()
        .bind("updatedAt", "time_edit")
        .bind("updatedBy", "user_edit")
}

pub(crate) fn shop_schema() -> AnalyzedSchema {
    let roles = RoleBinding::from_document(&shop_roles());
    let backend = BackendBinding::resolve(&shop_backend(), &roles).unwrap();
    analyze(&shop_document(), roles, backend).unwrap()
}
