//! Typed objects over the product catalogue schema.

use compono_schema::*;
use serde_json::json;

const SCHEMA: &str = r#"{
    "Product": {"type": "entity", "key": "id", "properties": {
        "id": {"type": "int", "nullable": "false"},
        "name": {"type": "string", "nullable": "false"},
        "description": {"type": "string"},
        "price": {"type": "double", "nullable": "false"},
        "categories": {"type": "collection", "itemType": "Category"},
        "supplier": {"type": "Supplier"}
    }},
    "Supplier": {"type": "entity", "key": "id", "properties": {
        "id": {"type": "int", "nullable": "false"},
        "name": {"type": "string"}
    }}
}"#;

fn product() -> EntityObject {
    let schema = Schema::parse(SCHEMA).unwrap();
    EntityObject::new(schema.entity("Product").unwrap())
}

#[test]
fn new_object_starts_null_and_fails_validation() {
    let p = product();
    assert_eq!(p.get("name").unwrap(), &json!(null));
    let err = p.validate().unwrap_err();
    assert!(matches!(err, SchemaError::NullViolation { ref property, .. } if property == "id"));
}

#[test]
fn setters_check_types() {
    let mut p = product();
    p.set("id", json!(7)).unwrap();
    p.set("price", json!(9)).unwrap();
    p.set("price", json!(9.5)).unwrap();
    let err = p.set("id", json!("seven")).unwrap_err();
    assert!(matches!(err, SchemaError::TypeMismatch { .. }));
    let err = p.set("categories", json!({"id": 1})).unwrap_err();
    assert!(matches!(err, SchemaError::TypeMismatch { .. }));
    p.set("categories", json!([{"id": 1}])).unwrap();
    p.set("supplier", json!({"id": 3, "name": "Acme"})).unwrap();
}

#[test]
fn non_nullable_rejects_null_nullable_accepts_it() {
    let mut p = product();
    assert!(matches!(
        p.set("name", json!(null)),
        Err(SchemaError::NullViolation { .. })
    ));
    p.set("description", json!(null)).unwrap();
}

#[test]
fn unknown_property_is_reported() {
    let mut p = product();
    assert!(matches!(p.get("colour"), Err(SchemaError::UnknownProperty { .. })));
    assert!(matches!(
        p.set("colour", json!("red")),
        Err(SchemaError::UnknownProperty { .. })
    ));
}

#[test]
fn complete_object_validates_and_exposes_key() {
    let schema = Schema::parse(SCHEMA).unwrap();
    let p = EntityObject::from_value(
        schema.entity("Product").unwrap(),
        json!({"id": 1, "name": "Widget", "price": 2.5}),
    )
    .unwrap();
    p.validate().unwrap();
    assert_eq!(p.key(), &json!(1));
    assert_eq!(p.to_value()["name"], json!("Widget"));
}

#[test]
fn merged_schemas_keep_both_sets() {
    let mut schema = Schema::parse(SCHEMA).unwrap();
    let extra = Schema::parse(
        r#"{"Category": {"type": "entity", "key": "id", "properties": {"id": {"type": "int"}}}}"#,
    )
    .unwrap();
    schema.merge(extra);
    assert_eq!(schema.names().collect::<Vec<_>>(), vec!["Category", "Product", "Supplier"]);
}
