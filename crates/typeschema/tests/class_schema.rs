// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::too_many_lines)] // Test code

//! End-to-end compilation of record types into schemas.

use serde_json::json;
use std::sync::Arc;
use typeschema::fields::{FieldClass, FieldKind, FieldMetadata, Validator};
use typeschema::schema::{BaseSchema, Hook, SchemaOptions, Unknown};
use typeschema::types::{
    url, FieldDef, PrimitiveKind, RecordBuilder, RecordDef, TypeDesc, TypeKey,
};
use typeschema::{add_schema, class_schema, CompileWarning, LoadError, SchemaError, Value};

fn messages(err: LoadError) -> serde_json::Value {
    err.validation()
        .map(|e| e.messages_json())
        .unwrap_or_else(|| panic!("expected a validation error, got {err}"))
}

fn city_and_building() -> (Arc<RecordDef>, Arc<RecordDef>) {
    let building = RecordBuilder::new("Building")
        .field_with_metadata(
            "height",
            TypeDesc::float(),
            FieldMetadata::new().with_validator(Validator::range(Some(0.0), None)),
        )
        .field_with_default("name", TypeDesc::str(), "anonymous")
        .build();
    let city = RecordBuilder::new("City")
        .field("name", TypeDesc::optional(TypeDesc::str()))
        .field_with_factory("buildings", TypeDesc::list(TypeDesc::record(&building)), || {
            Value::List(Vec::new())
        })
        .build();
    (city, building)
}

#[test]
fn test_nested_records_round_trip() {
    let (city, _) = city_and_building();
    let schema = class_schema(&city, None).unwrap();

    let paris = schema
        .load(&json!({
            "name": "Paris",
            "buildings": [{"name": "Eiffel Tower", "height": 324}]
        }))
        .unwrap();
    let record = paris.as_record().unwrap();
    let buildings = record.get("buildings").and_then(Value::as_slice).unwrap();
    let tower = buildings[0].as_record().unwrap();
    assert_eq!(tower.name(), "Building");
    assert_eq!(tower.get("height"), Some(&Value::Float(324.0)));

    assert_eq!(
        schema.dump(&paris).unwrap(),
        json!({
            "name": "Paris",
            "buildings": [{"height": 324.0, "name": "Eiffel Tower"}]
        })
    );
}

#[test]
fn test_defaults_and_optional_fields() {
    let (city, _) = city_and_building();
    let schema = class_schema(&city, None).unwrap();

    let empty = schema.load(&json!({})).unwrap();
    let record = empty.as_record().unwrap();
    assert_eq!(record.get("name"), Some(&Value::Null));
    assert_eq!(record.get("buildings"), Some(&Value::List(Vec::new())));
    assert_eq!(
        schema.dump(&empty).unwrap(),
        json!({"name": null, "buildings": []})
    );
}

#[test]
fn test_required_field_with_default() {
    let server = RecordBuilder::new("Server")
        .field_def(
            FieldDef::new("port", TypeDesc::int())
                .with_default(8080)
                .with_metadata(FieldMetadata::new().with_required(true)),
        )
        .build();
    let schema = class_schema(&server, None).unwrap();

    let err = schema.load(&json!({})).unwrap_err();
    assert_eq!(
        messages(err),
        json!({"port": ["Missing data for required field."]})
    );

    let loaded = schema.load(&json!({"port": 443})).unwrap();
    assert_eq!(loaded.as_record().unwrap().get("port"), Some(&Value::Int(443)));
    assert_eq!(
        schema.dump(&Value::Map(Vec::new())).unwrap(),
        json!({"port": 8080})
    );
}

#[test]
fn test_nested_errors_are_keyed() {
    let (city, _) = city_and_building();
    let schema = class_schema(&city, None).unwrap();
    let err = schema
        .load(&json!({"name": "Paris", "buildings": [{"height": -1}]}))
        .unwrap_err();
    assert_eq!(
        messages(err),
        json!({"buildings": {"0": {"height": ["Must be greater than or equal to 0."]}}})
    );
}

#[test]
fn test_url_alias() {
    let site = RecordBuilder::new("Website").field("url", url()).build();
    let schema = class_schema(&site, None).unwrap();
    assert!(schema.load(&json!({"url": "https://example.org/a"})).is_ok());
    let err = schema.load(&json!({"url": "not a url"})).unwrap_err();
    assert_eq!(messages(err), json!({"url": ["Not a valid URL."]}));
}

#[test]
fn test_record_level_validation() {
    let never = RecordBuilder::new("NeverValid")
        .field("n", TypeDesc::int())
        .hook(Hook::validates_schema("validate", |_| {
            Err(typeschema::ValidationError::new("never valid"))
        }))
        .build();
    let schema = class_schema(&never, None).unwrap();
    let err = schema.load(&json!({"n": 1})).unwrap_err();
    assert_eq!(messages(err), json!({"_schema": ["never valid"]}));
}

#[test]
fn test_schemas_are_cached_per_base() {
    let (city, building) = city_and_building();
    let first = class_schema(&city, None).unwrap();
    let second = class_schema(&city, None).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let explicit = class_schema(&city, Some(BaseSchema::default_base())).unwrap();
    assert!(Arc::ptr_eq(&first, &explicit));

    let custom = BaseSchema::builder("Custom").build();
    let other = class_schema(&city, Some(&custom)).unwrap();
    assert!(!Arc::ptr_eq(&first, &other));

    // The nested field of City points at the cached Building schema.
    let nested = first
        .field("buildings")
        .and_then(|f| f.inner())
        .map(|f| f.kind().clone())
        .unwrap();
    let FieldKind::Nested(target) = nested else {
        panic!("expected a nested item field");
    };
    let building_schema = class_schema(&building, None).unwrap();
    assert!(Arc::ptr_eq(&target.get().unwrap(), &building_schema));
}

#[test]
fn test_base_schema_type_table() {
    let strict_ints = BaseSchema::builder("StrictInts")
        .field_class(
            TypeKey::Primitive(PrimitiveKind::Str),
            FieldClass::email(),
        )
        .build();
    let contact = RecordBuilder::new("Contact")
        .field("address", TypeDesc::str())
        .field("age", TypeDesc::int())
        .build();
    let schema = class_schema(&contact, Some(&strict_ints)).unwrap();
    assert_eq!(schema.base_schema().name(), "StrictInts");
    assert_eq!(schema.field("address").unwrap().class_name(), "Email");

    let err = schema
        .load(&json!({"address": "nobody", "age": 3}))
        .unwrap_err();
    assert_eq!(
        messages(err),
        json!({"address": ["Not a valid email address."]})
    );
}

#[test]
fn test_hooks_and_options_inherit_from_base() {
    let base = BaseSchema::builder("Tagged")
        .hook(Hook::post_dump("tag", |mut out| {
            out.insert("from".into(), json!("base"));
            Ok(out)
        }))
        .hook(Hook::post_dump("stamp", |mut out| {
            out.insert("stamped".into(), json!(true));
            Ok(out)
        }))
        .options(SchemaOptions::new().unknown(Unknown::Exclude))
        .build();

    let plain = RecordBuilder::new("Plain").field("a", TypeDesc::int()).build();
    let schema = class_schema(&plain, Some(&base)).unwrap();
    let loaded = schema.load(&json!({"a": 1, "junk": 0})).unwrap();
    assert_eq!(
        schema.dump(&loaded).unwrap(),
        json!({"a": 1, "from": "base", "stamped": true})
    );

    let overriding = RecordBuilder::new("Overriding")
        .field("a", TypeDesc::int())
        .hook(Hook::post_dump("tag", |mut out| {
            out.insert("from".into(), json!("record"));
            Ok(out)
        }))
        .options(SchemaOptions::new())
        .build();
    let schema = class_schema(&overriding, Some(&base)).unwrap();
    let names: Vec<_> = schema.hooks().iter().map(|h| h.name().to_string()).collect();
    assert_eq!(names, vec!["tag", "stamp"]);
    assert_eq!(schema.options().unknown, Unknown::Raise);

    let loaded = schema.load(&json!({"a": 1})).unwrap();
    assert_eq!(
        schema.dump(&loaded).unwrap(),
        json!({"a": 1, "from": "record", "stamped": true})
    );
}

#[test]
fn test_inherited_fields() {
    let base = RecordBuilder::new("Animal")
        .field("name", TypeDesc::str())
        .field_with_default("legs", TypeDesc::int(), 4)
        .build();
    let bird = RecordBuilder::new("Bird")
        .base(&base)
        .field_with_default("legs", TypeDesc::int(), 2)
        .field_with_default("can_fly", TypeDesc::bool(), true)
        .build();
    let schema = class_schema(&bird, None).unwrap();
    let names: Vec<_> = schema.fields().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["name", "legs", "can_fly"]);

    let loaded = schema.load(&json!({"name": "tweety"})).unwrap();
    assert_eq!(
        schema.dump(&loaded).unwrap(),
        json!({"name": "tweety", "legs": 2, "can_fly": true})
    );
}

#[test]
fn test_annotated_class_is_coerced() {
    let plain = RecordBuilder::new("Annotated")
        .annotated()
        .field("a", TypeDesc::int())
        .field_with_default("b", TypeDesc::str(), "x")
        .build();
    let schema = class_schema(&plain, None).unwrap();
    assert_eq!(
        schema.warnings(),
        &[CompileWarning::CoercedAnnotatedClass {
            record: "Annotated".into()
        }]
    );
    let loaded = schema.load(&json!({"a": 1})).unwrap();
    let record = loaded.as_record().unwrap();
    assert_eq!(record.get("a"), Some(&Value::Int(1)));
    assert_eq!(record.get("b"), Some(&Value::from("x")));
}

#[test]
fn test_invalid_classes() {
    let empty = RecordBuilder::new("Empty").annotated().build();
    let err = class_schema(&empty, None).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidClass { ref name, .. } if name == "Empty"));

    let misordered = RecordBuilder::new("Misordered")
        .annotated()
        .field_with_default("a", TypeDesc::int(), 1)
        .field("b", TypeDesc::int())
        .build();
    let err = class_schema(&misordered, None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Misordered is not a dataclass and cannot be turned into one. \
         non-default argument 'b' follows default argument"
    );

    let err = class_schema(TypeDesc::int(), None).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidClass { .. }));
}

#[test]
fn test_empty_dataclass_is_valid() {
    let unit = RecordBuilder::new("Unit").build();
    let schema = class_schema(&unit, None).unwrap();
    assert!(schema.fields().is_empty());
    assert!(schema.load(&json!({})).is_ok());
}

#[test]
fn test_add_schema_attribute() {
    let record = RecordBuilder::new("Later").field("x", TypeDesc::int()).build();
    assert!(!record.has_schema_attribute());

    let decorated = add_schema(&TypeDesc::record(&record), None).unwrap();
    assert!(decorated.has_schema_attribute());
    let first = decorated.schema().unwrap();
    let second = record.schema().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let t = typeschema::TypeVar::new("T");
    let generic = RecordBuilder::new("Box").type_param(&t).build();
    let err = add_schema(&TypeDesc::generic(&generic, vec![TypeDesc::int()]), None).unwrap_err();
    assert_eq!(err, SchemaError::GenericAlias { name: "Box[int]".into() });
}

#[test]
fn test_schema_attribute_uses_its_base() {
    let upper = BaseSchema::builder("Emails")
        .field_class(
            TypeKey::Primitive(PrimitiveKind::Str),
            FieldClass::email(),
        )
        .build();
    let record = RecordBuilder::new("Subscriber")
        .field("address", TypeDesc::str())
        .with_schema_base(&upper)
        .build();
    let schema = record.schema().unwrap();
    assert_eq!(schema.base_schema().name(), "Emails");
    assert!(Arc::ptr_eq(&schema, &class_schema(&record, Some(&upper)).unwrap()));
}
