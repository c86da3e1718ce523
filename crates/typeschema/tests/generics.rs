// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants

//! Generic records: parametrized aliases, inheritance chains, unbound
//! type variables.

use serde_json::json;
use std::sync::Arc;
use typeschema::types::{RecordBuilder, RecordDef, TypeDesc, TypeVar};
use typeschema::{class_schema, SchemaError, Value};

fn boxed(t: &TypeVar) -> Arc<RecordDef> {
    RecordBuilder::new("Box")
        .type_param(t)
        .field("data", TypeDesc::var(t))
        .build()
}

#[test]
fn test_parametrized_alias() {
    let t = TypeVar::new("T");
    let boxed = boxed(&t);

    let ints = class_schema(TypeDesc::generic(&boxed, vec![TypeDesc::int()]), None).unwrap();
    let loaded = ints.load(&json!({"data": 1})).unwrap();
    let record = loaded.as_record().unwrap();
    assert_eq!(record.name(), "Box");
    assert_eq!(record.get("data"), Some(&Value::Int(1)));

    let err = ints.load(&json!({"data": "one"})).unwrap_err();
    assert_eq!(
        err.validation().unwrap().messages_json(),
        json!({"data": ["Not a valid integer."]})
    );

    let strs = class_schema(TypeDesc::generic(&boxed, vec![TypeDesc::str()]), None).unwrap();
    assert!(strs.load(&json!({"data": "one"})).is_ok());
    assert!(!Arc::ptr_eq(&ints, &strs));

    let again = class_schema(TypeDesc::generic(&boxed, vec![TypeDesc::int()]), None).unwrap();
    assert!(Arc::ptr_eq(&ints, &again));
}

#[test]
fn test_unparametrized_generic_is_rejected() {
    let t = TypeVar::new("T");
    let boxed = boxed(&t);
    let err = class_schema(&boxed, None).unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnboundTypeVar {
            record: "Box".into(),
            fields: vec!["data".into()],
        }
    );
    assert!(err.is_unbound_typevar());
}

#[test]
fn test_wrong_number_of_arguments() {
    let t = TypeVar::new("T");
    let boxed = boxed(&t);
    let err = class_schema(
        TypeDesc::generic(&boxed, vec![TypeDesc::int(), TypeDesc::str()]),
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::TypeArity {
            expected: 1,
            found: 2,
            ..
        }
    ));
}

#[test]
fn test_concrete_subclass_adds_fields() {
    let t = TypeVar::new("T");
    let boxed = boxed(&t);
    let labelled = RecordBuilder::new("LabelledIntBox")
        .base(TypeDesc::generic(&boxed, vec![TypeDesc::int()]))
        .field_with_default("label", TypeDesc::str(), "")
        .build();

    let schema = class_schema(&labelled, None).unwrap();
    let names: Vec<_> = schema.fields().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["data", "label"]);

    let loaded = schema.load(&json!({"data": 7, "label": "seven"})).unwrap();
    assert_eq!(loaded.as_record().unwrap().name(), "LabelledIntBox");
    assert_eq!(
        schema.dump(&loaded).unwrap(),
        json!({"data": 7, "label": "seven"})
    );
}

#[test]
fn test_three_level_chain() {
    let t = TypeVar::new("T");
    let u = TypeVar::new("U");
    let base = RecordBuilder::new("Base")
        .type_param(&t)
        .field("items", TypeDesc::list(TypeDesc::var(&t)))
        .build();
    let middle = RecordBuilder::new("Middle")
        .base(TypeDesc::generic(&base, vec![TypeDesc::var(&u)]))
        .field("first", TypeDesc::optional(TypeDesc::var(&u)))
        .build();
    let leaf = RecordBuilder::new("Leaf")
        .base(TypeDesc::generic(&middle, vec![TypeDesc::float()]))
        .build();

    let schema = class_schema(&leaf, None).unwrap();
    let loaded = schema.load(&json!({"items": [1, 2.5], "first": 1})).unwrap();
    let record = loaded.as_record().unwrap();
    assert_eq!(
        record.get("items"),
        Some(&Value::List(vec![Value::Float(1.0), Value::Float(2.5)]))
    );
    assert_eq!(record.get("first"), Some(&Value::Float(1.0)));

    let err = schema.load(&json!({"items": ["x"]})).unwrap_err();
    assert_eq!(
        err.validation().unwrap().messages_json(),
        json!({"items": {"0": ["Not a valid number."]}})
    );
}

#[test]
fn test_same_variable_binds_sibling_fields() {
    let t = TypeVar::new("T");
    let pair = RecordBuilder::new("Pair")
        .type_param(&t)
        .field("left", TypeDesc::var(&t))
        .field("right", TypeDesc::var(&t))
        .build();
    let schema = class_schema(TypeDesc::generic(&pair, vec![TypeDesc::bool()]), None).unwrap();
    assert!(schema.load(&json!({"left": true, "right": false})).is_ok());
    assert!(schema.load(&json!({"left": true, "right": "no"})).is_err());
}

#[test]
fn test_generic_field_inside_generic_record() {
    let t = TypeVar::new("T");
    let boxed = boxed(&t);
    let u = TypeVar::new("U");
    let wrapper = RecordBuilder::new("Wrapper")
        .type_param(&u)
        .field("inner", TypeDesc::generic(&boxed, vec![TypeDesc::var(&u)]))
        .field("all", TypeDesc::list(TypeDesc::var(&u)))
        .build();

    let schema = class_schema(TypeDesc::generic(&wrapper, vec![TypeDesc::str()]), None).unwrap();
    let loaded = schema
        .load(&json!({"inner": {"data": "a"}, "all": ["b"]}))
        .unwrap();
    let inner = loaded.as_record().unwrap().get("inner").unwrap();
    assert_eq!(inner.as_record().unwrap().name(), "Box");

    // The nested Box[str] schema was published on its own.
    let box_str = class_schema(TypeDesc::generic(&boxed, vec![TypeDesc::str()]), None).unwrap();
    assert!(box_str.load(&json!({"data": 1})).is_err());
}

#[test]
fn test_partial_parametrization() {
    let k = TypeVar::new("K");
    let v = TypeVar::new("V");
    let entry = RecordBuilder::new("Entry")
        .type_param(&k)
        .type_param(&v)
        .field("key", TypeDesc::var(&k))
        .field("value", TypeDesc::var(&v))
        .build();

    let string_keyed = TypeDesc::generic(&entry, vec![TypeDesc::str(), TypeDesc::var(&v)]);
    let concrete = string_keyed.parametrize(vec![TypeDesc::int()]).unwrap();
    assert_eq!(concrete.to_string(), "Entry[str, int]");

    let schema = class_schema(concrete, None).unwrap();
    assert!(schema.load(&json!({"key": "a", "value": 1})).is_ok());
    assert!(schema.load(&json!({"key": 1, "value": 1})).is_err());

    let err = string_keyed
        .parametrize(vec![TypeDesc::int(), TypeDesc::int()])
        .unwrap_err();
    assert!(matches!(err, SchemaError::TypeArity { .. }));
}

#[test]
fn test_generic_subclass_keeps_parameter_open() {
    let t = TypeVar::new("T");
    let boxed = boxed(&t);
    let s = TypeVar::new("S");
    let stamped = RecordBuilder::new("Stamped")
        .type_param(&s)
        .base(TypeDesc::generic(&boxed, vec![TypeDesc::var(&s)]))
        .field("stamp", TypeDesc::int())
        .build();

    let err = class_schema(&stamped, None).unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnboundTypeVar {
            record: "Stamped".into(),
            fields: vec!["data".into()],
        }
    );

    let schema = class_schema(TypeDesc::generic(&stamped, vec![TypeDesc::str()]), None).unwrap();
    assert!(schema.load(&json!({"data": "x", "stamp": 1})).is_ok());
}
