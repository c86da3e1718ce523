// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants

//! Self-referencing and mutually referencing records, forward references,
//! and the lazily computed `Schema` attribute.

use serde_json::json;
use std::sync::{Arc, Barrier, OnceLock};
use std::thread;
use typeschema::fields::{FieldClass, FieldKind, SchemaRef};
use typeschema::schema::BaseSchema;
use typeschema::types::{Module, Namespace, RecordBuilder, RecordDef, TypeDesc, TypeKey};
use typeschema::{class_schema, class_schema_in, SchemaError, Value};

#[test]
fn test_self_referencing_record() {
    let node = RecordBuilder::new("Node")
        .field("value", TypeDesc::int())
        .field_with_factory("children", TypeDesc::list(TypeDesc::forward("Node")), || {
            Value::List(Vec::new())
        })
        .build();
    let schema = class_schema(&node, None).unwrap();

    let data = json!({
        "value": 1,
        "children": [{"value": 2, "children": [{"value": 3}]}]
    });
    let tree = schema.load(&data).unwrap();
    let child = &tree
        .as_record()
        .and_then(|r| r.get("children"))
        .and_then(Value::as_slice)
        .unwrap()[0];
    assert_eq!(child.as_record().unwrap().name(), "Node");

    assert_eq!(
        schema.dump(&tree).unwrap(),
        json!({
            "value": 1,
            "children": [{"value": 2, "children": [{"value": 3, "children": []}]}]
        })
    );

    let err = schema
        .load(&json!({"value": 1, "children": [{"value": "x"}]}))
        .unwrap_err();
    assert_eq!(
        err.validation().unwrap().messages_json(),
        json!({"children": {"0": {"value": ["Not a valid integer."]}}})
    );
}

#[test]
fn test_self_reference_points_back_at_the_same_schema() {
    let link = RecordBuilder::new("Link")
        .field("next", TypeDesc::optional(TypeDesc::forward("Link")))
        .build();
    let schema = class_schema(&link, None).unwrap();
    let FieldKind::Nested(target) = schema.field("next").unwrap().kind() else {
        panic!("expected a nested field");
    };
    assert!(matches!(target, SchemaRef::Pending(_)));
    assert!(Arc::ptr_eq(&target.get().unwrap(), &schema));

    let chain = schema
        .load(&json!({"next": {"next": {"next": null}}}))
        .unwrap();
    assert_eq!(
        schema.dump(&chain).unwrap(),
        json!({"next": {"next": {"next": null}}})
    );
}

#[test]
fn test_mutually_referencing_records() {
    let module = Module::new("pair");
    let a = RecordBuilder::new("A")
        .module(&module)
        .field("b", TypeDesc::optional(TypeDesc::forward("B")))
        .build();
    let b = RecordBuilder::new("B")
        .module(&module)
        .field("a", TypeDesc::optional(TypeDesc::forward("A")))
        .build();

    let schema_a = class_schema(&a, None).unwrap();
    let loaded = schema_a.load(&json!({"b": {"a": null}})).unwrap();
    let inner = loaded.as_record().unwrap().get("b").unwrap();
    assert_eq!(inner.as_record().unwrap().name(), "B");
    assert_eq!(schema_a.dump(&loaded).unwrap(), json!({"b": {"a": null}}));

    // B was compiled and published while compiling A.
    let schema_b = class_schema(&b, None).unwrap();
    let loaded = schema_b.load(&json!({"a": {"b": {"a": null}}})).unwrap();
    assert_eq!(
        schema_b.dump(&loaded).unwrap(),
        json!({"a": {"b": {"a": null}}})
    );
}

#[test]
fn test_forward_reference_to_caller_local() {
    let holder = RecordBuilder::new("Holder")
        .field("item", TypeDesc::forward("LocalItem"))
        .build();
    let err = class_schema(&holder, None).unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnresolvedForwardRef {
            name: "LocalItem".into(),
            record: "Holder".into(),
        }
    );

    let item = RecordBuilder::new("LocalItem").field("n", TypeDesc::int()).build();
    let locals = Namespace::new().with("LocalItem", TypeDesc::record(&item));
    let schema = class_schema_in(&holder, None, &locals).unwrap();
    assert!(schema.load(&json!({"item": {"n": 1}})).is_ok());
}

#[test]
fn test_failed_compilation_is_not_cached() {
    let module = Module::new("late");
    let early = RecordBuilder::new("Early")
        .module(&module)
        .field("other", TypeDesc::forward("Later"))
        .build();
    assert!(class_schema(&early, None).is_err());

    let _later = RecordBuilder::new("Later")
        .module(&module)
        .field("x", TypeDesc::int())
        .build();
    let schema = class_schema(&early, None).unwrap();
    assert!(schema.load(&json!({"other": {"x": 1}})).is_ok());
}

#[test]
fn test_decorated_self_reference_is_lazy() {
    let tree = RecordBuilder::new("Tree")
        .field_with_factory("children", TypeDesc::list(TypeDesc::forward("Tree")), || {
            Value::List(Vec::new())
        })
        .with_schema()
        .build();
    let schema = tree.schema().unwrap();
    let item = schema.field("children").and_then(|f| f.inner()).unwrap();
    assert!(matches!(item.kind(), FieldKind::Nested(SchemaRef::Lazy(_))));

    let loaded = schema
        .load(&json!({"children": [{"children": []}, {}]}))
        .unwrap();
    assert_eq!(
        schema.dump(&loaded).unwrap(),
        json!({"children": [{"children": []}, {"children": []}]})
    );
}

#[test]
fn test_schema_attribute_is_computed_once_across_threads() {
    let record = RecordBuilder::new("Shared")
        .field("n", TypeDesc::int())
        .with_schema()
        .build();

    let barrier = Arc::new(Barrier::new(8));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let record = Arc::clone(&record);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            record.schema().unwrap()
        }));
    }
    let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for schema in &schemas[1..] {
        assert!(Arc::ptr_eq(schema, &schemas[0]));
    }
}

#[test]
fn test_schema_attribute_reentry_is_an_error() {
    let slot: Arc<OnceLock<Arc<RecordDef>>> = Arc::new(OnceLock::new());
    let reader = Arc::clone(&slot);
    let base = BaseSchema::builder("Reentrant")
        .field_class(
            TypeKey::Opaque("Trigger".into()),
            FieldClass::new("Trigger", move |_, opts| {
                if let Some(record) = reader.get() {
                    record.schema()?;
                }
                FieldClass::raw().instantiate(Vec::new(), opts)
            }),
        )
        .build();
    let record = RecordBuilder::new("Cyclic")
        .field("t", TypeDesc::opaque("Trigger"))
        .with_schema_base(&base)
        .build();
    assert!(slot.set(Arc::clone(&record)).is_ok());

    let err = record.schema().unwrap_err();
    assert!(matches!(err, SchemaError::RecursiveEvaluation(_)));
    assert_eq!(err.to_string(), "recursive evaluation of Cyclic.Schema");
}

#[test]
fn test_partial_load_reaches_nested_schemas() {
    let building = RecordBuilder::new("Tower")
        .field("height", TypeDesc::float())
        .field("name", TypeDesc::str())
        .build();
    let city = RecordBuilder::new("Town")
        .field("name", TypeDesc::str())
        .field("tower", TypeDesc::record(&building))
        .build();
    let schema = class_schema(&city, None).unwrap();

    let attrs = schema
        .load_to_dict(&json!({"tower": {"name": "Eiffel"}}), true)
        .unwrap();
    assert!(attrs.get("name").is_none());
    assert_eq!(
        attrs.get("tower"),
        Some(&Value::Map(vec![(Value::from("name"), Value::from("Eiffel"))]))
    );

    let err = schema
        .load_to_dict(&json!({"tower": {"name": "Eiffel"}}), false)
        .unwrap_err();
    assert_eq!(
        err.validation().unwrap().messages_json(),
        json!({
            "name": ["Missing data for required field."],
            "tower": {"height": ["Missing data for required field."]}
        })
    );
}
