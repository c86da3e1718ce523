// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::float_cmp)] // Test assertions with constants

//! Single-field compilation through `field_for_schema`.

use serde_json::json;
use std::sync::Arc;
use typeschema::compiler::FieldCompiler;
use typeschema::fields::{Field, FieldClass, FieldKind, FieldMetadata, SchemaRef, Validator};
use typeschema::schema::BaseSchema;
use typeschema::types::{
    ContainerKind, DefaultValue, EnumBuilder, NewTypeDef, RecordBuilder, TypeDesc, TypeKey,
    TypeVar,
};
use typeschema::{class_schema, field_for_schema, CompileWarning, LoadError, SchemaError, Value};

fn field(ty: TypeDesc) -> Field {
    field_for_schema(ty, None, FieldMetadata::new(), None).unwrap()
}

fn messages(err: LoadError) -> serde_json::Value {
    err.validation()
        .map(|e| e.messages_json())
        .unwrap_or_else(|| panic!("expected a validation error, got {err}"))
}

#[test]
fn test_optional_field() {
    let f = field(TypeDesc::optional(TypeDesc::int()));
    assert!(!f.is_required());
    assert!(f.allows_none());
    assert_eq!(f.deserialize(&json!(null)).unwrap(), Value::Null);
    assert_eq!(f.deserialize(&json!(3)).unwrap(), Value::Int(3));
}

#[test]
fn test_union_picks_first_matching_member() {
    let f = field(TypeDesc::union(vec![TypeDesc::int(), TypeDesc::str()]));
    assert_eq!(f.deserialize(&json!(42)).unwrap(), Value::Int(42));
    assert_eq!(f.deserialize(&json!("42")).unwrap(), Value::from("42"));
    assert_eq!(f.serialize(&Value::Int(42)).unwrap(), json!(42));
    assert_eq!(f.serialize(&Value::from("42")).unwrap(), json!("42"));
    assert!(f.deserialize(&json!(null)).is_err());

    let nullable = field(TypeDesc::optional(TypeDesc::union(vec![
        TypeDesc::int(),
        TypeDesc::str(),
    ])));
    assert!(nullable.allows_none());
    assert_eq!(nullable.union_members().map(<[_]>::len), Some(2));
}

#[test]
fn test_optional_of_single_member_collapses() {
    let f = field(TypeDesc::union(vec![TypeDesc::str(), TypeDesc::None]));
    assert!(f.union_members().is_none());
    assert_eq!(f.class_name(), "String");
    assert!(f.allows_none());
}

#[test]
fn test_literal_fields() {
    let choice = field(TypeDesc::literal(["a", "b"]));
    assert_eq!(choice.deserialize(&json!("a")).unwrap(), Value::from("a"));
    let err = choice.deserialize(&json!("c")).unwrap_err();
    assert_eq!(messages(err), json!(["Must be one of: a, b."]));

    let single = field(TypeDesc::literal(["only"]));
    let err = single.deserialize(&json!("other")).unwrap_err();
    assert_eq!(messages(err), json!(["Must be equal to only."]));
    assert!(single.deserialize(&json!(1)).is_err());
    assert!(single.deserialize(&json!(true)).is_err());
}

#[test]
fn test_mixed_literal_matches_exact_values() {
    let f = field(TypeDesc::Literal(vec![
        Value::from("a"),
        Value::Int(1),
        Value::Float(1.23),
        Value::Bool(true),
    ]));
    for accepted in [json!("a"), json!(1), json!(1.23), json!(true)] {
        let loaded = f.deserialize(&accepted).unwrap();
        assert_eq!(f.serialize(&loaded).unwrap(), accepted);
    }
    for rejected in [json!(false), json!(2), json!(1.0), json!("b")] {
        assert!(f.deserialize(&rejected).is_err(), "{rejected} was accepted");
    }
}

#[test]
fn test_final_fields() {
    let f = field(TypeDesc::final_of(TypeDesc::int()));
    assert!(matches!(f.kind(), FieldKind::Scalar(_)));
    assert_eq!(f.class_name(), "Integer");

    let mut compiler = FieldCompiler::new(None);
    let factory = DefaultValue::factory(|| Value::List(Vec::new()));
    let f = compiler
        .compile(&TypeDesc::final_untyped(), Some(&factory), FieldMetadata::new())
        .unwrap();
    assert_eq!(f.class_name(), "Raw");
    assert_eq!(compiler.warnings(), &[CompileWarning::FinalFromFactory]);
    let anything = [
        json!(null),
        json!(1),
        json!(2.5),
        json!("s"),
        json!(true),
        json!([1, "x"]),
        json!({"k": [null]}),
    ];
    for any in anything {
        let loaded = f.deserialize(&any).unwrap();
        assert_eq!(f.serialize(&loaded).unwrap(), any);
    }

    let mut compiler = FieldCompiler::new(None);
    compiler
        .compile(&TypeDesc::final_untyped(), None, FieldMetadata::new())
        .unwrap();
    assert_eq!(compiler.warnings(), &[CompileWarning::FinalWithoutType]);
}

#[test]
fn test_collections() {
    let ints = field(TypeDesc::list(TypeDesc::int()));
    assert_eq!(
        ints.deserialize(&json!([1, 2])).unwrap(),
        Value::List(vec![Value::Int(1), Value::Int(2)])
    );
    let err = ints.deserialize(&json!([1, "x"])).unwrap_err();
    assert_eq!(messages(err), json!({"1": ["Not a valid integer."]}));

    let scores = field(TypeDesc::mapping(TypeDesc::str(), TypeDesc::float()));
    let loaded = scores.deserialize(&json!({"ada": 1})).unwrap();
    assert_eq!(
        loaded,
        Value::Map(vec![(Value::from("ada"), Value::Float(1.0))])
    );
    assert_eq!(scores.serialize(&loaded).unwrap(), json!({"ada": 1.0}));

    let pair = field(TypeDesc::tuple(vec![TypeDesc::str(), TypeDesc::int()]));
    assert_eq!(
        pair.deserialize(&json!(["a", 1])).unwrap(),
        Value::Tuple(vec![Value::from("a"), Value::Int(1)])
    );

    let open = field(TypeDesc::var_tuple(TypeDesc::int()));
    assert_eq!(open.class_name(), "Sequence");

    let err = field_for_schema(
        TypeDesc::Container {
            kind: ContainerKind::List,
            args: vec![TypeDesc::int(), TypeDesc::str()],
        },
        None,
        FieldMetadata::new(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::TypeArity { .. }));
}

#[test]
fn test_enum_fields() {
    let color = EnumBuilder::new("Color")
        .member("red", "r")
        .member("green", "g")
        .build();
    let by_name = field(TypeDesc::enumeration(&color));
    let red = by_name.deserialize(&json!("red")).unwrap();
    assert_eq!(by_name.serialize(&red).unwrap(), json!("red"));

    let by_value = field_for_schema(
        TypeDesc::enumeration(&color),
        None,
        FieldMetadata::new().with_by_value(true),
        None,
    )
    .unwrap();
    assert_eq!(by_value.deserialize(&json!("r")).unwrap(), red);
    assert_eq!(by_value.serialize(&red).unwrap(), json!("r"));
}

#[test]
fn test_any_accepts_everything() {
    let f = field(TypeDesc::Any);
    assert!(f.allows_none());
    assert_eq!(f.deserialize(&json!(null)).unwrap(), Value::Null);
    let nested = f.deserialize(&json!({"a": [1]})).unwrap();
    assert_eq!(f.serialize(&nested).unwrap(), json!({"a": [1]}));
}

#[test]
fn test_newtype_fields() {
    let percent = NewTypeDef::new("Percent", TypeDesc::int())
        .with_validator(Validator::range(Some(0.0), Some(100.0)))
        .build();
    let f = field(TypeDesc::newtype(&percent));
    assert_eq!(f.deserialize(&json!(50)).unwrap(), Value::Int(50));
    let err = f.deserialize(&json!(150)).unwrap_err();
    assert_eq!(
        messages(err),
        json!(["Must be greater than or equal to 0 and less than or equal to 100."])
    );

    let contact = NewTypeDef::new("Contact", TypeDesc::str())
        .with_field_class(FieldClass::email())
        .build();
    let f = field(TypeDesc::newtype(&contact));
    assert_eq!(f.class_name(), "Email");
    assert_eq!(f.options().description.as_deref(), Some("Contact"));
}

#[test]
fn test_predefined_field_is_used_verbatim() {
    let custom = field(TypeDesc::str());
    let f = field_for_schema(
        TypeDesc::int(),
        None,
        FieldMetadata::new().with_field(custom),
        None,
    )
    .unwrap();
    assert_eq!(f.class_name(), "String");
}

#[test]
fn test_metadata_passes_through() {
    let f = field_for_schema(
        TypeDesc::str(),
        None,
        FieldMetadata::new()
            .with_data_key("userName")
            .with_description("login"),
        None,
    )
    .unwrap();
    assert_eq!(f.data_key("user_name"), "userName");
    assert_eq!(f.options().description.as_deref(), Some("login"));
}

#[test]
fn test_base_schema_overrides_containers() {
    let base = BaseSchema::builder("Bags")
        .field_class(
            TypeKey::Container(ContainerKind::List),
            FieldClass::new("Bag", |inner, opts| {
                let item = inner.into_iter().next().map(Box::new).ok_or(
                    SchemaError::TypeArity {
                        name: "Bag".into(),
                        expected: 1,
                        found: 0,
                    },
                )?;
                Ok(Field::new("Bag", FieldKind::Set(item), opts))
            }),
        )
        .build();
    let f = field_for_schema(TypeDesc::list(TypeDesc::int()), None, FieldMetadata::new(), Some(&base))
        .unwrap();
    assert_eq!(f.class_name(), "Bag");
    assert_eq!(
        f.deserialize(&json!([2, 2, 1])).unwrap(),
        Value::set_of(vec![Value::Int(2), Value::Int(1)])
    );
}

#[test]
fn test_names_and_variables() {
    let f = field(TypeDesc::forward("int"));
    assert_eq!(f.class_name(), "Integer");

    let err = field_for_schema(TypeDesc::forward("Nope"), None, FieldMetadata::new(), None)
        .unwrap_err();
    assert!(matches!(err, SchemaError::UnresolvedForwardRef { ref name, .. } if name == "Nope"));

    let t = TypeVar::new("T");
    let err = field_for_schema(TypeDesc::var(&t), None, FieldMetadata::new(), None).unwrap_err();
    assert_eq!(err, SchemaError::UnboundTypeParameter { name: "T".into() });
    assert!(err.is_unbound_typevar());

    let err = field_for_schema(TypeDesc::None, None, FieldMetadata::new(), None).unwrap_err();
    assert!(matches!(err, SchemaError::UnrecognizedFieldType { .. }));
}

#[test]
fn test_nested_record_schema_is_published() {
    let point = RecordBuilder::new("FieldPoint")
        .field("x", TypeDesc::int())
        .build();
    let f = field(TypeDesc::record(&point));
    let FieldKind::Nested(SchemaRef::Resolved(schema)) = f.kind() else {
        panic!("expected a resolved nested field");
    };
    assert!(Arc::ptr_eq(schema, &class_schema(&point, None).unwrap()));

    let loaded = f.deserialize(&json!({"x": 1})).unwrap();
    assert_eq!(loaded.as_record().unwrap().name(), "FieldPoint");
}
