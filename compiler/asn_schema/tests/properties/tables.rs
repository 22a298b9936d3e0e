use asn_schema::{
    ClassField, ClassType, ConstraintTemplate, ErrorCode, FieldKind, FieldPath, FieldValue,
    ModuleId, ObjectValue, RelationItem, Schema, Scope, Setting, TypeId, TypeRef, Value,
};
use pretty_assertions::assert_eq;

use crate::common::{boolean, integer, names, record, schema_with_module, sequence};

fn object(schema: &Schema, id: i64, ty: TypeRef) -> Value {
    Value::Object(ObjectValue::new(vec![
        FieldValue::new(schema.intern("&id"), Setting::Value(Value::Integer(id))),
        FieldValue::new(schema.intern("&Type"), Setting::Type(ty)),
    ]))
}

fn class_field(schema: &mut Schema, field: &str) -> TypeRef {
    let class = schema.type_ref("ID-CLASS");
    let path = FieldPath::single(schema.intern(field));
    schema.class_field(class, path).unwrap()
}

/// ```text
/// ID-CLASS ::= CLASS { &id INTEGER UNIQUE, &Type }
/// number ID-CLASS ::= { &id 1, &Type INTEGER }
/// flag ID-CLASS ::= { &id 2, &Type BOOLEAN }
/// Objects ID-CLASS ::= { number | flag, ... }   -- extensible when asked
/// Message ::= SEQUENCE {
///     id    ID-CLASS.&id ({Objects}),
///     value ID-CLASS.&Type ({Objects}{@id})
/// }
/// ```
fn message_schema(extensible: bool) -> (Schema, ModuleId, TypeId) {
    message_schema_with(extensible, true, 2)
}

/// As [`message_schema`], with `&id` optionally not UNIQUE and `flag`
/// carrying `flag_id`.
fn message_schema_with(
    extensible: bool,
    unique: bool,
    flag_id: i64,
) -> (Schema, ModuleId, TypeId) {
    let (mut schema, module) = schema_with_module();
    let [class, number, flag, objects, message] =
        names(&schema, ["ID-CLASS", "number", "flag", "Objects", "Message"]);

    let id_type = integer(&mut schema);
    let fields = vec![
        ClassField::required(
            schema.intern("&id"),
            FieldKind::FixedValue {
                ty: id_type,
                unique,
            },
        ),
        ClassField::required(schema.intern("&Type"), FieldKind::Type),
    ];
    let class_type = schema.class(ClassType::new(fields)).unwrap();
    schema.define_type(module, class, class_type).unwrap();

    let number_type = integer(&mut schema);
    let number_object = object(&schema, 1, number_type);
    schema
        .define_value(module, number, schema.type_ref("ID-CLASS"), number_object)
        .unwrap();
    let flag_type = boolean(&mut schema);
    let flag_object = object(&schema, flag_id, flag_type);
    schema
        .define_value(module, flag, schema.type_ref("ID-CLASS"), flag_object)
        .unwrap();

    let members = ConstraintTemplate::Union(vec![
        ConstraintTemplate::Value(Value::reference(number)),
        ConstraintTemplate::Value(Value::reference(flag)),
    ]);
    let set = if extensible {
        ConstraintTemplate::extensible(Some(members), None)
    } else {
        ConstraintTemplate::element_set(members)
    };
    schema
        .define_value_set(module, objects, schema.type_ref("ID-CLASS"), set)
        .unwrap();

    let id_field = class_field(&mut schema, "&id");
    let id_component = schema
        .constrained(
            id_field,
            ConstraintTemplate::Table {
                object_set: schema.type_ref("Objects"),
                relations: Vec::new(),
            },
        )
        .unwrap();
    let open_field = class_field(&mut schema, "&Type");
    let relation = RelationItem::absolute(vec![schema.intern("id")]);
    let value_component = schema
        .constrained(
            open_field,
            ConstraintTemplate::Table {
                object_set: schema.type_ref("Objects"),
                relations: vec![relation],
            },
        )
        .unwrap();
    let body = sequence(&mut schema, vec![("id", id_component), ("value", value_component)]);
    let id = schema.define_type(module, message, body).unwrap();

    schema.validate_module(module).unwrap();
    (schema, module, id)
}

fn object_type(schema: &Schema, module: ModuleId, name: &str) -> TypeId {
    let def = schema.lookup_value_in(module, schema.intern(name)).unwrap();
    let value = schema.value_of(def).unwrap();
    match value.as_object().and_then(|o| o.field(schema.intern("&Type"))) {
        Some(Setting::Type(ty)) => ty.handle().unwrap(),
        other => panic!("object `{name}` has no type setting: {other:?}"),
    }
}

#[test]
fn object_set_lists_its_objects() {
    let (schema, module, _) = message_schema(false);
    let objects = schema.defined_type(module, schema.intern("Objects")).unwrap();
    let ids: Vec<_> = schema
        .element_set_values(objects)
        .unwrap()
        .iter()
        .map(|object| match object.as_object().and_then(|o| o.field(schema.intern("&id"))) {
            Some(Setting::Value(id)) => id.as_integer(),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec![Some(1), Some(2)]);
    assert!(!schema.element_set_is_extensible(objects).unwrap());
}

#[test]
fn open_type_follows_the_selected_object() {
    let (schema, module, message) = message_schema(false);
    let scope = Scope::module(module);
    let integer_type = object_type(&schema, module, "number");
    let boolean_type = object_type(&schema, module, "flag");

    let raw = record(&schema, vec![("id", Value::Integer(1)), ("value", Value::Integer(42))]);
    let optimized = schema.optimize(message, &scope, &raw).unwrap();
    assert_eq!(
        optimized.component(schema.intern("value")),
        Some(&Value::open_type(integer_type, Value::Integer(42)))
    );

    let raw = record(&schema, vec![("id", Value::Integer(2)), ("value", Value::Boolean(false))]);
    let optimized = schema.optimize(message, &scope, &raw).unwrap();
    assert_eq!(
        optimized.component(schema.intern("value")),
        Some(&Value::open_type(boolean_type, Value::Boolean(false)))
    );
}

#[test]
fn unknown_designator_and_wrong_value() {
    let (schema, module, message) = message_schema(false);
    let scope = Scope::module(module);

    let unknown = record(&schema, vec![("id", Value::Integer(3)), ("value", Value::Integer(42))]);
    let err = schema.accept(message, &scope, &unknown).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3002);
    assert!(err.is_violation());

    let mismatched =
        record(&schema, vec![("id", Value::Integer(2)), ("value", Value::Integer(42))]);
    let err = schema.accept(message, &scope, &mismatched).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3004);
}

#[test]
fn shared_designators_try_every_object() {
    // number and flag both have &id 1.
    let (schema, module, message) = message_schema_with(false, false, 1);
    let scope = Scope::module(module);
    let integer_type = object_type(&schema, module, "number");
    let boolean_type = object_type(&schema, module, "flag");

    let raw = record(&schema, vec![("id", Value::Integer(1)), ("value", Value::Integer(42))]);
    let optimized = schema.optimize(message, &scope, &raw).unwrap();
    assert_eq!(
        optimized.component(schema.intern("value")),
        Some(&Value::open_type(integer_type, Value::Integer(42)))
    );

    let raw = record(&schema, vec![("id", Value::Integer(1)), ("value", Value::Boolean(true))]);
    let optimized = schema.optimize(message, &scope, &raw).unwrap();
    assert_eq!(
        optimized.component(schema.intern("value")),
        Some(&Value::open_type(boolean_type, Value::Boolean(true)))
    );

    let raw = record(&schema, vec![("id", Value::Integer(1)), ("value", Value::Null)]);
    let err = schema.accept(message, &scope, &raw).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3004);
}

#[test]
fn extensible_object_sets_admit_unknown_objects() {
    let (schema, module, message) = message_schema(true);
    let scope = Scope::module(module);
    let objects = schema.defined_type(module, schema.intern("Objects")).unwrap();
    assert!(schema.element_set_is_extensible(objects).unwrap());

    let unknown = record(&schema, vec![("id", Value::Integer(3)), ("value", Value::Integer(42))]);
    assert_eq!(schema.optimize(message, &scope, &unknown).unwrap(), unknown);
}

#[test]
fn objects_are_checked_against_their_class() {
    let (mut schema, module, _) = message_schema(false);
    let bad = schema.intern("bad");
    // &id must be an INTEGER.
    let ty = integer(&mut schema);
    let object = Value::Object(ObjectValue::new(vec![
        FieldValue::new(schema.intern("&id"), Setting::Value(Value::Boolean(true))),
        FieldValue::new(schema.intern("&Type"), Setting::Type(ty)),
    ]));
    let def = schema
        .define_value(module, bad, schema.type_ref("ID-CLASS"), object)
        .unwrap();
    assert_eq!(schema.validate_defined_value(def).unwrap_err().code(), ErrorCode::E2009);

    let missing = schema.intern("missing");
    let object = Value::Object(ObjectValue::new(vec![FieldValue::new(
        schema.intern("&id"),
        Setting::Value(Value::Integer(9)),
    )]));
    let def = schema
        .define_value(module, missing, schema.type_ref("ID-CLASS"), object)
        .unwrap();
    assert_eq!(schema.validate_defined_value(def).unwrap_err().code(), ErrorCode::E2005);
}

#[test]
fn instance_of_type_identifier() {
    let (mut schema, module) = schema_with_module();
    let name = schema.intern("Wrapped");
    let class = schema.type_ref("TYPE-IDENTIFIER");
    let body = schema.instance_of(class).unwrap();
    let wrapped = schema.define_type(module, name, body).unwrap();
    schema.validate_module(module).unwrap();

    let inner = integer(&mut schema);
    let integer_type = schema.resolve_in(module, &inner).unwrap();
    let flag = boolean(&mut schema);
    let boolean_type = schema.resolve_in(module, &flag).unwrap();
    let scope = Scope::module(module);

    let value = record(
        &schema,
        vec![
            ("type-id", Value::Oid(vec![1, 2, 3])),
            ("value", Value::open_type(integer_type, Value::Integer(5))),
        ],
    );
    assert_eq!(schema.optimize(wrapped, &scope, &value).unwrap(), value);

    let mismatched = record(
        &schema,
        vec![
            ("type-id", Value::Oid(vec![1, 2, 3])),
            ("value", Value::open_type(boolean_type, Value::Integer(5))),
        ],
    );
    assert!(schema.accept(wrapped, &scope, &mismatched).unwrap_err().is_validation());

    let fields: Vec<_> = schema
        .named_types(wrapped)
        .unwrap()
        .into_iter()
        .map(|(name, _)| schema.name_str(name).to_owned())
        .collect();
    assert_eq!(fields, vec!["type-id".to_owned(), "value".to_owned()]);
}

#[test]
fn instance_of_an_object_set() {
    let (mut schema, module, _) = message_schema(false);
    let name = schema.intern("Carrier");
    let class = schema.type_ref("ID-CLASS");
    let objects = schema.type_ref("Objects");
    let body = schema.instance_of_set(class, objects).unwrap();
    let carrier = schema.define_type(module, name, body).unwrap();
    let carrier_ref = schema.type_ref("Carrier");
    assert_eq!(schema.resolve_in(module, &carrier_ref).unwrap(), carrier);

    let scope = Scope::module(module);
    let boolean_type = object_type(&schema, module, "flag");
    let accepted = record(
        &schema,
        vec![("type-id", Value::Integer(2)), ("value", Value::Boolean(true))],
    );
    let optimized = schema.optimize(carrier, &scope, &accepted).unwrap();
    assert_eq!(
        optimized.component(schema.intern("value")),
        Some(&Value::open_type(boolean_type, Value::Boolean(true)))
    );

    let mismatched = record(
        &schema,
        vec![("type-id", Value::Integer(2)), ("value", Value::Integer(5))],
    );
    let err = schema.accept(carrier, &scope, &mismatched).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3004);

    let unknown = record(
        &schema,
        vec![("type-id", Value::Integer(9)), ("value", Value::Integer(5))],
    );
    let err = schema.accept(carrier, &scope, &unknown).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3002);
}

/// ```text
/// VAR-CLASS ::= CLASS {
///     &Type,
///     &value &Type,
///     &Values &Type OPTIONAL,
///     &obj ID-CLASS OPTIONAL,
///     &nested &obj.&Type OPTIONAL
/// }
/// ```
fn variable_class(schema: &mut Schema, module: ModuleId) {
    let [class, ty, value, values, obj, nested] =
        names(schema, ["VAR-CLASS", "&Type", "&value", "&Values", "&obj", "&nested"]);
    let optional = |name, kind| ClassField::new(name, kind, true, None).unwrap();
    let fields = vec![
        ClassField::required(ty, FieldKind::Type),
        ClassField::required(value, FieldKind::VariableValue { path: FieldPath::single(ty) }),
        optional(values, FieldKind::VariableValueSet { path: FieldPath::single(ty) }),
        optional(obj, FieldKind::Object { class: schema.type_ref("ID-CLASS") }),
        optional(nested, FieldKind::VariableValue { path: FieldPath::new([obj, ty]) }),
    ];
    let body = schema.class(ClassType::new(fields)).unwrap();
    schema.define_type(module, class, body).unwrap();
}

#[test]
fn variable_type_fields_follow_the_object() {
    let (mut schema, module, _) = message_schema(false);
    variable_class(&mut schema, module);
    let [good, bad, ty] = names(&schema, ["good", "bad", "&Type"]);

    let governor = integer(&mut schema);
    let inner_type = boolean(&mut schema);
    let inline = object(&schema, 1, inner_type);
    let listed = ConstraintTemplate::element_set(ConstraintTemplate::Union(vec![
        ConstraintTemplate::Value(Value::Integer(1)),
        ConstraintTemplate::Value(Value::Integer(2)),
    ]));
    let setting = |name: &str, setting| FieldValue::new(schema.intern(name), setting);
    let value = Value::Object(ObjectValue::new(vec![
        setting("&Type", Setting::Type(governor)),
        setting("&value", Setting::Value(Value::Integer(5))),
        setting("&Values", Setting::ElementSet(Box::new(listed))),
        setting("&obj", Setting::Value(inline)),
        setting("&nested", Setting::Value(Value::Boolean(true))),
    ]));
    let def = schema
        .define_value(module, good, schema.type_ref("VAR-CLASS"), value)
        .unwrap();
    schema.validate_defined_value(def).unwrap();

    let validated = schema.value_of(def).unwrap();
    let object = validated.as_object().unwrap();
    assert_eq!(
        object.field(schema.intern("&value")),
        Some(&Setting::Value(Value::Integer(5)))
    );
    assert_eq!(
        object.field(schema.intern("&nested")),
        Some(&Setting::Value(Value::Boolean(true)))
    );
    let Some(Setting::ValueSet(set)) = object.field(schema.intern("&Values")) else {
        panic!("&Values is not a value set");
    };
    assert_eq!(
        schema.element_set_values(set.handle().unwrap()).unwrap(),
        vec![Value::Integer(1), Value::Integer(2)]
    );

    // &value is governed by &Type of the same object.
    let governor = boolean(&mut schema);
    let value = Value::Object(ObjectValue::new(vec![
        FieldValue::new(ty, Setting::Type(governor)),
        FieldValue::new(schema.intern("&value"), Setting::Value(Value::Integer(5))),
    ]));
    let def = schema
        .define_value(module, bad, schema.type_ref("VAR-CLASS"), value)
        .unwrap();
    assert_eq!(schema.validate_defined_value(def).unwrap_err().code(), ErrorCode::E2009);
}

#[test]
fn variable_type_paths_end_at_a_type_field() {
    let (mut schema, module) = schema_with_module();
    let [id, v, nope] = names(&schema, ["&id", "&v", "&nope"]);

    // &v &id: &id is a value field.
    let id_type = integer(&mut schema);
    let fields = vec![
        ClassField::required(id, FieldKind::FixedValue { ty: id_type, unique: false }),
        ClassField::required(v, FieldKind::VariableValue { path: FieldPath::single(id) }),
    ];
    let class = schema.class(ClassType::new(fields)).unwrap();
    let err = schema.resolve_in(module, &class).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2012);

    let fields = vec![ClassField::required(
        v,
        FieldKind::VariableValueSet { path: FieldPath::single(nope) },
    )];
    let class = schema.class(ClassType::new(fields)).unwrap();
    let err = schema.resolve_in(module, &class).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1004);
}
