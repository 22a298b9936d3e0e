use asn_schema::{
    CollectionEntry, CollectionKind, CollectionType, ComponentType, ConstraintTemplate, ErrorCode,
    ParameterKind, RangeEndpoint, RefName, Schema, Scope, Template, TemplateArg,
    TemplateParameter, TypeId, TypeRef, Value,
};
use pretty_assertions::assert_eq;

use crate::common::{boolean, integer, record, schema_with_module, sequence};

/// `Wrapper{X} ::= SEQUENCE { a X }` in a fresh module.
fn wrapper() -> (Schema, asn_schema::ModuleId) {
    let (mut schema, module) = schema_with_module();
    let [name, x] = ["Wrapper", "X"].map(|s| schema.intern(s));
    let param = TemplateParameter::new(0, x, ParameterKind::Type, None);
    let template = Template::new(vec![param]).unwrap();
    let a = schema.type_ref("X");
    let body = sequence(&mut schema, vec![("a", a)]);
    schema.define_template_type(module, name, template, body).unwrap();
    (schema, module)
}

fn instantiate(schema: &mut Schema, module: asn_schema::ModuleId, arg: TemplateArg) -> TypeId {
    let name = RefName::local(schema.intern("Wrapper"));
    let instance = schema.instance(name, vec![arg]).unwrap();
    let id = schema.resolve_in(module, &instance).unwrap();
    schema.sibling(id).unwrap().unwrap()
}

#[test]
fn instances_are_isolated() {
    let (mut schema, module) = wrapper();
    schema.validate_module(module).unwrap();

    let int_arg = TemplateArg::Type(integer(&mut schema));
    let with_integer = instantiate(&mut schema, module, int_arg);
    let bool_arg = TemplateArg::Type(boolean(&mut schema));
    let with_boolean = instantiate(&mut schema, module, bool_arg);
    assert_ne!(with_integer, with_boolean);
    assert_eq!(schema.type_label(with_integer), "Wrapper{INTEGER}");
    assert_eq!(schema.type_label(with_boolean), "Wrapper{BOOLEAN}");

    let scope = Scope::module(module);
    let number = record(&schema, vec![("a", Value::Integer(1))]);
    let flag = record(&schema, vec![("a", Value::Boolean(true))]);
    schema.accept(with_integer, &scope, &number).unwrap();
    schema.accept(with_boolean, &scope, &flag).unwrap();
    assert!(schema.accept(with_integer, &scope, &flag).is_err());
    assert!(schema.accept(with_boolean, &scope, &number).is_err());

    // The template itself stays untouched.
    let template = schema.defined_type(module, schema.intern("Wrapper")).unwrap();
    assert!(!schema.validation_state(template).unwrap().is_valid());
}

#[test]
fn same_arguments_still_copy() {
    let (mut schema, module) = wrapper();
    let first_arg = TemplateArg::Type(integer(&mut schema));
    let first = instantiate(&mut schema, module, first_arg);
    let second_arg = TemplateArg::Type(integer(&mut schema));
    let second = instantiate(&mut schema, module, second_arg);
    assert_ne!(first, second);
    assert_eq!(schema.type_label(first), schema.type_label(second));
}

#[test]
fn argument_mismatches() {
    let (mut schema, module) = wrapper();
    let name = RefName::local(schema.intern("Wrapper"));

    let none = schema.instance(name, Vec::new()).unwrap();
    let err = schema.resolve_in(module, &none).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2007);

    let value = schema
        .instance(name, vec![TemplateArg::Value(Value::Integer(3))])
        .unwrap();
    let err = schema.resolve_in(module, &value).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2008);

    let plain = schema.intern("Plain");
    let flag = boolean(&mut schema);
    schema.define_type(module, plain, flag).unwrap();
    let arg = TemplateArg::Type(integer(&mut schema));
    let not_template = schema.instance(RefName::local(plain), vec![arg]).unwrap();
    let err = schema.resolve_in(module, &not_template).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2007);
}

#[test]
fn templates_need_arguments() {
    let (mut schema, module) = wrapper();
    let bare = schema.type_ref("Wrapper");
    let err = schema.resolve_in(module, &bare).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2013);
}

#[test]
fn value_parameters() {
    let (mut schema, module) = schema_with_module();
    let [bounded, upper] = ["Bounded", "upper"].map(|s| schema.intern(s));
    let governor = integer(&mut schema);
    let template = Template::new(vec![TemplateParameter::new(
        0,
        upper,
        ParameterKind::Value,
        Some(governor),
    )])
    .unwrap();
    // Bounded{INTEGER: upper} ::= INTEGER (0..upper)
    let base = integer(&mut schema);
    let body = schema
        .constrained(
            base,
            ConstraintTemplate::element_set(ConstraintTemplate::range(
                RangeEndpoint::value(Value::Integer(0)),
                RangeEndpoint::value(Value::reference(upper)),
            )),
        )
        .unwrap();
    schema.define_template_type(module, bounded, template, body).unwrap();

    let instance = schema
        .instance(RefName::local(bounded), vec![TemplateArg::Value(Value::Integer(5))])
        .unwrap();
    let id = schema.resolve_in(module, &instance).unwrap();
    let copy = schema.sibling(id).unwrap().unwrap();
    assert_eq!(schema.type_label(copy), "Bounded{5}");

    let scope = Scope::module(module);
    schema.accept(id, &scope, &Value::Integer(5)).unwrap();
    assert!(schema.accept(id, &scope, &Value::Integer(6)).unwrap_err().is_violation());
}

fn up_to(schema: &mut Schema, upper: i64) -> TypeRef {
    let base = integer(schema);
    schema
        .constrained(
            base,
            ConstraintTemplate::element_set(ConstraintTemplate::range(
                RangeEndpoint::value(Value::Integer(1)),
                RangeEndpoint::value(Value::Integer(upper)),
            )),
        )
        .unwrap()
}

#[test]
fn nested_instances_keep_their_own_arguments() {
    let (mut schema, module) = schema_with_module();
    let [deep, x, a, next] = ["Deep", "X", "a", "next"].map(|s| schema.intern(s));
    // Deep{X} ::= SEQUENCE { a X, next Deep{INTEGER (1..5)} OPTIONAL }
    let param = TemplateParameter::new(0, x, ParameterKind::Type, None);
    let template = Template::new(vec![param]).unwrap();
    let inner_arg = up_to(&mut schema, 5);
    let inner = schema
        .instance(RefName::local(deep), vec![TemplateArg::Type(inner_arg)])
        .unwrap();
    let a_ty = schema.type_ref("X");
    let body = schema
        .collection(CollectionType::new(
            CollectionKind::Sequence,
            vec![
                CollectionEntry::Component(ComponentType::required(a, a_ty)),
                CollectionEntry::Component(ComponentType::new(next, inner, true, None).unwrap()),
            ],
            false,
        ))
        .unwrap();
    schema.define_template_type(module, deep, template, body).unwrap();

    // Deep{INTEGER (1..10)}
    let outer_arg = up_to(&mut schema, 10);
    let outer = schema
        .instance(RefName::local(deep), vec![TemplateArg::Type(outer_arg)])
        .unwrap();
    let id = schema.resolve_in(module, &outer).unwrap();
    let copy = schema.sibling(id).unwrap().unwrap();
    let label = schema.type_label(copy);
    assert!(label.starts_with("Deep{INTEGER#"), "{label}");

    let scope = Scope::module(module);
    let fits = |schema: &Schema, outer: i64, inner: i64| {
        let nested = record(schema, vec![("a", Value::Integer(inner))]);
        let value = record(schema, vec![("a", Value::Integer(outer)), ("next", nested)]);
        schema.accept(id, &scope, &value)
    };
    fits(&schema, 7, 3).unwrap();
    fits(&schema, 7, 5).unwrap();
    assert!(fits(&schema, 7, 7).unwrap_err().is_violation());
    assert!(fits(&schema, 11, 3).unwrap_err().is_violation());

    // The recursion closes: the third level reuses the second.
    let deepest = record(
        &schema,
        vec![
            ("a", Value::Integer(2)),
            ("next", record(&schema, vec![("a", Value::Integer(6))])),
        ],
    );
    let value = record(&schema, vec![("a", Value::Integer(9)), ("next", deepest)]);
    assert!(schema.accept(id, &scope, &value).unwrap_err().is_violation());
}

#[test]
fn differently_constrained_arguments_get_distinct_namespaces() {
    let (mut schema, module) = wrapper();
    let small = up_to(&mut schema, 5);
    let small = instantiate(&mut schema, module, TemplateArg::Type(small));
    let large = up_to(&mut schema, 10);
    let large = instantiate(&mut schema, module, TemplateArg::Type(large));
    assert_ne!(schema.type_label(small), schema.type_label(large));

    let scope = Scope::module(module);
    let seven = record(&schema, vec![("a", Value::Integer(7))]);
    assert!(schema.accept(small, &scope, &seven).is_err());
    schema.accept(large, &scope, &seven).unwrap();
}
