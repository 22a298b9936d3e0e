use asn_schema::{
    BuiltinType, ClassField, CollectionEntry, CollectionKind, CollectionType, ComponentType,
    ConstraintTemplate, EncodingKind, EnumItem, EnumeratedType, ErrorCode, FieldKind, FieldPath,
    ModuleOptions, RangeEndpoint, Schema, SchemaConfig, Scope, Setting, TagEncoding, TagMethod,
    ValidationState, Value,
};
use pretty_assertions::assert_eq;

use crate::common::{boolean, integer, names, record, schema_with_module, sequence};

fn one_to_ten() -> ConstraintTemplate {
    ConstraintTemplate::element_set(ConstraintTemplate::range(
        RangeEndpoint::value(Value::Integer(1)),
        RangeEndpoint::value(Value::Integer(10)),
    ))
}

#[test]
fn validate_all_is_idempotent() {
    let (mut schema, module) = schema_with_module();
    let [small, pair, seven] = names(&schema, ["Small", "Pair", "seven"]);
    let base = integer(&mut schema);
    let constrained = schema.constrained(base, one_to_ten()).unwrap();
    schema.define_type(module, small, constrained).unwrap();
    let n = schema.type_ref("Small");
    let flag = boolean(&mut schema);
    let body = sequence(&mut schema, vec![("n", n), ("flag", flag)]);
    schema.define_type(module, pair, body).unwrap();
    let def = schema
        .define_value(module, seven, schema.type_ref("Small"), Value::Integer(7))
        .unwrap();

    schema.validate_all().unwrap();
    let pool = schema.types().len();
    let states: Vec<ValidationState> = [small, pair]
        .iter()
        .map(|name| {
            let id = schema.defined_type(module, *name).unwrap();
            schema.validation_state(id).unwrap().clone()
        })
        .collect();
    let value = schema.value_of(def).unwrap();

    schema.validate_all().unwrap();
    assert_eq!(schema.types().len(), pool);
    assert_eq!(states, vec![ValidationState::Valid, ValidationState::Valid]);
    for name in [small, pair] {
        let id = schema.defined_type(module, name).unwrap();
        assert_eq!(schema.validation_state(id).unwrap(), &ValidationState::Valid);
    }
    assert_eq!(schema.value_of(def).unwrap(), value);
    assert_eq!(schema.module(module).unwrap().state, ValidationState::Valid);
}

#[test]
fn failed_validation_reports_once() {
    let (mut schema, module) = schema_with_module();
    let broken = schema.intern("Broken");
    let missing = schema.type_ref("Missing");
    schema.define_type(module, broken, missing).unwrap();

    let err = schema.validate_all().unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1001);
    schema.validate_all().unwrap();
    assert!(matches!(
        schema.module(module).unwrap().state,
        ValidationState::Invalid(ref stored) if *stored == err
    ));
}

#[test]
fn optional_and_default_exclude_each_other() {
    let mut schema = Schema::new(SchemaConfig::default()).unwrap();
    let [a, field] = names(&schema, ["a", "&f"]);

    let ty = integer(&mut schema);
    let err = ComponentType::new(a, ty, true, Some(Value::Integer(1))).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2003);
    assert!(err.is_validation());

    let ty = integer(&mut schema);
    let defaulted = ComponentType::new(a, ty, false, Some(Value::Integer(1))).unwrap();
    assert!(defaulted.may_be_absent());

    let ty = integer(&mut schema);
    let err = ClassField::new(field, FieldKind::Type, true, Some(Setting::Type(ty))).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2003);
}

#[test]
fn constrained_types_answer_like_their_sibling() {
    let (mut schema, module) = schema_with_module();
    let base = integer(&mut schema);
    let tagged = schema.tagged(TagEncoding::context(5), base).unwrap();
    let tagged_id = tagged.handle().unwrap();
    let constrained = schema.constrained(tagged, one_to_ten()).unwrap();
    let small = schema.intern("Small");
    let id = schema.define_type(module, small, constrained).unwrap();
    schema.validate_module(module).unwrap();

    assert_eq!(schema.tag_of(id).unwrap(), schema.tag_of(tagged_id).unwrap());
    assert_eq!(
        schema.encoding(id, EncodingKind::Tag).unwrap(),
        schema.encoding(tagged_id, EncodingKind::Tag).unwrap()
    );
    assert_eq!(schema.family(id).unwrap(), schema.family(tagged_id).unwrap());
    assert_eq!(
        schema.unwrap_concrete(id).unwrap(),
        schema.unwrap_concrete(tagged_id).unwrap()
    );

    let scope = Scope::module(module);
    assert_eq!(schema.optimize(id, &scope, &Value::Integer(10)).unwrap(), Value::Integer(10));
    let err = schema.accept(id, &scope, &Value::Integer(11)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3001);
    schema.accept(tagged_id, &scope, &Value::Integer(11)).unwrap();
}

#[test]
fn implicit_tags_on_choices_and_open_types_become_explicit() {
    let mut schema = Schema::new(SchemaConfig::default()).unwrap();
    let module = schema
        .add_module("M", ModuleOptions::default().with_tag_method(TagMethod::Implicit))
        .unwrap();
    let [a, b] = names(&schema, ["a", "b"]);

    let first = integer(&mut schema);
    let second = boolean(&mut schema);
    let choice = schema
        .collection(CollectionType::new(
            CollectionKind::Choice,
            vec![
                CollectionEntry::Component(ComponentType::required(a, first)),
                CollectionEntry::Component(ComponentType::required(b, second)),
            ],
            false,
        ))
        .unwrap();
    let tagged_choice = schema.tagged(TagEncoding::context(1), choice).unwrap();
    let id = schema.resolve_in(module, &tagged_choice).unwrap();
    assert_eq!(schema.tag_of(id).unwrap().unwrap().method, TagMethod::Explicit);

    let open = schema
        .class_field(
            schema.type_ref("TYPE-IDENTIFIER"),
            FieldPath::single(schema.intern("&Type")),
        )
        .unwrap();
    let tagged_open = schema
        .tagged(TagEncoding::context(2).with_method(TagMethod::Implicit), open)
        .unwrap();
    let id = schema.resolve_in(module, &tagged_open).unwrap();
    assert_eq!(schema.tag_of(id).unwrap().unwrap().method, TagMethod::Explicit);

    let plain = integer(&mut schema);
    let tagged_plain = schema.tagged(TagEncoding::context(3), plain).unwrap();
    let id = schema.resolve_in(module, &tagged_plain).unwrap();
    assert_eq!(schema.tag_of(id).unwrap().unwrap().method, TagMethod::Implicit);
}

#[test]
fn enumeration_items_are_numbered() {
    let (mut schema, module) = schema_with_module();
    let [a, b, c, d, e] = names(&schema, ["a", "b", "c", "d", "e"]);
    // ENUMERATED { a, b(0), c, ..., d, e(7) }
    let enumerated = schema
        .builtin(BuiltinType::Enumerated(EnumeratedType::new(
            vec![
                EnumItem::new(a),
                EnumItem::numbered(b, Value::Integer(0)),
                EnumItem::new(c),
            ],
            true,
            vec![EnumItem::new(d), EnumItem::numbered(e, Value::Integer(7))],
        )))
        .unwrap();
    let id = schema.resolve_in(module, &enumerated).unwrap();
    let numbers: Vec<_> = schema
        .named_values(id)
        .unwrap()
        .into_iter()
        .map(|(name, value)| {
            let number = value.as_named().and_then(|n| n.value.as_integer());
            (schema.name_str(name).to_owned(), number)
        })
        .collect();
    assert_eq!(
        numbers,
        vec![
            ("a".to_owned(), Some(1)),
            ("b".to_owned(), Some(0)),
            ("c".to_owned(), Some(2)),
            ("d".to_owned(), Some(3)),
            ("e".to_owned(), Some(7)),
        ]
    );

    let scope = Scope::module(module);
    let optimized = schema.optimize(id, &scope, &Value::reference(c)).unwrap();
    assert_eq!(optimized.as_named().map(|n| n.name), Some(c));
}

#[test]
fn enumeration_numbers_past_the_largest_addition() {
    let (mut schema, module) = schema_with_module();
    let [level, a, b, c] = names(&schema, ["Level", "a", "b", "c"]);
    // ENUMERATED { a, ..., b(9223372036854775807), c }
    let enumerated = schema
        .builtin(BuiltinType::Enumerated(EnumeratedType::new(
            vec![EnumItem::new(a)],
            true,
            vec![EnumItem::numbered(b, Value::Integer(i64::MAX)), EnumItem::new(c)],
        )))
        .unwrap();
    schema.define_type(module, level, enumerated).unwrap();

    let err = schema.validate_module(module).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2010);
    assert!(err.is_validation());
}

#[test]
fn record_values_follow_component_order() {
    let (mut schema, module) = schema_with_module();
    let n = integer(&mut schema);
    let flag = boolean(&mut schema);
    let body = sequence(&mut schema, vec![("n", n), ("flag", flag)]);
    let id = schema.resolve_in(module, &body).unwrap();
    let scope = Scope::module(module);

    let ordered = record(&schema, vec![("n", Value::Integer(1)), ("flag", Value::Boolean(true))]);
    assert_eq!(schema.optimize(id, &scope, &ordered).unwrap(), ordered);

    let reversed = record(&schema, vec![("flag", Value::Boolean(true)), ("n", Value::Integer(1))]);
    assert_eq!(schema.accept(id, &scope, &reversed).unwrap_err().code(), ErrorCode::E2009);

    let partial = record(&schema, vec![("n", Value::Integer(1))]);
    assert_eq!(schema.accept(id, &scope, &partial).unwrap_err().code(), ErrorCode::E2005);
}
