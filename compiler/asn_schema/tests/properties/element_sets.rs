use asn_schema::{
    CollectionOfKind, CollectionOfType, ConstraintTemplate, ErrorCode, RangeEndpoint, Scope, Value,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::{boolean, integer, schema_with_module};

fn value(n: i64) -> ConstraintTemplate {
    ConstraintTemplate::Value(Value::Integer(n))
}

fn range(min: i64, max: i64) -> ConstraintTemplate {
    ConstraintTemplate::range(
        RangeEndpoint::value(Value::Integer(min)),
        RangeEndpoint::value(Value::Integer(max)),
    )
}

#[test]
fn extensible_value_set() {
    let (mut schema, module) = schema_with_module();
    let codes = schema.intern("Codes");
    // Codes INTEGER ::= { 1 | 2 | 3, ..., 7 }
    let governor = integer(&mut schema);
    let id = schema
        .define_value_set(
            module,
            codes,
            governor,
            ConstraintTemplate::extensible(
                Some(ConstraintTemplate::Union(vec![value(1), value(2), value(3)])),
                Some(value(7)),
            ),
        )
        .unwrap();
    schema.validate_module(module).unwrap();

    assert!(schema.is_element_set(id));
    assert!(schema.element_set_is_extensible(id).unwrap());
    assert_eq!(
        schema.element_set_values(id).unwrap(),
        vec![Value::Integer(1), Value::Integer(2), Value::Integer(3), Value::Integer(7)]
    );

    // Values outside root and additions count as later additions.
    let scope = Scope::module(module);
    for admitted in [1, 3, 4, 7] {
        schema.accept(id, &scope, &Value::Integer(admitted)).unwrap();
    }
    let err = schema.accept(id, &scope, &Value::Boolean(true)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2009);
}

#[test]
fn closed_value_sets_reject_the_rest() {
    let (mut schema, module) = schema_with_module();
    let codes = schema.intern("Codes");
    // Codes INTEGER ::= { 1 | 2 | 3 }
    let governor = integer(&mut schema);
    let id = schema
        .define_value_set(
            module,
            codes,
            governor,
            ConstraintTemplate::element_set(ConstraintTemplate::Union(vec![
                value(1),
                value(2),
                value(3),
            ])),
        )
        .unwrap();
    schema.validate_module(module).unwrap();

    let scope = Scope::module(module);
    schema.accept(id, &scope, &Value::Integer(2)).unwrap();
    let err = schema.accept(id, &scope, &Value::Integer(4)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3001);
}

#[test]
fn included_sets_and_exceptions() {
    let (mut schema, module) = schema_with_module();
    let [codes, odd] = ["Codes", "Odd"].map(|s| schema.intern(s));
    let governor = integer(&mut schema);
    schema
        .define_value_set(
            module,
            codes,
            governor,
            ConstraintTemplate::element_set(range(1, 9)),
        )
        .unwrap();
    // Odd ::= INTEGER (Codes EXCEPT (2 | 4 | 6 | 8))
    let base = integer(&mut schema);
    let constrained = schema
        .constrained(
            base,
            ConstraintTemplate::element_set(ConstraintTemplate::except(
                ConstraintTemplate::Type(schema.type_ref("Codes")),
                ConstraintTemplate::Union(vec![value(2), value(4), value(6), value(8)]),
            )),
        )
        .unwrap();
    let id = schema.define_type(module, odd, constrained).unwrap();
    schema.validate_module(module).unwrap();

    let scope = Scope::module(module);
    let admitted: Vec<i64> = (0..=10)
        .filter(|n| schema.accept(id, &scope, &Value::Integer(*n)).is_ok())
        .collect();
    assert_eq!(admitted, vec![1, 3, 5, 7, 9]);
}

#[test]
fn all_except() {
    let (mut schema, module) = schema_with_module();
    let base = integer(&mut schema);
    let nonzero = schema
        .constrained(
            base,
            ConstraintTemplate::element_set(ConstraintTemplate::all_except(value(0))),
        )
        .unwrap();
    let id = schema.resolve_in(module, &nonzero).unwrap();
    let scope = Scope::module(module);
    schema.accept(id, &scope, &Value::Integer(-3)).unwrap();
    assert!(schema.accept(id, &scope, &Value::Integer(0)).unwrap_err().is_violation());
}

#[test]
fn size_of_lists() {
    let (mut schema, module) = schema_with_module();
    let element = integer(&mut schema);
    let list = schema
        .collection_of(CollectionOfType::new(CollectionOfKind::SequenceOf, None, element))
        .unwrap();
    let bounded = schema
        .constrained(
            list,
            ConstraintTemplate::element_set(ConstraintTemplate::size(range(1, 2))),
        )
        .unwrap();
    let id = schema.resolve_in(module, &bounded).unwrap();
    let scope = Scope::module(module);

    let list_of = |len: usize| Value::Collection(vec![Value::Integer(0); len]);
    schema.accept(id, &scope, &list_of(2)).unwrap();
    assert_eq!(
        schema.accept(id, &scope, &list_of(0)).unwrap_err().code(),
        ErrorCode::E3001
    );
    assert_eq!(
        schema.accept(id, &scope, &list_of(3)).unwrap_err().code(),
        ErrorCode::E3001
    );
}

#[test]
fn constraints_must_fit_the_type() {
    let (mut schema, module) = schema_with_module();
    let flag = boolean(&mut schema);
    let sized = schema
        .constrained(flag, ConstraintTemplate::element_set(ConstraintTemplate::size(range(1, 2))))
        .unwrap();
    let err = schema.resolve_in(module, &sized).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2004);
}

proptest! {
    #[test]
    fn intersection_admits_what_both_admit(
        a in -20i64..20,
        a_width in 0i64..15,
        b in -20i64..20,
        b_width in 0i64..15,
        n in -40i64..40,
    ) {
        let (mut schema, module) = schema_with_module();
        let base = integer(&mut schema);
        let both = schema
            .constrained(
                base,
                ConstraintTemplate::element_set(ConstraintTemplate::Intersection(vec![
                    range(a, a + a_width),
                    range(b, b + b_width),
                ])),
            )
            .unwrap();
        let id = schema.resolve_in(module, &both).unwrap();
        let scope = Scope::module(module);

        let expected = (a..=a + a_width).contains(&n) && (b..=b + b_width).contains(&n);
        prop_assert_eq!(schema.accept(id, &scope, &Value::Integer(n)).is_ok(), expected);
    }

    #[test]
    fn union_admits_what_either_admits(
        a in -20i64..20,
        b in -20i64..20,
        width in 0i64..10,
        n in -40i64..40,
    ) {
        let (mut schema, module) = schema_with_module();
        let base = integer(&mut schema);
        let either = schema
            .constrained(
                base,
                ConstraintTemplate::element_set(ConstraintTemplate::Union(vec![
                    range(a, a + width),
                    value(b),
                ])),
            )
            .unwrap();
        let id = schema.resolve_in(module, &either).unwrap();
        let scope = Scope::module(module);

        let expected = (a..=a + width).contains(&n) || n == b;
        prop_assert_eq!(schema.accept(id, &scope, &Value::Integer(n)).is_ok(), expected);
    }
}
