use asn_schema::{
    CollectionEntry, CollectionKind, CollectionType, ComponentConstraintTemplate, ComponentKind,
    ComponentType, ConstraintTemplate, ErrorCode, Family, ModuleId, Name, Presence, RangeEndpoint,
    Schema, Scope, TypeId, TypeKind, TypeRef, Value,
};
use pretty_assertions::assert_eq;

use crate::common::{boolean, integer, names, record, schema_with_module, sequence};

fn collection(
    schema: &mut Schema,
    kind: CollectionKind,
    entries: Vec<CollectionEntry>,
    extensible: bool,
) -> TypeRef {
    schema
        .collection(CollectionType::new(kind, entries, extensible))
        .unwrap()
}

fn component(name: Name, ty: TypeRef) -> CollectionEntry {
    CollectionEntry::Component(ComponentType::required(name, ty))
}

fn optional(name: Name, ty: TypeRef) -> CollectionEntry {
    CollectionEntry::Component(ComponentType::new(name, ty, true, None).unwrap())
}

fn extension(name: Name, ty: TypeRef) -> CollectionEntry {
    let component = ComponentType::required(name, ty).with_kind(ComponentKind::Extension);
    CollectionEntry::Component(component)
}

/// Expanded components as (name, kind, inherited).
fn expanded(schema: &Schema, id: TypeId) -> Vec<(String, ComponentKind, bool)> {
    let concrete = schema.unwrap_concrete(id).unwrap();
    match schema.type_kind(concrete).unwrap() {
        TypeKind::Collection(collection) => collection
            .components
            .iter()
            .map(|c| (schema.name_str(c.name).to_owned(), c.kind, c.inherited))
            .collect(),
        other => panic!("not a collection: {other:?}"),
    }
}

fn one_to_ten() -> ConstraintTemplate {
    ConstraintTemplate::element_set(ConstraintTemplate::range(
        RangeEndpoint::value(Value::Integer(1)),
        RangeEndpoint::value(Value::Integer(10)),
    ))
}

#[test]
fn selection_picks_a_choice_alternative() {
    let (mut schema, module) = schema_with_module();
    let [choice, num, flag, other, plain] =
        names(&schema, ["Choice", "num", "flag", "other", "Plain"]);
    // Choice ::= CHOICE { num INTEGER, flag BOOLEAN }
    let num_ty = integer(&mut schema);
    let flag_ty = boolean(&mut schema);
    let body = collection(
        &mut schema,
        CollectionKind::Choice,
        vec![component(num, num_ty), component(flag, flag_ty)],
        false,
    );
    schema.define_type(module, choice, body).unwrap();
    let field = integer(&mut schema);
    let body = sequence(&mut schema, vec![("num", field)]);
    schema.define_type(module, plain, body).unwrap();

    // num < Choice
    let choice_ref = schema.type_ref("Choice");
    let picked = schema.selection(num, choice_ref.clone()).unwrap();
    let id = schema.resolve_in(module, &picked).unwrap();
    assert_eq!(schema.family(id).unwrap(), Family::Integer);
    let scope = Scope::module(module);
    schema.accept(id, &scope, &Value::Integer(3)).unwrap();
    let err = schema.accept(id, &scope, &Value::Boolean(true)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2009);

    let missing = schema.selection(other, choice_ref).unwrap();
    let err = schema.resolve_in(module, &missing).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1006);

    let plain_ref = schema.type_ref("Plain");
    let not_choice = schema.selection(num, plain_ref).unwrap();
    let err = schema.resolve_in(module, &not_choice).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2001);
}

#[test]
fn components_of_keeps_kind_and_position() {
    let (mut schema, module) = schema_with_module();
    let [base, outer, tail, a, e, x, y, z] =
        names(&schema, ["Base", "Outer", "Tail", "a", "e", "x", "y", "z"]);

    // Base ::= SEQUENCE { x INTEGER, y BOOLEAN, ..., z INTEGER }
    let entries = vec![
        component(x, integer(&mut schema)),
        component(y, boolean(&mut schema)),
        extension(z, integer(&mut schema)),
    ];
    let body = collection(&mut schema, CollectionKind::Sequence, entries, true);
    schema.define_type(module, base, body).unwrap();

    // Outer ::= SEQUENCE { a INTEGER, COMPONENTS OF Base, ..., e BOOLEAN }
    let entries = vec![
        component(a, integer(&mut schema)),
        CollectionEntry::ComponentsOf {
            ty: schema.type_ref("Base"),
            kind: ComponentKind::Primary,
        },
        extension(e, boolean(&mut schema)),
    ];
    let body = collection(&mut schema, CollectionKind::Sequence, entries, true);
    let outer = schema.define_type(module, outer, body).unwrap();

    // Tail ::= SEQUENCE { a INTEGER, ..., e BOOLEAN, ..., COMPONENTS OF Base }
    let entries = vec![
        component(a, integer(&mut schema)),
        extension(e, boolean(&mut schema)),
        CollectionEntry::ComponentsOf {
            ty: schema.type_ref("Base"),
            kind: ComponentKind::Secondary,
        },
    ];
    let body = collection(&mut schema, CollectionKind::Sequence, entries, true);
    let tail = schema.define_type(module, tail, body).unwrap();

    schema.validate_module(module).unwrap();

    let owned = |name: &str, kind, inherited| (name.to_owned(), kind, inherited);
    // z is an extension of Base and is not brought in.
    assert_eq!(
        expanded(&schema, outer),
        vec![
            owned("a", ComponentKind::Primary, false),
            owned("x", ComponentKind::Primary, true),
            owned("y", ComponentKind::Primary, true),
            owned("e", ComponentKind::Extension, false),
        ]
    );
    assert_eq!(
        expanded(&schema, tail),
        vec![
            owned("a", ComponentKind::Primary, false),
            owned("e", ComponentKind::Extension, false),
            owned("x", ComponentKind::Secondary, true),
            owned("y", ComponentKind::Secondary, true),
        ]
    );

    let scope = Scope::module(module);
    let value = record(
        &schema,
        vec![("a", Value::Integer(1)), ("x", Value::Integer(2)), ("y", Value::Boolean(true))],
    );
    schema.accept(outer, &scope, &value).unwrap();
    let short = record(&schema, vec![("a", Value::Integer(1)), ("x", Value::Integer(2))]);
    let err = schema.accept(outer, &scope, &short).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2005);
}

#[test]
fn components_of_needs_a_matching_collection() {
    let (mut schema, module) = schema_with_module();
    let [bag, s] = names(&schema, ["Bag", "s"]);
    let member = integer(&mut schema);
    let body = collection(&mut schema, CollectionKind::Set, vec![component(s, member)], false);
    schema.define_type(module, bag, body).unwrap();

    let sources = [schema.type_ref("Bag"), integer(&mut schema)];
    for source in sources {
        let entries = vec![CollectionEntry::ComponentsOf {
            ty: source,
            kind: ComponentKind::Primary,
        }];
        let body = collection(&mut schema, CollectionKind::Sequence, entries, false);
        let err = schema.resolve_in(module, &body).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E2001);
    }
}

/// `Rec ::= SEQUENCE { a INTEGER, b BOOLEAN OPTIONAL, c INTEGER OPTIONAL }`
fn record_schema() -> (Schema, ModuleId) {
    let (mut schema, module) = schema_with_module();
    let [rec, a, b, c] = names(&schema, ["Rec", "a", "b", "c"]);
    let entries = vec![
        component(a, integer(&mut schema)),
        optional(b, boolean(&mut schema)),
        optional(c, integer(&mut schema)),
    ];
    let body = collection(&mut schema, CollectionKind::Sequence, entries, false);
    schema.define_type(module, rec, body).unwrap();
    (schema, module)
}

fn with_components(
    schema: &mut Schema,
    module: ModuleId,
    partial: bool,
    components: Vec<ComponentConstraintTemplate>,
) -> TypeId {
    let rec = schema.type_ref("Rec");
    let constrained = schema
        .constrained(
            rec,
            ConstraintTemplate::element_set(ConstraintTemplate::InnerTypes {
                partial,
                components,
            }),
        )
        .unwrap();
    schema.resolve_in(module, &constrained).unwrap()
}

fn presence(name: Name, presence: Presence) -> ComponentConstraintTemplate {
    ComponentConstraintTemplate {
        name,
        presence,
        constraint: None,
    }
}

#[test]
fn partial_with_components() {
    let (mut schema, module) = record_schema();
    let [a, b] = names(&schema, ["a", "b"]);
    // Rec (WITH COMPONENTS { ..., a (1..10), b PRESENT })
    let bounded = ComponentConstraintTemplate {
        name: a,
        presence: Presence::Unspecified,
        constraint: Some(Box::new(one_to_ten())),
    };
    let components = vec![bounded, presence(b, Presence::Present)];
    let id = with_components(&mut schema, module, true, components);
    let scope = Scope::module(module);
    let check = |fields: Vec<(&str, Value)>| {
        let value = record(&schema, fields);
        schema.accept(id, &scope, &value)
    };

    check(vec![("a", Value::Integer(3)), ("b", Value::Boolean(true))]).unwrap();
    // Unmentioned components stay unconstrained.
    check(vec![
        ("a", Value::Integer(3)),
        ("b", Value::Boolean(true)),
        ("c", Value::Integer(4)),
    ])
    .unwrap();

    let err = check(vec![("a", Value::Integer(3))]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3003);
    let err = check(vec![("a", Value::Integer(11)), ("b", Value::Boolean(true))]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3001);
}

#[test]
fn full_with_components() {
    let (mut schema, module) = record_schema();
    let [a, b] = names(&schema, ["a", "b"]);
    // Rec (WITH COMPONENTS { a, b ABSENT })
    let components = vec![presence(a, Presence::Unspecified), presence(b, Presence::Absent)];
    let id = with_components(&mut schema, module, false, components);
    let scope = Scope::module(module);
    let check = |fields: Vec<(&str, Value)>| {
        let value = record(&schema, fields);
        schema.accept(id, &scope, &value)
    };

    check(vec![("a", Value::Integer(3))]).unwrap();
    let err = check(vec![("a", Value::Integer(3)), ("b", Value::Boolean(false))]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3003);
    assert!(err.is_violation());
    // Components a full specification leaves out must be absent.
    let err = check(vec![("a", Value::Integer(3)), ("c", Value::Integer(1))]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3003);
}

#[test]
fn with_components_names_existing_components() {
    let (mut schema, module) = record_schema();
    let unknown = schema.intern("zz");
    let rec = schema.type_ref("Rec");
    let constrained = schema
        .constrained(
            rec,
            ConstraintTemplate::element_set(ConstraintTemplate::InnerTypes {
                partial: true,
                components: vec![presence(unknown, Presence::Present)],
            }),
        )
        .unwrap();
    let err = schema.resolve_in(module, &constrained).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1006);
}
