use super::*;
use crate::config::{ModuleOptions, SchemaConfig};
use crate::types::BuiltinType;
use asn_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

fn schema() -> Schema {
    Schema::new(SchemaConfig::default()).unwrap()
}

#[test]
fn chain_shape() {
    let module = ModuleId::from_raw(3);
    let root = Scope::module(module);
    let ty = TypeId::from_raw(7);
    let inner = root.child_type(ty);
    let same = inner.child_type(ty);
    let deeper = inner.child_value(TypeId::from_raw(8), Rc::new(Value::Null));

    assert_eq!(root.depth(), 0);
    assert_eq!(inner.depth(), 1);
    assert_eq!(same.depth(), 1);
    assert_eq!(deeper.depth(), 2);
    assert_eq!(deeper.module_id(), Some(module));
    assert!(root.parent().is_none());
    assert_eq!(deeper.iter().count(), 3);
    let expected = format!(
        "[\"value of {:?}\", \"type {ty:?}\", \"module {module:?}\"]",
        TypeId::from_raw(8)
    );
    assert_eq!(format!("{deeper:?}"), expected);
}

#[test]
fn value_levels_innermost_first() {
    let root = Scope::module(ModuleId::from_raw(0));
    let outer = root.child_value(TypeId::from_raw(1), Rc::new(Value::Integer(1)));
    let inner = outer
        .child_type(TypeId::from_raw(9))
        .child_value(TypeId::from_raw(2), Rc::new(Value::Integer(2)));
    let levels: Vec<_> = inner
        .value_levels()
        .iter()
        .map(|(ty, value)| (*ty, (**value).clone()))
        .collect();
    assert_eq!(
        levels,
        vec![
            (TypeId::from_raw(2), Value::Integer(2)),
            (TypeId::from_raw(1), Value::Integer(1)),
        ]
    );
}

#[test]
fn template_bindings_shadow_module() {
    let mut schema = schema();
    let module = schema.add_module("M", ModuleOptions::default()).unwrap();
    let t = schema.intern("T");
    let integer = schema.builtin(BuiltinType::integer()).unwrap();
    let defined = schema.define_type(module, t, integer).unwrap();
    let bound = TypeId::from_raw(0);

    let mut bindings = TemplateBindings::new("X{INTEGER}");
    bindings.bind(t, Binding::Type(bound));
    let v = schema.intern("v");
    bindings.bind(v, Binding::Value(Value::Integer(4)));
    let scope = Scope::module(module).child_template(Rc::new(bindings));

    assert_eq!(scope.template_namespace(), Some("X{INTEGER}"));
    assert_eq!(scope.resolve_type(&schema, &RefName::local(t)).unwrap(), bound);
    assert_eq!(
        Scope::module(module)
            .resolve_type(&schema, &RefName::local(t))
            .unwrap(),
        defined
    );
    assert_eq!(
        scope.resolve_value(&schema, &RefName::local(v)).unwrap(),
        ValueSymbol::Literal(Value::Integer(4))
    );

    let err = scope.resolve_type(&schema, &RefName::local(v)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2008);
    let err = scope.resolve_value(&schema, &RefName::local(t)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2008);
}

#[test]
fn unknown_names_are_resolution_errors() {
    let mut schema = schema();
    let module = schema.add_module("M", ModuleOptions::default()).unwrap();
    let scope = Scope::module(module);
    let missing = RefName::local(schema.intern("Missing"));
    let err = scope.resolve_type(&schema, &missing).unwrap_err();
    assert!(err.is_resolution());
    assert_eq!(err.code(), ErrorCode::E1001);
    let err = scope.resolve_value(&schema, &missing).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1002);
}

#[test]
fn qualified_names_skip_inner_scopes() {
    let mut schema = schema();
    let a = schema.add_module("A", ModuleOptions::default()).unwrap();
    let b = schema.add_module("B", ModuleOptions::default()).unwrap();
    let t = schema.intern("T");
    let boolean = schema.builtin(BuiltinType::Boolean).unwrap();
    let in_a = schema.define_type(a, t, boolean).unwrap();

    let mut bindings = TemplateBindings::new("X");
    bindings.bind(t, Binding::Type(TypeId::from_raw(0)));
    let scope = Scope::module(b).child_template(Rc::new(bindings));
    let qualified = RefName::qualified(schema.intern("A"), t);
    assert_eq!(scope.resolve_type(&schema, &qualified).unwrap(), in_a);
}
