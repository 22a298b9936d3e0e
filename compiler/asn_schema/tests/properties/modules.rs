use asn_schema::{ErrorCode, Exports, ModuleOptions, ModuleRef, SchemaError, Scope, Value};
use pretty_assertions::assert_eq;

use crate::common::{boolean, integer, names, schema_with_module};

/// `A` defines `Shared` and `Hidden` but exports only `Shared`.
fn exporting_module() -> (asn_schema::Schema, asn_schema::ModuleId) {
    let (mut schema, a) = schema_with_module();
    let [shared, hidden] = names(&schema, ["Shared", "Hidden"]);
    let ty = integer(&mut schema);
    schema.define_type(a, shared, ty).unwrap();
    let ty = boolean(&mut schema);
    schema.define_type(a, hidden, ty).unwrap();
    schema.set_exports(a, Exports::Only(vec![shared])).unwrap();
    (schema, a)
}

#[test]
fn imported_names_resolve_to_the_exporter() {
    let (mut schema, a) = exporting_module();
    let b = schema.add_module("B", ModuleOptions::default()).unwrap();
    let [m, shared] = names(&schema, ["M", "Shared"]);
    schema.add_import(b, ModuleRef::named(m), vec![shared]).unwrap();

    schema.validate_all().unwrap();
    assert_eq!(
        schema.lookup_type_in(b, shared).unwrap(),
        schema.defined_type(a, shared).unwrap()
    );
    let scope = Scope::module(b);
    let id = schema.lookup_type_in(b, shared).unwrap();
    schema.accept(id, &scope, &Value::Integer(3)).unwrap();
}

#[test]
fn names_must_be_imported() {
    let (mut schema, _) = exporting_module();
    let b = schema.add_module("B", ModuleOptions::default()).unwrap();
    let shared = schema.intern("Shared");
    let err = schema.lookup_type_in(b, shared).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1001);
}

#[test]
fn hidden_names_are_not_exported() {
    let (mut schema, _) = exporting_module();
    let b = schema.add_module("B", ModuleOptions::default()).unwrap();
    let [m, hidden] = names(&schema, ["M", "Hidden"]);
    schema.add_import(b, ModuleRef::named(m), vec![hidden]).unwrap();

    let err = schema.lookup_type_in(b, hidden).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1005);
    let err = schema.validate_module(b).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1005);

    // Qualified references obey the same export list.
    let qualified = schema.type_ref("M.Hidden");
    let err = schema.resolve_in(b, &qualified).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1005);
    let qualified = schema.type_ref("M.Shared");
    schema.resolve_in(b, &qualified).unwrap();
}

#[test]
fn unknown_modules() {
    let (mut schema, _) = exporting_module();
    let b = schema.add_module("B", ModuleOptions::default()).unwrap();
    let [nowhere, shared] = names(&schema, ["N", "Shared"]);
    schema.add_import(b, ModuleRef::named(nowhere), vec![shared]).unwrap();

    let err = schema.validate_module(b).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1003);
    let SchemaError::Resolution { similar, .. } = &err else {
        panic!("expected a resolution error, got {err:?}");
    };
    assert!(similar.contains(&"M".to_owned()));
}

#[test]
fn reexports_are_followed() {
    let (mut schema, a) = exporting_module();
    let b = schema.add_module("B", ModuleOptions::default()).unwrap();
    let c = schema.add_module("C", ModuleOptions::default()).unwrap();
    let [m, b_name, shared] = names(&schema, ["M", "B", "Shared"]);
    schema.add_import(b, ModuleRef::named(m), vec![shared]).unwrap();
    schema.add_import(c, ModuleRef::named(b_name), vec![shared]).unwrap();

    schema.validate_all().unwrap();
    assert_eq!(
        schema.lookup_type_in(c, shared).unwrap(),
        schema.defined_type(a, shared).unwrap()
    );
}

#[test]
fn dummy_module_sees_every_export() {
    let (mut schema, a) = exporting_module();
    let dummy = schema.add_dummy_module("Dummy").unwrap();
    let [shared, hidden] = names(&schema, ["Shared", "Hidden"]);

    assert_eq!(
        schema.lookup_type_in(dummy, shared).unwrap(),
        schema.defined_type(a, shared).unwrap()
    );
    let err = schema.lookup_type_in(dummy, hidden).unwrap_err();
    assert!(err.is_resolution());

    // The core module is still the last resort.
    let core = schema.core_module().unwrap();
    let type_identifier = schema.intern("TYPE-IDENTIFIER");
    assert_eq!(
        schema.lookup_type_in(dummy, type_identifier).unwrap(),
        schema.defined_type(core, type_identifier).unwrap()
    );
}

#[test]
fn values_cross_modules() {
    let (mut schema, a) = exporting_module();
    let [limit, copy, m] = names(&schema, ["limit", "copy", "M"]);
    let ty = integer(&mut schema);
    schema.define_value(a, limit, ty, Value::Integer(10)).unwrap();
    schema.set_exports(a, Exports::All).unwrap();

    let b = schema.add_module("B", ModuleOptions::default()).unwrap();
    schema.add_import(b, ModuleRef::named(m), vec![limit]).unwrap();
    let ty = integer(&mut schema);
    let def = schema.define_value(b, copy, ty, Value::reference(limit)).unwrap();

    schema.validate_all().unwrap();
    assert_eq!(schema.value_of(def).unwrap(), Value::Integer(10));
}

#[test]
fn explicit_imports_beat_coincidental_names() {
    let (mut schema, a) = exporting_module();
    let other = schema.add_module("Other", ModuleOptions::default()).unwrap();
    let [m, other_name, shared] = names(&schema, ["M", "Other", "Shared"]);
    let ty = boolean(&mut schema);
    let coincidental = schema.define_type(other, shared, ty).unwrap();
    let from_a = schema.defined_type(a, shared).unwrap();

    let b = schema.add_module("B", ModuleOptions::default()).unwrap();
    schema.add_import(b, ModuleRef::named(m), vec![shared]).unwrap();
    assert_eq!(schema.lookup_type_in(b, shared).unwrap(), from_a);

    // The dummy module's import table is consulted before its fallback.
    let dummy = schema.add_dummy_module("Dummy").unwrap();
    schema.add_import(dummy, ModuleRef::named(other_name), vec![shared]).unwrap();
    assert_eq!(schema.lookup_type_in(dummy, shared).unwrap(), coincidental);
}
