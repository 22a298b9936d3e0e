//! Shared fixtures.

use asn_schema::{
    BuiltinType, CollectionEntry, CollectionKind, CollectionType, ComponentType, ModuleId,
    ModuleOptions, Name, Schema, SchemaConfig, TypeRef, Value,
};

/// A schema with the core module and one module `M` using default options.
pub fn schema_with_module() -> (Schema, ModuleId) {
    let mut schema = Schema::new(SchemaConfig::default()).unwrap();
    let module = schema.add_module("M", ModuleOptions::default()).unwrap();
    (schema, module)
}

pub fn integer(schema: &mut Schema) -> TypeRef {
    schema.builtin(BuiltinType::integer()).unwrap()
}

pub fn boolean(schema: &mut Schema) -> TypeRef {
    schema.builtin(BuiltinType::Boolean).unwrap()
}

/// `SEQUENCE { name ty, ... }` with mandatory components.
pub fn sequence(schema: &mut Schema, components: Vec<(&str, TypeRef)>) -> TypeRef {
    let entries = components
        .into_iter()
        .map(|(name, ty)| {
            CollectionEntry::Component(ComponentType::required(schema.intern(name), ty))
        })
        .collect();
    schema
        .collection(CollectionType::new(CollectionKind::Sequence, entries, false))
        .unwrap()
}

/// `{ name value, ... }`.
pub fn record(schema: &Schema, components: Vec<(&str, Value)>) -> Value {
    Value::Collection(
        components
            .into_iter()
            .map(|(name, value)| Value::named(schema.intern(name), value))
            .collect(),
    )
}

pub fn names<const N: usize>(schema: &Schema, names: [&str; N]) -> [Name; N] {
    names.map(|name| schema.intern(name))
}
