//! The built-in registry module.
//!
//! Useful classes every schema may use without importing them
//! (`TYPE-IDENTIFIER`, `ABSTRACT-SYNTAX`) live in one module, found by name
//! lookup as the last resort. The registry is a plain value handed to
//! `Schema::with_registry`; hosts can extend or replace it.

use asn_ir::ModuleId;

use super::Exports;
use crate::error::Result;
use crate::refs::TypeRef;
use crate::schema::Schema;
use crate::types::{BuiltinType, ClassField, ClassType, FieldKind, NamedNumber, NamedNumberList};
use crate::value::{Setting, Value};

/// Builds the type of one registry definition.
pub type CoreBuilder = fn(&mut Schema) -> Result<TypeRef>;

/// One registry definition.
#[derive(Copy, Clone, Debug)]
pub struct CoreEntry {
    pub name: &'static str,
    pub build: CoreBuilder,
}

/// Definitions installed into the core module.
#[derive(Clone, Debug, Default)]
pub struct CoreRegistry {
    entries: Vec<CoreEntry>,
}

impl CoreRegistry {
    /// A registry with no definitions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `TYPE-IDENTIFIER` and `ABSTRACT-SYNTAX`.
    pub fn standard() -> Self {
        Self::empty()
            .with_entry("TYPE-IDENTIFIER", type_identifier)
            .with_entry("ABSTRACT-SYNTAX", abstract_syntax)
    }

    #[must_use]
    pub fn with_entry(mut self, name: &'static str, build: CoreBuilder) -> Self {
        self.entries.push(CoreEntry { name, build });
        self
    }

    pub fn entries(&self) -> &[CoreEntry] {
        &self.entries
    }

    /// Create the core module in `schema` and define every entry there.
    pub(crate) fn install(&self, schema: &mut Schema) -> Result<ModuleId> {
        let name = schema.config.core_module_name.clone();
        let options = schema.config.module_options();
        let module = schema.add_module(&name, options)?;
        schema.set_exports(module, Exports::All)?;
        for entry in &self.entries {
            let ty = (entry.build)(schema)?;
            let name = schema.intern(entry.name);
            schema.define_type(module, name, ty)?;
        }
        tracing::debug!(module = %name, definitions = self.entries.len(), "installed core module");
        Ok(module)
    }
}

/// `CLASS { &id OBJECT IDENTIFIER UNIQUE, &Type }`.
fn type_identifier(schema: &mut Schema) -> Result<TypeRef> {
    let oid = schema.builtin(BuiltinType::ObjectIdentifier)?;
    let fields = vec![
        ClassField::required(schema.intern("&id"), FieldKind::FixedValue { ty: oid, unique: true }),
        ClassField::required(schema.intern("&Type"), FieldKind::Type),
    ];
    schema.class(ClassType::new(fields))
}

/// `CLASS { &id OBJECT IDENTIFIER UNIQUE, &Type,
///          &property BIT STRING { handles-invalid-encodings(0) } DEFAULT {} }`.
fn abstract_syntax(schema: &mut Schema) -> Result<TypeRef> {
    let oid = schema.builtin(BuiltinType::ObjectIdentifier)?;
    let bits = NamedNumberList::new(vec![NamedNumber::new(
        schema.intern("handles-invalid-encodings"),
        Value::Integer(0),
    )]);
    let property = schema.builtin(BuiltinType::BitString(bits))?;
    let fields = vec![
        ClassField::required(schema.intern("&id"), FieldKind::FixedValue { ty: oid, unique: true }),
        ClassField::required(schema.intern("&Type"), FieldKind::Type),
        ClassField::new(
            schema.intern("&property"),
            FieldKind::FixedValue {
                ty: property,
                unique: false,
            },
            false,
            Some(Setting::Value(Value::Collection(Vec::new()))),
        )?,
    ];
    schema.class(ClassType::new(fields))
}
