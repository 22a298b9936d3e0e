//! Type model.
//!
//! Every type lives in the schema's [`TypePool`] and is addressed by a
//! [`TypeId`]. Decorators (defined, tagged, constrained, selection, template
//! instance, class field, object field) own exactly one sibling reference and
//! forward queries to it once it is resolved; concrete kinds (builtins,
//! collections, classes) answer themselves. `Schema::unwrap_concrete` follows
//! the decorator chain.
//!
//! # Lifecycle
//!
//! ```text
//! Unvalidated ──validate──▶ Validating ──▶ Valid
//!      │                         └───────▶ Invalid(err)
//!      └──copy──▶ fresh Unvalidated copy
//! any ──dispose──▶ Disposed
//! ```
//!
//! Validation resolves references through the scope chain and fills the
//! per-kind caches (`resolved`, `constraint`, `components`, ...). Those caches
//! are the only state that changes after construction.

mod builtin;
mod class;
mod collection;
mod copy;
mod dispose;
mod object;
mod optimize;
mod query;
mod strings;
mod time;
mod validate;

pub use builtin::{
    BuiltinType, EnumItem, EnumeratedType, Enumeration, NamedNumber, NamedNumberList,
};
pub use class::{ClassField, ClassType, FieldKind, FieldTarget};
pub use collection::{
    CollectionEntry, CollectionKind, CollectionOfKind, CollectionOfType, CollectionType,
    ComponentKind, ComponentType,
};
pub use strings::StringKind;
pub use time::TimeKind;
pub(crate) use time::{BasicForm, DateForm, LocalOrUtc, TimeFormats, TimeProperties};

use std::rc::Rc;

use asn_ir::{FieldPath, ModuleId, Name, RefName, TypeId};

use crate::constraint::{Constraint, ConstraintTemplate};
use crate::encoding::TagEncoding;
use crate::error::{Result, SchemaError};
use crate::refs::TypeRef;
use crate::template::{Template, TemplateArg, TemplateBindings};

/// Validation state of a type or definition.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationState {
    Unvalidated,
    /// Validation in progress; re-entrant validation returns immediately.
    Validating,
    Valid,
    /// Validation failed with this error. Terminal.
    Invalid(SchemaError),
    Disposed,
}

impl ValidationState {
    /// Whether validation has run to completion (either way).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ValidationState::Valid | ValidationState::Invalid(_) | ValidationState::Disposed
        )
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationState::Valid)
    }
}

/// A type reference assignment: `Name ::= Type`, or `Name{params} ::= Type`.
#[derive(Clone, Debug, PartialEq)]
pub struct DefinedType {
    pub name: Name,
    /// Module the definition belongs to; its sibling resolves there.
    pub module: ModuleId,
    pub sibling: TypeRef,
    /// Parameters of a parameterized definition.
    pub template: Option<Template>,
    /// Set on instantiated copies: `Name{args}`.
    pub namespace: Option<String>,
    /// Parameter bindings of an instantiated copy.
    pub bindings: Option<Rc<TemplateBindings>>,
    pub resolved: Option<TypeId>,
}

/// `[class number] method Type`.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggedType {
    /// Tag as written.
    pub tag: TagEncoding,
    pub sibling: TypeRef,
    pub resolved: Option<TypeId>,
    /// Tag after applying the module default and CHOICE promotion.
    pub effective: Option<TagEncoding>,
}

/// `Type (constraint)`, and value sets / object sets.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstrainedType {
    pub sibling: TypeRef,
    pub template: ConstraintTemplate,
    /// Defined as a value set or object set (`T ::= {1 | 2}`) rather than a
    /// subtype.
    pub value_set: bool,
    pub resolved: Option<TypeId>,
    pub constraint: Option<Constraint>,
}

/// `alternative < Choice`.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionType {
    pub name: Name,
    pub sibling: TypeRef,
    /// The selected alternative's type.
    pub resolved: Option<TypeId>,
}

/// `Template{arg, ...}` used as a type.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceType {
    pub template: RefName,
    pub args: Vec<TemplateArg>,
    /// The instantiated copy.
    pub resolved: Option<TypeId>,
}

/// `Class.&field.&path`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassFieldType {
    pub class: TypeRef,
    pub path: FieldPath,
    pub class_id: Option<TypeId>,
    pub target: Option<FieldTarget>,
}

/// `object.&Field` used as a type (or value set).
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectFieldType {
    pub object: RefName,
    pub path: FieldPath,
    pub resolved: Option<TypeId>,
}

/// All type variants.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    Builtin(BuiltinType),
    Defined(DefinedType),
    Tagged(TaggedType),
    Constrained(ConstrainedType),
    Selection(SelectionType),
    Instance(InstanceType),
    Collection(CollectionType),
    CollectionOf(CollectionOfType),
    Class(ClassType),
    ClassField(ClassFieldType),
    ObjectField(ObjectFieldType),
}

/// Copyable discriminant of [`TypeKind`], for dispatch without borrowing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum KindTag {
    Builtin,
    Defined,
    Tagged,
    Constrained,
    Selection,
    Instance,
    Collection,
    CollectionOf,
    Class,
    ClassField,
    ObjectField,
}

impl TypeKind {
    pub(crate) fn tag(&self) -> KindTag {
        match self {
            TypeKind::Builtin(_) => KindTag::Builtin,
            TypeKind::Defined(_) => KindTag::Defined,
            TypeKind::Tagged(_) => KindTag::Tagged,
            TypeKind::Constrained(_) => KindTag::Constrained,
            TypeKind::Selection(_) => KindTag::Selection,
            TypeKind::Instance(_) => KindTag::Instance,
            TypeKind::Collection(_) => KindTag::Collection,
            TypeKind::CollectionOf(_) => KindTag::CollectionOf,
            TypeKind::Class(_) => KindTag::Class,
            TypeKind::ClassField(_) => KindTag::ClassField,
            TypeKind::ObjectField(_) => KindTag::ObjectField,
        }
    }

    /// Whether this kind forwards to a sibling.
    pub fn is_decorator(&self) -> bool {
        matches!(
            self,
            TypeKind::Defined(_)
                | TypeKind::Tagged(_)
                | TypeKind::Constrained(_)
                | TypeKind::Selection(_)
                | TypeKind::Instance(_)
                | TypeKind::ClassField(_)
                | TypeKind::ObjectField(_)
        )
    }
}

/// One arena slot.
#[derive(Clone, Debug)]
pub struct TypeEntry {
    pub kind: TypeKind,
    pub state: ValidationState,
    /// The type this one was copied from, transitively; itself otherwise.
    pub origin: TypeId,
}

/// Arena of all types of a schema.
#[derive(Debug, Default)]
pub struct TypePool {
    entries: Vec<TypeEntry>,
}

impl TypePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unvalidated type.
    pub fn push(&mut self, kind: TypeKind) -> Result<TypeId> {
        let id = self.next_id()?;
        self.entries.push(TypeEntry {
            kind,
            state: ValidationState::Unvalidated,
            origin: id,
        });
        Ok(id)
    }

    /// Add an unvalidated copy of `source`.
    pub fn push_copy(&mut self, kind: TypeKind, source: TypeId) -> Result<TypeId> {
        let origin = self.origin(source)?;
        let id = self.next_id()?;
        self.entries.push(TypeEntry {
            kind,
            state: ValidationState::Unvalidated,
            origin,
        });
        Ok(id)
    }

    fn next_id(&self) -> Result<TypeId> {
        let raw = u32::try_from(self.entries.len())
            .ok()
            .filter(|raw| *raw != u32::MAX)
            .ok_or_else(|| SchemaError::unsupported("type arena exceeded u32 handles"))?;
        Ok(TypeId::from_raw(raw))
    }

    /// The type `id` was first copied from.
    pub fn origin(&self, id: TypeId) -> Result<TypeId> {
        Ok(self.get(id)?.origin)
    }

    pub fn get(&self, id: TypeId) -> Result<&TypeEntry> {
        self.entries
            .get(id.index())
            .ok_or_else(|| SchemaError::illegal_state(format!("unknown type handle {id:?}")))
    }

    pub fn get_mut(&mut self, id: TypeId) -> Result<&mut TypeEntry> {
        self.entries
            .get_mut(id.index())
            .ok_or_else(|| SchemaError::illegal_state(format!("unknown type handle {id:?}")))
    }

    pub fn kind(&self, id: TypeId) -> Result<&TypeKind> {
        Ok(&self.get(id)?.kind)
    }

    pub fn kind_mut(&mut self, id: TypeId) -> Result<&mut TypeKind> {
        Ok(&mut self.get_mut(id)?.kind)
    }

    pub fn state(&self, id: TypeId) -> Result<&ValidationState> {
        Ok(&self.get(id)?.state)
    }

    pub fn set_state(&mut self, id: TypeId, state: ValidationState) -> Result<()> {
        self.get_mut(id)?.state = state;
        Ok(())
    }

    pub(crate) fn tag(&self, id: TypeId) -> Result<KindTag> {
        Ok(self.kind(id)?.tag())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Error for a handle whose kind does not match the operation.
#[cold]
pub(crate) fn wrong_kind(id: TypeId, expected: &str) -> SchemaError {
    SchemaError::illegal_state(format!("{id:?} is not a {expected} type"))
}

/// Error for reading a cache that validation has not filled yet.
#[cold]
pub(crate) fn not_validated(id: TypeId) -> SchemaError {
    SchemaError::illegal_state(format!("{id:?} used before validation"))
}
