//! Deferred type references.
//!
//! A [`TypeRef`] is how a definition names another type before resolution:
//! by symbol, or by handle to a type it owns or merely shares. The owning
//! entity caches the resolved [`TypeId`] once validation has run.

use asn_ir::{RefName, TypeId};

use crate::error::Result;
use crate::schema::Schema;
use crate::scope::Scope;

/// A reference to a type, resolved through a scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A (possibly module-qualified) type reference name.
    Named(RefName),
    /// A type owned by the referencing entity. Copies deep-copy it.
    Inline(TypeId),
    /// A type owned elsewhere (a binding, a flattened component, a core
    /// type). Copies keep the handle.
    Shared(TypeId),
}

impl TypeRef {
    /// Resolve to an arena handle in `scope`.
    ///
    /// Owned and shared handles resolve to themselves.
    pub fn resolve(&self, schema: &Schema, scope: &Scope) -> Result<TypeId> {
        match self {
            TypeRef::Named(name) => scope.resolve_type(schema, name),
            TypeRef::Inline(id) | TypeRef::Shared(id) => Ok(*id),
        }
    }

    /// The owned type, if this reference owns one.
    pub fn owned(&self) -> Option<TypeId> {
        match self {
            TypeRef::Inline(id) => Some(*id),
            TypeRef::Named(_) | TypeRef::Shared(_) => None,
        }
    }

    /// The handle, when this reference does not need a scope to resolve.
    pub fn handle(&self) -> Option<TypeId> {
        match self {
            TypeRef::Inline(id) | TypeRef::Shared(id) => Some(*id),
            TypeRef::Named(_) => None,
        }
    }
}

impl From<RefName> for TypeRef {
    fn from(name: RefName) -> Self {
        TypeRef::Named(name)
    }
}
