//! Reference names as produced by the grammar collaborator.
//!
//! These are the *unresolved* spellings: a possibly module-qualified symbol, a
//! dotted class field path, or a module reference. Resolution into arena
//! handles happens in the schema layer through a scope chain.

use smallvec::SmallVec;

use crate::Name;

/// A possibly module-qualified symbol (`Module.symbol` or `symbol`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RefName {
    /// Qualifying module, for external references.
    pub module: Option<Name>,
    /// The referenced symbol.
    pub name: Name,
}

impl RefName {
    /// An unqualified reference.
    pub const fn local(name: Name) -> Self {
        Self { module: None, name }
    }

    /// A module-qualified (external) reference.
    pub const fn qualified(module: Name, name: Name) -> Self {
        Self {
            module: Some(module),
            name,
        }
    }

    /// Whether this reference names its module explicitly.
    pub const fn is_qualified(&self) -> bool {
        self.module.is_some()
    }
}

impl From<Name> for RefName {
    fn from(name: Name) -> Self {
        Self::local(name)
    }
}

/// A dotted path of class field names: `&obj.&Type`.
///
/// Every element is a field name including its leading `&`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct FieldPath(SmallVec<[Name; 2]>);

impl FieldPath {
    /// A single-element path.
    pub fn single(field: Name) -> Self {
        let mut path = SmallVec::new();
        path.push(field);
        Self(path)
    }

    /// Build a path from its elements.
    pub fn new(fields: impl IntoIterator<Item = Name>) -> Self {
        Self(fields.into_iter().collect())
    }

    /// Path elements, outermost first.
    pub fn fields(&self) -> &[Name] {
        &self.0
    }

    /// First element, if any.
    pub fn first(&self) -> Option<Name> {
        self.0.first().copied()
    }

    /// Last element, if any.
    pub fn last(&self) -> Option<Name> {
        self.0.last().copied()
    }

    /// Path without its first element.
    #[must_use]
    pub fn tail(&self) -> Self {
        Self(self.0.iter().skip(1).copied().collect())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A reference to a module: its name and, optionally, its OID.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModuleRef {
    /// Module name.
    pub name: Name,
    /// Module object identifier arcs, when the import names one.
    pub oid: Option<Vec<u64>>,
}

impl ModuleRef {
    /// A reference by name only.
    pub const fn named(name: Name) -> Self {
        Self { name, oid: None }
    }

    /// A reference by name and OID.
    pub fn with_oid(name: Name, oid: impl Into<Vec<u64>>) -> Self {
        Self {
            name,
            oid: Some(oid.into()),
        }
    }
}
