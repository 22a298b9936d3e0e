//! Constraint templates: constraints as written, before binding to a type.

use asn_ir::Name;

use crate::refs::TypeRef;
use crate::value::Value;

/// One end of a value range.
#[derive(Clone, Debug, PartialEq)]
pub enum Bound {
    Min,
    Max,
    Value(Value),
}

/// A range endpoint: `5`, `5<`, `MIN`, `<MAX`.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeEndpoint {
    pub bound: Bound,
    pub exclusive: bool,
}

impl RangeEndpoint {
    pub fn inclusive(bound: Bound) -> Self {
        RangeEndpoint {
            bound,
            exclusive: false,
        }
    }

    pub fn exclusive(bound: Bound) -> Self {
        RangeEndpoint {
            bound,
            exclusive: true,
        }
    }

    pub fn min() -> Self {
        Self::inclusive(Bound::Min)
    }

    pub fn max() -> Self {
        Self::inclusive(Bound::Max)
    }

    pub fn value(value: Value) -> Self {
        Self::inclusive(Bound::Value(value))
    }
}

/// Presence requirement in `WITH COMPONENTS`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Presence {
    Present,
    Absent,
    Optional,
    /// No presence keyword.
    Unspecified,
}

/// `name (constraint) PRESENT` inside `WITH COMPONENTS`.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentConstraintTemplate {
    pub name: Name,
    pub presence: Presence,
    pub constraint: Option<Box<ConstraintTemplate>>,
}

/// One `@` reference of a component relation constraint.
///
/// `level` is `None` for `@a.b` (outermost level) and `Some(n)` for `n`
/// leading dots (`@.a` is level 1, the innermost enclosing type).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationItem {
    pub level: Option<u32>,
    pub path: Vec<Name>,
}

impl RelationItem {
    pub fn absolute(path: Vec<Name>) -> Self {
        RelationItem { level: None, path }
    }

    pub fn relative(level: u32, path: Vec<Name>) -> Self {
        RelationItem {
            level: Some(level),
            path,
        }
    }
}

/// A constraint as written.
///
/// Building against a resolved type (`Schema::build_constraint`) checks family
/// applicability, resolves references and optimizes values, yielding a
/// [`Constraint`](super::Constraint).
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintTemplate {
    /// `root, ..., additional`.
    ElementSetSpecs {
        root: Option<Box<ConstraintTemplate>>,
        extensible: bool,
        additional: Option<Box<ConstraintTemplate>>,
    },
    Union(Vec<ConstraintTemplate>),
    Intersection(Vec<ConstraintTemplate>),
    Except {
        base: Box<ConstraintTemplate>,
        exception: Box<ConstraintTemplate>,
    },
    /// `ALL` or `ALL EXCEPT exception`.
    All {
        exception: Option<Box<ConstraintTemplate>>,
    },
    /// Single value.
    Value(Value),
    ValueRange {
        min: RangeEndpoint,
        max: RangeEndpoint,
    },
    Size(Box<ConstraintTemplate>),
    PermittedAlphabet(Box<ConstraintTemplate>),
    /// `PATTERN "regex"`.
    Pattern(Value),
    /// Contained subtype, or inclusion of a value set / object set.
    Type(TypeRef),
    /// `WITH COMPONENT (constraint)`.
    InnerType(Box<ConstraintTemplate>),
    /// `WITH COMPONENTS { [...,] a PRESENT, b (1..5) }`.
    InnerTypes {
        partial: bool,
        components: Vec<ComponentConstraintTemplate>,
    },
    /// `({ObjectSet})` or `({ObjectSet}{@a, @.b})`.
    Table {
        object_set: TypeRef,
        relations: Vec<RelationItem>,
    },
    /// `SETTINGS "Basic=Date Date=YMD"`.
    Settings(Value),
}

impl ConstraintTemplate {
    /// A non-extensible element set: `(root)`.
    pub fn element_set(root: ConstraintTemplate) -> Self {
        ConstraintTemplate::ElementSetSpecs {
            root: Some(Box::new(root)),
            extensible: false,
            additional: None,
        }
    }

    /// An extensible element set: `(root, ..., additional)`.
    pub fn extensible(
        root: Option<ConstraintTemplate>,
        additional: Option<ConstraintTemplate>,
    ) -> Self {
        ConstraintTemplate::ElementSetSpecs {
            root: root.map(Box::new),
            extensible: true,
            additional: additional.map(Box::new),
        }
    }

    pub fn range(min: RangeEndpoint, max: RangeEndpoint) -> Self {
        ConstraintTemplate::ValueRange { min, max }
    }

    pub fn size(inner: ConstraintTemplate) -> Self {
        ConstraintTemplate::Size(Box::new(inner))
    }

    pub fn except(base: ConstraintTemplate, exception: ConstraintTemplate) -> Self {
        ConstraintTemplate::Except {
            base: Box::new(base),
            exception: Box::new(exception),
        }
    }

    pub fn all_except(exception: ConstraintTemplate) -> Self {
        ConstraintTemplate::All {
            exception: Some(Box::new(exception)),
        }
    }

    /// Whether this template denotes a set of values (a value set or object
    /// set when used as a type).
    pub fn is_element_set(&self) -> bool {
        matches!(self, ConstraintTemplate::ElementSetSpecs { .. })
    }
}
