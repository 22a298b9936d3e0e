//! Templates (parameterized definitions).
//!
//! A template-bearing defined type is never validated itself. Each reference
//! with actual arguments (`Set{INTEGER}`) produces an independent copy of the
//! body, validated in a scope where the parameters are bound. See
//! [`instantiate`] for the binding rules.

mod instantiate;

pub(crate) use instantiate::ArgumentKey;

use asn_diagnostic::ErrorCode;
use asn_ir::{Name, RefName, TypeId};
use rustc_hash::FxHashSet;

use crate::constraint::ConstraintTemplate;
use crate::error::{Result, SchemaError};
use crate::refs::TypeRef;
use crate::value::Value;

/// Whether a parameter stands for a type (or value set) or a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// `Type` or, with a governor, `Governor : ValueSet`.
    Type,
    /// `Governor : value`.
    Value,
}

/// One formal parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateParameter {
    pub index: usize,
    pub name: Name,
    pub kind: ParameterKind,
    /// Type governing a value or value-set parameter.
    pub governor: Option<TypeRef>,
}

impl TemplateParameter {
    pub fn new(index: usize, name: Name, kind: ParameterKind, governor: Option<TypeRef>) -> Self {
        TemplateParameter {
            index,
            name,
            kind,
            governor,
        }
    }
}

/// Ordered parameter list of a parameterized definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    params: Vec<TemplateParameter>,
}

impl Template {
    /// Build a parameter list; names must be distinct.
    ///
    /// Indices are reassigned to declaration order.
    pub fn new(params: Vec<TemplateParameter>) -> Result<Self> {
        let mut seen = FxHashSet::default();
        let mut params = params;
        for (index, param) in params.iter_mut().enumerate() {
            if !seen.insert(param.name) {
                return Err(SchemaError::validation(
                    ErrorCode::E2002,
                    format!("duplicate template parameter at position {index}"),
                ));
            }
            param.index = index;
        }
        Ok(Template { params })
    }

    pub fn params(&self) -> &[TemplateParameter] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn param(&self, name: Name) -> Option<&TemplateParameter> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// An actual argument as written at the use site.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateArg {
    Type(TypeRef),
    Value(Value),
    /// A bare reference name; whether it is a type or a value is decided by
    /// the parameter it is matched with.
    Name(RefName),
    /// A value set or object set written in place: `{1 | 2}`.
    ElementSet(Box<ConstraintTemplate>),
}

/// What a parameter is bound to inside one instantiation.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    Type(TypeId),
    /// A value set or object set, as its constrained type.
    ValueSet(TypeId),
    Value(Value),
}

/// Parameter bindings of one instantiation.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TemplateBindings {
    /// Instance namespace, qualified by the argument list: `Set{INTEGER}`.
    pub namespace: String,
    bindings: Vec<(Name, Binding)>,
}

impl TemplateBindings {
    pub fn new(namespace: impl Into<String>) -> Self {
        TemplateBindings {
            namespace: namespace.into(),
            bindings: Vec::new(),
        }
    }

    pub fn bind(&mut self, name: Name, binding: Binding) {
        self.bindings.push((name, binding));
    }

    pub fn get(&self, name: Name) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, b)| b)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Name, Binding)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
