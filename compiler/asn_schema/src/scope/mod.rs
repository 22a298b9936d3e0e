//! Scope chain for name resolution.
//!
//! A [`Scope`] is an immutable node in a singly linked chain. Validation
//! pushes a node per nesting context (module, type, template bindings,
//! enclosing value) and resolution walks the chain innermost → outermost.
//! Nodes are `Rc`-shared, so child scopes are cheap and the parent chain is
//! never mutated.
//!
//! # Resolution order
//!
//! For an unqualified name, from the innermost node outwards:
//!
//! 1. **Type** nodes answer value names with the type's named numbers or
//!    enumeration items (`red` inside an `ENUMERATED { red, ... }` context).
//! 2. **Template** nodes answer names bound to template parameters.
//! 3. The outermost **Module** node answers through the module's local
//!    definitions, then its import tables, then the core module (see
//!    `Schema::lookup_type_in`).
//!
//! Module-qualified names skip steps 1 and 2 and go straight to the named
//! module's exports.

use std::fmt;
use std::rc::Rc;

use asn_ir::{ModuleId, RefName, TypeId};
use smallvec::SmallVec;

use crate::error::{Result, SchemaError};
use crate::module::ValueDefId;
use crate::schema::Schema;
use crate::template::{Binding, TemplateBindings};
use crate::value::Value;

/// What one scope node contributes to resolution.
#[derive(Clone, Debug)]
pub enum ScopeKind {
    /// Root of every chain: the module whose definitions are visible.
    Module(ModuleId),
    /// Inside a type: its named numbers and enumeration items are visible.
    Type(TypeId),
    /// Inside a template instantiation: parameters are bound.
    Template(Rc<TemplateBindings>),
    /// Inside a collection value being optimized; table constraints read
    /// sibling components through these levels.
    Value { ty: TypeId, value: Rc<Value> },
}

/// What a value name resolved to.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueSymbol {
    /// A module-level value definition.
    Defined(ValueDefId),
    /// A named number, enumeration item or bound value parameter.
    Literal(Value),
}

struct ScopeNode {
    kind: ScopeKind,
    parent: Option<Scope>,
    depth: u32,
}

/// Immutable, cheaply clonable scope chain.
#[derive(Clone)]
pub struct Scope(Rc<ScopeNode>);

impl Scope {
    /// Root scope of a module.
    pub fn module(module: ModuleId) -> Self {
        Scope(Rc::new(ScopeNode {
            kind: ScopeKind::Module(module),
            parent: None,
            depth: 0,
        }))
    }

    fn child(&self, kind: ScopeKind) -> Self {
        Scope(Rc::new(ScopeNode {
            kind,
            parent: Some(self.clone()),
            depth: self.0.depth + 1,
        }))
    }

    /// Scope inside type `ty`.
    #[must_use]
    pub fn child_type(&self, ty: TypeId) -> Self {
        // Re-entering the same type adds nothing.
        if matches!(self.0.kind, ScopeKind::Type(current) if current == ty) {
            return self.clone();
        }
        self.child(ScopeKind::Type(ty))
    }

    /// Scope of a template body with `bindings` in effect.
    #[must_use]
    pub fn child_template(&self, bindings: Rc<TemplateBindings>) -> Self {
        self.child(ScopeKind::Template(bindings))
    }

    /// Scope inside collection value `value` of type `ty`.
    #[must_use]
    pub fn child_value(&self, ty: TypeId, value: Rc<Value>) -> Self {
        self.child(ScopeKind::Value { ty, value })
    }

    pub fn kind(&self) -> &ScopeKind {
        &self.0.kind
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.0.parent.as_ref()
    }

    /// Number of ancestors.
    pub fn depth(&self) -> u32 {
        self.0.depth
    }

    /// Nodes from innermost to outermost.
    pub fn iter(&self) -> impl Iterator<Item = &ScopeKind> {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let scope = next?;
            next = scope.parent();
            Some(scope.kind())
        })
    }

    /// The module at the root of this chain.
    pub fn module_id(&self) -> Option<ModuleId> {
        self.iter().find_map(|kind| match kind {
            ScopeKind::Module(id) => Some(*id),
            _ => None,
        })
    }

    /// Enclosing collection values, innermost first.
    pub fn value_levels(&self) -> SmallVec<[(TypeId, Rc<Value>); 4]> {
        self.iter()
            .filter_map(|kind| match kind {
                ScopeKind::Value { ty, value } => Some((*ty, Rc::clone(value))),
                _ => None,
            })
            .collect()
    }

    /// Namespace of the innermost template instantiation, if any.
    pub fn template_namespace(&self) -> Option<&str> {
        self.iter().find_map(|kind| match kind {
            ScopeKind::Template(bindings) => Some(bindings.namespace.as_str()),
            _ => None,
        })
    }

    /// Resolve a type reference name.
    pub fn resolve_type(&self, schema: &Schema, name: &RefName) -> Result<TypeId> {
        if name.is_qualified() {
            return schema.lookup_qualified_type(name);
        }
        for kind in self.iter() {
            match kind {
                ScopeKind::Template(bindings) => match bindings.get(name.name) {
                    Some(Binding::Type(id) | Binding::ValueSet(id)) => return Ok(*id),
                    Some(Binding::Value(_)) => {
                        return Err(SchemaError::validation(
                            asn_diagnostic::ErrorCode::E2008,
                            format!(
                                "value parameter `{}` used as a type",
                                schema.name_str(name.name)
                            ),
                        ));
                    }
                    None => {}
                },
                ScopeKind::Module(module) => return schema.lookup_type_in(*module, name.name),
                ScopeKind::Type(_) | ScopeKind::Value { .. } => {}
            }
        }
        Err(SchemaError::unresolved_type(schema.name_str(name.name)))
    }

    /// Resolve a value reference name.
    pub fn resolve_value(&self, schema: &Schema, name: &RefName) -> Result<ValueSymbol> {
        if name.is_qualified() {
            return schema
                .lookup_qualified_value(name)
                .map(ValueSymbol::Defined);
        }
        for kind in self.iter() {
            match kind {
                ScopeKind::Type(ty) => {
                    if let Some(value) = schema.named_value(*ty, name.name) {
                        return Ok(ValueSymbol::Literal(value));
                    }
                }
                ScopeKind::Template(bindings) => match bindings.get(name.name) {
                    Some(Binding::Value(value)) => return Ok(ValueSymbol::Literal(value.clone())),
                    Some(Binding::Type(_) | Binding::ValueSet(_)) => {
                        return Err(SchemaError::validation(
                            asn_diagnostic::ErrorCode::E2008,
                            format!(
                                "type parameter `{}` used as a value",
                                schema.name_str(name.name)
                            ),
                        ));
                    }
                    None => {}
                },
                ScopeKind::Module(module) => {
                    return schema
                        .lookup_value_in(*module, name.name)
                        .map(ValueSymbol::Defined);
                }
                ScopeKind::Value { .. } => {}
            }
        }
        Err(SchemaError::unresolved_value(schema.name_str(name.name)))
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|kind| match kind {
                ScopeKind::Module(id) => format!("module {id:?}"),
                ScopeKind::Type(id) => format!("type {id:?}"),
                ScopeKind::Template(bindings) => format!("template {}", bindings.namespace),
                ScopeKind::Value { ty, .. } => format!("value of {ty:?}"),
            }))
            .finish()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
