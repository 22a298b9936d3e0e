//! Read-only queries over validated types.
//!
//! Decorators forward every query to their sibling; [`Schema::unwrap_concrete`]
//! is the single place that walks the decorator chain.

use asn_diagnostic::ErrorCode;
use asn_ir::{Name, TypeId};

use super::{not_validated, BuiltinType, FieldTarget, TypeKind, ValidationState};
use crate::constraint::Constraint;
use crate::encoding::{universal_tag, Encoding, EncodingKind, TagEncoding};
use crate::error::{Result, SchemaError};
use crate::family::Family;
use crate::schema::Schema;
use crate::scope::Scope;
use crate::value::Value;

impl Schema {
    /// The type a decorator forwards to; `None` for concrete kinds.
    pub fn sibling(&self, id: TypeId) -> Result<Option<TypeId>> {
        let forwarded = match self.types.kind(id)? {
            TypeKind::Defined(defined) => defined.resolved,
            TypeKind::Tagged(tagged) => tagged.resolved,
            TypeKind::Constrained(constrained) => constrained.resolved,
            TypeKind::Selection(selection) => selection.resolved,
            TypeKind::Instance(instance) => instance.resolved,
            TypeKind::ObjectField(field) => field.resolved,
            TypeKind::ClassField(field) => match field.target {
                Some(FieldTarget::OpenType) => return Ok(None),
                Some(
                    FieldTarget::Fixed(ty) | FieldTarget::Object(ty) | FieldTarget::ObjectSet(ty),
                ) => Some(ty),
                None => None,
            },
            TypeKind::Builtin(_)
            | TypeKind::Collection(_)
            | TypeKind::CollectionOf(_)
            | TypeKind::Class(_) => return Ok(None),
        };
        forwarded.map(Some).ok_or_else(|| not_validated(id))
    }

    /// Follow decorators down to the type that defines the family.
    pub fn unwrap_concrete(&self, id: TypeId) -> Result<TypeId> {
        let mut current = id;
        // A decorator chain can't be longer than the pool.
        for _ in 0..=self.types.len() {
            match self.sibling(current)? {
                Some(next) => current = next,
                None => return Ok(current),
            }
        }
        Err(SchemaError::validation(
            ErrorCode::E2001,
            format!("{} refers to itself", self.type_label(id)),
        ))
    }

    pub fn family(&self, id: TypeId) -> Result<Family> {
        let concrete = self.unwrap_concrete(id)?;
        Ok(match self.types.kind(concrete)? {
            TypeKind::Builtin(builtin) => builtin.family(),
            TypeKind::Collection(collection) => collection.kind.family(),
            TypeKind::CollectionOf(of) => of.family(),
            TypeKind::Class(_) => Family::Class,
            TypeKind::ClassField(_) => Family::OpenType,
            _ => return Err(not_validated(concrete)),
        })
    }

    /// Component, alternative or fixed-type class field `name`.
    pub fn named_type(&self, id: TypeId, name: Name) -> Result<Option<TypeId>> {
        let concrete = self.unwrap_concrete(id)?;
        Ok(match self.types.kind(concrete)? {
            TypeKind::Collection(collection) => collection.component(name).and_then(|c| c.resolved),
            TypeKind::CollectionOf(of) if of.element_name == Some(name) => of.resolved,
            TypeKind::Class(class) => class.field(name).and_then(|f| f.resolved),
            _ => None,
        })
    }

    /// Components or alternatives in definition order.
    pub fn named_types(&self, id: TypeId) -> Result<Vec<(Name, TypeId)>> {
        let concrete = self.unwrap_concrete(id)?;
        match self.types.kind(concrete)? {
            TypeKind::Collection(collection) => collection
                .components
                .iter()
                .map(|c| Ok((c.name, c.resolved.ok_or_else(|| not_validated(concrete))?)))
                .collect(),
            _ => Ok(Vec::new()),
        }
    }

    /// Named numbers, named bits or enumeration items.
    pub fn named_values(&self, id: TypeId) -> Result<Vec<(Name, Value)>> {
        let concrete = self.unwrap_concrete(id)?;
        Ok(match self.types.kind(concrete)? {
            TypeKind::Builtin(BuiltinType::Integer(list) | BuiltinType::BitString(list)) => list
                .resolved
                .iter()
                .map(|(name, n)| (*name, Value::Integer(*n)))
                .collect(),
            TypeKind::Builtin(BuiltinType::Enumerated(enumerated)) => enumerated
                .items
                .iter()
                .map(|item| (item.name, Value::named(item.name, Value::Integer(item.number))))
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Named value `name` of type `id`, if it has one.
    ///
    /// Tolerates types still being validated; used by scope resolution.
    pub fn named_value(&self, id: TypeId, name: Name) -> Option<Value> {
        let mut current = id;
        for _ in 0..=self.types.len() {
            match self.types.kind(current).ok()? {
                TypeKind::Builtin(BuiltinType::Integer(list) | BuiltinType::BitString(list)) => {
                    return list.number(name).map(Value::Integer);
                }
                TypeKind::Builtin(BuiltinType::Enumerated(enumerated)) => {
                    return enumerated
                        .by_name(name)
                        .map(|item| Value::named(item.name, Value::Integer(item.number)));
                }
                _ => current = self.sibling(current).ok().flatten()?,
            }
        }
        None
    }

    /// Encoding instruction of `kind` for type `id`.
    pub fn encoding(&self, id: TypeId, kind: EncodingKind) -> Result<Option<Encoding>> {
        match kind {
            EncodingKind::Tag => Ok(self.tag_of(id)?.map(Encoding::Tag)),
        }
    }

    /// Outermost tag of `id`; `None` for untagged CHOICE and open types.
    pub fn tag_of(&self, id: TypeId) -> Result<Option<TagEncoding>> {
        let mut current = id;
        for _ in 0..=self.types.len() {
            match self.types.kind(current)? {
                TypeKind::Tagged(tagged) => {
                    return tagged.effective.map(Some).ok_or_else(|| not_validated(current));
                }
                TypeKind::Builtin(BuiltinType::String(kind)) => {
                    return Ok(Some(TagEncoding::universal(kind.universal_tag())));
                }
                TypeKind::Builtin(BuiltinType::Time(kind)) => {
                    return Ok(Some(TagEncoding::universal(kind.universal_tag())));
                }
                TypeKind::Builtin(builtin) => return Ok(universal_tag(builtin.family())),
                TypeKind::Collection(collection) => {
                    return Ok(universal_tag(collection.kind.family()));
                }
                TypeKind::CollectionOf(of) => return Ok(universal_tag(of.family())),
                TypeKind::Class(_) => return Ok(None),
                _ => match self.sibling(current)? {
                    Some(next) => current = next,
                    None => return Ok(None),
                },
            }
        }
        Ok(None)
    }

    pub fn validation_state(&self, id: TypeId) -> Result<&ValidationState> {
        self.types.state(id)
    }

    /// The kind of type `id`.
    pub fn type_kind(&self, id: TypeId) -> Result<&TypeKind> {
        self.types.kind(id)
    }

    /// The constraint built on `id` itself, if it is a constrained type.
    pub fn constraint(&self, id: TypeId) -> Result<Option<&Constraint>> {
        Ok(match self.types.kind(id)? {
            TypeKind::Constrained(constrained) => constrained.constraint.as_ref(),
            _ => None,
        })
    }

    /// Innermost built constraint on the decorator chain of `id`.
    fn nearest_constraint(&self, id: TypeId) -> Result<Option<&Constraint>> {
        let mut current = id;
        for _ in 0..=self.types.len() {
            if let TypeKind::Constrained(constrained) = self.types.kind(current)? {
                return constrained
                    .constraint
                    .as_ref()
                    .map(Some)
                    .ok_or_else(|| not_validated(current));
            }
            match self.sibling(current)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(None)
    }

    /// Whether `id` can be queried as an element set (a value set, object
    /// set, or a type constrained by one).
    pub fn is_element_set(&self, id: TypeId) -> bool {
        self.nearest_constraint(id).is_ok_and(|c| c.is_some())
    }

    /// Values (or objects) of the element set `id`, in definition order.
    pub fn element_set_values(&self, id: TypeId) -> Result<Vec<Value>> {
        let constraint = self.nearest_constraint(id)?.ok_or_else(|| {
            SchemaError::unsupported(format!("{} is not an element set", self.type_label(id)))
        })?;
        let scope = self.definition_scope(id);
        constraint.collect_values(self, &scope)?.ok_or_else(|| {
            SchemaError::unsupported(format!(
                "{} does not denote a finite set of values",
                self.type_label(id)
            ))
        })
    }

    /// Whether the element set `id` is extensible.
    pub fn element_set_is_extensible(&self, id: TypeId) -> Result<bool> {
        Ok(self
            .nearest_constraint(id)?
            .is_some_and(|constraint| constraint.is_extensible(self)))
    }

    /// Scope rooted at the module defining `id`, or at the core module for
    /// types not reachable from a definition.
    pub(crate) fn definition_scope(&self, id: TypeId) -> Scope {
        if let Ok(TypeKind::Defined(defined)) = self.types.kind(id) {
            return Scope::module(defined.module);
        }
        match self.core_module() {
            Some(core) => Scope::module(core),
            None => Scope::module(asn_ir::ModuleId::from_raw(0)),
        }
    }

    /// Short human-readable name of a type for messages.
    pub fn type_label(&self, id: TypeId) -> String {
        match self.types.kind(id) {
            Ok(TypeKind::Defined(defined)) => match &defined.namespace {
                Some(namespace) => namespace.clone(),
                None => self.name_str(defined.name).to_owned(),
            },
            Ok(TypeKind::Builtin(builtin)) => builtin.name().to_owned(),
            Ok(kind) => match self.family(id) {
                Ok(family) => family.name().to_owned(),
                Err(_) => format!("{:?} type", kind.tag()),
            },
            Err(_) => format!("{id:?}"),
        }
    }
}
