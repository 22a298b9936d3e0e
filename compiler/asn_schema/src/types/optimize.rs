//! Value acceptance and optimization against validated types.
//!
//! `optimize` is the codec-facing entry point: it resolves references in a
//! raw value, checks it against the type (and every constraint on the
//! decorator chain) and returns the native form. `accept` is the same check
//! without the result.

use asn_diagnostic::ErrorCode;
use asn_ir::TypeId;

use super::{not_validated, BuiltinType, CollectionKind, FieldTarget, TypeKind};
use crate::encoding::TagMethod;
use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::scope::{Scope, ValueSymbol};
use crate::stack::ensure_sufficient_stack;
use crate::value::{Setting, Value, ValueDisplay};

impl Schema {
    /// Check `value` against type `id` and return its optimized form.
    pub fn optimize(&self, id: TypeId, scope: &Scope, value: &Value) -> Result<Value> {
        ensure_sufficient_stack(|| self.optimize_kind(id, scope, value))
    }

    /// Check `value` against type `id`.
    pub fn accept(&self, id: TypeId, scope: &Scope, value: &Value) -> Result<()> {
        self.optimize(id, scope, value).map(|_| ())
    }

    fn optimize_kind(&self, id: TypeId, scope: &Scope, value: &Value) -> Result<Value> {
        self.ensure_usable(id)?;
        if let Value::Instance(_) = value {
            return Err(SchemaError::illegal_state(
                "parameterized value reached optimize before validation",
            ));
        }
        if value.is_reference() {
            let resolved = self.resolve_value_ref(&scope.child_type(id), value)?;
            return self.optimize_kind(id, scope, &resolved);
        }

        match self.types.kind(id)? {
            TypeKind::Builtin(builtin) => self.optimize_builtin(id, builtin, scope, value),
            TypeKind::Defined(defined) => {
                let sibling = defined.resolved.ok_or_else(|| not_validated(id))?;
                self.optimize(sibling, scope, value)
            }
            TypeKind::Tagged(tagged) => {
                let sibling = tagged.resolved.ok_or_else(|| not_validated(id))?;
                self.optimize(sibling, scope, value)
            }
            TypeKind::Constrained(constrained) => {
                let sibling = constrained.resolved.ok_or_else(|| not_validated(id))?;
                let optimized = self.optimize(sibling, scope, value)?;
                match &constrained.constraint {
                    Some(constraint) => constraint.apply(self, scope, &optimized),
                    // Recursive use while the constraint is still being built.
                    None => Ok(optimized),
                }
            }
            TypeKind::Selection(selection) => {
                let alternative = selection.resolved.ok_or_else(|| not_validated(id))?;
                self.optimize(alternative, scope, value)
            }
            TypeKind::Instance(instance) => {
                let copy = instance.resolved.ok_or_else(|| not_validated(id))?;
                self.optimize(copy, scope, value)
            }
            TypeKind::Collection(collection) => {
                self.optimize_collection(id, collection, scope, value)
            }
            TypeKind::CollectionOf(of) => self.optimize_collection_of(id, of, scope, value),
            TypeKind::Class(class) => self.optimize_object(id, class, scope, value),
            TypeKind::ClassField(field) => match field.target.ok_or_else(|| not_validated(id))? {
                FieldTarget::OpenType => self.optimize_open(scope, value),
                FieldTarget::Fixed(ty) | FieldTarget::Object(ty) | FieldTarget::ObjectSet(ty) => {
                    self.optimize(ty, scope, value)
                }
            },
            TypeKind::ObjectField(field) => {
                let resolved = field.resolved.ok_or_else(|| not_validated(id))?;
                self.optimize(resolved, scope, value)
            }
        }
    }

    /// An open type accepts anything; a value already paired with its type is
    /// checked against that type.
    fn optimize_open(&self, scope: &Scope, value: &Value) -> Result<Value> {
        match value {
            Value::OpenType(open) => {
                let inner = self.optimize(open.ty, scope, &open.value)?;
                Ok(Value::open_type(open.ty, inner))
            }
            other => Ok(other.clone()),
        }
    }

    /// Whether `value` of type `id` encodes as a constructed value.
    pub fn is_constructed_value(&self, id: TypeId, scope: &Scope, value: &Value) -> Result<bool> {
        self.ensure_usable(id)?;
        if value.is_reference() {
            let resolved = self.resolve_value_ref(&scope.child_type(id), value)?;
            return self.is_constructed_value(id, scope, &resolved);
        }
        match self.types.kind(id)? {
            TypeKind::Tagged(tagged) => {
                let effective = tagged.effective.ok_or_else(|| not_validated(id))?;
                if effective.method == TagMethod::Explicit {
                    return Ok(true);
                }
                let sibling = tagged.resolved.ok_or_else(|| not_validated(id))?;
                self.is_constructed_value(sibling, scope, value)
            }
            TypeKind::Collection(collection) => match (collection.kind, value) {
                (CollectionKind::Choice, Value::Named(named)) => {
                    let alternative = collection
                        .component(named.name)
                        .and_then(|c| c.resolved)
                        .ok_or_else(|| {
                            SchemaError::unresolved_component(self.name_str(named.name))
                        })?;
                    self.is_constructed_value(alternative, scope, &named.value)
                }
                (CollectionKind::Choice, _) => Err(self.value_mismatch(id, value)),
                _ => Ok(true),
            },
            TypeKind::CollectionOf(_) => Ok(true),
            TypeKind::Builtin(BuiltinType::OpenType) => self.is_constructed_open(scope, value),
            TypeKind::ClassField(field) => match field.target.ok_or_else(|| not_validated(id))? {
                FieldTarget::OpenType => self.is_constructed_open(scope, value),
                FieldTarget::Fixed(ty) | FieldTarget::Object(ty) | FieldTarget::ObjectSet(ty) => {
                    self.is_constructed_value(ty, scope, value)
                }
            },
            TypeKind::Builtin(_) | TypeKind::Class(_) => Ok(false),
            _ => match self.sibling(id)? {
                Some(sibling) => self.is_constructed_value(sibling, scope, value),
                None => Err(not_validated(id)),
            },
        }
    }

    fn is_constructed_open(&self, scope: &Scope, value: &Value) -> Result<bool> {
        match value {
            Value::OpenType(open) => self.is_constructed_value(open.ty, scope, &open.value),
            _ => Ok(false),
        }
    }

    /// Follow a value reference (defined value, named number, object field)
    /// to the value it denotes.
    pub(crate) fn resolve_value_ref(&self, scope: &Scope, value: &Value) -> Result<Value> {
        match value {
            Value::Ref(name) => match scope.resolve_value(self, name)? {
                ValueSymbol::Literal(literal) => self.resolve_value_ref(scope, &literal),
                ValueSymbol::Defined(def) => self.value_of(def),
            },
            Value::ObjectField { object, path } => {
                let ValueSymbol::Defined(def) = scope.resolve_value(self, object)? else {
                    return Err(SchemaError::validation(
                        ErrorCode::E2012,
                        format!("`{}` is not an object", self.name_str(object.name)),
                    ));
                };
                let resolved = self.value_of(def)?;
                match resolved.as_object().and_then(|o| o.setting_at(path.fields())) {
                    Some(Setting::Value(inner)) => self.resolve_value_ref(scope, inner),
                    Some(_) => Err(SchemaError::validation(
                        ErrorCode::E2012,
                        format!("`{}` is not a value field", self.render_path(path)),
                    )),
                    None => Err(SchemaError::unresolved_field(self.render_path(path))),
                }
            }
            Value::Instance(_) => Err(SchemaError::illegal_state(
                "parameterized value must be instantiated during validation",
            )),
            other => Ok(other.clone()),
        }
    }

    /// Error for a value of the wrong shape.
    #[cold]
    pub(crate) fn value_mismatch(&self, id: TypeId, value: &Value) -> SchemaError {
        SchemaError::validation(
            ErrorCode::E2009,
            format!(
                "value {} does not match {}",
                ValueDisplay::new(value, &self.interner),
                self.type_label(id)
            ),
        )
    }
}
