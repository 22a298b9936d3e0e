//! Preparing raw values during validation.
//!
//! Optimization is immutable, so everything a raw value needs that mutates
//! the schema happens here first: referenced value definitions are
//! validated, parameterized values are instantiated and object settings get
//! their types.

use asn_diagnostic::ErrorCode;
use asn_ir::TypeId;

use super::{Value, ValueDisplay};
use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::scope::{Scope, ValueSymbol};
use crate::stack::ensure_sufficient_stack;
use crate::types::TypeKind;

impl Schema {
    /// Prepare `value`, expected to be of type `ty` when known.
    pub(crate) fn prepare_value(
        &mut self,
        scope: &Scope,
        ty: Option<TypeId>,
        value: &Value,
    ) -> Result<Value> {
        ensure_sufficient_stack(|| self.prepare(scope, ty, value))
    }

    fn prepare(&mut self, scope: &Scope, ty: Option<TypeId>, value: &Value) -> Result<Value> {
        let inner = match ty {
            Some(ty) => scope.child_type(ty),
            None => scope.clone(),
        };
        match value {
            Value::Ref(name) => {
                // Names that do not resolve yet may still be named numbers of
                // the type; optimize reports them.
                if let Ok(ValueSymbol::Defined(def)) = inner.resolve_value(self, name) {
                    self.validate_defined_value(def)?;
                }
                Ok(value.clone())
            }
            Value::ObjectField { object, .. } => {
                if let Ok(ValueSymbol::Defined(def)) = inner.resolve_value(self, object) {
                    self.validate_defined_value(def)?;
                }
                Ok(value.clone())
            }
            Value::Instance(instance) => self.resolve_value_instance(scope, instance),
            Value::Named(named) => {
                let component = ty.and_then(|ty| self.named_type(ty, named.name).ok().flatten());
                let prepared = self.prepare_value(scope, component.or(ty), &named.value)?;
                Ok(Value::named(named.name, prepared))
            }
            Value::Collection(items) => {
                let element = ty.and_then(|ty| self.element_type(ty));
                let mut prepared = Vec::with_capacity(items.len());
                for item in items {
                    let expected = if matches!(item, Value::Named(_)) { ty } else { element };
                    prepared.push(self.prepare_value(scope, expected, item)?);
                }
                Ok(Value::Collection(prepared))
            }
            Value::Object(object) => match ty.and_then(|ty| self.concrete_class(ty)) {
                Some(class) => Ok(Value::Object(self.prepare_object(class, scope, object)?)),
                None => Ok(value.clone()),
            },
            Value::OpenType(open) => {
                let prepared = self.prepare_value(scope, Some(open.ty), &open.value)?;
                Ok(Value::open_type(open.ty, prepared))
            }
            _ => Ok(value.clone()),
        }
    }

    /// Prepare and optimize `value` against `ty`.
    pub(crate) fn validate_value(
        &mut self,
        scope: &Scope,
        ty: TypeId,
        value: &Value,
    ) -> Result<Value> {
        let prepared = self.prepare_value(scope, Some(ty), value)?;
        self.optimize(ty, scope, &prepared)
    }

    /// An INTEGER-valued constant: a literal or a reference to one.
    pub(crate) fn resolve_integer(&mut self, scope: &Scope, value: &Value) -> Result<i64> {
        let prepared = self.prepare_value(scope, None, value)?;
        match self.resolve_value_ref(scope, &prepared)? {
            Value::Integer(n) => Ok(n),
            other => Err(SchemaError::validation(
                ErrorCode::E2009,
                format!(
                    "expected an integer, found {}",
                    ValueDisplay::new(&other, &self.interner)
                ),
            )),
        }
    }

    fn element_type(&self, ty: TypeId) -> Option<TypeId> {
        let concrete = self.unwrap_concrete(ty).ok()?;
        match self.types.kind(concrete).ok()? {
            TypeKind::CollectionOf(of) => of.resolved,
            _ => None,
        }
    }

    fn concrete_class(&self, ty: TypeId) -> Option<TypeId> {
        let concrete = self.unwrap_concrete(ty).ok()?;
        matches!(self.types.kind(concrete).ok()?, TypeKind::Class(_)).then_some(concrete)
    }
}
