//! Information objects: values of class types.
//!
//! Objects are handled in two steps. [`Schema::prepare_object`] runs during
//! validation and turns settings that need new types (inline types, value
//! sets written in place) into validated handles. [`Schema::optimize_object`]
//! is the immutable accept/optimize step: every field present or defaulted,
//! no unknown fields, and each setting accepted by its governing type. A
//! variable-type field is governed by the type its field path reaches within
//! the same object.

use asn_diagnostic::ErrorCode;
use asn_ir::{FieldPath, TypeId};

use super::{not_validated, ClassField, ClassType, FieldKind, TypeKind};
use crate::error::{Result, SchemaError};
use crate::refs::TypeRef;
use crate::schema::Schema;
use crate::scope::Scope;
use crate::value::{FieldValue, ObjectValue, Setting, Value};

/// Variable-type fields are settled after the fields they depend on.
fn is_variable(field: &ClassField) -> bool {
    matches!(
        field.kind,
        FieldKind::VariableValue { .. } | FieldKind::VariableValueSet { .. }
    )
}

impl Schema {
    pub(crate) fn optimize_object(
        &self,
        id: TypeId,
        class: &ClassType,
        scope: &Scope,
        value: &Value,
    ) -> Result<Value> {
        let Value::Object(object) = value else {
            return Err(self.value_mismatch(id, value));
        };
        if let Some(unknown) = object.fields.iter().find(|f| class.field(f.name).is_none()) {
            return Err(SchemaError::validation(
                ErrorCode::E2006,
                format!(
                    "{} has no field `{}`",
                    self.type_label(id),
                    self.name_str(unknown.name)
                ),
            ));
        }

        let mut settled = ObjectValue::default();
        for pass_variable in [false, true] {
            for field in class.fields.iter().filter(|f| is_variable(f) == pass_variable) {
                let setting = match object.field(field.name).or(field.default_setting.as_ref()) {
                    Some(setting) => setting,
                    None if field.optional => continue,
                    None => {
                        return Err(SchemaError::validation(
                            ErrorCode::E2005,
                            format!(
                                "object of {} is missing field `{}`",
                                self.type_label(id),
                                self.name_str(field.name)
                            ),
                        ))
                    }
                };
                let optimized = self.optimize_setting(id, field, setting, &settled, scope)?;
                settled.fields.push(FieldValue::new(field.name, optimized));
            }
        }

        // Back to class field order.
        let mut ordered = Vec::with_capacity(settled.fields.len());
        for field in &class.fields {
            if let Some(position) = settled.fields.iter().position(|f| f.name == field.name) {
                ordered.push(settled.fields.swap_remove(position));
            }
        }
        Ok(Value::Object(ObjectValue::new(ordered)))
    }

    fn optimize_setting(
        &self,
        class: TypeId,
        field: &ClassField,
        setting: &Setting,
        settled: &ObjectValue,
        scope: &Scope,
    ) -> Result<Setting> {
        let fixed = || field.resolved.ok_or_else(|| not_validated(class));
        match (&field.kind, setting) {
            (FieldKind::Type, Setting::Type(ty)) => {
                let ty = ty.resolve(self, scope)?;
                self.ensure_usable(ty)?;
                Ok(Setting::Type(TypeRef::Shared(ty)))
            }
            (FieldKind::FixedValue { .. } | FieldKind::Object { .. }, Setting::Value(value)) => {
                Ok(Setting::Value(self.optimize(fixed()?, scope, value)?))
            }
            (FieldKind::VariableValue { path }, Setting::Value(value)) => {
                let governor = self.governing_type(settled, path)?;
                Ok(Setting::Value(self.optimize(governor, scope, value)?))
            }
            (
                FieldKind::FixedValueSet { .. } | FieldKind::ObjectSet { .. },
                Setting::ValueSet(ty) | Setting::Type(ty),
            ) => {
                let set = ty.resolve(self, scope)?;
                self.check_set_family(field, set, fixed()?)?;
                Ok(Setting::ValueSet(TypeRef::Shared(set)))
            }
            (FieldKind::VariableValueSet { path }, Setting::ValueSet(ty) | Setting::Type(ty)) => {
                let set = ty.resolve(self, scope)?;
                let governor = self.governing_type(settled, path)?;
                self.check_set_family(field, set, governor)?;
                Ok(Setting::ValueSet(TypeRef::Shared(set)))
            }
            (_, Setting::ElementSet(_)) => Err(SchemaError::illegal_state(format!(
                "value set for field `{}` must be prepared by validation",
                self.name_str(field.name)
            ))),
            _ => Err(SchemaError::validation(
                ErrorCode::E2009,
                format!(
                    "setting of field `{}` does not match its kind",
                    self.name_str(field.name)
                ),
            )),
        }
    }

    fn check_set_family(&self, field: &ClassField, set: TypeId, governor: TypeId) -> Result<()> {
        self.ensure_usable(set)?;
        let (found, expected) = (self.family(set)?, self.family(governor)?);
        if found == expected {
            Ok(())
        } else {
            Err(SchemaError::validation(
                ErrorCode::E2001,
                format!(
                    "field `{}` expects a set of {expected}, found {found}",
                    self.name_str(field.name)
                ),
            ))
        }
    }

    /// Type setting reached by `path` in a (partially) settled object.
    fn governing_type(&self, object: &ObjectValue, path: &FieldPath) -> Result<TypeId> {
        match object.setting_at(path.fields()) {
            Some(Setting::Type(ty)) => ty
                .handle()
                .ok_or_else(|| SchemaError::illegal_state("type setting left unresolved")),
            _ => Err(SchemaError::unresolved_field(self.render_path(path))),
        }
    }

    /// Validate the type-bearing settings of an object value.
    pub(crate) fn prepare_object(
        &mut self,
        class: TypeId,
        scope: &Scope,
        object: &ObjectValue,
    ) -> Result<ObjectValue> {
        let TypeKind::Class(class_type) = self.types.kind(class)? else {
            return Err(super::wrong_kind(class, "class"));
        };
        let class_type = class_type.clone();

        let mut prepared: Vec<Option<FieldValue>> = vec![None; object.fields.len()];
        for pass_variable in [false, true] {
            for (position, given) in object.fields.iter().enumerate() {
                let Some(field) = class_type.field(given.name) else {
                    prepared[position] = Some(given.clone());
                    continue;
                };
                if is_variable(field) != pass_variable {
                    continue;
                }
                let so_far = ObjectValue::new(prepared.iter().flatten().cloned().collect());
                let setting = self.prepare_setting(field, &given.setting, &so_far, scope)?;
                prepared[position] = Some(FieldValue::new(given.name, setting));
            }
        }
        Ok(ObjectValue::new(prepared.into_iter().flatten().collect()))
    }

    fn prepare_setting(
        &mut self,
        field: &ClassField,
        setting: &Setting,
        so_far: &ObjectValue,
        scope: &Scope,
    ) -> Result<Setting> {
        match (&field.kind, setting) {
            (_, Setting::Type(ty)) if !field.kind.is_set() => {
                let ty = self.resolve_and_validate(ty, scope)?;
                Ok(Setting::Type(TypeRef::Shared(ty)))
            }
            (_, Setting::Type(ty) | Setting::ValueSet(ty)) => {
                let ty = self.resolve_and_validate(ty, scope)?;
                Ok(Setting::ValueSet(TypeRef::Shared(ty)))
            }
            (
                FieldKind::FixedValueSet { .. } | FieldKind::ObjectSet { .. },
                Setting::ElementSet(template),
            ) => {
                let governor = field.resolved.ok_or_else(|| {
                    SchemaError::illegal_state("class field used before validation")
                })?;
                let set = self.value_set_over(governor, (**template).clone(), scope)?;
                Ok(Setting::ValueSet(TypeRef::Shared(set)))
            }
            (FieldKind::VariableValueSet { path }, Setting::ElementSet(template)) => {
                let governor = self.governing_type(so_far, path)?;
                let set = self.value_set_over(governor, (**template).clone(), scope)?;
                Ok(Setting::ValueSet(TypeRef::Shared(set)))
            }
            (FieldKind::FixedValue { .. } | FieldKind::Object { .. }, Setting::Value(value)) => {
                let value = self.prepare_value(scope, field.resolved, value)?;
                Ok(Setting::Value(value))
            }
            (FieldKind::VariableValue { path }, Setting::Value(value)) => {
                let governor = self.governing_type(so_far, path).ok();
                let value = self.prepare_value(scope, governor, value)?;
                Ok(Setting::Value(value))
            }
            _ => Ok(setting.clone()),
        }
    }
}
