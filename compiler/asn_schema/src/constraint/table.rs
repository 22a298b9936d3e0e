//! Table constraints: `CLASS.&field ({ObjectSet}{@relation, ...})`.
//!
//! A simple table constraint (no relations) admits the values the object set
//! defines for the field. With relations, the components named by the `@`
//! paths pick the objects whose designating field equals every referenced
//! component value. The constrained value must then be accepted by one of
//! those objects' setting of the field, and an open-type value comes back
//! paired with that object's type.
//!
//! `@a.b` starts at the outermost enclosing value that has a component `a`;
//! `@.a` starts at the innermost, `@..a` one level further out.

use asn_diagnostic::ErrorCode;
use asn_ir::{FieldPath, TypeId};

use super::{values_equal, RelationItem};
use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::scope::Scope;
use crate::value::{ObjectValue, Setting, Value, ValueDisplay};

/// A built table constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct TableConstraint {
    pub object_set: TypeId,
    /// Field of the class the constrained type is drawn from.
    pub field: FieldPath,
    pub relations: Vec<RelationItem>,
}

impl TableConstraint {
    /// Check `value` and return it, open-type values paired with their type.
    pub fn apply(&self, schema: &Schema, scope: &Scope, value: &Value) -> Result<Value> {
        let objects = schema.element_set_values(self.object_set)?;
        let extensible = schema.element_set_is_extensible(self.object_set)?;
        let mut candidates: Vec<&ObjectValue> =
            objects.iter().filter_map(Value::as_object).collect();

        if self.relations.is_empty() {
            for object in candidates {
                if let Some(accepted) = self.accept_by(schema, scope, object, value)? {
                    return Ok(accepted);
                }
            }
            return if extensible {
                Ok(value.clone())
            } else {
                Err(SchemaError::violation(
                    ErrorCode::E3002,
                    format!(
                        "value {} is not defined by any object of {}",
                        ValueDisplay::new(value, &schema.interner),
                        schema.type_label(self.object_set)
                    ),
                ))
            };
        }

        for relation in &self.relations {
            let Some((designator, path)) = schema.relation_designator(scope, relation)? else {
                // Referenced component absent: nothing selects an object.
                return Ok(value.clone());
            };
            candidates.retain(|object| {
                matches!(
                    object.setting_at(path.fields()),
                    Some(Setting::Value(defined)) if values_equal(defined, &designator)
                )
            });
            if candidates.is_empty() {
                if extensible {
                    tracing::debug!(
                        set = %schema.type_label(self.object_set),
                        "no object matches; object set is extensible"
                    );
                    return Ok(value.clone());
                }
                return Err(SchemaError::violation(
                    ErrorCode::E3002,
                    format!(
                        "no object of {} has `{}` equal to {}",
                        schema.type_label(self.object_set),
                        schema.render_path(&path),
                        ValueDisplay::new(&designator, &schema.interner)
                    ),
                ));
            }
        }

        // Designators need not be UNIQUE; any selected object may accept.
        for object in &candidates {
            if let Some(accepted) = self.accept_by(schema, scope, object, value)? {
                return Ok(accepted);
            }
        }
        Err(SchemaError::violation(
            ErrorCode::E3004,
            format!(
                "value {} does not match `{}` of the {} selected object(s)",
                ValueDisplay::new(value, &schema.interner),
                schema.render_path(&self.field),
                candidates.len()
            ),
        ))
    }

    /// `value` as accepted by `object`'s setting of the constrained field.
    fn accept_by(
        &self,
        schema: &Schema,
        scope: &Scope,
        object: &ObjectValue,
        value: &Value,
    ) -> Result<Option<Value>> {
        let outcome = match object.setting_at(self.field.fields()) {
            Some(Setting::Type(ty)) => {
                let ty = ty.handle().ok_or_else(|| {
                    SchemaError::illegal_state("object type setting left unresolved")
                })?;
                let raw = match value {
                    Value::OpenType(open) => &open.value,
                    other => other,
                };
                schema
                    .optimize(ty, scope, raw)
                    .map(|optimized| Value::open_type(ty, optimized))
            }
            Some(Setting::Value(defined)) => {
                return Ok(values_equal(defined, value).then(|| value.clone()));
            }
            Some(Setting::ValueSet(ty)) => {
                let ty = ty.handle().ok_or_else(|| {
                    SchemaError::illegal_state("object set setting left unresolved")
                })?;
                schema.accept(ty, scope, value).map(|()| value.clone())
            }
            Some(Setting::ElementSet(_)) => {
                return Err(SchemaError::illegal_state("object setting not prepared"));
            }
            None => return Ok(None),
        };
        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_internal() => Err(err),
            Err(_) => Ok(None),
        }
    }
}

impl Schema {
    /// The optimized value a relation refers to, with the class field path
    /// of the referenced component. `None` when the component is absent or
    /// there is no enclosing value to search.
    pub(crate) fn relation_designator(
        &self,
        scope: &Scope,
        relation: &RelationItem,
    ) -> Result<Option<(Value, FieldPath)>> {
        let Some((first, _)) = relation.path.split_first() else {
            return Err(SchemaError::validation(ErrorCode::E2012, "empty relation path"));
        };
        let levels = scope.value_levels();
        let level = match relation.level {
            None => levels
                .iter()
                .rev()
                .find(|(ty, _)| self.named_type(*ty, *first).ok().flatten().is_some()),
            Some(depth) => usize::try_from(depth)
                .ok()
                .and_then(|depth| depth.checked_sub(1))
                .and_then(|index| levels.get(index)),
        };
        let Some((level_type, level_value)) = level else {
            return Ok(None);
        };

        let mut ty = *level_type;
        let mut current: &Value = level_value;
        for name in &relation.path {
            ty = self
                .named_type(ty, *name)?
                .ok_or_else(|| SchemaError::unresolved_component(self.name_str(*name)))?;
            match current.component(*name) {
                Some(inner) => current = inner,
                None => return Ok(None),
            }
        }

        let path = self.class_field_path(ty)?.ok_or_else(|| {
            SchemaError::validation(
                ErrorCode::E2012,
                format!(
                    "relation `@{}` does not refer to a class field component",
                    relation
                        .path
                        .iter()
                        .map(|n| self.name_str(*n))
                        .collect::<Vec<_>>()
                        .join(".")
                ),
            )
        })?;
        let designator = self.optimize(ty, scope, current)?;
        Ok(Some((designator, path)))
    }
}
