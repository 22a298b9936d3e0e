//! Building constraint templates against resolved types.

use asn_diagnostic::ErrorCode;
use asn_ir::{FieldPath, TypeId};

use super::{
    Bound, ComponentConstraint, Constraint, ConstraintTemplate, InnerTypes, Pattern, RangeEndpoint,
    RangeLimit, RelationItem, TableConstraint, TimeSettings, ValueRange,
};
use crate::error::{Result, SchemaError};
use crate::family::{Family, FamilySet};
use crate::refs::TypeRef;
use crate::schema::Schema;
use crate::scope::Scope;
use crate::stack::ensure_sufficient_stack;
use crate::types::TypeKind;
use crate::value::Value;

/// What the values of a constraint being built are.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BuildTarget {
    /// Values of this type.
    Type(TypeId),
    /// Lengths, inside `SIZE`.
    Size,
    /// Characters, inside `FROM`.
    Alphabet,
}

impl Schema {
    /// Build `template` for values described by `target`.
    pub(crate) fn build_constraint(
        &mut self,
        scope: &Scope,
        template: &ConstraintTemplate,
        target: BuildTarget,
    ) -> Result<Constraint> {
        ensure_sufficient_stack(|| self.build(scope, template, target))
    }

    fn build(
        &mut self,
        scope: &Scope,
        template: &ConstraintTemplate,
        target: BuildTarget,
    ) -> Result<Constraint> {
        Ok(match template {
            ConstraintTemplate::ElementSetSpecs {
                root,
                extensible,
                additional,
            } => Constraint::ElementSet {
                root: self.build_boxed(scope, root.as_deref(), target)?,
                extensible: *extensible,
                additional: self.build_boxed(scope, additional.as_deref(), target)?,
            },
            ConstraintTemplate::Union(members) => {
                Constraint::Union(self.build_all(scope, members, target)?)
            }
            ConstraintTemplate::Intersection(members) => {
                Constraint::Intersection(self.build_all(scope, members, target)?)
            }
            ConstraintTemplate::Except { base, exception } => Constraint::Except {
                base: Box::new(self.build_constraint(scope, base, target)?),
                exception: Box::new(self.build_constraint(scope, exception, target)?),
            },
            ConstraintTemplate::All { exception } => Constraint::All {
                exception: self.build_boxed(scope, exception.as_deref(), target)?,
            },
            ConstraintTemplate::Value(value) => {
                Constraint::Value(self.build_value(scope, value, target)?)
            }
            ConstraintTemplate::ValueRange { min, max } => {
                if let BuildTarget::Type(ty) = target {
                    self.require_family(ty, FamilySet::ORDERED, "a value range")?;
                }
                Constraint::Range(ValueRange {
                    min: self.build_limit(scope, min, target)?,
                    max: self.build_limit(scope, max, target)?,
                })
            }
            ConstraintTemplate::Size(inner) => {
                let BuildTarget::Type(ty) = target else {
                    return Err(not_applicable("SIZE", "a nested SIZE or FROM"));
                };
                self.require_family(ty, FamilySet::SIZED, "SIZE")?;
                Constraint::Size(Box::new(self.build_constraint(scope, inner, BuildTarget::Size)?))
            }
            ConstraintTemplate::PermittedAlphabet(inner) => {
                let BuildTarget::Type(ty) = target else {
                    return Err(not_applicable("FROM", "a nested SIZE or FROM"));
                };
                self.require_family(ty, FamilySet::RESTRICTED_STRING, "FROM")?;
                Constraint::Alphabet(Box::new(self.build_constraint(
                    scope,
                    inner,
                    BuildTarget::Alphabet,
                )?))
            }
            ConstraintTemplate::Pattern(value) => {
                if let BuildTarget::Type(ty) = target {
                    self.require_family(ty, FamilySet::RESTRICTED_STRING, "PATTERN")?;
                }
                let source = self.build_string(scope, value, "PATTERN")?;
                let pattern = Pattern::new(&source).map_err(|err| {
                    SchemaError::validation(
                        ErrorCode::E2009,
                        format!("invalid pattern \"{source}\": {err}"),
                    )
                })?;
                Constraint::Pattern(pattern)
            }
            ConstraintTemplate::Type(ty) => Constraint::Type(self.build_type(scope, ty, target)?),
            ConstraintTemplate::InnerType(inner) => {
                let BuildTarget::Type(ty) = target else {
                    return Err(not_applicable("WITH COMPONENT", "SIZE or FROM"));
                };
                self.require_family(ty, FamilySet::ELEMENTS, "WITH COMPONENT")?;
                let concrete = self.unwrap_concrete(ty)?;
                let TypeKind::CollectionOf(of) = self.types.kind(concrete)? else {
                    return Err(not_applicable("WITH COMPONENT", &self.type_label(ty)));
                };
                let element = of.resolved.ok_or_else(|| {
                    SchemaError::illegal_state("element type used before validation")
                })?;
                Constraint::InnerType(Box::new(self.build_constraint(
                    scope,
                    inner,
                    BuildTarget::Type(element),
                )?))
            }
            ConstraintTemplate::InnerTypes {
                partial,
                components,
            } => {
                let BuildTarget::Type(ty) = target else {
                    return Err(not_applicable("WITH COMPONENTS", "SIZE or FROM"));
                };
                self.require_family(ty, FamilySet::COMPONENTS, "WITH COMPONENTS")?;
                let mut built = Vec::with_capacity(components.len());
                for component in components {
                    let component_type = self
                        .named_type(ty, component.name)?
                        .ok_or_else(|| {
                            SchemaError::unresolved_component(self.name_str(component.name))
                        })?;
                    let constraint = match component.constraint.as_deref() {
                        Some(inner) => Some(self.build_constraint(
                            scope,
                            inner,
                            BuildTarget::Type(component_type),
                        )?),
                        None => None,
                    };
                    built.push(ComponentConstraint {
                        name: component.name,
                        presence: component.presence,
                        constraint,
                    });
                }
                Constraint::InnerTypes(InnerTypes {
                    partial: *partial,
                    components: built,
                })
            }
            ConstraintTemplate::Table {
                object_set,
                relations,
            } => Constraint::Table(self.build_table(scope, object_set, relations, target)?),
            ConstraintTemplate::Settings(value) => {
                if let BuildTarget::Type(ty) = target {
                    self.require_family(ty, FamilySet::TIME_FAMILIES, "SETTINGS")?;
                } else {
                    return Err(not_applicable("SETTINGS", "SIZE or FROM"));
                }
                let text = self.build_string(scope, value, "SETTINGS")?;
                Constraint::Settings(TimeSettings::parse(&text)?)
            }
        })
    }

    fn build_boxed(
        &mut self,
        scope: &Scope,
        template: Option<&ConstraintTemplate>,
        target: BuildTarget,
    ) -> Result<Option<Box<Constraint>>> {
        template
            .map(|t| self.build_constraint(scope, t, target).map(Box::new))
            .transpose()
    }

    fn build_all(
        &mut self,
        scope: &Scope,
        templates: &[ConstraintTemplate],
        target: BuildTarget,
    ) -> Result<Vec<Constraint>> {
        templates
            .iter()
            .map(|t| self.build_constraint(scope, t, target))
            .collect()
    }

    /// A single value, optimized for the target.
    fn build_value(&mut self, scope: &Scope, value: &Value, target: BuildTarget) -> Result<Value> {
        match target {
            BuildTarget::Type(ty) => self.validate_value(scope, ty, value),
            BuildTarget::Size => {
                let size = self.resolve_integer(scope, value)?;
                if size < 0 {
                    return Err(SchemaError::validation(
                        ErrorCode::E2009,
                        format!("size {size} is negative"),
                    ));
                }
                Ok(Value::Integer(size))
            }
            BuildTarget::Alphabet => Ok(Value::String(self.build_string(scope, value, "FROM")?)),
        }
    }

    fn build_limit(
        &mut self,
        scope: &Scope,
        endpoint: &RangeEndpoint,
        target: BuildTarget,
    ) -> Result<Option<RangeLimit>> {
        match &endpoint.bound {
            Bound::Min | Bound::Max => Ok(None),
            Bound::Value(value) => Ok(Some(RangeLimit {
                value: self.build_value(scope, value, target)?,
                exclusive: endpoint.exclusive,
            })),
        }
    }

    fn build_string(&mut self, scope: &Scope, value: &Value, what: &str) -> Result<String> {
        let prepared = self.prepare_value(scope, None, value)?;
        match self.resolve_value_ref(scope, &prepared)? {
            Value::String(text) => Ok(text),
            _ => Err(SchemaError::validation(
                ErrorCode::E2009,
                format!("{what} requires a character string"),
            )),
        }
    }

    /// A contained subtype or included set must be of the target's family.
    fn build_type(&mut self, scope: &Scope, ty: &TypeRef, target: BuildTarget) -> Result<TypeId> {
        let included = self.resolve_and_validate(ty, scope)?;
        let found = self.family(included)?;
        let compatible = match target {
            BuildTarget::Type(target) => {
                let expected = self.family(target)?;
                found == expected || expected == Family::OpenType
            }
            BuildTarget::Size => found == Family::Integer,
            BuildTarget::Alphabet => found == Family::RestrictedString,
        };
        if compatible {
            Ok(included)
        } else {
            Err(SchemaError::validation(
                ErrorCode::E2001,
                format!(
                    "{} cannot constrain values of another family",
                    self.type_label(included)
                ),
            ))
        }
    }

    fn build_table(
        &mut self,
        scope: &Scope,
        object_set: &TypeRef,
        relations: &[RelationItem],
        target: BuildTarget,
    ) -> Result<TableConstraint> {
        let BuildTarget::Type(ty) = target else {
            return Err(not_applicable("a table constraint", "SIZE or FROM"));
        };
        let field = self.class_field_path(ty)?.ok_or_else(|| {
            not_applicable("a table constraint", &self.type_label(ty))
        })?;
        let set = self.resolve_and_validate(object_set, scope)?;
        if !self.is_class(set) {
            return Err(SchemaError::validation(
                ErrorCode::E2001,
                format!("{} is not an object set", self.type_label(set)),
            ));
        }
        if relations.iter().any(|r| r.path.is_empty() || r.level == Some(0)) {
            return Err(SchemaError::validation(ErrorCode::E2012, "malformed relation item"));
        }
        Ok(TableConstraint {
            object_set: set,
            field,
            relations: relations.to_vec(),
        })
    }

    /// Field path of the class field type `id` decorates, if any.
    pub(crate) fn class_field_path(&self, id: TypeId) -> Result<Option<FieldPath>> {
        let mut current = id;
        for _ in 0..=self.types.len() {
            if let TypeKind::ClassField(field) = self.types.kind(current)? {
                return Ok(Some(field.path.clone()));
            }
            match self.sibling(current)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(None)
    }

    fn require_family(&self, ty: TypeId, families: FamilySet, what: &str) -> Result<()> {
        let family = self.family(ty)?;
        if family.is_in(families) {
            Ok(())
        } else {
            Err(not_applicable(what, family.name()))
        }
    }
}

#[cold]
fn not_applicable(what: &str, to: &str) -> SchemaError {
    SchemaError::validation(
        ErrorCode::E2004,
        format!("{what} cannot be applied to {to}"),
    )
}
