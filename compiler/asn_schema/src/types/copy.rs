//! Deep copies of unvalidated type trees, for template instantiation.
//!
//! A copy owns fresh copies of every inline sub-type and shares everything
//! referenced by handle or by name. Validation caches are reset so the copy
//! can be validated independently of the original.

use asn_ir::TypeId;

use super::{BuiltinType, ClassField, CollectionEntry, FieldKind, TypeKind};
use crate::constraint::{Bound, ComponentConstraintTemplate, ConstraintTemplate, RangeEndpoint};
use crate::error::Result;
use crate::refs::TypeRef;
use crate::schema::Schema;
use crate::template::TemplateArg;
use crate::value::{FieldValue, ObjectValue, Setting, Value, ValueInstance};

impl Schema {
    /// Copy type `id` and every type it owns.
    pub fn copy_type(&mut self, id: TypeId) -> Result<TypeId> {
        let kind = self.types.kind(id)?.clone();
        let copied = match kind {
            TypeKind::Builtin(mut builtin) => {
                match &mut builtin {
                    BuiltinType::Integer(list) | BuiltinType::BitString(list) => {
                        list.resolved.clear();
                        for named in &mut list.declared {
                            named.value = self.copy_value(&named.value)?;
                        }
                    }
                    BuiltinType::Enumerated(enumerated) => enumerated.items.clear(),
                    _ => {}
                }
                TypeKind::Builtin(builtin)
            }
            TypeKind::Defined(mut defined) => {
                defined.sibling = self.copy_ref(&defined.sibling)?;
                defined.resolved = None;
                TypeKind::Defined(defined)
            }
            TypeKind::Tagged(mut tagged) => {
                tagged.sibling = self.copy_ref(&tagged.sibling)?;
                tagged.resolved = None;
                tagged.effective = None;
                TypeKind::Tagged(tagged)
            }
            TypeKind::Constrained(mut constrained) => {
                constrained.sibling = self.copy_ref(&constrained.sibling)?;
                constrained.template = self.copy_template(&constrained.template)?;
                constrained.resolved = None;
                constrained.constraint = None;
                TypeKind::Constrained(constrained)
            }
            TypeKind::Selection(mut selection) => {
                selection.sibling = self.copy_ref(&selection.sibling)?;
                selection.resolved = None;
                TypeKind::Selection(selection)
            }
            TypeKind::Instance(mut instance) => {
                instance.args = self.copy_args(&instance.args)?;
                instance.resolved = None;
                TypeKind::Instance(instance)
            }
            TypeKind::Collection(mut collection) => {
                for entry in &mut collection.entries {
                    match entry {
                        CollectionEntry::Component(component) => {
                            component.ty = self.copy_ref(&component.ty)?;
                            if let Some(default) = &component.default {
                                component.default = Some(self.copy_value(default)?);
                            }
                        }
                        CollectionEntry::ComponentsOf { ty, .. } => *ty = self.copy_ref(ty)?,
                    }
                }
                collection.components.clear();
                collection.automatic = false;
                TypeKind::Collection(collection)
            }
            TypeKind::CollectionOf(mut of) => {
                of.element = self.copy_ref(&of.element)?;
                of.resolved = None;
                TypeKind::CollectionOf(of)
            }
            TypeKind::Class(mut class) => {
                for field in &mut class.fields {
                    self.copy_field(field)?;
                }
                TypeKind::Class(class)
            }
            TypeKind::ClassField(mut field) => {
                field.class = self.copy_ref(&field.class)?;
                field.class_id = None;
                field.target = None;
                TypeKind::ClassField(field)
            }
            TypeKind::ObjectField(mut field) => {
                field.resolved = None;
                TypeKind::ObjectField(field)
            }
        };
        self.types.push_copy(copied, id)
    }

    /// Copy an owned reference; names and shared handles are kept.
    pub(crate) fn copy_ref(&mut self, ty: &TypeRef) -> Result<TypeRef> {
        Ok(match ty {
            TypeRef::Inline(id) => TypeRef::Inline(self.copy_type(*id)?),
            other => other.clone(),
        })
    }

    fn copy_field(&mut self, field: &mut ClassField) -> Result<()> {
        match &mut field.kind {
            FieldKind::FixedValue { ty, .. } | FieldKind::FixedValueSet { ty } => {
                *ty = self.copy_ref(ty)?;
            }
            FieldKind::Object { class } | FieldKind::ObjectSet { class } => {
                *class = self.copy_ref(class)?;
            }
            FieldKind::Type
            | FieldKind::VariableValue { .. }
            | FieldKind::VariableValueSet { .. } => {}
        }
        if let Some(default) = &field.default {
            field.default = Some(self.copy_setting(default)?);
        }
        field.resolved = None;
        field.default_setting = None;
        Ok(())
    }

    fn copy_setting(&mut self, setting: &Setting) -> Result<Setting> {
        Ok(match setting {
            Setting::Type(ty) => Setting::Type(self.copy_ref(ty)?),
            Setting::Value(value) => Setting::Value(self.copy_value(value)?),
            Setting::ValueSet(ty) => Setting::ValueSet(self.copy_ref(ty)?),
            Setting::ElementSet(template) => {
                Setting::ElementSet(Box::new(self.copy_template(template)?))
            }
        })
    }

    /// Copy the inline types embedded in a raw value.
    pub(crate) fn copy_value(&mut self, value: &Value) -> Result<Value> {
        Ok(match value {
            Value::Named(named) => Value::named(named.name, self.copy_value(&named.value)?),
            Value::Collection(items) => Value::Collection(
                items
                    .iter()
                    .map(|item| self.copy_value(item))
                    .collect::<Result<_>>()?,
            ),
            Value::Object(object) => {
                let mut fields = Vec::with_capacity(object.fields.len());
                for field in &object.fields {
                    fields.push(FieldValue::new(field.name, self.copy_setting(&field.setting)?));
                }
                Value::Object(ObjectValue::new(fields))
            }
            Value::Instance(instance) => Value::Instance(Box::new(ValueInstance {
                template: instance.template,
                args: self.copy_args(&instance.args)?,
            })),
            other => other.clone(),
        })
    }

    fn copy_args(&mut self, args: &[TemplateArg]) -> Result<Vec<TemplateArg>> {
        args.iter()
            .map(|arg| {
                Ok(match arg {
                    TemplateArg::Type(ty) => TemplateArg::Type(self.copy_ref(ty)?),
                    TemplateArg::Value(value) => TemplateArg::Value(self.copy_value(value)?),
                    TemplateArg::Name(name) => TemplateArg::Name(*name),
                    TemplateArg::ElementSet(template) => {
                        TemplateArg::ElementSet(Box::new(self.copy_template(template)?))
                    }
                })
            })
            .collect()
    }

    /// Copy a constraint template and the inline types it mentions.
    pub(crate) fn copy_template(
        &mut self,
        template: &ConstraintTemplate,
    ) -> Result<ConstraintTemplate> {
        let boxed = |schema: &mut Schema, inner: &ConstraintTemplate| {
            schema.copy_template(inner).map(Box::new)
        };
        Ok(match template {
            ConstraintTemplate::ElementSetSpecs {
                root,
                extensible,
                additional,
            } => ConstraintTemplate::ElementSetSpecs {
                root: root.as_deref().map(|r| boxed(self, r)).transpose()?,
                extensible: *extensible,
                additional: additional.as_deref().map(|a| boxed(self, a)).transpose()?,
            },
            ConstraintTemplate::Union(items) => {
                ConstraintTemplate::Union(self.copy_templates(items)?)
            }
            ConstraintTemplate::Intersection(items) => {
                ConstraintTemplate::Intersection(self.copy_templates(items)?)
            }
            ConstraintTemplate::Except { base, exception } => ConstraintTemplate::Except {
                base: boxed(self, base)?,
                exception: boxed(self, exception)?,
            },
            ConstraintTemplate::All { exception } => ConstraintTemplate::All {
                exception: exception.as_deref().map(|e| boxed(self, e)).transpose()?,
            },
            ConstraintTemplate::Value(value) => ConstraintTemplate::Value(self.copy_value(value)?),
            ConstraintTemplate::ValueRange { min, max } => ConstraintTemplate::ValueRange {
                min: self.copy_endpoint(min)?,
                max: self.copy_endpoint(max)?,
            },
            ConstraintTemplate::Size(inner) => ConstraintTemplate::Size(boxed(self, inner)?),
            ConstraintTemplate::PermittedAlphabet(inner) => {
                ConstraintTemplate::PermittedAlphabet(boxed(self, inner)?)
            }
            ConstraintTemplate::Type(ty) => ConstraintTemplate::Type(self.copy_ref(ty)?),
            ConstraintTemplate::InnerType(inner) => {
                ConstraintTemplate::InnerType(boxed(self, inner)?)
            }
            ConstraintTemplate::InnerTypes {
                partial,
                components,
            } => {
                let mut copied = Vec::with_capacity(components.len());
                for component in components {
                    copied.push(ComponentConstraintTemplate {
                        name: component.name,
                        presence: component.presence,
                        constraint: component
                            .constraint
                            .as_deref()
                            .map(|c| boxed(self, c))
                            .transpose()?,
                    });
                }
                ConstraintTemplate::InnerTypes {
                    partial: *partial,
                    components: copied,
                }
            }
            ConstraintTemplate::Table {
                object_set,
                relations,
            } => ConstraintTemplate::Table {
                object_set: self.copy_ref(object_set)?,
                relations: relations.clone(),
            },
            ConstraintTemplate::Pattern(_) | ConstraintTemplate::Settings(_) => template.clone(),
        })
    }

    fn copy_templates(&mut self, items: &[ConstraintTemplate]) -> Result<Vec<ConstraintTemplate>> {
        items.iter().map(|item| self.copy_template(item)).collect()
    }

    fn copy_endpoint(&mut self, endpoint: &RangeEndpoint) -> Result<RangeEndpoint> {
        Ok(match &endpoint.bound {
            Bound::Value(value) => RangeEndpoint {
                bound: Bound::Value(self.copy_value(value)?),
                exclusive: endpoint.exclusive,
            },
            _ => endpoint.clone(),
        })
    }
}
