//! Information object classes and references into them.

use asn_diagnostic::ErrorCode;
use asn_ir::{FieldPath, Name, TypeId};
use rustc_hash::FxHashSet;

use super::{wrong_kind, ConstrainedType, TypeKind};
use crate::error::{Result, SchemaError};
use crate::family::Family;
use crate::refs::TypeRef;
use crate::schema::Schema;
use crate::scope::{Scope, ValueSymbol};
use crate::value::Setting;

/// Kind of a class field (X.681 clause 9).
#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    /// `&Type`
    Type,
    /// `&id OBJECT IDENTIFIER [UNIQUE]`
    FixedValue { ty: TypeRef, unique: bool },
    /// `&value &Type`: value whose type is the setting of another field.
    VariableValue { path: FieldPath },
    /// `&Values INTEGER`
    FixedValueSet { ty: TypeRef },
    /// `&Values &Type`
    VariableValueSet { path: FieldPath },
    /// `&obj OTHER-CLASS`
    Object { class: TypeRef },
    /// `&Objs OTHER-CLASS`
    ObjectSet { class: TypeRef },
}

impl FieldKind {
    /// Whether settings of this field are sets (value sets or object sets).
    pub fn is_set(&self) -> bool {
        matches!(
            self,
            FieldKind::FixedValueSet { .. }
                | FieldKind::VariableValueSet { .. }
                | FieldKind::ObjectSet { .. }
        )
    }
}

/// A field of a class.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassField {
    pub name: Name,
    pub kind: FieldKind,
    pub optional: bool,
    pub default: Option<Setting>,
    /// Fixed type, or class of an object / object-set field.
    pub resolved: Option<TypeId>,
    /// Validated default setting.
    pub default_setting: Option<Setting>,
}

impl ClassField {
    /// A field. `OPTIONAL` and `DEFAULT` exclude each other.
    pub fn new(
        name: Name,
        kind: FieldKind,
        optional: bool,
        default: Option<Setting>,
    ) -> Result<Self> {
        if optional && default.is_some() {
            return Err(SchemaError::validation(
                ErrorCode::E2003,
                "a class field cannot be both OPTIONAL and DEFAULT",
            ));
        }
        Ok(ClassField {
            name,
            kind,
            optional,
            default,
            resolved: None,
            default_setting: None,
        })
    }

    /// A mandatory field without default.
    pub fn required(name: Name, kind: FieldKind) -> Self {
        ClassField {
            name,
            kind,
            optional: false,
            default: None,
            resolved: None,
            default_setting: None,
        }
    }

    pub fn is_unique(&self) -> bool {
        matches!(self.kind, FieldKind::FixedValue { unique: true, .. })
    }
}

/// `CLASS { fields }`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ClassType {
    pub fields: Vec<ClassField>,
}

impl ClassType {
    pub fn new(fields: Vec<ClassField>) -> Self {
        ClassType { fields }
    }

    pub fn field(&self, name: Name) -> Option<&ClassField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// What a class field reference (`C.&field`) denotes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldTarget {
    /// Type field or variable-type value field: an open type.
    OpenType,
    /// Fixed-type value or value-set field: that type.
    Fixed(TypeId),
    /// Object field: the object's class.
    Object(TypeId),
    /// Object-set field: the objects' class.
    ObjectSet(TypeId),
}

impl Schema {
    pub(crate) fn validate_class(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        let TypeKind::Class(class) = self.types.kind(id)? else {
            return Err(wrong_kind(id, "class"));
        };
        let mut fields = class.fields.clone();
        let inner = scope.child_type(id);

        let mut names = FxHashSet::default();
        for field in &fields {
            if !names.insert(field.name) {
                return Err(SchemaError::validation(
                    ErrorCode::E2002,
                    format!("duplicate class field `{}`", self.name_str(field.name)),
                ));
            }
        }

        for index in 0..fields.len() {
            let kind = fields[index].kind.clone();
            let resolved = match &kind {
                FieldKind::Type => None,
                FieldKind::FixedValue { ty, .. } | FieldKind::FixedValueSet { ty } => {
                    Some(self.resolve_and_validate(ty, &inner)?)
                }
                FieldKind::Object { class } | FieldKind::ObjectSet { class } => {
                    let class_id = self.resolve_and_validate(class, &inner)?;
                    self.expect_class(class_id)?;
                    Some(class_id)
                }
                FieldKind::VariableValue { path } | FieldKind::VariableValueSet { path } => {
                    self.check_variable_path(&fields, path, &inner)?;
                    None
                }
            };
            fields[index].resolved = resolved;

            if let Some(default) = fields[index].default.clone() {
                let setting = self.validate_default_setting(&kind, resolved, &default, &inner)?;
                fields[index].default_setting = Some(setting);
            }
        }

        if let TypeKind::Class(class) = self.types.kind_mut(id)? {
            class.fields = fields;
        }
        Ok(())
    }

    fn validate_default_setting(
        &mut self,
        kind: &FieldKind,
        resolved: Option<TypeId>,
        default: &Setting,
        scope: &Scope,
    ) -> Result<Setting> {
        match (kind, default, resolved) {
            (FieldKind::Type, Setting::Type(ty), _) => {
                let ty = self.resolve_and_validate(ty, scope)?;
                Ok(Setting::Type(TypeRef::Shared(ty)))
            }
            (
                FieldKind::FixedValue { .. } | FieldKind::Object { .. },
                Setting::Value(value),
                Some(ty),
            ) => Ok(Setting::Value(self.validate_value(scope, ty, value)?)),
            (
                FieldKind::FixedValueSet { .. } | FieldKind::ObjectSet { .. },
                Setting::ElementSet(template),
                Some(governor),
            ) => {
                let set = self.value_set_over(governor, (**template).clone(), scope)?;
                Ok(Setting::ValueSet(TypeRef::Shared(set)))
            }
            (
                FieldKind::FixedValueSet { .. } | FieldKind::ObjectSet { .. },
                Setting::ValueSet(ty) | Setting::Type(ty),
                Some(_),
            ) => {
                let ty = self.resolve_and_validate(ty, scope)?;
                Ok(Setting::ValueSet(TypeRef::Shared(ty)))
            }
            // Governed by another field of the object; checked per object.
            (FieldKind::VariableValue { .. } | FieldKind::VariableValueSet { .. }, setting, _) => {
                Ok(setting.clone())
            }
            _ => Err(SchemaError::validation(
                ErrorCode::E2009,
                "class field default does not match the field kind",
            )),
        }
    }

    /// A variable-type field's path must end at a type field, passing only
    /// through object fields.
    fn check_variable_path(
        &mut self,
        own_fields: &[ClassField],
        path: &FieldPath,
        scope: &Scope,
    ) -> Result<()> {
        let invalid = |schema: &Schema| {
            let rendered: Vec<&str> = path.fields().iter().map(|n| schema.name_str(*n)).collect();
            SchemaError::validation(
                ErrorCode::E2012,
                format!("`{}` does not lead to a type field", rendered.join(".")),
            )
        };
        let Some((first, rest)) = path.fields().split_first() else {
            return Err(invalid(self));
        };
        let Some(field) = own_fields.iter().find(|f| f.name == *first) else {
            return Err(SchemaError::unresolved_field(self.name_str(*first)));
        };
        match (&field.kind, rest.is_empty()) {
            (FieldKind::Type, true) => Ok(()),
            (FieldKind::Object { class }, false) => {
                let class_id = self.resolve_and_validate(class, scope)?;
                let concrete = self.expect_class(class_id)?;
                let TypeKind::Class(class) = self.types.kind(concrete)? else {
                    return Err(wrong_kind(concrete, "class"));
                };
                let fields = class.fields.clone();
                self.check_variable_path(&fields, &FieldPath::new(rest.iter().copied()), scope)
            }
            _ => Err(invalid(self)),
        }
    }

    /// `id` must be of the CLASS family; returns its concrete class.
    pub(crate) fn expect_class(&self, id: TypeId) -> Result<TypeId> {
        let concrete = self.unwrap_concrete(id)?;
        match self.types.kind(concrete)? {
            TypeKind::Class(_) => Ok(concrete),
            _ => Err(SchemaError::validation(
                ErrorCode::E2001,
                format!("{} is not an information object class", self.type_label(id)),
            )),
        }
    }

    /// What `path` denotes inside class `class`.
    pub(crate) fn field_target(&self, class: TypeId, path: &[Name]) -> Result<FieldTarget> {
        let concrete = self.expect_class(class)?;
        let TypeKind::Class(class_type) = self.types.kind(concrete)? else {
            return Err(wrong_kind(concrete, "class"));
        };
        let Some((first, rest)) = path.split_first() else {
            return Err(SchemaError::validation(ErrorCode::E2012, "empty field path"));
        };
        let field = class_type
            .field(*first)
            .ok_or_else(|| SchemaError::unresolved_field(self.name_str(*first)))?;
        let resolved = || field.resolved.ok_or_else(|| super::not_validated(concrete));

        if rest.is_empty() {
            return Ok(match field.kind {
                FieldKind::Type
                | FieldKind::VariableValue { .. }
                | FieldKind::VariableValueSet { .. } => FieldTarget::OpenType,
                FieldKind::FixedValue { .. } | FieldKind::FixedValueSet { .. } => {
                    FieldTarget::Fixed(resolved()?)
                }
                FieldKind::Object { .. } => FieldTarget::Object(resolved()?),
                FieldKind::ObjectSet { .. } => FieldTarget::ObjectSet(resolved()?),
            });
        }
        match field.kind {
            FieldKind::Object { .. } | FieldKind::ObjectSet { .. } => {
                self.field_target(resolved()?, rest)
            }
            _ => Err(SchemaError::validation(
                ErrorCode::E2012,
                format!(
                    "field `{}` has no fields of its own",
                    self.name_str(field.name)
                ),
            )),
        }
    }

    pub(crate) fn validate_class_field(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        let TypeKind::ClassField(field) = self.types.kind(id)? else {
            return Err(wrong_kind(id, "class field"));
        };
        let class = field.class.clone();
        let path = field.path.clone();
        let class_id = self.resolve_and_validate(&class, scope)?;
        let target = self.field_target(class_id, path.fields())?;
        if let TypeKind::ClassField(field) = self.types.kind_mut(id)? {
            field.class_id = Some(class_id);
            field.target = Some(target);
        }
        Ok(())
    }

    pub(crate) fn validate_object_field(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        let TypeKind::ObjectField(field) = self.types.kind(id)? else {
            return Err(wrong_kind(id, "object field"));
        };
        let object = field.object;
        let path = field.path.clone();

        let ValueSymbol::Defined(def) = scope.resolve_value(self, &object)? else {
            return Err(SchemaError::validation(
                ErrorCode::E2012,
                format!("`{}` is not an object", self.name_str(object.name)),
            ));
        };
        self.validate_defined_value(def)?;
        let value = self.value_of(def)?;
        let setting = value
            .as_object()
            .and_then(|o| o.setting_at(path.fields()))
            .ok_or_else(|| SchemaError::unresolved_field(self.render_path(&path)))?;
        let resolved = match setting {
            Setting::Type(ty) | Setting::ValueSet(ty) => ty
                .handle()
                .ok_or_else(|| SchemaError::illegal_state("object setting left unresolved"))?,
            Setting::Value(_) | Setting::ElementSet(_) => {
                return Err(SchemaError::validation(
                    ErrorCode::E2012,
                    format!("`{}` is not a type or set field", self.render_path(&path)),
                ))
            }
        };
        if let TypeKind::ObjectField(field) = self.types.kind_mut(id)? {
            field.resolved = Some(resolved);
        }
        Ok(())
    }

    /// Create and validate a value set `governor (template)`.
    pub(crate) fn value_set_over(
        &mut self,
        governor: TypeId,
        template: crate::constraint::ConstraintTemplate,
        scope: &Scope,
    ) -> Result<TypeId> {
        let set = self.types.push(TypeKind::Constrained(ConstrainedType {
            sibling: TypeRef::Shared(governor),
            template,
            value_set: true,
            resolved: None,
            constraint: None,
        }))?;
        self.validate_type(set, scope)?;
        Ok(set)
    }

    /// Family check used by object set and table constraint builders.
    pub(crate) fn is_class(&self, id: TypeId) -> bool {
        self.family(id).is_ok_and(|f| f == Family::Class)
    }
}
