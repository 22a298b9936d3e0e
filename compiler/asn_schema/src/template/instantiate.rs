//! Template instantiation.
//!
//! Arguments are matched to parameters by position and classified by the
//! parameter they meet:
//!
//! | parameter            | accepted argument                       | binding    |
//! |----------------------|-----------------------------------------|------------|
//! | type                 | type, reference name                    | `Type`     |
//! | type with a governor | type, reference name, element set       | `ValueSet` |
//! | value                | value, reference name                   | `Value`    |
//!
//! A type argument that is itself a value set or object set binds as a value
//! set. Element sets written in place become value sets over the governor.
//! Value arguments are optimized against the governor before binding.
//!
//! Each instantiation copies the template body and validates the copy under a
//! scope carrying the new bindings; instances never share validation state.
//! A recursive template referring to itself with the same arguments reuses
//! the copy being validated. "Same" compares argument identity: the origin of
//! a bound type (copies of one inline argument share it), the written element
//! set, or the optimized value. The namespace label follows the same identity,
//! so anonymous argument types carry their origin: `W{INTEGER#12}`.

use std::rc::Rc;

use asn_diagnostic::ErrorCode;
use asn_ir::{ModuleId, Name, RefName, TypeId};

use super::{Binding, ParameterKind, Template, TemplateArg, TemplateBindings, TemplateParameter};
use crate::error::{Result, SchemaError};
use crate::refs::TypeRef;
use crate::schema::Schema;
use crate::scope::{Scope, ValueSymbol};
use crate::types::{wrong_kind, BuiltinType, TypeKind};
use crate::value::{Value, ValueDisplay, ValueInstance};

/// Identity of one bound argument, stable across copies of a template body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ArgumentKey {
    Type(TypeId),
    Elements(String),
    Value(String),
}

impl Schema {
    pub(crate) fn validate_instance(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        let TypeKind::Instance(instance) = self.types.kind(id)? else {
            return Err(wrong_kind(id, "template instance"));
        };
        let template = instance.template;
        let args = instance.args.clone();

        let copy = self.instantiate_type(scope, &template, &args)?;
        if let TypeKind::Instance(instance) = self.types.kind_mut(id)? {
            instance.resolved = Some(copy);
        }
        Ok(())
    }

    /// Instantiate the parameterized type `name` with `args`.
    ///
    /// Returns the validated copy.
    #[tracing::instrument(
        level = "debug",
        skip(self, scope, args),
        fields(template = self.name_str(name.name))
    )]
    pub fn instantiate_type(
        &mut self,
        scope: &Scope,
        name: &RefName,
        args: &[TemplateArg],
    ) -> Result<TypeId> {
        let target = scope.resolve_type(self, name)?;
        let TypeKind::Defined(defined) = self.types.kind(target)? else {
            return Err(self.not_parameterized(name.name));
        };
        let Some(template) = defined.template.clone() else {
            return Err(self.not_parameterized(name.name));
        };
        let module = defined.module;

        let (bindings, arguments) =
            self.bind_arguments(scope, module, name.name, &template, args)?;
        let key = (target, arguments);
        if let Some(&copy) = self.instantiating.get(&key) {
            tracing::debug!(namespace = %bindings.namespace, "recursive instance reuses copy");
            return Ok(copy);
        }

        let copy = self.copy_type(target)?;
        if let TypeKind::Defined(defined) = self.types.kind_mut(copy)? {
            defined.template = None;
            defined.namespace = Some(bindings.namespace.clone());
            defined.bindings = Some(Rc::clone(&bindings));
        }
        tracing::debug!(namespace = %bindings.namespace, copy = ?copy, "instantiating");

        self.instantiating.insert(key.clone(), copy);
        let result = self.validate_type(copy, scope);
        self.instantiating.remove(&key);
        result?;
        self.ensure_usable(copy)?;
        Ok(copy)
    }

    /// Evaluate a parameterized value reference `value{args}`.
    pub(crate) fn resolve_value_instance(
        &mut self,
        scope: &Scope,
        instance: &ValueInstance,
    ) -> Result<Value> {
        let ValueSymbol::Defined(def) = scope.resolve_value(self, &instance.template)? else {
            return Err(self.not_parameterized(instance.template.name));
        };
        let entry = self.value_def(def)?;
        let Some(template) = entry.template.clone() else {
            return Err(self.not_parameterized(instance.template.name));
        };
        let module = entry.module;
        let declared = entry.ty.clone();
        let raw = entry.value.clone();

        let (bindings, _) =
            self.bind_arguments(scope, module, instance.template.name, &template, &instance.args)?;
        tracing::debug!(namespace = %bindings.namespace, "instantiating value");
        let body = Scope::module(module).child_template(bindings);

        // Inline declared types are copied so each instance validates its own.
        let declared = match declared {
            TypeRef::Inline(ty) => TypeRef::Inline(self.copy_type(ty)?),
            other => other,
        };
        let ty = self.resolve_and_validate(&declared, &body)?;
        self.validate_value(&body, ty, &raw)
    }

    fn bind_arguments(
        &mut self,
        scope: &Scope,
        module: ModuleId,
        name: Name,
        template: &Template,
        args: &[TemplateArg],
    ) -> Result<(Rc<TemplateBindings>, Vec<ArgumentKey>)> {
        if template.len() != args.len() {
            return Err(SchemaError::validation(
                ErrorCode::E2007,
                format!(
                    "`{}` takes {} argument(s), {} given",
                    self.name_str(name),
                    template.len(),
                    args.len()
                ),
            ));
        }

        let mut bindings = TemplateBindings::new(String::new());
        let mut rendered = Vec::with_capacity(args.len());
        let mut keys = Vec::with_capacity(args.len());
        for (param, arg) in template.params().iter().zip(args) {
            // Governors resolve where the template is defined, seeing the
            // parameters bound so far.
            let definition = Scope::module(module).child_template(Rc::new(bindings.clone()));
            let binding = self.bind_argument(scope, &definition, param, arg)?;
            rendered.push(self.render_binding(&binding)?);
            keys.push(self.argument_key(arg, &binding)?);
            bindings.bind(param.name, binding);
        }
        bindings.namespace = format!("{}{{{}}}", self.name_str(name), rendered.join(", "));
        Ok((Rc::new(bindings), keys))
    }

    fn argument_key(&self, arg: &TemplateArg, binding: &Binding) -> Result<ArgumentKey> {
        Ok(match (arg, binding) {
            // Each binding of a written set is a fresh type; the text is stable.
            (TemplateArg::ElementSet(set), _) => ArgumentKey::Elements(format!("{set:?}")),
            (_, Binding::Type(id) | Binding::ValueSet(id)) => {
                ArgumentKey::Type(self.types.origin(*id)?)
            }
            (_, Binding::Value(value)) => ArgumentKey::Value(format!("{value:?}")),
        })
    }

    fn bind_argument(
        &mut self,
        scope: &Scope,
        definition: &Scope,
        param: &TemplateParameter,
        arg: &TemplateArg,
    ) -> Result<Binding> {
        match (param.kind, arg) {
            (ParameterKind::Type, TemplateArg::Type(ty)) => self.bind_type(scope, param, ty),
            (ParameterKind::Type, TemplateArg::Name(name)) => {
                self.bind_type(scope, param, &TypeRef::Named(*name))
            }
            (ParameterKind::Type, TemplateArg::ElementSet(set)) => {
                let governor = self.governor(definition, param)?;
                let set = self.value_set_over(governor, (**set).clone(), scope)?;
                Ok(Binding::ValueSet(set))
            }
            (ParameterKind::Value, TemplateArg::Value(value)) => {
                let governor = self.governor(definition, param)?;
                Ok(Binding::Value(self.validate_value(scope, governor, value)?))
            }
            (ParameterKind::Value, TemplateArg::Name(name)) => {
                let governor = self.governor(definition, param)?;
                let value = Value::Ref(*name);
                Ok(Binding::Value(self.validate_value(scope, governor, &value)?))
            }
            (ParameterKind::Type, TemplateArg::Value(_)) => {
                Err(self.kind_mismatch(param, "a type"))
            }
            (ParameterKind::Value, TemplateArg::Type(_) | TemplateArg::ElementSet(_)) => {
                Err(self.kind_mismatch(param, "a value"))
            }
        }
    }

    fn bind_type(
        &mut self,
        scope: &Scope,
        param: &TemplateParameter,
        ty: &TypeRef,
    ) -> Result<Binding> {
        let id = self.resolve_and_validate(ty, scope)?;
        if param.governor.is_some() || self.is_element_set(id) {
            Ok(Binding::ValueSet(id))
        } else {
            Ok(Binding::Type(id))
        }
    }

    fn governor(&mut self, definition: &Scope, param: &TemplateParameter) -> Result<TypeId> {
        let Some(governor) = &param.governor else {
            return Err(SchemaError::validation(
                ErrorCode::E2014,
                format!(
                    "parameter `{}` needs a governing type",
                    self.name_str(param.name)
                ),
            ));
        };
        self.resolve_and_validate(governor, definition)
    }

    fn render_binding(&self, binding: &Binding) -> Result<String> {
        Ok(match binding {
            Binding::Type(id) | Binding::ValueSet(id) => {
                let label = self.type_label(*id);
                if self.labels_uniquely(*id)? {
                    label
                } else {
                    format!("{label}#{}", self.types.origin(*id)?.index())
                }
            }
            Binding::Value(value) => ValueDisplay::new(value, &self.interner).to_string(),
        })
    }

    /// Whether `type_label` alone tells `id` apart from other types.
    fn labels_uniquely(&self, id: TypeId) -> Result<bool> {
        Ok(match self.types.kind(id)? {
            TypeKind::Defined(_) => true,
            TypeKind::Builtin(BuiltinType::Integer(list) | BuiltinType::BitString(list)) => {
                list.declared.is_empty()
            }
            TypeKind::Builtin(BuiltinType::Enumerated(_)) => false,
            TypeKind::Builtin(_) => true,
            _ => false,
        })
    }

    #[cold]
    fn kind_mismatch(&self, param: &TemplateParameter, expected: &str) -> SchemaError {
        SchemaError::validation(
            ErrorCode::E2008,
            format!(
                "parameter `{}` expects {expected}",
                self.name_str(param.name)
            ),
        )
    }

    #[cold]
    fn not_parameterized(&self, name: Name) -> SchemaError {
        SchemaError::validation(
            ErrorCode::E2007,
            format!("`{}` is not parameterized", self.name_str(name)),
        )
    }
}
