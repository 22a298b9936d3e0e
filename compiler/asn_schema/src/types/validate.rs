//! Type validation.
//!
//! Each type is validated at most once. The state machine lives in
//! [`Schema::validate_type`]; the per-kind steps resolve siblings through the
//! scope chain and fill the caches the immutable queries read.

use std::rc::Rc;

use asn_diagnostic::ErrorCode;
use asn_ir::TypeId;

use super::{wrong_kind, CollectionKind, KindTag, TypeKind, ValidationState};
use crate::constraint::BuildTarget;
use crate::encoding::{TagEncoding, TagMethod};
use crate::error::{Result, SchemaError};
use crate::refs::TypeRef;
use crate::schema::Schema;
use crate::scope::Scope;
use crate::stack::ensure_sufficient_stack;

impl Schema {
    /// Validate type `id` in `scope`.
    ///
    /// A no-op unless the type is unvalidated; re-entering a type that is
    /// being validated returns immediately so recursive schemas terminate.
    /// On failure the type is left `Invalid` and the error is returned once.
    pub fn validate_type(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        match self.types.state(id)? {
            ValidationState::Unvalidated => {}
            ValidationState::Validating
            | ValidationState::Valid
            | ValidationState::Invalid(_) => return Ok(()),
            ValidationState::Disposed => {
                return Err(SchemaError::illegal_state(format!(
                    "{id:?} validated after disposal"
                )))
            }
        }

        tracing::trace!(ty = ?id, depth = scope.depth(), "validating type");
        self.types.set_state(id, ValidationState::Validating)?;
        let result = ensure_sufficient_stack(|| self.validate_kind(id, scope));
        let state = match &result {
            Ok(()) => ValidationState::Valid,
            Err(err) => ValidationState::Invalid(err.clone()),
        };
        self.types.set_state(id, state)?;
        result
    }

    fn validate_kind(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        match self.types.tag(id)? {
            KindTag::Builtin => self.validate_builtin(id, scope),
            KindTag::Defined => self.validate_defined(id),
            KindTag::Tagged => self.validate_tagged(id, scope),
            KindTag::Constrained => self.validate_constrained(id, scope),
            KindTag::Selection => self.validate_selection(id, scope),
            KindTag::Instance => self.validate_instance(id, scope),
            KindTag::Collection => self.validate_collection(id, scope),
            KindTag::CollectionOf => self.validate_collection_of(id, scope),
            KindTag::Class => self.validate_class(id, scope),
            KindTag::ClassField => self.validate_class_field(id, scope),
            KindTag::ObjectField => self.validate_object_field(id, scope),
        }
    }

    /// Resolve `ty` in `scope` and validate the result.
    ///
    /// Fails with the stored error if the referenced type failed before.
    pub(crate) fn resolve_and_validate(&mut self, ty: &TypeRef, scope: &Scope) -> Result<TypeId> {
        let id = ty.resolve(self, scope)?;
        self.validate_type(id, scope)?;
        self.ensure_usable(id)?;
        Ok(id)
    }

    /// `id` is valid, or still being validated further up the stack.
    pub(crate) fn ensure_usable(&self, id: TypeId) -> Result<()> {
        match self.types.state(id)? {
            ValidationState::Valid | ValidationState::Validating => Ok(()),
            ValidationState::Invalid(err) => Err(err.clone()),
            ValidationState::Unvalidated => Err(super::not_validated(id)),
            ValidationState::Disposed => Err(SchemaError::illegal_state(format!(
                "{id:?} used after disposal"
            ))),
        }
    }

    /// Defined types validate their sibling in their own module, ignoring the
    /// scope they were reached from.
    fn validate_defined(&mut self, id: TypeId) -> Result<()> {
        let TypeKind::Defined(defined) = self.types.kind(id)? else {
            return Err(wrong_kind(id, "defined"));
        };
        if defined.template.is_some() {
            return Err(SchemaError::validation(
                ErrorCode::E2013,
                format!(
                    "parameterized type `{}` used without arguments",
                    self.name_str(defined.name)
                ),
            ));
        }
        let mut scope = Scope::module(defined.module);
        if let Some(bindings) = &defined.bindings {
            scope = scope.child_template(Rc::clone(bindings));
        }
        let scope = scope.child_type(id);
        let sibling = defined.sibling.clone();

        let resolved = self.resolve_and_validate(&sibling, &scope)?;
        if let TypeKind::Defined(defined) = self.types.kind_mut(id)? {
            defined.resolved = Some(resolved);
        }
        Ok(())
    }

    fn validate_tagged(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        let TypeKind::Tagged(tagged) = self.types.kind(id)? else {
            return Err(wrong_kind(id, "tagged"));
        };
        let tag = tagged.tag;
        let sibling = tagged.sibling.clone();

        let resolved = self.resolve_and_validate(&sibling, scope)?;
        let effective = self.effective_tag(tag, resolved, scope);
        if let TypeKind::Tagged(tagged) = self.types.kind_mut(id)? {
            tagged.resolved = Some(resolved);
            tagged.effective = Some(effective);
        }
        Ok(())
    }

    /// Apply the module default, then promote implicit tags on CHOICE and
    /// open types to explicit.
    fn effective_tag(&self, tag: TagEncoding, sibling: TypeId, scope: &Scope) -> TagEncoding {
        let method = tag.method.effective(self.module_tag_method(scope));
        let promote = method == TagMethod::Implicit
            && self
                .family(sibling)
                .is_ok_and(|family| family.requires_explicit_tag());
        if promote {
            tracing::debug!(ty = ?sibling, "implicit tag promoted to explicit");
            tag.with_method(TagMethod::Explicit)
        } else {
            tag.with_method(method)
        }
    }

    fn validate_constrained(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        let TypeKind::Constrained(constrained) = self.types.kind(id)? else {
            return Err(wrong_kind(id, "constrained"));
        };
        let sibling = constrained.sibling.clone();
        let template = constrained.template.clone();

        let resolved = self.resolve_and_validate(&sibling, scope)?;
        // Visible before the build so named values of the sibling resolve.
        if let TypeKind::Constrained(constrained) = self.types.kind_mut(id)? {
            constrained.resolved = Some(resolved);
        }
        let constraint = self.build_constraint(scope, &template, BuildTarget::Type(resolved))?;
        if let TypeKind::Constrained(constrained) = self.types.kind_mut(id)? {
            constrained.constraint = Some(constraint);
        }
        Ok(())
    }

    fn validate_selection(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        let TypeKind::Selection(selection) = self.types.kind(id)? else {
            return Err(wrong_kind(id, "selection"));
        };
        let name = selection.name;
        let sibling = selection.sibling.clone();

        let choice = self.resolve_and_validate(&sibling, scope)?;
        let concrete = self.unwrap_concrete(choice)?;
        let alternative = match self.types.kind(concrete)? {
            TypeKind::Collection(collection) if collection.kind == CollectionKind::Choice => {
                collection
                    .component(name)
                    .and_then(|c| c.resolved)
                    .ok_or_else(|| SchemaError::unresolved_component(self.name_str(name)))?
            }
            _ => {
                return Err(SchemaError::validation(
                    ErrorCode::E2001,
                    format!(
                        "selection `{} <` requires a CHOICE, found {}",
                        self.name_str(name),
                        self.type_label(choice)
                    ),
                ))
            }
        };
        if let TypeKind::Selection(selection) = self.types.kind_mut(id)? {
            selection.resolved = Some(alternative);
        }
        Ok(())
    }

    /// Tag default of the module at the root of `scope`.
    pub(crate) fn module_tag_method(&self, scope: &Scope) -> TagMethod {
        scope
            .module_id()
            .and_then(|id| self.module(id).ok())
            .map_or(self.config.default_tag_method, |module| module.options.tag_method)
    }

    /// Whether the module at the root of `scope` has EXTENSIBILITY IMPLIED.
    pub(crate) fn module_extensibility_implied(&self, scope: &Scope) -> bool {
        scope
            .module_id()
            .and_then(|id| self.module(id).ok())
            .map_or(self.config.extensibility_implied, |module| {
                module.options.extensibility_implied
            })
    }
}
