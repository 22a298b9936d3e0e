//! Value definitions.

use asn_diagnostic::ErrorCode;

use super::{DefinedValue, ValueDefId};
use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::scope::Scope;
use crate::types::ValidationState;
use crate::value::Value;

impl Schema {
    pub fn value_def(&self, def: ValueDefId) -> Result<&DefinedValue> {
        self.module(def.module)?
            .values
            .at(def.index as usize)
            .ok_or_else(|| SchemaError::illegal_state(format!("unknown value handle {def:?}")))
    }

    fn value_def_mut(&mut self, def: ValueDefId) -> Result<&mut DefinedValue> {
        self.module_mut(def.module)?
            .values
            .at_mut(def.index as usize)
            .ok_or_else(|| SchemaError::illegal_state(format!("unknown value handle {def:?}")))
    }

    /// Resolve the declared type of `def` and optimize its value against it.
    ///
    /// Same state machine as types. Parameterized values are only checked per
    /// instance.
    pub fn validate_defined_value(&mut self, def: ValueDefId) -> Result<()> {
        let entry = self.value_def(def)?;
        if entry.template.is_some() {
            return Ok(());
        }
        match entry.state {
            ValidationState::Unvalidated => {}
            ValidationState::Validating | ValidationState::Valid | ValidationState::Invalid(_) => {
                return Ok(())
            }
            ValidationState::Disposed => {
                return Err(SchemaError::illegal_state("value validated after disposal"))
            }
        }
        let scope = Scope::module(entry.module);
        let declared = entry.ty.clone();
        let raw = entry.value.clone();
        tracing::trace!(value = self.name_str(entry.name), "validating value");

        self.value_def_mut(def)?.state = ValidationState::Validating;
        let result = self
            .resolve_and_validate(&declared, &scope)
            .and_then(|ty| Ok((ty, self.validate_value(&scope, ty, &raw)?)));

        let entry = self.value_def_mut(def)?;
        match result {
            Ok((ty, optimized)) => {
                entry.resolved_type = Some(ty);
                entry.optimized = Some(optimized);
                entry.state = ValidationState::Valid;
                Ok(())
            }
            Err(err) => {
                entry.state = ValidationState::Invalid(err.clone());
                Err(err)
            }
        }
    }

    /// Optimized value of a validated definition.
    pub fn value_of(&self, def: ValueDefId) -> Result<Value> {
        let entry = self.value_def(def)?;
        if entry.template.is_some() {
            return Err(SchemaError::validation(
                ErrorCode::E2013,
                format!(
                    "parameterized value `{}` used without arguments",
                    self.name_str(entry.name)
                ),
            ));
        }
        match &entry.state {
            ValidationState::Valid => entry
                .optimized
                .clone()
                .ok_or_else(|| SchemaError::illegal_state("valid value without optimized form")),
            ValidationState::Validating => Err(SchemaError::validation(
                ErrorCode::E2009,
                format!("value `{}` is defined in terms of itself", self.name_str(entry.name)),
            )),
            ValidationState::Invalid(err) => Err(err.clone()),
            ValidationState::Unvalidated => Err(SchemaError::illegal_state(format!(
                "value `{}` used before validation",
                self.name_str(entry.name)
            ))),
            ValidationState::Disposed => {
                Err(SchemaError::illegal_state("value used after disposal"))
            }
        }
    }

    /// Resolved type of a validated definition.
    pub fn value_type(&self, def: ValueDefId) -> Result<Option<asn_ir::TypeId>> {
        Ok(self.value_def(def)?.resolved_type)
    }
}
