//! Errors raised while resolving, validating and checking schemas.
//!
//! Every fallible engine operation returns [`Result`]. Errors propagate
//! unchanged (fail fast); a type whose validation failed stores a clone of the
//! error in its validation state, hence `Clone + PartialEq`.

use asn_diagnostic::{Diagnostic, ErrorCode};

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// What kind of symbol a failed lookup was looking for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Type,
    Value,
    Module,
    Field,
    Component,
    /// A type or value name in an import or export list.
    Symbol,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Type => "type",
            SymbolKind::Value => "value",
            SymbolKind::Module => "module",
            SymbolKind::Field => "field",
            SymbolKind::Component => "component",
            SymbolKind::Symbol => "symbol",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema engine error.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// A name, field, module or object could not be found.
    #[error("unresolved {kind} `{name}`")]
    Resolution {
        code: ErrorCode,
        kind: SymbolKind,
        name: String,
        /// Visible names close to `name`.
        similar: Vec<String>,
    },

    /// A structural or semantic rule of the schema is violated.
    #[error("{message}")]
    Validation { code: ErrorCode, message: String },

    /// A value failed a built constraint.
    #[error("constraint violated: {message}")]
    ConstraintViolation { code: ErrorCode, message: String },

    /// The engine was used against its contract (e.g. optimize before validate).
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The operation is not available for this type or value.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl SchemaError {
    /// Unresolved type reference.
    #[cold]
    pub fn unresolved_type(name: impl Into<String>) -> Self {
        Self::unresolved(ErrorCode::E1001, SymbolKind::Type, name)
    }

    /// Unresolved value reference.
    #[cold]
    pub fn unresolved_value(name: impl Into<String>) -> Self {
        Self::unresolved(ErrorCode::E1002, SymbolKind::Value, name)
    }

    /// Unresolved module reference.
    #[cold]
    pub fn unresolved_module(name: impl Into<String>) -> Self {
        Self::unresolved(ErrorCode::E1003, SymbolKind::Module, name)
    }

    /// Unresolved class or object field.
    #[cold]
    pub fn unresolved_field(name: impl Into<String>) -> Self {
        Self::unresolved(ErrorCode::E1004, SymbolKind::Field, name)
    }

    /// Unresolved named component or alternative.
    #[cold]
    pub fn unresolved_component(name: impl Into<String>) -> Self {
        Self::unresolved(ErrorCode::E1006, SymbolKind::Component, name)
    }

    /// Symbol not exported by the module it is imported from.
    #[cold]
    pub fn not_exported(name: impl Into<String>) -> Self {
        Self::unresolved(ErrorCode::E1005, SymbolKind::Symbol, name)
    }

    #[cold]
    pub fn unresolved(code: ErrorCode, kind: SymbolKind, name: impl Into<String>) -> Self {
        SchemaError::Resolution {
            code,
            kind,
            name: name.into(),
            similar: Vec::new(),
        }
    }

    #[cold]
    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        SchemaError::Validation {
            code,
            message: message.into(),
        }
    }

    #[cold]
    pub fn violation(code: ErrorCode, message: impl Into<String>) -> Self {
        SchemaError::ConstraintViolation {
            code,
            message: message.into(),
        }
    }

    #[cold]
    pub fn illegal_state(message: impl Into<String>) -> Self {
        SchemaError::IllegalState(message.into())
    }

    #[cold]
    pub fn unsupported(message: impl Into<String>) -> Self {
        SchemaError::Unsupported(message.into())
    }

    /// Attach "did you mean" candidates to a resolution error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_similar(self, candidates: Vec<String>) -> Self {
        match self {
            SchemaError::Resolution {
                code, kind, name, ..
            } => SchemaError::Resolution {
                code,
                kind,
                name,
                similar: candidates,
            },
            other => other,
        }
    }

    /// The diagnostic code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SchemaError::Resolution { code, .. }
            | SchemaError::Validation { code, .. }
            | SchemaError::ConstraintViolation { code, .. } => *code,
            SchemaError::IllegalState(_) => ErrorCode::E9001,
            SchemaError::Unsupported(_) => ErrorCode::E9002,
        }
    }

    pub fn is_resolution(&self) -> bool {
        matches!(self, SchemaError::Resolution { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SchemaError::Validation { .. })
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, SchemaError::ConstraintViolation { .. })
    }

    /// Whether this is a usage-contract error rather than a schema/data error.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            SchemaError::IllegalState(_) | SchemaError::Unsupported(_)
        )
    }

    /// Render as a diagnostic about `subject` (e.g. `Module.Type`).
    pub fn to_diagnostic(&self, subject: Option<&str>) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code()).with_message(self.to_string());
        if let Some(subject) = subject {
            diag = diag.with_subject(subject);
        }
        match self {
            SchemaError::Resolution { kind, similar, .. } => {
                if *kind == SymbolKind::Type || *kind == SymbolKind::Value {
                    diag = diag.with_note(
                        "names resolve locally, then through imports, then in the core module",
                    );
                }
                for candidate in similar {
                    diag = diag.with_suggestion(format!("did you mean `{candidate}`?"));
                }
            }
            SchemaError::IllegalState(_) | SchemaError::Unsupported(_) => {
                diag = diag.with_note(self.code().description());
            }
            SchemaError::Validation { .. } | SchemaError::ConstraintViolation { .. } => {}
        }
        diag
    }
}
