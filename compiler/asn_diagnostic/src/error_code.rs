//! Error codes for all schema diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E1001`) with the first digit
//! indicating the failing phase.

use std::fmt;

/// Error codes for all schema diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: Resolution errors (a name, field or object-set lookup failed)
/// - E2xxx: Validation errors (a structural or semantic rule was violated)
/// - E3xxx: Constraint violations (a value failed a built constraint)
/// - E9xxx: Internal errors (usage-contract violations)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Resolution Errors (E1xxx)
    /// Unresolved type reference
    E1001,
    /// Unresolved value reference
    E1002,
    /// Unresolved module reference
    E1003,
    /// Unresolved class field or object field
    E1004,
    /// Symbol imported from a module that does not export it
    E1005,
    /// Named component or alternative not found
    E1006,

    // Validation Errors (E2xxx)
    /// Type family mismatch
    E2001,
    /// Duplicate definition
    E2002,
    /// Component or field both optional and defaulted
    E2003,
    /// Constraint not applicable to the type family
    E2004,
    /// Required component or field missing
    E2005,
    /// Unknown component or field
    E2006,
    /// Template argument count mismatch
    E2007,
    /// Template argument kind mismatch
    E2008,
    /// Value does not match the type structurally
    E2009,
    /// Duplicate named number, named bit or enumeration item
    E2010,
    /// Duplicate tag among alternatives or set components
    E2011,
    /// Invalid class field path
    E2012,
    /// Template used without arguments
    E2013,
    /// Value parameter declared without a governor
    E2014,

    // Constraint Violations (E3xxx)
    /// Value outside the permitted set
    E3001,
    /// No object in the object set matches the governing value
    E3002,
    /// Component presence violates an inner-type constraint
    E3003,
    /// Open-type value does not conform to the matched object's type
    E3004,

    // Internal Errors (E9xxx)
    /// Illegal state (e.g., querying a type before validation)
    E9001,
    /// Unsupported operation
    E9002,
}

/// Phase an error code belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorPhase {
    Resolution,
    Validation,
    Constraint,
    Internal,
}

impl ErrorCode {
    /// All error codes, for documentation and exhaustiveness tests.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E2014,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    /// Get the code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line description used by `--explain`-style tooling.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "unresolved type reference",
            ErrorCode::E1002 => "unresolved value reference",
            ErrorCode::E1003 => "unresolved module reference",
            ErrorCode::E1004 => "unresolved class or object field",
            ErrorCode::E1005 => "symbol is not exported by the named module",
            ErrorCode::E1006 => "named component not found",
            ErrorCode::E2001 => "type family mismatch",
            ErrorCode::E2002 => "duplicate definition",
            ErrorCode::E2003 => "optional and default are mutually exclusive",
            ErrorCode::E2004 => "constraint not applicable to this type",
            ErrorCode::E2005 => "required component or field is missing",
            ErrorCode::E2006 => "unknown component or field",
            ErrorCode::E2007 => "wrong number of template arguments",
            ErrorCode::E2008 => "template argument kind mismatch",
            ErrorCode::E2009 => "value does not match type",
            ErrorCode::E2010 => "duplicate named value",
            ErrorCode::E2011 => "duplicate tag",
            ErrorCode::E2012 => "invalid class field path",
            ErrorCode::E2013 => "template referenced without arguments",
            ErrorCode::E2014 => "value parameter requires a governor",
            ErrorCode::E3001 => "value not permitted by constraint",
            ErrorCode::E3002 => "no matching object in object set",
            ErrorCode::E3003 => "component presence constraint violated",
            ErrorCode::E3004 => "open type value does not match object type",
            ErrorCode::E9001 => "illegal state",
            ErrorCode::E9002 => "unsupported operation",
        }
    }

    /// Phase this code belongs to, from its leading digit.
    pub fn phase(&self) -> ErrorPhase {
        match self.as_str().as_bytes()[1] {
            b'1' => ErrorPhase::Resolution,
            b'2' => ErrorPhase::Validation,
            b'3' => ErrorPhase::Constraint,
            _ => ErrorPhase::Internal,
        }
    }

    /// Check if this is a resolution error (E1xxx range).
    pub fn is_resolution_error(&self) -> bool {
        self.phase() == ErrorPhase::Resolution
    }

    /// Check if this is a validation error (E2xxx range).
    pub fn is_validation_error(&self) -> bool {
        self.phase() == ErrorPhase::Validation
    }

    /// Check if this is a constraint violation (E3xxx range).
    pub fn is_constraint_error(&self) -> bool {
        self.phase() == ErrorPhase::Constraint
    }

    /// Check if this is an internal error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        self.phase() == ErrorPhase::Internal
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
