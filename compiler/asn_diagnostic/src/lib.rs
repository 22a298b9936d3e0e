//! Diagnostic system for schema errors.
//!
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Subject (which definition it went wrong in)
//! - Notes (why it is wrong)
//! - Suggestions (how to fix)
//!
//! The schema engine is fail-fast: it returns the first error it meets. A
//! [`Diagnostic`] is the rendering of such an error for a human or a tool.

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::{ErrorCode, ErrorPhase};
