//! Stack growth for deeply nested schemas.
//!
//! Validation and value optimization recurse once per nesting level of the
//! schema (and once per reference hop), so a generated schema with thousands
//! of nested SEQUENCEs can exhaust a thread's default stack.

/// Keep at least this much stack available before recursing (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Grow by this much when the red zone is reached (2MB).
const GROWTH: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if less than [`RED_ZONE`] remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
