//! Ordering of optimized values, for value ranges.

use std::cmp::Ordering;

use super::Value;

/// Order two optimized values of an ordered family.
///
/// Integers and reals compare numerically (mixed operands as `f64`), strings
/// by code point. Anything else is unordered.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Some(x.cmp(y)),
        (Value::Real(x), Value::Real(y)) => x.partial_cmp(y),
        #[expect(
            clippy::cast_precision_loss,
            reason = "ranges mixing INTEGER and REAL bounds compare approximately"
        )]
        (Value::Integer(x), Value::Real(y)) => (*x as f64).partial_cmp(y),
        #[expect(
            clippy::cast_precision_loss,
            reason = "ranges mixing INTEGER and REAL bounds compare approximately"
        )]
        (Value::Real(x), Value::Integer(y)) => x.partial_cmp(&(*y as f64)),
        (Value::String(x), Value::String(y)) => Some(x.chars().cmp(y.chars())),
        (Value::Named(x), Value::Named(y)) if x.name == y.name => {
            compare_values(&x.value, &y.value)
        }
        _ => None,
    }
}
