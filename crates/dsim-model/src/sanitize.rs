//! Result sanitization.
//!
//! Replaces every `NaN` numeric leaf with `0` by walking the tree. Nothing
//! else is touched: strings, booleans, nulls, finite and infinite numbers,
//! and the shape of every array and object are preserved.

use crate::payload::{Number, Payload};

/// Returns a copy of `value` with every `NaN` leaf replaced by `0`.
///
/// Idempotent: `sanitize(sanitize(v)) == sanitize(v)`.
pub fn sanitize(mut value: Payload) -> Payload {
    sanitize_in_place(&mut value);
    value
}

/// Replaces `NaN` leaves in place and returns how many were replaced.
///
/// Uses an explicit work stack, so nesting depth is bounded only by memory.
pub fn sanitize_in_place(value: &mut Payload) -> usize {
    let mut replaced = 0;
    let mut stack = vec![value];
    while let Some(node) = stack.pop() {
        match node {
            Payload::Number(number) if number.is_nan() => {
                *number = Number::PosInt(0);
                replaced += 1;
            }
            Payload::Array(items) => stack.extend(items.iter_mut()),
            Payload::Object(entries) => stack.extend(entries.iter_mut().map(|(_, value)| value)),
            _ => {}
        }
    }
    replaced
}

/// Returns true if any numeric leaf is `NaN`.
pub fn contains_nan(value: &Payload) -> bool {
    let mut stack = vec![value];
    while let Some(node) = stack.pop() {
        match node {
            Payload::Number(number) if number.is_nan() => return true,
            Payload::Array(items) => stack.extend(items.iter()),
            Payload::Object(entries) => stack.extend(entries.iter().map(|(_, value)| value)),
            _ => {}
        }
    }
    false
}
