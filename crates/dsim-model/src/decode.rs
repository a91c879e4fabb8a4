//! Lenient decoding of payload objects into typed rows.
//!
//! Decoding never fails. A missing or mistyped field falls back to an empty
//! string, `0`, or `None`, and a slice that is not an array decodes to an
//! empty list, so a partial response degrades to empty views.

use crate::payload::Payload;

/// Types that can be read from a payload object.
pub trait FromPayload: Sized {
    fn from_payload(value: &Payload) -> Self;
}

/// Decodes every element of an array. Anything else yields an empty list.
pub fn decode_list<T: FromPayload>(value: Option<&Payload>) -> Vec<T> {
    value
        .and_then(Payload::as_array)
        .map(|items| items.iter().map(T::from_payload).collect())
        .unwrap_or_default()
}

/// Text form of a field: strings as-is, numbers and booleans formatted,
/// everything else empty.
pub(crate) fn text_field(value: &Payload, key: &str) -> String {
    match value.get(key) {
        Some(Payload::String(text)) => text.clone(),
        Some(Payload::Number(number)) => number.to_string(),
        Some(Payload::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

/// Numeric field, accepting numeric strings.
///
/// Strings must hold a finite number; `"NaN"` or `"inf"` read as absent.
pub(crate) fn number_field(value: &Payload, key: &str) -> Option<f64> {
    match value.get(key)? {
        Payload::Number(number) => Some(number.as_f64()),
        Payload::String(text) => text.trim().parse().ok().filter(|v: &f64| v.is_finite()),
        _ => None,
    }
}

/// First present numeric field among `keys`.
pub(crate) fn number_field_any(value: &Payload, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| number_field(value, key))
}

pub(crate) fn optional_text(value: &Payload, key: &str) -> Option<String> {
    value.get(key).and_then(Payload::as_str).map(str::to_string)
}
