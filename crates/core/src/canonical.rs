//! Canonical JSON serialization.
//!
//! Produces a byte-identical string for two JSON values that are deep-equal
//! when object key order is ignored. Object keys are emitted in lexicographic
//! order at every depth, arrays keep their element order, and primitives use
//! the standard `serde_json` encoding.
//!
//! The output feeds [`crate::fingerprint`], so any change here changes every
//! stored checksum.

use serde_json::Value;

/// Serialize a JSON value with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

/// Serialize a plain text blob as a JSON string literal.
///
/// Text blobs go through the same encoding as structured payloads so that
/// `("ab", "c")` and `("a", "bc")` never concatenate to the same input.
pub fn canonical_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    write_string(text, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, child)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(child, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        // Null, Bool and Number render through serde_json's own encoder.
        primitive => out.push_str(&primitive.to_string()),
    }
}

fn write_string(s: &str, out: &mut String) {
    // `Value`'s Display impl is the infallible path to serde_json's escaper.
    out.push_str(&Value::String(s.to_owned()).to_string());
}
