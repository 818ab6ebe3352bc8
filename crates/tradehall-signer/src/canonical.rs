use tradehall_types::{ParamValue, SignableParams};

use crate::error::SignError;

/// Serialize params into the `key=value&...` string that gets signed.
///
/// Absent values and `exclude`d keys are dropped, the rest are sorted by key
/// bytes (not locale collation). Keys and values are not percent-encoded.
/// An empty set yields `""`.
pub fn canonicalize(params: &SignableParams, exclude: &[&str]) -> Result<String, SignError> {
    let mut pairs: Vec<(&str, String)> = Vec::with_capacity(params.len());
    for (key, value) in params.iter() {
        let Some(value) = value else { continue };
        if exclude.contains(&key) {
            continue;
        }
        pairs.push((key, value_text(key, value)?));
    }

    // Keys are unique, so an unstable sort is still deterministic.
    pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));

    Ok(pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&"))
}

/// Locale-independent text form of a value.
fn value_text(key: &str, value: &ParamValue) -> Result<String, SignError> {
    Ok(match value {
        ParamValue::Text(s) => s.clone(),
        ParamValue::Int(i) => i.to_string(),
        ParamValue::UInt(u) => u.to_string(),
        ParamValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        ParamValue::Float(f) => {
            if !f.is_finite() {
                return Err(SignError::validation(key, format!("non-finite number {}", f)));
            }
            // f64 Display is shortest round-trip and never uses exponent notation.
            // -0.0 would otherwise print as "-0".
            if *f == 0.0 { "0".to_string() } else { f.to_string() }
        }
    })
}
