use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

/// A scalar request parameter. Text coercion happens at canonicalization time.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// A JSON parameter that is neither a scalar nor null.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter '{field}' is not a scalar and cannot be signed")]
pub struct NonScalarParam {
    pub field: String,
}

/// Unordered field -> value mapping handed to a signer.
///
/// `None` marks an absent value (JSON `null`); absent entries are kept here
/// and dropped by the canonicalizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignableParams {
    entries: HashMap<String, Option<ParamValue>>,
}

impl SignableParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a present value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.entries.insert(key.into(), Some(value.into()));
        self
    }

    /// Insert or replace a value that may be absent.
    pub fn insert_opt<V: Into<ParamValue>>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        self.entries.insert(key.into(), value.map(Into::into));
        self
    }

    pub fn insert_absent(&mut self, key: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), None);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Option<ParamValue>> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Option<ParamValue>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ParamValue>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Convert a JSON object. `null` becomes absent; arrays and objects are rejected.
    pub fn from_json_object(object: Map<String, Value>) -> Result<Self, NonScalarParam> {
        let mut params = Self::new();
        for (field, value) in object {
            let value = match value {
                Value::Null => None,
                Value::Bool(b) => Some(ParamValue::Bool(b)),
                Value::String(s) => Some(ParamValue::Text(s)),
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Some(ParamValue::Int(i))
                    } else if let Some(u) = n.as_u64() {
                        Some(ParamValue::UInt(u))
                    } else if let Some(f) = n.as_f64() {
                        Some(ParamValue::Float(f))
                    } else {
                        return Err(NonScalarParam { field });
                    }
                }
                Value::Array(_) | Value::Object(_) => return Err(NonScalarParam { field }),
            };
            params.entries.insert(field, value);
        }
        Ok(params)
    }
}

impl<K, V> FromIterator<(K, V)> for SignableParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
