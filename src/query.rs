//! Ordered parameter values and query string assembly.

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::ApiError;

/// Insertion-ordered name -> value mapping.
///
/// Re-inserting an existing name updates the value in place, so the position of a
/// parameter is fixed by the first time it was set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamValues {
    entries: Vec<(String, String)>,
}

impl ParamValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse free-form JSON text into values.
    ///
    /// The text must be a JSON object. Strings are taken verbatim, `null` becomes an
    /// empty value and any other JSON value is kept as its compact JSON text.
    pub fn from_json(text: &str) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            return Err(ApiError::NotAnObject);
        };

        Ok(map
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect())
    }

    /// Pretty JSON object text, the editable form of these values.
    pub fn to_json_pretty(&self) -> String {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_else(|_| "{}".to_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = ParamValues::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

/// URL-encoded `key=value` pairs joined by `&`, skipping blank values.
///
/// Pairs keep the insertion order of `values`; an empty string means nothing qualified.
pub fn build_query(values: &ParamValues) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in values.iter().filter(|(_, v)| !v.trim().is_empty()) {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}
