use crate::error::ResourceError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Ordered multimap of field values taken from a concrete resource instance.
///
/// Names may repeat: list fields contribute one entry per element, and a
/// nested parent resource contributes its own fields alongside the child's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a serializable value into parameters.
    ///
    /// The value must serialize to a map (a struct with named fields) or to
    /// `null` (a unit struct). `null` fields are skipped, scalars become one
    /// value, sequences of scalars become one value per element, and nested
    /// maps are flattened into the same parameter set. Fields come out in
    /// name order, not declaration order; the descriptor decides the order of
    /// declared query parameters.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::Serialization`] if `serde` serialization fails
    /// - [`ResourceError::NotAStruct`] if the value is not map-like
    /// - [`ResourceError::UnsupportedValue`] for sequences of maps or sequences
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self, ResourceError> {
        let mut parameters = Self::new();
        match serde_json::to_value(value)? {
            Value::Null => {}
            Value::Object(map) => parameters.flatten(map)?,
            other => {
                return Err(ResourceError::NotAStruct {
                    kind: kind_of(&other),
                });
            }
        }
        Ok(parameters)
    }

    fn flatten(&mut self, map: Map<String, Value>) -> Result<(), ResourceError> {
        for (name, value) in map {
            match value {
                Value::Null => {}
                Value::Object(nested) => self.flatten(nested)?,
                Value::Array(items) => {
                    for item in items {
                        let Some(text) = scalar_to_string(&item) else {
                            return Err(ResourceError::UnsupportedValue {
                                name,
                                kind: kind_of(&item),
                            });
                        };
                        self.entries.push((name.clone(), text));
                    }
                }
                scalar => {
                    if let Some(text) = scalar_to_string(&scalar) {
                        self.entries.push((name, text));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `name`, in insertion order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Distinct names in first-seen order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.entries {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
