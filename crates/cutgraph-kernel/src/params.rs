//! Typed parameter bag handed to `Cut::initialize`.
//!
//! Values are booleans, integers, reals, strings, or homogeneous arrays of
//! one of those. Keys are plain strings and may be dotted
//! (`cut.description`, `logging.priority`).

use serde::Serialize;
use std::collections::BTreeMap;

/// One typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
    Booleans(Vec<bool>),
    Integers(Vec<i64>),
    Reals(Vec<f64>),
    Strings(Vec<String>),
}

impl ParamValue {
    /// Human-readable name of the value's type, used in diagnostics.
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::String(_) => "string",
            Self::Booleans(_) => "boolean array",
            Self::Integers(_) => "integer array",
            Self::Reals(_) => "real array",
            Self::Strings(_) => "string array",
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<bool>> for ParamValue {
    fn from(value: Vec<bool>) -> Self {
        Self::Booleans(value)
    }
}

impl From<Vec<i64>> for ParamValue {
    fn from(value: Vec<i64>) -> Self {
        Self::Integers(value)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(value: Vec<f64>) -> Self {
        Self::Reals(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::Strings(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        Self::Strings(value.into_iter().map(str::to_string).collect())
    }
}

/// Parameter lookup failures, before a cut label is attached.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("missing parameter '{key}'")]
    Missing { key: String },

    #[error("parameter '{key}': expected {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// A bag of typed parameters keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params {
    entries: BTreeMap<String, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value. Returns the previous value if present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// True only when `key` holds the boolean `true`.
    pub fn has_flag(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(ParamValue::Boolean(true)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, key: &str) -> Result<&ParamValue, ParamError> {
        self.entries.get(key).ok_or_else(|| ParamError::Missing {
            key: key.to_string(),
        })
    }

    pub fn fetch_bool(&self, key: &str) -> Result<bool, ParamError> {
        match self.require(key)? {
            ParamValue::Boolean(value) => Ok(*value),
            other => Err(wrong_type(key, "boolean", other)),
        }
    }

    pub fn fetch_integer(&self, key: &str) -> Result<i64, ParamError> {
        match self.require(key)? {
            ParamValue::Integer(value) => Ok(*value),
            other => Err(wrong_type(key, "integer", other)),
        }
    }

    /// Integers are widened to reals.
    pub fn fetch_real(&self, key: &str) -> Result<f64, ParamError> {
        match self.require(key)? {
            ParamValue::Real(value) => Ok(*value),
            ParamValue::Integer(value) => Ok(*value as f64),
            other => Err(wrong_type(key, "real", other)),
        }
    }

    pub fn fetch_string(&self, key: &str) -> Result<&str, ParamError> {
        match self.require(key)? {
            ParamValue::String(value) => Ok(value),
            other => Err(wrong_type(key, "string", other)),
        }
    }

    pub fn fetch_strings(&self, key: &str) -> Result<&[String], ParamError> {
        match self.require(key)? {
            ParamValue::Strings(values) => Ok(values),
            other => Err(wrong_type(key, "string array", other)),
        }
    }

    /// Like [`Params::fetch_integer`], but an absent key is `Ok(None)`.
    pub fn opt_integer(&self, key: &str) -> Result<Option<i64>, ParamError> {
        optional(self.fetch_integer(key))
    }

    /// Like [`Params::fetch_real`], but an absent key is `Ok(None)`.
    pub fn opt_real(&self, key: &str) -> Result<Option<f64>, ParamError> {
        optional(self.fetch_real(key))
    }

    /// Like [`Params::fetch_string`], but an absent key is `Ok(None)`.
    pub fn opt_string(&self, key: &str) -> Result<Option<&str>, ParamError> {
        optional(self.fetch_string(key))
    }

    /// Like [`Params::fetch_strings`], but an absent key is `Ok(None)`.
    pub fn opt_strings(&self, key: &str) -> Result<Option<&[String]>, ParamError> {
        optional(self.fetch_strings(key))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &ParamValue) -> ParamError {
    ParamError::WrongType {
        key: key.to_string(),
        expected,
        found: found.type_label(),
    }
}

fn optional<T>(result: Result<T, ParamError>) -> Result<Option<T>, ParamError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ParamError::Missing { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Params {
        Params::new()
            .with("enabled", true)
            .with("seed", 314159_i64)
            .with("accept_probability", 0.13)
            .with("cut_1", "energy")
            .with("cuts", vec!["a", "b", "c"])
    }

    #[test]
    fn typed_fetches() {
        let params = sample();
        assert!(params.fetch_bool("enabled").unwrap());
        assert_eq!(params.fetch_integer("seed").unwrap(), 314159);
        assert_eq!(params.fetch_real("accept_probability").unwrap(), 0.13);
        assert_eq!(params.fetch_string("cut_1").unwrap(), "energy");
        assert_eq!(params.fetch_strings("cuts").unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn integers_widen_to_reals() {
        let params = Params::new().with("p", 1_i64);
        assert_eq!(params.fetch_real("p").unwrap(), 1.0);
    }

    #[test]
    fn missing_and_mistyped_keys() {
        let params = sample();
        assert_eq!(
            params.fetch_string("cut_2"),
            Err(ParamError::Missing {
                key: "cut_2".into()
            })
        );
        assert_eq!(
            params.fetch_string("seed"),
            Err(ParamError::WrongType {
                key: "seed".into(),
                expected: "string",
                found: "integer",
            })
        );
    }

    #[test]
    fn optional_fetches_only_forgive_absence() {
        let params = sample();
        assert_eq!(params.opt_integer("absent").unwrap(), None);
        assert_eq!(params.opt_integer("seed").unwrap(), Some(314159));
        assert!(params.opt_integer("cut_1").is_err());
    }

    #[test]
    fn flags_require_literal_true() {
        let params = sample().with("off", false).with("text", "true");
        assert!(params.has_flag("enabled"));
        assert!(!params.has_flag("off"));
        assert!(!params.has_flag("text"));
        assert!(!params.has_flag("absent"));
    }
}
