//! Function options: a canonicalized literal-valued map.
//!
//! Options key the function cache, so the representation must hash and
//! compare structurally regardless of insertion order; a `BTreeMap` keeps
//! the entries sorted by name.

use std::collections::BTreeMap;

/// A literal option value: a string, or a number kept in its canonical
/// decimal text form so that equality and hashing stay structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionValue {
    Str(String),
    Num(String),
}

impl OptionValue {
    pub fn as_str(&self) -> &str {
        match self {
            OptionValue::Str(s) | OptionValue::Num(s) => s,
        }
    }

    /// Numeric reading of the value, for `Num` and numeric-looking `Str`.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_str().parse().ok()
    }

    pub fn as_usize(&self) -> Option<usize> {
        self.as_f64().and_then(|f| {
            if f.fract() == 0.0 && f >= 0.0 {
                Some(f as usize)
            } else {
                None
            }
        })
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Str(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Num(v.to_string())
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Num(v.to_string())
    }
}

/// An immutable-after-build mapping from option name to literal value.
/// Keys are unique; insertion order is irrelevant.
///
/// # Example
///
/// ```
/// use ftl_rt::Options;
///
/// let options = Options::new()
///     .with("minimumFractionDigits", 2i64)
///     .with("style", "plain");
/// assert_eq!(options.get_usize("minimumFractionDigits"), Some(2));
/// assert_eq!(options.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Options {
    entries: BTreeMap<String, OptionValue>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> &mut Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Builder-style [`Options::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.get(name)
    }

    pub fn get_usize(&self, name: &str) -> Option<usize> {
        self.get(name).and_then(OptionValue::as_usize)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// A copy of `self` with every entry of `over` applied on top.
    pub fn merged(&self, over: &Options) -> Options {
        let mut entries = self.entries.clone();
        for (k, v) in &over.entries {
            entries.insert(k.clone(), v.clone());
        }
        Options { entries }
    }
}
