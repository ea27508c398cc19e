//! Runtime values and formatting arguments.
//!
//! Everything the resolver manipulates is a [`FluentValue`]. Errors travel
//! through resolution as inert [`FluentValue::Error`] strings so a failing
//! sub-expression degrades to a marker instead of aborting the call.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use ftl_par::ast::NumberValue;
use rustc_hash::FxHashMap;

/// An opaque host value carried through resolution.
///
/// Custom values are formatted and selected on by the custom formatters
/// registered with the function registry; [`CustomValue::render`] is the
/// fallback rendering when no formatter matches.
pub trait CustomValue: fmt::Debug + Send + Sync {
    /// The value as `Any`, for exact-type formatter lookup.
    fn as_any(&self) -> &dyn Any;

    /// Plain-string rendering used when no custom formatter matches.
    fn render(&self) -> String;
}

/// A typed runtime value.
#[derive(Debug, Clone)]
pub enum FluentValue {
    /// A plain string.
    Str(String),
    /// An inert error marker, rendered as-is.
    Error(String),
    /// A number, narrowest-fit.
    Number(FluentNumber),
    /// A date or time value.
    Temporal(FluentTemporal),
    /// An opaque host value.
    Custom(Arc<dyn CustomValue>),
}

impl PartialEq for FluentValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FluentValue::Str(a), FluentValue::Str(b)) => a == b,
            (FluentValue::Error(a), FluentValue::Error(b)) => a == b,
            (FluentValue::Number(a), FluentValue::Number(b)) => a == b,
            (FluentValue::Temporal(a), FluentValue::Temporal(b)) => a == b,
            (FluentValue::Custom(a), FluentValue::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A numeric value: an `i64` when the source fits one, `f64` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FluentNumber {
    Int(i64),
    Float(f64),
}

impl FluentNumber {
    pub fn as_f64(self) -> f64 {
        match self {
            FluentNumber::Int(i) => i as f64,
            FluentNumber::Float(f) => f,
        }
    }

    /// Plain decimal rendering without locale formatting.
    pub fn to_plain_string(self) -> String {
        match self {
            FluentNumber::Int(i) => i.to_string(),
            FluentNumber::Float(f) => f.to_string(),
        }
    }
}

impl From<NumberValue> for FluentNumber {
    fn from(v: NumberValue) -> Self {
        match v {
            NumberValue::Int(i) => FluentNumber::Int(i),
            NumberValue::Float(f) => FluentNumber::Float(f),
        }
    }
}

/// A date or time value backed by chrono.
#[derive(Debug, Clone, PartialEq)]
pub enum FluentTemporal {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FluentValue {
            fn from(v: $ty) -> Self {
                FluentValue::Number(FluentNumber::Int(v as i64))
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for FluentValue {
    fn from(v: f64) -> Self {
        FluentValue::Number(FluentNumber::Float(v))
    }
}

impl From<f32> for FluentValue {
    fn from(v: f32) -> Self {
        FluentValue::Number(FluentNumber::Float(v as f64))
    }
}

impl From<&str> for FluentValue {
    fn from(v: &str) -> Self {
        FluentValue::Str(v.to_string())
    }
}

impl From<String> for FluentValue {
    fn from(v: String) -> Self {
        FluentValue::Str(v)
    }
}

impl From<FluentNumber> for FluentValue {
    fn from(v: FluentNumber) -> Self {
        FluentValue::Number(v)
    }
}

impl From<FluentTemporal> for FluentValue {
    fn from(v: FluentTemporal) -> Self {
        FluentValue::Temporal(v)
    }
}

impl From<NaiveDate> for FluentValue {
    fn from(v: NaiveDate) -> Self {
        FluentValue::Temporal(FluentTemporal::Date(v))
    }
}

impl From<NaiveDateTime> for FluentValue {
    fn from(v: NaiveDateTime) -> Self {
        FluentValue::Temporal(FluentTemporal::DateTime(v))
    }
}

impl From<DateTime<FixedOffset>> for FluentValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        FluentValue::Temporal(FluentTemporal::Zoned(v))
    }
}

impl From<Arc<dyn CustomValue>> for FluentValue {
    fn from(v: Arc<dyn CustomValue>) -> Self {
        FluentValue::Custom(v)
    }
}

/// Arguments for one `format` call: a map from variable name to a list of
/// values. Scalars are stored as single-element lists; sequences arrive
/// already flattened through [`FluentArgs::set_many`], so nested sequences
/// are unrepresentable.
#[derive(Debug, Clone, Default)]
pub struct FluentArgs {
    map: FxHashMap<String, Vec<FluentValue>>,
}

impl FluentArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a scalar value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FluentValue>) -> &mut Self {
        self.map.insert(name.into(), vec![value.into()]);
        self
    }

    /// Binds a sequence, element-wise converted.
    pub fn set_many<V: Into<FluentValue>>(
        &mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.map
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Binds an opaque host value.
    pub fn set_custom(&mut self, name: impl Into<String>, value: Arc<dyn CustomValue>) -> &mut Self {
        self.map.insert(name.into(), vec![FluentValue::Custom(value)]);
        self
    }

    pub fn get(&self, name: &str) -> Option<&[FluentValue]> {
        self.map.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Merges `other` into `self`; bindings in `other` win.
    pub fn extend(&mut self, other: FluentArgs) {
        self.map.extend(other.map);
    }
}

impl<K: Into<String>, V: Into<FluentValue>> FromIterator<(K, V)> for FluentArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = FluentArgs::new();
        for (k, v) in iter {
            args.set(k, v);
        }
        args
    }
}
