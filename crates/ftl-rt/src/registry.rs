//! Function registry: named factories, implicit formatters and selectors.
//!
//! The registry is locale-independent and immutable once built. A factory
//! instantiates a function for a `(locale, options)` pair; the instance
//! advertises its capabilities through the `as_*` accessors, which lets a
//! single object serve as transform, formatter and selector at once.
//!
//! Custom host types are indexed two ways: an exact-`TypeId` map for O(1)
//! dispatch, and an insertion-ordered predicate list scanned linearly where
//! the first matching entry wins. Callers must register general predicates
//! after specific ones.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use ftl_par::ast::SelectExpression;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use unic_langid::LanguageIdentifier;

use crate::errors::{FunctionError, RegistryError, ResolutionError};
use crate::options::Options;
use crate::scope::Scope;
use crate::value::{CustomValue, FluentValue};

/// Expands a list of argument values into a list of result values.
pub trait Transform: Send + Sync {
    fn apply(
        &self,
        args: &[FluentValue],
        scope: &mut Scope,
    ) -> Result<Vec<FluentValue>, FunctionError>;
}

/// Formats one value into display text.
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: &FluentValue, scope: &mut Scope) -> Result<String, FunctionError>;
}

/// Chooses a variant of a select expression for a list of values.
/// Returns the index of the chosen variant.
pub trait Selector: Send + Sync {
    fn select(
        &self,
        values: &[FluentValue],
        select: &SelectExpression,
        scope: &mut Scope,
    ) -> Result<usize, FunctionError>;
}

/// Collapses a list of values into the final string for a placeable.
pub trait TerminalReducer: Send + Sync {
    fn reduce(&self, values: &[FluentValue], scope: &mut Scope) -> Result<String, FunctionError>;
}

/// An instantiated function. Capabilities are discovered through the
/// accessors; each defaults to "not provided".
pub trait FluentFunction: Send + Sync + fmt::Debug {
    fn as_transform(&self) -> Option<&dyn Transform> {
        None
    }
    fn as_formatter(&self) -> Option<&dyn ValueFormatter> {
        None
    }
    fn as_selector(&self) -> Option<&dyn Selector> {
        None
    }
    fn as_reducer(&self) -> Option<&dyn TerminalReducer> {
        None
    }
}

/// Creates function instances for a `(locale, options)` pair.
pub trait FunctionFactory: Send + Sync + fmt::Debug {
    /// Registry and cache key name, e.g. `"NUMBER"`.
    fn name(&self) -> &'static str;

    /// Whether instances may be cached and shared across calls. Factories
    /// returning `false` get a fresh instance per use; instances of
    /// cacheable factories must be thread-safe.
    fn can_cache(&self) -> bool {
        true
    }

    fn create(
        &self,
        locale: &LanguageIdentifier,
        options: &Options,
    ) -> Result<Arc<dyn FluentFunction>, FunctionError>;
}

/// Predicate deciding whether a subtype-list custom formatter applies to a
/// probed value.
pub type CustomPredicate = Arc<dyn Fn(&dyn CustomValue) -> bool + Send + Sync>;

/// Immutable, locale-independent set of function factories.
pub struct FunctionRegistry {
    number: Arc<dyn FunctionFactory>,
    temporal: Arc<dyn FunctionFactory>,
    reducer: Arc<dyn FunctionFactory>,
    explicit: IndexMap<String, Arc<dyn FunctionFactory>>,
    custom_exact: FxHashMap<TypeId, Arc<dyn FunctionFactory>>,
    custom_subtype: Vec<(CustomPredicate, Arc<dyn FunctionFactory>)>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("number", &self.number.name())
            .field("temporal", &self.temporal.name())
            .field("reducer", &self.reducer.name())
            .field("explicit", &self.explicit.keys().collect::<Vec<_>>())
            .field("custom_exact", &self.custom_exact.len())
            .field("custom_subtype", &self.custom_subtype.len())
            .finish()
    }
}

impl FunctionRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up an explicit function factory by name.
    pub fn function(&self, name: &str) -> Option<&Arc<dyn FunctionFactory>> {
        self.explicit.get(name)
    }

    /// Whether `name` refers to any factory, explicit or implicit. Used to
    /// validate per-function default options.
    pub fn knows(&self, name: &str) -> bool {
        self.explicit.contains_key(name)
            || name == self.number.name()
            || name == self.temporal.name()
            || name == self.reducer.name()
    }

    pub fn number_factory(&self) -> &Arc<dyn FunctionFactory> {
        &self.number
    }

    pub fn temporal_factory(&self) -> &Arc<dyn FunctionFactory> {
        &self.temporal
    }

    pub fn reducer_factory(&self) -> &Arc<dyn FunctionFactory> {
        &self.reducer
    }

    /// Whether any custom formatter is registered, in either index.
    pub fn has_customs(&self) -> bool {
        !self.custom_exact.is_empty() || !self.custom_subtype.is_empty()
    }

    /// The custom formatter factory for a probed value: exact type first,
    /// then the first matching predicate in registration order.
    pub fn custom_factory_for(&self, value: &dyn CustomValue) -> Option<&Arc<dyn FunctionFactory>> {
        if let Some(factory) = self.custom_exact.get(&value.as_any().type_id()) {
            return Some(factory);
        }
        self.custom_subtype
            .iter()
            .find(|(matches, _)| matches(value))
            .map(|(_, factory)| factory)
    }

    /// Implicit selection: routes a single resolved value to the selection
    /// strategy its type implies.
    pub(crate) fn implicit_select(
        &self,
        values: &[FluentValue],
        select: &SelectExpression,
        scope: &mut Scope,
    ) -> Result<usize, FunctionError> {
        let [value] = values else {
            return Err(FunctionError::InvalidArgument(format!(
                "selector resolved to {} values, expected exactly one",
                values.len()
            )));
        };
        match value {
            FluentValue::Str(text) => Ok(select.match_or_default(text)),
            FluentValue::Error(_) => Ok(select.default_index()),
            FluentValue::Number(_) => self.select_via(&self.number, values, select, scope),
            FluentValue::Temporal(_) => self.select_via(&self.temporal, values, select, scope),
            FluentValue::Custom(custom) => match self.custom_factory_for(custom.as_ref()) {
                Some(factory) => {
                    let instance = scope.instance(factory)?;
                    match instance.as_selector() {
                        Some(selector) => selector.select(values, select, scope),
                        None => Ok(select.match_or_default(&custom.render())),
                    }
                }
                None => Ok(select.match_or_default(&custom.render())),
            },
        }
    }

    fn select_via(
        &self,
        factory: &Arc<dyn FunctionFactory>,
        values: &[FluentValue],
        select: &SelectExpression,
        scope: &mut Scope,
    ) -> Result<usize, FunctionError> {
        let instance = scope.instance(factory)?;
        let selector = instance
            .as_selector()
            .ok_or(FunctionError::Unsupported("selector"))?;
        selector.select(values, select, scope)
    }

    /// Implicit formatting: strings and errors pass through; numbers,
    /// temporals and customs go through their formatter. Function errors
    /// are swallowed into a bracketed marker and recorded in the scope.
    pub(crate) fn implicit_format(&self, value: &FluentValue, scope: &mut Scope) -> String {
        match value {
            FluentValue::Str(s) => s.clone(),
            FluentValue::Error(marker) => marker.clone(),
            FluentValue::Number(_) => self.run_formatter(&self.number, value, scope),
            FluentValue::Temporal(_) => self.run_formatter(&self.temporal, value, scope),
            FluentValue::Custom(custom) => match self.custom_factory_for(custom.as_ref()) {
                Some(factory) => self.run_formatter(factory, value, scope),
                None => custom.render(),
            },
        }
    }

    fn run_formatter(
        &self,
        factory: &Arc<dyn FunctionFactory>,
        value: &FluentValue,
        scope: &mut Scope,
    ) -> String {
        let outcome = scope.instance(factory).and_then(|instance| {
            let formatter = instance
                .as_formatter()
                .ok_or(FunctionError::Unsupported("formatter"))?;
            formatter.format(value, scope)
        });
        match outcome {
            Ok(text) => text,
            Err(err) => {
                let error = ResolutionError::Function {
                    name: factory.name().to_string(),
                    message: err.to_string(),
                };
                let marker = error.marker();
                scope.add_error(error);
                marker
            }
        }
    }

    /// Implicit reduction of a placeable's value list to display text. A
    /// single plain string bypasses the reducer.
    pub(crate) fn reduce(&self, values: &[FluentValue], scope: &mut Scope) -> String {
        if let [FluentValue::Str(s)] = values {
            return s.clone();
        }
        let outcome = scope.instance(&self.reducer).and_then(|instance| {
            let reducer = instance
                .as_reducer()
                .ok_or(FunctionError::Unsupported("reducer"))?;
            reducer.reduce(values, scope)
        });
        match outcome {
            Ok(text) => text,
            Err(err) => {
                let error = ResolutionError::Function {
                    name: self.reducer.name().to_string(),
                    message: err.to_string(),
                };
                let marker = error.marker();
                scope.add_error(error);
                marker
            }
        }
    }
}

impl Default for FunctionRegistry {
    /// The out-of-the-box registry: the default `NUMBER`, `DATETIME` and
    /// `LIST` factories, each also callable explicitly by name.
    fn default() -> Self {
        let number: Arc<dyn FunctionFactory> = Arc::new(crate::functions::NumberFactory);
        let temporal: Arc<dyn FunctionFactory> = Arc::new(crate::functions::TemporalFactory);
        let reducer: Arc<dyn FunctionFactory> = Arc::new(crate::functions::ListFactory);
        let mut explicit = IndexMap::new();
        explicit.insert(number.name().to_string(), number.clone());
        explicit.insert(temporal.name().to_string(), temporal.clone());
        explicit.insert(reducer.name().to_string(), reducer.clone());
        FunctionRegistry {
            number,
            temporal,
            reducer,
            explicit,
            custom_exact: FxHashMap::default(),
            custom_subtype: Vec::new(),
        }
    }
}

/// Builder enforcing the registry invariants: exactly one number factory
/// (which must also select), one temporal factory and one list reducer;
/// unique explicit names; unique exact custom types.
#[derive(Default)]
pub struct RegistryBuilder {
    number: Option<Arc<dyn FunctionFactory>>,
    temporal: Option<Arc<dyn FunctionFactory>>,
    reducer: Option<Arc<dyn FunctionFactory>>,
    explicit: Vec<Arc<dyn FunctionFactory>>,
    custom_exact: Vec<(TypeId, &'static str, Arc<dyn FunctionFactory>)>,
    custom_subtype: Vec<(CustomPredicate, Arc<dyn FunctionFactory>)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The required implicit number formatter. Its instances must also
    /// implement [`Selector`]; plural selection depends on it.
    pub fn number(mut self, factory: Arc<dyn FunctionFactory>) -> Self {
        self.number = Some(factory);
        self
    }

    /// The required implicit temporal formatter.
    pub fn temporal(mut self, factory: Arc<dyn FunctionFactory>) -> Self {
        self.temporal = Some(factory);
        self
    }

    /// The required terminal reducer.
    pub fn reducer(mut self, factory: Arc<dyn FunctionFactory>) -> Self {
        self.reducer = Some(factory);
        self
    }

    /// An explicit, named function callable from placeables.
    pub fn function(mut self, factory: Arc<dyn FunctionFactory>) -> Self {
        self.explicit.push(factory);
        self
    }

    /// A custom formatter dispatched on the exact host type `T`.
    pub fn custom_exact<T: CustomValue + 'static>(
        mut self,
        factory: Arc<dyn FunctionFactory>,
    ) -> Self {
        self.custom_exact
            .push((TypeId::of::<T>(), std::any::type_name::<T>(), factory));
        self
    }

    /// A custom formatter dispatched by predicate, scanned in registration
    /// order after the exact map misses. Register specific predicates
    /// before general ones.
    pub fn custom_matching(
        mut self,
        matches: impl Fn(&dyn CustomValue) -> bool + Send + Sync + 'static,
        factory: Arc<dyn FunctionFactory>,
    ) -> Self {
        self.custom_subtype.push((Arc::new(matches), factory));
        self
    }

    pub fn build(self) -> Result<FunctionRegistry, RegistryError> {
        let number = self.number.ok_or(RegistryError::MissingNumberFactory)?;
        let temporal = self.temporal.ok_or(RegistryError::MissingTemporalFactory)?;
        let reducer = self.reducer.ok_or(RegistryError::MissingReducer)?;

        let mut explicit = IndexMap::new();
        for factory in self.explicit {
            let name = factory.name().to_string();
            if explicit.insert(name.clone(), factory).is_some() {
                return Err(RegistryError::DuplicateFunction(name));
            }
        }

        let mut custom_exact = FxHashMap::default();
        for (type_id, type_name, factory) in self.custom_exact {
            if custom_exact.insert(type_id, factory).is_some() {
                return Err(RegistryError::DuplicateCustomType(type_name.to_string()));
            }
        }

        Ok(FunctionRegistry {
            number,
            temporal,
            reducer,
            explicit,
            custom_exact,
            custom_subtype: self.custom_subtype,
        })
    }
}
