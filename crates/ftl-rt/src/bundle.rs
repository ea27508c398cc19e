//! The bundle: a locale-scoped, immutable set of messages and terms with
//! its registry and function cache, and the `format` entry points.

use std::fmt;
use std::sync::Arc;

use ftl_par::ast::{Entry, Message, Pattern, Resource, Term};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use unic_langid::LanguageIdentifier;

use crate::cache::{FunctionCache, LruFunctionCache};
use crate::errors::{BundleError, FormatError, ResolutionError};
use crate::options::Options;
use crate::registry::FunctionRegistry;
use crate::resolver;
use crate::scope::Scope;
use crate::value::{FluentArgs, FluentValue};

/// Upper bound on placeable expansions per `format` call, the default for
/// [`BundleBuilder::max_placeables`].
pub const MAX_PLACEABLES: usize = 100;

/// Everything the error consumer learns about a failing `format` call.
#[derive(Debug)]
pub struct ErrorContext<'a> {
    pub message_id: &'a str,
    pub attribute_id: Option<&'a str>,
    pub locale: &'a LanguageIdentifier,
    pub errors: &'a [ResolutionError],
}

type ErrorConsumer = Arc<dyn Fn(&ErrorContext) + Send + Sync>;

/// An immutable, mono-locale collection of messages and terms, ready to
/// format. Built through [`BundleBuilder`]; safe for unrestricted
/// concurrent reads.
pub struct Bundle {
    locale: LanguageIdentifier,
    registry: Arc<FunctionRegistry>,
    cache: Arc<dyn FunctionCache>,
    isolating: bool,
    max_placeables: usize,
    messages: IndexMap<String, Message>,
    terms: IndexMap<String, Term>,
    function_options: FxHashMap<String, Options>,
    error_consumer: Option<ErrorConsumer>,
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("locale", &self.locale)
            .field("messages", &self.messages.len())
            .field("terms", &self.terms.len())
            .field("isolating", &self.isolating)
            .finish()
    }
}

impl Bundle {
    pub fn builder() -> BundleBuilder {
        BundleBuilder::new()
    }

    pub fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    pub fn use_isolation(&self) -> bool {
        self.isolating
    }

    pub fn max_placeables(&self) -> usize {
        self.max_placeables
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    pub fn term(&self, id: &str) -> Option<&Term> {
        self.terms.get(id)
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.values()
    }

    pub(crate) fn registry(&self) -> Arc<FunctionRegistry> {
        self.registry.clone()
    }

    pub(crate) fn cache(&self) -> Arc<dyn FunctionCache> {
        self.cache.clone()
    }

    pub(crate) fn function_options(&self, name: &str) -> Option<&Options> {
        self.function_options.get(name)
    }

    /// Formats a message value. Errors never escape: failing
    /// sub-expressions degrade to inline `{...}` markers and the error
    /// list goes to the registered consumer (or the log).
    ///
    /// # Example
    ///
    /// ```
    /// use ftl_par::parse_default;
    /// use ftl_rt::{Bundle, FluentArgs};
    ///
    /// let resource = parse_default(b"unread = { $n } unread");
    /// let mut builder = Bundle::builder().locale("en".parse().unwrap());
    /// builder.add_resource(&resource).unwrap();
    /// let bundle = builder.build();
    ///
    /// let mut args = FluentArgs::new();
    /// args.set("n", 4);
    /// assert_eq!(bundle.format("unread", &args), "4 unread");
    /// ```
    pub fn format(&self, id: &str, args: &FluentArgs) -> String {
        self.format_impl(id, None, args).0
    }

    /// Formats an attribute of a message.
    pub fn format_attr(&self, id: &str, attribute: &str, args: &FluentArgs) -> String {
        self.format_impl(id, Some(attribute), args).0
    }

    /// Formats a free-standing pattern under this bundle.
    pub fn format_pattern(&self, pattern: &Pattern, args: &FluentArgs) -> String {
        let mut scope = Scope::new(self, Some(args));
        let values = resolver::resolve_pattern(pattern, &mut scope);
        let result = self.registry.reduce(&values, &mut scope);
        let errors = scope.into_errors();
        if !errors.is_empty() {
            self.report("<pattern>", None, &errors);
        }
        result
    }

    /// Starts a fluent formatting request.
    ///
    /// # Example
    ///
    /// ```
    /// use ftl_par::parse_default;
    /// use ftl_rt::Bundle;
    ///
    /// let resource = parse_default(b"hi = Hi, { $name }!");
    /// let mut builder = Bundle::builder().locale("en".parse().unwrap());
    /// builder.add_resource(&resource).unwrap();
    /// let bundle = builder.build();
    ///
    /// let out = bundle
    ///     .format_request("hi")
    ///     .argument("name", "Ada")
    ///     .format();
    /// assert_eq!(out, "Hi, Ada!");
    ///
    /// let fallback = bundle
    ///     .format_request("missing")
    ///     .try_format()
    ///     .unwrap_or_else(|_| "n/a".to_string());
    /// assert_eq!(fallback, "n/a");
    /// ```
    pub fn format_request(&self, id: impl Into<String>) -> FormatRequest<'_> {
        FormatRequest {
            bundle: self,
            id: id.into(),
            attribute: None,
            args: FluentArgs::new(),
        }
    }

    fn format_impl(
        &self,
        id: &str,
        attribute: Option<&str>,
        args: &FluentArgs,
    ) -> (String, Vec<ResolutionError>) {
        let mut scope = Scope::new(self, Some(args));
        let result = match self.message(id) {
            None => {
                let error = ResolutionError::UnknownMessage(id.to_string());
                let marker = error.marker();
                scope.add_error(error);
                marker
            }
            Some(message) => {
                let pattern = match attribute {
                    None => message.value.as_ref(),
                    Some(attr) => message
                        .attributes
                        .iter()
                        .find(|a| a.id.name == attr)
                        .map(|a| &a.value),
                };
                match pattern {
                    Some(pattern) => {
                        let values = resolver::resolve_pattern(pattern, &mut scope);
                        self.registry.reduce(&values, &mut scope)
                    }
                    None => {
                        let error = match attribute {
                            None => ResolutionError::NoValue(id.to_string()),
                            Some(attr) => ResolutionError::UnknownAttribute(
                                id.to_string(),
                                attr.to_string(),
                            ),
                        };
                        let marker = error.marker();
                        scope.add_error(error);
                        marker
                    }
                }
            }
        };
        let errors = scope.into_errors();
        if !errors.is_empty() {
            self.report(id, attribute, &errors);
        }
        (result, errors)
    }

    fn report(&self, id: &str, attribute: Option<&str>, errors: &[ResolutionError]) {
        let context = ErrorContext {
            message_id: id,
            attribute_id: attribute,
            locale: &self.locale,
            errors,
        };
        match &self.error_consumer {
            Some(consumer) => consumer(&context),
            None => log::warn!(
                "formatting '{id}' ({locale}) produced {n} error(s): {errors:?}",
                locale = self.locale,
                n = errors.len(),
            ),
        }
    }
}

/// A fluent, single-use formatting request.
pub struct FormatRequest<'b> {
    bundle: &'b Bundle,
    id: String,
    attribute: Option<String>,
    args: FluentArgs,
}

impl FormatRequest<'_> {
    /// Targets an attribute instead of the message value.
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attribute = Some(name.into());
        self
    }

    /// Binds one argument.
    pub fn argument(mut self, name: impl Into<String>, value: impl Into<FluentValue>) -> Self {
        self.args.set(name, value);
        self
    }

    /// Merges a prepared argument map; its bindings win on collision.
    pub fn arguments(mut self, args: FluentArgs) -> Self {
        self.args.extend(args);
        self
    }

    /// Formats, degrading errors to inline markers.
    pub fn format(self) -> String {
        let (result, _) = self
            .bundle
            .format_impl(&self.id, self.attribute.as_deref(), &self.args);
        result
    }

    /// Formats, failing when any resolution error was recorded. The error
    /// carries the marker-laden output for callers that still want it.
    pub fn try_format(self) -> Result<String, FormatError> {
        let (result, errors) =
            self.bundle
                .format_impl(&self.id, self.attribute.as_deref(), &self.args);
        if errors.is_empty() {
            Ok(result)
        } else {
            Err(FormatError {
                output: result,
                errors,
            })
        }
    }
}

/// Builder for [`Bundle`]. Configuration setters chain by value;
/// resource loading borrows mutably so duplicate-name errors can be
/// handled without losing the builder.
pub struct BundleBuilder {
    locale: LanguageIdentifier,
    registry: Arc<FunctionRegistry>,
    cache: Option<Arc<dyn FunctionCache>>,
    isolating: bool,
    max_placeables: usize,
    messages: IndexMap<String, Message>,
    terms: IndexMap<String, Term>,
    function_options: FxHashMap<String, Options>,
    error_consumer: Option<ErrorConsumer>,
}

impl Default for BundleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self {
            locale: LanguageIdentifier::default(),
            registry: Arc::new(FunctionRegistry::default()),
            cache: None,
            isolating: false,
            max_placeables: MAX_PLACEABLES,
            messages: IndexMap::new(),
            terms: IndexMap::new(),
            function_options: FxHashMap::default(),
            error_consumer: None,
        }
    }

    pub fn locale(mut self, locale: LanguageIdentifier) -> Self {
        self.locale = locale;
        self
    }

    /// Replaces the default function registry. Set this before
    /// [`BundleBuilder::function_options`], which validates names against
    /// the current registry.
    pub fn registry(mut self, registry: Arc<FunctionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn cache(mut self, cache: Arc<dyn FunctionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Enables bidi isolation of risky placeables with FSI/PDI.
    pub fn isolation(mut self, isolating: bool) -> Self {
        self.isolating = isolating;
        self
    }

    /// Overrides the per-call placeable-expansion limit (default 100).
    pub fn max_placeables(mut self, limit: usize) -> Self {
        self.max_placeables = limit.max(1);
        self
    }

    /// Registers the consumer notified with an [`ErrorContext`] whenever a
    /// `format` call records errors. Without one, contexts go to the log.
    pub fn error_consumer(
        mut self,
        consumer: impl Fn(&ErrorContext) + Send + Sync + 'static,
    ) -> Self {
        self.error_consumer = Some(Arc::new(consumer));
        self
    }

    /// Adds a parsed resource. Entries whose names are already taken are
    /// skipped (first wins) and reported together in the returned error;
    /// all other entries are still added.
    pub fn add_resource(&mut self, resource: &Resource) -> Result<(), BundleError> {
        let mut duplicates = Vec::new();
        for entry in &resource.entries {
            match entry {
                Entry::Message(message) => {
                    if self.messages.contains_key(&message.id.name) {
                        duplicates.push(message.id.name.clone());
                    } else {
                        self.messages
                            .insert(message.id.name.clone(), message.clone());
                    }
                }
                Entry::Term(term) => {
                    if self.terms.contains_key(&term.id.name) {
                        duplicates.push(format!("-{}", term.id.name));
                    } else {
                        self.terms.insert(term.id.name.clone(), term.clone());
                    }
                }
                Entry::Comment(_) => {}
            }
        }
        if duplicates.is_empty() {
            Ok(())
        } else {
            Err(BundleError::DuplicateEntries { names: duplicates })
        }
    }

    /// Adds a parsed resource, silently overwriting entries with the same
    /// name.
    pub fn add_resource_overriding(&mut self, resource: &Resource) {
        for entry in &resource.entries {
            match entry {
                Entry::Message(message) => {
                    self.messages
                        .insert(message.id.name.clone(), message.clone());
                }
                Entry::Term(term) => {
                    self.terms.insert(term.id.name.clone(), term.clone());
                }
                Entry::Comment(_) => {}
            }
        }
    }

    /// Default options applied whenever `name` is instantiated, merged
    /// under any call-site options. The name must exist in the registry.
    pub fn function_options(
        &mut self,
        name: impl Into<String>,
        options: Options,
    ) -> Result<(), BundleError> {
        let name = name.into();
        if !self.registry.knows(&name) {
            return Err(BundleError::UnknownFunction(name));
        }
        self.function_options.insert(name, options);
        Ok(())
    }

    pub fn build(self) -> Bundle {
        log::debug!(
            "built bundle for {locale}: {m} message(s), {t} term(s)",
            locale = self.locale,
            m = self.messages.len(),
            t = self.terms.len(),
        );
        Bundle {
            locale: self.locale,
            registry: self.registry,
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(LruFunctionCache::default())),
            isolating: self.isolating,
            max_placeables: self.max_placeables,
            messages: self.messages,
            terms: self.terms,
            function_options: self.function_options,
            error_consumer: self.error_consumer,
        }
    }
}
