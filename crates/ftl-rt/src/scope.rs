//! Per-`format`-call resolver state.

use ftl_par::ast::Pattern;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

use crate::bundle::Bundle;
use crate::cache::FunctionCache;
use crate::errors::{FunctionError, ResolutionError};
use crate::options::Options;
use crate::registry::{FluentFunction, FunctionFactory, FunctionRegistry};
use crate::value::{FluentArgs, FluentValue};

/// The mutable state of one `format` call.
///
/// A scope is created per call and discarded at its end. The bundle,
/// registry, cache and argument map are borrowed immutably; the error
/// list, visited-pattern stack, placeable counter and term-local
/// parameters are owned and mutated as resolution proceeds.
pub struct Scope<'b> {
    bundle: &'b Bundle,
    args: Option<&'b FluentArgs>,
    errors: Vec<ResolutionError>,
    /// Identities (addresses) of the patterns currently being resolved.
    visited: Vec<usize>,
    placeables: usize,
    /// Named parameters installed while resolving a term reference.
    locals: Option<FxHashMap<String, Vec<FluentValue>>>,
}

impl<'b> Scope<'b> {
    pub(crate) fn new(bundle: &'b Bundle, args: Option<&'b FluentArgs>) -> Self {
        Self {
            bundle,
            args,
            errors: Vec::new(),
            visited: Vec::new(),
            placeables: 0,
            locals: None,
        }
    }

    pub fn bundle(&self) -> &'b Bundle {
        self.bundle
    }

    pub fn locale(&self) -> &'b LanguageIdentifier {
        self.bundle.locale()
    }

    pub fn registry(&self) -> Arc<FunctionRegistry> {
        self.bundle.registry()
    }

    pub fn cache(&self) -> Arc<dyn FunctionCache> {
        self.bundle.cache()
    }

    pub fn isolating(&self) -> bool {
        self.bundle.use_isolation()
    }

    /// The bundle's default options for a function name.
    pub fn options(&self, name: &str) -> Options {
        self.bundle.function_options(name).cloned().unwrap_or_default()
    }

    /// Defaults merged with call-site options; the call site wins.
    pub fn merged_options(&self, name: &str, over: &Options) -> Options {
        self.options(name).merged(over)
    }

    /// Resolves a variable: call arguments first, then term-local
    /// parameters.
    pub fn lookup(&self, name: &str) -> Option<Vec<FluentValue>> {
        if let Some(values) = self.args.and_then(|a| a.get(name)) {
            return Some(values.to_vec());
        }
        self.locals
            .as_ref()
            .and_then(|locals| locals.get(name))
            .cloned()
    }

    pub fn set_local_params(&mut self, locals: FxHashMap<String, Vec<FluentValue>>) {
        self.locals = if locals.is_empty() {
            None
        } else {
            Some(locals)
        };
    }

    pub fn clear_local_params(&mut self) {
        self.locals = None;
    }

    /// Bumps the placeable counter, failing once the bundle's limit is
    /// exceeded.
    pub fn increment_and_check_placeables(&mut self) -> Result<(), ResolutionError> {
        self.placeables += 1;
        if self.placeables > self.bundle.max_placeables() {
            Err(ResolutionError::TooManyPlaceables(
                self.bundle.max_placeables(),
            ))
        } else {
            Ok(())
        }
    }

    /// Number of placeables expanded so far.
    pub fn placeable_count(&self) -> usize {
        self.placeables
    }

    /// Starts tracking the outermost pattern lazily: the top-level pattern
    /// is pushed only when its first placeable is about to be resolved, so
    /// a re-entry through references can be detected.
    pub fn maybe_track(&mut self, pattern: &Pattern) {
        if self.visited.is_empty() {
            self.visited.push(pattern_identity(pattern));
        }
    }

    /// Resolves `pattern` under cycle tracking. Re-entry into a pattern
    /// already on the stack aborts this branch with a cyclic-reference
    /// marker; other branches are unaffected.
    pub fn track(
        &mut self,
        pattern: &Pattern,
        reference: &str,
        resolve: impl FnOnce(&mut Self) -> Vec<FluentValue>,
    ) -> Vec<FluentValue> {
        let identity = pattern_identity(pattern);
        if self.visited.contains(&identity) {
            let error = ResolutionError::CyclicReference(reference.to_string());
            let marker = error.marker();
            self.add_error(error);
            return vec![FluentValue::Error(marker)];
        }
        self.visited.push(identity);
        let values = resolve(self);
        self.visited.pop();
        values
    }

    pub fn add_error(&mut self, error: ResolutionError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[ResolutionError] {
        &self.errors
    }

    pub(crate) fn into_errors(self) -> Vec<ResolutionError> {
        self.errors
    }

    /// A function instance for `factory` under the bundle's default
    /// options for its name.
    pub(crate) fn instance(
        &self,
        factory: &Arc<dyn FunctionFactory>,
    ) -> Result<Arc<dyn FluentFunction>, FunctionError> {
        let options = self.options(factory.name());
        self.cache().get_function(factory, self.locale(), &options)
    }

    /// A function instance under explicitly merged options.
    pub(crate) fn instance_with(
        &self,
        factory: &Arc<dyn FunctionFactory>,
        options: &Options,
    ) -> Result<Arc<dyn FluentFunction>, FunctionError> {
        self.cache().get_function(factory, self.locale(), options)
    }
}

/// Patterns are tracked by address, not by structure: equivalent patterns
/// from different entries must not collide.
fn pattern_identity(pattern: &Pattern) -> usize {
    pattern as *const Pattern as usize
}
