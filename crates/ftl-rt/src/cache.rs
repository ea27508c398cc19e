//! Keyed memoization of instantiated functions.
//!
//! Keys are `(factory name, options)`. The locale is deliberately not part
//! of the key: a cache belongs to exactly one bundle, and bundles are
//! mono-locale, so sharing a cache across bundles of different locales
//! would serve stale instances.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use unic_langid::LanguageIdentifier;

use crate::errors::FunctionError;
use crate::options::Options;
use crate::registry::{FluentFunction, FunctionFactory};

/// Looks up or creates function instances.
pub trait FunctionCache: Send + Sync + fmt::Debug {
    /// For a cacheable factory, returns the memoized instance for
    /// `(factory.name(), options)`, creating and inserting it on a miss.
    /// Factories with `can_cache() == false` always get a fresh instance.
    fn get_function(
        &self,
        factory: &Arc<dyn FunctionFactory>,
        locale: &LanguageIdentifier,
        options: &Options,
    ) -> Result<Arc<dyn FluentFunction>, FunctionError>;
}

type CacheKey = (String, Options);

/// Bounded LRU cache over an insertion-ordered map: the front entry is the
/// least recently used; hits reinsert at the back. A single lock
/// serializes mutation; contention is acceptable at this cache's scale.
pub struct LruFunctionCache {
    capacity: usize,
    entries: Mutex<IndexMap<CacheKey, Arc<dyn FluentFunction>>>,
}

impl LruFunctionCache {
    pub const DEFAULT_CAPACITY: usize = 32;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(IndexMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for LruFunctionCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for LruFunctionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LruFunctionCache({} of {})",
            self.entries.lock().len(),
            self.capacity
        )
    }
}

impl FunctionCache for LruFunctionCache {
    fn get_function(
        &self,
        factory: &Arc<dyn FunctionFactory>,
        locale: &LanguageIdentifier,
        options: &Options,
    ) -> Result<Arc<dyn FluentFunction>, FunctionError> {
        if !factory.can_cache() {
            return factory.create(locale, options);
        }
        let key = (factory.name().to_string(), options.clone());
        let mut entries = self.entries.lock();
        if let Some(hit) = entries.shift_remove(&key) {
            entries.insert(key, hit.clone());
            return Ok(hit);
        }
        let created = factory.create(locale, options)?;
        if entries.len() >= self.capacity {
            if let Some(((name, _), _)) = entries.shift_remove_index(0) {
                log::trace!("function cache evicted {name}");
            }
        }
        entries.insert(key, created.clone());
        Ok(created)
    }
}

/// The no-op cache: every lookup creates a fresh instance. Baseline for
/// testing and for function sets that are never worth memoizing.
#[derive(Debug, Default)]
pub struct NullFunctionCache;

impl FunctionCache for NullFunctionCache {
    fn get_function(
        &self,
        factory: &Arc<dyn FunctionFactory>,
        locale: &LanguageIdentifier,
        options: &Options,
    ) -> Result<Arc<dyn FluentFunction>, FunctionError> {
        factory.create(locale, options)
    }
}
