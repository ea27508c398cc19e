//! Runtime error types.
//!
//! Resolution errors never escape a `format` call: they are collected into
//! the scope and substituted inline as `{<diagnostic>}` markers. Builder
//! errors, by contrast, are configuration-time failures and are returned to
//! the caller.

use thiserror::Error;

/// A non-fatal error recorded while resolving a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Unknown variable: ${0}")]
    UnknownVariable(String),

    #[error("Unknown message: {0}")]
    UnknownMessage(String),

    #[error("Unknown term: -{0}")]
    UnknownTerm(String),

    /// Unknown attribute on a known message or term; the first field is the
    /// entry reference as written (`msg` or `-term`).
    #[error("Unknown attribute: {0}.{1}")]
    UnknownAttribute(String, String),

    #[error("No pattern specified for message: '{0}'")]
    NoValue(String),

    #[error("Unknown function: {0}()")]
    UnknownFunction(String),

    #[error("Cyclic dependency: {0}")]
    CyclicReference(String),

    #[error("Too many placeables (limit {0})")]
    TooManyPlaceables(usize),

    /// A selector that did not resolve to a single selectable value.
    #[error("Invalid selector: {0}")]
    Selector(String),

    /// A function raised or produced an error.
    #[error("{name}(): {message}")]
    Function { name: String, message: String },
}

impl ResolutionError {
    /// The inline marker substituted for the failing sub-expression.
    pub fn marker(&self) -> String {
        match self {
            ResolutionError::UnknownVariable(name) => format!("{{${name}}}"),
            ResolutionError::UnknownMessage(id) => format!("{{{id}}}"),
            ResolutionError::UnknownTerm(id) => format!("{{-{id}}}"),
            ResolutionError::UnknownAttribute(entry, attr) => format!("{{{entry}.{attr}}}"),
            ResolutionError::UnknownFunction(name) => format!("{{{name}()}}"),
            other => format!("{{{other}}}"),
        }
    }
}

/// An error produced by a function factory or instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    /// The instance does not provide the requested capability.
    #[error("not callable as a {0}")]
    Unsupported(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported locale: {0}")]
    Locale(String),

    #[error("{0}")]
    Message(String),
}

/// A configuration-time failure raised by the registry builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a number function factory is required")]
    MissingNumberFactory,

    #[error("a temporal function factory is required")]
    MissingTemporalFactory,

    #[error("a list reducer factory is required")]
    MissingReducer,

    #[error("duplicate function name: {0}")]
    DuplicateFunction(String),

    #[error("duplicate custom formatter for type: {0}")]
    DuplicateCustomType(String),
}

/// A configuration-time failure raised by the bundle builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleError {
    /// `add_resource` found entries whose names are already taken. The
    /// first occurrence of each name wins; the duplicates are skipped.
    #[error("duplicate entries: {}", .names.join(", "))]
    DuplicateEntries { names: Vec<String> },

    /// `function_options` was called with a name the registry does not
    /// know.
    #[error("unknown function name: {0}")]
    UnknownFunction(String),
}

/// The failure surfaced by `try_format` when resolution recorded errors or
/// the requested message does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("formatting produced {} error(s): {}", .errors.len(), .output)]
pub struct FormatError {
    /// The formatted output with inline markers, still usable as a
    /// fallback.
    pub output: String,
    pub errors: Vec<ResolutionError>,
}
