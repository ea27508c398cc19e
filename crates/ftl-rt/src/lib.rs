//! ftl-rt - FTL Runtime (Bundle and Resolver)
//!
//! The runtime half of the FTL toolchain: it binds parsed resources into a
//! locale-scoped [`Bundle`] and resolves messages on demand into strings.
//!
//! ```no_run
//! use ftl_par::parse_default;
//! use ftl_rt::{Bundle, FluentArgs};
//!
//! let resource = parse_default(b"hello = Hello there, {$name}!");
//! let mut builder = Bundle::builder().locale("en-US".parse().unwrap());
//! builder.add_resource(&resource).unwrap();
//! let bundle = builder.build();
//!
//! let mut args = FluentArgs::new();
//! args.set("name", "Billy");
//! assert_eq!(bundle.format("hello", &args), "Hello there, Billy!");
//! ```
//!
//! Formatting never fails: unknown references, cyclic entries, function
//! failures and runaway expansion all degrade to inline `{<diagnostic>}`
//! markers while the error list is delivered to the bundle's error
//! consumer (or the log when none is registered).

pub mod bundle;
pub mod cache;
pub mod errors;
pub mod functions;
pub mod options;
pub mod registry;
mod resolver;
pub mod scope;
pub mod value;

pub use bundle::{Bundle, BundleBuilder, ErrorContext, FormatRequest, MAX_PLACEABLES};
pub use cache::{FunctionCache, LruFunctionCache, NullFunctionCache};
pub use errors::{BundleError, FormatError, FunctionError, RegistryError, ResolutionError};
pub use options::{OptionValue, Options};
pub use registry::{
    FluentFunction, FunctionFactory, FunctionRegistry, RegistryBuilder, Selector,
    TerminalReducer, Transform, ValueFormatter,
};
pub use resolver::{FSI, PDI};
pub use scope::Scope;
pub use value::{CustomValue, FluentArgs, FluentNumber, FluentTemporal, FluentValue};
