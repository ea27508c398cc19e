//! ftl-util - Scanning Primitives and Diagnostics
//!
//! Foundation crate for the FTL toolchain. It owns the two concerns every
//! other crate leans on:
//!
//! - **Byte scanning** ([`accel`]): the hot primitives of the parser
//!   (line-feed search, blank skipping, identifier scan, text-slice
//!   termination) in scalar, SWAR and SIMD variants behind one contract.
//! - **Diagnostics** ([`error`]): the stable `E0001`-`E0032` syntax-error
//!   code table and the [`ParseError`] value collected into parsed
//!   resources.
//!
//! Nothing in this crate allocates on the scanning paths; the only owned
//! buffer is [`Source`], which copies the input once to attach the SWAR
//! pad.

pub mod accel;
pub mod ascii;
pub mod error;
pub mod span;

#[cfg(test)]
mod edge_cases;

pub use accel::{
    accel_for, all_accels, position_to_line, simd_available, Accel, AccelChoice, SliceTerm,
    Source, TextSliceHit,
};
pub use error::{ErrorCode, ParseError, ParseResult};
pub use span::Span;
