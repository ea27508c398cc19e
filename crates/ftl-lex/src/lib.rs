//! ftl-lex - Lexical Stream Cursor
//!
//! The FTL grammar is whitespace- and indentation-sensitive, so there is no
//! token stream between the bytes and the parser: the parser drives a
//! cursor directly over the input. This crate owns that cursor.
//!
//! [`Stream`] wraps a padded [`ftl_util::Source`] and provides positioned
//! reads, single-byte expectations, the blank-line discipline
//! (`skip_blank_block`, `skip_eol`), error-recovery scans, UTF-8 substring
//! decoding, Unicode escape parsing, and text-slice extraction. All
//! scanning goes through the accelerator implementation selected when the
//! stream is built.

pub mod stream;

#[cfg(test)]
mod edge_cases;

pub use stream::{Stream, StreamSnapshot, TextSlice};
