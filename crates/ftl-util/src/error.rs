//! Parse-error codes and the collected error type.
//!
//! Every syntax error the parser can produce carries a stable code from the
//! `E0001`-`E0032` table. The code is the contract; the message template
//! attached to it may be reworded between releases.

use thiserror::Error;

use crate::ascii::describe_byte;

/// A stable identifier for a class of syntax error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum ErrorCode {
    /// Generic error
    E0001,
    /// Expected an entry start
    E0002,
    /// Expected a specific token
    E0003,
    /// Expected a character from a range
    E0004,
    /// Message must have a value or attributes
    E0005,
    /// Term must have a value
    E0006,
    /// Keyword cannot end with whitespace
    E0007,
    /// Callee must be an upper-case identifier or a term
    E0008,
    /// Argument name must be a simple identifier
    E0009,
    /// Expected a default variant
    E0010,
    /// Expected at least one variant
    E0011,
    /// Expected a value
    E0012,
    /// Expected a variant key
    E0013,
    /// Expected a literal
    E0014,
    /// Only one variant can be the default
    E0015,
    /// Message references cannot be selectors
    E0016,
    /// Terms cannot be selectors
    E0017,
    /// Message attributes cannot be selectors
    E0018,
    /// Term attributes cannot be placeables
    E0019,
    /// Unterminated string literal
    E0020,
    /// Positional argument after a named argument
    E0021,
    /// Duplicate named argument
    E0022,
    /// Invalid variant key
    E0023,
    /// Cannot access variants of a message
    E0024,
    /// Unknown escape sequence
    E0025,
    /// Invalid Unicode escape sequence
    E0026,
    /// Unbalanced closing brace
    E0027,
    /// Expected an inline expression
    E0028,
    /// Expected a simple selector expression
    E0029,
    /// Number literal out of range
    E0030,
    /// Term called with a positional argument
    E0031,
    /// Named argument value must be a literal
    E0032,
}

impl ErrorCode {
    /// The code string, e.g. `"E0019"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E0007 => "E0007",
            ErrorCode::E0008 => "E0008",
            ErrorCode::E0009 => "E0009",
            ErrorCode::E0010 => "E0010",
            ErrorCode::E0011 => "E0011",
            ErrorCode::E0012 => "E0012",
            ErrorCode::E0013 => "E0013",
            ErrorCode::E0014 => "E0014",
            ErrorCode::E0015 => "E0015",
            ErrorCode::E0016 => "E0016",
            ErrorCode::E0017 => "E0017",
            ErrorCode::E0018 => "E0018",
            ErrorCode::E0019 => "E0019",
            ErrorCode::E0020 => "E0020",
            ErrorCode::E0021 => "E0021",
            ErrorCode::E0022 => "E0022",
            ErrorCode::E0023 => "E0023",
            ErrorCode::E0024 => "E0024",
            ErrorCode::E0025 => "E0025",
            ErrorCode::E0026 => "E0026",
            ErrorCode::E0027 => "E0027",
            ErrorCode::E0028 => "E0028",
            ErrorCode::E0029 => "E0029",
            ErrorCode::E0030 => "E0030",
            ErrorCode::E0031 => "E0031",
            ErrorCode::E0032 => "E0032",
        }
    }

    /// The message template. At most one `{}` slot, filled by
    /// [`ErrorCode::message`].
    pub const fn template(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "Generic error: {}",
            ErrorCode::E0002 => "Expected an entry start",
            ErrorCode::E0003 => "Expected token: \"{}\"",
            ErrorCode::E0004 => "Expected a character from range: \"{}\"",
            ErrorCode::E0005 => "Expected message \"{}\" to have a value or attributes",
            ErrorCode::E0006 => "Expected term \"-{}\" to have a value",
            ErrorCode::E0007 => "Keyword cannot end with a whitespace",
            ErrorCode::E0008 => "The callee has to be an upper-case identifier or a term",
            ErrorCode::E0009 => "The argument name has to be a simple identifier",
            ErrorCode::E0010 => "Expected one of the variants to be marked as default (*)",
            ErrorCode::E0011 => "Expected at least one variant after \"->\"",
            ErrorCode::E0012 => "Expected value",
            ErrorCode::E0013 => "Expected variant key",
            ErrorCode::E0014 => "Expected literal",
            ErrorCode::E0015 => "Only one variant can be marked as default (*)",
            ErrorCode::E0016 => "Message references cannot be used as selectors",
            ErrorCode::E0017 => "Terms cannot be used as selectors",
            ErrorCode::E0018 => "Attributes of messages cannot be used as selectors",
            ErrorCode::E0019 => "Attributes of terms cannot be used as placeables",
            ErrorCode::E0020 => "Unterminated string literal",
            ErrorCode::E0021 => "Positional arguments must not follow named arguments",
            ErrorCode::E0022 => "The \"{}\" argument appears twice",
            ErrorCode::E0023 => "Invalid variant key",
            ErrorCode::E0024 => "Cannot access variants of a message",
            ErrorCode::E0025 => "Unknown escape sequence: \\{}",
            ErrorCode::E0026 => "Invalid Unicode escape sequence: {}",
            ErrorCode::E0027 => "Unbalanced closing brace in a text element",
            ErrorCode::E0028 => "Expected an inline expression",
            ErrorCode::E0029 => "Expected a simple expression as selector",
            ErrorCode::E0030 => "Number literal \"{}\" is out of range",
            ErrorCode::E0031 => "Term \"-{}\" accepts named arguments only",
            ErrorCode::E0032 => "Expected a literal value for named argument \"{}\"",
        }
    }

    /// Fills the template's `{}` slot with `arg`. Codes whose template has
    /// no slot ignore the argument.
    pub fn message(self, arg: &str) -> String {
        self.template().replacen("{}", arg, 1)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A syntax error collected into a `Resource`.
///
/// `line` is 1-based; 0 means the error was raised at end of input.
/// `received` describes the byte the parser was looking at, with `0xFF`
/// standing in for EOF.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("[{code}] {message} (line {line}, found {received})")]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub line: u32,
    pub received: String,
}

impl ParseError {
    pub fn new(code: ErrorCode, arg: &str, line: u32, received: u8) -> Self {
        Self {
            code,
            message: code.message(arg),
            line,
            received: describe_byte(received),
        }
    }
}

/// Result alias for parser-internal fallible steps.
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_as_str() {
        assert_eq!(ErrorCode::E0001.as_str(), "E0001");
        assert_eq!(ErrorCode::E0032.as_str(), "E0032");
    }

    #[test]
    fn test_message_fills_slot() {
        assert_eq!(
            ErrorCode::E0003.message("="),
            "Expected token: \"=\"".to_string()
        );
        assert_eq!(
            ErrorCode::E0005.message("greeting"),
            "Expected message \"greeting\" to have a value or attributes"
        );
    }

    #[test]
    fn test_message_without_slot_ignores_arg() {
        assert_eq!(
            ErrorCode::E0012.message("ignored"),
            "Expected value".to_string()
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(ErrorCode::E0003, "=", 3, b'x');
        let shown = err.to_string();
        assert!(shown.contains("E0003"));
        assert!(shown.contains("line 3"));
        assert!(shown.contains("'x' (0x78)"));
    }

    #[test]
    fn test_parse_error_at_eof() {
        let err = ParseError::new(ErrorCode::E0013, "", 0, 0xFF);
        assert_eq!(err.line, 0);
        assert_eq!(err.received, "EOF");
    }
}
