//! ASCII byte classification for the FTL grammar.
//!
//! All predicates are branch-minimized: a single wrapping subtraction and
//! compare instead of paired range checks, so they inline into the scanning
//! loops without jumps.

/// Sentinel byte standing in for "end of input" in error reports.
///
/// `0xFF` can never occur in well-formed UTF-8, so it is safe to use both as
/// the SWAR pad byte and as the EOF marker in diagnostics.
pub const EOF_BYTE: u8 = 0xFF;

/// `[A-Za-z]`
#[inline]
pub const fn is_alpha(b: u8) -> bool {
    (b | 0x20).wrapping_sub(b'a') < 26
}

/// `[a-z]`
#[inline]
pub const fn is_lower(b: u8) -> bool {
    b.wrapping_sub(b'a') < 26
}

/// `[0-9]`
#[inline]
pub const fn is_digit(b: u8) -> bool {
    b.wrapping_sub(b'0') < 10
}

/// `[0-9A-Fa-f]`
#[inline]
pub const fn is_hex(b: u8) -> bool {
    is_digit(b) || (b | 0x20).wrapping_sub(b'a') < 6
}

/// `[A-Za-z0-9_-]`, the identifier continuation set.
#[inline]
pub const fn is_id_part(b: u8) -> bool {
    is_alpha(b) || is_digit(b) || b == b'-' || b == b'_'
}

/// `[A-Z0-9_-]`, the set a function callee name may contain.
#[inline]
pub const fn is_callee_part(b: u8) -> bool {
    b.wrapping_sub(b'A') < 26 || is_digit(b) || b == b'-' || b == b'_'
}

/// Bytes that may open a new syntactic construct at the start of an
/// indented line: `}`, `.`, `[`, `*`. A pattern line beginning with one of
/// these terminates the pattern.
#[inline]
pub const fn is_line_start_glyph(b: u8) -> bool {
    matches!(b, b'}' | b'.' | b'[' | b'*')
}

/// Human-readable description of a byte for diagnostics.
///
/// Printable ASCII renders as `'x' (0x78)`, the EOF sentinel as `EOF`, and
/// anything else as its hex value.
pub fn describe_byte(b: u8) -> String {
    match b {
        EOF_BYTE => "EOF".to_string(),
        0x20..=0x7E => format!("'{}' (0x{:02X})", b as char, b),
        b'\n' => "'\\n' (0x0A)".to_string(),
        b'\r' => "'\\r' (0x0D)".to_string(),
        b'\t' => "'\\t' (0x09)".to_string(),
        _ => format!("0x{b:02X}"),
    }
}
