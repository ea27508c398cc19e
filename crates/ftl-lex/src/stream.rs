//! Byte cursor for traversing FTL source.
//!
//! This module provides the `Stream` struct which maintains position state
//! while the parser walks the input. It wraps a padded [`Source`] together
//! with the scanning implementation chosen at construction time; the same
//! implementation is used for the whole parse.
//!
//! Reads past the end of input yield the `0xFF` EOF sentinel rather than
//! panicking, which keeps the lookahead code branch-free.

use ftl_util::accel::{accel_for, Accel, AccelChoice, SliceTerm, Source};
use ftl_util::ascii::{is_alpha, is_hex, EOF_BYTE};
use ftl_util::error::{ErrorCode, ParseError, ParseResult};
use ftl_util::position_to_line;

/// A text run returned by [`Stream::text_slice`].
///
/// `[start, end)` excludes the terminator; for a line-feed or CRLF
/// terminator the cursor has already been advanced past the line break.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextSlice {
    /// Start of the run (inclusive).
    pub start: usize,
    /// End of the run (exclusive of the terminator).
    pub end: usize,
    /// Whether the run contained only blank bytes.
    pub blank: bool,
    /// What ended the run.
    pub term: SliceTerm,
}

/// A cursor over FTL source bytes.
pub struct Stream<'src> {
    src: &'src Source,
    accel: &'static dyn Accel,
    pos: usize,
}

impl<'src> Stream<'src> {
    /// Creates a cursor at position 0 using the given scanning policy.
    ///
    /// # Example
    ///
    /// ```
    /// use ftl_lex::Stream;
    /// use ftl_util::accel::{AccelChoice, Source};
    ///
    /// let src = Source::new(b"key = value");
    /// let stream = Stream::new(&src, AccelChoice::Auto);
    /// assert_eq!(stream.current(), b'k');
    /// ```
    pub fn new(src: &'src Source, choice: AccelChoice) -> Self {
        Self {
            src,
            accel: accel_for(choice),
            pos: 0,
        }
    }

    /// The underlying source.
    #[inline]
    pub fn source(&self) -> &'src Source {
        self.src
    }

    /// The scanning implementation in use.
    #[inline]
    pub fn accel(&self) -> &'static dyn Accel {
        self.accel
    }

    /// Current byte position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Logical input length.
    #[inline]
    pub fn len(&self) -> usize {
        self.src.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.pos < self.src.len()
    }

    /// Byte at an absolute index, or the EOF sentinel past the end.
    #[inline]
    pub fn at(&self, i: usize) -> u8 {
        self.src.byte_at(i)
    }

    /// Byte under the cursor, or the EOF sentinel.
    ///
    /// # Example
    ///
    /// ```
    /// use ftl_lex::Stream;
    /// use ftl_util::accel::{AccelChoice, Source};
    ///
    /// let src = Source::new(b"ab");
    /// let mut stream = Stream::new(&src, AccelChoice::Scalar);
    /// assert_eq!(stream.current(), b'a');
    /// stream.inc();
    /// stream.inc();
    /// assert_eq!(stream.current(), 0xFF);
    /// ```
    #[inline]
    pub fn current(&self) -> u8 {
        self.src.byte_at(self.pos)
    }

    #[inline]
    pub fn is_current(&self, b: u8) -> bool {
        self.current() == b
    }

    #[inline]
    pub fn is_next(&self, b: u8) -> bool {
        self.src.byte_at(self.pos + 1) == b
    }

    /// Advances one byte.
    #[inline]
    pub fn inc(&mut self) {
        self.pos += 1;
    }

    /// Advances `k` bytes.
    #[inline]
    pub fn inc_by(&mut self, k: usize) {
        self.pos += k;
    }

    /// Moves `k` bytes backwards.
    #[inline]
    pub fn dec(&mut self, k: usize) {
        self.pos -= k;
    }

    /// 1-based line of the cursor, 0 at end of input. Diagnostics only.
    pub fn line(&self) -> u32 {
        position_to_line(self.src.as_bytes(), self.pos)
    }

    /// Builds a [`ParseError`] at the cursor position.
    pub fn error(&self, code: ErrorCode, arg: &str) -> ParseError {
        ParseError::new(code, arg, self.line(), self.current())
    }

    /// Consumes `b` or raises `E0003`.
    ///
    /// # Example
    ///
    /// ```
    /// use ftl_lex::Stream;
    /// use ftl_util::accel::{AccelChoice, Source};
    ///
    /// let src = Source::new(b"=x");
    /// let mut stream = Stream::new(&src, AccelChoice::Scalar);
    /// assert!(stream.expect_byte(b'=').is_ok());
    /// assert!(stream.expect_byte(b'=').is_err());
    /// ```
    pub fn expect_byte(&mut self, b: u8) -> ParseResult<()> {
        if self.current() == b {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(ErrorCode::E0003, &(b as char).to_string()))
        }
    }

    /// Consumes `b` if it is the current byte.
    pub fn take_byte_if(&mut self, b: u8) -> bool {
        if self.current() == b {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skips a run of spaces, returning how many were skipped.
    pub fn skip_blank_inline(&mut self) -> usize {
        let end = self.accel.skip_blank_inline(self.src, self.pos);
        let skipped = end - self.pos;
        self.pos = end;
        skipped
    }

    /// Skips spaces, line feeds and CRLF pairs.
    pub fn skip_blank(&mut self) {
        self.pos = self.accel.skip_blank(self.src, self.pos);
    }

    /// Whether the cursor sits on a line terminator (`\n` or `\r\n`).
    pub fn is_eol(&self) -> bool {
        match self.current() {
            b'\n' => true,
            b'\r' => self.is_next(b'\n'),
            _ => false,
        }
    }

    /// Consumes a line terminator if present.
    pub fn skip_eol(&mut self) -> bool {
        match self.current() {
            b'\n' => {
                self.pos += 1;
                true
            }
            b'\r' if self.is_next(b'\n') => {
                self.pos += 2;
                true
            }
            _ => false,
        }
    }

    /// Skips consecutive fully-blank lines, returning how many were
    /// skipped. The cursor ends up at the start of the first line that is
    /// not fully blank (its leading spaces are not consumed).
    ///
    /// # Example
    ///
    /// ```
    /// use ftl_lex::Stream;
    /// use ftl_util::accel::{AccelChoice, Source};
    ///
    /// let src = Source::new(b"\n   \n  next");
    /// let mut stream = Stream::new(&src, AccelChoice::Scalar);
    /// assert_eq!(stream.skip_blank_block(), 2);
    /// assert_eq!(stream.current(), b' ');
    /// ```
    pub fn skip_blank_block(&mut self) -> usize {
        let mut count = 0;
        loop {
            let line_start = self.pos;
            self.skip_blank_inline();
            if !self.skip_eol() {
                self.pos = line_start;
                break;
            }
            count += 1;
        }
        count
    }

    /// [`Stream::skip_blank_block`] without the line count.
    pub fn skip_blank_block_nlc(&mut self) {
        self.skip_blank_block();
    }

    /// Moves the cursor to the next line feed (or end of input) without
    /// consuming it.
    pub fn skip_to_eol(&mut self) {
        self.pos = self.accel.next_lf(self.src, self.pos);
    }

    /// Error recovery: moves to the nearest position, at or after the
    /// cursor, that sits right after a `\n` boundary (or at offset 0) and
    /// holds a plausible entry start (`[A-Za-z]`, `-` or `#`); end of input
    /// otherwise.
    pub fn skip_to_next_entry_start(&mut self) {
        while self.has_remaining() {
            if self.pos == 0 || self.at(self.pos - 1) == b'\n' {
                let b = self.current();
                if is_alpha(b) || b == b'-' || b == b'#' {
                    return;
                }
            }
            let lf = self.accel.next_lf(self.src, self.pos);
            if lf >= self.src.len() {
                self.pos = self.src.len();
                return;
            }
            self.pos = lf + 1;
        }
    }

    /// Decodes `[a, b)` as UTF-8. Ill-formed sequences are replaced rather
    /// than failing; they can only appear in junk regions.
    ///
    /// # Example
    ///
    /// ```
    /// use ftl_lex::Stream;
    /// use ftl_util::accel::{AccelChoice, Source};
    ///
    /// let src = Source::new("né = no".as_bytes());
    /// let stream = Stream::new(&src, AccelChoice::Scalar);
    /// assert_eq!(stream.substring(0, 3), "né");
    /// ```
    pub fn substring(&self, a: usize, b: usize) -> String {
        String::from_utf8_lossy(&self.src.as_bytes()[a..b]).into_owned()
    }

    /// Reads exactly `n` hex digits (`n` is 4 for `\u`, 6 for `\U`) and
    /// returns the scalar value they encode, or raises `E0026`.
    ///
    /// # Example
    ///
    /// ```
    /// use ftl_lex::Stream;
    /// use ftl_util::accel::{AccelChoice, Source};
    ///
    /// let src = Source::new(b"0041");
    /// let mut stream = Stream::new(&src, AccelChoice::Scalar);
    /// assert_eq!(stream.unicode_escape(4).unwrap(), 'A');
    /// ```
    pub fn unicode_escape(&mut self, n: usize) -> ParseResult<char> {
        let start = self.pos;
        let mut value: u32 = 0;
        for _ in 0..n {
            let b = self.current();
            if !is_hex(b) {
                let seen = self.substring(start, self.pos);
                return Err(self.error(ErrorCode::E0026, &seen));
            }
            let digit = match b {
                b'0'..=b'9' => u32::from(b - b'0'),
                b'a'..=b'f' => u32::from(b - b'a' + 10),
                _ => u32::from(b - b'A' + 10),
            };
            value = value * 16 + digit;
            self.pos += 1;
        }
        char::from_u32(value).ok_or_else(|| {
            let seen = self.substring(start, self.pos);
            self.error(ErrorCode::E0026, &seen)
        })
    }

    /// Creates a snapshot of the cursor state for later backtracking.
    ///
    /// # Example
    ///
    /// ```
    /// use ftl_lex::Stream;
    /// use ftl_util::accel::{AccelChoice, Source};
    ///
    /// let src = Source::new(b"abc");
    /// let mut stream = Stream::new(&src, AccelChoice::Scalar);
    /// let snapshot = stream.snapshot();
    /// stream.inc();
    /// stream.restore(snapshot);
    /// assert_eq!(stream.current(), b'a');
    /// ```
    pub fn snapshot(&self) -> StreamSnapshot {
        StreamSnapshot { pos: self.pos }
    }

    /// Restores a previously taken snapshot.
    pub fn restore(&mut self, snapshot: StreamSnapshot) {
        self.pos = snapshot.pos;
    }

    /// Scans a text run up to the next terminator.
    ///
    /// For `Lf` and `CrLf` terminators the cursor is left at the start of
    /// the following line; the returned range excludes the line break. For
    /// `OpenBrace` the cursor is left on the `{`. A stray `}` raises
    /// `E0027`.
    ///
    /// # Example
    ///
    /// ```
    /// use ftl_lex::Stream;
    /// use ftl_util::accel::{AccelChoice, SliceTerm, Source};
    ///
    /// let src = Source::new(b"text { $x }");
    /// let mut stream = Stream::new(&src, AccelChoice::Scalar);
    /// let slice = stream.text_slice().unwrap();
    /// assert_eq!((slice.start, slice.end), (0, 5));
    /// assert_eq!(slice.term, SliceTerm::OpenBrace);
    /// ```
    pub fn text_slice(&mut self) -> ParseResult<TextSlice> {
        let start = self.pos;
        let hit = self.accel.next_text_slice(self.src, start);
        let blank = self.accel.is_blank(self.src, start, hit.pos);
        match hit.term {
            SliceTerm::Lf => self.pos = hit.pos + 1,
            SliceTerm::CrLf => self.pos = hit.pos + 2,
            SliceTerm::OpenBrace => self.pos = hit.pos,
            SliceTerm::Eof => self.pos = self.src.len(),
            SliceTerm::CloseBrace => {
                self.pos = hit.pos;
                return Err(self.error(ErrorCode::E0027, ""));
            }
        }
        Ok(TextSlice {
            start,
            end: hit.pos,
            blank,
            term: hit.term,
        })
    }
}

impl std::fmt::Debug for Stream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stream(pos {} of {}, {})",
            self.pos,
            self.src.len(),
            self.accel.name()
        )
    }
}

/// A saved cursor position, restorable with [`Stream::restore`].
#[derive(Clone, Copy, Debug)]
pub struct StreamSnapshot {
    pos: usize,
}

/// Convenience check used by lookahead code: the EOF sentinel compares
/// unequal to every real input byte.
pub const EOF: u8 = EOF_BYTE;
