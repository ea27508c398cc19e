//! ftl-par - FTL Parser (Syntactic Analyzer)
//!
//! A recursive-descent parser over raw bytes. The FTL grammar is
//! indentation-sensitive, so the parser drives an [`ftl_lex::Stream`]
//! cursor directly instead of consuming a token stream:
//!
//! ```text
//! Resource := (BlankBlock Entry)* BlankBlock EOF
//! Entry    := Comment | Term | Message
//! ```
//!
//! Two modes are supported. [`ParseMode::Default`] skips comments and keeps
//! no junk; [`ParseMode::Extended`] preserves comments (attaching level-1
//! comments to the entry that follows them) and records every skipped byte
//! range as a [`Junk`] node.
//!
//! The parser never gives up on the document: any error inside an entry is
//! collected into the resource and the cursor resynchronizes at the next
//! plausible entry start.

pub mod ast;
mod comment;
mod expr;
mod pattern;

#[cfg(test)]
mod edge_cases;

use ftl_lex::Stream;
use ftl_util::accel::{AccelChoice, Source};
use ftl_util::ascii::is_alpha;
use ftl_util::error::ParseResult;
use ftl_util::Span;

pub use ast::*;
pub use ftl_util::{ErrorCode, ParseError};

/// How much of the input to preserve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Skip comments, record no junk. Errors are still collected.
    #[default]
    Default,
    /// Keep comments and junk nodes.
    Extended,
}

/// Parser configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParseOptions {
    pub mode: ParseMode,
    pub accel: AccelChoice,
}

impl ParseOptions {
    pub fn extended() -> Self {
        Self {
            mode: ParseMode::Extended,
            accel: AccelChoice::Auto,
        }
    }
}

/// Parses a byte buffer into a [`Resource`]. Empty input yields an empty
/// resource; invalid input yields a resource with errors (and junk in
/// extended mode) but parsing itself never fails.
///
/// # Example
///
/// ```
/// use ftl_par::{parse, ParseOptions};
///
/// let resource = parse(b"hello = Hello, world!", ParseOptions::default());
/// assert!(resource.errors.is_empty());
/// assert_eq!(resource.messages().count(), 1);
/// ```
pub fn parse(bytes: &[u8], options: ParseOptions) -> Resource {
    let source = Source::new(bytes);
    Parser::new(&source, options).run()
}

/// [`parse`] with default options.
pub fn parse_default(bytes: &[u8]) -> Resource {
    parse(bytes, ParseOptions::default())
}

pub(crate) struct Parser<'src> {
    pub(crate) stream: Stream<'src>,
    mode: ParseMode,
    errors: Vec<ParseError>,
    junk: Vec<Junk>,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(source: &'src Source, options: ParseOptions) -> Self {
        Self {
            stream: Stream::new(source, options.accel),
            mode: options.mode,
            errors: Vec::new(),
            junk: Vec::new(),
        }
    }

    /// Parses the whole document.
    pub(crate) fn run(mut self) -> Resource {
        let mut entries = Vec::new();

        // A level-1 comment waiting to attach to the entry that follows it.
        let mut pending: Option<Comment> = None;
        let mut blanks_after_pending = 0usize;

        self.stream.skip_blank_block();
        while self.stream.has_remaining() {
            let entry_start = self.stream.position();
            match self.parse_entry() {
                Ok(Some(Entry::Comment(c))) if c.level == CommentLevel::Regular => {
                    if let Some(prev) = pending.take() {
                        entries.push(Entry::Comment(prev));
                    }
                    pending = Some(c);
                }
                Ok(Some(mut entry)) => {
                    if let Some(c) = pending.take() {
                        match (&mut entry, blanks_after_pending <= 1) {
                            (Entry::Message(m), true) => m.comment = Some(c),
                            (Entry::Term(t), true) => t.comment = Some(c),
                            _ => entries.push(Entry::Comment(c)),
                        }
                    }
                    entries.push(entry);
                }
                Ok(None) => {}
                Err(err) => {
                    if let Some(c) = pending.take() {
                        entries.push(Entry::Comment(c));
                    }
                    self.errors.push(err);
                    self.stream.skip_to_next_entry_start();
                    if self.mode == ParseMode::Extended {
                        let span = Span::new(entry_start, self.stream.position());
                        let content = self.stream.substring(span.start, span.end);
                        self.junk.push(Junk { content, span });
                    }
                }
            }
            blanks_after_pending = self.stream.skip_blank_block();
        }
        if let Some(c) = pending.take() {
            entries.push(Entry::Comment(c));
        }

        Resource {
            entries,
            errors: self.errors,
            junk: self.junk,
        }
    }

    /// Parses one entry. `Ok(None)` means a comment was skipped in default
    /// mode.
    fn parse_entry(&mut self) -> ParseResult<Option<Entry>> {
        match self.stream.current() {
            b'#' => {
                if self.mode == ParseMode::Extended {
                    Ok(Some(Entry::Comment(self.parse_comment()?)))
                } else {
                    self.stream.skip_to_eol();
                    Ok(None)
                }
            }
            b'-' => {
                let start = self.stream.position();
                self.stream.inc();
                Ok(Some(Entry::Term(self.parse_term(start)?)))
            }
            b if is_alpha(b) => Ok(Some(Entry::Message(self.parse_message()?))),
            _ => Err(self.stream.error(ErrorCode::E0002, "")),
        }
    }

    /// `id '=' Pattern? Attribute*`, with at least one of pattern and
    /// attributes present.
    fn parse_message(&mut self) -> ParseResult<Message> {
        let start = self.stream.position();
        let id = self.parse_identifier()?;
        self.stream.skip_blank_inline();
        self.stream.expect_byte(b'=')?;

        let value = self.parse_pattern()?;
        let attributes = self.parse_attributes()?;

        if value.is_none() && attributes.is_empty() {
            return Err(self.stream.error(ErrorCode::E0005, &id.name));
        }

        Ok(Message {
            id,
            value,
            attributes,
            comment: None,
            span: Span::new(start, self.stream.position()),
        })
    }

    /// `'-' id '=' Pattern Attribute*`; the leading `-` at `start` has
    /// already been consumed. The pattern is required.
    fn parse_term(&mut self, start: usize) -> ParseResult<Term> {
        let id = self.parse_identifier()?;
        self.stream.skip_blank_inline();
        self.stream.expect_byte(b'=')?;

        let value = match self.parse_pattern()? {
            Some(p) => p,
            None => return Err(self.stream.error(ErrorCode::E0006, &id.name)),
        };
        let attributes = self.parse_attributes()?;

        Ok(Term {
            id,
            value,
            attributes,
            comment: None,
            span: Span::new(start, self.stream.position()),
        })
    }

    /// Zero or more `'.' id '=' Pattern` lines following an entry value.
    fn parse_attributes(&mut self) -> ParseResult<Vec<Attribute>> {
        let mut attributes = Vec::new();
        loop {
            let bookmark = self.stream.snapshot();
            self.stream.skip_blank();
            if !self.stream.is_current(b'.') {
                self.stream.restore(bookmark);
                break;
            }
            let start = self.stream.position();
            self.stream.inc();

            let id = self.parse_identifier()?;
            self.stream.skip_blank_inline();
            self.stream.expect_byte(b'=')?;
            let value = match self.parse_pattern()? {
                Some(p) => p,
                None => return Err(self.stream.error(ErrorCode::E0012, "")),
            };
            attributes.push(Attribute {
                id,
                value,
                span: Span::new(start, self.stream.position()),
            });
        }
        Ok(attributes)
    }

    /// `[A-Za-z][A-Za-z0-9_-]*`, scanned with the stream's accelerator.
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Identifier> {
        let start = self.stream.position();
        let end = self
            .stream
            .accel()
            .identifier_end(self.stream.source(), start);
        if end == start {
            return Err(self.stream.error(ErrorCode::E0004, "a-zA-Z"));
        }
        self.stream.set_position(end);
        Ok(Identifier {
            name: self.stream.substring(start, end),
            span: Span::new(start, end),
        })
    }
}
