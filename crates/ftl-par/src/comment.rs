//! Comment parsing - `#`, `##` and `###` lines with aggregation.

use ftl_util::error::{ErrorCode, ParseResult};

use crate::ast::{Comment, CommentLevel};
use crate::Parser;

impl Parser<'_> {
    /// Parses a comment starting at a `#` byte.
    ///
    /// The length of the `#` run (1, 2 or 3) is the comment level.
    /// Contiguous lines of the same level aggregate into one comment,
    /// joined with `\n`; a line with a different level ends the
    /// aggregation with the cursor rewound over its `#` run.
    pub(crate) fn parse_comment(&mut self) -> ParseResult<Comment> {
        let start = self.stream.position();
        let depth = self.comment_depth();
        let mut lines = Vec::new();
        loop {
            lines.push(self.comment_line()?);

            let bookmark = self.stream.snapshot();
            if self.comment_depth() != depth {
                // The restore puts the cursor right after the last line of
                // this comment, which is also the span end.
                self.stream.restore(bookmark);
                break;
            }
        }
        // depth is 1..=3 by construction.
        let level = CommentLevel::from_depth(depth).unwrap_or(CommentLevel::Resource);
        Ok(Comment {
            level,
            content: lines.join("\n"),
            span: ftl_util::Span::new(start, self.stream.position()),
        })
    }

    /// Consumes up to three `#` bytes and returns how many were taken.
    fn comment_depth(&mut self) -> usize {
        let mut depth = 0;
        while depth < 3 && self.stream.take_byte_if(b'#') {
            depth += 1;
        }
        depth
    }

    /// Reads the rest of one comment line, cursor just past the `#` run.
    ///
    /// An immediate line end (or EOF) yields an empty line. Otherwise a
    /// single space must separate the markers from the content; its absence
    /// raises `E0003`.
    fn comment_line(&mut self) -> ParseResult<String> {
        if !self.stream.has_remaining() {
            return Ok(String::new());
        }
        if self.stream.is_eol() {
            self.stream.skip_eol();
            return Ok(String::new());
        }
        self.stream.expect_byte(b' ')?;

        let start = self.stream.position();
        self.stream.skip_to_eol();
        let mut end = self.stream.position();
        if end > start && self.stream.at(end - 1) == b'\r' {
            end -= 1;
        }
        let text = self.stream.substring(start, end);
        self.stream.skip_eol();
        Ok(text)
    }
}
