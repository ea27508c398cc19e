//! Pattern parsing - multi-line values with indentation normalization.
//!
//! Patterns are parsed in two stages. The first walks lines and collects
//! placeholders: parsed placeables, and text holders recorded as byte
//! ranges that still include their leading indent. Alongside, it tracks
//! the index of the last non-blank placeholder and the smallest indent of
//! any non-blank line-start text. The second stage materializes the kept
//! placeholders: line-start holders lose the common indent, line-terminated
//! holders regain a normalized `\n`, and the final holder is stripped of
//! trailing whitespace.

use ftl_util::accel::SliceTerm;
use ftl_util::ascii::is_line_start_glyph;
use ftl_util::error::ParseResult;

use crate::ast::{Pattern, PatternElement};
use crate::Parser;

/// Where a text holder sits within its logical line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TextRole {
    /// Same line as the `=` (or `]`) that introduced the pattern.
    InitialLineStart,
    /// First text of a continuation line.
    LineStart,
    /// Text following a placeable or escape on the same line.
    Continuation,
}

/// Collected but not yet materialized pattern content.
enum Holder {
    Text {
        /// Range start, including the measured indent.
        start: usize,
        /// Range end, excluding any line terminator.
        end: usize,
        /// Leading spaces measured at line start.
        indent: usize,
        role: TextRole,
        /// Whether the slice was ended by a line terminator, normalized to
        /// `\n` on materialization.
        line_break: bool,
    },
    Placeable(crate::ast::Expression),
}

impl Parser<'_> {
    /// Parses an optional pattern following `=` or a variant key.
    ///
    /// Returns `None` when there is nothing to parse, e.g. for a message
    /// that only carries attributes; the cursor is then rewound to the
    /// start of the line that ended the pattern.
    pub(crate) fn parse_pattern(&mut self) -> ParseResult<Option<Pattern>> {
        let mut holders: Vec<Holder> = Vec::new();
        let mut last_non_blank: Option<usize> = None;
        let mut common_indent: Option<usize> = None;

        self.stream.skip_blank_inline();
        let mut role = if self.stream.is_eol() {
            self.stream.skip_blank_block_nlc();
            TextRole::LineStart
        } else {
            TextRole::InitialLineStart
        };

        while self.stream.has_remaining() {
            if self.stream.is_current(b'{') {
                let expression = self.parse_placeable()?;
                last_non_blank = Some(holders.len());
                holders.push(Holder::Placeable(expression));
                role = TextRole::Continuation;
                continue;
            }

            let line_start = self.stream.position();
            let mut indent = 0;
            if role == TextRole::LineStart {
                indent = self.stream.skip_blank_inline();
                if !self.stream.has_remaining() {
                    break;
                }
                if indent == 0 {
                    if !self.stream.is_eol() {
                        break;
                    }
                } else if is_line_start_glyph(self.stream.current()) {
                    self.stream.set_position(line_start);
                    break;
                }
            }

            let slice = self.stream.text_slice()?;
            let line_break = matches!(slice.term, SliceTerm::Lf | SliceTerm::CrLf);
            if slice.end > line_start || line_break {
                if role == TextRole::LineStart && !slice.blank {
                    common_indent = Some(common_indent.map_or(indent, |c| c.min(indent)));
                }
                if !slice.blank {
                    last_non_blank = Some(holders.len());
                }
                holders.push(Holder::Text {
                    start: line_start,
                    end: slice.end,
                    indent,
                    role,
                    line_break,
                });
            }
            role = match slice.term {
                SliceTerm::Lf | SliceTerm::CrLf => TextRole::LineStart,
                _ => TextRole::Continuation,
            };
        }

        let Some(last) = last_non_blank else {
            return Ok(None);
        };

        let mut elements: Vec<PatternElement> = Vec::new();
        for (i, holder) in holders.into_iter().take(last + 1).enumerate() {
            match holder {
                Holder::Placeable(expression) => {
                    elements.push(PatternElement::Placeable(expression));
                }
                Holder::Text {
                    start,
                    end,
                    indent,
                    role,
                    line_break,
                } => {
                    let strip = if role == TextRole::LineStart {
                        common_indent.map_or(indent, |c| indent.min(c))
                    } else {
                        0
                    };
                    let mut text = self.stream.substring(start + strip, end);
                    if line_break {
                        text.push('\n');
                    }
                    if i == last {
                        trim_trailing(&mut text);
                    }
                    if text.is_empty() {
                        continue;
                    }
                    if let Some(PatternElement::Text(prev)) = elements.last_mut() {
                        prev.push_str(&text);
                    } else {
                        elements.push(PatternElement::Text(text));
                    }
                }
            }
        }

        Ok(Some(Pattern { elements }))
    }
}

/// Strips trailing pattern whitespace: spaces, line feeds, and any carriage
/// return directly followed by an already-stripped line feed.
fn trim_trailing(text: &mut String) {
    let bytes = text.as_bytes();
    let mut end = bytes.len();
    while end > 0 {
        match bytes[end - 1] {
            b' ' | b'\n' => end -= 1,
            b'\r' if end < bytes.len() && bytes[end] == b'\n' => end -= 1,
            _ => break,
        }
    }
    text.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Entry, Expression};
    use crate::parse_default;

    fn pattern_of(text: &str) -> Pattern {
        let res = parse_default(text.as_bytes());
        assert!(res.errors.is_empty(), "parse errors: {:?}", res.errors);
        match res.entries.into_iter().next() {
            Some(Entry::Message(m)) => m.value.expect("message has a value"),
            other => panic!("expected message, got {other:?}"),
        }
    }

    fn text_of(text: &str) -> String {
        pattern_of(text)
            .elements
            .iter()
            .map(|e| match e {
                PatternElement::Text(t) => t.as_str(),
                PatternElement::Placeable(_) => "{...}",
            })
            .collect()
    }

    #[test]
    fn test_single_line() {
        assert_eq!(text_of("key = Hello"), "Hello");
    }

    #[test]
    fn test_trailing_spaces_trimmed() {
        assert_eq!(text_of("key = Hello   "), "Hello");
    }

    #[test]
    fn test_multiline_dedent() {
        assert_eq!(
            text_of("key =\n    first line\n    second line"),
            "first line\nsecond line"
        );
    }

    #[test]
    fn test_uneven_indent_keeps_relative_depth() {
        assert_eq!(
            text_of("key =\n    first\n      deeper\n    back"),
            "first\n  deeper\nback"
        );
    }

    #[test]
    fn test_initial_line_not_dedented() {
        assert_eq!(text_of("key = first\n    second"), "first\nsecond");
    }

    #[test]
    fn test_blank_interior_line_preserved() {
        assert_eq!(text_of("key =\n    a\n\n    b"), "a\n\nb");
    }

    #[test]
    fn test_crlf_normalized_to_lf() {
        assert_eq!(text_of("key =\r\n    a\r\n    b\r\n"), "a\nb");
    }

    #[test]
    fn test_pattern_ends_at_dedented_line() {
        let res = parse_default(b"key =\n    value\nnext = x");
        assert_eq!(res.entries.len(), 2);
    }

    #[test]
    fn test_pattern_ends_at_attribute_line() {
        let res = parse_default(b"key = value\n    .attr = a");
        let Entry::Message(m) = &res.entries[0] else {
            panic!("expected message");
        };
        assert_eq!(m.attributes.len(), 1);
        assert_eq!(
            m.value.as_ref().unwrap().elements,
            vec![PatternElement::Text("value".to_string())]
        );
    }

    #[test]
    fn test_placeable_line_contributes_no_indent_text() {
        let p = pattern_of("key =\n    { $a }\n    text");
        assert!(matches!(&p.elements[0], PatternElement::Placeable(_)));
        assert_eq!(
            p.elements[1],
            PatternElement::Text("\ntext".to_string())
        );
    }

    #[test]
    fn test_text_around_placeable() {
        let p = pattern_of("key = before { $x } after");
        assert_eq!(p.elements.len(), 3);
        assert_eq!(p.elements[0], PatternElement::Text("before ".to_string()));
        assert!(matches!(
            &p.elements[1],
            PatternElement::Placeable(Expression::VariableReference { id }) if id.name == "x"
        ));
        assert_eq!(p.elements[2], PatternElement::Text(" after".to_string()));
    }

    #[test]
    fn test_adjacent_placeables() {
        let p = pattern_of("key = { $a }{ $b }");
        assert_eq!(p.elements.len(), 2);
        assert!(p
            .elements
            .iter()
            .all(|e| matches!(e, PatternElement::Placeable(_))));
    }

    #[test]
    fn test_trailing_blank_lines_dropped() {
        assert_eq!(text_of("key =\n    value\n\n   \n"), "value");
    }

    #[test]
    fn test_zero_indent_placeable_continues_pattern() {
        let p = pattern_of("key =\n    a\n{ $x }");
        assert_eq!(p.elements.len(), 2);
        assert_eq!(p.elements[0], PatternElement::Text("a\n".to_string()));
    }

    #[test]
    fn test_only_blank_continuation_yields_no_pattern() {
        let res = parse_default(b"key =\n   \n     \nnext = x");
        assert_eq!(res.errors.len(), 1);
        assert_eq!(res.entries.len(), 1);
    }

    #[test]
    fn test_common_indent_ignores_blank_lines() {
        // The deeply indented blank line must not lower the common indent.
        assert_eq!(
            text_of("key =\n    a\n         \n    b"),
            "a\n     \nb"
        );
    }

    #[test]
    fn test_deeper_first_line_keeps_relative_indent() {
        assert_eq!(
            text_of("key =\n        deep\n    shallow"),
            "    deep\nshallow"
        );
    }

    #[test]
    fn test_placeable_at_line_start_after_text() {
        let p = pattern_of("key = start\n{ $x }");
        assert_eq!(p.elements[0], PatternElement::Text("start\n".to_string()));
        assert!(matches!(&p.elements[1], PatternElement::Placeable(_)));
    }

    #[test]
    fn test_multiline_inside_select_variant() {
        let res = parse_default(
            b"key = { $n ->\n   *[other]\n        line one\n        line two\n}\n",
        );
        assert!(res.errors.is_empty(), "{:?}", res.errors);
        let Entry::Message(m) = &res.entries[0] else {
            panic!("expected message");
        };
        let PatternElement::Placeable(Expression::Select(select)) =
            &m.value.as_ref().unwrap().elements[0]
        else {
            panic!("expected select");
        };
        assert_eq!(
            select.variants[0].value.elements,
            vec![PatternElement::Text("line one\nline two".to_string())]
        );
    }

    #[test]
    fn test_trim_trailing_handles_crlf_run() {
        let mut s = "value \r\n\r\n".to_string();
        trim_trailing(&mut s);
        assert_eq!(s, "value");

        // A bare carriage return is content, not whitespace.
        let mut s = "value\r".to_string();
        trim_trailing(&mut s);
        assert_eq!(s, "value\r");
    }
}
