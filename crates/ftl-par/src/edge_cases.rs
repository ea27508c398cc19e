//! Edge case tests for the parser as a whole.

use crate::ast::*;
use crate::{parse, parse_default, ParseOptions};
use ftl_util::ErrorCode;

fn parse_ext(text: &str) -> Resource {
    parse(text.as_bytes(), ParseOptions::extended())
}

fn only_message(res: &Resource) -> &Message {
    let mut messages = res.messages();
    let m = messages.next().expect("one message");
    assert!(messages.next().is_none(), "more than one message");
    m
}

#[test]
fn test_edge_lone_identifier() {
    let res = parse_ext("key");
    assert_eq!(res.errors.len(), 1);
    assert_eq!(res.errors[0].code, ErrorCode::E0003);
    assert_eq!(res.junk.len(), 1);
    assert_eq!(res.junk[0].content, "key");
}

#[test]
fn test_edge_equals_without_pattern_at_eof() {
    let res = parse_ext("key =");
    assert_eq!(res.errors[0].code, ErrorCode::E0005);
}

#[test]
fn test_edge_multiple_errors_collected() {
    let res = parse_ext("a =\nb =\nc = fine\n");
    assert_eq!(res.errors.len(), 2);
    assert_eq!(res.entries.len(), 1);
    assert_eq!(res.junk.len(), 2);
}

#[test]
fn test_edge_error_line_numbers() {
    let res = parse_ext("ok = fine\nbad =\nalso-ok = yes\n");
    assert_eq!(res.errors.len(), 1);
    // The E0005 for `bad` is reported from line 3, where the parser
    // discovered the entry had neither value nor attributes.
    assert_eq!(res.errors[0].line, 3);
}

#[test]
fn test_edge_windows_document() {
    let text = "first = One\r\n\r\nsecond =\r\n    Two lines\r\n    here\r\n";
    let res = parse_default(text.as_bytes());
    assert_eq!(res.entries.len(), 2);
    let Entry::Message(m) = &res.entries[1] else {
        panic!("expected message");
    };
    assert_eq!(
        m.value.as_ref().unwrap().elements,
        vec![PatternElement::Text("Two lines\nhere".to_string())]
    );
}

#[test]
fn test_edge_bom_is_not_an_entry() {
    // A UTF-8 BOM is not valid at entry position; it becomes an error and
    // recovery resumes at the next line.
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"\nkey = v\n");
    let res = parse_default(&bytes);
    assert_eq!(res.errors.len(), 1);
    assert_eq!(res.errors[0].code, ErrorCode::E0002);
    assert_eq!(res.entries.len(), 1);
}

#[test]
fn test_edge_deeply_nested_placeables() {
    let depth = 40;
    let text = format!(
        "k = {}{}{}",
        "{ ".repeat(depth),
        "\"x\"",
        " }".repeat(depth)
    );
    let res = parse_default(text.as_bytes());
    assert!(res.errors.is_empty());
    let m = only_message(&res);
    let mut expr = match &m.value.as_ref().unwrap().elements[0] {
        PatternElement::Placeable(e) => e,
        PatternElement::Text(_) => panic!("expected placeable"),
    };
    let mut unwrapped = 0;
    while let Expression::Placeable(inner) = expr {
        expr = inner;
        unwrapped += 1;
    }
    assert_eq!(unwrapped, depth - 1);
    assert!(matches!(expr, Expression::StringLiteral { .. }));
}

#[test]
fn test_edge_select_inside_variant() {
    let text = "k = { $a ->\n   *[x] { $b ->\n       *[y] deep\n    }\n}\n";
    let res = parse_default(text.as_bytes());
    assert!(res.errors.is_empty(), "{:?}", res.errors);
    let m = only_message(&res);
    let PatternElement::Placeable(Expression::Select(outer)) =
        &m.value.as_ref().unwrap().elements[0]
    else {
        panic!("expected select");
    };
    let inner_pattern = &outer.variants[0].value;
    assert!(matches!(
        inner_pattern.elements[0],
        PatternElement::Placeable(Expression::Select(_))
    ));
}

#[test]
fn test_edge_term_attributes_parse() {
    let res = parse_default(b"-brand = Firefox\n    .gender = masculine\n");
    let term = res.terms().next().expect("term");
    assert_eq!(term.attributes.len(), 1);
    assert_eq!(term.attributes[0].id.name, "gender");
}

#[test]
fn test_edge_unicode_text_survives() {
    let res = parse_default("emoji = 👍 works\n".as_bytes());
    let m = only_message(&res);
    assert_eq!(
        m.value.as_ref().unwrap().elements,
        vec![PatternElement::Text("👍 works".to_string())]
    );
}

#[test]
fn test_edge_stray_close_brace_in_text() {
    let res = parse_ext("bad = closing } here\nok = fine\n");
    assert_eq!(res.errors[0].code, ErrorCode::E0027);
    assert_eq!(res.entries.len(), 1);
}

#[test]
fn test_edge_junk_content_covers_failed_entry() {
    let res = parse_ext("bad = { $x\nok = fine\n");
    assert_eq!(res.junk.len(), 1);
    assert_eq!(res.junk[0].content, "bad = { $x\n");
}

#[test]
fn test_edge_comment_then_junk_then_entry() {
    let res = parse_ext("# note\n= broken\nkey = v\n");
    // The pending comment cannot attach across junk; it stays standalone.
    assert!(matches!(&res.entries[0], Entry::Comment(_)));
    let Entry::Message(m) = &res.entries[1] else {
        panic!("expected message");
    };
    assert!(m.comment.is_none());
}

#[test]
fn test_edge_cr_only_is_not_a_line_break() {
    // A lone \r neither terminates the line nor counts as blank.
    let res = parse_default(b"key = a\rb\n");
    let m = only_message(&res);
    assert_eq!(
        m.value.as_ref().unwrap().elements,
        vec![PatternElement::Text("a\rb".to_string())]
    );
}

#[test]
fn test_edge_empty_resource_roundtrip_values() {
    for text in ["", "\n", "\r\n", "   ", "\n\n\n"] {
        let res = parse_default(text.as_bytes());
        assert!(res.entries.is_empty());
        assert!(res.errors.is_empty());
    }
}

#[test]
fn test_spans_roundtrip_to_source_text() {
    let text = "key-one = A { $var } B { NUMBER(42, digits: 7) }\n    .attr = x\n-term = T\n";
    let bytes = text.as_bytes();
    let res = parse_default(bytes);
    assert!(res.errors.is_empty(), "{:?}", res.errors);

    let m = res.messages().next().unwrap();
    assert_eq!(m.id.span.slice(bytes), b"key-one");
    assert_eq!(m.span.start, 0);
    assert_eq!(&text[m.span.start..m.span.end], &text[..m.span.end]);

    let attr = &m.attributes[0];
    assert_eq!(attr.id.span.slice(bytes), b"attr");
    assert!(text[attr.span.start..attr.span.end].starts_with(".attr"));

    let t = res.terms().next().unwrap();
    assert_eq!(t.id.span.slice(bytes), b"term");
    assert!(text[t.span.start..t.span.end].starts_with("-term"));

    // Number literals record the exact token range.
    let pattern = m.value.as_ref().unwrap();
    let call = pattern
        .elements
        .iter()
        .find_map(|e| match e {
            PatternElement::Placeable(Expression::FunctionReference { arguments, .. }) => {
                Some(arguments)
            }
            _ => None,
        })
        .expect("function call");
    let Expression::NumberLiteral(n) = &call.positional[0] else {
        panic!("expected number literal");
    };
    assert_eq!(n.span.slice(bytes), b"42");
    assert_eq!(n.raw.as_bytes(), n.span.slice(bytes));
    let Expression::NumberLiteral(named) = &call.named[0].value else {
        panic!("expected number literal");
    };
    assert_eq!(named.span.slice(bytes), b"7");
}

#[test]
fn test_junk_span_covers_skipped_bytes() {
    let text = "ok = fine\nbad = { $x\nnext = yes\n";
    let res = parse_ext(text);
    assert_eq!(res.junk.len(), 1);
    let junk = &res.junk[0];
    assert_eq!(
        &text[junk.span.start..junk.span.end],
        junk.content.as_str()
    );
    assert_eq!(junk.content, "bad = { $x\n");
}

#[test]
fn test_identifier_equality_ignores_span() {
    let a = parse_default(b"same = 1\n");
    let b = parse_default(b"\n\nsame = 1\n");
    let id_a = &a.messages().next().unwrap().id;
    let id_b = &b.messages().next().unwrap().id;
    assert_ne!(id_a.span, id_b.span);
    assert_eq!(id_a, id_b);
}

mod properties {
    use crate::{parse, ParseMode, ParseOptions};
    use ftl_util::accel::AccelChoice;
    use proptest::prelude::*;

    /// Bytes weighted toward FTL's significant characters so the generator
    /// actually reaches the interesting parser states.
    fn ftl_byte() -> impl Strategy<Value = u8> {
        prop_oneof![
            Just(b'='),
            Just(b'{'),
            Just(b'}'),
            Just(b'['),
            Just(b']'),
            Just(b'*'),
            Just(b'-'),
            Just(b'>'),
            Just(b'#'),
            Just(b'.'),
            Just(b'$'),
            Just(b'"'),
            Just(b'\\'),
            Just(b'\n'),
            Just(b'\r'),
            Just(b' '),
            Just(b'a'),
            Just(b'Z'),
            Just(b'1'),
            any::<u8>(),
        ]
    }

    proptest! {
        /// The parser is total: arbitrary bytes never panic and never
        /// produce junk in default mode.
        #[test]
        fn prop_parser_is_total(bytes in proptest::collection::vec(ftl_byte(), 0..300)) {
            let res = parse(&bytes, ParseOptions::default());
            prop_assert!(res.junk.is_empty());
            let _ = parse(&bytes, ParseOptions::extended());
        }

        /// Every implementation choice yields the same resource.
        #[test]
        fn prop_accel_choices_agree(bytes in proptest::collection::vec(ftl_byte(), 0..200)) {
            let scalar = parse(&bytes, ParseOptions {
                mode: ParseMode::Extended,
                accel: AccelChoice::Scalar,
            });
            for accel in [AccelChoice::Simd, AccelChoice::Auto] {
                let other = parse(&bytes, ParseOptions { mode: ParseMode::Extended, accel });
                prop_assert_eq!(&scalar, &other);
            }
        }

        /// Extended-mode junk regions tile exactly over the bytes the
        /// parser gave up on, so junk plus entries never lose input.
        #[test]
        fn prop_junk_spans_match_content(bytes in proptest::collection::vec(ftl_byte(), 0..200)) {
            let res = parse(&bytes, ParseOptions::extended());
            for junk in &res.junk {
                prop_assert!(junk.span.end <= bytes.len());
                let expected = String::from_utf8_lossy(&bytes[junk.span.start..junk.span.end]);
                prop_assert_eq!(&junk.content, &expected);
            }
        }
    }
}

#[test]
fn test_edge_dedent_is_idempotent() {
    // Re-serializing a dedented pattern with a fixed 4-space indent and
    // parsing it again yields the same pattern.
    let text = "k =\n    first\n      second\n    { $x } tail\n";
    let first = parse_default(text.as_bytes());
    let pattern = only_message(&first).value.clone().unwrap();

    let mut rendered = String::from("k =\n    ");
    for element in &pattern.elements {
        match element {
            PatternElement::Text(t) => rendered.push_str(&t.replace('\n', "\n    ")),
            PatternElement::Placeable(_) => rendered.push_str("{ $x }"),
        }
    }
    rendered.push('\n');

    let second = parse_default(rendered.as_bytes());
    let reparsed = only_message(&second).value.clone().unwrap();
    assert_eq!(pattern, reparsed);
}
