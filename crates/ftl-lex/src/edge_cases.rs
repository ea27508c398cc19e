//! Edge case tests for the stream cursor.

use crate::Stream;
use ftl_util::accel::{all_accels, AccelChoice, SliceTerm, Source};
use ftl_util::ErrorCode;

fn stream(src: &Source) -> Stream<'_> {
    Stream::new(src, AccelChoice::Scalar)
}

#[test]
fn test_edge_empty_stream() {
    let src = Source::new(b"");
    let mut s = stream(&src);
    assert!(!s.has_remaining());
    assert!(!s.skip_eol());
    assert_eq!(s.skip_blank_block(), 0);
    s.skip_to_eol();
    assert_eq!(s.position(), 0);
    let slice = s.text_slice().unwrap();
    assert_eq!((slice.start, slice.end), (0, 0));
    assert_eq!(slice.term, SliceTerm::Eof);
    assert!(slice.blank);
}

#[test]
fn test_edge_lone_carriage_returns_are_not_blank_lines() {
    let src = Source::new(b"\r\r\rx");
    let mut s = stream(&src);
    assert_eq!(s.skip_blank_block(), 0);
    assert_eq!(s.position(), 0);
}

#[test]
fn test_edge_blank_block_mixed_terminators() {
    let src = Source::new(b"  \r\n\n   \r\nvalue");
    let mut s = stream(&src);
    assert_eq!(s.skip_blank_block(), 3);
    assert_eq!(s.current(), b'v');
}

#[test]
fn test_edge_text_slice_sequence_walks_lines() {
    let src = Source::new(b"one\ntwo{x}three");
    let mut s = stream(&src);

    let first = s.text_slice().unwrap();
    assert_eq!(s.substring(first.start, first.end), "one");
    assert_eq!(first.term, SliceTerm::Lf);

    let second = s.text_slice().unwrap();
    assert_eq!(s.substring(second.start, second.end), "two");
    assert_eq!(second.term, SliceTerm::OpenBrace);
    assert_eq!(s.current(), b'{');
}

#[test]
fn test_edge_unicode_escape_at_eof() {
    let src = Source::new(b"00");
    let mut s = stream(&src);
    let err = s.unicode_escape(4).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0026);
    // EOF errors report line 0.
    assert_eq!(err.line, 0);
}

#[test]
fn test_edge_unicode_escape_above_scalar_range() {
    let src = Source::new(b"11FFFF");
    let mut s = stream(&src);
    let err = s.unicode_escape(6).unwrap_err();
    assert_eq!(err.code, ErrorCode::E0026);
    assert!(err.message.contains("11FFFF"));
}

#[test]
fn test_edge_error_line_numbers_follow_cursor() {
    let src = Source::new(b"a\nb\nc");
    let mut s = stream(&src);
    s.set_position(4);
    let err = s.error(ErrorCode::E0003, "=");
    assert_eq!(err.line, 3);
    assert!(err.received.contains('c'));
}

#[test]
fn test_edge_substring_multibyte_boundaries() {
    let text = "aé𝄞z";
    let src = Source::new(text.as_bytes());
    let s = stream(&src);
    assert_eq!(s.substring(0, text.len()), text);
    assert_eq!(s.substring(1, 3), "é");
    assert_eq!(s.substring(3, 7), "𝄞");
}

#[test]
fn test_edge_stream_behaves_identically_across_accels() {
    // Walk the same slice sequence with a scalar and a vectorized stream;
    // positions and results must stay in lockstep.
    let text = b"key = line one\n    line two { $x }\n\n# comment\n-next = y";
    let src = Source::new(text);
    assert!(all_accels().len() >= 2);

    let mut scalar = Stream::new(&src, AccelChoice::Scalar);
    let mut auto = Stream::new(&src, AccelChoice::Auto);
    loop {
        assert_eq!(scalar.position(), auto.position());
        if !scalar.has_remaining() {
            break;
        }
        match (scalar.text_slice(), auto.text_slice()) {
            (Ok(a), Ok(b)) => {
                assert_eq!(a, b);
                if a.term == SliceTerm::OpenBrace {
                    scalar.inc();
                    auto.inc();
                }
            }
            (a, b) => {
                assert_eq!(a, b);
                break;
            }
        }
    }
}
