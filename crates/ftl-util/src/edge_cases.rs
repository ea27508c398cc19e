//! Edge case and equivalence tests for the scanning implementations.
//!
//! The scalar implementation is the ground truth; every vectorized variant
//! must agree with it on every input, including adversarial ones built
//! around lane boundaries.

use crate::accel::{all_accels, Source};

fn check_all_ops(bytes: &[u8]) {
    let src = Source::new(bytes);
    let accels = all_accels();
    let (reference, rest) = accels.split_first().expect("at least one impl");
    for start in 0..=bytes.len() {
        let lf = reference.next_lf(&src, start);
        let inline = reference.skip_blank_inline(&src, start);
        let blank = reference.skip_blank(&src, start);
        let ident = reference.identifier_end(&src, start);
        let slice = reference.next_text_slice(&src, start);
        let is_blank_full = reference.is_blank(&src, start, bytes.len());
        for accel in rest {
            let name = accel.name();
            assert_eq!(accel.next_lf(&src, start), lf, "{name}: next_lf @ {start}");
            assert_eq!(
                accel.skip_blank_inline(&src, start),
                inline,
                "{name}: skip_blank_inline @ {start}"
            );
            assert_eq!(
                accel.skip_blank(&src, start),
                blank,
                "{name}: skip_blank @ {start}"
            );
            assert_eq!(
                accel.identifier_end(&src, start),
                ident,
                "{name}: identifier_end @ {start}"
            );
            assert_eq!(
                accel.next_text_slice(&src, start),
                slice,
                "{name}: next_text_slice @ {start}"
            );
            assert_eq!(
                accel.is_blank(&src, start, bytes.len()),
                is_blank_full,
                "{name}: is_blank @ {start}"
            );
        }
    }
}

#[test]
fn test_edge_empty() {
    check_all_ops(b"");
}

#[test]
fn test_edge_all_spaces() {
    check_all_ops(&[b' '; 67]);
}

#[test]
fn test_edge_all_linefeeds() {
    check_all_ops(&[b'\n'; 67]);
}

#[test]
fn test_edge_all_carriage_returns() {
    check_all_ops(&[b'\r'; 67]);
}

#[test]
fn test_edge_interleaved_cr_lf() {
    let mut v = Vec::new();
    for i in 0..64 {
        v.push(if i % 2 == 0 { b'\r' } else { b'\n' });
    }
    check_all_ops(&v);
}

#[test]
fn test_edge_crlf_on_every_lane_offset() {
    for offset in 0..24 {
        let mut v = vec![b'a'; offset];
        v.extend_from_slice(b"\r\n");
        v.extend_from_slice(b"rest of the line with { and } braces");
        check_all_ops(&v);
    }
}

#[test]
fn test_edge_identifier_exactly_at_lane_boundaries() {
    for n in [7, 8, 9, 15, 16, 17, 31, 32, 33] {
        let mut v = vec![b'x'; n];
        v.push(b'!');
        check_all_ops(&v);
    }
}

#[test]
fn test_edge_high_bytes_are_not_identifier_parts() {
    check_all_ops("idé-suffix plus ünïcode".as_bytes());
    check_all_ops(&[b'a', 0x80, 0xC3, 0xA9, b'b']);
}

#[test]
fn test_edge_trailing_cr() {
    check_all_ops(b"line \r");
    check_all_ops(b"line \r\n");
    check_all_ops(b"blank only      \r");
}

#[test]
fn test_edge_ftl_shaped_input() {
    check_all_ops(b"hello = Hello, { $name }!\n    .attr = Value\n\n# comment\n");
}

mod properties {
    use super::check_all_ops;
    use crate::accel::{position_to_line, Source};
    use crate::all_accels;
    use proptest::prelude::*;

    /// Bytes weighted toward the characters the scanners branch on.
    fn scan_byte() -> impl Strategy<Value = u8> {
        prop_oneof![
            Just(b' '),
            Just(b'\n'),
            Just(b'\r'),
            Just(b'{'),
            Just(b'}'),
            Just(b'a'),
            Just(b'Z'),
            Just(b'-'),
            Just(b'_'),
            Just(b'0'),
            any::<u8>(),
        ]
    }

    proptest! {
        #[test]
        fn prop_accelerators_agree(bytes in proptest::collection::vec(scan_byte(), 0..200)) {
            check_all_ops(&bytes);
        }

        #[test]
        fn prop_is_blank_agrees_on_subranges(
            bytes in proptest::collection::vec(scan_byte(), 0..64),
            a in 0usize..64,
            b in 0usize..64,
        ) {
            let src = Source::new(&bytes);
            let start = a.min(bytes.len());
            let end = b.min(bytes.len());
            let accels = all_accels();
            let expected = accels[0].is_blank(&src, start, end);
            for accel in &accels[1..] {
                prop_assert_eq!(accel.is_blank(&src, start, end), expected, "{}", accel.name());
            }
        }

        #[test]
        fn prop_position_to_line_counts_linefeeds(
            bytes in proptest::collection::vec(scan_byte(), 0..128),
            pos in 0usize..128,
        ) {
            let line = position_to_line(&bytes, pos);
            if pos >= bytes.len() {
                prop_assert_eq!(line, 0);
            } else {
                let expected = 1 + bytes[..pos].iter().filter(|&&b| b == b'\n').count() as u32;
                prop_assert_eq!(line, expected);
            }
        }

        #[test]
        fn prop_results_are_total_and_monotonic(bytes in proptest::collection::vec(scan_byte(), 0..100)) {
            let src = Source::new(&bytes);
            for accel in all_accels() {
                for start in 0..=bytes.len() {
                    let lf = accel.next_lf(&src, start);
                    prop_assert!(lf >= start && lf <= bytes.len());
                    let blank = accel.skip_blank(&src, start);
                    prop_assert!(blank >= start && blank <= bytes.len());
                    let ident = accel.identifier_end(&src, start);
                    prop_assert!(ident >= start && ident <= bytes.len());
                    let hit = accel.next_text_slice(&src, start);
                    prop_assert!(hit.pos >= start && hit.pos <= bytes.len());
                }
            }
        }
    }
}
