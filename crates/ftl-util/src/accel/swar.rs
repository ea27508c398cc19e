//! SWAR implementation: eight bytes per step over a `u64`.
//!
//! Every load reads a full 8-byte lane from the padded buffer, so the
//! [`Source`] pad is load-bearing here: the pad byte `0xFF` matches none of
//! the scanned-for classes, which lets the lane loop run to the logical end
//! without a separate tail path.
//!
//! Byte-class tests use the usual zero-in-word trick: for
//! `x = w ^ broadcast(b)`, the expression `(x - 0x01..01) & !x & 0x80..80`
//! has the high bit of exactly the bytes equal to `b` set. Range tests add a
//! bias so the high bit doubles as a "greater or equal" flag; both operate
//! on the low seven bits with the high bit masked separately, so no
//! per-byte carry can cross a lane.

use super::{Accel, SliceTerm, Source, TextSliceHit};
use crate::ascii::is_alpha;

pub struct SwarAccel;

const LSB: u64 = 0x0101_0101_0101_0101;
const MSB: u64 = 0x8080_8080_8080_8080;

#[inline]
fn load(padded: &[u8], i: usize) -> u64 {
    let mut lane = [0u8; 8];
    lane.copy_from_slice(&padded[i..i + 8]);
    u64::from_le_bytes(lane)
}

/// High bit set in every byte of `w` equal to `b`.
#[inline]
fn eq_mask(w: u64, b: u8) -> u64 {
    let x = w ^ LSB.wrapping_mul(b as u64);
    x.wrapping_sub(LSB) & !x & MSB
}

/// High bit set in every 7-bit byte of `w7` that is `>= lo`.
#[inline]
fn ge_mask7(w7: u64, lo: u8) -> u64 {
    w7.wrapping_add(LSB.wrapping_mul(0x80 - lo as u64)) & MSB
}

/// High bit set in every 7-bit byte of `w7` in `[lo, hi]`.
#[inline]
fn range_mask7(w7: u64, lo: u8, hi: u8) -> u64 {
    ge_mask7(w7, lo) & !ge_mask7(w7, hi + 1)
}

/// High bit set in every byte of `w` that is `[A-Za-z0-9_-]`.
#[inline]
fn id_part_mask(w: u64) -> u64 {
    let high = w & MSB;
    let w7 = w & !MSB;
    let mask = range_mask7(w7, b'A', b'Z')
        | range_mask7(w7, b'a', b'z')
        | range_mask7(w7, b'0', b'9')
        | range_mask7(w7, b'-', b'-')
        | range_mask7(w7, b'_', b'_');
    mask & !high
}

/// Byte index (little-endian) of the lowest set high bit.
#[inline]
fn first_set(mask: u64) -> usize {
    (mask.trailing_zeros() >> 3) as usize
}

impl Accel for SwarAccel {
    fn name(&self) -> &'static str {
        "swar"
    }

    fn next_lf(&self, src: &Source, start: usize) -> usize {
        let padded = src.padded();
        let len = src.len();
        let mut i = start;
        while i < len {
            let m = eq_mask(load(padded, i), b'\n');
            if m != 0 {
                // The pad never matches \n, so the hit is in bounds.
                return i + first_set(m);
            }
            i += 8;
        }
        len
    }

    fn skip_blank_inline(&self, src: &Source, start: usize) -> usize {
        let padded = src.padded();
        let len = src.len();
        let mut i = start;
        while i < len {
            let non = MSB & !eq_mask(load(padded, i), b' ');
            if non != 0 {
                return (i + first_set(non)).min(len);
            }
            i += 8;
        }
        len
    }

    fn skip_blank(&self, src: &Source, start: usize) -> usize {
        let padded = src.padded();
        let len = src.len();
        let mut i = start;
        while i < len {
            let w = load(padded, i);
            let blank = eq_mask(w, b' ') | eq_mask(w, b'\n');
            let non = MSB & !blank;
            if non == 0 {
                i += 8;
                continue;
            }
            let j = i + first_set(non);
            if j >= len {
                return len;
            }
            if padded[j] == b'\r' && src.byte_at(j + 1) == b'\n' {
                i = j + 2;
            } else {
                return j;
            }
        }
        len
    }

    fn is_blank(&self, src: &Source, start: usize, end: usize) -> bool {
        let end = end.min(src.len());
        let padded = src.padded();
        let mut i = start;
        while i < end {
            let w = load(padded, i);
            let blank = eq_mask(w, b' ') | eq_mask(w, b'\n');
            let non = MSB & !blank;
            if non == 0 {
                i += 8;
                continue;
            }
            let j = i + first_set(non);
            if j >= end {
                return true;
            }
            if padded[j] == b'\r' && j + 1 < end && padded[j + 1] == b'\n' {
                i = j + 2;
            } else {
                return false;
            }
        }
        true
    }

    fn identifier_end(&self, src: &Source, start: usize) -> usize {
        let padded = src.padded();
        let len = src.len();
        if start >= len || !is_alpha(padded[start]) {
            return start;
        }
        let mut i = start + 1;
        while i < len {
            let non_id = MSB & !id_part_mask(load(padded, i));
            if non_id != 0 {
                return (i + first_set(non_id)).min(len);
            }
            i += 8;
        }
        len
    }

    fn next_text_slice(&self, src: &Source, start: usize) -> TextSliceHit {
        let padded = src.padded();
        let len = src.len();
        let mut i = start;
        while i < len {
            let w = load(padded, i);
            let m = eq_mask(w, b'\n')
                | eq_mask(w, b'\r')
                | eq_mask(w, b'{')
                | eq_mask(w, b'}');
            if m == 0 {
                i += 8;
                continue;
            }
            let hit = i + first_set(m);
            let term = match padded[hit] {
                b'\n' => SliceTerm::Lf,
                b'{' => SliceTerm::OpenBrace,
                b'}' => SliceTerm::CloseBrace,
                _ => {
                    if src.byte_at(hit + 1) == b'\n' {
                        SliceTerm::CrLf
                    } else {
                        // Bare \r is ordinary text; resume after it.
                        i = hit + 1;
                        continue;
                    }
                }
            };
            return TextSliceHit { pos: hit, term };
        }
        TextSliceHit {
            pos: len,
            term: SliceTerm::Eof,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_mask() {
        let w = u64::from_le_bytes(*b"a\nb\nc\nd\n");
        let m = eq_mask(w, b'\n');
        assert_eq!(first_set(m), 1);
        assert_eq!(m.count_ones(), 4);
    }

    #[test]
    fn test_eq_mask_no_false_positive_on_high_bytes() {
        let w = u64::from_le_bytes([0xFF, 0x8A, 0x0A, 0, 0, 0, 0, 0]);
        let m = eq_mask(w, b'\n');
        assert_eq!(first_set(m), 2);
        assert_eq!(m.count_ones(), 1);
    }

    #[test]
    fn test_id_part_mask() {
        let w = u64::from_le_bytes(*b"aZ9-_. \xFF");
        let m = id_part_mask(w);
        for (idx, expected) in [true, true, true, true, true, false, false, false]
            .iter()
            .enumerate()
        {
            let bit = m & (0x80u64 << (idx * 8)) != 0;
            assert_eq!(bit, *expected, "byte {idx}");
        }
    }

    #[test]
    fn test_next_lf_crosses_lanes() {
        let src = Source::new(b"0123456789abc\ndef");
        assert_eq!(SwarAccel.next_lf(&src, 0), 13);
        assert_eq!(SwarAccel.next_lf(&src, 14), src.len());
    }

    #[test]
    fn test_identifier_end_long() {
        let name = "a".repeat(100);
        let text = format!("{name} rest");
        let src = Source::new(text.as_bytes());
        assert_eq!(SwarAccel.identifier_end(&src, 0), 100);
    }

    #[test]
    fn test_identifier_runs_to_eof() {
        let src = Source::new(b"abc-def");
        assert_eq!(SwarAccel.identifier_end(&src, 0), 7);
    }

    #[test]
    fn test_text_slice_bare_cr_skipped() {
        let src = Source::new(b"a\rb\rc{");
        let hit = SwarAccel.next_text_slice(&src, 0);
        assert_eq!(hit.pos, 5);
        assert_eq!(hit.term, SliceTerm::OpenBrace);
    }
}
