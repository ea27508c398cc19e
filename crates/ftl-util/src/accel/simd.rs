//! SSE2 implementation: sixteen bytes per step.
//!
//! SSE2 is part of the x86_64 baseline, so no runtime feature probe is
//! needed on this architecture. Unlike the SWAR lanes this implementation
//! never reads past the logical end: full 16-byte chunks are scanned with
//! vector compares and the sub-chunk tail falls back to the scalar code,
//! which is the portable equivalent of an in-range lane mask.

use std::arch::x86_64::{
    __m128i, _mm_and_si128, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_max_epu8, _mm_min_epu8,
    _mm_movemask_epi8, _mm_or_si128, _mm_set1_epi8,
};

use super::scalar::ScalarAccel;
use super::{Accel, SliceTerm, Source, TextSliceHit};
use crate::ascii::is_alpha;

pub struct SimdAccel;

const LANES: usize = 16;

#[inline]
unsafe fn load(ptr: *const u8) -> __m128i {
    _mm_loadu_si128(ptr.cast::<__m128i>())
}

/// Bitmask (bit k = byte k) of bytes equal to `b`.
#[inline]
unsafe fn eq_mask(v: __m128i, b: u8) -> u32 {
    _mm_movemask_epi8(_mm_cmpeq_epi8(v, _mm_set1_epi8(b as i8))) as u32
}

/// Bitmask of bytes in `[lo, hi]`, compared as unsigned.
#[inline]
unsafe fn range_mask(v: __m128i, lo: u8, hi: u8) -> u32 {
    let ge = _mm_cmpeq_epi8(_mm_max_epu8(v, _mm_set1_epi8(lo as i8)), v);
    let le = _mm_cmpeq_epi8(_mm_min_epu8(v, _mm_set1_epi8(hi as i8)), v);
    _mm_movemask_epi8(_mm_and_si128(ge, le)) as u32
}

/// Bitmask of bytes in `[A-Za-z0-9_-]`. Unsigned range compares reject
/// UTF-8 continuation bytes without a separate high-bit mask.
#[inline]
unsafe fn id_part_mask(v: __m128i) -> u32 {
    range_mask(v, b'A', b'Z')
        | range_mask(v, b'a', b'z')
        | range_mask(v, b'0', b'9')
        | eq_mask(v, b'-')
        | eq_mask(v, b'_')
}

/// Bitmask of bytes equal to space or line feed.
#[inline]
unsafe fn blank_mask(v: __m128i) -> u32 {
    _mm_movemask_epi8(_mm_or_si128(
        _mm_cmpeq_epi8(v, _mm_set1_epi8(b' ' as i8)),
        _mm_cmpeq_epi8(v, _mm_set1_epi8(b'\n' as i8)),
    )) as u32
}

/// First index in `[i, end)` whose byte is neither space nor line feed, or
/// `end`.
fn first_non_blankish(bytes: &[u8], mut i: usize, end: usize) -> usize {
    while i + LANES <= end {
        // SAFETY: i + 16 <= end <= bytes.len(), so the 16-byte load is in
        // bounds.
        let non = unsafe { !blank_mask(load(bytes.as_ptr().add(i))) & 0xFFFF };
        if non != 0 {
            return i + non.trailing_zeros() as usize;
        }
        i += LANES;
    }
    while i < end && (bytes[i] == b' ' || bytes[i] == b'\n') {
        i += 1;
    }
    i
}

impl Accel for SimdAccel {
    fn name(&self) -> &'static str {
        "simd"
    }

    fn next_lf(&self, src: &Source, start: usize) -> usize {
        let bytes = src.as_bytes();
        let len = bytes.len();
        let mut i = start;
        while i + LANES <= len {
            // SAFETY: i + 16 <= len keeps the load within `bytes`.
            let m = unsafe { eq_mask(load(bytes.as_ptr().add(i)), b'\n') };
            if m != 0 {
                return i + m.trailing_zeros() as usize;
            }
            i += LANES;
        }
        while i < len && bytes[i] != b'\n' {
            i += 1;
        }
        i
    }

    fn skip_blank_inline(&self, src: &Source, start: usize) -> usize {
        let bytes = src.as_bytes();
        let len = bytes.len();
        let mut i = start;
        while i + LANES <= len {
            // SAFETY: i + 16 <= len keeps the load within `bytes`.
            let non = unsafe { !eq_mask(load(bytes.as_ptr().add(i)), b' ') & 0xFFFF };
            if non != 0 {
                return i + non.trailing_zeros() as usize;
            }
            i += LANES;
        }
        while i < len && bytes[i] == b' ' {
            i += 1;
        }
        i
    }

    fn skip_blank(&self, src: &Source, start: usize) -> usize {
        let bytes = src.as_bytes();
        let len = bytes.len();
        let mut i = start;
        loop {
            let j = first_non_blankish(bytes, i, len);
            if j >= len {
                return len;
            }
            if bytes[j] == b'\r' && src.byte_at(j + 1) == b'\n' {
                i = j + 2;
            } else {
                return j;
            }
        }
    }

    fn is_blank(&self, src: &Source, start: usize, end: usize) -> bool {
        let end = end.min(src.len());
        let bytes = src.as_bytes();
        let mut i = start;
        loop {
            let j = first_non_blankish(bytes, i, end);
            if j >= end {
                return true;
            }
            if bytes[j] == b'\r' && j + 1 < end && bytes[j + 1] == b'\n' {
                i = j + 2;
            } else {
                return false;
            }
        }
    }

    fn identifier_end(&self, src: &Source, start: usize) -> usize {
        let bytes = src.as_bytes();
        let len = bytes.len();
        if start >= len || !is_alpha(bytes[start]) {
            return start;
        }
        let mut i = start + 1;
        while i + LANES <= len {
            // SAFETY: i + 16 <= len keeps the load within `bytes`.
            let non = unsafe { !id_part_mask(load(bytes.as_ptr().add(i))) & 0xFFFF };
            if non != 0 {
                return i + non.trailing_zeros() as usize;
            }
            i += LANES;
        }
        while i < len && crate::ascii::is_id_part(bytes[i]) {
            i += 1;
        }
        i
    }

    fn next_text_slice(&self, src: &Source, start: usize) -> TextSliceHit {
        let bytes = src.as_bytes();
        let len = bytes.len();
        let mut i = start;
        loop {
            let mut candidate = None;
            while i + LANES <= len {
                // SAFETY: i + 16 <= len keeps the load within `bytes`.
                let m = unsafe {
                    let v = load(bytes.as_ptr().add(i));
                    eq_mask(v, b'\n') | eq_mask(v, b'\r') | eq_mask(v, b'{') | eq_mask(v, b'}')
                };
                if m != 0 {
                    candidate = Some(i + m.trailing_zeros() as usize);
                    break;
                }
                i += LANES;
            }
            let Some(hit) = candidate else {
                return ScalarAccel.next_text_slice(src, i);
            };
            let term = match bytes[hit] {
                b'\n' => SliceTerm::Lf,
                b'{' => SliceTerm::OpenBrace,
                b'}' => SliceTerm::CloseBrace,
                _ => {
                    if src.byte_at(hit + 1) == b'\n' {
                        SliceTerm::CrLf
                    } else {
                        i = hit + 1;
                        continue;
                    }
                }
            };
            return TextSliceHit { pos: hit, term };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_lf_in_chunk_and_tail() {
        let src = Source::new(b"0123456789abcdef0\nx");
        assert_eq!(SimdAccel.next_lf(&src, 0), 17);
        let src = Source::new(b"short\n");
        assert_eq!(SimdAccel.next_lf(&src, 0), 5);
    }

    #[test]
    fn test_identifier_end_spans_chunks() {
        let name = format!("{}!", "x".repeat(40));
        let src = Source::new(name.as_bytes());
        assert_eq!(SimdAccel.identifier_end(&src, 0), 40);
    }

    #[test]
    fn test_skip_blank_long_run() {
        let text = format!("{}\r\n{}z", " ".repeat(30), "\n".repeat(5));
        let src = Source::new(text.as_bytes());
        assert_eq!(SimdAccel.skip_blank(&src, 0), text.len() - 1);
    }

    #[test]
    fn test_text_slice_cr_at_chunk_edge() {
        // \r as byte 15, \n as byte 16: the pair straddles the lane.
        let mut v = b"aaaaaaaaaaaaaaa".to_vec();
        v.push(b'\r');
        v.push(b'\n');
        v.push(b'z');
        let src = Source::new(&v);
        let hit = SimdAccel.next_text_slice(&src, 0);
        assert_eq!(hit.pos, 15);
        assert_eq!(hit.term, SliceTerm::CrLf);
    }
}
