//! AVX2 implementation: thirty-two bytes per step.
//!
//! Unlike SSE2, AVX2 is not part of the x86_64 baseline; the selection
//! policy only hands out this implementation after a successful runtime
//! probe (`is_x86_feature_detected!("avx2")`). Sub-chunk tails fall back
//! to the SSE2 implementation, which in turn finishes scalar.

use std::arch::x86_64::{
    __m256i, _mm256_and_si256, _mm256_cmpeq_epi8, _mm256_loadu_si256, _mm256_max_epu8,
    _mm256_min_epu8, _mm256_movemask_epi8, _mm256_or_si256, _mm256_set1_epi8,
};

use super::simd::SimdAccel;
use super::{Accel, SliceTerm, Source, TextSliceHit};
use crate::ascii::is_alpha;

/// The AVX2 lanes. Construction is gated on the runtime feature probe;
/// every `unsafe` block below relies on that gate.
pub struct Avx2Accel;

const LANES: usize = 32;

#[target_feature(enable = "avx2")]
#[inline]
unsafe fn load(ptr: *const u8) -> __m256i {
    _mm256_loadu_si256(ptr.cast::<__m256i>())
}

/// Bitmask (bit k = byte k) of bytes equal to `b`.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn eq_mask(v: __m256i, b: u8) -> u32 {
    _mm256_movemask_epi8(_mm256_cmpeq_epi8(v, _mm256_set1_epi8(b as i8))) as u32
}

/// Bitmask of bytes in `[lo, hi]`, compared as unsigned.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn range_mask(v: __m256i, lo: u8, hi: u8) -> u32 {
    let ge = _mm256_cmpeq_epi8(_mm256_max_epu8(v, _mm256_set1_epi8(lo as i8)), v);
    let le = _mm256_cmpeq_epi8(_mm256_min_epu8(v, _mm256_set1_epi8(hi as i8)), v);
    _mm256_movemask_epi8(_mm256_and_si256(ge, le)) as u32
}

/// Bitmask of bytes in `[A-Za-z0-9_-]`.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn id_part_mask(v: __m256i) -> u32 {
    range_mask(v, b'A', b'Z')
        | range_mask(v, b'a', b'z')
        | range_mask(v, b'0', b'9')
        | eq_mask(v, b'-')
        | eq_mask(v, b'_')
}

/// Bitmask of bytes equal to space or line feed.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn blank_mask(v: __m256i) -> u32 {
    _mm256_movemask_epi8(_mm256_or_si256(
        _mm256_cmpeq_epi8(v, _mm256_set1_epi8(b' ' as i8)),
        _mm256_cmpeq_epi8(v, _mm256_set1_epi8(b'\n' as i8)),
    )) as u32
}

/// First index in `[i, end)` with a byte equal to `b`, by 32-byte chunks;
/// `None` once fewer than 32 bytes remain.
#[target_feature(enable = "avx2")]
unsafe fn find_eq(bytes: &[u8], mut i: usize, end: usize, b: u8) -> (usize, Option<usize>) {
    while i + LANES <= end {
        // SAFETY: i + 32 <= end <= bytes.len() keeps the load in bounds.
        let m = eq_mask(load(bytes.as_ptr().add(i)), b);
        if m != 0 {
            return (i, Some(i + m.trailing_zeros() as usize));
        }
        i += LANES;
    }
    (i, None)
}

impl Accel for Avx2Accel {
    fn name(&self) -> &'static str {
        "avx2"
    }

    fn next_lf(&self, src: &Source, start: usize) -> usize {
        let bytes = src.as_bytes();
        // SAFETY: Avx2Accel is only selected after the AVX2 probe.
        let (i, hit) = unsafe { find_eq(bytes, start, bytes.len(), b'\n') };
        match hit {
            Some(pos) => pos,
            None => SimdAccel.next_lf(src, i),
        }
    }

    fn skip_blank_inline(&self, src: &Source, start: usize) -> usize {
        let bytes = src.as_bytes();
        let len = bytes.len();
        let mut i = start;
        while i + LANES <= len {
            // SAFETY: selection is gated on the AVX2 probe; the load is in
            // bounds.
            let non = unsafe { !eq_mask(load(bytes.as_ptr().add(i)), b' ') };
            if non != 0 {
                return i + non.trailing_zeros() as usize;
            }
            i += LANES;
        }
        SimdAccel.skip_blank_inline(src, i)
    }

    fn skip_blank(&self, src: &Source, start: usize) -> usize {
        let bytes = src.as_bytes();
        let len = bytes.len();
        let mut i = start;
        loop {
            let j = self.first_non_blankish(bytes, i, len);
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
            let j = self.first_non_blankish(bytes, i, end);
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
            // SAFETY: selection is gated on the AVX2 probe; the load is in
            // bounds.
            let non = unsafe { !id_part_mask(load(bytes.as_ptr().add(i))) };
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
                // SAFETY: selection is gated on the AVX2 probe; the load
                // is in bounds.
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
                return SimdAccel.next_text_slice(src, i);
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

impl Avx2Accel {
    /// First index in `[i, end)` whose byte is neither space nor line
    /// feed, or `end`.
    fn first_non_blankish(&self, bytes: &[u8], mut i: usize, end: usize) -> usize {
        while i + LANES <= end {
            // SAFETY: selection is gated on the AVX2 probe; the load is in
            // bounds.
            let non = unsafe { !blank_mask(load(bytes.as_ptr().add(i))) };
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available() -> bool {
        is_x86_feature_detected!("avx2")
    }

    #[test]
    fn test_next_lf_spans_lanes() {
        if !available() {
            return;
        }
        let text = format!("{}\nrest", "a".repeat(70));
        let src = Source::new(text.as_bytes());
        assert_eq!(Avx2Accel.next_lf(&src, 0), 70);
    }

    #[test]
    fn test_identifier_end_long() {
        if !available() {
            return;
        }
        let text = format!("{}!", "ident-".repeat(20));
        let src = Source::new(text.as_bytes());
        assert_eq!(Avx2Accel.identifier_end(&src, 0), 120);
    }

    #[test]
    fn test_crlf_at_lane_boundary() {
        if !available() {
            return;
        }
        for offset in 28..36 {
            let mut v = vec![b'x'; offset];
            v.extend_from_slice(b"\r\ntail{");
            let src = Source::new(&v);
            let hit = Avx2Accel.next_text_slice(&src, 0);
            assert_eq!(hit.pos, offset);
            assert_eq!(hit.term, SliceTerm::CrLf);
        }
    }

    #[test]
    fn test_blank_run_longer_than_lane() {
        if !available() {
            return;
        }
        let text = format!("{}end", " \n".repeat(40));
        let src = Source::new(text.as_bytes());
        assert_eq!(Avx2Accel.skip_blank(&src, 0), 80);
    }
}
