//! Branch-per-byte reference implementation of the scanning contract.
//!
//! This is the semantic baseline the vectorized implementations are tested
//! against. It reads only the logical content and needs no padding.

use super::{Accel, SliceTerm, Source, TextSliceHit};
use crate::ascii::{is_alpha, is_id_part};

pub struct ScalarAccel;

impl Accel for ScalarAccel {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn next_lf(&self, src: &Source, start: usize) -> usize {
        let bytes = src.as_bytes();
        let mut i = start;
        while i < bytes.len() && bytes[i] != b'\n' {
            i += 1;
        }
        i
    }

    fn skip_blank_inline(&self, src: &Source, start: usize) -> usize {
        let bytes = src.as_bytes();
        let mut i = start;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        i
    }

    fn skip_blank(&self, src: &Source, start: usize) -> usize {
        let bytes = src.as_bytes();
        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b' ' | b'\n' => i += 1,
                b'\r' if src.byte_at(i + 1) == b'\n' => i += 2,
                _ => break,
            }
        }
        i.min(bytes.len())
    }

    fn is_blank(&self, src: &Source, start: usize, end: usize) -> bool {
        let end = end.min(src.len());
        let bytes = src.as_bytes();
        let mut i = start;
        while i < end {
            match bytes[i] {
                b' ' | b'\n' => i += 1,
                b'\r' if i + 1 < end && bytes[i + 1] == b'\n' => i += 2,
                _ => return false,
            }
        }
        true
    }

    fn identifier_end(&self, src: &Source, start: usize) -> usize {
        let bytes = src.as_bytes();
        if start >= bytes.len() || !is_alpha(bytes[start]) {
            return start;
        }
        let mut i = start + 1;
        while i < bytes.len() && is_id_part(bytes[i]) {
            i += 1;
        }
        i
    }

    fn next_text_slice(&self, src: &Source, start: usize) -> TextSliceHit {
        let bytes = src.as_bytes();
        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    return TextSliceHit {
                        pos: i,
                        term: SliceTerm::Lf,
                    }
                }
                b'\r' if src.byte_at(i + 1) == b'\n' => {
                    return TextSliceHit {
                        pos: i,
                        term: SliceTerm::CrLf,
                    }
                }
                b'{' => {
                    return TextSliceHit {
                        pos: i,
                        term: SliceTerm::OpenBrace,
                    }
                }
                b'}' => {
                    return TextSliceHit {
                        pos: i,
                        term: SliceTerm::CloseBrace,
                    }
                }
                _ => i += 1,
            }
        }
        TextSliceHit {
            pos: bytes.len(),
            term: SliceTerm::Eof,
        }
    }
}
