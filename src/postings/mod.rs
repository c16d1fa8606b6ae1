//! Postings iterator (C5): streams a term's impact segments out of the raw
//! postings bytes the index loader (C7) hands it, D-gap decoding each
//! segment's DocID list lazily into arena scratch space.
//!
//! On-disk shape (per the external-interfaces section): a single codec-tag
//! byte, then a sequence of `(impact: u16, count: u32, body_len: u32,
//! body_bytes)` records terminated by an `impact == 0` record.

use crate::arena::Arena;
use crate::codec::Codec;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::DocId;

/// One impact segment: every DocID in it shares `impact` as its
/// contribution to the running score.
pub struct ImpactSegment<'a> {
    pub impact: u16,
    count: usize,
    body: &'a [u8],
    codec: Codec,
}

impl<'a> ImpactSegment<'a> {
    /// Decodes this segment's D-gaps into arena scratch space and prefix-sums
    /// them into ascending `DocId`s. Decode happens exactly once per call;
    /// callers that only need `impact` never pay for it.
    pub fn doc_ids(&self, arena: &'a Arena) -> Result<&'a [DocId]> {
        let gaps: &mut [u32] = arena.alloc_slice(self.count);
        if self.count > 0 {
            self.codec.decode(gaps, self.body)?;
        }
        let ids: &mut [DocId] = arena.alloc_slice(self.count);
        let mut prev = 0u32;
        for (g, id) in gaps.iter().zip(ids.iter_mut()) {
            prev = prev.wrapping_add(*g);
            *id = DocId::new(prev);
        }
        Ok(ids)
    }
}

/// Walks one term's postings bytes segment by segment.
pub struct PostingsIterator<'a> {
    codec: Codec,
    bytes: &'a [u8],
    pos: usize,
    last_impact: Option<u16>,
    done: bool,
}

impl<'a> PostingsIterator<'a> {
    /// `bytes` must start at a postings list's codec-tag byte.
    pub fn new(bytes: &'a [u8], default_codec: Codec) -> Result<Self> {
        let (tag, rest) = bytes
            .split_first()
            .ok_or_else(|| Error::new(ErrorKind::Vocabulary, "postings list missing codec tag"))?;
        let codec = Codec::from_tag(*tag).unwrap_or(default_codec);
        Ok(PostingsIterator {
            codec,
            bytes: rest,
            pos: 0,
            last_impact: None,
            done: false,
        })
    }

    fn read_u16(&self) -> Result<u16> {
        let b = self
            .bytes
            .get(self.pos..self.pos + 2)
            .ok_or_else(|| Error::new(ErrorKind::Vocabulary, "truncated impact segment header"))?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&self, at: usize) -> Result<u32> {
        let b = self
            .bytes
            .get(at..at + 4)
            .ok_or_else(|| Error::new(ErrorKind::Vocabulary, "truncated impact segment header"))?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

impl<'a> Iterator for PostingsIterator<'a> {
    type Item = Result<ImpactSegment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let impact = match self.read_u16() {
            Ok(i) => i,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        if impact == 0 {
            self.done = true;
            return None;
        }
        if let Some(last) = self.last_impact {
            if impact >= last {
                self.done = true;
                return Some(Err(Error::new(
                    ErrorKind::Vocabulary,
                    "impact segments are not strictly descending",
                )));
            }
        }
        self.last_impact = Some(impact);

        let count = match self.read_u32(self.pos + 2) {
            Ok(c) => c as usize,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        let body_len = match self.read_u32(self.pos + 6) {
            Ok(l) => l as usize,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        let body_start = self.pos + 10;
        let body_end = body_start + body_len;
        let body = match self.bytes.get(body_start..body_end) {
            Some(b) => b,
            None => {
                self.done = true;
                return Some(Err(Error::new(
                    ErrorKind::Vocabulary,
                    "impact segment body truncated",
                )));
            }
        };
        self.pos = body_end;

        Some(Ok(ImpactSegment {
            impact,
            count,
            body,
            codec: self.codec,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment_header(impact: u16, count: u32, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&impact.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    fn encode_gaps(codec: Codec, gaps: &[u32]) -> Vec<u8> {
        let mut buf = vec![0u8; gaps.len() * 5 + 16];
        let n = codec.encode(&mut buf, gaps);
        buf.truncate(n);
        buf
    }

    #[test]
    fn iterates_descending_impacts_and_decodes_ascending_docids() {
        let codec = Codec::VByte;
        let seg1_body = encode_gaps(codec, &[10]); // docid 10
        let seg2_body = encode_gaps(codec, &[10, 10, 10]); // docids 10,20,30

        let mut bytes = vec![codec.tag()];
        bytes.extend(segment_header(9, 1, &seg1_body));
        bytes.extend(segment_header(2, 3, &seg2_body));
        bytes.extend(segment_header(0, 0, &[]));

        let arena = Arena::new(4096);
        let mut it = PostingsIterator::new(&bytes, codec).unwrap();

        let first = it.next().unwrap().unwrap();
        assert_eq!(first.impact, 9);
        assert_eq!(
            first.doc_ids(&arena).unwrap(),
            &[DocId::new(10)]
        );

        let second = it.next().unwrap().unwrap();
        assert_eq!(second.impact, 2);
        assert_eq!(
            second.doc_ids(&arena).unwrap(),
            &[DocId::new(10), DocId::new(20), DocId::new(30)]
        );

        assert!(it.next().is_none());
    }

    #[test]
    fn non_descending_impacts_are_rejected() {
        let codec = Codec::VByte;
        let body = encode_gaps(codec, &[1]);
        let mut bytes = vec![codec.tag()];
        bytes.extend(segment_header(3, 1, &body));
        bytes.extend(segment_header(3, 1, &body));
        bytes.extend(segment_header(0, 0, &[]));

        let mut it = PostingsIterator::new(&bytes, codec).unwrap();
        assert!(it.next().unwrap().is_ok());
        assert_eq!(it.next().unwrap().unwrap_err().kind, ErrorKind::Vocabulary);
    }

    #[test]
    fn truncated_body_errors() {
        let codec = Codec::VByte;
        let mut bytes = vec![codec.tag()];
        bytes.extend(segment_header(5, 3, &[1, 2])); // body_len lies about content
        let mut it = PostingsIterator::new(&bytes, codec).unwrap();
        let seg = it.next().unwrap().unwrap();
        assert_eq!(seg.impact, 5);
    }

    #[test]
    fn empty_postings_list_terminates_immediately() {
        let codec = Codec::VByte;
        let mut bytes = vec![codec.tag()];
        bytes.extend(segment_header(0, 0, &[]));
        let mut it = PostingsIterator::new(&bytes, codec).unwrap();
        assert!(it.next().is_none());
    }
}
