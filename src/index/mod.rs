//! Index loader (C7): owns the immutable on-disk index bytes and exposes
//! vocabulary lookup, primary-key resolution, and document count.
//!
//! Mirrors the teacher's `mmap_file.rs`/`IndexReader::open` pattern: the
//! vocabulary, postings, and primary-key regions are each `memmap2::Mmap`
//! when opened from disk, but `from_parts` accepts plain `Vec<u8>` so tests
//! never have to touch the filesystem. Unlike the teacher's "missing file
//! means empty index" fallback, a missing on-disk file at `open` is a real
//! `Error { kind: Io, .. }` — a silently-empty index would be a correctness
//! bug at search time, not a convenience.

use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::codec::Codec;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::DocId;
use crate::postings::PostingsIterator;

enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Backing {
    fn as_slice(&self) -> &[u8] {
        match self {
            Backing::Mapped(m) => &m[..],
            Backing::Owned(v) => &v[..],
        }
    }
}

struct VocabEntry {
    term: String,
    postings_offset: u64,
    df: u64,
    cf: u64,
    n_impacts: u32,
}

/// What `Index::lookup` hands back: everything a query needs to stream one
/// term's postings, without exposing the vocabulary's internal layout.
pub struct PostingsHandle {
    offset: u64,
    pub df: u64,
    pub cf: u64,
    pub n_impacts: u32,
}

pub struct Index {
    vocabulary: Vec<VocabEntry>,
    postings: Arc<Backing>,
    primary_keys: Arc<Backing>,
    key_offsets: Vec<u64>,
    document_count: usize,
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16> {
    let b = bytes
        .get(at..at + 2)
        .ok_or_else(|| Error::new(ErrorKind::Vocabulary, "truncated vocabulary record"))?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    let b = bytes
        .get(at..at + 4)
        .ok_or_else(|| Error::new(ErrorKind::Vocabulary, "truncated record"))?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn read_u64(bytes: &[u8], at: usize) -> Result<u64> {
    let b = bytes
        .get(at..at + 8)
        .ok_or_else(|| Error::new(ErrorKind::Vocabulary, "truncated record"))?;
    Ok(u64::from_le_bytes([
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
    ]))
}

fn parse_vocabulary(bytes: &[u8]) -> Result<Vec<VocabEntry>> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let lex_len = read_u16(bytes, pos)? as usize;
        pos += 2;
        let lex_bytes = bytes
            .get(pos..pos + lex_len)
            .ok_or_else(|| Error::new(ErrorKind::Vocabulary, "truncated term lexeme"))?;
        let term = String::from_utf8(lex_bytes.to_vec())
            .map_err(|e| Error::new(ErrorKind::Vocabulary, e.to_string()))?;
        pos += lex_len;
        let postings_offset = read_u64(bytes, pos)?;
        pos += 8;
        let df = read_u64(bytes, pos)?;
        pos += 8;
        let cf = read_u64(bytes, pos)?;
        pos += 8;
        let n_impacts = read_u32(bytes, pos)?;
        pos += 4;
        entries.push(VocabEntry {
            term,
            postings_offset,
            df,
            cf,
            n_impacts,
        });
    }
    // Generated index tables are not guaranteed ordered; sort once here so
    // lookup can binary search.
    entries.sort_by(|a, b| a.term.cmp(&b.term));
    Ok(entries)
}

fn parse_key_offsets(bytes: &[u8]) -> Result<Vec<u64>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let count = read_u64(bytes, 0)? as usize;
    let mut offsets = Vec::with_capacity(count);
    let mut pos = 8;
    for _ in 0..count {
        offsets.push(read_u64(bytes, pos)?);
        pos += 8;
    }
    Ok(offsets)
}

impl Index {
    /// Maps `vocabulary.bin`, `postings.bin`, and `keys.bin` under `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        let vocabulary_bytes = std::fs::read(dir.join("vocabulary.bin"))?;
        let postings_file = File::open(dir.join("postings.bin"))?;
        let keys_file = File::open(dir.join("keys.bin"))?;

        // SAFETY: the mapped files are treated as read-only for the life of
        // the `Index`; the caller is responsible for not mutating them out
        // from under a running query, per §5's shared-read-only contract.
        let postings = unsafe { Mmap::map(&postings_file)? };
        let primary_keys = unsafe { Mmap::map(&keys_file)? };

        Self::build(
            &vocabulary_bytes,
            Backing::Mapped(postings),
            Backing::Mapped(primary_keys),
        )
    }

    /// Builds an `Index` from in-memory byte regions with the same layout
    /// `open` expects, for tests that never touch the filesystem.
    pub fn from_parts(vocabulary: Vec<u8>, postings: Vec<u8>, primary_keys: Vec<u8>) -> Result<Self> {
        Self::build(
            &vocabulary,
            Backing::Owned(postings),
            Backing::Owned(primary_keys),
        )
    }

    fn build(vocabulary_bytes: &[u8], postings: Backing, primary_keys: Backing) -> Result<Self> {
        let vocabulary = parse_vocabulary(vocabulary_bytes)?;
        let key_offsets = parse_key_offsets(primary_keys.as_slice())?;
        let document_count = key_offsets.len();
        Ok(Index {
            vocabulary,
            postings: Arc::new(postings),
            primary_keys: Arc::new(primary_keys),
            key_offsets,
            document_count,
        })
    }

    /// Binary searches the sorted vocabulary for `term`.
    pub fn lookup(&self, term: &str) -> Option<PostingsHandle> {
        let i = self
            .vocabulary
            .binary_search_by(|e| e.term.as_str().cmp(term))
            .ok()?;
        let e = &self.vocabulary[i];
        Some(PostingsHandle {
            offset: e.postings_offset,
            df: e.df,
            cf: e.cf,
            n_impacts: e.n_impacts,
        })
    }

    /// Streams the postings a `lookup` handle points at, defaulting to
    /// `default_codec` if the list's tag byte names a codec this build
    /// doesn't recognize.
    pub fn postings_iter(&self, handle: &PostingsHandle, default_codec: Codec) -> Result<PostingsIterator<'_>> {
        let bytes = self
            .postings
            .as_slice()
            .get(handle.offset as usize..)
            .ok_or_else(|| Error::new(ErrorKind::Vocabulary, "postings offset out of range"))?;
        PostingsIterator::new(bytes, default_codec)
    }

    pub fn primary_key(&self, d: DocId) -> Result<&str> {
        let offset = *self
            .key_offsets
            .get(d.as_usize())
            .ok_or_else(|| Error::new(ErrorKind::Vocabulary, "docid has no primary key"))?
            as usize;
        let bytes = self.primary_keys.as_slice();
        let len = read_u32(bytes, offset)? as usize;
        let start = offset + 4;
        let s = bytes
            .get(start..start + len)
            .ok_or_else(|| Error::new(ErrorKind::Vocabulary, "truncated primary key"))?;
        std::str::from_utf8(s).map_err(|e| Error::new(ErrorKind::Vocabulary, e.to_string()))
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab_record(term: &str, offset: u64, df: u64, cf: u64, n_impacts: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(term.len() as u16).to_le_bytes());
        out.extend_from_slice(term.as_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&df.to_le_bytes());
        out.extend_from_slice(&cf.to_le_bytes());
        out.extend_from_slice(&n_impacts.to_le_bytes());
        out
    }

    fn segment_header(impact: u16, count: u32, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&impact.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    fn build_keys(keys: &[&str]) -> Vec<u8> {
        let mut strings = Vec::new();
        let mut offsets = Vec::new();
        let header_len = 8 + keys.len() * 8;
        let mut cursor = header_len as u64;
        for k in keys {
            offsets.push(cursor);
            strings.extend_from_slice(&(k.len() as u32).to_le_bytes());
            strings.extend_from_slice(k.as_bytes());
            cursor += 4 + k.len() as u64;
        }
        let mut out = Vec::new();
        out.extend_from_slice(&(keys.len() as u64).to_le_bytes());
        for o in &offsets {
            out.extend_from_slice(&o.to_le_bytes());
        }
        out.extend(strings);
        out
    }

    #[test]
    fn lookup_and_primary_key_round_trip() {
        let codec = Codec::VByte;
        let gaps = {
            let mut buf = vec![0u8; 32];
            let n = codec.encode(&mut buf, &[5]);
            buf.truncate(n);
            buf
        };
        let mut postings = vec![codec.tag()];
        postings.extend(segment_header(7, 1, &gaps));
        postings.extend(segment_header(0, 0, &[]));

        let mut vocabulary = Vec::new();
        vocabulary.extend(vocab_record("fox", 0, 1, 7, 1));

        let keys = build_keys(&["doc0", "doc1", "doc2", "doc3", "doc4", "doc5"]);

        let index = Index::from_parts(vocabulary, postings, keys).unwrap();
        assert_eq!(index.document_count(), 6);
        assert_eq!(index.primary_key(DocId::new(5)).unwrap(), "doc5");

        let handle = index.lookup("fox").unwrap();
        assert_eq!(handle.df, 1);
        let mut it = index.postings_iter(&handle, codec).unwrap();
        let seg = it.next().unwrap().unwrap();
        assert_eq!(seg.impact, 7);
        assert!(it.next().is_none());

        assert!(index.lookup("missing").is_none());
    }

    #[test]
    fn vocabulary_is_sorted_even_if_written_out_of_order() {
        let mut vocabulary = Vec::new();
        vocabulary.extend(vocab_record("zebra", 0, 0, 0, 0));
        vocabulary.extend(vocab_record("apple", 0, 0, 0, 0));

        let mut postings = vec![Codec::VByte.tag()];
        postings.extend(segment_header(0, 0, &[]));

        let index = Index::from_parts(vocabulary, postings, build_keys(&[])).unwrap();
        assert!(index.lookup("apple").is_some());
        assert!(index.lookup("zebra").is_some());
    }
}
