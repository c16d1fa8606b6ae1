//! Result exporter (C8): writes a query's sorted top-k in TREC run format.
//!
//! Six whitespace-separated fields per line — `qid iteration primary_key
//! rank rsv run_tag` — with an optional trailing `(ID:docid)` for
//! debugging. `write` streams directly to the caller's `W` rather than
//! building the whole run in a `String`, the same streaming-over-buffering
//! preference the teacher's segment writer applies to its own output.

use std::io::{self, Write};

use crate::core::types::{DocId, Score};
use crate::index::Index;

pub struct TrecExporter<'a> {
    pub run_tag: &'a str,
    /// Append `(ID:docid)` after `run_tag` on every line.
    pub annotate_docid: bool,
}

impl<'a> TrecExporter<'a> {
    pub fn new(run_tag: &'a str) -> Self {
        TrecExporter {
            run_tag,
            annotate_docid: false,
        }
    }

    pub fn with_docid_annotation(mut self, annotate: bool) -> Self {
        self.annotate_docid = annotate;
        self
    }

    /// Writes one line per `(DocId, Score)` in `results`, in the order
    /// given — callers pass the selector's already-sorted output.
    pub fn write<W: Write>(
        &self,
        w: &mut W,
        qid: &str,
        index: &Index,
        results: impl IntoIterator<Item = (DocId, Score)>,
    ) -> io::Result<()> {
        for (rank, (doc_id, rsv)) in results.into_iter().enumerate() {
            let primary_key = index
                .primary_key(doc_id)
                .map(|k| k.to_string())
                .unwrap_or_else(|_| doc_id.to_string());
            if self.annotate_docid {
                writeln!(
                    w,
                    "{} Q0 {} {} {} {} (ID:{})",
                    qid,
                    primary_key,
                    rank + 1,
                    rsv,
                    self.run_tag,
                    doc_id
                )?;
            } else {
                writeln!(
                    w,
                    "{} Q0 {} {} {} {}",
                    qid,
                    primary_key,
                    rank + 1,
                    rsv,
                    self.run_tag
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn writes_one_line_per_result_in_order() {
        let keys = build_keys(&["key5"]);
        let index = Index::from_parts(Vec::new(), vec![crate::codec::Codec::VByte.tag()], keys).unwrap();

        let exporter = TrecExporter::new("RUN");
        let mut out = Vec::new();
        exporter
            .write(&mut out, "42", &index, [(DocId::new(0), 7u32)])
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "42 Q0 key5 1 7 RUN\n");
    }

    #[test]
    fn annotates_docid_when_requested() {
        let keys = build_keys(&["key5"]);
        let index = Index::from_parts(Vec::new(), vec![crate::codec::Codec::VByte.tag()], keys).unwrap();

        let exporter = TrecExporter::new("RUN").with_docid_annotation(true);
        let mut out = Vec::new();
        exporter
            .write(&mut out, "42", &index, [(DocId::new(0), 7u32)])
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "42 Q0 key5 1 7 RUN (ID:0)\n"
        );
    }
}
