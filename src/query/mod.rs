//! Query driver (C6): tokenizes a query string, streams each term's
//! postings through the decoder and accumulator table, and hands every
//! decoded `DocId` to a top-k selector.
//!
//! `Query` owns everything scoped to a single query — arena, accumulator
//! table, selector — and borrows the shared, read-only `Index` (§5's
//! "each query owns its accumulator table, selector, and arena; the index
//! is shared read-only" split).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::accumulator::AccumulatorTable;
use crate::arena::Arena;
use crate::codec::Codec;
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocId, Score};
use crate::index::Index;
use crate::topk::TopKSelector;

/// Optional early-termination policy (§4.6). `Disabled` is the default:
/// the simplest behavior to verify, and the one every test not explicitly
/// about early termination assumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyTermination {
    Disabled,
    /// Stops once the current top-k's minimum score cannot be beaten by
    /// any document's maximum remaining achievable score, computed as the
    /// sum of the as-yet-unprocessed terms' first (highest) impact.
    ImpactBound,
}

/// One query's ranked results plus whether it ran to completion.
pub struct QueryResult {
    pub query_id: Option<String>,
    pub results: Vec<(DocId, Score)>,
    pub truncated: bool,
    /// Number of postings decoded before the query finished or stopped;
    /// exposed so the `ImpactBound` equivalence test (§8) can assert it
    /// touches no more postings than `Disabled`, never fewer results.
    pub postings_touched: usize,
}

pub struct Query<'idx, S: TopKSelector> {
    index: &'idx Index,
    arena: Arena,
    accumulators: AccumulatorTable,
    selector: S,
    codec: Codec,
    early_termination: EarlyTermination,
}

impl<'idx, S: TopKSelector> Query<'idx, S> {
    pub fn new(index: &'idx Index, k: usize, config: &Config) -> Self {
        Query {
            index,
            arena: Arena::new(config.arena_chunk_size),
            accumulators: AccumulatorTable::new(index.document_count(), config.accumulator_page_shift),
            selector: S::new(k),
            codec: config.default_codec,
            early_termination: EarlyTermination::Disabled,
        }
    }

    pub fn with_early_termination(mut self, policy: EarlyTermination) -> Self {
        self.early_termination = policy;
        self
    }

    pub fn execute(&mut self, query_text: &str) -> Result<QueryResult> {
        self.execute_cancellable(query_text, None, None)
    }

    /// Same as `execute`, but checked cooperatively between impact segments:
    /// `cancel` aborts with `Cancelled`, `deadline` returns the best-effort
    /// top-k so far with `truncated = true`.
    pub fn execute_cancellable(
        &mut self,
        query_text: &str,
        cancel: Option<&AtomicBool>,
        deadline: Option<Instant>,
    ) -> Result<QueryResult> {
        self.selector.rewind(&mut self.accumulators);

        let (query_id, terms) = tokenize(query_text);

        let mut bounds = Vec::with_capacity(terms.len());
        let mut remaining_bound: u32 = 0;
        for term in &terms {
            let max_impact = match self.index.lookup(term) {
                Some(handle) => {
                    let mut probe = self.index.postings_iter(&handle, self.codec)?;
                    match probe.next() {
                        Some(Ok(seg)) => seg.impact as u32,
                        Some(Err(e)) => return Err(e),
                        None => 0,
                    }
                }
                None => 0,
            };
            remaining_bound += max_impact;
            bounds.push(max_impact);
        }

        let mut postings_touched = 0;
        let mut truncated = false;

        'terms: for (term, max_impact) in terms.iter().zip(bounds.iter()) {
            if let Some(c) = cancel {
                if c.load(Ordering::Relaxed) {
                    return Err(Error::new(ErrorKind::Cancelled, "query cancelled"));
                }
            }
            if self.early_termination == EarlyTermination::ImpactBound {
                if let Some(min) = self.selector.min_if_full(&self.accumulators) {
                    if min >= remaining_bound {
                        break 'terms;
                    }
                }
            }

            let Some(handle) = self.index.lookup(term) else {
                remaining_bound -= *max_impact;
                continue;
            };

            for segment in self.index.postings_iter(&handle, self.codec)? {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        truncated = true;
                        break 'terms;
                    }
                }
                let segment = segment?;
                let doc_ids = segment.doc_ids(&self.arena)?;
                for &d in doc_ids {
                    self.selector.add(&mut self.accumulators, d, segment.impact as Score);
                }
                postings_touched += doc_ids.len();
            }
            remaining_bound -= *max_impact;
        }

        self.selector.sort(&self.accumulators);
        let results = self
            .selector
            .results()
            .iter()
            .map(|&d| (d, self.accumulators.get(d)))
            .collect();

        self.arena.reset();

        Ok(QueryResult {
            query_id,
            results,
            truncated,
            postings_touched,
        })
    }
}

/// Whitespace-tokenizes `text`. If the first token is purely numeric, it is
/// taken as the query identifier and excluded from the term list; boolean
/// operators, phrases, and ranges are an external parser's job (§1) — this
/// is bag-of-terms only.
fn tokenize(text: &str) -> (Option<String>, Vec<&str>) {
    let mut tokens = text.split_whitespace();
    match tokens.next() {
        Some(first) if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) => {
            (Some(first.to_string()), tokens.collect())
        }
        Some(first) => (None, std::iter::once(first).chain(tokens).collect()),
        None => (None, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topk::HeapSelector;

    fn segment_header(impact: u16, count: u32, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&impact.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

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

    fn encode(codec: Codec, gaps: &[u32]) -> Vec<u8> {
        let mut buf = vec![0u8; gaps.len() * 5 + 16];
        let n = codec.encode(&mut buf, gaps);
        buf.truncate(n);
        buf
    }

    fn build_keys(n: usize) -> Vec<u8> {
        let keys: Vec<String> = (0..n).map(|i| format!("key{i}")).collect();
        let mut strings = Vec::new();
        let mut offsets = Vec::new();
        let header_len = 8 + keys.len() * 8;
        let mut cursor = header_len as u64;
        for k in &keys {
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

    fn build_index(codec: Codec) -> Index {
        // term "a": impact 5 over {1,2,3}; term "b": impact 3 over {2,4}
        let a_body = encode(codec, &[1, 1, 1]); // gaps -> docids 1,2,3
        let b_body = encode(codec, &[2, 2]); // gaps -> docids 2,4

        let mut postings = vec![codec.tag()];
        let a_offset = postings.len() as u64;
        postings.extend(segment_header(5, 3, &a_body));
        postings.extend(segment_header(0, 0, &[]));
        let b_offset = postings.len() as u64;
        postings.extend(segment_header(3, 2, &b_body));
        postings.extend(segment_header(0, 0, &[]));

        let mut vocabulary = Vec::new();
        vocabulary.extend(vocab_record("a", a_offset, 3, 15, 1));
        vocabulary.extend(vocab_record("b", b_offset, 2, 6, 1));

        Index::from_parts(vocabulary, postings, build_keys(5)).unwrap()
    }

    #[test]
    fn scenario_two_terms_matches_expected_top_k() {
        let codec = Codec::VByte;
        let index = build_index(codec);
        let config = Config {
            default_codec: codec,
            ..Config::default()
        };
        let mut query: Query<HeapSelector> = Query::new(&index, 2, &config);
        let result = query.execute("42 a b").unwrap();
        assert_eq!(result.query_id.as_deref(), Some("42"));
        assert_eq!(
            result.results,
            vec![(DocId::new(2), 8), (DocId::new(1), 5)]
        );
    }

    #[test]
    fn missing_term_is_skipped() {
        let codec = Codec::VByte;
        let index = build_index(codec);
        let config = Config {
            default_codec: codec,
            ..Config::default()
        };
        let mut query: Query<HeapSelector> = Query::new(&index, 2, &config);
        let result = query.execute("42 the a").unwrap();
        // "a" alone gives docs {1,2,3} all at impact 5; ascending-DocId
        // tie-break keeps the two lowest ids.
        assert_eq!(result.results, vec![(DocId::new(1), 5), (DocId::new(2), 5)]);
    }

    #[test]
    fn impact_bound_never_changes_top_k() {
        let codec = Codec::VByte;
        let index = build_index(codec);
        let config = Config {
            default_codec: codec,
            ..Config::default()
        };

        let mut disabled: Query<HeapSelector> = Query::new(&index, 2, &config);
        let baseline = disabled.execute("42 a b").unwrap();

        let mut bounded: Query<HeapSelector> =
            Query::new(&index, 2, &config).with_early_termination(EarlyTermination::ImpactBound);
        let bounded_result = bounded.execute("42 a b").unwrap();

        assert_eq!(baseline.results, bounded_result.results);
        assert!(bounded_result.postings_touched <= baseline.postings_touched);
    }

    #[test]
    fn numeric_first_token_becomes_query_id() {
        assert_eq!(tokenize("7 fox jumps").0.as_deref(), Some("7"));
        assert_eq!(tokenize("fox jumps").0, None);
        assert_eq!(tokenize("").0, None);
    }

    #[test]
    fn cancellation_aborts_before_any_term_is_processed() {
        let codec = Codec::VByte;
        let index = build_index(codec);
        let config = Config {
            default_codec: codec,
            ..Config::default()
        };
        let mut query: Query<HeapSelector> = Query::new(&index, 2, &config);
        let cancel = AtomicBool::new(true);
        let err = query
            .execute_cancellable("42 a b", Some(&cancel), None)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cancelled);
    }
}
