//! Query-time evaluation engine for an impact-ordered search index.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                         QUERY EVALUATION ENGINE                      │
//! └──────────────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ struct Query                                                        │
//! │  arena: Arena                   // per-query scratch region         │
//! │  accumulators: AccumulatorTable // DocId -> Score                   │
//! │  selector: HeapSelector | BeapSelector  // top-k bookkeeping         │
//! │  index: Arc<Index>              // shared, read-only                │
//! └─────────────────────────────────────────────────────────────────────┘
//!            │ resolves terms through
//!            ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ struct Index (C7)                                                   │
//! │  vocabulary: Vocabulary (sorted on open, binary-searched)            │
//! │  postings, primary_keys: memmap2::Mmap regions                      │
//! └─────────────────────────────────────────────────────────────────────┘
//!            │ yields, per term
//!            ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ PostingsIterator (C5) -> ImpactSegment { impact, doc_ids(&Arena) }  │
//! │   doc_ids() D-gap decodes via codec::Codec (C2) into arena scratch  │
//! └─────────────────────────────────────────────────────────────────────┘
//!            │ each decoded DocId feeds
//!            ▼
//! ┌───────────────────────────────┐  ┌────────────────────────────────┐
//! │ AccumulatorTable (C3)          │  │ TopKSelector (C4)              │
//! │  dirty-flag pages, O(1) reset  │  │  HeapSelector / BeapSelector   │
//! └───────────────────────────────┘  └────────────────────────────────┘
//!            │ after all terms
//!            ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ export::TrecExporter (C8) -> TREC run lines on any io::Write         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ingestion, stemming, query-syntax parsing, and index construction are
//! external collaborators and live outside this crate; it consumes an
//! already-built impact-ordered index and answers ranked queries against it.

pub mod accumulator;
pub mod arena;
pub mod codec;
pub mod core;
pub mod export;
pub mod index;
pub mod postings;
pub mod query;
pub mod topk;

pub use core::error::{Error, ErrorKind, Result};
pub use core::types::DocId;
