//! Shows the two knobs that bound per-query memory here: a small
//! `arena_chunk_size` caps how much scratch the decoder grows per query
//! (the arena is reset, not freed, between queries — see `Arena::reset`),
//! and a small `accumulator_page_shift` trades a tighter live working set
//! for more page dirty-flag checks (§4.3).

use jass_core::codec::Codec;
use jass_core::core::config::Config;
use jass_core::index::Index;
use jass_core::query::Query;
use jass_core::topk::HeapSelector;

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

fn build_keys(n: usize) -> Vec<u8> {
    let keys: Vec<String> = (0..n).map(|i| format!("doc{i}")).collect();
    let header_len = 8 + keys.len() * 8;
    let mut strings = Vec::new();
    let mut offsets = Vec::new();
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

fn encode(codec: Codec, gaps: &[u32]) -> Vec<u8> {
    let mut buf = vec![0u8; gaps.len() * 5 + 16];
    let n = codec.encode(&mut buf, gaps);
    buf.truncate(n);
    buf
}

/// A single term "term" posting a run of 5,000 documents, so each query
/// actually forces the arena to decode a nontrivial scratch slice.
fn build_large_index(codec: Codec) -> Index {
    let doc_count = 5_000u32;
    let gaps: Vec<u32> = std::iter::once(1).chain(std::iter::repeat(1).take(doc_count as usize - 1)).collect();
    let body = encode(codec, &gaps);

    let mut postings = vec![codec.tag()];
    let offset = postings.len() as u64;
    postings.extend(segment_header(7, doc_count, &body));
    postings.extend(segment_header(0, 0, &[]));

    let mut vocabulary = Vec::new();
    vocabulary.extend(vocab_record("term", offset, doc_count as u64, doc_count as u64 * 7, 1));

    Index::from_parts(vocabulary, postings, build_keys(doc_count as usize)).unwrap()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let codec = Codec::VByte;
    let index = build_large_index(codec);

    // A constrained configuration: small arena chunks and a narrow
    // accumulator page width, suited to a memory-limited host.
    let tight_config = Config {
        default_codec: codec,
        arena_chunk_size: 16 * 1024,
        accumulator_page_shift: Some(6), // 64 docs/page
        ..Config::default()
    };

    println!("Running 20 queries against a 5,000-document posting under a tight config...");
    for i in 0..20 {
        let mut query: Query<HeapSelector> = Query::new(&index, 10, &tight_config);
        let result = query.execute("term")?;
        if i % 5 == 0 {
            println!(
                "  query {i}: {} hits, {} postings decoded",
                result.results.len(),
                result.postings_touched
            );
        }
        // `Query::execute` resets the arena's bump pointer on return, so
        // repeatedly constructing a fresh `Query` here never accumulates
        // scratch across iterations — only the chunk size set above does.
    }

    println!("Done; each query's arena never exceeded a few {} byte chunks.", tight_config.arena_chunk_size);
    Ok(())
}
