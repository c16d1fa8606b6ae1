//! Builds a tiny in-memory index and runs a couple of queries against it,
//! exercising the same path `jass-search query` takes: `Index::from_parts`,
//! `Query::execute`, `TrecExporter::write`.

use jass_core::codec::Codec;
use jass_core::core::config::Config;
use jass_core::export::TrecExporter;
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

fn build_keys(titles: &[&str]) -> Vec<u8> {
    let header_len = 8 + titles.len() * 8;
    let mut strings = Vec::new();
    let mut offsets = Vec::new();
    let mut cursor = header_len as u64;
    for t in titles {
        offsets.push(cursor);
        strings.extend_from_slice(&(t.len() as u32).to_le_bytes());
        strings.extend_from_slice(t.as_bytes());
        cursor += 4 + t.len() as u64;
    }
    let mut out = Vec::new();
    out.extend_from_slice(&(titles.len() as u64).to_le_bytes());
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

/// Three documents, two terms: "rust" hits docs 0 and 1, "database" hits
/// doc 1 only.
fn build_demo_index(codec: Codec) -> Index {
    let rust_body = encode(codec, &[1, 1]); // gaps -> docids 0, 1
    let database_body = encode(codec, &[2]); // gap -> docid 1

    let mut postings = vec![codec.tag()];
    let rust_offset = postings.len() as u64;
    postings.extend(segment_header(5, 2, &rust_body));
    postings.extend(segment_header(0, 0, &[]));
    let database_offset = postings.len() as u64;
    postings.extend(segment_header(3, 1, &database_body));
    postings.extend(segment_header(0, 0, &[]));

    let mut vocabulary = Vec::new();
    vocabulary.extend(vocab_record("rust", rust_offset, 2, 10, 1));
    vocabulary.extend(vocab_record("database", database_offset, 1, 3, 1));

    let keys = build_keys(&["rust-101", "rust-and-databases", "web-apps"]);
    Index::from_parts(vocabulary, postings, keys).unwrap()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let codec = Codec::VByte;
    let index = build_demo_index(codec);
    let config = Config {
        default_codec: codec,
        ..Config::default()
    };
    let exporter = TrecExporter::new("demo").with_docid_annotation(true);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for (qid, text) in [("1", "rust"), ("2", "rust database"), ("3", "missing")] {
        let mut query: Query<HeapSelector> = Query::new(&index, 10, &config);
        let result = query.execute(text)?;
        println!("query {qid} ({text:?}): {} hits", result.results.len());
        exporter.write(&mut out, qid, &index, result.results)?;
    }

    Ok(())
}
