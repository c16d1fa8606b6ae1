use crate::codec::Codec;

/// Every tunable the evaluator needs at construction time, gathered in one
/// place so callers don't have to thread individual knobs through `Index`,
/// `Query`, and the arena separately.
#[derive(Debug, Clone)]
pub struct Config {
    /// Codec used to decode a postings segment when the vocabulary entry
    /// doesn't pin one down itself.
    pub default_codec: Codec,

    /// Default `K` for top-k selection when a query doesn't override it.
    pub default_top_k: usize,

    /// log2 of the accumulator table's page width. `None` asks
    /// `AccumulatorTable::new` to derive a width from the document count;
    /// `Some(0)` explicitly requests page width 1.
    pub accumulator_page_shift: Option<u32>,

    /// Size in bytes of each chunk the arena requests from the system
    /// allocator.
    pub arena_chunk_size: usize,

    /// Number of index snapshots a reader pool keeps warm.
    pub max_readers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_codec: Codec::StreamVByte,
            default_top_k: 10,
            accumulator_page_shift: None,
            arena_chunk_size: 1024 * 1024,
            max_readers: num_cpus::get(),
        }
    }
}
