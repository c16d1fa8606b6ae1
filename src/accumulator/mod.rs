//! Accumulator table (C3): a sparse `DocId -> Score` map with lazy,
//! page-wise initialization. Grounded directly in `accumulator_2d.h`'s
//! dirty-flag trick: a page's scores are only zeroed the first time a
//! query touches it, and `reset` just marks every page dirty again rather
//! than clearing `N` scores up front.

use crate::core::types::{DocId, Score};

/// `DocId -> Score`, partitioned into pages of `2^shift` entries with one
/// dirty byte per page. `dirty[p] == 0xFF` means every score in page `p`
/// may be treated as 0 without having actually been zeroed.
pub struct AccumulatorTable {
    scores: Vec<Score>,
    dirty: Vec<u8>,
    shift: u32,
    capacity: usize,
}

const PAGE_DIRTY: u8 = 0xFF;
const PAGE_CLEAN: u8 = 0x00;

impl AccumulatorTable {
    /// Builds a table for `capacity` documents. `preferred_shift == None`
    /// asks for the derived shift `floor(log2(sqrt(capacity)))`, balancing
    /// page width against the number of dirty-flag tests (§4.3);
    /// `Some(0)` is a real, distinguishable request for page width 1, the
    /// smallest legal `s`.
    pub fn new(capacity: usize, preferred_shift: Option<u32>) -> Self {
        let shift = preferred_shift.unwrap_or_else(|| derive_shift(capacity));
        let width = 1usize << shift;
        let n_pages = capacity.div_ceil(width.max(1));
        AccumulatorTable {
            scores: vec![0; n_pages * width],
            dirty: vec![PAGE_DIRTY; n_pages],
            shift,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn page_of(&self, d: DocId) -> usize {
        d.as_usize() >> self.shift
    }

    fn clear_page(&mut self, page: usize) {
        let width = 1usize << self.shift;
        let start = page * width;
        let end = (start + width).min(self.scores.len());
        self.scores[start..end].fill(0);
        self.dirty[page] = PAGE_CLEAN;
    }

    /// Adds `delta` to `acc[d]`, lazily zeroing `d`'s page first if it was
    /// still marked dirty. Returns the updated score.
    pub fn add(&mut self, d: DocId, delta: Score) -> Score {
        let page = self.page_of(d);
        if self.dirty[page] == PAGE_DIRTY {
            self.clear_page(page);
        }
        let slot = &mut self.scores[d.as_usize()];
        *slot += delta;
        *slot
    }

    /// Adds `delta` to every id in `ids`, grouping consecutive ids that
    /// share a page so each touched page is cleared at most once — the
    /// scalar equivalent of the original's SIMD gather/scatter `add_v`.
    pub fn add_batch(&mut self, ids: &[DocId], delta: Score) {
        let mut i = 0;
        while i < ids.len() {
            let page = self.page_of(ids[i]);
            if self.dirty[page] == PAGE_DIRTY {
                self.clear_page(page);
            }
            let mut j = i;
            while j < ids.len() && self.page_of(ids[j]) == page {
                self.scores[ids[j].as_usize()] += delta;
                j += 1;
            }
            i = j;
        }
    }

    /// Returns `acc[d]`, or 0 if `d`'s page has never been touched since
    /// the last `reset`.
    pub fn get(&self, d: DocId) -> Score {
        let page = self.page_of(d);
        if self.dirty[page] == PAGE_DIRTY {
            0
        } else {
            self.scores[d.as_usize()]
        }
    }

    /// Marks every page dirty again; an `O(1)` reset regardless of
    /// capacity. Does not touch `self.scores` — pages are zeroed lazily on
    /// their first `add` after this call.
    pub fn reset(&mut self) {
        self.dirty.fill(PAGE_DIRTY);
    }

    /// Number of pages currently marked clean (i.e. touched since the last
    /// reset). Exposed for the page-zero instrumentation named in §8.
    #[cfg(test)]
    pub fn touched_pages(&self) -> usize {
        self.dirty.iter().filter(|&&d| d == PAGE_CLEAN).count()
    }
}

fn derive_shift(capacity: usize) -> u32 {
    if capacity <= 1 {
        return 0;
    }
    let sqrt = (capacity as f64).sqrt();
    (sqrt.log2().floor() as i64).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreferenced_docs_report_zero() {
        let table = AccumulatorTable::new(64, Some(3));
        assert_eq!(table.get(DocId::new(5)), 0);
    }

    #[test]
    fn add_accumulates_and_matches_invariant() {
        let mut table = AccumulatorTable::new(64, Some(3));
        table.add(DocId::new(1), 5);
        table.add(DocId::new(1), 3);
        table.add(DocId::new(2), 10);
        assert_eq!(table.get(DocId::new(1)), 8);
        assert_eq!(table.get(DocId::new(2)), 10);
        assert_eq!(table.get(DocId::new(3)), 0);
    }

    #[test]
    fn reset_zeroes_everything_and_only_touched_pages_reinit() {
        let mut table = AccumulatorTable::new(64, Some(3));
        for d in 0..64 {
            table.add(DocId::new(d), 1);
        }
        assert_eq!(table.touched_pages(), 8);
        table.reset();
        for d in 0..64 {
            assert_eq!(table.get(DocId::new(d)), 0);
        }
        assert_eq!(table.touched_pages(), 0);
        table.add(DocId::new(0), 1);
        assert_eq!(table.touched_pages(), 1);
    }

    #[test]
    fn page_size_one_is_legal() {
        // `Some(0)` pins page width to 1, the smallest legal `s`: every
        // DocId is its own page, so touching one never marks a neighbor's
        // page clean.
        let mut table = AccumulatorTable::new(8, Some(0));
        table.add(DocId::new(3), 7);
        assert_eq!(table.get(DocId::new(3)), 7);
        assert_eq!(table.get(DocId::new(4)), 0);
        assert_eq!(table.touched_pages(), 1);
    }

    #[test]
    fn add_batch_groups_same_page_ids() {
        let mut table = AccumulatorTable::new(64, Some(3));
        let ids = [DocId::new(0), DocId::new(1), DocId::new(2), DocId::new(8)];
        table.add_batch(&ids, 2);
        assert_eq!(table.get(DocId::new(0)), 2);
        assert_eq!(table.get(DocId::new(1)), 2);
        assert_eq!(table.get(DocId::new(2)), 2);
        assert_eq!(table.get(DocId::new(8)), 2);
        assert_eq!(table.touched_pages(), 2);
    }
}
