//! Top-k selector (C4): maintains exactly `K` accumulator entries with the
//! largest scores, tie-broken by ascending `DocId` for a deterministic
//! total order. Two implementations share the [`TopKSelector`] contract so
//! the query driver (C6) is generic over the choice, grounded in
//! `query_heap.h`'s `add_rsv` protocol.

mod beap;

pub use beap::BeapSelector;

use crate::accumulator::AccumulatorTable;
use crate::core::types::{DocId, Score};

/// `(score, DocId)` ordered so that the *largest* score sorts first and,
/// on a tie, the *smaller* `DocId` sorts first — the deterministic
/// tie-break named in §4.4, used directly as a descending sort key.
fn rank_key(acc: &AccumulatorTable, d: DocId) -> (Score, std::cmp::Reverse<DocId>) {
    (acc.get(d), std::cmp::Reverse(d))
}

/// `true` if `(score_a, a)` is strictly less than `(score_b, b)` under the
/// selector's ordering: lower score loses; on a tie, the *larger* DocId is
/// considered "smaller" so that the lower DocId wins ties.
fn less_than(score_a: Score, a: DocId, score_b: Score, b: DocId) -> bool {
    (score_a, std::cmp::Reverse(a)) < (score_b, std::cmp::Reverse(b))
}

pub trait TopKSelector {
    /// Builds a selector retaining the top `k` entries.
    fn new(k: usize) -> Self
    where
        Self: Sized;

    /// Resets the selector to an empty state (`needed_for_top_k := K`) and
    /// resets `accumulators` along with it, per §4.4.
    fn rewind(&mut self, accumulators: &mut AccumulatorTable);

    /// Applies the accumulator add for `d` and updates the top-k state.
    fn add(&mut self, accumulators: &mut AccumulatorTable, d: DocId, delta: Score);

    /// Partial-sorts the backing store into descending `(score, DocId)`
    /// order. Must be called once, after all `add`s, before `results`.
    fn sort(&mut self, accumulators: &AccumulatorTable);

    /// The sorted top-k, smallest rank (highest score) first. Valid only
    /// after `sort`.
    fn results(&self) -> &[DocId];

    /// The current evictable minimum, or `None` while the selector still
    /// has empty slots (any candidate is guaranteed to qualify, so there is
    /// no useful bound yet). Used by the query driver's `ImpactBound`
    /// early-termination policy (§4.6) — never required for correctness.
    fn min_if_full(&self, accumulators: &AccumulatorTable) -> Option<Score>;
}

/// Array of `K` `DocId` slots maintained as a min-heap keyed by
/// `(score, DocId)` with the tie-break from §4.4. `needed_for_top_k`
/// tracks how many slots are still unfilled placeholders.
///
/// Slots are `Option<DocId>` rather than bare `DocId` so an unfilled
/// placeholder is never mistaken for a real document: `DocId::new(0)` is a
/// legitimate id, so using it as the "empty" sentinel would wrongly treat
/// it as the already-tracked root the moment it got scored during filling.
pub struct HeapSelector {
    k: usize,
    needed_for_top_k: usize,
    slots: Vec<Option<DocId>>,
    sorted_results: Vec<DocId>,
    sorted: bool,
}

impl HeapSelector {
    /// Index range of the slots that currently hold real candidates:
    /// during filling, only the tail is populated; once filled, the whole
    /// array is a heap.
    fn active_range(&self) -> std::ops::Range<usize> {
        self.needed_for_top_k..self.k
    }

    fn find_slot(&self, d: DocId) -> Option<usize> {
        self.active_range().find(|&i| self.slots[i] == Some(d))
    }

    fn heapify(&mut self, acc: &AccumulatorTable) {
        if self.k == 0 {
            return;
        }
        for start in (0..self.k / 2).rev() {
            self.sift_down(acc, start);
        }
    }

    fn sift_down(&mut self, acc: &AccumulatorTable, mut i: usize) {
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut smallest = i;
            if left < self.k
                && rank_key(acc, self.slots[left].unwrap()) < rank_key(acc, self.slots[smallest].unwrap())
            {
                smallest = left;
            }
            if right < self.k
                && rank_key(acc, self.slots[right].unwrap()) < rank_key(acc, self.slots[smallest].unwrap())
            {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.slots.swap(i, smallest);
            i = smallest;
        }
    }
}

impl TopKSelector for HeapSelector {
    fn new(k: usize) -> Self {
        HeapSelector {
            k,
            needed_for_top_k: k,
            slots: vec![None; k],
            sorted_results: Vec::with_capacity(k),
            sorted: false,
        }
    }

    fn rewind(&mut self, accumulators: &mut AccumulatorTable) {
        self.needed_for_top_k = self.k;
        self.slots.iter_mut().for_each(|s| *s = None);
        self.sorted_results.clear();
        self.sorted = false;
        accumulators.reset();
    }

    fn add(&mut self, accumulators: &mut AccumulatorTable, d: DocId, delta: Score) {
        if self.k == 0 {
            accumulators.add(d, delta);
            return;
        }
        self.sorted = false;

        if self.needed_for_top_k > 0 {
            // Still filling: every distinct document qualifies until the
            // table is full, so there is no minimum to compare against
            // yet — that's exactly the state a sentinel DocId would have
            // to fake, which is what caused the collision this guards
            // against.
            let new_score = accumulators.add(d, delta);
            let old_score = new_score - delta;
            if old_score == 0 && self.find_slot(d).is_none() {
                self.needed_for_top_k -= 1;
                self.slots[self.needed_for_top_k] = Some(d);
                if self.needed_for_top_k == 0 {
                    self.heapify(accumulators);
                }
            }
            return;
        }

        // Heap is full: slots[0] is the tracked minimum.
        let pre_min = self.slots[0].expect("full heap has an occupied root");
        let pre_min_score = accumulators.get(pre_min);

        let new_score = accumulators.add(d, delta);
        let old_score = new_score - delta;

        if d == pre_min {
            // `d` is the tracked minimum being updated in place; it can
            // only move down from the root.
            self.sift_down(accumulators, 0);
            return;
        }

        let below_min = less_than(new_score, d, pre_min_score, pre_min);
        if below_min {
            return;
        }

        // `d` qualifies for the top-k. Was it already a member? Its score
        // before this add tells us: if the pre-add value already beat the
        // pre-add min, it must already be a tracked candidate, since
        // scores only grow and the heap always holds the true top-k.
        let was_member = !less_than(old_score, d, pre_min_score, pre_min);
        if was_member {
            if let Some(pos) = self.find_slot(d) {
                self.sift_down(accumulators, pos);
            }
        } else {
            self.slots[0] = Some(d);
            self.sift_down(accumulators, 0);
        }
    }

    fn sort(&mut self, accumulators: &AccumulatorTable) {
        let occupied = &self.slots[self.needed_for_top_k..];
        self.sorted_results = occupied.iter().map(|s| s.expect("occupied slot")).collect();
        self.sorted_results.sort_by(|&a, &b| {
            match accumulators.get(b).cmp(&accumulators.get(a)) {
                std::cmp::Ordering::Equal => a.value().cmp(&b.value()),
                other => other,
            }
        });
        self.sorted = true;
    }

    fn results(&self) -> &[DocId] {
        debug_assert!(self.sorted, "results() called before sort()");
        &self.sorted_results
    }

    fn min_if_full(&self, accumulators: &AccumulatorTable) -> Option<Score> {
        if self.k == 0 || self.needed_for_top_k > 0 {
            None
        } else {
            self.slots[0].map(|m| accumulators.get(m))
        }
    }
}
