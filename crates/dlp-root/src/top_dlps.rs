//! # Top-K Selection
//!
//! Ranks eligible DLPs by live stake total, highest first, ties broken by
//! lower id. Selection keeps a bounded min-heap of size `k`, so a pass over
//! `n` candidates costs `O(n log k)` instead of a full sort.

use crate::registry::DlpRegistry;
use dlp_core::{Amount, DlpId};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Ranking key: greater is better
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rank {
    stake_amount: Amount,
    dlp_id: DlpId,
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.stake_amount
            .cmp(&other.stake_amount)
            .then_with(|| other.dlp_id.cmp(&self.dlp_id))
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Bounded top-K selector over `(dlp_id, stake_amount)` candidates
#[derive(Debug)]
pub struct TopKSelector {
    limit: usize,
    heap: BinaryHeap<Reverse<Rank>>,
}

impl TopKSelector {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            heap: BinaryHeap::with_capacity(limit.saturating_add(1)),
        }
    }

    pub fn offer(&mut self, dlp_id: DlpId, stake_amount: Amount) {
        if self.limit == 0 {
            return;
        }
        let rank = Rank { stake_amount, dlp_id };
        if self.heap.len() < self.limit {
            self.heap.push(Reverse(rank));
        } else if self.heap.peek().map_or(false, |Reverse(worst)| rank > *worst) {
            self.heap.pop();
            self.heap.push(Reverse(rank));
        }
    }

    /// Selected ids, best first
    pub fn finish(self) -> Vec<DlpId> {
        // Ascending order of Reverse<Rank> is descending rank
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(rank)| rank.dlp_id)
            .collect()
    }
}

/// Top `k` eligible DLPs by current stake total
pub fn top_dlp_ids(registry: &DlpRegistry, k: usize) -> Vec<DlpId> {
    let mut selector = TopKSelector::new(k);
    for dlp_id in registry.eligible().iter() {
        if let Ok(dlp) = registry.get(dlp_id) {
            selector.offer(dlp_id, dlp.stake_amount);
        }
    }
    selector.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn select(candidates: &[(DlpId, Amount)], k: usize) -> Vec<DlpId> {
        let mut selector = TopKSelector::new(k);
        for &(id, amount) in candidates {
            selector.offer(id, amount);
        }
        selector.finish()
    }

    #[test]
    fn test_orders_by_stake_descending() {
        let candidates = [(1, 101), (2, 102), (3, 103), (4, 104), (5, 105)];
        assert_eq!(select(&candidates, 3), vec![5, 4, 3]);
    }

    #[test]
    fn test_ties_break_on_lower_id() {
        let candidates = [(1, 101), (2, 106), (3, 103), (4, 103), (5, 103)];
        assert_eq!(select(&candidates, 3), vec![2, 3, 4]);
    }

    #[test]
    fn test_fewer_candidates_than_limit() {
        assert_eq!(select(&[(7, 5), (3, 9)], 10), vec![3, 7]);
        assert!(select(&[], 4).is_empty());
    }

    #[test]
    fn test_zero_limit() {
        assert!(select(&[(1, 10)], 0).is_empty());
    }

    proptest! {
        #[test]
        fn prop_matches_full_sort(
            amounts in proptest::collection::vec(0u128..50, 0..60),
            k in 0usize..20,
        ) {
            let candidates: Vec<(DlpId, Amount)> = amounts
                .iter()
                .enumerate()
                .map(|(i, a)| (i as DlpId + 1, *a))
                .collect();

            let mut sorted = candidates.clone();
            sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            let expected: Vec<DlpId> = sorted.into_iter().take(k).map(|(id, _)| id).collect();

            prop_assert_eq!(select(&candidates, k), expected);
        }
    }
}
