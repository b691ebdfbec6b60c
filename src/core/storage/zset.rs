// src/core/storage/zset.rs

//! The sorted set object: a skip list and a hash index kept in lockstep.
//!
//! The skip list orders elements by `(score, member)`; the hash maps each
//! member to the arena index of its skip-list node, so a score is stored
//! exactly once and the hash reaches it through the node. Every mutation
//! touches both indexes inside one call; error paths return before the
//! first index is modified.

use bytes::Bytes;

use crate::core::dict::Dict;
use crate::core::errors::ExZsetError;
use crate::core::score::MultiScore;
use crate::core::skiplist::{Iter, LexRange, ScoreRange, ZSkipList};

/// Sets at most this many times larger than the requested count use the
/// subtract strategy for unique random members.
const SUB_STRATEGY_MUL: usize = 3;

/// Extra draws allowed to the sampling strategy before it gives up.
const RANDOM_SAMPLE_LIMIT: usize = 1000;

/// Behavior switches of an upsert, from the `NX`/`XX`/`INCR` options.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpsertOptions {
    pub nx: bool,
    pub xx: bool,
    pub incr: bool,
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The element was new and was added.
    Added,
    /// The element existed and its score changed.
    Updated,
    /// The element existed and already had this score.
    Unchanged,
    /// A conditional flag suppressed the operation.
    Skipped,
}

/// A multi-score sorted set. All elements share one score arity, fixed at
/// creation.
#[derive(Debug)]
pub struct ExZset {
    zsl: ZSkipList,
    dict: Dict<usize>,
}

impl ExZset {
    pub fn new(arity: usize) -> Self {
        ExZset {
            zsl: ZSkipList::new(arity),
            dict: Dict::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.zsl.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zsl.is_empty()
    }

    pub fn arity(&self) -> usize {
        self.zsl.arity()
    }

    /// Adds, updates or increments one element.
    ///
    /// With `incr`, the current score is added into the provided one and the
    /// sum is stored; a NaN component fails with [`ExZsetError::NanResult`]
    /// and leaves the set untouched. The returned score is only materialized
    /// for `incr` callers.
    pub fn upsert(
        &mut self,
        mut score: MultiScore,
        member: &Bytes,
        opts: UpsertOptions,
    ) -> Result<(UpsertOutcome, Option<MultiScore>), ExZsetError> {
        debug_assert_eq!(score.arity(), self.arity());

        if let Some(&node_idx) = self.dict.find(member) {
            if opts.nx {
                return Ok((UpsertOutcome::Skipped, None));
            }
            let curscore = self.zsl.score(node_idx).clone();
            if opts.incr {
                score.add_assign(&curscore)?;
            }
            if score != curscore {
                let new_idx = self.zsl.update_score(&curscore, member, score);
                *self.dict.find_mut(member).expect("member is indexed") = new_idx;
                let newscore = opts.incr.then(|| self.zsl.score(new_idx).clone());
                Ok((UpsertOutcome::Updated, newscore))
            } else {
                let newscore = opts.incr.then_some(curscore);
                Ok((UpsertOutcome::Unchanged, newscore))
            }
        } else if !opts.xx {
            let newscore = opts.incr.then(|| score.clone());
            let node_idx = self.zsl.insert(score, member.clone());
            self.dict.add(member.clone(), node_idx);
            Ok((UpsertOutcome::Added, newscore))
        } else {
            Ok((UpsertOutcome::Skipped, None))
        }
    }

    /// Removes one member. Returns whether it was present.
    pub fn remove(&mut self, member: &[u8]) -> bool {
        let Some(node_idx) = self.dict.delete(member) else {
            return false;
        };
        let score = self.zsl.score(node_idx).clone();
        let removed = self.zsl.delete(&score, member);
        debug_assert!(removed, "indexes out of sync");
        self.shrink_if_needed();
        true
    }

    pub fn score_of(&mut self, member: &[u8]) -> Option<&MultiScore> {
        let &node_idx = self.dict.find(member)?;
        Some(self.zsl.score(node_idx))
    }

    /// Read-only score lookup that does not advance a pending rehash, for
    /// callers holding a shared borrow (set algebra probes).
    pub fn get_score(&self, member: &[u8]) -> Option<&MultiScore> {
        let &node_idx = self.dict.get(member)?;
        Some(self.zsl.score(node_idx))
    }

    pub fn contains(&mut self, member: &[u8]) -> bool {
        self.dict.find(member).is_some()
    }

    /// 0-based rank of a member; forward counts from the smallest element,
    /// reverse from the largest.
    pub fn rank(&mut self, member: &[u8], reverse: bool) -> Option<usize> {
        let len = self.len();
        let &node_idx = self.dict.find(member)?;
        let score = self.zsl.score(node_idx).clone();
        let rank = self.zsl.get_rank(&score, member);
        debug_assert!(rank > 0, "indexed member must have a rank");
        Some(if reverse { len - rank } else { rank - 1 })
    }

    /// Number of elements ordered strictly before `score`; the reverse form
    /// counts elements at or above it (`len - rank`).
    pub fn rank_by_score(&self, score: &MultiScore, reverse: bool) -> usize {
        let rank = self.zsl.rank_by_score(score);
        if reverse { self.len() - rank } else { rank }
    }

    /// Elements with 0-based ranks in `start..=end`; negative indexes count
    /// from the end.
    pub fn range_by_rank(&self, start: i64, end: i64, reverse: bool) -> Vec<(&Bytes, &MultiScore)> {
        let llen = self.len() as i64;
        let mut start = if start < 0 { llen + start } else { start };
        let mut end = if end < 0 { llen + end } else { end };
        if start < 0 {
            start = 0;
        }
        if start > end || start >= llen {
            return Vec::new();
        }
        if end >= llen {
            end = llen - 1;
        }
        let rangelen = (end - start + 1) as usize;

        let mut node = if reverse {
            if start > 0 {
                self.zsl.element_by_rank((llen - start) as usize)
            } else {
                self.zsl.tail()
            }
        } else if start > 0 {
            self.zsl.element_by_rank(start as usize + 1)
        } else {
            self.zsl.first()
        };

        let mut out = Vec::with_capacity(rangelen);
        for _ in 0..rangelen {
            let idx = node.expect("clamped range stays inside the list");
            out.push((self.zsl.member(idx), self.zsl.score(idx)));
            node = if reverse {
                self.zsl.prev(idx)
            } else {
                self.zsl.next(idx)
            };
        }
        out
    }

    /// Elements inside a score range, after skipping `offset` and emitting
    /// at most `limit` (negative limit = unbounded).
    pub fn range_by_score(
        &self,
        range: &ScoreRange,
        offset: i64,
        limit: i64,
        reverse: bool,
    ) -> Vec<(&Bytes, &MultiScore)> {
        if offset < 0 {
            return Vec::new();
        }
        let mut node = if reverse {
            self.zsl.last_in_range(range)
        } else {
            self.zsl.first_in_range(range)
        };
        for _ in 0..offset {
            let Some(idx) = node else { break };
            node = if reverse {
                self.zsl.prev(idx)
            } else {
                self.zsl.next(idx)
            };
        }

        let mut remaining = limit;
        let mut out = Vec::new();
        while let Some(idx) = node {
            if remaining == 0 {
                break;
            }
            // The walk started inside the range, so only the trailing bound
            // can terminate it.
            let in_range = if reverse {
                range.value_gte_min(self.zsl.score(idx))
            } else {
                range.value_lte_max(self.zsl.score(idx))
            };
            if !in_range {
                break;
            }
            out.push((self.zsl.member(idx), self.zsl.score(idx)));
            if remaining > 0 {
                remaining -= 1;
            }
            node = if reverse {
                self.zsl.prev(idx)
            } else {
                self.zsl.next(idx)
            };
        }
        out
    }

    /// Elements inside a lexicographic range; see [`Self::range_by_score`].
    pub fn range_by_lex(
        &self,
        range: &LexRange,
        offset: i64,
        limit: i64,
        reverse: bool,
    ) -> Vec<(&Bytes, &MultiScore)> {
        if offset < 0 {
            return Vec::new();
        }
        let mut node = if reverse {
            self.zsl.last_in_lex_range(range)
        } else {
            self.zsl.first_in_lex_range(range)
        };
        for _ in 0..offset {
            let Some(idx) = node else { break };
            node = if reverse {
                self.zsl.prev(idx)
            } else {
                self.zsl.next(idx)
            };
        }

        let mut remaining = limit;
        let mut out = Vec::new();
        while let Some(idx) = node {
            if remaining == 0 {
                break;
            }
            let in_range = if reverse {
                range.lex_gte_min(self.zsl.member(idx))
            } else {
                range.lex_lte_max(self.zsl.member(idx))
            };
            if !in_range {
                break;
            }
            out.push((self.zsl.member(idx), self.zsl.score(idx)));
            if remaining > 0 {
                remaining -= 1;
            }
            node = if reverse {
                self.zsl.prev(idx)
            } else {
                self.zsl.next(idx)
            };
        }
        out
    }

    /// Number of elements inside a score range, via rank arithmetic on the
    /// range's first and last nodes.
    pub fn count(&self, range: &ScoreRange) -> usize {
        let Some(first) = self.zsl.first_in_range(range) else {
            return 0;
        };
        let first_rank = self
            .zsl
            .get_rank(self.zsl.score(first), self.zsl.member(first));
        let mut count = self.len() - (first_rank - 1);
        if let Some(last) = self.zsl.last_in_range(range) {
            let last_rank = self.zsl.get_rank(self.zsl.score(last), self.zsl.member(last));
            count -= self.len() - last_rank;
        }
        count
    }

    /// Number of elements inside a lexicographic range.
    pub fn lex_count(&self, range: &LexRange) -> usize {
        let Some(first) = self.zsl.first_in_lex_range(range) else {
            return 0;
        };
        let first_rank = self
            .zsl
            .get_rank(self.zsl.score(first), self.zsl.member(first));
        let mut count = self.len() - (first_rank - 1);
        if let Some(last) = self.zsl.last_in_lex_range(range) {
            let last_rank = self.zsl.get_rank(self.zsl.score(last), self.zsl.member(last));
            count -= self.len() - last_rank;
        }
        count
    }

    /// Removes elements with 0-based ranks in `start..=end` (negatives count
    /// from the end). Returns the number removed.
    pub fn remove_range_by_rank(&mut self, start: i64, end: i64) -> usize {
        let llen = self.len() as i64;
        let mut start = if start < 0 { llen + start } else { start };
        let mut end = if end < 0 { llen + end } else { end };
        if start < 0 {
            start = 0;
        }
        if start > end || start >= llen {
            return 0;
        }
        if end >= llen {
            end = llen - 1;
        }
        let removed =
            self.zsl
                .delete_range_by_rank(start as usize + 1, end as usize + 1, &mut self.dict);
        self.shrink_if_needed();
        removed
    }

    pub fn remove_range_by_score(&mut self, range: &ScoreRange) -> usize {
        let removed = self.zsl.delete_range_by_score(range, &mut self.dict);
        self.shrink_if_needed();
        removed
    }

    pub fn remove_range_by_lex(&mut self, range: &LexRange) -> usize {
        let removed = self.zsl.delete_range_by_lex(range, &mut self.dict);
        self.shrink_if_needed();
        removed
    }

    fn shrink_if_needed(&mut self) {
        if self.dict.needs_resize() {
            self.dict.resize();
        }
    }

    /// One fair-random element of a non-empty set.
    pub fn random_member(&mut self) -> Option<(Bytes, MultiScore)> {
        let (member, node_idx) = self.dict.fair_random_key()?;
        let score = self.zsl.score(node_idx).clone();
        Some((member, score))
    }

    /// Up to `count` distinct random elements, strategy chosen by the ratio
    /// of `count` to the set size.
    pub fn random_members_unique(&mut self, count: usize) -> Vec<(Bytes, MultiScore)> {
        let size = self.len();
        if count == 0 {
            return Vec::new();
        }

        // The whole set is cheaper than sampling it.
        if count >= size {
            return self
                .iter()
                .map(|(m, s)| (m.clone(), s.clone()))
                .collect();
        }

        if count * SUB_STRATEGY_MUL > size {
            // Near-complete request: copy everything into a scratch table
            // and evict uniform-random entries until `count` remain.
            let mut scratch: Dict<usize> = Dict::new();
            scratch.expand(size);
            let mut cur = self.zsl.first();
            while let Some(idx) = cur {
                scratch.add(self.zsl.member(idx).clone(), idx);
                cur = self.zsl.next(idx);
            }
            debug_assert_eq!(scratch.len(), size);

            let mut remaining = size;
            while remaining > count {
                let (victim, _) = scratch.random_key().expect("scratch is non-empty");
                scratch.delete(&victim);
                remaining -= 1;
            }
            scratch
                .iter()
                .map(|(m, &idx)| (m.clone(), self.zsl.score(idx).clone()))
                .collect()
        } else {
            // Sparse request: draw fair-random elements and dedupe until
            // enough distinct ones accumulate. The budget bounds the loop
            // against pathological draws.
            let mut seen: Dict<()> = Dict::new();
            seen.expand(count);
            let mut out = Vec::with_capacity(count);
            let mut budget = count + RANDOM_SAMPLE_LIMIT;
            while out.len() < count && budget > 0 {
                budget -= 1;
                let Some((member, node_idx)) = self.dict.fair_random_key() else {
                    break;
                };
                if !seen.add(member.clone(), ()) {
                    continue;
                }
                out.push((member, self.zsl.score(node_idx).clone()));
            }
            out
        }
    }

    /// One step of a cursor-driven traversal over the hash index.
    pub fn scan(&self, cursor: u64, mut visit: impl FnMut(&Bytes, &MultiScore)) -> u64 {
        let zsl = &self.zsl;
        self.dict.scan(cursor, |member, &node_idx| {
            visit(member, zsl.score(node_idx));
        })
    }

    /// Ascending `(member, score)` iteration.
    pub fn iter(&self) -> Iter<'_> {
        self.zsl.iter()
    }

    /// Descending `(member, score)` iteration (tail to head).
    pub fn iter_rev(&self) -> impl Iterator<Item = (&Bytes, &MultiScore)> {
        let mut cur = self.zsl.tail();
        std::iter::from_fn(move || {
            let idx = cur?;
            cur = self.zsl.prev(idx);
            Some((self.zsl.member(idx), self.zsl.score(idx)))
        })
    }

    /// Hash-order `(member, score)` iteration, for consumers that do not
    /// need the sorted order.
    pub fn iter_unordered(&self) -> impl Iterator<Item = (&Bytes, &MultiScore)> {
        self.dict
            .iter()
            .map(|(member, &node_idx)| (member, self.zsl.score(node_idx)))
    }

    /// Direct insert of an element known to be absent, bypassing the upsert
    /// checks. Used when materializing a set from already-deduplicated data
    /// (persistence load, set-algebra results).
    pub fn insert_unique(&mut self, score: MultiScore, member: Bytes) {
        debug_assert_eq!(score.arity(), self.arity());
        let node_idx = self.zsl.insert(score, member.clone());
        let added = self.dict.add(member, node_idx);
        debug_assert!(added, "insert_unique on an existing member");
    }

    /// Pre-sizes the hash index for `n` elements.
    pub fn reserve(&mut self, n: usize) {
        self.dict.expand(n);
    }

    /// Approximate heap footprint in bytes.
    pub fn mem_usage(&self) -> usize {
        let mut size = std::mem::size_of::<Self>()
            + self.dict.slots() * std::mem::size_of::<usize>()
            + self.len() * std::mem::size_of::<usize>() * 4;
        for (member, score) in self.iter() {
            size += member.len() + score.arity() * std::mem::size_of::<f64>();
        }
        size
    }

    /// Cost hint for asynchronous reclamation: one unit per element.
    pub fn free_effort(&self) -> usize {
        self.len()
    }

    /// Cross-index consistency check used by tests.
    #[doc(hidden)]
    pub fn check_invariants(&mut self) {
        self.zsl.check_invariants();
        assert_eq!(self.zsl.len(), self.dict.len(), "index lengths diverge");
        let mut members: Vec<Bytes> = self.iter().map(|(m, _)| m.clone()).collect();
        for member in members.drain(..) {
            let &node_idx = self.dict.get(&member).expect("member missing from hash");
            assert_eq!(
                self.zsl.member(node_idx).as_ref(),
                member.as_ref(),
                "hash points at the wrong node"
            );
        }
    }
}
