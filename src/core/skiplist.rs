// src/core/skiplist.rs

//! Probabilistic ordered index keyed by `(score, member)`.
//!
//! Forward pointers carry span counts so rank queries run in O(log n);
//! level 0 is doubly linked for reverse iteration. Nodes live in an arena
//! (`Vec`) and link to each other by index, with a free list recycling the
//! slots of deleted nodes. Index 0 is the header sentinel.
//!
//! The skip list stores no duplicate `(score, member)` pairs; the caller
//! checks membership in the companion hash before inserting.

use std::cmp::Ordering;

use bytes::Bytes;
use rand::Rng;

use crate::core::dict::Dict;
use crate::core::errors::ExZsetError;
use crate::core::score::MultiScore;

/// Enough for 2^64 elements.
pub const SKIPLIST_MAXLEVEL: usize = 64;

const HEAD: usize = 0;

#[derive(Debug, Clone, Copy, Default)]
struct Level {
    forward: Option<usize>,
    span: usize,
}

#[derive(Debug)]
struct Node {
    member: Bytes,
    score: MultiScore,
    backward: Option<usize>,
    levels: Vec<Level>,
}

/// The skip list. `level` is the highest level currently in use (>= 1).
#[derive(Debug)]
pub struct ZSkipList {
    nodes: Vec<Node>,
    free: Vec<usize>,
    tail: Option<usize>,
    length: usize,
    level: usize,
    arity: usize,
}

impl ZSkipList {
    pub fn new(arity: usize) -> Self {
        let header = Node {
            member: Bytes::new(),
            score: MultiScore::zeroed(arity),
            backward: None,
            levels: vec![Level::default(); SKIPLIST_MAXLEVEL],
        };
        ZSkipList {
            nodes: vec![header],
            free: Vec::new(),
            tail: None,
            length: 0,
            level: 1,
            arity,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn member(&self, idx: usize) -> &Bytes {
        &self.nodes[idx].member
    }

    pub fn score(&self, idx: usize) -> &MultiScore {
        &self.nodes[idx].score
    }

    /// First node in ascending order.
    pub fn first(&self) -> Option<usize> {
        self.nodes[HEAD].levels[0].forward
    }

    pub fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub fn next(&self, idx: usize) -> Option<usize> {
        self.nodes[idx].levels[0].forward
    }

    pub fn prev(&self, idx: usize) -> Option<usize> {
        self.nodes[idx].backward
    }

    /// Iterates `(member, score)` pairs in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            next: self.first(),
        }
    }

    /// Geometric level draw with p = 1/4, saturated at the maximum.
    fn random_level(&self) -> usize {
        let mut rng = rand::thread_rng();
        let mut level = 1;
        while level < SKIPLIST_MAXLEVEL && rng.gen_ratio(1, 4) {
            level += 1;
        }
        level
    }

    fn alloc_node(&mut self, level: usize, score: MultiScore, member: Bytes) -> usize {
        let node = Node {
            member,
            score,
            backward: None,
            levels: vec![Level::default(); level],
        };
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release_node(&mut self, idx: usize) {
        // The slot keeps a hollow node until reused; members drop their
        // reference here.
        self.nodes[idx] = Node {
            member: Bytes::new(),
            score: MultiScore::zeroed(0),
            backward: None,
            levels: Vec::new(),
        };
        self.free.push(idx);
    }

    /// `(score, member)` order: score first, member bytes break ties.
    fn precedes(&self, idx: usize, score: &MultiScore, member: &[u8]) -> bool {
        let node = &self.nodes[idx];
        match node.score.cmp(score) {
            Ordering::Less => true,
            Ordering::Equal => node.member.as_ref() < member,
            Ordering::Greater => false,
        }
    }

    /// Inserts a new node. The caller guarantees the element is not already
    /// present (membership is tested in the companion hash). Returns the
    /// arena index of the new node.
    pub fn insert(&mut self, score: MultiScore, member: Bytes) -> usize {
        let mut update = [HEAD; SKIPLIST_MAXLEVEL];
        let mut rank = [0usize; SKIPLIST_MAXLEVEL];

        let mut x = HEAD;
        for i in (0..self.level).rev() {
            // Accumulate the rank crossed to reach the insert position.
            rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };
            while let Some(next) = self.nodes[x].levels[i].forward {
                if !self.precedes(next, &score, &member) {
                    break;
                }
                rank[i] += self.nodes[x].levels[i].span;
                x = next;
            }
            update[i] = x;
        }

        let level = self.random_level();
        if level > self.level {
            for i in self.level..level {
                rank[i] = 0;
                update[i] = HEAD;
                self.nodes[HEAD].levels[i].span = self.length;
            }
            self.level = level;
        }

        let x = self.alloc_node(level, score, member);
        for i in 0..level {
            self.nodes[x].levels[i].forward = self.nodes[update[i]].levels[i].forward;
            self.nodes[update[i]].levels[i].forward = Some(x);

            // Split the span covered by update[i] around the new node.
            let crossed = rank[0] - rank[i];
            self.nodes[x].levels[i].span = self.nodes[update[i]].levels[i].span - crossed;
            self.nodes[update[i]].levels[i].span = crossed + 1;
        }

        // Levels above the new node gain one element underneath.
        for i in level..self.level {
            self.nodes[update[i]].levels[i].span += 1;
        }

        self.nodes[x].backward = if update[0] == HEAD {
            None
        } else {
            Some(update[0])
        };
        if let Some(fwd) = self.nodes[x].levels[0].forward {
            self.nodes[fwd].backward = Some(x);
        } else {
            self.tail = Some(x);
        }
        self.length += 1;
        x
    }

    /// Unlinks `x` using the recorded predecessors, fixing spans, backward
    /// links, the tail, and the level count. The slot is not released.
    fn unlink_node(&mut self, x: usize, update: &[usize; SKIPLIST_MAXLEVEL]) {
        for i in 0..self.level {
            let u = update[i];
            if self.nodes[u].levels[i].forward == Some(x) {
                let x_span = self.nodes[x].levels[i].span;
                self.nodes[u].levels[i].span += x_span - 1;
                self.nodes[u].levels[i].forward = self.nodes[x].levels[i].forward;
            } else {
                self.nodes[u].levels[i].span -= 1;
            }
        }
        if let Some(fwd) = self.nodes[x].levels[0].forward {
            self.nodes[fwd].backward = self.nodes[x].backward;
        } else {
            self.tail = self.nodes[x].backward;
        }
        while self.level > 1 && self.nodes[HEAD].levels[self.level - 1].forward.is_none() {
            self.level -= 1;
        }
        self.length -= 1;
    }

    /// Records, per level, the last node strictly preceding `(score, member)`.
    fn find_update(
        &self,
        score: &MultiScore,
        member: &[u8],
    ) -> ([usize; SKIPLIST_MAXLEVEL], usize) {
        let mut update = [HEAD; SKIPLIST_MAXLEVEL];
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].levels[i].forward {
                if !self.precedes(next, score, member) {
                    break;
                }
                x = next;
            }
            update[i] = x;
        }
        (update, x)
    }

    /// Deletes the element with matching score and member. Returns whether
    /// the node was found and removed.
    pub fn delete(&mut self, score: &MultiScore, member: &[u8]) -> bool {
        let (update, x) = self.find_update(score, member);
        if let Some(target) = self.nodes[x].levels[0].forward
            && self.nodes[target].score == *score
            && self.nodes[target].member.as_ref() == member
        {
            self.unlink_node(target, &update);
            self.release_node(target);
            return true;
        }
        false
    }

    /// Moves an element to its new score. The element must exist with
    /// exactly `curscore`. When the new score keeps the node between its
    /// current neighbors the score is overwritten in place; otherwise the
    /// node is unlinked and re-inserted, reusing the member reference.
    /// Returns the (possibly new) node index.
    pub fn update_score(
        &mut self,
        curscore: &MultiScore,
        member: &[u8],
        newscore: MultiScore,
    ) -> usize {
        let (update, x) = self.find_update(curscore, member);
        let target = self.nodes[x].levels[0].forward.expect("element must exist");
        debug_assert!(
            self.nodes[target].score == *curscore && self.nodes[target].member.as_ref() == member
        );

        let backward_ok = match self.nodes[target].backward {
            None => true,
            Some(b) => self.nodes[b].score < newscore,
        };
        let forward_ok = match self.nodes[target].levels[0].forward {
            None => true,
            Some(f) => newscore < self.nodes[f].score,
        };
        if backward_ok && forward_ok {
            self.nodes[target].score = newscore;
            return target;
        }

        self.unlink_node(target, &update);
        let member = self.nodes[target].member.clone();
        self.release_node(target);
        self.insert(newscore, member)
    }

    /// Number of nodes with a score strictly less than `score` (0-based).
    pub fn rank_by_score(&self, score: &MultiScore) -> usize {
        let mut rank = 0;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].levels[i].forward {
                if self.nodes[next].score >= *score {
                    break;
                }
                rank += self.nodes[x].levels[i].span;
                x = next;
            }
        }
        rank
    }

    /// 1-based rank of the element with the given score and member;
    /// 0 when the element is not in the list.
    pub fn get_rank(&self, score: &MultiScore, member: &[u8]) -> usize {
        let mut rank = 0;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].levels[i].forward {
                let node = &self.nodes[next];
                let advance = match node.score.cmp(score) {
                    Ordering::Less => true,
                    Ordering::Equal => node.member.as_ref() <= member,
                    Ordering::Greater => false,
                };
                if !advance {
                    break;
                }
                rank += self.nodes[x].levels[i].span;
                x = next;
            }
            if x != HEAD && self.nodes[x].member.as_ref() == member {
                return rank;
            }
        }
        0
    }

    /// Finds a node by its 1-based rank.
    pub fn element_by_rank(&self, rank: usize) -> Option<usize> {
        let mut traversed = 0;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].levels[i].forward {
                if traversed + self.nodes[x].levels[i].span > rank {
                    break;
                }
                traversed += self.nodes[x].levels[i].span;
                x = next;
            }
            if traversed == rank && x != HEAD {
                return Some(x);
            }
        }
        None
    }

    /// Whether any part of the list falls inside the score range.
    pub fn is_in_range(&self, range: &ScoreRange) -> bool {
        if range.is_empty_range() {
            return false;
        }
        let Some(tail) = self.tail else {
            return false;
        };
        if !range.value_gte_min(&self.nodes[tail].score) {
            return false;
        }
        let Some(first) = self.first() else {
            return false;
        };
        range.value_lte_max(&self.nodes[first].score)
    }

    /// First node with a score inside the range, if any.
    pub fn first_in_range(&self, range: &ScoreRange) -> Option<usize> {
        if !self.is_in_range(range) {
            return None;
        }
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            // Go forward while *out* of range.
            while let Some(next) = self.nodes[x].levels[i].forward {
                if range.value_gte_min(&self.nodes[next].score) {
                    break;
                }
                x = next;
            }
        }
        let x = self.nodes[x].levels[0].forward.expect("range is non-empty");
        range.value_lte_max(&self.nodes[x].score).then_some(x)
    }

    /// Last node with a score inside the range, if any.
    pub fn last_in_range(&self, range: &ScoreRange) -> Option<usize> {
        if !self.is_in_range(range) {
            return None;
        }
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            // Go forward while *in* range.
            while let Some(next) = self.nodes[x].levels[i].forward {
                if !range.value_lte_max(&self.nodes[next].score) {
                    break;
                }
                x = next;
            }
        }
        range.value_gte_min(&self.nodes[x].score).then_some(x)
    }

    /// Whether any part of the list falls inside the lex range.
    pub fn is_in_lex_range(&self, range: &LexRange) -> bool {
        if range.is_empty_range() {
            return false;
        }
        let Some(tail) = self.tail else {
            return false;
        };
        if !range.lex_gte_min(&self.nodes[tail].member) {
            return false;
        }
        let Some(first) = self.first() else {
            return false;
        };
        range.lex_lte_max(&self.nodes[first].member)
    }

    pub fn first_in_lex_range(&self, range: &LexRange) -> Option<usize> {
        if !self.is_in_lex_range(range) {
            return None;
        }
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].levels[i].forward {
                if range.lex_gte_min(&self.nodes[next].member) {
                    break;
                }
                x = next;
            }
        }
        let x = self.nodes[x].levels[0].forward.expect("range is non-empty");
        range.lex_lte_max(&self.nodes[x].member).then_some(x)
    }

    pub fn last_in_lex_range(&self, range: &LexRange) -> Option<usize> {
        if !self.is_in_lex_range(range) {
            return None;
        }
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].levels[i].forward {
                if !range.lex_lte_max(&self.nodes[next].member) {
                    break;
                }
                x = next;
            }
        }
        range.lex_gte_min(&self.nodes[x].member).then_some(x)
    }

    /// Deletes all elements with scores inside the range, removing each
    /// member from the companion hash in the same pass. Returns the count.
    pub fn delete_range_by_score(&mut self, range: &ScoreRange, dict: &mut Dict<usize>) -> usize {
        let mut update = [HEAD; SKIPLIST_MAXLEVEL];
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].levels[i].forward {
                if range.value_gte_min(&self.nodes[next].score) {
                    break;
                }
                x = next;
            }
            update[i] = x;
        }

        let mut removed = 0;
        let mut cur = self.nodes[x].levels[0].forward;
        while let Some(idx) = cur {
            if !range.value_lte_max(&self.nodes[idx].score) {
                break;
            }
            let next = self.nodes[idx].levels[0].forward;
            let member = self.nodes[idx].member.clone();
            self.unlink_node(idx, &update);
            dict.delete(&member);
            self.release_node(idx);
            removed += 1;
            cur = next;
        }
        removed
    }

    /// Deletes all elements inside the lex range; see
    /// [`Self::delete_range_by_score`].
    pub fn delete_range_by_lex(&mut self, range: &LexRange, dict: &mut Dict<usize>) -> usize {
        let mut update = [HEAD; SKIPLIST_MAXLEVEL];
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].levels[i].forward {
                if range.lex_gte_min(&self.nodes[next].member) {
                    break;
                }
                x = next;
            }
            update[i] = x;
        }

        let mut removed = 0;
        let mut cur = self.nodes[x].levels[0].forward;
        while let Some(idx) = cur {
            if !range.lex_lte_max(&self.nodes[idx].member) {
                break;
            }
            let next = self.nodes[idx].levels[0].forward;
            let member = self.nodes[idx].member.clone();
            self.unlink_node(idx, &update);
            dict.delete(&member);
            self.release_node(idx);
            removed += 1;
            cur = next;
        }
        removed
    }

    /// Deletes all elements with 1-based rank in `start..=end`.
    pub fn delete_range_by_rank(
        &mut self,
        start: usize,
        end: usize,
        dict: &mut Dict<usize>,
    ) -> usize {
        let mut update = [HEAD; SKIPLIST_MAXLEVEL];
        let mut traversed = 0;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            while let Some(next) = self.nodes[x].levels[i].forward {
                if traversed + self.nodes[x].levels[i].span >= start {
                    break;
                }
                traversed += self.nodes[x].levels[i].span;
                x = next;
            }
            update[i] = x;
        }

        let mut removed = 0;
        traversed += 1;
        let mut cur = self.nodes[x].levels[0].forward;
        while let Some(idx) = cur {
            if traversed > end {
                break;
            }
            let next = self.nodes[idx].levels[0].forward;
            let member = self.nodes[idx].member.clone();
            self.unlink_node(idx, &update);
            dict.delete(&member);
            self.release_node(idx);
            removed += 1;
            traversed += 1;
            cur = next;
        }
        removed
    }

    /// Verifies the structural invariants: strictly increasing level-0
    /// order and span consistency at every level. Used by tests.
    #[doc(hidden)]
    pub fn check_invariants(&self) {
        // Level 0 is strictly increasing by (score, member) and the links
        // are doubly consistent.
        let mut count = 0;
        let mut prev: Option<usize> = None;
        let mut cur = self.first();
        while let Some(idx) = cur {
            if let Some(p) = prev {
                let ord = self.nodes[p]
                    .score
                    .cmp(&self.nodes[idx].score)
                    .then_with(|| self.nodes[p].member.cmp(&self.nodes[idx].member));
                assert_eq!(ord, Ordering::Less, "level 0 must be strictly increasing");
            }
            assert_eq!(self.nodes[idx].backward, prev, "backward link mismatch");
            count += 1;
            prev = cur;
            cur = self.nodes[idx].levels[0].forward;
        }
        assert_eq!(count, self.length, "length does not match level-0 chain");
        assert_eq!(self.tail, prev, "tail does not match last node");

        // Every span equals the number of level-0 steps to the level
        // successor (to the end for the last node of a level), and the
        // spans along each level chain sum to the length.
        for lvl in 0..self.level {
            let mut x = HEAD;
            let mut covered = 0;
            loop {
                let Level { forward, span } = self.nodes[x].levels[lvl];
                match forward {
                    Some(next) => {
                        let mut steps = 0;
                        let mut walk = x;
                        while walk != next {
                            walk = self.nodes[walk].levels[0].forward.expect("chain break");
                            steps += 1;
                        }
                        assert_eq!(span, steps, "span mismatch at level {lvl}");
                        covered += span;
                        x = next;
                    }
                    None => {
                        let mut steps = 0;
                        let mut walk = x;
                        while let Some(n) = self.nodes[walk].levels[0].forward {
                            walk = n;
                            steps += 1;
                        }
                        assert_eq!(span, steps, "tail span mismatch at level {lvl}");
                        covered += span;
                        break;
                    }
                }
            }
            assert_eq!(covered, self.length, "spans at level {lvl} must cover all");
        }
    }
}

/// Ascending iterator over `(member, score)` pairs.
pub struct Iter<'a> {
    list: &'a ZSkipList,
    next: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Bytes, &'a MultiScore);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        self.next = self.list.nodes[idx].levels[0].forward;
        Some((&self.list.nodes[idx].member, &self.list.nodes[idx].score))
    }
}

/// A score interval with independently exclusive bounds.
#[derive(Debug, Clone)]
pub struct ScoreRange {
    pub min: MultiScore,
    pub max: MultiScore,
    pub minex: bool,
    pub maxex: bool,
}

impl ScoreRange {
    /// Parses the two boundary arguments of a score range command. A `(`
    /// prefix marks a bound exclusive.
    pub fn parse(min: &[u8], max: &[u8]) -> Result<Self, ExZsetError> {
        let (min, minex) = match min.strip_prefix(b"(") {
            Some(rest) => (rest, true),
            None => (min, false),
        };
        let (max, maxex) = match max.strip_prefix(b"(") {
            Some(rest) => (rest, true),
            None => (max, false),
        };
        let min = MultiScore::parse(min).map_err(|_| ExZsetError::RangeFormat)?;
        let max = MultiScore::parse(max).map_err(|_| ExZsetError::RangeFormat)?;
        Ok(ScoreRange {
            min,
            max,
            minex,
            maxex,
        })
    }

    /// Whether both bounds carry the given arity. A range with either bound
    /// off-schema must be rejected before any comparison against the set.
    pub fn validate_arity(&self, arity: usize) -> bool {
        self.min.arity() == arity && self.max.arity() == arity
    }

    /// A range that can never match anything.
    fn is_empty_range(&self) -> bool {
        match self.min.cmp(&self.max) {
            Ordering::Greater => true,
            Ordering::Equal => self.minex || self.maxex,
            Ordering::Less => false,
        }
    }

    pub fn value_gte_min(&self, value: &MultiScore) -> bool {
        if self.minex {
            *value > self.min
        } else {
            *value >= self.min
        }
    }

    pub fn value_lte_max(&self, value: &MultiScore) -> bool {
        if self.maxex {
            *value < self.max
        } else {
            *value <= self.max
        }
    }
}

/// One boundary of a lexicographic range. `Min` and `Max` compare below and
/// above every member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexBound {
    Min,
    Max,
    Inclusive(Bytes),
    Exclusive(Bytes),
}

impl LexBound {
    /// Parses one boundary argument: `-`, `+`, `[value` or `(value`.
    pub fn parse(raw: &[u8]) -> Result<Self, ExZsetError> {
        match raw.first().copied() {
            Some(b'+') if raw.len() == 1 => Ok(LexBound::Max),
            Some(b'-') if raw.len() == 1 => Ok(LexBound::Min),
            Some(b'[') => Ok(LexBound::Inclusive(Bytes::copy_from_slice(&raw[1..]))),
            Some(b'(') => Ok(LexBound::Exclusive(Bytes::copy_from_slice(&raw[1..]))),
            _ => Err(ExZsetError::LexRangeFormat),
        }
    }

    /// Sentinels behave as open bounds in the empty-range test.
    fn is_exclusive(&self) -> bool {
        !matches!(self, LexBound::Inclusive(_))
    }

    /// Orders boundary *values*, ignoring exclusivity.
    fn value_cmp(&self, other: &LexBound) -> Ordering {
        use LexBound::*;
        match (self, other) {
            (Min, Min) | (Max, Max) => Ordering::Equal,
            (Min, _) | (_, Max) => Ordering::Less,
            (Max, _) | (_, Min) => Ordering::Greater,
            (Inclusive(a) | Exclusive(a), Inclusive(b) | Exclusive(b)) => a.cmp(b),
        }
    }
}

/// A lexicographic member interval.
#[derive(Debug, Clone)]
pub struct LexRange {
    pub min: LexBound,
    pub max: LexBound,
}

impl LexRange {
    pub fn parse(min: &[u8], max: &[u8]) -> Result<Self, ExZsetError> {
        Ok(LexRange {
            min: LexBound::parse(min)?,
            max: LexBound::parse(max)?,
        })
    }

    fn is_empty_range(&self) -> bool {
        match self.min.value_cmp(&self.max) {
            Ordering::Greater => true,
            Ordering::Equal => self.min.is_exclusive() || self.max.is_exclusive(),
            Ordering::Less => false,
        }
    }

    pub fn lex_gte_min(&self, member: &[u8]) -> bool {
        match &self.min {
            LexBound::Min => true,
            LexBound::Max => false,
            LexBound::Inclusive(b) => member >= b.as_ref(),
            LexBound::Exclusive(b) => member > b.as_ref(),
        }
    }

    pub fn lex_lte_max(&self, member: &[u8]) -> bool {
        match &self.max {
            LexBound::Min => false,
            LexBound::Max => true,
            LexBound::Inclusive(b) => member <= b.as_ref(),
            LexBound::Exclusive(b) => member < b.as_ref(),
        }
    }
}
