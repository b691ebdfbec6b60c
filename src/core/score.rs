// src/core/score.rs

//! The composite score: an ordered tuple of doubles compared lexicographically.
//!
//! Every element of a sorted set carries one `MultiScore`, and all scores in
//! one set share the same arity. The textual form is `d1#d2#...#dk` with no
//! empty components; NaN is rejected everywhere and never stored.

use std::cmp::Ordering;
use std::fmt;

use crate::core::errors::ExZsetError;

/// Delimiter between components in the textual score form.
pub const SCORE_DELIMITER: u8 = b'#';

/// Maximum number of components in a single score.
pub const MAX_SCORE_NUM: usize = 255;

/// Reducer applied when union/intersection merges two scores for one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregate {
    #[default]
    Sum,
    Min,
    Max,
}

/// A tuple of doubles used as a sort key. Arity is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiScore {
    scores: Vec<f64>,
}

impl MultiScore {
    /// A score of the given arity with every component zero.
    pub fn zeroed(arity: usize) -> Self {
        MultiScore {
            scores: vec![0.0; arity],
        }
    }

    pub fn from_values(scores: Vec<f64>) -> Self {
        MultiScore { scores }
    }

    /// Parses the `d1#d2#...#dk` textual form.
    ///
    /// Rejects the empty string, leading/trailing/adjacent delimiters, more
    /// than [`MAX_SCORE_NUM`] components, and any component that is not a
    /// finite or infinite double (NaN included).
    pub fn parse(raw: &[u8]) -> Result<Self, ExZsetError> {
        if raw.is_empty() || raw[0] == SCORE_DELIMITER || raw[raw.len() - 1] == SCORE_DELIMITER {
            return Err(ExZsetError::ScoreFormat);
        }

        let mut scores = Vec::new();
        for token in raw.split(|&b| b == SCORE_DELIMITER) {
            if token.is_empty() {
                return Err(ExZsetError::ScoreFormat);
            }
            let text = std::str::from_utf8(token).map_err(|_| ExZsetError::ScoreFormat)?;
            let value: f64 = text.parse().map_err(|_| ExZsetError::ScoreFormat)?;
            if value.is_nan() {
                return Err(ExZsetError::ScoreFormat);
            }
            scores.push(value);
        }

        if scores.len() > MAX_SCORE_NUM {
            return Err(ExZsetError::ScoreFormat);
        }
        Ok(MultiScore { scores })
    }

    pub fn arity(&self) -> usize {
        self.scores.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.scores
    }

    /// Component-wise `self += other`. A NaN result aborts with
    /// [`ExZsetError::NanResult`]; the content of `self` is unspecified
    /// afterwards and the caller must discard it.
    pub fn add_assign(&mut self, other: &MultiScore) -> Result<(), ExZsetError> {
        debug_assert_eq!(self.arity(), other.arity());
        for (dst, src) in self.scores.iter_mut().zip(&other.scores) {
            *dst += src;
            if dst.is_nan() {
                return Err(ExZsetError::NanResult);
            }
        }
        Ok(())
    }

    /// Component-wise add that leaves components untouched when the sum would
    /// be NaN. Used by the SUM aggregation path.
    pub fn add_ignore_nan(&mut self, other: &MultiScore) {
        debug_assert_eq!(self.arity(), other.arity());
        for (dst, src) in self.scores.iter_mut().zip(&other.scores) {
            let sum = *dst + src;
            if !sum.is_nan() {
                *dst = sum;
            }
        }
    }

    /// `self[i] = src[i] * weight` for every component.
    pub fn scale_from(&mut self, src: &MultiScore, weight: f64) {
        debug_assert_eq!(self.arity(), src.arity());
        for (dst, s) in self.scores.iter_mut().zip(&src.scores) {
            *dst = s * weight;
        }
    }

    /// In-place variant of [`Self::scale_from`] for the aliased case.
    pub fn scale(&mut self, weight: f64) {
        for dst in &mut self.scores {
            *dst *= weight;
        }
    }

    /// A fresh copy of `src` scaled by `weight`.
    pub fn scaled(src: &MultiScore, weight: f64) -> Self {
        let mut out = src.clone();
        out.scale(weight);
        out
    }

    /// Folds `other` into `self` according to the aggregation mode.
    pub fn aggregate_from(&mut self, other: &MultiScore, aggregate: Aggregate) {
        match aggregate {
            Aggregate::Sum => self.add_ignore_nan(other),
            Aggregate::Min => {
                if other.cmp(self) == Ordering::Less {
                    self.scores.copy_from_slice(&other.scores);
                }
            }
            Aggregate::Max => {
                if other.cmp(self) == Ordering::Greater {
                    self.scores.copy_from_slice(&other.scores);
                }
            }
        }
    }
}

impl Eq for MultiScore {}

impl Ord for MultiScore {
    /// Lexicographic component-wise order. Comparing scores of different
    /// arity is a programming error.
    fn cmp(&self, other: &Self) -> Ordering {
        assert_eq!(
            self.arity(),
            other.arity(),
            "comparing scores of different arity"
        );
        for (a, b) in self.scores.iter().zip(&other.scores) {
            match a.partial_cmp(b).unwrap_or(Ordering::Equal) {
                Ordering::Equal => continue,
                non_eq => return non_eq,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for MultiScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Renders one component the way the textual format requires: integral
/// doubles without a fractional part, everything else in shortest
/// round-trip form, infinities as `inf`/`-inf`.
fn format_component(value: f64, out: &mut String) {
    if value.is_infinite() {
        out.push_str(if value > 0.0 { "inf" } else { "-inf" });
    } else if value == value.trunc() && value > i64::MIN as f64 && value < i64::MAX as f64 {
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(value as i64));
    } else {
        let mut buf = ryu::Buffer::new();
        out.push_str(buf.format_finite(value));
    }
}

impl fmt::Display for MultiScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        for (i, &value) in self.scores.iter().enumerate() {
            if i > 0 {
                text.push(SCORE_DELIMITER as char);
            }
            format_component(value, &mut text);
        }
        f.write_str(&text)
    }
}
