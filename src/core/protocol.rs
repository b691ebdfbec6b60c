// src/core/protocol.rs

//! Reply values produced by the command layer.
//!
//! The host owns the wire format; commands return this value tree and the
//! host renders it. Only the shapes the sorted-set surface emits exist.

use bytes::Bytes;

use crate::core::score::MultiScore;

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Null,
    Integer(i64),
    Bulk(Bytes),
    Array(Vec<Reply>),
}

impl Reply {
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Reply::Bulk(data.into())
    }

    /// A score rendered in its textual `d1#d2#...` form.
    pub fn score(score: &MultiScore) -> Self {
        Reply::Bulk(Bytes::from(score.to_string()))
    }

    pub fn empty_array() -> Self {
        Reply::Array(Vec::new())
    }
}
