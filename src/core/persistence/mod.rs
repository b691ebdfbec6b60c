// src/core/persistence/mod.rs

//! Serialization of sorted set objects.
//!
//! The host owns the files and the I/O; this module produces and consumes
//! the byte layout, emits the command batches an append-only rewrite needs,
//! and feeds the host's digest. Layout: `u64 length`, `u64 arity`, then one
//! `(member, arity x f64)` record per element in reverse sorted order, all
//! integers little-endian and members length-prefixed.
//!
//! Reverse order is deliberate: reload inserts tail-first, so the rebuilt
//! skip list takes the same shape the comparator produced originally.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::core::errors::ExZsetError;
use crate::core::score::{MAX_SCORE_NUM, MultiScore};
use crate::core::storage::zset::ExZset;

/// Score/member pairs per emitted command during an append-only rewrite.
const AOF_REWRITE_ITEMS_PER_CMD: usize = 64;

/// The host's digest handle: an order-insensitive combinator fed member and
/// score bytes, with a sequence mark after every pair.
pub trait DigestSink {
    fn add_bytes(&mut self, bytes: &[u8]);
    fn end_sequence(&mut self);
}

/// Serializes the set into `buf`.
pub fn save(obj: &ExZset, buf: &mut BytesMut) {
    buf.put_u64_le(obj.len() as u64);
    buf.put_u64_le(obj.arity() as u64);
    for (member, score) in obj.iter_rev() {
        buf.put_u64_le(member.len() as u64);
        buf.put_slice(member);
        for &value in score.values() {
            buf.put_f64_le(value);
        }
    }
    debug!(len = obj.len(), arity = obj.arity(), "sorted set serialized");
}

fn read_u64(cursor: &mut Bytes) -> Result<u64, ExZsetError> {
    if cursor.remaining() < 8 {
        return Err(ExZsetError::Persistence(
            "unexpected end of serialized sorted set".into(),
        ));
    }
    Ok(cursor.get_u64_le())
}

/// Rebuilds a set from bytes produced by [`save`].
pub fn load(cursor: &mut Bytes) -> Result<ExZset, ExZsetError> {
    let length = read_u64(cursor)? as usize;
    let arity = read_u64(cursor)? as usize;
    if arity == 0 || arity > MAX_SCORE_NUM {
        return Err(ExZsetError::Persistence(format!(
            "invalid score arity {arity}"
        )));
    }

    let mut obj = ExZset::new(arity);
    obj.reserve(length);
    for _ in 0..length {
        let member_len = read_u64(cursor)? as usize;
        if cursor.remaining() < member_len {
            return Err(ExZsetError::Persistence(
                "unexpected end of serialized sorted set".into(),
            ));
        }
        let member = cursor.split_to(member_len);

        let mut values = Vec::with_capacity(arity);
        for _ in 0..arity {
            if cursor.remaining() < 8 {
                return Err(ExZsetError::Persistence(
                    "unexpected end of serialized sorted set".into(),
                ));
            }
            values.push(cursor.get_f64_le());
        }
        obj.insert_unique(MultiScore::from_values(values), member);
    }
    debug!(len = obj.len(), arity, "sorted set loaded");
    Ok(obj)
}

/// Emits the argument vectors of an append-only rewrite: batches of
/// `EXZADD key score member ...` that rebuild the set when replayed.
pub fn aof_rewrite(obj: &ExZset, key: &Bytes, mut emit: impl FnMut(Vec<Bytes>)) {
    let mut args: Vec<Bytes> = Vec::with_capacity(2 + AOF_REWRITE_ITEMS_PER_CMD * 2);
    args.push(Bytes::from_static(b"EXZADD"));
    args.push(key.clone());

    let mut pending = 0;
    for (member, score) in obj.iter_unordered() {
        args.push(Bytes::from(score.to_string()));
        args.push(member.clone());
        pending += 1;
        if pending == AOF_REWRITE_ITEMS_PER_CMD {
            emit(std::mem::replace(&mut args, {
                let mut next = Vec::with_capacity(2 + AOF_REWRITE_ITEMS_PER_CMD * 2);
                next.push(Bytes::from_static(b"EXZADD"));
                next.push(key.clone());
                next
            }));
            pending = 0;
        }
    }
    if pending > 0 {
        emit(args);
    }
}

/// Feeds every `(member, textual score)` pair to the digest in hash
/// iteration order.
pub fn digest(obj: &ExZset, md: &mut dyn DigestSink) {
    for (member, score) in obj.iter_unordered() {
        md.add_bytes(member);
        md.add_bytes(score.to_string().as_bytes());
        md.end_sequence();
    }
}
