// src/core/commands/zset/zsetop.rs

//! Multi-key weighted union and intersection, with `...STORE` variants.
//!
//! Sources are scanned smallest-first; the union accumulates scores in a
//! scratch hash, the intersection iterates the smallest source and probes
//! the rest. Difference is reserved in the grammar but not implemented.

use bytes::Bytes;
use tracing::trace;

use crate::core::commands::helpers::{arg_eq, extract_double, extract_long};
use crate::core::commands::zset::helpers::range_reply;
use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::dict::Dict;
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::score::{Aggregate, MultiScore};
use crate::core::storage::store::Store;
use crate::core::storage::zset::ExZset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Union,
    Inter,
    Diff,
}

/// One input of a multi-key operation: the set when its key exists, and the
/// weight applied to its scores.
struct ZsetOpSource<'a> {
    set: Option<&'a ExZset>,
    weight: f64,
}

impl ZsetOpSource<'_> {
    fn len(&self) -> usize {
        self.set.map_or(0, ExZset::len)
    }
}

fn union(sources: &[ZsetOpSource<'_>], arity: usize, aggregate: Aggregate) -> ExZset {
    let mut acc: Dict<MultiScore> = Dict::new();
    // The union is at least as large as the largest source; size the
    // accumulator up front to skip the intermediate rehashes.
    if let Some(largest) = sources.last() {
        acc.expand(largest.len());
    }

    for src in sources {
        let Some(set) = src.set else { continue };
        for (member, score) in set.iter() {
            let weighted = MultiScore::scaled(score, src.weight);
            match acc.find_mut(member) {
                Some(existing) => existing.aggregate_from(&weighted, aggregate),
                None => {
                    acc.add(member.clone(), weighted);
                }
            }
        }
    }

    let mut dst = ExZset::new(arity);
    dst.reserve(acc.len());
    for (member, score) in acc.iter() {
        dst.insert_unique(score.clone(), member.clone());
    }
    dst
}

fn intersect(sources: &[ZsetOpSource<'_>], arity: usize, aggregate: Aggregate) -> ExZset {
    let mut dst = ExZset::new(arity);
    // Sources are ordered by cardinality, so a missing or empty input shows
    // up first and empties the whole intersection.
    let Some(first) = sources.first() else {
        return dst;
    };
    let Some(base) = first.set else {
        return dst;
    };

    'members: for (member, score) in base.iter() {
        let mut accum = MultiScore::scaled(score, first.weight);
        for src in &sources[1..] {
            let Some(set) = src.set else {
                continue 'members;
            };
            // The base set cannot be probed while it is being iterated, so
            // an aliased source reuses the score in hand.
            if std::ptr::eq(set, base) {
                let weighted = MultiScore::scaled(score, src.weight);
                accum.aggregate_from(&weighted, aggregate);
            } else if let Some(other) = set.get_score(member) {
                let weighted = MultiScore::scaled(other, src.weight);
                accum.aggregate_from(&weighted, aggregate);
            } else {
                continue 'members;
            }
        }
        dst.insert_unique(accum, member.clone());
    }
    dst
}

/// The parsed shape shared by all six verbs.
#[derive(Debug, Clone)]
pub struct ZsetOpCommand {
    pub op: SetOp,
    pub destination: Option<Bytes>,
    pub keys: Vec<Bytes>,
    pub weights: Vec<f64>,
    pub aggregate: Aggregate,
    pub withscores: bool,
}

fn parse_setop(
    args: &[Bytes],
    verb: &str,
    op: SetOp,
    with_dest: bool,
) -> Result<ZsetOpCommand, ExZsetError> {
    let min_args = if with_dest { 3 } else { 2 };
    if args.len() < min_args {
        return Err(ExZsetError::WrongArgumentCount(verb.to_string()));
    }

    let destination = with_dest.then(|| args[0].clone());
    let numkeys_idx = usize::from(with_dest);
    let numkeys = extract_long(&args[numkeys_idx])?;
    if numkeys < 1 {
        return Err(ExZsetError::EmptyInput);
    }
    let numkeys = numkeys as usize;

    let keys_start = numkeys_idx + 1;
    if numkeys > args.len() - keys_start {
        return Err(ExZsetError::Syntax);
    }
    let keys: Vec<Bytes> = args[keys_start..keys_start + numkeys].to_vec();

    let mut weights = vec![1.0; numkeys];
    let mut aggregate = Aggregate::Sum;
    let mut withscores = false;

    let mut pos = keys_start + numkeys;
    while pos < args.len() {
        let remaining = args.len() - pos;
        if op != SetOp::Diff && remaining >= numkeys + 1 && arg_eq(&args[pos], "weights") {
            pos += 1;
            for weight in weights.iter_mut() {
                *weight = extract_double(&args[pos])?;
                pos += 1;
            }
        } else if op != SetOp::Diff && remaining >= 2 && arg_eq(&args[pos], "aggregate") {
            aggregate = if arg_eq(&args[pos + 1], "sum") {
                Aggregate::Sum
            } else if arg_eq(&args[pos + 1], "min") {
                Aggregate::Min
            } else if arg_eq(&args[pos + 1], "max") {
                Aggregate::Max
            } else {
                return Err(ExZsetError::Syntax);
            };
            pos += 2;
        } else if destination.is_none() && arg_eq(&args[pos], "withscores") {
            withscores = true;
            pos += 1;
        } else {
            return Err(ExZsetError::Syntax);
        }
    }

    Ok(ZsetOpCommand {
        op,
        destination,
        keys,
        weights,
        aggregate,
        withscores,
    })
}

impl ExecutableCommand for ZsetOpCommand {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        if self.op == SetOp::Diff {
            return Err(ExZsetError::Unimplemented("exzdiff"));
        }

        let result = {
            let mut arity = None;
            let mut sources = Vec::with_capacity(self.keys.len());
            for (key, &weight) in self.keys.iter().zip(&self.weights) {
                let set = store.get(key);
                if let Some(set) = set {
                    match arity {
                        None => arity = Some(set.arity()),
                        Some(expected) if expected != set.arity() => {
                            return Err(ExZsetError::ScoreFormat);
                        }
                        Some(_) => {}
                    }
                }
                sources.push(ZsetOpSource { set, weight });
            }

            // Smallest-first keeps the intersection probe count minimal and
            // tells the union how big its accumulator must be.
            sources.sort_by_key(ZsetOpSource::len);
            let arity = arity.unwrap_or(1);
            trace!(op = ?self.op, inputs = sources.len(), arity, "running set operation");

            match self.op {
                SetOp::Union => union(&sources, arity, self.aggregate),
                SetOp::Inter => intersect(&sources, arity, self.aggregate),
                SetOp::Diff => unreachable!("rejected above"),
            }
        };

        match &self.destination {
            Some(dest) => {
                let length = result.len();
                if length > 0 {
                    store.insert(dest.clone(), result);
                } else {
                    store.remove(dest);
                }
                Ok(Reply::Integer(length as i64))
            }
            None => {
                let entries: Vec<_> = result.iter().collect();
                Ok(range_reply(&entries, self.withscores))
            }
        }
    }
}

macro_rules! setop_command {
    ($name:ident, $verb:literal, $op:expr, $with_dest:literal) => {
        #[doc = concat!("`", $verb, "`")]
        #[derive(Debug, Clone)]
        pub struct $name(pub ZsetOpCommand);

        impl ParseCommand for $name {
            fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
                parse_setop(args, $verb, $op, $with_dest).map($name)
            }
        }

        impl ExecutableCommand for $name {
            fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
                self.0.execute(store)
            }
        }
    };
}

setop_command!(ExZunion, "exzunion", SetOp::Union, false);
setop_command!(ExZunionStore, "exzunionstore", SetOp::Union, true);
setop_command!(ExZinter, "exzinter", SetOp::Inter, false);
setop_command!(ExZinterStore, "exzinterstore", SetOp::Inter, true);
setop_command!(ExZdiff, "exzdiff", SetOp::Diff, false);
setop_command!(ExZdiffStore, "exzdiffstore", SetOp::Diff, true);
