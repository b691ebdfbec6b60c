// src/core/commands/zset/zadd.rs

use bytes::Bytes;

use crate::core::commands::helpers::arg_eq;
use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::score::MultiScore;
use crate::core::storage::store::Store;
use crate::core::storage::zset::{UpsertOptions, UpsertOutcome};

/// Defines the condition for `EXZADD` execution (`NX` or `XX`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZaddCondition {
    #[default]
    None,
    IfNotExists, // NX
    IfExists,    // XX
}

/// Represents the full `EXZADD` command with all its options.
#[derive(Debug, Clone)]
pub struct ExZadd {
    pub key: Bytes,
    pub members: Vec<(MultiScore, Bytes)>,
    pub condition: ZaddCondition,
    pub ch: bool,
    pub incr: bool,
}

impl ParseCommand for ExZadd {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() < 3 {
            return Err(ExZsetError::WrongArgumentCount("exzadd".to_string()));
        }

        let key = args[0].clone();
        let mut condition = ZaddCondition::None;
        let mut ch = false;
        let mut incr = false;

        let mut pos = 1;
        while pos < args.len() {
            let opt = &args[pos];
            if arg_eq(opt, "nx") {
                condition = ZaddCondition::IfNotExists;
            } else if arg_eq(opt, "xx") {
                condition = ZaddCondition::IfExists;
            } else if arg_eq(opt, "ch") {
                ch = true;
            } else if arg_eq(opt, "incr") {
                incr = true;
            } else {
                break;
            }
            pos += 1;
        }

        let pairs = &args[pos..];
        if pairs.is_empty() || !pairs.len().is_multiple_of(2) {
            return Err(ExZsetError::Syntax);
        }

        // NX and XX exclude each other; the option loop keeps the last one
        // seen, so the conflict is detected by rescanning the option window.
        let has_nx = args[1..pos].iter().any(|a| arg_eq(a, "nx"));
        let has_xx = args[1..pos].iter().any(|a| arg_eq(a, "xx"));
        if has_nx && has_xx {
            return Err(ExZsetError::Conflict(
                "XX and NX options at the same time are not compatible",
            ));
        }
        if incr && pairs.len() > 2 {
            return Err(ExZsetError::Conflict(
                "INCR option supports a single increment-element pair",
            ));
        }

        let mut members = Vec::with_capacity(pairs.len() / 2);
        let mut arity = 0;
        for pair in pairs.chunks_exact(2) {
            let score = MultiScore::parse(&pair[0])?;
            if arity != 0 && score.arity() != arity {
                return Err(ExZsetError::ScoreFormat);
            }
            arity = score.arity();
            members.push((score, pair[1].clone()));
        }

        Ok(ExZadd {
            key,
            members,
            condition,
            ch,
            incr,
        })
    }
}

impl ExecutableCommand for ExZadd {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let arity = self.members[0].0.arity();
        let opts = UpsertOptions {
            nx: self.condition == ZaddCondition::IfNotExists,
            xx: self.condition == ZaddCondition::IfExists,
            incr: self.incr,
        };

        match store.get(&self.key) {
            Some(zset) => {
                if zset.arity() != arity {
                    return Err(ExZsetError::ScoreFormat);
                }
            }
            None if opts.xx => {
                // Nothing to touch and nothing to create.
                return Ok(if self.incr {
                    Reply::Null
                } else {
                    Reply::Integer(0)
                });
            }
            None => {}
        }
        let zset = store.get_or_create(&self.key, arity);

        let mut added = 0i64;
        let mut updated = 0i64;
        let mut processed = 0i64;
        let mut incr_score = None;

        for (score, member) in &self.members {
            let (outcome, newscore) = zset.upsert(score.clone(), member, opts)?;
            match outcome {
                UpsertOutcome::Added => {
                    added += 1;
                    processed += 1;
                }
                UpsertOutcome::Updated => {
                    updated += 1;
                    processed += 1;
                }
                UpsertOutcome::Unchanged => processed += 1,
                UpsertOutcome::Skipped => {}
            }
            if self.incr {
                incr_score = newscore;
            }
        }

        if self.incr {
            Ok(match incr_score.filter(|_| processed > 0) {
                Some(score) => Reply::score(&score),
                None => Reply::Null,
            })
        } else {
            Ok(Reply::Integer(if self.ch { added + updated } else { added }))
        }
    }
}

/// `EXZINCRBY key increment member`, sugar for `EXZADD key INCR`.
#[derive(Debug, Clone)]
pub struct ExZincrBy {
    pub key: Bytes,
    pub increment: MultiScore,
    pub member: Bytes,
}

impl ParseCommand for ExZincrBy {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() != 3 {
            return Err(ExZsetError::WrongArgumentCount("exzincrby".to_string()));
        }
        Ok(ExZincrBy {
            key: args[0].clone(),
            increment: MultiScore::parse(&args[1])?,
            member: args[2].clone(),
        })
    }
}

impl ExecutableCommand for ExZincrBy {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let zadd = ExZadd {
            key: self.key.clone(),
            members: vec![(self.increment.clone(), self.member.clone())],
            condition: ZaddCondition::None,
            ch: false,
            incr: true,
        };
        zadd.execute(store)
    }
}
