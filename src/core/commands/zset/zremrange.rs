// src/core/commands/zset/zremrange.rs

use bytes::Bytes;

use crate::core::commands::helpers::extract_long;
use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::skiplist::{LexRange, ScoreRange};
use crate::core::storage::store::Store;

/// Deletes the key once the set has emptied and replies with the count.
fn finish_removal(store: &mut Store, key: &Bytes, removed: usize) -> Result<Reply, ExZsetError> {
    if store.get(key).is_some_and(|zset| zset.is_empty()) {
        store.remove(key);
    }
    Ok(Reply::Integer(removed as i64))
}

/// `EXZREMRANGEBYSCORE key min max`
#[derive(Debug, Clone)]
pub struct ExZremRangeByScore {
    pub key: Bytes,
    pub range: ScoreRange,
}

impl ParseCommand for ExZremRangeByScore {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() != 3 {
            return Err(ExZsetError::WrongArgumentCount(
                "exzremrangebyscore".to_string(),
            ));
        }
        Ok(ExZremRangeByScore {
            key: args[0].clone(),
            range: ScoreRange::parse(&args[1], &args[2])?,
        })
    }
}

impl ExecutableCommand for ExZremRangeByScore {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let Some(zset) = store.get_mut(&self.key) else {
            return Ok(Reply::Integer(0));
        };
        if !self.range.validate_arity(zset.arity()) {
            return Err(ExZsetError::ScoreFormat);
        }
        let removed = zset.remove_range_by_score(&self.range);
        finish_removal(store, &self.key, removed)
    }
}

/// `EXZREMRANGEBYRANK key start stop`
#[derive(Debug, Clone)]
pub struct ExZremRangeByRank {
    pub key: Bytes,
    pub start: i64,
    pub end: i64,
}

impl ParseCommand for ExZremRangeByRank {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() != 3 {
            return Err(ExZsetError::WrongArgumentCount(
                "exzremrangebyrank".to_string(),
            ));
        }
        Ok(ExZremRangeByRank {
            key: args[0].clone(),
            start: extract_long(&args[1])?,
            end: extract_long(&args[2])?,
        })
    }
}

impl ExecutableCommand for ExZremRangeByRank {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let Some(zset) = store.get_mut(&self.key) else {
            return Ok(Reply::Integer(0));
        };
        let removed = zset.remove_range_by_rank(self.start, self.end);
        finish_removal(store, &self.key, removed)
    }
}

/// `EXZREMRANGEBYLEX key min max`
#[derive(Debug, Clone)]
pub struct ExZremRangeByLex {
    pub key: Bytes,
    pub range: LexRange,
}

impl ParseCommand for ExZremRangeByLex {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() != 3 {
            return Err(ExZsetError::WrongArgumentCount(
                "exzremrangebylex".to_string(),
            ));
        }
        Ok(ExZremRangeByLex {
            key: args[0].clone(),
            range: LexRange::parse(&args[1], &args[2])?,
        })
    }
}

impl ExecutableCommand for ExZremRangeByLex {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let Some(zset) = store.get_mut(&self.key) else {
            return Ok(Reply::Integer(0));
        };
        let removed = zset.remove_range_by_lex(&self.range);
        finish_removal(store, &self.key, removed)
    }
}
