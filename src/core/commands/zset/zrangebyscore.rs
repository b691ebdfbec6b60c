// src/core/commands/zset/zrangebyscore.rs

use bytes::Bytes;

use crate::core::commands::zset::helpers::{parse_range_options, range_reply};
use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::skiplist::ScoreRange;
use crate::core::storage::store::Store;

/// Shared body of `EXZRANGEBYSCORE` / `EXZREVRANGEBYSCORE`. The reverse
/// form takes its bounds as `max min`.
fn parse_score_range_cmd(
    args: &[Bytes],
    verb: &str,
    reverse: bool,
) -> Result<(Bytes, ScoreRange, bool, i64, i64), ExZsetError> {
    if args.len() < 3 {
        return Err(ExZsetError::WrongArgumentCount(verb.to_string()));
    }
    let (min_idx, max_idx) = if reverse { (2, 1) } else { (1, 2) };
    let range = ScoreRange::parse(&args[min_idx], &args[max_idx])?;
    let (withscores, offset, limit) = parse_range_options(&args[3..], true)?;
    Ok((args[0].clone(), range, withscores, offset, limit))
}

fn execute_score_range(
    store: &mut Store,
    key: &Bytes,
    range: &ScoreRange,
    withscores: bool,
    offset: i64,
    limit: i64,
    reverse: bool,
) -> Result<Reply, ExZsetError> {
    let Some(zset) = store.get(key) else {
        return Ok(Reply::empty_array());
    };
    if !range.validate_arity(zset.arity()) {
        return Err(ExZsetError::ScoreFormat);
    }
    let entries = zset.range_by_score(range, offset, limit, reverse);
    Ok(range_reply(&entries, withscores))
}

/// `EXZRANGEBYSCORE key min max [WITHSCORES] [LIMIT offset count]`
#[derive(Debug, Clone)]
pub struct ExZrangeByScore {
    pub key: Bytes,
    pub range: ScoreRange,
    pub withscores: bool,
    pub offset: i64,
    pub limit: i64,
}

impl ParseCommand for ExZrangeByScore {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        let (key, range, withscores, offset, limit) =
            parse_score_range_cmd(args, "exzrangebyscore", false)?;
        Ok(ExZrangeByScore {
            key,
            range,
            withscores,
            offset,
            limit,
        })
    }
}

impl ExecutableCommand for ExZrangeByScore {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        execute_score_range(
            store,
            &self.key,
            &self.range,
            self.withscores,
            self.offset,
            self.limit,
            false,
        )
    }
}

/// `EXZREVRANGEBYSCORE key max min [WITHSCORES] [LIMIT offset count]`
#[derive(Debug, Clone)]
pub struct ExZrevRangeByScore {
    pub key: Bytes,
    pub range: ScoreRange,
    pub withscores: bool,
    pub offset: i64,
    pub limit: i64,
}

impl ParseCommand for ExZrevRangeByScore {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        let (key, range, withscores, offset, limit) =
            parse_score_range_cmd(args, "exzrevrangebyscore", true)?;
        Ok(ExZrevRangeByScore {
            key,
            range,
            withscores,
            offset,
            limit,
        })
    }
}

impl ExecutableCommand for ExZrevRangeByScore {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        execute_score_range(
            store,
            &self.key,
            &self.range,
            self.withscores,
            self.offset,
            self.limit,
            true,
        )
    }
}
