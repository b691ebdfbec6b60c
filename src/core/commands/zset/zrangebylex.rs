// src/core/commands/zset/zrangebylex.rs

use bytes::Bytes;

use crate::core::commands::zset::helpers::{parse_range_options, range_reply};
use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::skiplist::LexRange;
use crate::core::storage::store::Store;

/// Shared body of `EXZRANGEBYLEX` / `EXZREVRANGEBYLEX`. The reverse form
/// takes its bounds as `max min`; no `WITHSCORES` in the lex grammar.
fn parse_lex_range_cmd(
    args: &[Bytes],
    verb: &str,
    reverse: bool,
) -> Result<(Bytes, LexRange, i64, i64), ExZsetError> {
    if args.len() < 3 {
        return Err(ExZsetError::WrongArgumentCount(verb.to_string()));
    }
    let (min_idx, max_idx) = if reverse { (2, 1) } else { (1, 2) };
    let range = LexRange::parse(&args[min_idx], &args[max_idx])?;
    let (_, offset, limit) = parse_range_options(&args[3..], false)?;
    Ok((args[0].clone(), range, offset, limit))
}

fn execute_lex_range(
    store: &mut Store,
    key: &Bytes,
    range: &LexRange,
    offset: i64,
    limit: i64,
    reverse: bool,
) -> Result<Reply, ExZsetError> {
    let Some(zset) = store.get(key) else {
        return Ok(Reply::empty_array());
    };
    let entries = zset.range_by_lex(range, offset, limit, reverse);
    Ok(range_reply(&entries, false))
}

/// `EXZRANGEBYLEX key min max [LIMIT offset count]`
#[derive(Debug, Clone)]
pub struct ExZrangeByLex {
    pub key: Bytes,
    pub range: LexRange,
    pub offset: i64,
    pub limit: i64,
}

impl ParseCommand for ExZrangeByLex {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        let (key, range, offset, limit) = parse_lex_range_cmd(args, "exzrangebylex", false)?;
        Ok(ExZrangeByLex {
            key,
            range,
            offset,
            limit,
        })
    }
}

impl ExecutableCommand for ExZrangeByLex {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        execute_lex_range(
            store, &self.key, &self.range, self.offset, self.limit, false,
        )
    }
}

/// `EXZREVRANGEBYLEX key max min [LIMIT offset count]`
#[derive(Debug, Clone)]
pub struct ExZrevRangeByLex {
    pub key: Bytes,
    pub range: LexRange,
    pub offset: i64,
    pub limit: i64,
}

impl ParseCommand for ExZrevRangeByLex {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        let (key, range, offset, limit) = parse_lex_range_cmd(args, "exzrevrangebylex", true)?;
        Ok(ExZrevRangeByLex {
            key,
            range,
            offset,
            limit,
        })
    }
}

impl ExecutableCommand for ExZrevRangeByLex {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        execute_lex_range(store, &self.key, &self.range, self.offset, self.limit, true)
    }
}
