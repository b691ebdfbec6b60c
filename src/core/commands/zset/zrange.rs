// src/core/commands/zset/zrange.rs

use bytes::Bytes;

use crate::core::commands::helpers::{arg_eq, extract_long};
use crate::core::commands::zset::helpers::range_reply;
use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::storage::store::Store;

fn parse_index_range(args: &[Bytes], verb: &str) -> Result<(Bytes, i64, i64, bool), ExZsetError> {
    if args.len() < 3 {
        return Err(ExZsetError::WrongArgumentCount(verb.to_string()));
    }
    let start = extract_long(&args[1])?;
    let end = extract_long(&args[2])?;
    let withscores = match args.len() {
        3 => false,
        4 if arg_eq(&args[3], "withscores") => true,
        _ => return Err(ExZsetError::Syntax),
    };
    Ok((args[0].clone(), start, end, withscores))
}

fn execute_index_range(
    store: &mut Store,
    key: &Bytes,
    start: i64,
    end: i64,
    withscores: bool,
    reverse: bool,
) -> Result<Reply, ExZsetError> {
    let Some(zset) = store.get(key) else {
        return Ok(Reply::empty_array());
    };
    let entries = zset.range_by_rank(start, end, reverse);
    Ok(range_reply(&entries, withscores))
}

/// `EXZRANGE key start stop [WITHSCORES]`
#[derive(Debug, Clone)]
pub struct ExZrange {
    pub key: Bytes,
    pub start: i64,
    pub end: i64,
    pub withscores: bool,
}

impl ParseCommand for ExZrange {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        let (key, start, end, withscores) = parse_index_range(args, "exzrange")?;
        Ok(ExZrange {
            key,
            start,
            end,
            withscores,
        })
    }
}

impl ExecutableCommand for ExZrange {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        execute_index_range(store, &self.key, self.start, self.end, self.withscores, false)
    }
}

/// `EXZREVRANGE key start stop [WITHSCORES]`
#[derive(Debug, Clone)]
pub struct ExZrevRange {
    pub key: Bytes,
    pub start: i64,
    pub end: i64,
    pub withscores: bool,
}

impl ParseCommand for ExZrevRange {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        let (key, start, end, withscores) = parse_index_range(args, "exzrevrange")?;
        Ok(ExZrevRange {
            key,
            start,
            end,
            withscores,
        })
    }
}

impl ExecutableCommand for ExZrevRange {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        execute_index_range(store, &self.key, self.start, self.end, self.withscores, true)
    }
}
