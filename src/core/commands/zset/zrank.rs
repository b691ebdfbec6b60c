// src/core/commands/zset/zrank.rs

use bytes::Bytes;

use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::score::MultiScore;
use crate::core::storage::store::Store;

fn parse_rank(args: &[Bytes], verb: &str) -> Result<(Bytes, Bytes), ExZsetError> {
    if args.len() != 2 {
        return Err(ExZsetError::WrongArgumentCount(verb.to_string()));
    }
    Ok((args[0].clone(), args[1].clone()))
}

/// Rank of a member by position. Missing key or member replies null.
fn execute_member_rank(
    store: &mut Store,
    key: &Bytes,
    member: &Bytes,
    reverse: bool,
) -> Result<Reply, ExZsetError> {
    let Some(zset) = store.get_mut(key) else {
        return Ok(Reply::Null);
    };
    Ok(match zset.rank(member, reverse) {
        Some(rank) => Reply::Integer(rank as i64),
        None => Reply::Null,
    })
}

/// Rank a *score argument* would occupy: the count of elements ordered
/// strictly before it (or, reversed, not before it). An unparseable score
/// replies null, like a missing member.
fn execute_score_rank(
    store: &mut Store,
    key: &Bytes,
    raw_score: &Bytes,
    reverse: bool,
) -> Result<Reply, ExZsetError> {
    let Some(zset) = store.get(key) else {
        return Ok(Reply::Null);
    };
    let Ok(score) = MultiScore::parse(raw_score) else {
        return Ok(Reply::Null);
    };
    if score.arity() != zset.arity() {
        return Err(ExZsetError::ScoreFormat);
    }
    Ok(Reply::Integer(zset.rank_by_score(&score, reverse) as i64))
}

/// `EXZRANK key member`
#[derive(Debug, Clone)]
pub struct ExZrank {
    pub key: Bytes,
    pub member: Bytes,
}

impl ParseCommand for ExZrank {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        let (key, member) = parse_rank(args, "exzrank")?;
        Ok(ExZrank { key, member })
    }
}

impl ExecutableCommand for ExZrank {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        execute_member_rank(store, &self.key, &self.member, false)
    }
}

/// `EXZREVRANK key member`
#[derive(Debug, Clone)]
pub struct ExZrevRank {
    pub key: Bytes,
    pub member: Bytes,
}

impl ParseCommand for ExZrevRank {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        let (key, member) = parse_rank(args, "exzrevrank")?;
        Ok(ExZrevRank { key, member })
    }
}

impl ExecutableCommand for ExZrevRank {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        execute_member_rank(store, &self.key, &self.member, true)
    }
}

/// `EXZRANKBYSCORE key score`
#[derive(Debug, Clone)]
pub struct ExZrankByScore {
    pub key: Bytes,
    pub score: Bytes,
}

impl ParseCommand for ExZrankByScore {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        let (key, score) = parse_rank(args, "exzrankbyscore")?;
        Ok(ExZrankByScore { key, score })
    }
}

impl ExecutableCommand for ExZrankByScore {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        execute_score_rank(store, &self.key, &self.score, false)
    }
}

/// `EXZREVRANKBYSCORE key score`
#[derive(Debug, Clone)]
pub struct ExZrevRankByScore {
    pub key: Bytes,
    pub score: Bytes,
}

impl ParseCommand for ExZrevRankByScore {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        let (key, score) = parse_rank(args, "exzrevrankbyscore")?;
        Ok(ExZrevRankByScore { key, score })
    }
}

impl ExecutableCommand for ExZrevRankByScore {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        execute_score_rank(store, &self.key, &self.score, true)
    }
}
