// src/core/commands/zset/zcount.rs

use bytes::Bytes;

use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::skiplist::{LexRange, ScoreRange};
use crate::core::storage::store::Store;

/// `EXZCOUNT key min max`
#[derive(Debug, Clone)]
pub struct ExZcount {
    pub key: Bytes,
    pub range: ScoreRange,
}

impl ParseCommand for ExZcount {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() != 3 {
            return Err(ExZsetError::WrongArgumentCount("exzcount".to_string()));
        }
        Ok(ExZcount {
            key: args[0].clone(),
            range: ScoreRange::parse(&args[1], &args[2])?,
        })
    }
}

impl ExecutableCommand for ExZcount {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let Some(zset) = store.get(&self.key) else {
            return Ok(Reply::Integer(0));
        };
        if !self.range.validate_arity(zset.arity()) {
            return Err(ExZsetError::ScoreFormat);
        }
        Ok(Reply::Integer(zset.count(&self.range) as i64))
    }
}

/// `EXZLEXCOUNT key min max`
#[derive(Debug, Clone)]
pub struct ExZlexCount {
    pub key: Bytes,
    pub range: LexRange,
}

impl ParseCommand for ExZlexCount {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() != 3 {
            return Err(ExZsetError::WrongArgumentCount("exzlexcount".to_string()));
        }
        Ok(ExZlexCount {
            key: args[0].clone(),
            range: LexRange::parse(&args[1], &args[2])?,
        })
    }
}

impl ExecutableCommand for ExZlexCount {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        // A missing key counts zero elements; the value is the contract.
        let Some(zset) = store.get(&self.key) else {
            return Ok(Reply::Integer(0));
        };
        Ok(Reply::Integer(zset.lex_count(&self.range) as i64))
    }
}
