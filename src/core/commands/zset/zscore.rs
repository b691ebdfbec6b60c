// src/core/commands/zset/zscore.rs

use bytes::Bytes;

use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::storage::store::Store;

/// `EXZSCORE key member`
#[derive(Debug, Clone)]
pub struct ExZscore {
    pub key: Bytes,
    pub member: Bytes,
}

impl ParseCommand for ExZscore {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() != 2 {
            return Err(ExZsetError::WrongArgumentCount("exzscore".to_string()));
        }
        Ok(ExZscore {
            key: args[0].clone(),
            member: args[1].clone(),
        })
    }
}

impl ExecutableCommand for ExZscore {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let Some(zset) = store.get_mut(&self.key) else {
            return Ok(Reply::Null);
        };
        Ok(match zset.score_of(&self.member) {
            Some(score) => Reply::score(score),
            None => Reply::Null,
        })
    }
}

/// `EXZMSCORE key member [member ...]`
#[derive(Debug, Clone)]
pub struct ExZmscore {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

impl ParseCommand for ExZmscore {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() < 2 {
            return Err(ExZsetError::WrongArgumentCount("exzmscore".to_string()));
        }
        Ok(ExZmscore {
            key: args[0].clone(),
            members: args[1..].to_vec(),
        })
    }
}

impl ExecutableCommand for ExZmscore {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let mut out = Vec::with_capacity(self.members.len());
        match store.get_mut(&self.key) {
            Some(zset) => {
                for member in &self.members {
                    match zset.score_of(member) {
                        Some(score) => out.push(Reply::score(score)),
                        None => out.push(Reply::Null),
                    }
                }
            }
            None => out.extend(self.members.iter().map(|_| Reply::Null)),
        }
        Ok(Reply::Array(out))
    }
}
