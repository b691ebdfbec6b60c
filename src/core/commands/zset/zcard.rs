// src/core/commands/zset/zcard.rs

use bytes::Bytes;

use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::storage::store::Store;

/// `EXZCARD key`
#[derive(Debug, Clone)]
pub struct ExZcard {
    pub key: Bytes,
}

impl ParseCommand for ExZcard {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() != 1 {
            return Err(ExZsetError::WrongArgumentCount("exzcard".to_string()));
        }
        Ok(ExZcard {
            key: args[0].clone(),
        })
    }
}

impl ExecutableCommand for ExZcard {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let len = store.get(&self.key).map_or(0, |zset| zset.len());
        Ok(Reply::Integer(len as i64))
    }
}
