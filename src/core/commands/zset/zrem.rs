// src/core/commands/zset/zrem.rs

use bytes::Bytes;

use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::storage::store::Store;

/// `EXZREM key member [member ...]`
#[derive(Debug, Clone)]
pub struct ExZrem {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

impl ParseCommand for ExZrem {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() < 2 {
            return Err(ExZsetError::WrongArgumentCount("exzrem".to_string()));
        }
        Ok(ExZrem {
            key: args[0].clone(),
            members: args[1..].to_vec(),
        })
    }
}

impl ExecutableCommand for ExZrem {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let Some(zset) = store.get_mut(&self.key) else {
            return Ok(Reply::Integer(0));
        };

        let mut deleted = 0i64;
        let mut emptied = false;
        for member in &self.members {
            if zset.remove(member) {
                deleted += 1;
            }
            if zset.is_empty() {
                emptied = true;
                break;
            }
        }
        if emptied {
            store.remove(&self.key);
        }
        Ok(Reply::Integer(deleted))
    }
}
