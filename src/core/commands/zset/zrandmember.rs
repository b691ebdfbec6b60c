// src/core/commands/zset/zrandmember.rs

use bytes::Bytes;

use crate::core::commands::helpers::{arg_eq, extract_long};
use crate::core::commands::zset::helpers::owned_range_reply;
use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::storage::store::Store;

/// `EXZRANDMEMBER key [count [WITHSCORES]]`
#[derive(Debug, Clone)]
pub struct ExZrandMember {
    pub key: Bytes,
    pub count: Option<i64>,
    pub withscores: bool,
}

impl ParseCommand for ExZrandMember {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.is_empty() {
            return Err(ExZsetError::WrongArgumentCount("exzrandmember".to_string()));
        }
        let key = args[0].clone();
        let mut count = None;
        let mut withscores = false;
        if args.len() >= 2 {
            count = Some(extract_long(&args[1])?);
            match args.len() {
                2 => {}
                3 if arg_eq(&args[2], "withscores") => withscores = true,
                _ => return Err(ExZsetError::Syntax),
            }
        }
        Ok(ExZrandMember {
            key,
            count,
            withscores,
        })
    }
}

impl ExecutableCommand for ExZrandMember {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let Some(count) = self.count else {
            // Bare form: one member as a plain bulk string.
            return Ok(match store.get_mut(&self.key) {
                Some(zset) => match zset.random_member() {
                    Some((member, _)) => Reply::Bulk(member),
                    None => Reply::Null,
                },
                None => Reply::Null,
            });
        };

        let Some(zset) = store.get_mut(&self.key) else {
            return Ok(Reply::empty_array());
        };

        let entries = if count >= 0 {
            zset.random_members_unique(count as usize)
        } else {
            // Negative count: independent draws, repetition allowed.
            let mut out = Vec::with_capacity(count.unsigned_abs() as usize);
            for _ in 0..count.unsigned_abs() {
                match zset.random_member() {
                    Some(entry) => out.push(entry),
                    None => break,
                }
            }
            out
        };
        Ok(owned_range_reply(&entries, self.withscores))
    }
}
