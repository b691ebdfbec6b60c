// src/core/commands/zset/zscan.rs

use bytes::Bytes;
use wildmatch::WildMatch;

use crate::core::commands::helpers::{arg_eq, extract_cursor, extract_long};
use crate::core::commands::{ExecutableCommand, ParseCommand};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::score::MultiScore;
use crate::core::storage::store::Store;

/// `EXZSCAN key cursor [MATCH pattern] [COUNT count]`
#[derive(Debug, Clone)]
pub struct ExZscan {
    pub key: Bytes,
    pub cursor: u64,
    pub pattern: Option<Bytes>,
    pub count: usize,
}

impl ParseCommand for ExZscan {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError> {
        if args.len() < 2 {
            return Err(ExZsetError::WrongArgumentCount("exzscan".to_string()));
        }
        let key = args[0].clone();
        let cursor = extract_cursor(&args[1])?;

        let mut pattern = None;
        let mut count = 10i64;
        let mut pos = 2;
        while pos < args.len() {
            let remaining = args.len() - pos;
            if remaining >= 2 && arg_eq(&args[pos], "count") {
                count = extract_long(&args[pos + 1])?;
                if count < 1 {
                    return Err(ExZsetError::Syntax);
                }
                pos += 2;
            } else if remaining >= 2 && arg_eq(&args[pos], "match") {
                // A bare `*` matches everything, same as no pattern.
                if args[pos + 1].as_ref() != b"*" {
                    pattern = Some(args[pos + 1].clone());
                }
                pos += 2;
            } else {
                return Err(ExZsetError::Syntax);
            }
        }

        Ok(ExZscan {
            key,
            cursor,
            pattern,
            count: count as usize,
        })
    }
}

impl ExecutableCommand for ExZscan {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError> {
        let Some(zset) = store.get(&self.key) else {
            return Ok(Reply::Array(vec![
                Reply::bulk("0"),
                Reply::empty_array(),
            ]));
        };

        // Collect buckets until enough elements accumulate or the cursor
        // wraps. The iteration cap keeps a sparse table from stalling the
        // call while returning nothing.
        let mut items: Vec<(Bytes, MultiScore)> = Vec::new();
        let mut cursor = self.cursor;
        let mut max_iterations = self.count * 10 * 2;
        loop {
            cursor = zset.scan(cursor, |member, score| {
                items.push((member.clone(), score.clone()));
            });
            if cursor == 0 || items.len() >= self.count {
                break;
            }
            max_iterations -= 1;
            if max_iterations == 0 {
                break;
            }
        }

        if let Some(pattern) = &self.pattern {
            let matcher = WildMatch::new(&String::from_utf8_lossy(pattern));
            items.retain(|(member, _)| matcher.matches(&String::from_utf8_lossy(member)));
        }

        let mut entries = Vec::with_capacity(items.len() * 2);
        for (member, score) in items {
            entries.push(Reply::Bulk(member));
            entries.push(Reply::score(&score));
        }

        let mut buf = itoa::Buffer::new();
        Ok(Reply::Array(vec![
            Reply::bulk(buf.format(cursor).to_string()),
            Reply::Array(entries),
        ]))
    }
}
