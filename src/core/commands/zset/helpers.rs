// src/core/commands/zset/helpers.rs

use bytes::Bytes;

use crate::core::commands::helpers::{arg_eq, extract_long};
use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::score::MultiScore;

/// Formats a range result, interleaving textual scores when requested.
pub(super) fn range_reply(entries: &[(&Bytes, &MultiScore)], withscores: bool) -> Reply {
    let mut out = Vec::with_capacity(entries.len() * if withscores { 2 } else { 1 });
    for (member, score) in entries {
        out.push(Reply::Bulk((*member).clone()));
        if withscores {
            out.push(Reply::score(score));
        }
    }
    Reply::Array(out)
}

/// Same, for owned `(member, score)` pairs.
pub(super) fn owned_range_reply(entries: &[(Bytes, MultiScore)], withscores: bool) -> Reply {
    let mut out = Vec::with_capacity(entries.len() * if withscores { 2 } else { 1 });
    for (member, score) in entries {
        out.push(Reply::Bulk(member.clone()));
        if withscores {
            out.push(Reply::score(score));
        }
    }
    Reply::Array(out)
}

/// Parses the trailing `[WITHSCORES] [LIMIT offset count]` options of a
/// range-by-score command. `allow_withscores` is off for lex ranges.
pub(super) fn parse_range_options(
    args: &[Bytes],
    allow_withscores: bool,
) -> Result<(bool, i64, i64), ExZsetError> {
    let mut withscores = false;
    let mut offset = 0;
    let mut limit = -1;

    let mut pos = 0;
    while pos < args.len() {
        let remaining = args.len() - pos;
        if allow_withscores && arg_eq(&args[pos], "withscores") {
            withscores = true;
            pos += 1;
        } else if remaining >= 3 && arg_eq(&args[pos], "limit") {
            offset = extract_long(&args[pos + 1])?;
            limit = extract_long(&args[pos + 2])?;
            pos += 3;
        } else {
            return Err(ExZsetError::Syntax);
        }
    }
    Ok((withscores, offset, limit))
}
