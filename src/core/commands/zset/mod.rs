// src/core/commands/zset/mod.rs

//! Sorted set commands, one file per verb family.

pub mod helpers;
pub mod zadd;
pub mod zcard;
pub mod zcount;
pub mod zrandmember;
pub mod zrange;
pub mod zrangebylex;
pub mod zrangebyscore;
pub mod zrank;
pub mod zrem;
pub mod zremrange;
pub mod zscan;
pub mod zscore;
pub mod zsetop;

pub use zadd::{ExZadd, ExZincrBy};
pub use zcard::ExZcard;
pub use zcount::{ExZcount, ExZlexCount};
pub use zrandmember::ExZrandMember;
pub use zrange::{ExZrange, ExZrevRange};
pub use zrangebylex::{ExZrangeByLex, ExZrevRangeByLex};
pub use zrangebyscore::{ExZrangeByScore, ExZrevRangeByScore};
pub use zrank::{ExZrank, ExZrankByScore, ExZrevRank, ExZrevRankByScore};
pub use zrem::ExZrem;
pub use zremrange::{ExZremRangeByLex, ExZremRangeByRank, ExZremRangeByScore};
pub use zscan::ExZscan;
pub use zscore::{ExZmscore, ExZscore};
pub use zsetop::{ExZdiff, ExZdiffStore, ExZinter, ExZinterStore, ExZunion, ExZunionStore};
