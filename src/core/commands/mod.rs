// src/core/commands/mod.rs

//! The command layer: one parsed-command struct per verb, plus a name-based
//! dispatcher. This is the host-facing seam: a server embedding the engine
//! parses its wire frames into argument vectors and hands them here.

use bytes::Bytes;

use crate::core::errors::ExZsetError;
use crate::core::protocol::Reply;
use crate::core::storage::store::Store;

pub mod helpers;
pub mod zset;

use zset::{
    ExZadd, ExZcard, ExZcount, ExZdiff, ExZdiffStore, ExZincrBy, ExZinter, ExZinterStore,
    ExZlexCount, ExZmscore, ExZrandMember, ExZrange, ExZrangeByLex, ExZrangeByScore, ExZrank,
    ExZrankByScore, ExZrem, ExZremRangeByLex, ExZremRangeByRank, ExZremRangeByScore, ExZrevRange,
    ExZrevRangeByLex, ExZrevRangeByScore, ExZrevRank, ExZrevRankByScore, ExZscan, ExZscore,
    ExZunion, ExZunionStore,
};

/// Builds a command from its argument vector (the verb itself excluded).
pub trait ParseCommand: Sized {
    fn parse(args: &[Bytes]) -> Result<Self, ExZsetError>;
}

/// Runs a parsed command against the keyspace.
pub trait ExecutableCommand {
    fn execute(&self, store: &mut Store) -> Result<Reply, ExZsetError>;
}

fn run<C: ParseCommand + ExecutableCommand>(
    args: &[Bytes],
    store: &mut Store,
) -> Result<Reply, ExZsetError> {
    C::parse(args)?.execute(store)
}

/// Parses and executes one command by verb name. Names are matched
/// case-insensitively; the argument slice excludes the verb.
pub fn dispatch(name: &str, args: &[Bytes], store: &mut Store) -> Result<Reply, ExZsetError> {
    match name.to_ascii_lowercase().as_str() {
        "exzadd" => run::<ExZadd>(args, store),
        "exzincrby" => run::<ExZincrBy>(args, store),
        "exzscore" => run::<ExZscore>(args, store),
        "exzmscore" => run::<ExZmscore>(args, store),
        "exzcard" => run::<ExZcard>(args, store),
        "exzrange" => run::<ExZrange>(args, store),
        "exzrevrange" => run::<ExZrevRange>(args, store),
        "exzrangebyscore" => run::<ExZrangeByScore>(args, store),
        "exzrevrangebyscore" => run::<ExZrevRangeByScore>(args, store),
        "exzrangebylex" => run::<ExZrangeByLex>(args, store),
        "exzrevrangebylex" => run::<ExZrevRangeByLex>(args, store),
        "exzrank" => run::<ExZrank>(args, store),
        "exzrevrank" => run::<ExZrevRank>(args, store),
        "exzrankbyscore" => run::<ExZrankByScore>(args, store),
        "exzrevrankbyscore" => run::<ExZrevRankByScore>(args, store),
        "exzrem" => run::<ExZrem>(args, store),
        "exzremrangebyscore" => run::<ExZremRangeByScore>(args, store),
        "exzremrangebyrank" => run::<ExZremRangeByRank>(args, store),
        "exzremrangebylex" => run::<ExZremRangeByLex>(args, store),
        "exzcount" => run::<ExZcount>(args, store),
        "exzlexcount" => run::<ExZlexCount>(args, store),
        "exzrandmember" => run::<ExZrandMember>(args, store),
        "exzscan" => run::<ExZscan>(args, store),
        "exzunion" => run::<ExZunion>(args, store),
        "exzunionstore" => run::<ExZunionStore>(args, store),
        "exzinter" => run::<ExZinter>(args, store),
        "exzinterstore" => run::<ExZinterStore>(args, store),
        "exzdiff" => run::<ExZdiff>(args, store),
        "exzdiffstore" => run::<ExZdiffStore>(args, store),
        other => Err(ExZsetError::UnknownCommand(other.to_string())),
    }
}
