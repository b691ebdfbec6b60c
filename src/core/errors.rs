// src/core/errors.rs

//! Defines the primary error type for the entire crate.

use thiserror::Error;

/// The main error enum, representing all possible failures within the engine.
/// Using `thiserror` allows for clean error definitions; the `Display` output
/// is the short reply text a host would surface to clients.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExZsetError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("syntax error")]
    Syntax,

    #[error("wrong number of arguments for '{0}' command")]
    WrongArgumentCount(String),

    #[error("score is not a valid format")]
    ScoreFormat,

    #[error("min or max is not a float")]
    RangeFormat,

    #[error("min or max not valid string range item")]
    LexRangeFormat,

    #[error("value is not an integer or out of range")]
    OutOfRange,

    #[error("weight value is not a float")]
    NotAFloat,

    #[error("resulting score is not a number (NaN)")]
    NanResult,

    #[error("{0}")]
    Conflict(&'static str),

    #[error("at least 1 input key is needed")]
    EmptyInput,

    #[error("invalid cursor")]
    InvalidCursor,

    #[error("'{0}' is not implemented")]
    Unimplemented(&'static str),

    #[error("persistence error: {0}")]
    Persistence(String),
}
