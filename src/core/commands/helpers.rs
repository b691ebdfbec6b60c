// src/core/commands/helpers.rs

//! Provides helper functions for parsing command arguments.
//! These helpers reduce boilerplate and ensure consistent error handling across commands.

use bytes::Bytes;

use crate::core::errors::ExZsetError;

/// Case-insensitive match of an argument against an option name.
pub fn arg_eq(arg: &Bytes, name: &str) -> bool {
    arg.eq_ignore_ascii_case(name.as_bytes())
}

/// Parses a signed integer argument.
pub fn extract_long(arg: &Bytes) -> Result<i64, ExZsetError> {
    std::str::from_utf8(arg)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(ExZsetError::OutOfRange)
}

/// Parses a floating point argument (weights).
pub fn extract_double(arg: &Bytes) -> Result<f64, ExZsetError> {
    std::str::from_utf8(arg)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(ExZsetError::NotAFloat)
}

/// Parses the unsigned cursor argument of a scan.
pub fn extract_cursor(arg: &Bytes) -> Result<u64, ExZsetError> {
    std::str::from_utf8(arg)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(ExZsetError::InvalidCursor)
}
