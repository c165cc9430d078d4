//! Parsers for the text logs written by the PRAC benchmark runs.
//!
//! The logs are not a formal grammar: a run prints section headings
//! like `===== Insert Stats =====` followed by a fixed sequence of
//! counter lines, and a few `key: value` lines describing the
//! experiment. Everything else in the log is ignored.
//!
//! - [`heap_stats`](heap_stats.rs): heap insert / extract-min runs
//! - [`binary_search`](binary_search.rs): repeated binary search trials
//! - [`parties`](parties.rs): per-party sections of 3-party runs
//! - [`record`](record.rs): the counter tuple shared by all of them

pub mod binary_search;
pub mod heap_stats;
pub mod parties;
pub mod record;

use std::{borrow::Cow, num::ParseIntError};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// A required `key: value` line or section heading is absent.
    #[error("required {0:?} missing from log")]
    MissingSection(&'static str),
    #[error("invalid number {text:?} for {what:?}: {error}")]
    BadNumber {
        what: &'static str,
        text: String,
        error: ParseIntError,
    },
    #[error("log contains no {0:?} sections")]
    NoOccurrences(&'static str),
}

/// The patterns match `\n` only; logs written on Windows end lines
/// with `\r\n`.
pub(crate) fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

pub(crate) fn parse_u64(text: &str, what: &'static str) -> Result<u64, ExtractError> {
    text.parse().map_err(|error| ExtractError::BadNumber {
        what,
        text: text.into(),
        error,
    })
}

#[test]
fn t_parse_u64() {
    assert_eq!(parse_u64("123", "x").unwrap(), 123);
    match parse_u64("99999999999999999999999", "bytes") {
        Err(ExtractError::BadNumber { what, .. }) => assert_eq!(what, "bytes"),
        r => panic!("{r:?}"),
    }
    assert!(parse_u64("", "x").is_err());
}

#[test]
fn t_normalize_newlines() {
    assert!(matches!(normalize_newlines("a\nb\n"), Cow::Borrowed("a\nb\n")));
    assert_eq!(normalize_newlines("a\r\nb\r\n"), "a\nb\n");
}
