//! Binary search logs: the benchmark repeats the search several
//! times and prints a `BINARY SEARCH` section per trial.

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    normalize_newlines,
    record::{StatRecord, COUNTERS_PATTERN},
    ExtractError,
};
use crate::{debug, stats::max_by_field};

lazy_static! {
    static ref TRIAL: Regex = Regex::new(&format!(r"BINARY SEARCH =====\n{COUNTERS_PATTERN}"))
        .expect("valid regex");
}

/// One record per trial, in log order.
pub fn parse_binary_search(text: &str) -> Result<Vec<StatRecord>, ExtractError> {
    let records = TRIAL
        .captures_iter(&normalize_newlines(text))
        .map(|caps| StatRecord::from_captures(&caps, 1, false))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("found {} binary search trial(s)", records.len());
    Ok(records)
}

/// The worst trial: maximum bytes and maximum time, which may come
/// from different trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySearchSummary {
    pub max_message_bytes_sent: u64,
    pub max_wall_clock_ms: u64,
}

impl BinarySearchSummary {
    pub fn from_records(records: &[StatRecord]) -> Result<Self, ExtractError> {
        let missing = || ExtractError::NoOccurrences("BINARY SEARCH");
        Ok(BinarySearchSummary {
            max_message_bytes_sent: max_by_field(records, |r| Some(r.message_bytes_sent))
                .ok_or_else(missing)?,
            max_wall_clock_ms: max_by_field(records, |r| Some(r.wall_clock_ms))
                .ok_or_else(missing)?,
        })
    }
}

#[cfg(test)]
fn trial(bytes: u64, ms: u64) -> String {
    format!(
        "===== BINARY SEARCH =====\n4 messages sent\n{bytes} message bytes sent\n\
         2 Lamport clock (latencies)\n16 local AES operations\n\
         {ms} milliseconds wall clock time\n\n"
    )
}

#[test]
fn t_binary_search_max() {
    let log = format!(
        "heapsize: 64\n{}some noise\n{}{}",
        trial(100, 10),
        trial(150, 20),
        trial(120, 15)
    );
    let records = parse_binary_search(&log).unwrap();
    assert_eq!(
        records
            .iter()
            .map(|r| (r.message_bytes_sent, r.wall_clock_ms))
            .collect::<Vec<_>>(),
        vec![(100, 10), (150, 20), (120, 15)]
    );
    assert_eq!(
        BinarySearchSummary::from_records(&records).unwrap(),
        BinarySearchSummary {
            max_message_bytes_sent: 150,
            max_wall_clock_ms: 20
        }
    );
}

#[test]
fn t_maxima_from_different_trials() {
    let log = format!("{}{}", trial(500, 10), trial(100, 90));
    let records = parse_binary_search(&log).unwrap();
    let s = BinarySearchSummary::from_records(&records).unwrap();
    assert_eq!((s.max_message_bytes_sent, s.max_wall_clock_ms), (500, 90));
}

#[test]
fn t_no_trials() {
    let records = parse_binary_search("heapsize: 64\n").unwrap();
    assert!(records.is_empty());
    assert!(matches!(
        BinarySearchSummary::from_records(&records),
        Err(ExtractError::NoOccurrences(_))
    ));
}

#[test]
fn t_crlf_trials() {
    let log = format!("{}{}", trial(100, 10), trial(150, 20)).replace('\n', "\r\n");
    let records = parse_binary_search(&log).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        BinarySearchSummary::from_records(&records).unwrap(),
        BinarySearchSummary {
            max_message_bytes_sent: 150,
            max_wall_clock_ms: 20
        }
    );
}
