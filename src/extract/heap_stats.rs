//! Heap experiment logs: the `heapsize` / `is_optimized` settings
//! and the `Insert Stats` and `Extract Min Stats` sections.

use lazy_static::lazy_static;
use regex::Regex;

use super::{
    normalize_newlines, parse_u64,
    record::{StatRecord, COUNTERS_PATTERN, USAGE_PATTERN},
    ExtractError,
};
use crate::debug;

lazy_static! {
    static ref HEAPSIZE: Regex = Regex::new(r"heapsize: (\d+)").expect("valid regex");
    static ref IS_OPTIMIZED: Regex = Regex::new(r"is_optimized: (\d)").expect("valid regex");
    // A section body ends at the first empty line or at the end of
    // the log.
    static ref INSERT_SECTION: Regex =
        Regex::new(r"(?s)===== Insert Stats =====\n(.*?)(?:\n\n|\z)").expect("valid regex");
    static ref EXTRACT_MIN_SECTION: Regex =
        Regex::new(r"(?s)===== Extract Min Stats =====\n(.*?)(?:\n\n|\z)").expect("valid regex");
    static ref COUNTERS: Regex = Regex::new(COUNTERS_PATTERN).expect("valid regex");
    static ref INSERT_FULL: Regex = Regex::new(&format!(
        r"===== Insert Stats =====\n{COUNTERS_PATTERN}{USAGE_PATTERN}"
    ))
    .expect("valid regex");
    static ref EXTRACT_MIN_FULL: Regex = Regex::new(&format!(
        r"===== Extract Min Stats =====\n{COUNTERS_PATTERN}{USAGE_PATTERN}"
    ))
    .expect("valid regex");
}

/// The experiment settings every log must state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFields {
    pub heapsize: u64,
    pub is_optimized: u64,
}

fn required_field(text: &str, re: &Regex, what: &'static str) -> Result<u64, ExtractError> {
    let caps = re
        .captures(text)
        .ok_or(ExtractError::MissingSection(what))?;
    parse_u64(&caps[1], what)
}

/// Fails if either setting is missing; no defaults are assumed.
pub fn parse_header_fields(text: &str) -> Result<HeaderFields, ExtractError> {
    Ok(HeaderFields {
        heapsize: required_field(text, &HEAPSIZE, "heapsize")?,
        is_optimized: required_field(text, &IS_OPTIMIZED, "is_optimized")?,
    })
}

/// The two numbers the experiment driver records per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationSummary {
    pub wall_clock_ms: u64,
    pub message_bytes_sent: u64,
}

impl OperationSummary {
    /// Taken from the first record; all zero if there is none.
    pub fn from_first(records: &[StatRecord]) -> Self {
        records
            .first()
            .map(|r| OperationSummary {
                wall_clock_ms: r.wall_clock_ms,
                message_bytes_sent: r.message_bytes_sent,
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapStats {
    pub header: HeaderFields,
    pub insert: Vec<StatRecord>,
    pub extract_min: Vec<StatRecord>,
}

impl HeapStats {
    pub fn insert_summary(&self) -> OperationSummary {
        OperationSummary::from_first(&self.insert)
    }

    pub fn extract_min_summary(&self) -> OperationSummary {
        OperationSummary::from_first(&self.extract_min)
    }
}

/// All counter records inside the body of the first section matched
/// by `section`. Empty if the section is absent.
fn section_records(
    text: &str,
    section: &Regex,
    name: &str,
) -> Result<Vec<StatRecord>, ExtractError> {
    let Some(caps) = section.captures(text) else {
        debug!("no {name:?} section");
        return Ok(Vec::new());
    };
    let body = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let records = COUNTERS
        .captures_iter(body)
        .map(|caps| StatRecord::from_captures(&caps, 1, false))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("{name:?} section: {} record(s)", records.len());
    Ok(records)
}

pub fn parse_heap_stats(text: &str) -> Result<HeapStats, ExtractError> {
    let text = &normalize_newlines(text);
    let header = parse_header_fields(text)?;
    let insert = section_records(text, &INSERT_SECTION, "Insert Stats")?;
    let extract_min = section_records(text, &EXTRACT_MIN_SECTION, "Extract Min Stats")?;
    Ok(HeapStats {
        header,
        insert,
        extract_min,
    })
}

/// Every occurrence of the two sections including the resource usage
/// lines, e.g. from several runs appended to the same log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FullStats {
    pub insert: Vec<StatRecord>,
    pub extract_min: Vec<StatRecord>,
}

fn full_records(text: &str, re: &Regex) -> Result<Vec<StatRecord>, ExtractError> {
    re.captures_iter(text)
        .map(|caps| StatRecord::from_captures(&caps, 1, true))
        .collect()
}

/// Absent sections give empty lists; only numbers that overflow
/// `u64` are an error.
pub fn parse_full_stats(text: &str) -> Result<FullStats, ExtractError> {
    let text = &normalize_newlines(text);
    Ok(FullStats {
        insert: full_records(text, &INSERT_FULL)?,
        extract_min: full_records(text, &EXTRACT_MIN_FULL)?,
    })
}

#[cfg(test)]
const HEAP_LOG: &str = "\
running heap experiment
heapsize: 1024
is_optimized: 1
===== Insert Stats =====
20 messages sent
3200 message bytes sent
12 Lamport clock (latencies)
640 local AES operations
35 milliseconds wall clock time
{35000000;30000000;2000000} nanoseconds {real;user;system}
Mem: 4096 KiB

===== Extract Min Stats =====
41 messages sent
8800 message bytes sent
30 Lamport clock (latencies)
1280 local AES operations
77 milliseconds wall clock time
{77000000;70000000;5000000} nanoseconds {real;user;system}
Mem: 5120 KiB
";

#[test]
fn t_header_fields() {
    assert_eq!(
        parse_header_fields(HEAP_LOG).unwrap(),
        HeaderFields {
            heapsize: 1024,
            is_optimized: 1
        }
    );
}

#[test]
fn t_missing_heapsize_is_fatal() {
    let log = HEAP_LOG.replace("heapsize: 1024\n", "");
    match parse_heap_stats(&log) {
        Err(ExtractError::MissingSection(what)) => assert_eq!(what, "heapsize"),
        r => panic!("expected MissingSection, got {r:?}"),
    }
}

#[test]
fn t_missing_is_optimized_is_fatal() {
    let log = HEAP_LOG.replace("is_optimized: 1\n", "");
    assert!(matches!(
        parse_header_fields(&log),
        Err(ExtractError::MissingSection("is_optimized"))
    ));
}

#[test]
fn t_heap_stats() {
    let stats = parse_heap_stats(HEAP_LOG).unwrap();
    assert_eq!(stats.insert.len(), 1);
    let insert = &stats.insert[0];
    assert_eq!(
        (
            insert.messages_sent,
            insert.message_bytes_sent,
            insert.lamport_clock,
            insert.local_aes_ops,
            insert.wall_clock_ms
        ),
        (20, 3200, 12, 640, 35)
    );
    assert_eq!(insert.usage, None);
    assert_eq!(
        stats.insert_summary(),
        OperationSummary {
            wall_clock_ms: 35,
            message_bytes_sent: 3200
        }
    );
    assert_eq!(
        stats.extract_min_summary(),
        OperationSummary {
            wall_clock_ms: 77,
            message_bytes_sent: 8800
        }
    );
}

#[test]
fn t_absent_sections_are_empty() {
    let log = "heapsize: 8\nis_optimized: 0\nnothing else\n";
    let stats = parse_heap_stats(log).unwrap();
    assert!(stats.insert.is_empty());
    assert!(stats.extract_min.is_empty());
    assert_eq!(stats.insert_summary(), OperationSummary::default());
    assert_eq!(stats.extract_min_summary(), OperationSummary::default());
}

#[test]
fn t_insert_section_stops_at_blank_line() {
    // The extract-min numbers must not leak into the insert section
    let log = "heapsize: 8\nis_optimized: 0\n===== Insert Stats =====\nno numbers here\n\n\
               1 messages sent\n2 message bytes sent\n3 Lamport clock (latencies)\n\
               4 local AES operations\n5 milliseconds wall clock time\n";
    let stats = parse_heap_stats(log).unwrap();
    assert!(stats.insert.is_empty());
}

#[test]
fn t_full_stats() {
    let twice = format!("{HEAP_LOG}\n{HEAP_LOG}");
    let full = parse_full_stats(&twice).unwrap();
    assert_eq!(full.insert.len(), 2);
    assert_eq!(full.extract_min.len(), 2);
    let usage = full.extract_min[1].usage.unwrap();
    assert_eq!(usage.real_ns, 77000000);
    assert_eq!(usage.mem_kib, 5120);
    assert_eq!(full.insert[0].wall_clock_ms, 35);
}

#[test]
fn t_full_stats_requires_usage_lines() {
    let log = "===== Insert Stats =====\n1 messages sent\n2 message bytes sent\n\
               3 Lamport clock (latencies)\n4 local AES operations\n\
               5 milliseconds wall clock time\n\n";
    assert_eq!(parse_full_stats(log).unwrap(), FullStats::default());
}

#[test]
fn t_crlf_log() {
    let crlf = HEAP_LOG.replace('\n', "\r\n");
    let stats = parse_heap_stats(&crlf).unwrap();
    assert_eq!(stats, parse_heap_stats(HEAP_LOG).unwrap());
    assert_eq!(stats.insert.len(), 1);
    assert_eq!(stats.extract_min_summary().message_bytes_sent, 8800);
    let full = parse_full_stats(&crlf).unwrap();
    assert_eq!(full.insert.len(), 1);
    assert_eq!(full.extract_min[0].usage.unwrap().mem_kib, 5120);
}
