//! Logs of 3-party runs, where each party (`P0`, `P1`, `P2`) prints
//! its own section. Unlike the other parsers this one works line by
//! line on prefixes and substrings, since the party sections don't
//! have a fixed layout.

use std::collections::BTreeMap;

use super::{heap_stats::HeaderFields, parse_u64, ExtractError};
use crate::{debug, stats::max_by_field};

const PARTY_HEADING_PREFIX: &str = "===== P";

/// The metrics one party reported. A later line overwrites an earlier
/// one for the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartyRecord {
    pub messages_sent: Option<u64>,
    pub message_bytes_sent: Option<u64>,
    pub wall_clock_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyLog {
    pub header: HeaderFields,
    /// By party label, e.g. "P1"
    pub parties: BTreeMap<String, PartyRecord>,
}

/// The slowest party and the party that sent the most, which need
/// not be the same one. Zero where no party reported the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorstCase {
    pub max_wall_clock_ms: u64,
    pub max_message_bytes_sent: u64,
}

impl PartyLog {
    pub fn worst_case(&self) -> WorstCase {
        WorstCase {
            max_wall_clock_ms: max_by_field(self.parties.values(), |p| p.wall_clock_ms)
                .unwrap_or(0),
            max_message_bytes_sent: max_by_field(self.parties.values(), |p| {
                p.message_bytes_sent
            })
            .unwrap_or(0),
        }
    }
}

/// "P" followed by digits
fn is_party_label(s: &str) -> bool {
    match s.strip_prefix('P') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// The integer after the first colon of a `key: value` line.
fn key_value(line: &str, what: &'static str) -> Result<u64, ExtractError> {
    let value = line.split(':').nth(1).unwrap_or("").trim();
    parse_u64(value, what)
}

/// The integer at the start of a counter line like "42 message bytes
/// sent".
fn leading_number(line: &str, what: &'static str) -> Result<u64, ExtractError> {
    parse_u64(line.split_whitespace().next().unwrap_or(""), what)
}

pub fn parse_party_log(text: &str) -> Result<PartyLog, ExtractError> {
    let mut heapsize = None;
    let mut is_optimized = None;
    let mut parties: BTreeMap<String, PartyRecord> = BTreeMap::new();
    let mut current_party: Option<String> = None;

    for line in text.lines() {
        if line.starts_with("heapsize:") {
            heapsize = Some(key_value(line, "heapsize")?);
        } else if line.starts_with("is_optimized:") {
            is_optimized = Some(key_value(line, "is_optimized")?);
        } else if line.starts_with(PARTY_HEADING_PREFIX) {
            // Other headings starting with "P" close the party scope
            current_party = line
                .split_whitespace()
                .nth(1)
                .filter(|label| is_party_label(label))
                .map(String::from);
            if let Some(label) = &current_party {
                debug!("entering section of party {label}");
                parties.entry(label.clone()).or_default();
            }
        } else if let Some(label) = &current_party {
            let record = parties.entry(label.clone()).or_default();
            if line.contains("milliseconds wall clock time") {
                record.wall_clock_ms = Some(leading_number(line, "milliseconds wall clock time")?);
            } else if line.contains("messages sent") {
                record.messages_sent = Some(leading_number(line, "messages sent")?);
            } else if line.contains("message bytes sent") {
                record.message_bytes_sent = Some(leading_number(line, "message bytes sent")?);
            }
        }
    }

    let header = HeaderFields {
        heapsize: heapsize.ok_or(ExtractError::MissingSection("heapsize"))?,
        is_optimized: is_optimized.ok_or(ExtractError::MissingSection("is_optimized"))?,
    };
    debug!("parties found: {:?}", parties.keys().collect::<Vec<_>>());
    Ok(PartyLog { header, parties })
}

#[cfg(test)]
fn party_section(label: &str, ms: u64, bytes: u64) -> String {
    format!(
        "===== {label} =====\n5 messages sent\n{bytes} message bytes sent\n\
         3 Lamport clock (latencies)\n8 local AES operations\n\
         {ms} milliseconds wall clock time\n"
    )
}

#[test]
fn t_worst_case_across_parties() {
    let log = format!(
        "heapsize: 256\nis_optimized: 0\n{}{}{}",
        party_section("P0", 120, 500),
        party_section("P1", 95, 700),
        party_section("P2", 110, 600)
    );
    let parsed = parse_party_log(&log).unwrap();
    assert_eq!(
        parsed.header,
        HeaderFields {
            heapsize: 256,
            is_optimized: 0
        }
    );
    assert_eq!(parsed.parties.len(), 3);
    assert_eq!(
        parsed.parties["P1"],
        PartyRecord {
            messages_sent: Some(5),
            message_bytes_sent: Some(700),
            wall_clock_ms: Some(95),
        }
    );
    assert_eq!(
        parsed.worst_case(),
        WorstCase {
            max_wall_clock_ms: 120,
            max_message_bytes_sent: 700
        }
    );
}

#[test]
fn t_metrics_before_party_heading_ignored() {
    let log = "heapsize: 4\nis_optimized: 1\n999 message bytes sent\n\
               9999 milliseconds wall clock time\n===== P0 =====\n10 message bytes sent\n";
    let parsed = parse_party_log(log).unwrap();
    assert_eq!(
        parsed.worst_case(),
        WorstCase {
            max_wall_clock_ms: 0,
            max_message_bytes_sent: 10
        }
    );
}

#[test]
fn t_later_line_overwrites() {
    let log = "heapsize: 4\nis_optimized: 1\n===== P2 =====\n1 milliseconds wall clock time\n\
               7 milliseconds wall clock time\n";
    let parsed = parse_party_log(log).unwrap();
    assert_eq!(parsed.parties["P2"].wall_clock_ms, Some(7));
}

#[test]
fn t_non_party_heading_closes_scope() {
    let log = "heapsize: 4\nis_optimized: 1\n===== P0 =====\n3 message bytes sent\n\
               ===== Preprocessing =====\n900 message bytes sent\n";
    let parsed = parse_party_log(log).unwrap();
    assert_eq!(parsed.parties.len(), 1);
    assert_eq!(parsed.worst_case().max_message_bytes_sent, 3);
}

#[test]
fn t_party_log_requires_header_fields() {
    let log = format!("is_optimized: 1\n{}", party_section("P0", 1, 2));
    assert!(matches!(
        parse_party_log(&log),
        Err(ExtractError::MissingSection("heapsize"))
    ));
    let log = format!("heapsize: 3\n{}", party_section("P0", 1, 2));
    assert!(matches!(
        parse_party_log(&log),
        Err(ExtractError::MissingSection("is_optimized"))
    ));
}

#[test]
fn t_malformed_heapsize() {
    assert!(matches!(
        parse_party_log("heapsize: lots\nis_optimized: 1\n"),
        Err(ExtractError::BadNumber {
            what: "heapsize",
            ..
        })
    ));
}
