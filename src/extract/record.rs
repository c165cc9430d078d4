use regex::Captures;

use super::{parse_u64, ExtractError};

/// The five counter lines every stats section starts with, in order.
pub const COUNTERS_PATTERN: &str = r"(\d+) messages sent\n(\d+) message bytes sent\n(\d+) Lamport clock \(latencies\)\n(\d+) local AES operations\n(\d+) milliseconds wall clock time";

/// The optional resource usage lines following the counters.
pub const USAGE_PATTERN: &str =
    r"\n\{(\d+);(\d+);(\d+)\} nanoseconds \{real;user;system\}\nMem: (\d+) KiB";

const COUNTER_FIELDS: [&str; 5] = [
    "messages sent",
    "message bytes sent",
    "Lamport clock (latencies)",
    "local AES operations",
    "milliseconds wall clock time",
];

const USAGE_FIELDS: [&str; 4] = [
    "real nanoseconds",
    "user nanoseconds",
    "system nanoseconds",
    "Mem KiB",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUsage {
    pub real_ns: u64,
    pub user_ns: u64,
    pub system_ns: u64,
    pub mem_kib: u64,
}

/// One occurrence of a stats section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatRecord {
    pub messages_sent: u64,
    pub message_bytes_sent: u64,
    pub lamport_clock: u64,
    pub local_aes_ops: u64,
    pub wall_clock_ms: u64,
    pub usage: Option<ResourceUsage>,
}

fn group_u64(caps: &Captures, group: usize, what: &'static str) -> Result<u64, ExtractError> {
    let text = caps
        .get(group)
        .ok_or(ExtractError::MissingSection(what))?
        .as_str();
    parse_u64(text, what)
}

impl StatRecord {
    /// Build from a match of `COUNTERS_PATTERN` whose first group is
    /// `first_group`. If `with_usage`, the match must continue with
    /// `USAGE_PATTERN` directly.
    pub fn from_captures(
        caps: &Captures,
        first_group: usize,
        with_usage: bool,
    ) -> Result<Self, ExtractError> {
        let mut counters = [0; 5];
        for (i, (counter, what)) in counters.iter_mut().zip(COUNTER_FIELDS).enumerate() {
            *counter = group_u64(caps, first_group + i, what)?;
        }
        let [messages_sent, message_bytes_sent, lamport_clock, local_aes_ops, wall_clock_ms] =
            counters;

        let usage = if with_usage {
            let mut vals = [0; 4];
            for (i, (val, what)) in vals.iter_mut().zip(USAGE_FIELDS).enumerate() {
                *val = group_u64(caps, first_group + COUNTER_FIELDS.len() + i, what)?;
            }
            let [real_ns, user_ns, system_ns, mem_kib] = vals;
            Some(ResourceUsage {
                real_ns,
                user_ns,
                system_ns,
                mem_kib,
            })
        } else {
            None
        };

        Ok(StatRecord {
            messages_sent,
            message_bytes_sent,
            lamport_clock,
            local_aes_ops,
            wall_clock_ms,
            usage,
        })
    }

    /// All fields in log order, for table output. The usage fields
    /// are empty strings when absent.
    pub fn table_values(&self) -> [String; 9] {
        let usage = |f: fn(&ResourceUsage) -> u64| {
            self.usage
                .as_ref()
                .map(|u| f(u).to_string())
                .unwrap_or_default()
        };
        [
            self.messages_sent.to_string(),
            self.message_bytes_sent.to_string(),
            self.lamport_clock.to_string(),
            self.local_aes_ops.to_string(),
            self.wall_clock_ms.to_string(),
            usage(|u| u.real_ns),
            usage(|u| u.user_ns),
            usage(|u| u.system_ns),
            usage(|u| u.mem_kib),
        ]
    }
}

pub const TABLE_TITLES: [&str; 9] = [
    "Messages Sent",
    "Message Bytes Sent",
    "Lamport Clock",
    "Local AES Operations",
    "Wall Clock Time (ms)",
    "Real Time",
    "User Time",
    "System Time",
    "Memory (KiB)",
];

#[cfg(test)]
const SAMPLE: &str = "7 messages sent
1024 message bytes sent
3 Lamport clock (latencies)
96 local AES operations
12 milliseconds wall clock time
{5000;4000;1000} nanoseconds {real;user;system}
Mem: 2048 KiB
";

#[test]
fn t_from_captures_counters_only() {
    let re = regex::Regex::new(COUNTERS_PATTERN).unwrap();
    let caps = re.captures(SAMPLE).unwrap();
    let r = StatRecord::from_captures(&caps, 1, false).unwrap();
    assert_eq!(
        r,
        StatRecord {
            messages_sent: 7,
            message_bytes_sent: 1024,
            lamport_clock: 3,
            local_aes_ops: 96,
            wall_clock_ms: 12,
            usage: None,
        }
    );
    assert_eq!(r.table_values()[4], "12");
    assert_eq!(r.table_values()[8], "");
}

#[test]
fn t_from_captures_with_usage() {
    let re = regex::Regex::new(&format!("{COUNTERS_PATTERN}{USAGE_PATTERN}")).unwrap();
    let caps = re.captures(SAMPLE).unwrap();
    let r = StatRecord::from_captures(&caps, 1, true).unwrap();
    assert_eq!(
        r.usage,
        Some(ResourceUsage {
            real_ns: 5000,
            user_ns: 4000,
            system_ns: 1000,
            mem_kib: 2048,
        })
    );
    assert_eq!(r.table_values()[8], "2048");
}
