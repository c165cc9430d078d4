//! The extractors on logs shaped like complete benchmark runs.

use prac_bench::extract::{
    binary_search::{parse_binary_search, BinarySearchSummary},
    heap_stats::{parse_full_stats, parse_heap_stats, OperationSummary},
    parties::parse_party_log,
    ExtractError,
};

const HEAP_RUN: &str = "\
Running: ./prac -o -t 8 heap -m 1024 -d 10 -i 5 -e 3 -opt 1
heapsize: 1024
is_optimized: 1
===== Init Stats =====
0 messages sent
0 message bytes sent
===== Insert Stats =====
60 messages sent
4520 message bytes sent
15 Lamport clock (latencies)
1920 local AES operations
48 milliseconds wall clock time
{48121000;40010000;3100000} nanoseconds {real;user;system}
Mem: 6712 KiB

===== Extract Min Stats =====
123 messages sent
10416 message bytes sent
36 Lamport clock (latencies)
3840 local AES operations
97 milliseconds wall clock time
{97212000;90004000;5200000} nanoseconds {real;user;system}
Mem: 7020 KiB
";

#[test]
fn heap_run_numbers_are_verbatim() {
    let stats = parse_heap_stats(HEAP_RUN).unwrap();
    assert_eq!(stats.header.heapsize, 1024);
    assert_eq!(stats.header.is_optimized, 1);
    let insert = stats.insert[0];
    assert_eq!(
        [
            insert.messages_sent,
            insert.message_bytes_sent,
            insert.lamport_clock,
            insert.local_aes_ops,
            insert.wall_clock_ms
        ],
        [60, 4520, 15, 1920, 48]
    );
    // Each value also appears verbatim in the log
    for (value, suffix) in [
        (insert.messages_sent, "messages sent"),
        (insert.message_bytes_sent, "message bytes sent"),
        (insert.wall_clock_ms, "milliseconds wall clock time"),
    ] {
        assert!(HEAP_RUN.contains(&format!("{value} {suffix}")));
    }
    assert_eq!(
        stats.extract_min_summary(),
        OperationSummary {
            wall_clock_ms: 97,
            message_bytes_sent: 10416
        }
    );
}

#[test]
fn heap_run_without_heapsize_fails() {
    let log = HEAP_RUN.replace("heapsize: 1024\n", "");
    let err = parse_heap_stats(&log).unwrap_err();
    assert!(matches!(err, ExtractError::MissingSection("heapsize")));
    assert_eq!(err.to_string(), "required \"heapsize\" missing from log");
}

#[test]
fn heap_run_tables() {
    let full = parse_full_stats(HEAP_RUN).unwrap();
    assert_eq!(full.insert.len(), 1);
    assert_eq!(full.extract_min.len(), 1);
    assert_eq!(
        full.insert[0].table_values(),
        ["60", "4520", "15", "1920", "48", "48121000", "40010000", "3100000", "6712"]
            .map(String::from)
    );
}

#[test]
fn three_party_run() {
    let log = "\
heapsize: 512
is_optimized: 0
===== P0 =====
10 messages sent
500 message bytes sent
2 Lamport clock (latencies)
0 local AES operations
120 milliseconds wall clock time
===== P1 =====
12 messages sent
700 message bytes sent
2 Lamport clock (latencies)
0 local AES operations
95 milliseconds wall clock time
===== P2 =====
11 messages sent
600 message bytes sent
2 Lamport clock (latencies)
0 local AES operations
110 milliseconds wall clock time
";
    let parsed = parse_party_log(log).unwrap();
    assert_eq!(parsed.header.heapsize, 512);
    let worst = parsed.worst_case();
    assert_eq!(worst.max_wall_clock_ms, 120);
    assert_eq!(worst.max_message_bytes_sent, 700);
}

#[test]
fn binary_search_trials() {
    let log: String = [(100, 10), (150, 20), (120, 15)]
        .iter()
        .map(|(bytes, ms)| {
            format!(
                "===== BINARY SEARCH =====\n3 messages sent\n{bytes} message bytes sent\n\
                 3 Lamport clock (latencies)\n24 local AES operations\n\
                 {ms} milliseconds wall clock time\n\n"
            )
        })
        .collect();
    let records = parse_binary_search(&log).unwrap();
    assert_eq!(records.len(), 3);
    let summary = BinarySearchSummary::from_records(&records).unwrap();
    assert_eq!(summary.max_message_bytes_sent, 150);
    assert_eq!(summary.max_wall_clock_ms, 20);
}
