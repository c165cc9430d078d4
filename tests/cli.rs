//! The `prac-bench` binary as driver scripts call it.

use std::{
    path::PathBuf,
    process::{Command, Output},
};

fn prac_bench(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_prac-bench"))
        .args(args)
        .output()
        .unwrap()
}

fn scratch_log(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "prac-bench-cli-{name}-{}.log",
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn missing_log_is_one_line_and_exit_1() {
    let path = std::env::temp_dir().join("prac-bench-cli-no-such-dir/run.log");
    let path_str = path.to_str().unwrap();
    for subcommand in ["heap", "binary-search", "parties"] {
        let out = prac_bench(&[subcommand, path_str]);
        assert_eq!(out.status.code(), Some(1), "{subcommand}");
        assert!(out.stdout.is_empty());
        let stderr = String::from_utf8(out.stderr).unwrap();
        assert_eq!(stderr, format!("Error: file {path:?} not found.\n"));
    }
}

#[test]
fn missing_results_file_exits_1() {
    let path = std::env::temp_dir().join("prac-bench-cli-no-such-dir/results.txt");
    let out = prac_bench(&[
        "append",
        path.to_str().unwrap(),
        "ds",
        "insert",
        "1",
        "8",
        "-2.5",
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        String::from_utf8(out.stderr).unwrap(),
        format!("Error: file {path:?} not found.\n")
    );
}

#[test]
fn heap_prints_six_numbers() {
    let log = scratch_log(
        "heap",
        "heapsize: 32\nis_optimized: 0\n===== Insert Stats =====\n1 messages sent\n\
         200 message bytes sent\n1 Lamport clock (latencies)\n4 local AES operations\n\
         9 milliseconds wall clock time\n\n",
    );
    let out = prac_bench(&["heap", log.to_str().unwrap()]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "32\n0\n9\n200\n0\n0\n");
    std::fs::remove_file(&log).unwrap();
}

#[test]
fn missing_heapsize_fails() {
    let log = scratch_log("noheapsize", "is_optimized: 1\n");
    let out = prac_bench(&["heap", log.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8(out.stderr).unwrap().contains("heapsize"));
    std::fs::remove_file(&log).unwrap();
}

#[test]
fn captured_stats_table_has_no_escape_codes() {
    let log = scratch_log(
        "table",
        "===== Insert Stats =====\n1 messages sent\n2 message bytes sent\n\
         3 Lamport clock (latencies)\n4 local AES operations\n5 milliseconds wall clock time\n\
         {6;7;8} nanoseconds {real;user;system}\nMem: 9 KiB\n\n",
    );
    let out = prac_bench(&["stats-table", log.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(!stdout.contains('\x1b'), "{stdout:?}");
    assert!(stdout.starts_with("Insert Stats:\nMessages Sent "));
    std::fs::remove_file(&log).unwrap();
}
