//! Scraping of PRAC benchmark logs (heap insert / extract-min runs,
//! binary search runs, 3-party preprocessing runs) and aggregation of
//! single measurements into a flat results file.
//!
//! [`extract`](extract/mod.rs) holds the log parsers,
//! [`results`](results/mod.rs) the results file handling. The
//! `prac-bench` binary at `src/bin/prac-bench.rs` ties them to the
//! command line.

pub mod ctx;
pub mod extract;
pub mod get_terminal_width;
pub mod io_util;
pub mod io_utils;
pub mod results;
pub mod stats;
pub mod terminal_table;
pub mod utillib;
