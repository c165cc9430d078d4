// Diagnostics go to stderr, stdout is reserved for the extracted
// numbers so that driver scripts can capture them.

use std::{
    io::{stderr, StderrLock, Write},
    sync::atomic::{AtomicU8, Ordering},
};

use anyhow::{bail, Result};
use chrono::{Local, SecondsFormat};

pub fn write_time(file: &str, line: u32) -> StderrLock<'static> {
    let t_str = Local::now().to_rfc3339_opts(SecondsFormat::Millis, false);
    let mut lock = stderr().lock();
    // Ignore failures, there is nowhere else to report them
    let _ = write!(&mut lock, "{t_str}\t{file}:{line}\t");
    lock
}

// Do *not* make the fields public here to force going through `TryFrom`.
#[derive(Debug, Default, clap::Args)]
pub struct LogLevelOpt {
    /// Show what is being extracted and written
    #[clap(short, long)]
    verbose: bool,

    /// Show the individual matches, for debugging the log parsers
    /// (implies `--verbose`)
    #[clap(short, long)]
    debug: bool,

    /// Disable warnings. Conflicts with `--verbose` and `--debug`.
    #[clap(short, long)]
    quiet: bool,
}

impl TryFrom<LogLevelOpt> for LogLevel {
    type Error = anyhow::Error;

    fn try_from(value: LogLevelOpt) -> Result<Self> {
        let LogLevelOpt {
            verbose,
            debug,
            quiet,
        } = value;
        match (verbose, debug, quiet) {
            (false, false, false) => Ok(LogLevel::Warn),
            (true, false, false) => Ok(LogLevel::Info),
            (_, true, false) => Ok(LogLevel::Debug),
            (false, false, true) => Ok(LogLevel::Quiet),
            (_, _, true) => {
                bail!("option `--quiet` conflicts with the options `--verbose` and `--debug`")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Do not log anything
    Quiet,
    /// The default, only `warn!` statements output anything
    Warn,
    /// What the program extracted and which rows it changed
    Info,
    /// Every individual match
    Debug,
}

impl LogLevel {
    fn level(self) -> u8 {
        self as u8
    }

    fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(LogLevel::Quiet),
            1 => Some(LogLevel::Warn),
            2 => Some(LogLevel::Info),
            3 => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

static LOGLEVEL: AtomicU8 = AtomicU8::new(1);

pub fn set_log_level(val: LogLevel) {
    LOGLEVEL.store(val.level(), Ordering::Relaxed);
}

#[inline]
pub fn log_level() -> LogLevel {
    let level = LOGLEVEL.load(Ordering::Relaxed);
    LogLevel::from_level(level).unwrap_or(LogLevel::Warn)
}

#[macro_export]
macro_rules! warn {
    { $($arg:tt)* } => {
        if $crate::utillib::logging::log_level() >= $crate::utillib::logging::LogLevel::Warn {
            use std::io::Write;
            let mut lock = $crate::utillib::logging::write_time(file!(), line!());
            let _ = writeln!(&mut lock, $($arg)*);
        }
    }
}

#[macro_export]
macro_rules! info {
    { $($arg:tt)* } => {
        if $crate::utillib::logging::log_level() >= $crate::utillib::logging::LogLevel::Info {
            use std::io::Write;
            let mut lock = $crate::utillib::logging::write_time(file!(), line!());
            let _ = writeln!(&mut lock, $($arg)*);
        }
    }
}

#[macro_export]
macro_rules! debug {
    { $($arg:tt)* } => {
        if $crate::utillib::logging::log_level() >= $crate::utillib::logging::LogLevel::Debug {
            use std::io::Write;
            let mut lock = $crate::utillib::logging::write_time(file!(), line!());
            let _ = writeln!(&mut lock, $($arg)*);
        }
    }
}

#[test]
fn t_levels_roundtrip() {
    for level in [
        LogLevel::Quiet,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
    ] {
        assert_eq!(LogLevel::from_level(level.level()), Some(level));
    }
    assert_eq!(LogLevel::from_level(4), None);
}

#[test]
fn t_level_from_opts() {
    let opt = |verbose, debug, quiet| LogLevelOpt {
        verbose,
        debug,
        quiet,
    };
    assert_eq!(LogLevel::try_from(opt(false, false, false)).unwrap(), LogLevel::Warn);
    assert_eq!(LogLevel::try_from(opt(true, false, false)).unwrap(), LogLevel::Info);
    assert_eq!(LogLevel::try_from(opt(true, true, false)).unwrap(), LogLevel::Debug);
    assert_eq!(LogLevel::try_from(opt(false, false, true)).unwrap(), LogLevel::Quiet);
    assert!(LogLevel::try_from(opt(true, false, true)).is_err());
}
