use std::io::{stdout, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use prac_bench::{
    ctx,
    extract::{
        binary_search::{parse_binary_search, BinarySearchSummary},
        heap_stats::{parse_full_stats, parse_heap_stats},
        parties::parse_party_log,
        record::{StatRecord, TABLE_TITLES},
    },
    get_terminal_width::get_terminal_width,
    info,
    io_util::{read_text_file, ReadError},
    results::{update_results_file, ResultsKey},
    terminal_table::TerminalTable,
    utillib::logging::{set_log_level, LogLevelOpt},
};

const PROGRAM_NAME: &str = "prac-bench";

#[derive(clap::Parser, Debug)]
#[clap(next_line_help = true)]
#[clap(set_term_width = get_terminal_width())]
/// Extract numbers from PRAC benchmark logs, and collect them in a
/// results file.
struct Opts {
    #[clap(flatten)]
    log_level: LogLevelOpt,

    /// The subcommand to run. Use `--help` after the sub-command to
    /// get a list of the allowed options there.
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Print version
    Version,

    /// Print heapsize, is_optimized, then wall clock time (ms) and
    /// message bytes for the first insert run and the first
    /// extract-min run (0 if absent), one number per line.
    Heap { log: PathBuf },

    /// Print tables of all insert and extract-min runs, including
    /// CPU times and memory usage.
    StatsTable {
        /// Print tab-separated values without formatting
        #[clap(long)]
        tsv: bool,

        log: PathBuf,
    },

    /// Print the maximum message bytes and the maximum wall clock
    /// time (ms) over all binary search trials in the log.
    BinarySearch { log: PathBuf },

    /// Print heapsize, is_optimized, then the maximum wall clock time
    /// (ms) and maximum message bytes across the parties P0, P1, P2.
    Parties { log: PathBuf },

    /// Average a new measurement into the row for the given key in
    /// the results file, or add a row if there is none. The file must
    /// exist (with its header line).
    Append {
        results_file: PathBuf,
        /// Dataset name (DS column)
        dataset: String,
        /// Operation name (OP column)
        operation: String,
        is_optimized: String,
        heapsize: String,
        /// The new measurement
        #[clap(allow_hyphen_values = true)]
        y0: f64,
    },
}

fn read_log(path: &Path) -> Result<String> {
    let s = read_text_file(path)?;
    info!("read {} bytes from {path:?}", s.len());
    Ok(s)
}

fn print_stats_table(
    title: &str,
    records: &[StatRecord],
    tsv: bool,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "{title}:")?;
    let table = TerminalTable::fitting_titles(&TABLE_TITLES, 3, tsv);
    table.write_title_row(out)?;
    for record in records {
        table.write_data_row(&record.table_values(), out)?;
    }
    writeln!(out)?;
    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Version => println!("{PROGRAM_NAME} version {}", env!("CARGO_PKG_VERSION")),
        Command::Heap { log } => {
            let stats = parse_heap_stats(&read_log(&log)?)
                .map_err(ctx!("extracting heap stats from {log:?}"))?;
            let insert = stats.insert_summary();
            let extract_min = stats.extract_min_summary();
            println!("{}", stats.header.heapsize);
            println!("{}", stats.header.is_optimized);
            println!("{}", insert.wall_clock_ms);
            println!("{}", insert.message_bytes_sent);
            println!("{}", extract_min.wall_clock_ms);
            println!("{}", extract_min.message_bytes_sent);
        }
        Command::StatsTable { tsv, log } => {
            let full = parse_full_stats(&read_log(&log)?)
                .map_err(ctx!("extracting stats tables from {log:?}"))?;
            let mut out = stdout().lock();
            print_stats_table("Insert Stats", &full.insert, tsv, &mut out)?;
            print_stats_table("Extract Min Stats", &full.extract_min, tsv, &mut out)?;
            out.flush()?;
        }
        Command::BinarySearch { log } => {
            let records = parse_binary_search(&read_log(&log)?)
                .map_err(ctx!("extracting binary search trials from {log:?}"))?;
            let summary = BinarySearchSummary::from_records(&records)
                .map_err(ctx!("summarizing binary search trials from {log:?}"))?;
            println!("{}", summary.max_message_bytes_sent);
            println!("{}", summary.max_wall_clock_ms);
        }
        Command::Parties { log } => {
            let parsed = parse_party_log(&read_log(&log)?)
                .map_err(ctx!("extracting party stats from {log:?}"))?;
            let worst = parsed.worst_case();
            println!("{}", parsed.header.heapsize);
            println!("{}", parsed.header.is_optimized);
            println!("{}", worst.max_wall_clock_ms);
            println!("{}", worst.max_message_bytes_sent);
        }
        Command::Append {
            results_file,
            dataset,
            operation,
            is_optimized,
            heapsize,
            y0,
        } => {
            let key = ResultsKey::new(&dataset, &operation, &is_optimized, &heapsize);
            update_results_file(&results_file, key, y0)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Styled table titles only for humans; driver scripts capture stdout
    yansi::whenever(yansi::Condition::TTY_AND_COLOR);
    let Opts { log_level, command } = Opts::parse();
    set_log_level(log_level.try_into()?);

    run(command).or_else(|e| {
        if let Some(ReadError::NotFound(path)) = e.downcast_ref::<ReadError>() {
            eprintln!("Error: file {path:?} not found.");
            std::process::exit(1);
        }
        Err(e)
    })
}
