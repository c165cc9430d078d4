//! The flat results file that experiment runs are averaged into.
//!
//! One header line, then one row per (dataset, operation,
//! is_optimized, heapsize) key:
//!
//! ```text
//! DS OP is_optimized heapsize y pm y-err
//! mnist insert 1 1024 35.5 ± 0.5
//! ```
//!
//! The file is small; it is read completely, amended in memory, and
//! written back completely. There is no locking, callers must not run
//! concurrently on the same file.

use std::{fmt::Display, num::ParseFloatError, path::Path};

use anyhow::Result;
use kstring::KString;

use crate::{
    ctx, debug, info,
    io_util::read_text_file,
    io_utils::tempfile_utils::replace_file_contents,
    stats::average::Average,
    warn,
};

pub const HEADER: &str = "DS OP is_optimized heapsize y pm y-err";

/// Separator written into new rows; existing rows keep theirs.
pub const PLUS_MINUS: &str = "±";

#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    #[error("line {lineno}: expected 7 fields, got {count}: {line:?}")]
    BadRowLength {
        lineno: usize,
        count: usize,
        line: String,
    },
    #[error("line {lineno}: invalid number {text:?} in column {column:?}: {error}")]
    BadRowNumber {
        lineno: usize,
        column: &'static str,
        text: String,
        error: ParseFloatError,
    },
}

/// Compared with exact, case-sensitive string equality on every
/// field; "1" and "01" are different heap sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsKey {
    pub dataset: KString,
    pub operation: KString,
    pub is_optimized: KString,
    pub heapsize: KString,
}

impl ResultsKey {
    pub fn new(dataset: &str, operation: &str, is_optimized: &str, heapsize: &str) -> Self {
        ResultsKey {
            dataset: KString::from_ref(dataset),
            operation: KString::from_ref(operation),
            is_optimized: KString::from_ref(is_optimized),
            heapsize: KString::from_ref(heapsize),
        }
    }
}

impl Display for ResultsKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            dataset,
            operation,
            is_optimized,
            heapsize,
        } = self;
        write!(f, "{dataset} {operation} {is_optimized} {heapsize}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsRow {
    pub key: ResultsKey,
    pub y: f64,
    pub pm: KString,
    pub y_err: f64,
}

impl ResultsRow {
    pub fn new(key: ResultsKey, y0: f64) -> Self {
        ResultsRow {
            key,
            y: y0,
            pm: KString::from_static(PLUS_MINUS),
            y_err: 0.,
        }
    }

    /// `y` becomes the mean of the old `y` and `y0`, and `y_err` the
    /// distance of `y0` from that new mean. This is a simple bound,
    /// not a statistical error estimate.
    pub fn add_sample(&mut self, y0: f64) {
        self.y = (self.y, y0).average();
        self.y_err = (self.y - y0).abs();
    }

    /// `lineno` is 1-based and only used for error messages.
    pub fn parse_line(line: &str, lineno: usize) -> Result<Self, ResultsError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [ds, op, is_optimized, heapsize, y, pm, y_err] = fields[..] else {
            return Err(ResultsError::BadRowLength {
                lineno,
                count: fields.len(),
                line: line.into(),
            });
        };
        let number = |column: &'static str, text: &str| -> Result<f64, ResultsError> {
            text.parse().map_err(|error| ResultsError::BadRowNumber {
                lineno,
                column,
                text: text.into(),
                error,
            })
        };
        Ok(ResultsRow {
            key: ResultsKey::new(ds, op, is_optimized, heapsize),
            y: number("y", y)?,
            pm: KString::from_ref(pm),
            y_err: number("y-err", y_err)?,
        })
    }
}

/// Floats always carry a fractional part (`12.0`, not `12`), so the
/// columns read as real numbers.
impl Display for ResultsRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self { key, y, pm, y_err } = self;
        write!(f, "{key} {y:?} {pm} {y_err:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An existing row had the sample averaged in
    Updated,
    /// No row with the key existed, a new one was added at the end
    Appended,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultsFile {
    pub rows: Vec<ResultsRow>,
}

impl ResultsFile {
    /// The first line is taken to be the header and is not
    /// checked. Blank lines are skipped.
    pub fn parse(contents: &str) -> Result<Self, ResultsError> {
        let rows = contents
            .lines()
            .enumerate()
            .skip(1)
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| ResultsRow::parse_line(line, i + 1))
            .collect::<Result<_, _>>()?;
        Ok(ResultsFile { rows })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_text_file(path)?;
        let file = Self::parse(&contents).map_err(ctx!("parsing results file {path:?}"))?;
        debug!("loaded {} row(s) from {path:?}", file.rows.len());
        for (i, row) in file.rows.iter().enumerate() {
            if file.rows[..i].iter().any(|earlier| earlier.key == row.key) {
                warn!(
                    "duplicate key {:?} in {path:?}, only the first row is updated",
                    row.key.to_string()
                );
            }
        }
        Ok(file)
    }

    /// Linear scan, the files hold a few dozen rows.
    pub fn find_mut(&mut self, key: &ResultsKey) -> Option<&mut ResultsRow> {
        self.rows.iter_mut().find(|row| row.key == *key)
    }

    pub fn add_sample(&mut self, key: ResultsKey, y0: f64) -> Outcome {
        if let Some(row) = self.find_mut(&key) {
            row.add_sample(y0);
            Outcome::Updated
        } else {
            self.rows.push(ResultsRow::new(key, y0));
            Outcome::Appended
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        replace_file_contents(path, self.to_string().as_bytes())
            .map_err(ctx!("writing results file {path:?}"))
    }
}

impl Display for ResultsFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{HEADER}")?;
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Load `path`, average `y0` into the row for `key` (or append one),
/// and write the whole file back.
pub fn update_results_file(path: &Path, key: ResultsKey, y0: f64) -> Result<Outcome> {
    let mut file = ResultsFile::load(path)?;
    let key_string = key.to_string();
    let outcome = file.add_sample(key, y0);
    file.save(path)?;
    info!("{outcome:?} row {key_string:?} in {path:?} with sample {y0}");
    Ok(outcome)
}

#[cfg(test)]
const SAMPLE_FILE: &str = "\
DS OP is_optimized heapsize y pm y-err
mnist insert 1 1024 30.0 ± 0.0
mnist extract 1 1024 70.0 ± 2.5
";

#[test]
fn t_parse_and_print() {
    let file = ResultsFile::parse(SAMPLE_FILE).unwrap();
    assert_eq!(file.rows.len(), 2);
    assert_eq!(file.rows[1].key, ResultsKey::new("mnist", "extract", "1", "1024"));
    assert_eq!(file.rows[1].y_err, 2.5);
    assert_eq!(&*file.rows[0].pm, PLUS_MINUS);
    assert_eq!(file.to_string(), SAMPLE_FILE);
}

#[test]
fn t_update_averages_and_bounds() {
    let mut file = ResultsFile::parse(SAMPLE_FILE).unwrap();
    let outcome = file.add_sample(ResultsKey::new("mnist", "insert", "1", "1024"), 40.);
    assert_eq!(outcome, Outcome::Updated);
    assert_eq!(file.rows.len(), 2);
    assert_eq!(file.rows[0].y, 35.);
    assert_eq!(file.rows[0].y_err, 5.);
    // untouched
    assert_eq!(file.rows[1].y, 70.);
}

#[test]
fn t_key_match_is_exact() {
    let mut file = ResultsFile::parse(SAMPLE_FILE).unwrap();
    for key in [
        ResultsKey::new("MNIST", "insert", "1", "1024"),
        ResultsKey::new("mnist", "insert", "0", "1024"),
        ResultsKey::new("mnist", "insert", "1", "01024"),
    ] {
        assert_eq!(file.add_sample(key, 1.), Outcome::Appended);
    }
    assert_eq!(file.rows.len(), 5);
    assert_eq!(file.rows[0].y, 30.);
}

#[test]
fn t_append_new_row() {
    let mut file = ResultsFile::parse(SAMPLE_FILE).unwrap();
    let before = file.rows.clone();
    let outcome = file.add_sample(ResultsKey::new("cifar", "insert", "0", "64"), 12.5);
    assert_eq!(outcome, Outcome::Appended);
    assert_eq!(&file.rows[..2], &before[..]);
    assert_eq!(
        file.rows[2],
        ResultsRow {
            key: ResultsKey::new("cifar", "insert", "0", "64"),
            y: 12.5,
            pm: KString::from_static(PLUS_MINUS),
            y_err: 0.,
        }
    );
    assert!(file.to_string().ends_with("cifar insert 0 64 12.5 ± 0.0\n"));
}

#[test]
fn t_pm_kept_verbatim() {
    let file = ResultsFile::parse("header\na b c d 1.0 +- 0.5\n").unwrap();
    assert_eq!(&*file.rows[0].pm, "+-");
    assert!(file.to_string().ends_with("a b c d 1.0 +- 0.5\n"));
}

#[test]
fn t_bad_rows() {
    match ResultsFile::parse("header\na b c d 1.0 ±\n") {
        Err(ResultsError::BadRowLength { lineno, count, .. }) => {
            assert_eq!((lineno, count), (2, 6))
        }
        r => panic!("{r:?}"),
    }
    match ResultsFile::parse("header\n\na b c d x ± 0\n") {
        Err(ResultsError::BadRowNumber { lineno, column, .. }) => {
            assert_eq!((lineno, column), (3, "y"))
        }
        r => panic!("{r:?}"),
    }
}

#[test]
fn t_header_only_and_empty() {
    assert!(ResultsFile::parse(HEADER).unwrap().rows.is_empty());
    assert!(ResultsFile::parse("").unwrap().rows.is_empty());
    assert_eq!(ResultsFile::default().to_string(), format!("{HEADER}\n"));
}
