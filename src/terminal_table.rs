//! Table printing either for humans (padded columns, bold/italic
//! title row) or as TSV (tab separated, no styling, no padding).
//!
//! Fields are not escaped, values are printed via `Display` as they
//! are. Fine for the numbers printed here.

use std::{fmt::Display, io::Write};

use anyhow::{anyhow, bail, Result};
use itertools::Itertools;
use yansi::{Paint, Style};

/// Column widths are fixed up front so that rows can be streamed. A
/// value wider than its column still gets one space after it. The
/// last column has no width and no padding.
pub struct TerminalTable {
    widths: Vec<usize>,
    titles: Vec<String>,
    padding: String,
    pub tsv_mode: bool,
}

impl TerminalTable {
    /// The length of `widths` must be one less than that of `titles`.
    pub fn new<S: Display>(widths: &[usize], titles: &[S], tsv_mode: bool) -> Self {
        let titles = titles.iter().map(|title| title.to_string()).collect();
        let max_width = widths.iter().max().copied().unwrap_or(0);
        Self {
            widths: widths.to_owned(),
            titles,
            padding: " ".repeat(max_width),
            tsv_mode,
        }
    }

    /// Widths from the titles, plus `gap` spaces.
    pub fn fitting_titles<S: Display>(titles: &[S], gap: usize, tsv_mode: bool) -> Self {
        let widths: Vec<usize> = titles
            .iter()
            .take(titles.len().saturating_sub(1))
            .map(|title| title.to_string().chars().count() + gap)
            .collect();
        Self::new(&widths, titles, tsv_mode)
    }

    fn write_row<V: Display>(
        &self,
        row: &[V],
        style: Option<Style>,
        out: &mut impl Write,
    ) -> Result<()> {
        let lens = (self.widths.len(), row.len());
        if lens.0
            != lens
                .1
                .checked_sub(1)
                .ok_or_else(|| anyhow!("need at least 1 column"))?
        {
            bail!("widths.len != row.len - 1: {lens:?}")
        }

        for (i, pair) in self.widths.iter().zip_longest(row).enumerate() {
            if self.tsv_mode && i > 0 {
                out.write_all(b"\t")?;
            }
            let Some(val) = pair.as_ref().right() else {
                bail!("row shorter than widths")
            };
            let s = val.to_string();
            let s_len = s.chars().count();
            match style {
                Some(style) => write!(out, "{}", s.paint(style))?,
                None => out.write_all(s.as_bytes())?,
            }
            if let Some(width) = pair.left() {
                if !self.tsv_mode {
                    if *width > s_len {
                        out.write_all(self.padding[0..width - s_len].as_bytes())?;
                    } else {
                        out.write_all(b" ")?;
                    }
                }
            }
        }
        out.write_all(b"\n")?;
        Ok(())
    }

    /// In human mode also writes a dashed rule below the titles.
    pub fn write_title_row(&self, out: &mut impl Write) -> Result<()> {
        const STYLE: Style = Style::new().bold().italic();
        if self.tsv_mode {
            self.write_row(&self.titles, None, out)
        } else {
            self.write_row(&self.titles, Some(STYLE), out)?;
            let total: usize = self.widths.iter().sum::<usize>()
                + self.titles.last().map(|t| t.chars().count()).unwrap_or(0);
            writeln!(out, "{}", "-".repeat(total))?;
            Ok(())
        }
    }

    pub fn write_data_row<V: Display>(&self, data: &[V], out: &mut impl Write) -> Result<()> {
        self.write_row(data, None, out)
    }
}

#[test]
fn t_tsv() {
    let table = TerminalTable::fitting_titles(&["a", "bb", "c"], 2, true);
    let mut out = Vec::new();
    table.write_title_row(&mut out).unwrap();
    table.write_data_row(&[1, 22, 333], &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "a\tbb\tc\n1\t22\t333\n");
}

#[test]
fn t_padded_data_rows() {
    let table = TerminalTable::new(&[4, 3], &["x", "y", "z"], false);
    let mut out = Vec::new();
    table.write_data_row(&["1", "22", "3"], &mut out).unwrap();
    table.write_data_row(&["12345", "2", "3"], &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "1   22 3\n12345 2  3\n");
}

#[test]
fn t_row_length_checked() {
    let table = TerminalTable::new(&[4], &["x", "y"], false);
    let mut out = Vec::new();
    assert!(table.write_data_row(&[1, 2, 3], &mut out).is_err());
    assert!(table.write_data_row::<u8>(&[], &mut out).is_err());
}

#[test]
fn t_titles_unstyled_when_disabled() {
    yansi::disable();
    let table = TerminalTable::fitting_titles(&["a", "b"], 1, false);
    let mut out = Vec::new();
    table.write_title_row(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "a b\n---\n");
}
