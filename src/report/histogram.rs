//! Latency histogram table.
//!
//! # Example
//! ```text
//! Bucket          #  %       Histogram
//! [0s, 100ms]     1  33.33%  #########################
//! [100ms, 200ms]  1  33.33%  #########################
//! [200ms, +Inf]   1  33.33%  #########################
//! ```

use std::io::Write;

use crate::histogram::Histogram;
use crate::report::Reporter;
use crate::result::AttackResult;
use crate::{util, KorraError};

/// Width of the bar of a bucket holding every result.
pub const BAR_WIDTH: usize = 75;

/// Writes one row per histogram bucket: its label, how many results fell into
/// it, the share of all results, and a bar of `#` proportional to that share.
#[derive(Debug, Clone)]
pub struct HistogramReporter {
    histogram: Histogram,
}
impl HistogramReporter {
    pub fn new(histogram: Histogram) -> Self {
        HistogramReporter { histogram }
    }
}

// Width of the widest cell in a column, header included.
fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a String>) -> usize {
    cells
        .map(|cell| cell.chars().count())
        .fold(header.chars().count(), usize::max)
}

impl Reporter for HistogramReporter {
    fn report(&self, results: &[AttackResult]) -> Result<Vec<u8>, KorraError> {
        let counts = self.histogram.counts(results);
        let rows: Vec<(String, String, String, String)> = counts
            .iter()
            .enumerate()
            .map(|(index, count)| {
                let ratio = match results.len() {
                    0 => 0.0,
                    total => *count as f64 / total as f64,
                };
                (
                    self.histogram.label(index),
                    util::format_number(*count),
                    format!("{:.2}%", ratio * 100.0),
                    "#".repeat((ratio * BAR_WIDTH as f64) as usize),
                )
            })
            .collect();

        let label_width = column_width("Bucket", rows.iter().map(|row| &row.0));
        let count_width = column_width("#", rows.iter().map(|row| &row.1));
        let percent_width = column_width("%", rows.iter().map(|row| &row.2));

        let mut out = Vec::new();
        writeln!(
            out,
            "{:<lw$}  {:<cw$}  {:<pw$}  Histogram",
            "Bucket",
            "#",
            "%",
            lw = label_width,
            cw = count_width,
            pw = percent_width
        )?;
        for (label, count, percent, bar) in &rows {
            writeln!(
                out,
                "{:<lw$}  {:<cw$}  {:<pw$}  {}",
                label,
                count,
                percent,
                bar,
                lw = label_width,
                cw = count_width,
                pw = percent_width
            )?;
        }
        Ok(out)
    }
}
