//! Render results as text, a latency histogram, or JSON.
//!
//! Every report is produced by a [`Reporter`], which turns a slice of results
//! into the bytes of a complete report. Reports are rendered entirely in
//! memory: [`write_report`] only touches the writer once the report is
//! complete, so a failing reporter never leaves half a report behind.
//!
//! Any function or closure with the signature
//! `Fn(&[AttackResult]) -> Result<Vec<u8>, KorraError>` is also a [`Reporter`]:
//! ```rust
//! use korra::report::{write_report, Reporter};
//! use korra::result::AttackResult;
//! use korra::KorraError;
//!
//! let count = |results: &[AttackResult]| -> Result<Vec<u8>, KorraError> {
//!     Ok(format!("{} results\n", results.len()).into_bytes())
//! };
//!
//! let mut output = Vec::new();
//! write_report(&count, &[], &mut output).unwrap();
//! assert_eq!(output, b"0 results\n");
//! ```

pub mod histogram;
pub mod json;
pub mod text;

use std::io::Write;

use crate::result::AttackResult;
use crate::KorraError;

/// Computes a complete report from a sequence of results.
pub trait Reporter {
    fn report(&self, results: &[AttackResult]) -> Result<Vec<u8>, KorraError>;
}

impl<F> Reporter for F
where
    F: Fn(&[AttackResult]) -> Result<Vec<u8>, KorraError>,
{
    fn report(&self, results: &[AttackResult]) -> Result<Vec<u8>, KorraError> {
        self(results)
    }
}

/// Render a report and write it out in one piece, then flush the writer.
pub fn write_report<W: Write>(
    reporter: &dyn Reporter,
    results: &[AttackResult],
    writer: &mut W,
) -> Result<(), KorraError> {
    let report = reporter.report(results)?;
    debug!(
        "writing {} byte report for {} results",
        report.len(),
        results.len()
    );
    writer.write_all(&report)?;
    writer.flush()?;
    Ok(())
}
