//! # Korra
//!
//! Korra turns the results of an HTTP load test into reports.
//!
//! The load test itself happens elsewhere: something sends the requests and
//! records one [`AttackResult`](result/struct.AttackResult.html) per completed
//! request. Korra takes that finished sequence of results and reduces it into
//! [`Metrics`](metrics/struct.Metrics.html), a latency
//! [`Histogram`](histogram/struct.Histogram.html), or per-URL
//! [`Bucket`](bucket/struct.Bucket.html)s, and renders them as aligned text or
//! JSON.
//!
//! ## Computing metrics
//!
//! ```rust
//! use korra::metrics::Metrics;
//! use korra::result::AttackResult;
//! use std::time::Duration;
//!
//! let results = vec![
//!     AttackResult::new("http://localhost/", 200, Duration::from_millis(20)),
//!     AttackResult::new("http://localhost/", 503, Duration::from_millis(40)),
//! ];
//!
//! let metrics = Metrics::new(&results);
//! assert_eq!(metrics.requests, 2);
//! assert_eq!(metrics.latencies.max, Duration::from_millis(40));
//! assert!((metrics.success - 0.5).abs() < f64::EPSILON);
//! ```
//!
//! ## Reports
//!
//! Every report is produced by a [`Reporter`](report/trait.Reporter.html):
//!  - [`TextReporter`](report/text/struct.TextReporter.html) writes an `OVERALL`
//!    section followed by one section per URL bucket.
//!  - [`HistogramReporter`](report/histogram/struct.HistogramReporter.html) writes a
//!    table of latency buckets with proportional bars.
//!  - [`JsonReporter`](report/json/struct.JsonReporter.html) serializes the
//!    [`Metrics`](metrics/struct.Metrics.html) snapshot. Durations are encoded as
//!    integer nanoseconds.
//!
//! ```rust
//! use korra::histogram::Histogram;
//! use korra::report::{histogram::HistogramReporter, Reporter};
//! use korra::result::AttackResult;
//! use std::time::Duration;
//!
//! let histogram: Histogram = "[0,100ms,200ms]".parse().unwrap();
//! let results = vec![
//!     AttackResult::new("http://localhost/", 200, Duration::from_millis(50)),
//!     AttackResult::new("http://localhost/", 200, Duration::from_millis(250)),
//! ];
//! let report = HistogramReporter::new(histogram).report(&results).unwrap();
//! assert!(String::from_utf8(report).unwrap().starts_with("Bucket"));
//! ```
//!
//! ## Configuration
//!
//! The `korra-report` binary and any other front end can build a reporter from
//! command line options with [`ReportConfiguration`](config/struct.ReportConfiguration.html).
//! All options are validated when the reporter is built, so a malformed
//! histogram or bucket definition never reaches report time.

#[macro_use]
extern crate log;

pub mod bucket;
pub mod config;
pub mod histogram;
pub mod metrics;
pub mod report;
pub mod result;
pub mod util;

use std::{fmt, io};

pub use crate::config::ReportConfiguration;

/// An enumeration of all errors Korra can return.
#[derive(Debug)]
pub enum KorraError {
    /// Wraps a [`std::io::Error`](https://doc.rust-lang.org/std/io/struct.Error.html).
    Io(io::Error),
    /// Wraps a [`serde_json::Error`](https://docs.rs/serde_json/*/serde_json/struct.Error.html).
    Json(serde_json::Error),
    /// Failed to parse a duration literal such as `100ms` or `1h30m`.
    InvalidDuration {
        /// The literal that failed to parse.
        value: String,
        /// An optional explanation of the error.
        detail: String,
    },
    /// A line of encoded results could not be decoded.
    InvalidResult {
        /// The 1-based line number of the offending result.
        line: usize,
        /// Wraps the [`serde_json::Error`](https://docs.rs/serde_json/*/serde_json/struct.Error.html)
        /// explaining what is wrong with it.
        source: serde_json::Error,
    },
    /// Histogram boundaries are empty or not strictly increasing.
    InvalidBuckets {
        /// The boundaries as they were configured.
        value: String,
        /// An optional explanation of the error.
        detail: String,
    },
    /// Invalid option or value specified, may only be invalid in context.
    InvalidOption {
        /// The invalid option that caused this error, may be only invalid in context.
        option: String,
        /// The invalid value that caused this error, may be only invalid in context.
        value: String,
        /// An optional explanation of the error.
        detail: String,
    },
}
/// Implement a helper to provide a text description of all possible types of errors.
impl KorraError {
    fn describe(&self) -> &str {
        match *self {
            KorraError::Io(_) => "io::Error",
            KorraError::Json(_) => "serde_json::Error",
            KorraError::InvalidResult { .. } => "failed to decode result",
            KorraError::InvalidDuration { .. } => "failed to parse duration",
            KorraError::InvalidBuckets { .. } => "invalid histogram buckets",
            KorraError::InvalidOption { .. } => "invalid option or value specified",
        }
    }
}

/// Implement format trait to allow displaying errors.
impl fmt::Display for KorraError {
    // Implement display of error with `{}` marker.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            KorraError::Io(ref source) => write!(f, "KorraError: {} ({})", self.describe(), source),
            KorraError::Json(ref source) => {
                write!(f, "KorraError: {} ({})", self.describe(), source)
            }
            KorraError::InvalidResult {
                line,
                ref source,
            } => write!(f, "KorraError: {} on line {} ({})", self.describe(), line, source),
            KorraError::InvalidDuration {
                ref value,
                ref detail,
            }
            | KorraError::InvalidBuckets {
                ref value,
                ref detail,
            } => write!(f, "KorraError: {} {:?}: {}", self.describe(), value, detail),
            KorraError::InvalidOption {
                ref option,
                ref value,
                ref detail,
            } => write!(
                f,
                "KorraError: {} {}={:?}: {}",
                self.describe(),
                option,
                value,
                detail
            ),
        }
    }
}

// Define the lower level source of this error, if any.
impl std::error::Error for KorraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            KorraError::Io(ref source) => Some(source),
            KorraError::Json(ref source) => Some(source),
            KorraError::InvalidResult { ref source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Auto-convert IO errors.
impl From<io::Error> for KorraError {
    fn from(err: io::Error) -> KorraError {
        KorraError::Io(err)
    }
}

/// Auto-convert JSON errors.
impl From<serde_json::Error> for KorraError {
    fn from(err: serde_json::Error) -> KorraError {
        KorraError::Json(err)
    }
}
