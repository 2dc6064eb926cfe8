//! Functions and structures related to configuring a Korra report.
//!
//! Korra can be configured at run time by passing in the options and flags
//! defined by the [`ReportConfiguration`] structure. Every option is validated
//! by [`ReportConfiguration::build_reporter`], before any results are read, so
//! a bad histogram or bucket definition is reported up front.

use gumdrop::Options;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use simplelog::*;
use std::path::PathBuf;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::bucket::BucketDefinition;
use crate::histogram::{BelowFirstBoundary, Histogram};
use crate::metrics::SuccessPolicy;
use crate::report::{histogram::HistogramReporter, json::JsonReporter, text::TextReporter};
use crate::report::Reporter;
use crate::KorraError;

/// The kinds of report Korra can produce.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ReportType {
    /// Aligned text, overall and per bucket.
    #[strum(to_string = "text")]
    Text,
    /// The metrics as a JSON object.
    #[strum(to_string = "json")]
    Json,
    /// A latency histogram.
    #[strum(to_string = "hist", serialize = "histogram")]
    Hist,
}
impl Default for ReportType {
    fn default() -> Self {
        ReportType::Text
    }
}

/// Runtime options available when generating a report.
///
/// Korra leverages [`gumdrop`](https://docs.rs/gumdrop/) to derive help from
/// the below structure.
#[derive(Options, Debug, Clone, Default, Serialize, Deserialize)]
#[options(
    help = r#"Korra turns load test results into reports.

Results are read as newline delimited JSON, one result per line.

The following runtime options are available:"#
)]
pub struct ReportConfiguration {
    /// Displays this help
    #[options(short = "h")]
    pub help: bool,
    /// Prints version information
    #[options(short = "V")]
    pub version: bool,
    /// Reads results from file (default: stdin)
    #[options(short = "i", meta = "NAME")]
    pub input: String,
    /// Sets report type (text, json, hist)
    #[options(short = "r", meta = "TYPE")]
    pub reporter: Option<ReportType>,
    /// Sets histogram buckets (ie [0,100ms,200ms])
    #[options(no_short, meta = "BUCKETS")]
    pub histogram: String,
    /// Leaves latencies below the first histogram bucket out
    #[options(no_short)]
    pub drop_below_first: bool,
    /// Groups URLs into a bucket (LABEL=PREFIX or LABEL=~REGEX)
    #[options(short = "b", meta = "BUCKET")]
    pub bucket: Vec<String>,
    /// Lists the URLs in each bucket
    #[options(no_short)]
    pub show_urls: bool,
    /// Sets successful status codes (default: 200..400)
    #[options(no_short, meta = "RANGE")]
    pub success_codes: String,
    /// Enables Korra log file and sets name
    #[options(short = "G", meta = "NAME")]
    pub log_file: String,
    /// Increases Korra log level (-g, -gg, etc)
    #[options(short = "g", count)]
    pub log_level: u8,
    /// Decreases Korra verbosity (-q, -qq, etc)
    #[options(count, short = "q")]
    pub quiet: u8,
    /// Increases Korra verbosity (-v, -vv, etc)
    #[options(count, short = "v")]
    pub verbose: u8,
}
impl ReportConfiguration {
    /// The configured success range, or the default `200..400`.
    pub fn success_policy(&self) -> Result<SuccessPolicy, KorraError> {
        if self.success_codes.is_empty() {
            Ok(SuccessPolicy::default())
        } else {
            self.success_codes.parse()
        }
    }

    /// The configured histogram, if any.
    pub fn histogram(&self) -> Result<Option<Histogram>, KorraError> {
        if self.histogram.is_empty() {
            return Ok(None);
        }
        let below_first = if self.drop_below_first {
            BelowFirstBoundary::Drop
        } else {
            BelowFirstBoundary::Clamp
        };
        Ok(Some(
            self.histogram
                .parse::<Histogram>()?
                .set_below_first(below_first),
        ))
    }

    /// The configured bucket definitions, in the order they were given.
    pub fn bucket_definitions(&self) -> Result<Vec<BucketDefinition>, KorraError> {
        self.bucket.iter().map(|bucket| bucket.parse()).collect()
    }

    /// Validate every option and build the configured reporter.
    ///
    /// Options that don't apply to the selected report type are still
    /// validated, then ignored with a warning.
    pub fn build_reporter(&self) -> Result<Box<dyn Reporter>, KorraError> {
        let policy = self.success_policy()?;
        let histogram = self.histogram()?;
        let definitions = self.bucket_definitions()?;
        let report_type = self.reporter.unwrap_or_default();
        info!("report type: {}", report_type);
        debug!("available report types: {}", ReportType::iter().join(", "));

        if report_type != ReportType::Hist && histogram.is_some() {
            warn!("--histogram is ignored by the {} reporter", report_type);
        }
        if report_type != ReportType::Text && (!definitions.is_empty() || self.show_urls) {
            warn!(
                "--bucket and --show-urls are ignored by the {} reporter",
                report_type
            );
        }

        let reporter: Box<dyn Reporter> = match report_type {
            ReportType::Text => {
                info!("{} bucket definitions", definitions.len());
                Box::new(
                    TextReporter::new(definitions)
                        .set_show_urls(self.show_urls)
                        .set_success_policy(policy),
                )
            }
            ReportType::Json => Box::new(JsonReporter::new().set_success_policy(policy)),
            ReportType::Hist => match histogram {
                Some(histogram) => {
                    info!("histogram buckets: {}", histogram);
                    Box::new(HistogramReporter::new(histogram))
                }
                None => {
                    return Err(KorraError::InvalidOption {
                        option: "--histogram".to_string(),
                        value: "".to_string(),
                        detail: "the hist reporter requires --histogram buckets".to_string(),
                    })
                }
            },
        };
        Ok(reporter)
    }

    /// Initialize the Korra logger which writes to standard error and, optionally,
    /// to a configurable log file.
    pub fn initialize_logger(&self) {
        // Configure debug output level.
        let debug_level = match self.verbose {
            0 => match self.quiet {
                0 => LevelFilter::Info,
                _ => LevelFilter::Warn,
            },
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        // Configure Korra log level.
        let log_level = match self.log_level {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
        // Reports go to stdout, so console logging goes to stderr.
        loggers.push(TermLogger::new(
            debug_level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));

        // Open the log file if configured.
        let log_file: Option<PathBuf> = if !self.log_file.is_empty() {
            Some(PathBuf::from(&self.log_file))
        // Otherwise disable the log.
        } else {
            None
        };
        if let Some(log_to_file) = log_file.as_ref() {
            match std::fs::File::create(log_to_file) {
                Ok(file) => loggers.push(WriteLogger::new(log_level, Config::default(), file)),
                Err(e) => eprintln!("failed to create log file {}: {}", log_to_file.display(), e),
            }
        }

        match CombinedLogger::init(loggers) {
            Ok(_) => (),
            Err(e) => {
                info!("failed to initialize CombinedLogger: {}", e);
            }
        }
        if let Some(log_to_file) = log_file {
            info!("Writing to log file: {}", log_to_file.display());
        }

        info!("Output verbosity level: {}", debug_level);
        info!("Logfile verbosity level: {}", log_level);
    }
}
