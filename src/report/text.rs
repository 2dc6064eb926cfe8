//! Aligned text report, overall and per URL bucket.
//!
//! # Example
//! ```text
//! OVERALL: 4 results
//! Requests      [total]                  4
//! Duration      [total, attack, wait]    3.25s, 3s, 250ms
//! Latencies     [mean, 50, 95, 99, max]  137.5ms, 100ms, 250ms, 250ms, 250ms
//! Bytes In      [total, mean]            2,048, 512.00
//! Bytes Out     [total, mean]            0, 0.00
//! Success       [ratio]                  50.00%
//! Status Codes  [code:count]             0:1  200:2  503:1
//! Error Set:    1
//! connection refused
//! ```

use itertools::Itertools;
use std::collections::BTreeMap;
use std::io::Write;

use crate::bucket::{BucketCollection, BucketDefinition};
use crate::metrics::{Metrics, SuccessPolicy};
use crate::report::Reporter;
use crate::result::AttackResult;
use crate::{util, KorraError};

/// Writes an `OVERALL` section, one section per bucket definition, and a
/// `Remaining` section for results matching no definition.
#[derive(Debug, Clone, Default)]
pub struct TextReporter {
    definitions: Vec<BucketDefinition>,
    show_urls: bool,
    policy: SuccessPolicy,
}
impl TextReporter {
    pub fn new(definitions: Vec<BucketDefinition>) -> Self {
        TextReporter {
            definitions,
            ..Default::default()
        }
    }

    /// List the URLs seen in each section with how often they were requested.
    pub fn set_show_urls(mut self, show_urls: bool) -> Self {
        self.show_urls = show_urls;
        self
    }

    pub fn set_success_policy(mut self, policy: SuccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn section<W: Write>(
        &self,
        out: &mut W,
        title: &str,
        results: &[AttackResult],
        urls: &BTreeMap<String, usize>,
    ) -> Result<(), KorraError> {
        let metrics = Metrics::with_policy(results, &self.policy);
        writeln!(out, "{}: {} results", title, util::format_number(results.len()))?;
        row(out, "Requests", "[total]", &util::format_number(metrics.requests))?;
        row(
            out,
            "Duration",
            "[total, attack, wait]",
            &format!(
                "{}, {}, {}",
                util::format_duration(metrics.duration + metrics.wait),
                util::format_duration(metrics.duration),
                util::format_duration(metrics.wait)
            ),
        )?;
        let latencies = &metrics.latencies;
        row(
            out,
            "Latencies",
            "[mean, 50, 95, 99, max]",
            &[
                latencies.mean,
                latencies.p50,
                latencies.p95,
                latencies.p99,
                latencies.max,
            ]
            .iter()
            .map(|latency| util::format_duration(*latency))
            .join(", "),
        )?;
        row(
            out,
            "Bytes In",
            "[total, mean]",
            &format!(
                "{}, {:.2}",
                util::format_number(metrics.bytes_in.total),
                metrics.bytes_in.mean
            ),
        )?;
        row(
            out,
            "Bytes Out",
            "[total, mean]",
            &format!(
                "{}, {:.2}",
                util::format_number(metrics.bytes_out.total),
                metrics.bytes_out.mean
            ),
        )?;
        row(
            out,
            "Success",
            "[ratio]",
            &format!("{:.2}%", metrics.success * 100.0),
        )?;
        // BTreeMap keeps status codes in ascending order.
        let codes = metrics
            .status_codes
            .iter()
            .map(|(code, count)| format!("{}:{}", code, count))
            .join("  ");
        row(out, "Status Codes", "[code:count]", &codes)?;

        let errors = match metrics.errors.len() {
            0 => "(empty)".to_string(),
            count => count.to_string(),
        };
        writeln!(out, "{:<14}{}", "Error Set:", errors)?;
        for error in &metrics.errors {
            // One line per error, whatever the error text holds.
            writeln!(out, "{}", error.replace('\r', "\\r").replace('\n', "\\n"))?;
        }

        if self.show_urls {
            writeln!(out, "URLs in bucket:")?;
            for (url, count) in urls {
                writeln!(out, "  {}: {}", url, util::format_number(*count))?;
            }
        }
        Ok(())
    }
}

fn row<W: Write>(out: &mut W, name: &str, columns: &str, values: &str) -> Result<(), KorraError> {
    writeln!(out, "{:<14}{:<25}{}", name, columns, values)?;
    Ok(())
}

impl Reporter for TextReporter {
    fn report(&self, results: &[AttackResult]) -> Result<Vec<u8>, KorraError> {
        let mut out = Vec::new();

        let mut all_urls = BTreeMap::new();
        for result in results {
            *all_urls.entry(result.url.clone()).or_insert(0) += 1;
        }
        self.section(&mut out, "OVERALL", results, &all_urls)?;

        // A fresh collection per report, so reports never accumulate.
        let mut collection = BucketCollection::new(self.definitions.clone())?;
        collection.add_results(results);
        for bucket in collection.buckets() {
            self.section(&mut out, &bucket.label, &bucket.results, &bucket.urls)?;
        }
        if let Some(catch_all) = collection.catch_all_bucket() {
            self.section(
                &mut out,
                BucketCollection::CATCH_ALL,
                &catch_all.results,
                &catch_all.urls,
            )?;
        }

        Ok(out)
    }
}
