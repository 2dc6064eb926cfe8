//! Summary statistics computed over a sequence of results.
//!
//! [`Metrics::new`] reduces any slice of [`AttackResult`]s, including an empty
//! one, into a [`Metrics`] snapshot:
//!  - the number of requests, how long the attack lasted and how long it took
//!    for the last response to come back after the last request was sent,
//!  - latency mean, nearest-rank percentiles and maximum,
//!  - total and mean bytes received and sent,
//!  - the ratio of successful requests,
//!  - a tally of status codes and the distinct errors seen.
//!
//! Which requests count as successful is controlled by a [`SuccessPolicy`].

use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::result::AttackResult;
use crate::{util, KorraError};

/// Decides which results count towards the success ratio.
///
/// A result is successful when it has no error and its status code falls in
/// the half-open range `[min_status, max_status)`. The default range is
/// `[200, 400)`, so redirects count as successes. It can be configured with
/// `--success-codes`, for example `200..300` to only accept 2xx responses.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct SuccessPolicy {
    /// Lowest successful status code.
    pub min_status: u16,
    /// First status code past the successful range.
    pub max_status: u16,
}
impl Default for SuccessPolicy {
    fn default() -> Self {
        SuccessPolicy {
            min_status: 200,
            max_status: 400,
        }
    }
}
impl SuccessPolicy {
    /// Returns `true` if the result has no error and an accepted status code.
    pub fn is_success(&self, result: &AttackResult) -> bool {
        result.error.is_empty()
            && result.status_code >= self.min_status
            && result.status_code < self.max_status
    }
}
/// Allow `--success-codes` from the command line as `MIN..MAX`.
impl FromStr for SuccessPolicy {
    type Err = KorraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |detail: &str| KorraError::InvalidOption {
            option: "--success-codes".to_string(),
            value: s.to_string(),
            detail: detail.to_string(),
        };
        let mut bounds = s.trim().splitn(2, "..");
        let min_status = bounds
            .next()
            .unwrap_or_default()
            .trim()
            .parse::<u16>()
            .map_err(|_| invalid("expected MIN..MAX, for example 200..400"))?;
        let max_status = bounds
            .next()
            .ok_or_else(|| invalid("expected MIN..MAX, for example 200..400"))?
            .trim()
            .parse::<u16>()
            .map_err(|_| invalid("expected MIN..MAX, for example 200..400"))?;
        if min_status >= max_status {
            return Err(invalid("MIN must be lower than MAX"));
        }
        Ok(SuccessPolicy {
            min_status,
            max_status,
        })
    }
}
impl fmt::Display for SuccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.min_status, self.max_status)
    }
}

/// Latency statistics. All values are zero when there are no results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// Sum of all latencies.
    #[serde(with = "util::nanoseconds")]
    pub total: Duration,
    /// Arithmetic mean.
    #[serde(with = "util::nanoseconds")]
    pub mean: Duration,
    /// 50th percentile (nearest rank).
    #[serde(rename = "50th", with = "util::nanoseconds")]
    pub p50: Duration,
    /// 95th percentile (nearest rank).
    #[serde(rename = "95th", with = "util::nanoseconds")]
    pub p95: Duration,
    /// 99th percentile (nearest rank).
    #[serde(rename = "99th", with = "util::nanoseconds")]
    pub p99: Duration,
    /// Slowest latency.
    #[serde(with = "util::nanoseconds")]
    pub max: Duration,
}

/// Byte statistics for one direction of traffic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ByteMetrics {
    /// Sum over all requests.
    pub total: u64,
    /// Total divided by the number of requests, 0 if there were none.
    pub mean: f64,
}
impl ByteMetrics {
    fn new(total: u64, requests: usize) -> Self {
        let mean = match requests {
            0 => 0.0,
            _ => total as f64 / requests as f64,
        };
        ByteMetrics { total, mean }
    }
}

/// Aggregate statistics over a sequence of results.
///
/// Built fresh for every report and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub latencies: LatencyMetrics,
    pub bytes_in: ByteMetrics,
    pub bytes_out: ByteMetrics,
    /// When the first request was sent.
    pub earliest: Option<DateTime<Utc>>,
    /// When the last request was sent.
    pub latest: Option<DateTime<Utc>>,
    /// When the last response was complete.
    pub end: Option<DateTime<Utc>>,
    /// Time between the first and the last request being sent.
    #[serde(with = "util::nanoseconds")]
    pub duration: Duration,
    /// Time between the last request being sent and the last response completing.
    #[serde(with = "util::nanoseconds")]
    pub wait: Duration,
    /// Number of results.
    pub requests: usize,
    /// Ratio of successful results, between 0 and 1.
    pub success: f64,
    /// How often each status code was returned.
    pub status_codes: BTreeMap<u16, usize>,
    /// Distinct errors, in the order they were first seen.
    pub errors: Vec<String>,
}
impl Metrics {
    /// Compute metrics with the default [`SuccessPolicy`].
    pub fn new(results: &[AttackResult]) -> Self {
        Metrics::with_policy(results, &SuccessPolicy::default())
    }

    /// Compute metrics, classifying successful results with `policy`.
    pub fn with_policy(results: &[AttackResult], policy: &SuccessPolicy) -> Self {
        let requests = results.len();
        let mut metrics = Metrics {
            requests,
            ..Default::default()
        };
        if requests == 0 {
            debug!("no results, all metrics are zero");
            return metrics;
        }

        let mut latencies: Vec<Duration> = Vec::with_capacity(requests);
        let mut total_latency: u128 = 0;
        let mut bytes_in: u64 = 0;
        let mut bytes_out: u64 = 0;
        let mut successes: usize = 0;
        let mut seen_errors: HashSet<&str> = HashSet::new();
        for result in results {
            latencies.push(result.latency);
            total_latency += result.latency.as_nanos();
            bytes_in = bytes_in.saturating_add(result.bytes_in);
            bytes_out = bytes_out.saturating_add(result.bytes_out);
            if policy.is_success(result) {
                successes += 1;
            }
            *metrics.status_codes.entry(result.status_code).or_insert(0) += 1;
            if !result.error.is_empty() && seen_errors.insert(result.error.as_str()) {
                metrics.errors.push(result.error.clone());
            }

            metrics.earliest = Some(match metrics.earliest {
                Some(earliest) if earliest <= result.timestamp => earliest,
                _ => result.timestamp,
            });
            metrics.latest = Some(match metrics.latest {
                Some(latest) if latest >= result.timestamp => latest,
                _ => result.timestamp,
            });
            let completed = result.completed();
            metrics.end = Some(match metrics.end {
                Some(end) if end >= completed => end,
                _ => completed,
            });
        }

        if let (Some(earliest), Some(latest), Some(end)) =
            (metrics.earliest, metrics.latest, metrics.end)
        {
            metrics.duration = (latest - earliest).to_std().unwrap_or_default();
            metrics.wait = (end - latest).to_std().unwrap_or_default();
        }

        latencies.sort_unstable();
        let mean = total_latency / requests as u128;
        metrics.latencies = LatencyMetrics {
            total: Duration::from_nanos(total_latency.min(u128::from(u64::MAX)) as u64),
            mean: Duration::from_nanos(mean as u64),
            p50: percentile(&latencies, 50),
            p95: percentile(&latencies, 95),
            p99: percentile(&latencies, 99),
            max: latencies[requests - 1],
        };
        metrics.bytes_in = ByteMetrics::new(bytes_in, requests);
        metrics.bytes_out = ByteMetrics::new(bytes_out, requests);
        metrics.success = successes as f64 / requests as f64;

        debug!(
            "{} requests, {} successful, {} status codes, {} distinct errors",
            requests,
            successes,
            metrics.status_codes.len(),
            metrics.errors.len()
        );
        metrics
    }
}

/// Nearest-rank percentile of an ascending slice of latencies.
///
/// The rank is `ceil(percent / 100 × n)`, computed in integers, and the returned
/// value is the element at that 1-based rank, clamped to the slice. An empty
/// slice returns zero.
pub fn percentile(sorted: &[Duration], percent: usize) -> Duration {
    if sorted.is_empty() {
        return Duration::from_nanos(0);
    }
    let rank = (percent * sorted.len() + 99) / 100;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    trace!(
        "percentile: {}, element {} of {}",
        percent,
        index + 1,
        sorted.len()
    );
    sorted[index]
}
