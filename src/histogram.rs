//! Latency histograms over user defined duration boundaries.
//!
//! A [`Histogram`] is configured with an ascending list of boundaries, for
//! example `[0,100ms,200ms,500ms]`, which defines the buckets:
//! ```text
//! [0,      100ms]
//! [100ms,  200ms]
//! [200ms,  500ms]
//! [500ms,  +Inf]
//! ```
//! Each bucket includes its lower boundary and excludes its upper boundary.
//!
//! Latencies below the first boundary have no bucket of their own: the
//! [`BelowFirstBoundary`] policy decides whether they are counted in the first
//! bucket (the default) or left out entirely.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::result::AttackResult;
use crate::{util, KorraError};

/// What to do with latencies lower than the first boundary.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum BelowFirstBoundary {
    /// Count them in the first bucket (default).
    Clamp,
    /// Leave them out of the histogram.
    Drop,
}
impl Default for BelowFirstBoundary {
    fn default() -> Self {
        BelowFirstBoundary::Clamp
    }
}

/// Ascending latency boundaries and the policy for latencies below the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    boundaries: Vec<Duration>,
    below_first: BelowFirstBoundary,
}
impl Histogram {
    /// Build a histogram, validating that `boundaries` is non-empty and
    /// strictly increasing.
    pub fn new(boundaries: Vec<Duration>) -> Result<Self, KorraError> {
        if boundaries.is_empty() {
            return Err(KorraError::InvalidBuckets {
                value: "[]".to_string(),
                detail: "at least one boundary is required".to_string(),
            });
        }
        if let Some(pair) = boundaries.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(KorraError::InvalidBuckets {
                value: render(&boundaries),
                detail: format!(
                    "boundaries must be strictly increasing, {} is followed by {}",
                    util::format_duration(pair[0]),
                    util::format_duration(pair[1])
                ),
            });
        }
        Ok(Histogram {
            boundaries,
            below_first: BelowFirstBoundary::default(),
        })
    }

    /// Change what happens to latencies below the first boundary.
    pub fn set_below_first(mut self, below_first: BelowFirstBoundary) -> Self {
        self.below_first = below_first;
        self
    }

    pub fn boundaries(&self) -> &[Duration] {
        &self.boundaries
    }

    pub fn below_first(&self) -> BelowFirstBoundary {
        self.below_first
    }

    /// Index of the bucket a latency falls into, if any.
    pub fn bucket(&self, latency: Duration) -> Option<usize> {
        // Number of boundaries at or below the latency.
        let at_or_below = self.boundaries.partition_point(|boundary| *boundary <= latency);
        match at_or_below {
            0 => match self.below_first {
                BelowFirstBoundary::Clamp => Some(0),
                BelowFirstBoundary::Drop => None,
            },
            n => Some(n - 1),
        }
    }

    /// Count results per bucket, one count per boundary in boundary order.
    pub fn counts(&self, results: &[AttackResult]) -> Vec<usize> {
        let mut counts = vec![0; self.boundaries.len()];
        let mut dropped = 0;
        for result in results {
            match self.bucket(result.latency) {
                Some(index) => counts[index] += 1,
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(
                "{} of {} results are below the first histogram boundary",
                dropped,
                results.len()
            );
        }
        counts
    }

    /// Human readable label of a bucket, `[low, high]` or `[low, +Inf]` for the last.
    pub fn label(&self, index: usize) -> String {
        let low = util::format_duration(self.boundaries[index]);
        match self.boundaries.get(index + 1) {
            Some(high) => format!("[{}, {}]", low, util::format_duration(*high)),
            None => format!("[{}, +Inf]", low),
        }
    }
}

fn render(boundaries: &[Duration]) -> String {
    format!(
        "[{}]",
        boundaries
            .iter()
            .map(|boundary| util::format_duration(*boundary))
            .join(",")
    )
}

/// Parse a comma separated list of duration literals, such as `[100ms,200ms,300ms]`.
///
/// The surrounding brackets are optional.
impl FromStr for Histogram {
    type Err = KorraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed.strip_prefix('[').unwrap_or(trimmed);
        let inner = inner.strip_suffix(']').unwrap_or(inner);
        if inner.trim().is_empty() {
            return Err(KorraError::InvalidBuckets {
                value: s.to_string(),
                detail: "at least one boundary is required".to_string(),
            });
        }
        let boundaries = inner
            .split(',')
            .map(util::parse_duration)
            .collect::<Result<Vec<Duration>, KorraError>>()?;
        Histogram::new(boundaries)
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&render(&self.boundaries))
    }
}
