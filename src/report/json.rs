//! JSON encoded [`Metrics`].
//!
//! Durations are integer nanoseconds, timestamps RFC 3339 and status codes
//! object keys, for example:
//! ```json
//! {"latencies":{"total":550000000,"mean":137500000,"50th":100000000,"95th":250000000,"99th":250000000,"max":250000000},
//!  "bytes_in":{"total":2048,"mean":512.0},"bytes_out":{"total":0,"mean":0.0},
//!  "earliest":"2024-01-01T00:00:00Z","latest":"2024-01-01T00:00:03Z","end":"2024-01-01T00:00:03.250Z",
//!  "duration":3000000000,"wait":250000000,"requests":4,"success":0.5,
//!  "status_codes":{"0":1,"200":2,"503":1},"errors":["connection refused"]}
//! ```

use crate::metrics::{Metrics, SuccessPolicy};
use crate::report::Reporter;
use crate::result::AttackResult;
use crate::KorraError;

/// Serializes the [`Metrics`] of all results as a single JSON object on one line.
#[derive(Debug, Clone, Default)]
pub struct JsonReporter {
    policy: SuccessPolicy,
}
impl JsonReporter {
    pub fn new() -> Self {
        JsonReporter::default()
    }

    pub fn set_success_policy(mut self, policy: SuccessPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Reporter for JsonReporter {
    fn report(&self, results: &[AttackResult]) -> Result<Vec<u8>, KorraError> {
        let metrics = Metrics::with_policy(results, &self.policy);
        let mut report = serde_json::to_vec(&metrics)?;
        report.push(b'\n');
        Ok(report)
    }
}
