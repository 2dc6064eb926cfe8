//! The outcome of a single completed request.
//!
//! An [`AttackResult`] is produced by whatever drives the load test, once per
//! request, after the response (or transport error) is in. Korra never changes
//! a result once it has been recorded: every report is derived from a slice of
//! them.

use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::time::Duration;

use crate::{util, KorraError};

/// One completed request.
///
/// Serialized as a JSON object with the latency in integer nanoseconds and the
/// timestamp in RFC 3339, for example:
/// ```json
/// {"timestamp":"2024-01-01T00:00:00Z","latency":20000000,"bytes_in":512,"bytes_out":0,"status_code":200,"error":"","url":"http://localhost/"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    /// When the request was sent.
    pub timestamp: DateTime<Utc>,
    /// How long it took until the response was complete.
    #[serde(with = "util::nanoseconds")]
    pub latency: Duration,
    /// Bytes received from the server.
    #[serde(default)]
    pub bytes_in: u64,
    /// Bytes sent to the server.
    #[serde(default)]
    pub bytes_out: u64,
    /// The HTTP response code, or 0 if no response was received.
    #[serde(default)]
    pub status_code: u16,
    /// The error caused by this request, empty if there was none.
    #[serde(default)]
    pub error: String,
    /// The URL that was requested.
    pub url: String,
}
impl AttackResult {
    /// Record a request to `url` sent now that returned `status_code` after `latency`.
    pub fn new(url: &str, status_code: u16, latency: Duration) -> Self {
        AttackResult {
            timestamp: Utc::now(),
            latency,
            bytes_in: 0,
            bytes_out: 0,
            status_code,
            error: "".to_string(),
            url: url.to_string(),
        }
    }

    /// Set when the request was sent.
    pub fn set_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set how many bytes were received and sent.
    pub fn set_bytes(mut self, bytes_in: u64, bytes_out: u64) -> Self {
        self.bytes_in = bytes_in;
        self.bytes_out = bytes_out;
        self
    }

    /// Record the error caused by this request.
    pub fn set_error(mut self, error: &str) -> Self {
        self.error = error.to_string();
        self
    }

    /// When the response was complete: the timestamp plus the latency.
    pub fn completed(&self) -> DateTime<Utc> {
        match chrono::Duration::from_std(self.latency) {
            Ok(latency) => self.timestamp + latency,
            // Latencies too large for chrono are clamped to the send time.
            Err(_) => self.timestamp,
        }
    }
}

/// Decode newline delimited JSON results, one [`AttackResult`] per line.
///
/// Blank lines are skipped. The first line that fails to decode stops reading
/// and is reported with its line number.
pub fn decode_results<R: BufRead>(reader: R) -> Result<Vec<AttackResult>, KorraError> {
    let mut results = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let result = serde_json::from_str(&line).map_err(|source| KorraError::InvalidResult {
            line: index + 1,
            source,
        })?;
        results.push(result);
    }
    debug!("decoded {} results", results.len());
    Ok(results)
}
