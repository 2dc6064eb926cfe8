use chrono::prelude::*;
use gumdrop::Options;
use std::time::Duration;

use korra::result::AttackResult;
use korra::ReportConfiguration;

/// Not all functions are used by all tests, so we enable allow(dead_code) to avoid
/// compiler warnings during testing.

/// When the first request of every generated attack is sent.
#[allow(dead_code)]
pub fn attack_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// Build one result per latency (in milliseconds), sent 100ms apart to `url`.
#[allow(dead_code)]
pub fn build_results(url: &str, status_code: u16, latencies: &[u64]) -> Vec<AttackResult> {
    latencies
        .iter()
        .enumerate()
        .map(|(index, latency)| {
            AttackResult::new(url, status_code, Duration::from_millis(*latency))
                .set_timestamp(attack_start() + chrono::Duration::milliseconds(100 * index as i64))
        })
        .collect()
}

/// A small mixed attack: two successes, one server error and one transport error.
#[allow(dead_code)]
pub fn mixed_results() -> Vec<AttackResult> {
    let start = attack_start();
    vec![
        AttackResult::new("http://localhost/api/users", 200, Duration::from_millis(20))
            .set_timestamp(start)
            .set_bytes(100, 10),
        AttackResult::new("http://localhost/api/items", 200, Duration::from_millis(40))
            .set_timestamp(start + chrono::Duration::seconds(1))
            .set_bytes(300, 10),
        AttackResult::new("http://localhost/", 503, Duration::from_millis(60))
            .set_timestamp(start + chrono::Duration::seconds(2))
            .set_bytes(0, 10),
        AttackResult::new("http://localhost/", 0, Duration::from_millis(80))
            .set_timestamp(start + chrono::Duration::seconds(3))
            .set_error("dial tcp: connection refused"),
    ]
}

/// Parse command line style options into a configuration.
#[allow(dead_code)]
pub fn build_configuration(custom: &[&str]) -> ReportConfiguration {
    ReportConfiguration::parse_args_default(custom)
        .expect("failed to parse options and generate a configuration")
}
