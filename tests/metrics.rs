use std::time::Duration;

use korra::metrics::{Metrics, SuccessPolicy};
use korra::result::AttackResult;

mod common;

#[test]
fn empty_results() {
    let metrics = Metrics::new(&[]);
    assert_eq!(metrics.requests, 0);
    assert_eq!(metrics.duration, Duration::from_nanos(0));
    assert_eq!(metrics.wait, Duration::from_nanos(0));
    assert_eq!(metrics.latencies.mean, Duration::from_nanos(0));
    assert_eq!(metrics.latencies.p50, Duration::from_nanos(0));
    assert_eq!(metrics.latencies.p99, Duration::from_nanos(0));
    assert_eq!(metrics.latencies.max, Duration::from_nanos(0));
    assert_eq!(metrics.bytes_in.total, 0);
    assert_eq!(metrics.bytes_in.mean, 0.0);
    assert_eq!(metrics.bytes_out.mean, 0.0);
    assert!(!metrics.success.is_nan());
    assert_eq!(metrics.success, 0.0);
    assert!(metrics.status_codes.is_empty());
    assert!(metrics.errors.is_empty());
    assert!(metrics.earliest.is_none());
}

#[test]
fn mixed_status_codes() {
    let metrics = Metrics::new(&common::mixed_results());
    assert_eq!(metrics.requests, 4);
    assert!((metrics.success - 0.5).abs() < f64::EPSILON);
    assert_eq!(metrics.status_codes.len(), 3);
    assert_eq!(metrics.status_codes[&200], 2);
    assert_eq!(metrics.status_codes[&503], 1);
    assert_eq!(metrics.status_codes[&0], 1);
    assert_eq!(metrics.errors, vec!["dial tcp: connection refused".to_string()]);
}

#[test]
fn requests_match_results() {
    for count in &[0, 1, 2, 17, 100] {
        let latencies: Vec<u64> = (0..*count).collect();
        let results = common::build_results("http://localhost/", 200, &latencies);
        assert_eq!(Metrics::new(&results).requests, results.len());
    }
}

#[test]
fn durations() {
    let metrics = Metrics::new(&common::mixed_results());
    // First request at 0s, last at 3s, and it took 80ms to come back.
    assert_eq!(metrics.duration, Duration::from_secs(3));
    assert_eq!(metrics.wait, Duration::from_millis(80));
    assert_eq!(metrics.earliest, Some(common::attack_start()));
    assert_eq!(
        metrics.end,
        Some(common::attack_start() + chrono::Duration::milliseconds(3_080))
    );

    // A single result has no duration, only wait.
    let metrics = Metrics::new(&common::build_results("http://localhost/", 200, &[250]));
    assert_eq!(metrics.duration, Duration::from_nanos(0));
    assert_eq!(metrics.wait, Duration::from_millis(250));
}

#[test]
fn wait_follows_the_slowest_response() {
    // The second to last request finishes after the last one.
    let mut results = common::build_results("http://localhost/", 200, &[10, 500, 10]);
    results.reverse();
    let metrics = Metrics::new(&results);
    // Sent at 0ms, 100ms and 200ms; the 500ms request completes at 600ms.
    assert_eq!(metrics.duration, Duration::from_millis(200));
    assert_eq!(metrics.wait, Duration::from_millis(400));
}

#[test]
fn order_does_not_matter() {
    let results = common::mixed_results();
    let mut reversed = results.clone();
    reversed.reverse();
    let forward = Metrics::new(&results);
    let backward = Metrics::new(&reversed);
    assert_eq!(forward.latencies, backward.latencies);
    assert_eq!(forward.duration, backward.duration);
    assert_eq!(forward.wait, backward.wait);
    assert_eq!(forward.status_codes, backward.status_codes);
    assert_eq!(forward.success, backward.success);
}

#[test]
fn latencies() {
    let latencies: Vec<u64> = (1..=100).rev().collect();
    let metrics = Metrics::new(&common::build_results("http://localhost/", 200, &latencies));
    assert_eq!(metrics.latencies.total, Duration::from_millis(5_050));
    assert_eq!(metrics.latencies.mean, Duration::from_micros(50_500));
    assert_eq!(metrics.latencies.p50, Duration::from_millis(50));
    assert_eq!(metrics.latencies.p95, Duration::from_millis(95));
    assert_eq!(metrics.latencies.p99, Duration::from_millis(99));
    assert_eq!(metrics.latencies.max, Duration::from_millis(100));
}

#[test]
fn bytes() {
    let metrics = Metrics::new(&common::mixed_results());
    assert_eq!(metrics.bytes_in.total, 400);
    assert!((metrics.bytes_in.mean - 100.0).abs() < f64::EPSILON);
    assert_eq!(metrics.bytes_out.total, 30);
    assert!((metrics.bytes_out.mean - 7.5).abs() < f64::EPSILON);
}

#[test]
fn success_ratio_bounds() {
    let all_ok = common::build_results("http://localhost/", 200, &[1, 2, 3]);
    assert!((Metrics::new(&all_ok).success - 1.0).abs() < f64::EPSILON);

    let all_failed = common::build_results("http://localhost/", 500, &[1, 2, 3]);
    assert_eq!(Metrics::new(&all_failed).success, 0.0);

    let metrics = Metrics::new(&common::mixed_results());
    assert!(metrics.success >= 0.0 && metrics.success <= 1.0);
}

#[test]
fn success_ranges() {
    let mut results = common::build_results("http://localhost/", 200, &[1, 2]);
    results.extend(common::build_results("http://localhost/", 301, &[1, 2]));

    // Redirects are successful by default.
    let metrics = Metrics::new(&results);
    assert!((metrics.success - 1.0).abs() < f64::EPSILON);

    // But not when only 2xx responses are accepted.
    let strict: SuccessPolicy = "200..300".parse().unwrap();
    let metrics = Metrics::with_policy(&results, &strict);
    assert!((metrics.success - 0.5).abs() < f64::EPSILON);
}

#[test]
fn errors_are_deduplicated_in_first_seen_order() {
    let results = vec![
        AttackResult::new("/", 0, Duration::from_millis(1)).set_error("timeout"),
        AttackResult::new("/", 0, Duration::from_millis(1)).set_error("refused"),
        AttackResult::new("/", 0, Duration::from_millis(1)).set_error("timeout"),
        AttackResult::new("/", 200, Duration::from_millis(1)),
    ];
    let metrics = Metrics::new(&results);
    assert_eq!(metrics.errors, vec!["timeout".to_string(), "refused".to_string()]);
    assert_eq!(metrics.status_codes[&0], 3);
}

#[test]
fn json_round_trip() {
    let metrics = Metrics::new(&common::mixed_results());
    let encoded = serde_json::to_string(&metrics).unwrap();
    let decoded: Metrics = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded.requests, metrics.requests);
    assert_eq!(decoded.latencies, metrics.latencies);
    assert_eq!(decoded.duration, metrics.duration);
    assert_eq!(decoded.wait, metrics.wait);
    assert_eq!(decoded.bytes_in.total, metrics.bytes_in.total);
    assert!((decoded.bytes_in.mean - metrics.bytes_in.mean).abs() < f64::EPSILON);
    assert!((decoded.success - metrics.success).abs() < f64::EPSILON);
    assert_eq!(decoded.status_codes, metrics.status_codes);
    assert_eq!(decoded.errors, metrics.errors);
    assert_eq!(decoded.earliest, metrics.earliest);
    assert_eq!(decoded.end, metrics.end);

    let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(value["duration"], 3_000_000_000_u64);
    assert_eq!(value["latencies"]["max"], 80_000_000);
}
