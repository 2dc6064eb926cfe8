use std::time::Duration;

use korra::histogram::{BelowFirstBoundary, Histogram};
use korra::KorraError;

mod common;

#[test]
fn below_first_boundary() {
    let results = common::build_results("http://localhost/", 200, &[50, 150, 250]);

    let histogram: Histogram = "[100ms,200ms]".parse().unwrap();
    assert_eq!(histogram.below_first(), BelowFirstBoundary::Clamp);
    assert_eq!(histogram.counts(&results), vec![2, 1]);

    let histogram = histogram.set_below_first(BelowFirstBoundary::Drop);
    assert_eq!(histogram.counts(&results), vec![1, 1]);

    // With a zero boundary nothing is ever below the first bucket.
    let histogram: Histogram = "[0,100ms,200ms]".parse().unwrap();
    assert_eq!(histogram.counts(&results), vec![1, 1, 1]);
    let histogram = histogram.set_below_first(BelowFirstBoundary::Drop);
    assert_eq!(histogram.counts(&results), vec![1, 1, 1]);
}

#[test]
fn counts_add_up() {
    let latencies: Vec<u64> = (0..500).map(|i| (i * 7) % 400).collect();
    let results = common::build_results("http://localhost/", 200, &latencies);

    let histogram: Histogram = "[50ms,100ms,250ms]".parse().unwrap();
    let counts = histogram.counts(&results);
    assert_eq!(counts.len(), histogram.boundaries().len());
    assert_eq!(counts.iter().sum::<usize>(), results.len());

    let below = latencies.iter().filter(|latency| **latency < 50).count();
    let histogram = histogram.set_below_first(BelowFirstBoundary::Drop);
    let counts = histogram.counts(&results);
    assert!(below > 0);
    assert_eq!(counts.iter().sum::<usize>(), results.len() - below);
}

#[test]
fn boundaries_are_inclusive_below() {
    let histogram = Histogram::new(vec![
        Duration::from_millis(100),
        Duration::from_millis(200),
    ])
    .unwrap();
    assert_eq!(histogram.bucket(Duration::from_millis(100)), Some(0));
    assert_eq!(
        histogram.bucket(Duration::from_millis(200) - Duration::from_nanos(1)),
        Some(0)
    );
    assert_eq!(histogram.bucket(Duration::from_millis(200)), Some(1));
    assert_eq!(histogram.bucket(Duration::from_secs(3_600)), Some(1));
}

#[test]
fn invalid_boundaries() {
    assert!(matches!(
        Histogram::new(vec![]),
        Err(KorraError::InvalidBuckets { .. })
    ));
    assert!(matches!(
        Histogram::new(vec![Duration::from_millis(5), Duration::from_millis(5)]),
        Err(KorraError::InvalidBuckets { .. })
    ));
    assert!(matches!(
        "[1s,500ms]".parse::<Histogram>(),
        Err(KorraError::InvalidBuckets { .. })
    ));
    assert!(matches!(
        "[1s,fast]".parse::<Histogram>(),
        Err(KorraError::InvalidDuration { .. })
    ));
}

#[test]
fn configured_histogram() {
    let configuration = common::build_configuration(&[
        "--reporter",
        "hist",
        "--histogram",
        "[0,1.5s,1m]",
    ]);
    let histogram = configuration.histogram().unwrap().unwrap();
    assert_eq!(
        histogram.boundaries(),
        &[
            Duration::from_secs(0),
            Duration::from_millis(1_500),
            Duration::from_secs(60)
        ]
    );
    assert_eq!(histogram.to_string(), "[0s,1.5s,1m0s]");
    assert_eq!(histogram.label(1), "[1.5s, 1m0s]");
    assert_eq!(histogram.label(2), "[1m0s, +Inf]");
}
