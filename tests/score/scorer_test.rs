use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};

use kestrel::query::DailySeries;
use kestrel::score::{exceeds_thresholds, score_series, ScoreParams};

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn params(target: NaiveDate, lookback_days: u32) -> ScoreParams {
    ScoreParams {
        target,
        lookback_days,
        threshold_std: 2.0,
        threshold_relative: 1.2,
        threshold_absolute: 50.0,
    }
}

/// Series with baseline [100, 102, 98, 101], an excluded day before the
/// target, and the target itself.
fn spike_series(target: NaiveDate) -> DailySeries {
    let mut series = DailySeries::new();
    series.add(target - Duration::days(5), 100.0);
    series.add(target - Duration::days(4), 102.0);
    series.add(target - Duration::days(3), 98.0);
    series.add(target - Duration::days(2), 101.0);
    series.add(target - Duration::days(1), 120.0);
    series.add(target, 140.0);
    series
}

#[test]
fn test_reference_scenario() {
    let target = day("2024-03-10");
    let result = score_series("ec2", &spike_series(target), &params(target, 4)).unwrap();

    assert_relative_eq!(result.mean, 100.25);
    assert_relative_eq!(result.std, 1.7078, epsilon = 1e-4);
    assert_relative_eq!(result.score, 23.275, epsilon = 1e-3);
    assert_eq!(result.cost, 140.0);
    assert!(result.is_anomaly);
    assert_eq!(result.day, target);
    assert_eq!(result.query, "ec2");
}

#[test]
fn test_two_most_recent_days_excluded_from_baseline() {
    // The 120.0 on target-1 would inflate the baseline if included; the mean
    // staying at 100.25 proves it is dropped.
    let target = day("2024-03-10");
    let result = score_series("ec2", &spike_series(target), &params(target, 4)).unwrap();
    assert_relative_eq!(result.mean, 100.25);
}

#[test]
fn test_scoring_is_idempotent() {
    let target = day("2024-03-10");
    let series = spike_series(target);
    let p = params(target, 4);

    let first = score_series("ec2", &series, &p).unwrap();
    let second = score_series("ec2", &series, &p).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_score_monotone_in_current_cost() {
    let target = day("2024-03-10");
    let p = params(target, 4);

    let mut previous_score = 0.0;
    let mut seen_anomaly = false;
    for cost in [90.0, 100.0, 105.0, 120.0, 200.0, 1000.0] {
        let mut series = spike_series(target);
        // Overwrite the target day by rebuilding the series.
        let mut rebuilt = DailySeries::new();
        for (d, v) in series.iter() {
            if d != target {
                rebuilt.add(d, v);
            }
        }
        rebuilt.add(target, cost);
        series = rebuilt;

        let result = score_series("ec2", &series, &p).unwrap();
        assert!(
            result.score >= previous_score,
            "score decreased: {} -> {} at cost {}",
            previous_score,
            result.score,
            cost
        );
        if seen_anomaly {
            assert!(result.is_anomaly, "anomaly flag dropped at cost {}", cost);
        }
        seen_anomaly = seen_anomaly || result.is_anomaly;
        previous_score = result.score;
    }
    assert!(seen_anomaly);
}

#[test]
fn test_zero_variance_floors_score() {
    let target = day("2024-03-10");
    let mut series = DailySeries::new();
    for offset in 2..=5 {
        series.add(target - Duration::days(offset), 10.0);
    }
    series.add(target - Duration::days(1), 10.0);
    series.add(target, 10.0);

    let result = score_series("flat", &series, &params(target, 4)).unwrap();
    assert_eq!(result.std, 0.0);
    assert_eq!(result.score, 0.0);
    assert!(!result.is_anomaly);
}

#[test]
fn test_all_zero_result_is_suppressed() {
    let target = day("2024-03-10");
    let mut series = DailySeries::new();
    for offset in 0..=5 {
        series.add(target - Duration::days(offset), 0.0);
    }

    assert!(score_series("quiet", &series, &params(target, 4)).is_none());
}

#[test]
fn test_negative_deviation_floors_at_zero() {
    let target = day("2024-03-10");
    let mut series = spike_series(target);
    let mut rebuilt = DailySeries::new();
    for (d, v) in series.iter() {
        if d != target {
            rebuilt.add(d, v);
        }
    }
    rebuilt.add(target, 50.0);
    series = rebuilt;

    let result = score_series("cheap", &series, &params(target, 4)).unwrap();
    assert_eq!(result.score, 0.0);
    assert!(!result.is_anomaly);
}

#[test]
fn test_interior_gaps_interpolated_before_statistics() {
    let target = day("2024-03-10");

    // Baseline days with target-4 missing; its neighbors imply 100.0.
    let mut gapped = DailySeries::new();
    gapped.add(target - Duration::days(5), 98.0);
    gapped.add(target - Duration::days(3), 102.0);
    gapped.add(target - Duration::days(2), 101.0);
    gapped.add(target - Duration::days(1), 120.0);
    gapped.add(target, 140.0);

    let mut filled = gapped.clone();
    filled.add(target - Duration::days(4), 100.0);

    let p = params(target, 4);
    let from_gapped = score_series("ec2", &gapped, &p).unwrap();
    let from_filled = score_series("ec2", &filled, &p).unwrap();

    assert_relative_eq!(from_gapped.mean, from_filled.mean);
    assert_relative_eq!(from_gapped.std, from_filled.std);
    assert_relative_eq!(from_gapped.score, from_filled.score);
}

#[test]
fn test_threshold_table() {
    let target = day("2024-03-10");
    let p = params(target, 4);

    // (cost, mean, std, expected) - each row breaks exactly one condition,
    // the last satisfies all three.
    let table = [
        (103.0, 100.0, 2.0, false), // below mean + 2*std
        (110.0, 100.0, 2.0, false), // below 1.2 * mean
        (40.0, 10.0, 2.0, false),   // below the absolute floor
        (140.0, 100.0, 2.0, true),
    ];
    for (cost, mean, std, expected) in table {
        assert_eq!(
            exceeds_thresholds(cost, mean, std, &p),
            expected,
            "cost={} mean={} std={}",
            cost,
            mean,
            std
        );
    }
}
