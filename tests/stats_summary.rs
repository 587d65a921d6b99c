mod common;

use loadmap_rs::Metric;
use loadmap_rs::stats::{all_summaries, metric_summary, series_summary};
use serde_json::json;

#[test]
fn summary_of_household_mean() {
    let s = metric_summary(&common::ten_regions(), Metric::HouseholdMean);
    assert_eq!(s.count, 10);
    assert_eq!(s.missing, 0);
    assert_eq!(s.min, Some(10.0));
    assert_eq!(s.max, Some(100.0));
    assert_eq!(s.mean, Some(55.0));
    assert_eq!(s.median, Some(55.0));
}

#[test]
fn missing_values_are_counted() {
    let fc = common::values("max", &[json!(2_000_000.0), json!(null), json!("x"), json!(4_000_000.0)]);
    let s = metric_summary(&fc, Metric::Max);
    assert_eq!((s.count, s.missing), (2, 2));
    assert_eq!(s.median, Some(3_000_000.0));
    let shown = s.in_display_units();
    assert!((shown.max.unwrap() - 4.0).abs() < 1e-9);
    assert_eq!(shown.count, 2);
}

#[test]
fn every_metric_is_summarized() {
    let all = all_summaries(&common::ten_regions());
    assert_eq!(all.len(), Metric::ALL.len());
    assert!(all.iter().all(|s| s.count == 10));
}

#[test]
fn series_statistics_skip_nan() {
    let (count, min, max, mean) = series_summary(&[1.0, f64::NAN, 3.0]);
    assert_eq!(count, 2);
    assert_eq!((min, max, mean), (Some(1.0), Some(3.0), Some(2.0)));
    assert_eq!(series_summary(&[]), (0, None, None, None));
}
