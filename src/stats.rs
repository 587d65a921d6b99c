use crate::metrics::Metric;
use crate::models::FeatureCollection;
use serde::{Deserialize, Serialize};

/// Summary statistics of one metric across all regions, in raw property units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub metric: Metric,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

impl Summary {
    /// Same summary scaled by the metric's display factor.
    pub fn in_display_units(&self) -> Summary {
        let f = self.metric.display_factor();
        Summary {
            min: self.min.map(|v| v * f),
            max: self.max.map(|v| v * f),
            mean: self.mean.map(|v| v * f),
            median: self.median.map(|v| v * f),
            ..self.clone()
        }
    }
}

/// Count, missing, min, max, mean and median of `metric` over the collection.
/// Regions without a numeric value count as missing.
pub fn metric_summary(collection: &FeatureCollection, metric: Metric) -> Summary {
    let mut vals = collection.numeric_values(metric.property());
    let missing = collection.len() - vals.len();
    vals.sort_by(f64::total_cmp);
    let count = vals.len();
    let min = vals.first().copied();
    let max = vals.last().copied();
    let mean = if count > 0 {
        Some(vals.iter().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };
    Summary {
        metric,
        count,
        missing,
        min,
        max,
        mean,
        median,
    }
}

/// Summaries of every metric, in table order.
pub fn all_summaries(collection: &FeatureCollection) -> Vec<Summary> {
    Metric::ALL
        .into_iter()
        .map(|m| metric_summary(collection, m))
        .collect()
}

/// Same statistics for a fetched time series (NaN samples count as missing).
pub fn series_summary(values: &[f64]) -> (usize, Option<f64>, Option<f64>, Option<f64>) {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let min = finite.iter().copied().reduce(f64::min);
    let max = finite.iter().copied().reduce(f64::max);
    let mean = (!finite.is_empty()).then(|| finite.iter().sum::<f64>() / finite.len() as f64);
    (finite.len(), min, max, mean)
}
