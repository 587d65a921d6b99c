//! Equal-interval classification of one numeric property into color classes.

use crate::models::FeatureCollection;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClassifyError {
    #[error("property `{property}` has no numeric values to classify")]
    NoNumericValues { property: String },
    #[error("at least 2 classes are required, got {0}")]
    TooFewClasses(usize),
    #[error("palette has {colors} colors but {thresholds} thresholds need {}", .thresholds + 1)]
    PaletteMismatch { colors: usize, thresholds: usize },
}

/// N-1 ascending thresholds splitting one property's observed range into N classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakpoints {
    property: String,
    min: f64,
    max: f64,
    thresholds: Vec<f64>,
}

impl Breakpoints {
    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Smallest observed value.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest observed value.
    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn num_classes(&self) -> usize {
        self.thresholds.len() + 1
    }
}

/// Compute `num_classes - 1` equal-interval thresholds for `property` over the whole collection.
///
/// Every class spans the same value width (not the same feature count). Missing and
/// non-numeric values are ignored. When all values are equal, every threshold equals
/// that value.
///
/// ### Errors
/// - `TooFewClasses` when `num_classes < 2`
/// - `NoNumericValues` when no feature has a numeric value for `property`
pub fn compute_thresholds(
    collection: &FeatureCollection,
    property: &str,
    num_classes: usize,
) -> Result<Breakpoints, ClassifyError> {
    if num_classes < 2 {
        return Err(ClassifyError::TooFewClasses(num_classes));
    }
    let mut values = collection.numeric_values(property);
    values.sort_by(f64::total_cmp);
    let (min, max) = match (values.first(), values.last()) {
        (Some(min), Some(max)) => (*min, *max),
        _ => {
            return Err(ClassifyError::NoNumericValues {
                property: property.to_string(),
            });
        }
    };

    let n = num_classes as f64;
    let span = max - min;
    let thresholds = (1..num_classes)
        .map(|i| {
            let t = if span.is_finite() {
                min + span / n * i as f64
            } else {
                // range wider than f64::MAX
                let f = i as f64 / n;
                min * (1.0 - f) + max * f
            };
            t.clamp(min, max)
        })
        .collect();
    log::debug!("classified `{property}` over {} values: min={min} max={max}", values.len());

    Ok(Breakpoints {
        property: property.to_string(),
        min,
        max,
        thresholds,
    })
}
