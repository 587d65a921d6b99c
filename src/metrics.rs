//! Fixed table of load metrics: property key, display label, unit and display factor.
//!
//! Profiles are sampled once per minute, so summing samples in watts yields
//! watt-minutes. `MINUTE_SAMPLES_TO_HOURS` turns those into watt-hours; powers of ten then
//! pick the display unit (W, kW, MW).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Watt-minutes → watt-hours.
pub const MINUTE_SAMPLES_TO_HOURS: f64 = 1.0 / 60.0;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown metric `{0}` (expected one of: max, mean, sum, hh_max, hh_mean, hh_sum, hh_num, cluster)")]
pub struct UnknownMetric(pub String);

/// A per-region quantity that can drive the choropleth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[default]
    #[serde(rename = "max")]
    Max,
    #[serde(rename = "mean")]
    Mean,
    #[serde(rename = "sum")]
    Sum,
    #[serde(rename = "hh_max")]
    HouseholdMax,
    #[serde(rename = "hh_mean")]
    HouseholdMean,
    #[serde(rename = "hh_sum")]
    HouseholdSum,
    #[serde(rename = "hh_num", alias = "num_hh")]
    HouseholdCount,
    #[serde(rename = "cluster")]
    Cluster,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Max,
        Metric::Mean,
        Metric::Sum,
        Metric::HouseholdMax,
        Metric::HouseholdMean,
        Metric::HouseholdSum,
        Metric::HouseholdCount,
        Metric::Cluster,
    ];

    /// Selector key used by buttons, CLI flags and config files.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Max => "max",
            Metric::Mean => "mean",
            Metric::Sum => "sum",
            Metric::HouseholdMax => "hh_max",
            Metric::HouseholdMean => "hh_mean",
            Metric::HouseholdSum => "hh_sum",
            Metric::HouseholdCount => "hh_num",
            Metric::Cluster => "cluster",
        }
    }

    /// Feature property holding the raw value.
    pub fn property(self) -> &'static str {
        match self {
            // the layer files store the household count as `num_hh`
            Metric::HouseholdCount => "num_hh",
            other => other.key(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Max => "Peak max",
            Metric::Mean => "Mean",
            Metric::Sum => "Aggregated",
            Metric::HouseholdMax => "Household Peak",
            Metric::HouseholdMean => "Household Mean",
            Metric::HouseholdSum => "Household Agg.",
            Metric::HouseholdCount => "Household Number",
            Metric::Cluster => "ML Cluster",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Max | Metric::Mean => "MW",
            Metric::Sum => "MWh/year",
            Metric::HouseholdMax | Metric::HouseholdMean => "W",
            Metric::HouseholdSum => "kWh/year",
            Metric::HouseholdCount | Metric::Cluster => "",
        }
    }

    /// Multiplier from the raw property value to the displayed unit.
    pub fn display_factor(self) -> f64 {
        match self {
            Metric::Max | Metric::Mean => 1e-6,
            Metric::Sum => MINUTE_SAMPLES_TO_HOURS * 1e-6,
            Metric::HouseholdSum => MINUTE_SAMPLES_TO_HOURS * 1e-3,
            Metric::HouseholdMax
            | Metric::HouseholdMean
            | Metric::HouseholdCount
            | Metric::Cluster => 1.0,
        }
    }

    /// `"Peak max (MW)"`, or the bare label for unitless metrics.
    pub fn legend_title(self) -> String {
        match self.unit() {
            "" => self.label().to_string(),
            unit => format!("{} ({})", self.label(), unit),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "num_hh" {
            return Ok(Metric::HouseholdCount);
        }
        Metric::ALL
            .into_iter()
            .find(|m| m.key() == wanted)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for m in Metric::ALL {
            assert_eq!(m.key().parse::<Metric>().unwrap(), m);
        }
        assert_eq!("NUM_HH".parse::<Metric>().unwrap(), Metric::HouseholdCount);
        assert!("peak".parse::<Metric>().is_err());
    }

    #[test]
    fn household_count_reads_num_hh() {
        assert_eq!(Metric::HouseholdCount.key(), "hh_num");
        assert_eq!(Metric::HouseholdCount.property(), "num_hh");
        assert_eq!(Metric::HouseholdCount.legend_title(), "Household Number");
        assert_eq!(Metric::Sum.legend_title(), "Aggregated (MWh/year)");
    }
}
