use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{default_if_empty, MergedSupplier};

pub mod scorer;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Score thresholds (inclusive upper bounds) that map scores into tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub low_max: f64,
    pub moderate_max: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            low_max: 33.0,
            moderate_max: 66.0,
        }
    }
}

impl TierThresholds {
    pub fn validate(&self) -> Result<(), ThresholdValidationError> {
        if !(self.low_max < self.moderate_max) {
            return Err(ThresholdValidationError::Unordered {
                low_max: self.low_max,
                moderate_max: self.moderate_max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThresholdValidationError {
    #[error("tier threshold low_max ({low_max}) must be below moderate_max ({moderate_max})")]
    Unordered { low_max: f64, moderate_max: f64 },
}

/// Discrete risk bucket derived from a 0–100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// Map a score using the default 33 / 66 thresholds.
    pub fn from_score(score: f64) -> Self {
        Self::from_score_with_thresholds(score, &TierThresholds::default())
    }

    /// Map a score using caller-provided thresholds. Upper bounds are inclusive.
    pub fn from_score_with_thresholds(score: f64, thresholds: &TierThresholds) -> Self {
        if score <= thresholds.low_max {
            Self::Low
        } else if score <= thresholds.moderate_max {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coefficients applied to each risk component. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub geo: f64,
    pub transit: f64,
    pub concentration: f64,
    pub reliability: f64,
    pub sanctions: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            geo: 0.30,
            transit: 0.15,
            concentration: 0.20,
            reliability: 0.15,
            sanctions: 0.20,
        }
    }
}

impl RiskWeights {
    pub fn total(&self) -> f64 {
        self.geo + self.transit + self.concentration + self.reliability + self.sanctions
    }

    pub fn validate(&self) -> Result<(), WeightValidationError> {
        let named = [
            ("geo", self.geo),
            ("transit", self.transit),
            ("concentration", self.concentration),
            ("reliability", self.reliability),
            ("sanctions", self.sanctions),
        ];
        for (component, weight) in named {
            if !(0.0..=1.0).contains(&weight) {
                return Err(WeightValidationError::OutOfRange { component, weight });
            }
        }
        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightValidationError::BadSum { total });
        }
        Ok(())
    }
}

/// Errors emitted while validating scoring weights.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WeightValidationError {
    #[error("weight for `{component}` must be within 0.0..=1.0 (got {weight})")]
    OutOfRange {
        component: &'static str,
        weight: f64,
    },
    #[error("risk weights must sum to 1.0 (got {total})")]
    BadSum { total: f64 },
}

/// The five normalized risk components of one supplier, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskComponents {
    pub geo: f64,
    pub transit: f64,
    pub concentration: f64,
    pub reliability: f64,
    pub sanctions: f64,
}

impl RiskComponents {
    /// Weighted sum in `[0, 1]` when weights are valid.
    pub fn weighted(&self, weights: &RiskWeights) -> f64 {
        self.geo * weights.geo
            + self.transit * weights.transit
            + self.concentration * weights.concentration
            + self.reliability * weights.reliability
            + self.sanctions * weights.sanctions
    }

    pub fn as_array(&self) -> [f64; 5] {
        [
            self.geo,
            self.transit,
            self.concentration,
            self.reliability,
            self.sanctions,
        ]
    }
}

/// Scale a weighted sum to 0–100 and round to one decimal, ties to even.
pub fn scale_score(weighted: f64) -> f64 {
    (weighted * 100.0 * 10.0).round_ties_even() / 10.0
}

/// Tunable configuration for the composite score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub weights: RiskWeights,
    pub thresholds: TierThresholds,
}

/// Supplier with its risk components and composite score; the `risk_scores.csv` schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSupplier {
    pub supplier_id: String,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub ownership_parent: Option<String>,
    #[serde(default)]
    pub reliability_score: Option<f64>,
    #[serde(default)]
    pub concentration_share: Option<f64>,
    #[serde(default, deserialize_with = "default_if_empty")]
    pub sanctions_flag: u8,
    #[serde(default, deserialize_with = "default_if_empty")]
    pub avg_transit_risk: f64,
    #[serde(default, deserialize_with = "default_if_empty")]
    pub sanctions_match: bool,
    pub sanctions_risk: u8,
    pub geo_risk: f64,
    pub concentration_risk: f64,
    pub reliability_risk: f64,
    pub transit_risk: f64,
    pub risk_score: f64,
    pub risk_tier: RiskTier,
}

impl ScoredSupplier {
    pub fn new(
        supplier: MergedSupplier,
        components: RiskComponents,
        risk_score: f64,
        risk_tier: RiskTier,
    ) -> Self {
        Self {
            supplier_id: supplier.supplier_id,
            name: supplier.name,
            country: supplier.country,
            sector: supplier.sector,
            ownership_parent: supplier.ownership_parent,
            reliability_score: supplier.reliability_score,
            concentration_share: supplier.concentration_share,
            sanctions_flag: supplier.sanctions_flag,
            avg_transit_risk: supplier.avg_transit_risk,
            sanctions_match: supplier.sanctions_match,
            sanctions_risk: components.sanctions as u8,
            geo_risk: components.geo,
            concentration_risk: components.concentration,
            reliability_risk: components.reliability,
            transit_risk: components.transit,
            risk_score,
            risk_tier,
        }
    }

    pub fn components(&self) -> RiskComponents {
        RiskComponents {
            geo: self.geo_risk,
            transit: self.transit_risk,
            concentration: self.concentration_risk,
            reliability: self.reliability_risk,
            sanctions: f64::from(self.sanctions_risk),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tier_boundaries_are_inclusive_upper_bounds() {
        assert_eq!(RiskTier::from_score(0.0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(33.0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(33.1), RiskTier::Moderate);
        assert_eq!(RiskTier::from_score(66.0), RiskTier::Moderate);
        assert_eq!(RiskTier::from_score(66.1), RiskTier::High);
        assert_eq!(RiskTier::from_score(100.0), RiskTier::High);
    }

    #[test]
    fn default_weights_sum_to_one() {
        let weights = RiskWeights::default();
        assert!((weights.total() - 1.0).abs() < 1e-9);
        weights.validate().expect("default weights should be valid");
    }

    #[test]
    fn weights_with_bad_sum_are_rejected() {
        let weights = RiskWeights {
            geo: 0.5,
            ..RiskWeights::default()
        };
        let err = weights.validate().expect_err("sum of 1.2 should be rejected");
        assert!(matches!(err, WeightValidationError::BadSum { total } if (total - 1.2).abs() < 1e-9));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let weights = RiskWeights {
            geo: -0.1,
            transit: 0.55,
            ..RiskWeights::default()
        };
        let err = weights.validate().unwrap_err();
        assert!(matches!(
            err,
            WeightValidationError::OutOfRange { component: "geo", .. }
        ));
    }

    #[test]
    fn unordered_thresholds_are_rejected() {
        let thresholds = TierThresholds {
            low_max: 70.0,
            moderate_max: 40.0,
        };
        assert!(thresholds.validate().is_err());
        TierThresholds::default().validate().unwrap();
    }

    #[test]
    fn scale_score_rounds_to_one_decimal() {
        assert_eq!(scale_score(0.0), 0.0);
        assert_eq!(scale_score(1.0), 100.0);
        assert_eq!(scale_score(0.12345), 12.3);
        assert_eq!(scale_score(0.4567), 45.7);
    }

    #[test]
    fn weighted_sum_of_all_ones_is_weight_total() {
        let components = RiskComponents {
            geo: 1.0,
            transit: 1.0,
            concentration: 1.0,
            reliability: 1.0,
            sanctions: 1.0,
        };
        let weights = RiskWeights::default();
        assert!((components.weighted(&weights) - weights.total()).abs() < 1e-12);
        assert_eq!(scale_score(components.weighted(&weights)), 100.0);
    }

    #[test]
    fn tier_displays_capitalized_label() {
        assert_eq!(RiskTier::Moderate.to_string(), "Moderate");
        assert_eq!(
            serde_json::to_string(&RiskTier::High).unwrap(),
            "\"High\""
        );
    }

    #[test]
    fn scored_rows_with_empty_merged_cells_read_as_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("risk_scores.csv");
        std::fs::write(
            &path,
            "supplier_id,name,country,sector,ownership_parent,reliability_score,concentration_share,\
             sanctions_flag,avg_transit_risk,sanctions_match,sanctions_risk,geo_risk,concentration_risk,\
             reliability_risk,transit_risk,risk_score,risk_tier\n\
             S1,Acme,DE,Metals,,0.9,0.2,,,,0,0.3,0.0,0.1,0.0,10.5,Low\n",
        )
        .unwrap();

        let rows: Vec<ScoredSupplier> = crate::data::read_table(&path).unwrap();
        assert_eq!(rows[0].sanctions_flag, 0);
        assert_eq!(rows[0].avg_transit_risk, 0.0);
        assert!(!rows[0].sanctions_match);
        assert_eq!(rows[0].risk_tier, RiskTier::Low);
    }

    proptest! {
        #[test]
        fn tier_is_monotonic_in_score(a in 0.0f64..100.0, b in 0.0f64..100.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let rank = |tier: RiskTier| match tier {
                RiskTier::Low => 0,
                RiskTier::Moderate => 1,
                RiskTier::High => 2,
            };
            prop_assert!(rank(RiskTier::from_score(lo)) <= rank(RiskTier::from_score(hi)));
        }
    }
}
