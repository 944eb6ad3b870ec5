use std::collections::HashMap;

use tracing::{debug, instrument, trace, warn};

use super::{scale_score, RiskComponents, RiskConfig, RiskTier, ScoredSupplier};
use crate::data::{mean, GeoRiskRecord, MergedSupplier};

/// Computes composite risk scores for merged supplier profiles.
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    config: RiskConfig,
}

impl RiskScorer {
    pub fn new() -> Self {
        Self::with_config(RiskConfig::default())
    }

    pub fn with_config(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Score every supplier, keeping input order.
    #[instrument(name = "assess", skip_all, fields(suppliers = merged.len()))]
    pub fn score(
        &self,
        merged: Vec<MergedSupplier>,
        geo: &[GeoRiskRecord],
    ) -> Vec<ScoredSupplier> {
        let by_country = country_geo_risk(geo);
        let matched: Vec<Option<f64>> = merged
            .iter()
            .map(|supplier| by_country.get(supplier.country.as_str()).copied())
            .collect();
        let geo_fallback = mean(matched.iter().flatten().copied()).unwrap_or(0.0);
        let unmatched = matched.iter().filter(|geo| geo.is_none()).count();
        if unmatched > 0 {
            debug!(unmatched, geo_fallback, "filled missing geo risk with dataset mean");
        }

        let concentration = normalize_min_max(&fill_missing(
            merged.iter().map(|s| s.concentration_share),
            0.0,
        ));
        let reliability = fill_missing(merged.iter().map(|s| s.reliability_score), 1.0);

        merged
            .into_iter()
            .zip(matched)
            .zip(concentration)
            .zip(reliability)
            .map(|(((supplier, geo_risk), concentration), reliability)| {
                let components = RiskComponents {
                    geo: clamp_unit(geo_risk.unwrap_or(geo_fallback)),
                    transit: clamp_unit(supplier.avg_transit_risk),
                    concentration,
                    reliability: clamp_unit(1.0 - reliability),
                    sanctions: f64::from(supplier.sanctions_risk.min(1)),
                };
                let risk_score = scale_score(components.weighted(&self.config.weights));
                let tier =
                    RiskTier::from_score_with_thresholds(risk_score, &self.config.thresholds);
                trace!(supplier_id = %supplier.supplier_id, risk_score, %tier, "scored supplier");
                ScoredSupplier::new(supplier, components, risk_score, tier)
            })
            .collect()
    }
}

/// Mean of the four sub-risks per country, clamped to `[0, 1]`.
///
/// Countries whose sub-risks are all missing are left out so they fall back to
/// the dataset mean. The first row wins when a country is listed twice.
pub fn country_geo_risk(geo: &[GeoRiskRecord]) -> HashMap<&str, f64> {
    let mut by_country = HashMap::new();
    for record in geo {
        let Some(risk) = record.mean_risk() else {
            continue;
        };
        if by_country.contains_key(record.country.as_str()) {
            warn!(country = %record.country, "duplicate geo risk row ignored");
            continue;
        }
        by_country.insert(record.country.as_str(), clamp_unit(risk));
    }
    by_country
}

/// Min-max scale into `[0, 1]`. A constant column maps to all zeros.
pub fn normalize_min_max(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() || max == min {
        trace!(len = values.len(), "degenerate normalization, mapping to zero");
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / (max - min)).collect()
}

/// Replace missing values with the mean of the present ones, or `fallback` when none are present.
fn fill_missing(values: impl Iterator<Item = Option<f64>> + Clone, fallback: f64) -> Vec<f64> {
    let fill = mean(values.clone().flatten()).unwrap_or(fallback);
    values.map(|v| v.unwrap_or(fill)).collect()
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
