use std::{cmp::Ordering, fmt::Write};

use serde::Serialize;

use crate::assess::{RiskTier, ScoredSupplier};

pub const BRIEF_TITLE: &str = "# Supply-Chain & Geoeconomic Threat Assessment Brief";

const RECOMMENDATIONS: [&str; 4] = [
    "Validate supplier ownership chains against the latest corporate registries.",
    "Cross-check shipping choke points and contingency routing options.",
    "Build diversification scenarios for high concentration suppliers.",
    "Monitor sanctions and regulatory changes monthly.",
];

/// Format styles supported for the brief.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

/// Number of suppliers in each tier. Absent tiers count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
}

impl TierCounts {
    pub fn tally(scores: &[ScoredSupplier]) -> Self {
        scores.iter().fold(Self::default(), |mut counts, row| {
            match row.risk_tier {
                RiskTier::High => counts.high += 1,
                RiskTier::Moderate => counts.moderate += 1,
                RiskTier::Low => counts.low += 1,
            }
            counts
        })
    }
}

/// Data behind the brief, independent of output format.
#[derive(Debug, Serialize)]
pub struct BriefSummary<'a> {
    pub total_suppliers: usize,
    pub tier_counts: TierCounts,
    pub hotspots: Vec<&'a ScoredSupplier>,
}

impl<'a> BriefSummary<'a> {
    pub fn new(scores: &'a [ScoredSupplier], top_n: usize) -> Self {
        Self {
            total_suppliers: scores.len(),
            tier_counts: TierCounts::tally(scores),
            hotspots: top_risks(scores, top_n),
        }
    }
}

/// Highest `risk_score` first; equal scores keep their input order.
pub fn top_risks(scores: &[ScoredSupplier], n: usize) -> Vec<&ScoredSupplier> {
    let mut ranked: Vec<_> = scores.iter().collect();
    ranked.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

/// Produce the brief from scored suppliers using the desired format.
pub fn render_brief(
    scores: &[ScoredSupplier],
    top_n: usize,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let summary = BriefSummary::new(scores, top_n);
    match format {
        OutputFormat::Markdown => render_markdown(&summary),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&summary)?),
    }
}

fn render_markdown(summary: &BriefSummary<'_>) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "{BRIEF_TITLE}")?;
    writeln!(out)?;
    writeln!(out, "## Executive summary")?;
    writeln!(out)?;
    writeln!(out, "* Total suppliers assessed: {}", summary.total_suppliers)?;
    writeln!(out, "* High risk suppliers: {}", summary.tier_counts.high)?;
    writeln!(out, "* Moderate risk suppliers: {}", summary.tier_counts.moderate)?;
    writeln!(out, "* Low risk suppliers: {}", summary.tier_counts.low)?;
    writeln!(out)?;
    writeln!(out, "## Top risk hotspots")?;
    for row in &summary.hotspots {
        writeln!(
            out,
            "* **{name}** ({country}, {sector}) - Risk score {score:.1} ({tier})",
            name = row.name,
            country = row.country,
            sector = row.sector,
            score = row.risk_score,
            tier = row.risk_tier,
        )?;
        writeln!(
            out,
            "  * Key factors: Geo risk {geo:.2}, Transit {transit:.2}, Concentration {conc:.2}, Sanctions {sanctions}",
            geo = row.geo_risk,
            transit = row.transit_risk,
            conc = row.concentration_risk,
            sanctions = row.sanctions_risk,
        )?;
    }
    writeln!(out)?;
    writeln!(out, "## Recommended follow-up")?;
    writeln!(out)?;
    for item in RECOMMENDATIONS {
        writeln!(out, "* {item}")?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: &str, score: f64) -> ScoredSupplier {
        ScoredSupplier {
            supplier_id: id.into(),
            name: format!("Supplier {id}"),
            country: "DE".into(),
            sector: "Metals".into(),
            ownership_parent: None,
            reliability_score: Some(0.9),
            concentration_share: Some(0.1),
            sanctions_flag: 0,
            avg_transit_risk: 0.2,
            sanctions_match: false,
            sanctions_risk: 0,
            geo_risk: 0.25,
            concentration_risk: 0.0,
            reliability_risk: 0.1,
            transit_risk: 0.2,
            risk_score: score,
            risk_tier: RiskTier::from_score(score),
        }
    }

    #[test]
    fn top_risks_sorts_descending_with_stable_ties() {
        let scores = vec![
            scored("A", 20.0),
            scored("B", 70.0),
            scored("C", 45.0),
            scored("D", 70.0),
        ];
        let ids: Vec<_> = top_risks(&scores, 3)
            .into_iter()
            .map(|row| row.supplier_id.as_str())
            .collect();
        assert_eq!(ids, vec!["B", "D", "C"]);
    }

    #[test]
    fn top_risks_handles_short_tables() {
        let scores = vec![scored("A", 10.0)];
        assert_eq!(top_risks(&scores, 3).len(), 1);
        assert!(top_risks(&[], 3).is_empty());
    }

    #[test]
    fn absent_tiers_render_as_zero() {
        let scores = vec![scored("A", 10.0), scored("B", 12.0)];
        let brief = render_brief(&scores, 3, OutputFormat::Markdown).unwrap();
        assert!(brief.contains("* Total suppliers assessed: 2"));
        assert!(brief.contains("* High risk suppliers: 0"));
        assert!(brief.contains("* Moderate risk suppliers: 0"));
        assert!(brief.contains("* Low risk suppliers: 2"));
    }

    #[test]
    fn markdown_sections_appear_in_order() {
        let scores = vec![scored("A", 50.0)];
        let brief = render_brief(&scores, 3, OutputFormat::Markdown).unwrap();
        let positions: Vec<_> = [
            BRIEF_TITLE,
            "## Executive summary",
            "## Top risk hotspots",
            "## Recommended follow-up",
        ]
        .iter()
        .map(|heading| brief.find(heading).expect("heading present"))
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(brief.contains(
            "* **Supplier A** (DE, Metals) - Risk score 50.0 (Moderate)"
        ));
        assert!(brief.contains(
            "  * Key factors: Geo risk 0.25, Transit 0.20, Concentration 0.00, Sanctions 0"
        ));
    }

    #[test]
    fn json_brief_serializes() {
        let scores = vec![scored("A", 70.0), scored("B", 10.0)];
        let output = render_brief(&scores, 1, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total_suppliers"], 2);
        assert_eq!(value["tier_counts"]["high"], 1);
        assert_eq!(value["hotspots"].as_array().unwrap().len(), 1);
        assert_eq!(value["hotspots"][0]["risk_tier"], "High");
    }
}
