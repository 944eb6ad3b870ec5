use insta::assert_snapshot;
use supply_risk_core::{render_brief, OutputFormat, RiskTier, ScoredSupplier};

fn scored(
    id: &str,
    name: &str,
    country: &str,
    sector: &str,
    components: (f64, f64, f64, u8),
    risk_score: f64,
) -> ScoredSupplier {
    let (geo_risk, transit_risk, concentration_risk, sanctions_risk) = components;
    ScoredSupplier {
        supplier_id: id.into(),
        name: name.into(),
        country: country.into(),
        sector: sector.into(),
        ownership_parent: None,
        reliability_score: Some(0.8),
        concentration_share: Some(0.2),
        sanctions_flag: sanctions_risk,
        avg_transit_risk: transit_risk,
        sanctions_match: false,
        sanctions_risk,
        geo_risk,
        concentration_risk,
        reliability_risk: 0.2,
        transit_risk,
        risk_score,
        risk_tier: RiskTier::from_score(risk_score),
    }
}

fn sample_scores() -> Vec<ScoredSupplier> {
    vec![
        scored("SUP-001", "Rhein Precision Castings", "Germany", "Metals", (0.105, 0.11, 0.45, 0), 17.4),
        scored("SUP-002", "Shenzhen Brightway Electronics", "China", "Electronics", (0.455, 0.535, 1.0, 0), 45.9),
        scored("SUP-003", "Caspian Polymer Works", "Kazakhstan", "Chemicals", (0.5125, 0.71, 0.25, 1), 66.0),
        scored("SUP-004", "Ankara Textile Mills", "Turkey", "Textiles", (0.31, 0.0, 0.0, 1), 66.1),
    ]
}

#[test]
fn sample_brief_snapshot() {
    let brief = render_brief(&sample_scores(), 3, OutputFormat::Markdown).unwrap();
    assert_snapshot!("sample_brief", brief.trim_end());
}
