use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::data::{
    mean, DataError, MergedSupplier, RouteRecord, SanctionsEntity, SupplierDataSource,
    SupplierRecord,
};

/// Canonical form used to compare ownership parents with sanctioned entities.
pub fn normalize_entity(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Mean `transit_risk` per supplier id. Routes without a value are ignored.
pub fn average_transit_risk(routes: &[RouteRecord]) -> HashMap<&str, f64> {
    let mut grouped: HashMap<&str, Vec<f64>> = HashMap::new();
    for route in routes {
        if let Some(risk) = route.transit_risk {
            grouped
                .entry(route.supplier_id.as_str())
                .or_default()
                .push(risk);
        }
    }
    grouped
        .into_iter()
        .filter_map(|(id, risks)| mean(risks).map(|avg| (id, avg)))
        .collect()
}

/// Set of normalized sanctioned entity names.
pub fn sanctioned_entities(entities: &[SanctionsEntity]) -> HashSet<String> {
    entities
        .iter()
        .filter_map(|row| row.entity.as_deref())
        .map(normalize_entity)
        .collect()
}

/// Join suppliers with their route and sanctions exposure.
///
/// Output rows keep the supplier file order. `sanctions_risk` is the logical OR
/// of a positive explicit flag and an exact (case and surrounding whitespace
/// insensitive) match of `ownership_parent` against the sanctions list.
pub fn merge_suppliers(
    suppliers: Vec<SupplierRecord>,
    routes: &[RouteRecord],
    sanctions: &[SanctionsEntity],
) -> Vec<MergedSupplier> {
    let transit = average_transit_risk(routes);
    let sanctioned = sanctioned_entities(sanctions);

    suppliers
        .into_iter()
        .map(|supplier| {
            let avg_transit_risk = transit
                .get(supplier.supplier_id.as_str())
                .copied()
                .unwrap_or(0.0);
            let sanctions_match = supplier
                .ownership_parent
                .as_deref()
                .map(|parent| sanctioned.contains(&normalize_entity(parent)))
                .unwrap_or(false);
            let sanctions_flag = u8::from(supplier.sanctions_flag.unwrap_or(0) > 0);
            let sanctions_risk = u8::from(sanctions_flag == 1 || sanctions_match);
            MergedSupplier {
                supplier_id: supplier.supplier_id,
                name: supplier.name,
                country: supplier.country,
                sector: supplier.sector,
                ownership_parent: supplier.ownership_parent,
                reliability_score: supplier.reliability_score,
                concentration_share: supplier.concentration_share,
                sanctions_flag,
                avg_transit_risk,
                sanctions_match,
                sanctions_risk,
            }
        })
        .collect()
}

/// Load suppliers, routes and sanctions from `source` and merge them.
#[instrument(name = "ingest", skip(source))]
pub fn build_supplier_profile<S>(source: &S) -> Result<Vec<MergedSupplier>, DataError>
where
    S: SupplierDataSource + ?Sized,
{
    let suppliers = source.suppliers()?;
    let routes = source.routes()?;
    let sanctions = source.sanctions()?;

    let merged = merge_suppliers(suppliers, &routes, &sanctions);
    debug!(
        suppliers = merged.len(),
        routes = routes.len(),
        sanctioned = merged.iter().filter(|s| s.sanctions_risk == 1).count(),
        "merged supplier profile"
    );
    Ok(merged)
}
