//! Dimension expansion - declarative query definitions to concrete queries.
//!
//! A definition whose `region` value is the "all" sentinel or an explicit
//! comma-separated list fans out into one fully-bound definition per region,
//! plus a "general" variant with `region` removed entirely - the
//! region-independent aggregate.

use std::collections::BTreeMap;
use tracing::debug;

use crate::query::definition::QueryDefinition;

/// Region value meaning "expand over every configured region".
const ALL_REGIONS: &str = "all";

/// Separator of explicit region lists.
const REGION_SEPARATOR: char = ',';

/// Name suffix of the region-independent aggregate variant.
const GENERAL_SUFFIX: &str = "general";

/// Expand every configured query. Keys of the result are generated query
/// names: the original name, optionally suffixed with the bound region or
/// with "general".
pub fn expand_queries(
    queries: &BTreeMap<String, QueryDefinition>,
    regions: &[String],
) -> BTreeMap<String, QueryDefinition> {
    let mut expanded = BTreeMap::new();
    for (name, definition) in queries {
        expand_query(name, definition, regions, &mut expanded);
    }
    debug!(
        declared = queries.len(),
        expanded = expanded.len(),
        "expanded query definitions"
    );
    expanded
}

/// Expand one raw definition into `out`. Dimension names are normalized and
/// tag-prefixed first; the raw definition is never mutated.
pub fn expand_query(
    name: &str,
    definition: &QueryDefinition,
    regions: &[String],
    out: &mut BTreeMap<String, QueryDefinition>,
) {
    let definition = definition.normalized();
    let region_value = definition.get("region").map(str::to_string);

    match region_value.as_deref() {
        Some(ALL_REGIONS) => expand_over(name, &definition, regions, out),
        Some(value) if value.contains(REGION_SEPARATOR) => {
            let explicit: Vec<String> = value
                .split(REGION_SEPARATOR)
                .map(|region| region.trim().to_string())
                .collect();
            expand_over(name, &definition, &explicit, out);
        }
        // A single bound region, or no region at all: one concrete query.
        _ => {
            out.insert(name.to_string(), definition);
        }
    }
}

/// One bound definition per region, plus the general variant. The general
/// variant drops `region`, so it is the same definition no matter which
/// region was processed last.
fn expand_over(
    name: &str,
    definition: &QueryDefinition,
    regions: &[String],
    out: &mut BTreeMap<String, QueryDefinition>,
) {
    for region in regions {
        let mut bound = definition.clone();
        bound.insert("region", region.clone());
        out.insert(format!("{}_{}", name, region), bound);
    }
    let mut general = definition.clone();
    general.remove("region");
    out.insert(format!("{}_{}", name, GENERAL_SUFFIX), general);
}
