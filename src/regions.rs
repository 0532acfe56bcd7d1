//! North-to-south ordering of regions.
use crate::types::FacilityRecord;
use crate::util::normalize_name;
use std::collections::{BTreeSet, HashSet};

/// Sort key for a region code: parsed codes ascending, unparsable last.
fn code_key(code: Option<i64>) -> (bool, i64) {
    (code.is_none(), code.unwrap_or_default())
}

/// Distinct region names sorted by region code.
///
/// Region codes follow the geographic sequence from north to south. Ties on
/// the code are broken by name so the result does not depend on row order.
/// A name seen with several codes keeps its lowest position.
pub fn rank_regions(records: &[FacilityRecord]) -> Vec<String> {
    let pairs: BTreeSet<((bool, i64), &str)> = records
        .iter()
        .map(|r| (code_key(r.region_code), r.region.as_str()))
        .collect();

    let mut seen = HashSet::new();
    pairs
        .into_iter()
        .filter(|(_, name)| seen.insert(*name))
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Resolve a user-supplied region against the ordering, exactly or by
/// normalized name.
pub fn find_region<'a>(order: &'a [String], wanted: &str) -> Option<&'a str> {
    order
        .iter()
        .find(|name| name.as_str() == wanted)
        .or_else(|| {
            let key = normalize_name(wanted);
            order.iter().find(|name| normalize_name(name) == key)
        })
        .map(String::as_str)
}

/// Records belonging to one region.
pub fn filter_region<'a>(records: &'a [FacilityRecord], region: &str) -> Vec<&'a FacilityRecord> {
    records.iter().filter(|r| r.region == region).collect()
}
