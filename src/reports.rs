use crate::category::{classify, MacroCategory};
use crate::error::{ReportError, Result};
use crate::geocode::{geocode_communes, CommuneMap};
use crate::loader::{Dataset, LoadReport};
use crate::regions::{filter_region, find_region};
use crate::types::{
    CategoryCountRow, CommuneCountRow, FacilityDetailRow, FacilityRecord, GroupCounts,
    MapPointRow, RegionCountRow, SummaryStats, TypeCountRow,
};
use crate::util::{format_number, percentage};
use chrono::Local;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::ops::RangeInclusive;

pub const TOP_COMMUNES_RANGE: RangeInclusive<usize> = 5..=30;
pub const TOP_TYPE_CHOICES: [usize; 2] = [5, 10];

/// Text column a record set can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Region,
    FacilityType,
    Commune,
}

impl Grouping {
    pub fn key(self, record: &FacilityRecord) -> &str {
        match self {
            Grouping::Region => &record.region,
            Grouping::FacilityType => &record.facility,
            Grouping::Commune => &record.commune,
        }
    }
}

/// Count records per value of `grouping`, one entry per name in `order`
/// (zero when absent). Values missing from `order` are not reported.
pub fn reindexed_counts<'a, I>(records: I, order: &[String], grouping: Grouping) -> GroupCounts
where
    I: IntoIterator<Item = &'a FacilityRecord>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(grouping.key(r)).or_default() += 1;
    }
    order
        .iter()
        .map(|name| (name.clone(), counts.get(name.as_str()).copied().unwrap_or(0)))
        .collect()
}

/// Count items per key, largest count first. Equal counts keep the order in
/// which their key was first seen.
pub fn ranked_counts<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<(K, usize)>
where
    K: Eq + Hash,
    F: FnMut(T) -> K,
{
    let mut counts: IndexMap<K, usize> = IndexMap::new();
    for item in items {
        *counts.entry(key(item)).or_default() += 1;
    }
    let mut ranked: Vec<(K, usize)> = counts.into_iter().collect();
    // stable: ties stay in first-seen order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn ranked_group_counts<'a>(records: &[&'a FacilityRecord], grouping: Grouping) -> GroupCounts {
    ranked_counts(records.iter().copied(), |r| grouping.key(r))
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect()
}

/// User choices that drive a region report.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewParams {
    pub region: String,
    pub top_communes: usize,
    pub top_types: usize,
}

impl ViewParams {
    /// `top_communes` is clamped to 5..=30; `top_types` must be 5 or 10.
    pub fn new(region: &str, top_communes: usize, top_types: usize) -> Result<Self> {
        if !TOP_TYPE_CHOICES.contains(&top_types) {
            return Err(ReportError::InvalidTopTypes(top_types));
        }
        Ok(ViewParams {
            region: region.to_string(),
            top_communes: top_communes.clamp(*TOP_COMMUNES_RANGE.start(), *TOP_COMMUNES_RANGE.end()),
            top_types,
        })
    }
}

/// Everything shown for one selected region.
#[derive(Debug, Clone)]
pub struct RegionView {
    pub region: String,
    pub total: usize,
    pub distinct_types: usize,
    /// Facilities per region over the whole country, in region order.
    pub national: GroupCounts,
    pub types: GroupCounts,
    pub communes: GroupCounts,
    pub categories: Vec<(MacroCategory, usize)>,
    pub commune_map: CommuneMap,
    /// Records of the region with both coordinates present.
    pub points: Vec<MapPointRow>,
    pub facilities: Vec<FacilityDetailRow>,
}

/// Compute a region report from scratch. Holds no state between calls, so it
/// is simply re-run whenever the selection changes.
pub fn build_view(dataset: &Dataset, params: &ViewParams) -> Result<RegionView> {
    let region = find_region(&dataset.region_order, &params.region)
        .ok_or_else(|| ReportError::UnknownRegion(params.region.clone()))?
        .to_string();
    let selected = filter_region(&dataset.records, &region);

    let national = reindexed_counts(&dataset.records, &dataset.region_order, Grouping::Region);

    let all_types = ranked_group_counts(&selected, Grouping::FacilityType);
    let distinct_types = all_types.len();
    let types: GroupCounts = all_types.into_iter().take(params.top_types).collect();

    let communes: GroupCounts = ranked_group_counts(&selected, Grouping::Commune)
        .into_iter()
        .take(params.top_communes)
        .collect();
    let commune_map = geocode_communes(&communes);

    let categories = ranked_counts(selected.iter(), |r| classify(&r.facility));

    let points = if dataset.has_coordinates {
        selected
            .iter()
            .filter_map(|r| match (r.lat, r.lon) {
                (Some(lat), Some(lon)) => Some(MapPointRow {
                    lat,
                    lon,
                    commune: r.commune.clone(),
                    facility: r.facility.clone(),
                }),
                _ => None,
            })
            .collect()
    } else {
        Vec::new()
    };

    let facilities = selected
        .iter()
        .map(|r| FacilityDetailRow {
            commune: r.commune.clone(),
            facility: r.facility.clone(),
        })
        .collect();

    Ok(RegionView {
        region,
        total: selected.len(),
        distinct_types,
        national,
        types,
        communes,
        categories,
        commune_map,
        points,
        facilities,
    })
}

pub fn generate_region_report(view: &RegionView) -> Vec<RegionCountRow> {
    view.national
        .iter()
        .enumerate()
        .map(|(idx, (region, facilities))| RegionCountRow {
            order: idx + 1,
            region: region.clone(),
            facilities: *facilities,
            selected: if *region == view.region { "*".into() } else { String::new() },
        })
        .collect()
}

pub fn generate_type_report(view: &RegionView) -> Vec<TypeCountRow> {
    view.types
        .iter()
        .enumerate()
        .map(|(idx, (facility_type, facilities))| TypeCountRow {
            rank: idx + 1,
            facility_type: facility_type.clone(),
            facilities: *facilities,
            share_pct: format_number(percentage(*facilities, view.total), 2),
        })
        .collect()
}

pub fn generate_commune_report(view: &RegionView) -> Vec<CommuneCountRow> {
    let located: HashMap<&str, (f64, f64)> = view
        .commune_map
        .located
        .iter()
        .map(|c| (c.commune.as_str(), (c.lat, c.lon)))
        .collect();
    view.communes
        .iter()
        .enumerate()
        .map(|(idx, (commune, facilities))| {
            let (lat, lon) = match located.get(commune.as_str()) {
                Some((lat, lon)) => (format_number(*lat, 4), format_number(*lon, 4)),
                None => (String::new(), String::new()),
            };
            CommuneCountRow {
                rank: idx + 1,
                commune: commune.clone(),
                facilities: *facilities,
                lat,
                lon,
            }
        })
        .collect()
}

pub fn generate_category_report(view: &RegionView) -> Vec<CategoryCountRow> {
    view.categories
        .iter()
        .map(|(category, facilities)| CategoryCountRow {
            category: category.to_string(),
            facilities: *facilities,
            share_pct: format_number(percentage(*facilities, view.total), 2),
        })
        .collect()
}

pub fn generate_summary(
    dataset: &Dataset,
    view: &RegionView,
    load_report: &LoadReport,
    unresolved_limit: usize,
) -> SummaryStats {
    let (shown, truncated) = view.commune_map.unresolved_preview(unresolved_limit);
    let regions: HashSet<&str> = dataset.records.iter().map(|r| r.region.as_str()).collect();
    SummaryStats {
        source: dataset.source.clone(),
        region: view.region.clone(),
        total_facilities: view.total,
        distinct_types: view.distinct_types,
        national_facilities: dataset.records.len(),
        regions: regions.len(),
        categories: generate_category_report(view),
        mapped_communes: view.commune_map.located.len(),
        unresolved_communes: shown.to_vec(),
        unresolved_truncated: truncated,
        map_points: view.points.len(),
        skipped_rows: load_report.skipped_rows,
        generated_at: Local::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{record, sample_dataset, sample_records};
    use rstest::rstest;

    fn scenario() -> Dataset {
        let records = vec![
            record(Some(13), "Region Metropolitana", "Santiago", "Hospital X"),
            record(Some(13), "Region Metropolitana", "Maipu", "CESFAM Y"),
            record(Some(1), "Tarapaca", "Iquique", "Posta Z"),
        ];
        Dataset::from_records(records, false, "scenario")
    }

    #[test]
    fn test_end_to_end_scenario() {
        let dataset = scenario();
        assert_eq!(dataset.region_order, vec!["Tarapaca", "Region Metropolitana"]);

        let params = ViewParams::new("Region Metropolitana", 1, 10).unwrap();
        let view = build_view(&dataset, &params).unwrap();
        assert_eq!(view.total, 2);
        assert_eq!(
            view.categories,
            vec![(MacroCategory::Hospital, 1), (MacroCategory::PrimaryCare, 1)]
        );
        assert_eq!(view.communes[0], ("Santiago".to_string(), 1));
    }

    #[test]
    fn test_reindexed_counts_zero_fill() {
        let records = sample_records();
        let order = vec![
            "Tarapacá".to_string(),
            "Aysén".to_string(),
            "Metropolitana de Santiago".to_string(),
        ];
        let selected = filter_region(&records, "Tarapacá");
        let counts = reindexed_counts(selected, &order, Grouping::Region);
        assert_eq!(
            counts,
            vec![
                ("Tarapacá".to_string(), 2),
                ("Aysén".to_string(), 0),
                ("Metropolitana de Santiago".to_string(), 0),
            ]
        );
    }

    #[rstest]
    fn test_national_counts_cover_every_record(sample_dataset: Dataset) {
        let counts = reindexed_counts(&sample_dataset.records, &sample_dataset.region_order, Grouping::Region);
        assert_eq!(counts.len(), sample_dataset.region_order.len());
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), sample_dataset.records.len());
    }

    #[test]
    fn test_ranked_counts_ties_keep_first_seen_order() {
        let items = ["b", "a", "c", "a", "c", "d"];
        let ranked = ranked_counts(items, |s| s);
        assert_eq!(ranked, vec![("a", 2), ("c", 2), ("b", 1), ("d", 1)]);
        assert_eq!(ranked.iter().map(|(_, n)| n).sum::<usize>(), items.len());
    }

    #[rstest]
    fn test_build_view(sample_dataset: Dataset) {
        let params = ViewParams::new("metropolitana de santiago", 5, 5).unwrap();
        let view = build_view(&sample_dataset, &params).unwrap();

        assert_eq!(view.region, "Metropolitana de Santiago");
        assert_eq!(view.total, 4);
        assert_eq!(view.distinct_types, 4);
        assert_eq!(view.facilities.len(), 4);
        assert_eq!(
            view.communes,
            vec![
                ("Santiago".to_string(), 2),
                ("Maipú".to_string(), 1),
                ("Colina".to_string(), 1),
            ]
        );
        assert_eq!(view.commune_map.located.len(), 2);
        assert_eq!(view.commune_map.unresolved, vec!["Colina".to_string()]);
        assert!(view.points.is_empty());
        for counts in [&view.types, &view.communes] {
            assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), view.total);
        }
        assert_eq!(view.categories.iter().map(|(_, n)| n).sum::<usize>(), view.total);
    }

    #[rstest]
    fn test_build_view_is_repeatable(sample_dataset: Dataset) {
        let params = ViewParams::new("Tarapacá", 15, 10).unwrap();
        let first = build_view(&sample_dataset, &params).unwrap();
        let second = build_view(&sample_dataset, &params).unwrap();
        assert_eq!(first.communes, second.communes);
        assert_eq!(first.categories, second.categories);
        assert_eq!(first.national, second.national);
    }

    #[test]
    fn test_top_types_are_truncated() {
        let records: Vec<_> = (0..12)
            .map(|i| record(Some(5), "Valparaíso", "Valparaíso", &format!("Posta {i}")))
            .collect();
        let dataset = Dataset::from_records(records, false, "test");
        let view = build_view(&dataset, &ViewParams::new("Valparaíso", 15, 5).unwrap()).unwrap();
        assert_eq!(view.distinct_types, 12);
        assert_eq!(view.types.len(), 5);
        assert_eq!(view.types[0].0, "Posta 0");
    }

    #[test]
    fn test_points_need_both_coordinates() {
        let mut records = sample_records();
        records[0].lat = Some(-33.44);
        records[0].lon = Some(-70.65);
        records[2].lat = Some(-33.51);
        let dataset = Dataset::from_records(records, true, "test");
        let params = ViewParams::new("Metropolitana de Santiago", 15, 10).unwrap();
        let view = build_view(&dataset, &params).unwrap();
        assert_eq!(view.points.len(), 1);
        assert_eq!(view.points[0].facility, "Hospital San Juan de Dios");
    }

    #[rstest]
    fn test_unknown_region(sample_dataset: Dataset) {
        let params = ViewParams::new("Aysén", 15, 10).unwrap();
        assert!(matches!(
            build_view(&sample_dataset, &params),
            Err(ReportError::UnknownRegion(_))
        ));
    }

    #[rstest]
    #[case(1, 5)]
    #[case(15, 15)]
    #[case(99, 30)]
    fn test_view_params_clamp_communes(#[case] requested: usize, #[case] expected: usize) {
        assert_eq!(ViewParams::new("x", requested, 10).unwrap().top_communes, expected);
    }

    #[test]
    fn test_view_params_rejects_top_types() {
        assert!(matches!(
            ViewParams::new("x", 15, 7),
            Err(ReportError::InvalidTopTypes(7))
        ));
    }

    #[rstest]
    fn test_generated_rows(sample_dataset: Dataset) {
        let params = ViewParams::new("Tarapacá", 15, 10).unwrap();
        let view = build_view(&sample_dataset, &params).unwrap();

        let regions = generate_region_report(&view);
        assert_eq!(regions[0].region, "Tarapacá");
        assert_eq!(regions[0].selected, "*");
        assert_eq!(regions[2].facilities, 4);

        let communes = generate_commune_report(&view);
        assert_eq!(communes[0].commune, "Iquique");
        assert_eq!(communes[0].lat, "-20.2141");

        let categories = generate_category_report(&view);
        assert_eq!(categories[0].category, "Post / emergency unit");
        assert_eq!(categories[0].share_pct, "50.00");

        let summary = generate_summary(&sample_dataset, &view, &LoadReport::default(), 15);
        assert_eq!(summary.total_facilities, 2);
        assert_eq!(summary.national_facilities, 7);
        assert_eq!(summary.regions, 3);
        assert!(summary.unresolved_communes.is_empty());
    }
}
