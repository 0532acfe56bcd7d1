use chrono::{DateTime, Local};
use serde::Serialize;
use tabled::Tabled;

/// One facility after column resolution and text repair.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRecord {
    /// Numeric region code; `None` when the cell is not an integer.
    pub region_code: Option<i64>,
    pub region: String,
    pub commune: String,
    pub facility: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Counts keyed by group name, in display order.
pub type GroupCounts = Vec<(String, usize)>;

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionCountRow {
    #[serde(rename = "Order")]
    #[tabled(rename = "Order")]
    pub order: usize,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Facilities")]
    #[tabled(rename = "Facilities")]
    pub facilities: usize,
    #[serde(rename = "Selected")]
    #[tabled(rename = "Selected")]
    pub selected: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TypeCountRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "FacilityType")]
    #[tabled(rename = "FacilityType")]
    pub facility_type: String,
    #[serde(rename = "Facilities")]
    #[tabled(rename = "Facilities")]
    pub facilities: usize,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CommuneCountRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Commune")]
    #[tabled(rename = "Commune")]
    pub commune: String,
    #[serde(rename = "Facilities")]
    #[tabled(rename = "Facilities")]
    pub facilities: usize,
    #[serde(rename = "Latitude")]
    #[tabled(rename = "Latitude")]
    pub lat: String,
    #[serde(rename = "Longitude")]
    #[tabled(rename = "Longitude")]
    pub lon: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryCountRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Facilities")]
    #[tabled(rename = "Facilities")]
    pub facilities: usize,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct FacilityDetailRow {
    #[serde(rename = "Commune")]
    #[tabled(rename = "Commune")]
    pub commune: String,
    #[serde(rename = "Facility")]
    #[tabled(rename = "Facility")]
    pub facility: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct MapPointRow {
    pub lat: f64,
    pub lon: f64,
    pub commune: String,
    pub facility: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub source: String,
    pub region: String,
    pub total_facilities: usize,
    pub distinct_types: usize,
    pub national_facilities: usize,
    pub regions: usize,
    pub categories: Vec<CategoryCountRow>,
    pub mapped_communes: usize,
    pub unresolved_communes: Vec<String>,
    pub unresolved_truncated: usize,
    pub map_points: usize,
    pub skipped_rows: usize,
    pub generated_at: DateTime<Local>,
}
