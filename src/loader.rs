use crate::catalog;
use crate::config::Config;
use crate::error::Result;
use crate::regions::rank_regions;
use crate::schema::ColumnRoles;
use crate::types::FacilityRecord;
use crate::util::{parse_coordinate, parse_i64_safe, repair_text};
use csv::{ReaderBuilder, StringRecord};
use encoding_rs::Encoding;
use log::{debug, info, warn};
use reqwest::blocking::Client;
use std::path::PathBuf;

/// Where the facility CSV comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Search the open-data catalog and download the CSV it points to.
    Catalog,
    /// Read a previously downloaded CSV.
    File(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Rows with more fields than the header, or that the CSV reader rejected.
    pub skipped_rows: usize,
    /// Rows with fewer fields than the header; missing cells are left empty.
    pub padded_rows: usize,
}

/// Header and rows of the CSV, before any column is interpreted.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<StringRecord>,
}

/// The cleaned facility table plus what is derived from it once.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<FacilityRecord>,
    pub region_order: Vec<String>,
    pub has_coordinates: bool,
    pub source: String,
}

impl Dataset {
    pub fn from_records(records: Vec<FacilityRecord>, has_coordinates: bool, source: &str) -> Self {
        let region_order = rank_regions(&records);
        Dataset {
            records,
            region_order,
            has_coordinates,
            source: source.to_string(),
        }
    }
}

/// Decode and parse a semicolon-separated (by default) CSV payload.
///
/// Bad rows are skipped instead of failing the load; header names are
/// trimmed and lowercased.
pub fn parse_table(
    payload: &[u8],
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<(RawTable, LoadReport)> {
    let (text, _, _) = encoding.decode(payload);
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut report = LoadReport::default();
    let mut rows = Vec::new();
    for result in rdr.records() {
        report.total_rows += 1;
        let mut row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping unreadable row: {e}");
                report.skipped_rows += 1;
                continue;
            }
        };
        if row.len() > columns.len() {
            report.skipped_rows += 1;
            continue;
        }
        if row.len() < columns.len() {
            report.padded_rows += 1;
            while row.len() < columns.len() {
                row.push_field("");
            }
        }
        rows.push(row);
    }
    report.loaded_rows = rows.len();

    Ok((RawTable { columns, rows }, report))
}

/// Turn raw rows into facility records, repairing mis-decoded text.
pub fn build_records(
    table: &RawTable,
    roles: &ColumnRoles,
    encoding: &'static Encoding,
) -> Vec<FacilityRecord> {
    table
        .rows
        .iter()
        .map(|row| {
            let field = |idx: usize| row.get(idx).unwrap_or("").trim();
            let coordinate = |idx: Option<usize>| idx.and_then(|i| parse_coordinate(row.get(i)));
            FacilityRecord {
                region_code: parse_i64_safe(row.get(roles.region_code)),
                region: repair_text(field(roles.region_name), encoding),
                commune: repair_text(field(roles.commune), encoding),
                facility: repair_text(field(roles.facility), encoding),
                lat: coordinate(roles.latitude),
                lon: coordinate(roles.longitude),
            }
        })
        .collect()
}

fn fetch_payload(source: &Source, config: &Config) -> Result<(Vec<u8>, String)> {
    match source {
        Source::File(path) => {
            info!("Reading {}", path.display());
            Ok((std::fs::read(path)?, path.display().to_string()))
        }
        Source::Catalog => {
            let client = Client::new();
            let location = catalog::locate_csv(&client, config)?;
            info!("Downloading '{}' from {}", location.dataset, location.url);
            let bytes = client.get(&location.url).send()?.error_for_status()?.bytes()?;
            Ok((bytes.to_vec(), location.url))
        }
    }
}

/// Load the facility table and derive the column mapping and region order.
pub fn load_and_clean(source: &Source, config: &Config) -> Result<(Dataset, LoadReport)> {
    let encoding = config.legacy_encoding()?;
    let delimiter = config.delimiter_byte()?;
    let (payload, origin) = fetch_payload(source, config)?;

    let (table, report) = parse_table(&payload, delimiter, encoding)?;
    if report.skipped_rows > 0 {
        warn!("Skipped {} malformed rows", report.skipped_rows);
    }

    let roles = ColumnRoles::resolve(&table.columns)?;
    for (role, column) in roles.describe(&table.columns) {
        debug!("{role} -> '{column}'");
    }

    let records = build_records(&table, &roles, encoding);
    let dataset = Dataset::from_records(records, roles.has_coordinates(), &origin);
    info!(
        "Loaded {} facilities in {} regions",
        dataset.records.len(),
        dataset.region_order.len()
    );
    Ok((dataset, report))
}
