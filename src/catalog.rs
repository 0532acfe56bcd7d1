//! Dataset lookup through the CKAN `package_search` API.
use crate::config::Config;
use crate::error::{ReportError, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub success: bool,
    pub result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<CatalogDataset>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogDataset {
    #[serde(default)]
    pub name: String,
    pub title: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
pub struct Resource {
    pub format: Option<String>,
    pub url: String,
}

/// The CSV picked from the search results.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvLocation {
    pub dataset: String,
    pub url: String,
}

impl CatalogDataset {
    fn display_name(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.name.clone())
    }
}

/// Run the catalog search. Network errors, HTTP error statuses and
/// malformed JSON are returned as `ReportError::Http`.
pub fn search(client: &Client, config: &Config) -> Result<SearchResponse> {
    let response = client
        .get(&config.catalog_url)
        .query(&[("q", config.query.as_str())])
        .send()?
        .error_for_status()?;
    Ok(response.json()?)
}

/// First CSV resource of the first dataset in the search results.
pub fn select_csv(response: &SearchResponse) -> Result<CsvLocation> {
    let dataset = match &response.result {
        Some(result) if response.success && result.count > 0 => result.results.first(),
        _ => None,
    }
    .ok_or(ReportError::DatasetNotFound)?;

    let resource = dataset
        .resources
        .iter()
        .find(|r| {
            r.format
                .as_deref()
                .is_some_and(|f| f.eq_ignore_ascii_case("csv"))
        })
        .ok_or_else(|| ReportError::NoCsvResource(dataset.display_name()))?;

    Ok(CsvLocation {
        dataset: dataset.display_name(),
        url: resource.url.clone(),
    })
}

pub fn locate_csv(client: &Client, config: &Config) -> Result<CsvLocation> {
    select_csv(&search(client, config)?)
}
