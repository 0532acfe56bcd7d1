//! Error types.
use crate::schema::ColumnRole;

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("Could not find the dataset in the catalog.")]
    DatasetNotFound,
    #[error("Dataset '{0}' does not contain a CSV resource.")]
    NoCsvResource(String),
    #[error("Could not identify the main columns: {}", join_roles(.0))]
    MissingColumns(Vec<ColumnRole>),
    #[error("Unknown region: {0}")]
    UnknownRegion(String),
    #[error("Invalid number of facility types: {0} (expected 5 or 10)")]
    InvalidTopTypes(usize),
    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),
    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
    #[error("Invalid config file: {0}")]
    Config(#[from] toml::de::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serde JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

fn join_roles(roles: &[ColumnRole]) -> String {
    roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
