use crate::error::{ReportError, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// CKAN `package_search` endpoint.
    pub catalog_url: String,
    pub query: String,
    pub delimiter: char,
    /// WHATWG label of the encoding the CSV is published in.
    pub encoding: String,
    pub output_dir: PathBuf,
    pub top_communes: usize,
    pub top_types: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            catalog_url: "https://datos.gob.cl/api/3/action/package_search".into(),
            query: "establecimientos salud".into(),
            delimiter: ';',
            encoding: "latin1".into(),
            output_dir: PathBuf::from("."),
            top_communes: 15,
            top_types: 10,
        }
    }
}

impl Config {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Read `<config dir>/salud_report/config.toml`, falling back to the
    /// defaults when it does not exist.
    pub fn read_default() -> Result<Self> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(Config::default());
        };
        let file_path = dir.join("salud_report").join("config.toml");
        match Config::from_toml_file(&file_path) {
            Err(ReportError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Config::default())
            }
            other => other,
        }
    }

    pub fn legacy_encoding(&self) -> Result<&'static Encoding> {
        Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| ReportError::UnknownEncoding(self.encoding.clone()))
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(ReportError::InvalidDelimiter(self.delimiter))
    }
}
