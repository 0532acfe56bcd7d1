use clap::Parser;
use std::path::PathBuf;

/// Reports on Chilean health facilities by region, from the datos.gob.cl
/// open-data catalog.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Read the facility CSV from a local file instead of downloading it
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Config file (defaults to <config dir>/salud_report/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Generate the report for this region and exit, skipping the menu
    #[arg(short, long)]
    pub region: Option<String>,

    /// Number of communes to rank and place on the map
    #[arg(long, value_parser = clap::value_parser!(u16).range(5..=30))]
    pub top_communes: Option<u16>,

    /// Number of facility types to list
    #[arg(long, value_parser = parse_top_types)]
    pub top_types: Option<usize>,

    /// Directory the CSV and JSON reports are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

fn parse_top_types(s: &str) -> Result<usize, String> {
    match s.trim() {
        "5" => Ok(5),
        "10" => Ok(10),
        _ => Err("must be 5 or 10".to_string()),
    }
}
