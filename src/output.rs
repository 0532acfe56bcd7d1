use crate::error::Result;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Print the first `max_rows` rows as a markdown table.
pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Print a horizontal bar per group, scaled to the largest count.
pub fn print_bar_chart(counts: &[(String, usize)], width: usize) {
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let label_width = counts.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (label, n) in counts {
        let len = if max == 0 { 0 } else { n * width / max };
        println!(
            "{:<label_width$} | {} {}",
            label,
            "#".repeat(len),
            n,
            label_width = label_width
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FacilityDetailRow;
    use tempfile::tempdir;

    #[test]
    fn test_write_csv_and_json() {
        let dir = tempdir().unwrap();
        let rows = vec![FacilityDetailRow {
            commune: "Iquique".into(),
            facility: "CESFAM Cirujano Aguirre".into(),
        }];

        let csv_path = dir.path().join("detail.csv");
        write_csv(&csv_path, &rows).unwrap();
        let written = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(written, "Commune,Facility\nIquique,CESFAM Cirujano Aguirre\n");

        let json_path = dir.path().join("detail.json");
        write_json(&json_path, &rows).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value[0]["Facility"], "CESFAM Cirujano Aguirre");
    }
}
