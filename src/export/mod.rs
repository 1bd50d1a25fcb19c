//! Output formatting and persistence for merged time-series rows.
//!
//! Rows are heterogeneous: a band column is only populated where some record
//! contributed a mean, so the CSV is written with an explicit column list and
//! empty cells for absent bands.

pub mod s3;

use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::OutputFormat;
use crate::pipeline::types::MergedRecord;

/// Writes `records` to `<dir>/<output_name>.<ext>` and returns the path.
///
/// `name_column` is the header of the area-identity column (the vector
/// source's name attribute); `band_columns` fixes the band column order.
pub fn write_table(
    dir: &str,
    output_name: &str,
    format: OutputFormat,
    name_column: &str,
    band_columns: &[String],
    records: &[MergedRecord],
) -> Result<PathBuf> {
    let path = Path::new(dir).join(format!("{output_name}.{}", format.extension()));

    match format {
        OutputFormat::Csv => write_csv(&path, name_column, band_columns, records)?,
        OutputFormat::Json => write_json(&path, records)?,
    }

    info!(path = %path.display(), rows = records.len(), "Export written");
    Ok(path)
}

fn write_csv(
    path: &Path,
    name_column: &str,
    band_columns: &[String],
    records: &[MergedRecord],
) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;

    let mut header = Vec::with_capacity(band_columns.len() + 2);
    header.push(name_column.to_string());
    header.push("date".to_string());
    header.extend(band_columns.iter().cloned());
    writer.write_record(&header)?;

    for record in records {
        let mut row = Vec::with_capacity(header.len());
        row.push(record.area.clone());
        row.push(record.date.format("%Y-%m-%d").to_string());
        for column in band_columns {
            row.push(
                record
                    .bands
                    .get(column)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, records: &[MergedRecord]) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, records)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::env;
    use std::fs;

    fn temp_dir(name: &str) -> String {
        let dir = format!("{}/{}", env::temp_dir().display(), name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn record(area: &str, date: &str, bands: &[(&str, f64)]) -> MergedRecord {
        MergedRecord {
            area: area.to_string(),
            date: date.parse().unwrap(),
            bands: bands
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        }
    }

    #[test]
    fn test_csv_header_and_column_order() {
        let dir = temp_dir("park_climate_ts_export_header");
        let columns = vec!["D_t".to_string(), "E_p".to_string()];
        let records = [record("Park A", "2020-06-01", &[("D_t", 10.0), ("E_p", 5.0)])];

        let path = write_table(&dir, "out", OutputFormat::Csv, "Unit_Nm", &columns, &records)
            .unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(lines[0], "Unit_Nm,date,D_t,E_p");
        assert_eq!(lines[1], "Park A,2020-06-01,10,5");
        assert_eq!(lines.len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_csv_absent_bands_are_empty_cells() {
        let dir = temp_dir("park_climate_ts_export_sparse");
        let columns = vec!["D_t".to_string(), "E_p".to_string()];
        let records = [
            record("Park A", "2020-06-01", &[("D_t", 10.5)]),
            record("Park B", "2020-06-01", &[("E_p", 5.25)]),
        ];

        let path = write_table(&dir, "out", OutputFormat::Csv, "Unit_Nm", &columns, &records)
            .unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(lines[1], "Park A,2020-06-01,10.5,");
        assert_eq!(lines[2], "Park B,2020-06-01,,5.25");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_json_rows_are_flat() {
        let dir = temp_dir("park_climate_ts_export_json");
        let records = [record("Park A", "2020-06-01", &[("D_t", 10.0)])];

        let path = write_table(&dir, "out", OutputFormat::Json, "Unit_Nm", &[], &records)
            .unwrap();
        assert!(path.to_string_lossy().ends_with("out.json"));

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed[0]["area"], "Park A");
        assert_eq!(parsed[0]["date"], "2020-06-01");
        assert_eq!(parsed[0]["D_t"], 10.0);

        fs::remove_dir_all(&dir).unwrap();
    }
}
