//! Dataset writer - writes generated datasets to the output directory
//!
//! One CSV per dataset plus `run_summary.json`. Unset timestamps are empty
//! cells; timestamps are ISO-8601 without zone.

use crate::error::GenResult;
use crate::infra::stats::RunStats;
use crate::services::generation::Datasets;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SKU_MASTER_FILE: &str = "sku_master.csv";
pub const LOCATIONS_FILE: &str = "locations.csv";
pub const SHIPMENTS_FILE: &str = "shipments.csv";
pub const SALES_FILE: &str = "sales.csv";
pub const INVENTORY_FILE: &str = "inventory.csv";
pub const SUMMARY_FILE: &str = "run_summary.json";

/// Serialize rows as CSV (header from the first row) and return the row count
pub fn write_csv_to<W, T, I>(writer: W, rows: I) -> GenResult<usize>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut csv = csv::Writer::from_writer(writer);
    let mut count = 0;
    for row in rows {
        csv.serialize(row)?;
        count += 1;
    }
    csv.flush()?;
    Ok(count)
}

/// Writer for one output directory
pub struct DatasetWriter {
    out_dir: PathBuf,
}

impl DatasetWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        let out_dir = out_dir.into();
        info!(out_dir = %out_dir.display(), "dataset_writer_initialized");
        Self { out_dir }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Write every dataset and the run summary; returns the written paths
    pub fn write_all(&self, datasets: &Datasets, stats: &RunStats) -> GenResult<Vec<PathBuf>> {
        let shipment_rows = datasets.shipments.iter().map(|s| s.to_row());

        let paths = vec![
            self.write_csv(SKU_MASTER_FILE, datasets.master.skus())?,
            self.write_csv(LOCATIONS_FILE, datasets.master.locations())?,
            self.write_csv(SHIPMENTS_FILE, shipment_rows)?,
            self.write_csv(SALES_FILE, &datasets.sales)?,
            self.write_csv(INVENTORY_FILE, &datasets.inventory)?,
            self.write_summary(stats)?,
        ];

        info!(out_dir = %self.out_dir.display(), files = %paths.len(), "dataset_written");
        Ok(paths)
    }

    /// Write one CSV dataset
    pub fn write_csv<T, I>(&self, file_name: &str, rows: I) -> GenResult<PathBuf>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let path = self.prepare(file_name)?;
        let rows = write_csv_to(BufWriter::new(File::create(&path)?), rows)?;
        debug!(file = %path.display(), rows = %rows, "csv_written");
        Ok(path)
    }

    pub fn write_summary(&self, stats: &RunStats) -> GenResult<PathBuf> {
        let path = self.prepare(SUMMARY_FILE)?;
        let mut file = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut file, stats)?;
        writeln!(file)?;
        file.flush()?;
        debug!(file = %path.display(), "summary_written");
        Ok(path)
    }

    /// Path inside the output directory, creating the directory if missing
    fn prepare(&self, file_name: &str) -> GenResult<PathBuf> {
        if !self.out_dir.exists() {
            fs::create_dir_all(&self.out_dir)?;
        }
        Ok(self.out_dir.join(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Category, Sku, SkuId};
    use tempfile::tempdir;

    fn sku(n: u32) -> Sku {
        Sku {
            sku_id: SkuId(format!("SKU{:04}", n)),
            category: Category::Bag,
            unit_cost: 45.5,
            unit_volume_m3: 0.012,
            launch_week: 3,
        }
    }

    #[test]
    fn test_write_csv_to_memory() {
        let mut buf = Vec::new();
        let n = write_csv_to(&mut buf, [sku(1), sku(2)]).unwrap();
        assert_eq!(n, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "sku_id,category,unit_cost,unit_volume_m3,launch_week");
        assert_eq!(lines[1], "SKU0001,BAG,45.5,0.012,3");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_creates_output_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested").join("raw");
        let writer = DatasetWriter::new(&nested);

        let path = writer.write_csv(SKU_MASTER_FILE, [sku(1)]).unwrap();
        assert!(nested.exists());
        assert_eq!(path, nested.join(SKU_MASTER_FILE));

        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("sku_id,"));
    }

    #[test]
    fn test_rewrite_truncates() {
        let dir = tempdir().unwrap();
        let writer = DatasetWriter::new(dir.path());
        writer.write_csv(SKU_MASTER_FILE, (1..=5).map(sku)).unwrap();
        let path = writer.write_csv(SKU_MASTER_FILE, [sku(1)]).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_write_summary() {
        let dir = tempdir().unwrap();
        let writer = DatasetWriter::new(dir.path());
        let stats = RunStats { seed: 42, shipments: 10, ..RunStats::default() };

        let path = writer.write_summary(&stats).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed["seed"], 42);
        assert_eq!(parsed["shipments"], 10);
    }
}
