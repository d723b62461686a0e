//! Integration tests: generate, write, and read back the datasets

use shipgen::domain::Lane;
use shipgen::infra::RunStats;
use shipgen::io::dataset_writer::{
    DatasetWriter, INVENTORY_FILE, LOCATIONS_FILE, SALES_FILE, SHIPMENTS_FILE, SKU_MASTER_FILE,
    SUMMARY_FILE,
};
use shipgen::services::{generate, GenerationSettings, MasterDataSpec, SimulatorParams};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const F2W_COLUMNS: [&str; 8] = [
    "pickup_time",
    "export_clearance_start",
    "export_clearance_end",
    "flight_departure",
    "flight_arrival",
    "import_clearance_start",
    "import_clearance_end",
    "warehouse_receive_time",
];

const W2S_COLUMNS: [&str; 6] =
    ["pick_start", "pick_end", "pack_start", "pack_end", "ship_out_time", "store_receive_time"];

fn settings(seed: u64) -> GenerationSettings {
    GenerationSettings {
        seed,
        months: 1,
        master: MasterDataSpec { n_skus: 80, n_factories: 3, n_warehouses: 2, n_stores: 8 },
        simulator: SimulatorParams { shipments_per_day: 25, ..SimulatorParams::default() },
        ..GenerationSettings::default()
    }
}

fn generate_into(dir: &Path, seed: u64) {
    let settings = settings(seed);
    let datasets = generate(&settings).unwrap();
    let stats = RunStats::from_datasets(seed, &datasets);
    DatasetWriter::new(dir).write_all(&datasets, &stats).unwrap();
}

fn read(dir: &Path, file: &str) -> Vec<u8> {
    fs::read(dir.join(file)).unwrap()
}

#[test]
fn test_all_files_written() {
    let dir = tempdir().unwrap();
    generate_into(dir.path(), 42);

    for file in [SKU_MASTER_FILE, LOCATIONS_FILE, SHIPMENTS_FILE, SALES_FILE, INVENTORY_FILE, SUMMARY_FILE] {
        let path = dir.path().join(file);
        assert!(path.exists(), "{} missing", file);
        assert!(fs::metadata(path).unwrap().len() > 0);
    }
}

#[test]
fn test_same_seed_byte_identical_output() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    generate_into(a.path(), 42);
    generate_into(b.path(), 42);

    for file in [SKU_MASTER_FILE, LOCATIONS_FILE, SHIPMENTS_FILE, SALES_FILE, INVENTORY_FILE, SUMMARY_FILE] {
        assert_eq!(read(a.path(), file), read(b.path(), file), "{} differs", file);
    }
}

#[test]
fn test_different_seed_changes_output() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    generate_into(a.path(), 42);
    generate_into(b.path(), 43);

    assert_ne!(read(a.path(), SHIPMENTS_FILE), read(b.path(), SHIPMENTS_FILE));
    assert_ne!(read(a.path(), SALES_FILE), read(b.path(), SALES_FILE));
}

#[test]
fn test_shipment_columns_exclusive_per_lane() {
    let dir = tempdir().unwrap();
    generate_into(dir.path(), 42);

    let mut reader = csv::Reader::from_path(dir.path().join(SHIPMENTS_FILE)).unwrap();
    let headers = reader.headers().unwrap().clone();
    let col = |name: &str| headers.iter().position(|h| h == name).unwrap();

    let lane_col = col("lane");
    let late_col = col("delivered_late");
    let delay_col = col("delay_minutes");
    let f2w_cols: Vec<usize> = F2W_COLUMNS.iter().map(|c| col(c)).collect();
    let w2s_cols: Vec<usize> = W2S_COLUMNS.iter().map(|c| col(c)).collect();

    let mut rows = 0;
    for record in reader.records() {
        let record = record.unwrap();
        rows += 1;

        let (set, unset, threshold) = match &record[lane_col] {
            "F2W" => (&f2w_cols, &w2s_cols, 720),
            "W2S" => (&w2s_cols, &f2w_cols, 240),
            other => panic!("unknown lane {}", other),
        };
        assert!(set.iter().all(|&i| !record[i].is_empty()));
        assert!(unset.iter().all(|&i| record[i].is_empty()));

        // Timestamps in cascade order; ISO strings compare chronologically
        let stamps: Vec<&str> = set.iter().map(|&i| &record[i]).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]), "out of order: {:?}", stamps);
        assert!(!stamps[0].ends_with('Z'));

        let delay: i64 = record[delay_col].parse().unwrap();
        let late: bool = record[late_col].parse().unwrap();
        assert_eq!(late, delay > threshold);
    }
    assert!(rows > 0);
}

#[test]
fn test_delay_reason_vocabulary() {
    let datasets = generate(&settings(5)).unwrap();
    for s in &datasets.shipments {
        let reason = s.header.delay_reason.to_string();
        let allowed: &[&str] = match s.lane() {
            Lane::F2W => &["CUSTOMS_CONGESTION", "NORMAL_VARIANCE"],
            Lane::W2S => &[
                "MISSED_CUTOFF_PACKING",
                "NORMAL_VARIANCE",
                "MISSED_CUTOFF_PACKING_PROMO_SURGE",
                "NORMAL_VARIANCE_PROMO_SURGE",
            ],
        };
        assert!(allowed.contains(&reason.as_str()), "unexpected reason {}", reason);
    }
}

#[test]
fn test_summary_matches_shipments() {
    let dir = tempdir().unwrap();
    generate_into(dir.path(), 42);

    let summary: serde_json::Value = serde_json::from_slice(&read(dir.path(), SUMMARY_FILE)).unwrap();
    let shipments = csv::Reader::from_path(dir.path().join(SHIPMENTS_FILE)).unwrap().records().count();
    assert_eq!(summary["shipments"], shipments as u64);
    assert_eq!(summary["seed"], 42);

    let sales = csv::Reader::from_path(dir.path().join(SALES_FILE)).unwrap().records().count();
    assert_eq!(summary["sales_rows"], sales as u64);
}

#[test]
fn test_master_data_files() {
    let dir = tempdir().unwrap();
    generate_into(dir.path(), 42);

    let mut locations = csv::Reader::from_path(dir.path().join(LOCATIONS_FILE)).unwrap();
    let headers = locations.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), ["location_id", "type", "region", "lat", "lon"]);
    let types: Vec<String> = locations.records().map(|r| r.unwrap()[1].to_string()).collect();
    assert_eq!(types.iter().filter(|t| *t == "FACTORY").count(), 3);
    assert_eq!(types.iter().filter(|t| *t == "WAREHOUSE").count(), 2);
    assert_eq!(types.iter().filter(|t| *t == "STORE").count(), 8);

    let skus = csv::Reader::from_path(dir.path().join(SKU_MASTER_FILE)).unwrap().records().count();
    assert_eq!(skus, 80);
}
