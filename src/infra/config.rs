//! Configuration loading from TOML files
//!
//! Config file is selected via `--config <path>`. Without the flag,
//! config/default.toml is read if present, else built-in defaults apply.
//! Every key is optional; missing keys take the defaults below.

use crate::error::GenResult;
use crate::services::generation::GenerationSettings;
use crate::services::master_data::MasterDataSpec;
use crate::services::sales_inventory::SalesParams;
use crate::services::simulator::SimulatorParams;
use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Config read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// ISO date, e.g. "2024-01-01"
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(default = "default_months")]
    pub months: u32,
}

fn default_seed() -> u64 {
    42
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn default_months() -> u32 {
    6
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { seed: default_seed(), start_date: default_start_date(), months: default_months() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MasterConfig {
    #[serde(default = "default_n_skus")]
    pub n_skus: u32,
    #[serde(default = "default_n_factories")]
    pub n_factories: u32,
    /// At most 2 (W1 EU, W2 US)
    #[serde(default = "default_n_warehouses")]
    pub n_warehouses: u32,
    #[serde(default = "default_n_stores")]
    pub n_stores: u32,
}

fn default_n_skus() -> u32 {
    250
}

fn default_n_factories() -> u32 {
    3
}

fn default_n_warehouses() -> u32 {
    2
}

fn default_n_stores() -> u32 {
    80
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            n_skus: default_n_skus(),
            n_factories: default_n_factories(),
            n_warehouses: default_n_warehouses(),
            n_stores: default_n_stores(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShipmentsConfig {
    /// Base daily target before noise
    #[serde(default = "default_shipments_per_day")]
    pub shipments_per_day: u32,
    #[serde(default = "default_f2w_probability")]
    pub f2w_probability: f64,
    /// Share of weeks flagged as promo weeks (both calendars)
    #[serde(default = "default_promo_weeks_ratio")]
    pub promo_weeks_ratio: f64,
}

fn default_shipments_per_day() -> u32 {
    120
}

fn default_f2w_probability() -> f64 {
    0.38
}

fn default_promo_weeks_ratio() -> f64 {
    0.18
}

impl Default for ShipmentsConfig {
    fn default() -> Self {
        Self {
            shipments_per_day: default_shipments_per_day(),
            f2w_probability: default_f2w_probability(),
            promo_weeks_ratio: default_promo_weeks_ratio(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for the CSV datasets and run summary
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

fn default_output_dir() -> String {
    "data/raw".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_output_dir() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub master: MasterConfig,
    #[serde(default)]
    pub shipments: ShipmentsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    seed: u64,
    start_date: NaiveDate,
    months: u32,
    n_skus: u32,
    n_factories: u32,
    n_warehouses: u32,
    n_stores: u32,
    shipments_per_day: u32,
    f2w_probability: f64,
    promo_weeks_ratio: f64,
    output_dir: PathBuf,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default".to_string())
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: String) -> Self {
        Self {
            seed: toml_config.run.seed,
            start_date: toml_config.run.start_date,
            months: toml_config.run.months,
            n_skus: toml_config.master.n_skus,
            n_factories: toml_config.master.n_factories,
            n_warehouses: toml_config.master.n_warehouses,
            n_stores: toml_config.master.n_stores,
            shipments_per_day: toml_config.shipments.shipments_per_day,
            f2w_probability: toml_config.shipments.f2w_probability,
            promo_weeks_ratio: toml_config.shipments.promo_weeks_ratio,
            output_dir: PathBuf::from(toml_config.output.dir),
            config_file,
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, path.display().to_string()))
    }

    /// Load configuration - defaults only when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error: the
    /// configuration decides the whole dataset, so it is never guessed.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match fs::metadata(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(config_file = %path.display(), "config_file_missing_using_defaults");
                Ok(Self::default())
            }
            _ => Self::from_file(path),
        }
    }

    /// Parameters of a generation run built from this configuration
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            seed: self.seed,
            start_date: self.start_date,
            months: self.months,
            master: MasterDataSpec {
                n_skus: self.n_skus,
                n_factories: self.n_factories,
                n_warehouses: self.n_warehouses,
                n_stores: self.n_stores,
            },
            simulator: SimulatorParams {
                shipments_per_day: self.shipments_per_day,
                f2w_probability: self.f2w_probability,
                promo_weeks_ratio: self.promo_weeks_ratio,
                ..SimulatorParams::default()
            },
            sales: SalesParams { promo_weeks_ratio: self.promo_weeks_ratio, ..SalesParams::default() },
        }
    }

    /// Reject configuration that cannot produce a run
    pub fn validate(&self) -> GenResult<()> {
        self.generation_settings().validate()
    }

    // Getters for all config fields
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    pub fn n_skus(&self) -> u32 {
        self.n_skus
    }

    pub fn n_factories(&self) -> u32 {
        self.n_factories
    }

    pub fn n_warehouses(&self) -> u32 {
        self.n_warehouses
    }

    pub fn n_stores(&self) -> u32 {
        self.n_stores
    }

    pub fn shipments_per_day(&self) -> u32 {
        self.shipments_per_day
    }

    pub fn f2w_probability(&self) -> f64 {
        self.f2w_probability
    }

    pub fn promo_weeks_ratio(&self) -> f64 {
        self.promo_weeks_ratio
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.seed(), 42);
        assert_eq!(config.start_date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(config.months(), 6);
        assert_eq!(config.n_skus(), 250);
        assert_eq!(config.n_factories(), 3);
        assert_eq!(config.n_warehouses(), 2);
        assert_eq!(config.n_stores(), 80);
        assert_eq!(config.shipments_per_day(), 120);
        assert_eq!(config.f2w_probability(), 0.38);
        assert_eq!(config.promo_weeks_ratio(), 0.18);
        assert_eq!(config.output_dir(), Path::new("data/raw"));
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_sections_take_defaults() {
        let toml_config: TomlConfig = toml::from_str(
            r#"
[run]
seed = 7

[shipments]
shipments_per_day = 10
"#,
        )
        .unwrap();
        let config = Config::from_toml(toml_config, "inline".to_string());
        assert_eq!(config.seed(), 7);
        assert_eq!(config.months(), 6);
        assert_eq!(config.shipments_per_day(), 10);
        assert_eq!(config.f2w_probability(), 0.38);
        assert_eq!(config.n_stores(), 80);
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_seed(9).with_output_dir("/tmp/out");
        assert_eq!(config.seed(), 9);
        assert_eq!(config.output_dir(), Path::new("/tmp/out"));
        assert_eq!(config.generation_settings().seed, 9);
    }

    #[test]
    fn test_promo_ratio_feeds_both_calendars() {
        let toml_config: TomlConfig = toml::from_str("[shipments]\npromo_weeks_ratio = 0.3\n").unwrap();
        let settings = Config::from_toml(toml_config, "inline".to_string()).generation_settings();
        assert_eq!(settings.simulator.promo_weeks_ratio, 0.3);
        assert_eq!(settings.sales.promo_weeks_ratio, 0.3);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            "[run]\nmonths = 0\n",
            "[master]\nn_skus = 0\n",
            "[master]\nn_warehouses = 3\n",
            "[shipments]\nshipments_per_day = 0\n",
            "[shipments]\nf2w_probability = 1.2\n",
            "[shipments]\npromo_weeks_ratio = -0.1\n",
        ];
        for case in cases {
            let toml_config: TomlConfig = toml::from_str(case).unwrap();
            let config = Config::from_toml(toml_config, "inline".to_string());
            assert!(matches!(config.validate(), Err(GenError::Config(_))), "accepted: {}", case);
        }
    }

    #[test]
    fn test_bad_start_date_fails_to_parse() {
        assert!(toml::from_str::<TomlConfig>("[run]\nstart_date = \"2024-13-40\"\n").is_err());
    }
}
