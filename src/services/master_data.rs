//! Master data generation - SKU catalog and location directory
//!
//! Pure function of the master-data settings and the draw service; runs
//! once per generation and its output is read-only afterwards.

use crate::domain::types::{Category, Location, LocationId, LocationType, Region, Sku, SkuId};
use crate::error::{GenError, GenResult};
use crate::services::draws::DrawService;
use rustc_hash::FxHashMap;
use tracing::info;

const CATEGORY_WEIGHTS: [f64; 3] = [0.62, 0.18, 0.20];
const STORE_REGION_WEIGHTS: [f64; 2] = [0.52, 0.48];

/// Fixed warehouse sites: (id, region, lat, lon)
const WAREHOUSE_SITES: [(&str, Region, f64, f64); 2] =
    [("W1", Region::Eu, 50.1, 8.6), ("W2", Region::Us, 40.7, -74.0)];

pub const MAX_WAREHOUSES: u32 = WAREHOUSE_SITES.len() as u32;

/// Counts driving master-data generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterDataSpec {
    pub n_skus: u32,
    pub n_factories: u32,
    pub n_warehouses: u32,
    pub n_stores: u32,
}

impl Default for MasterDataSpec {
    fn default() -> Self {
        Self { n_skus: 250, n_factories: 3, n_warehouses: 2, n_stores: 80 }
    }
}

impl MasterDataSpec {
    pub fn validate(&self) -> GenResult<()> {
        if self.n_skus == 0 || self.n_factories == 0 || self.n_stores == 0 {
            return Err(GenError::config("n_skus, n_factories and n_stores must be positive"));
        }
        if self.n_warehouses == 0 || self.n_warehouses > MAX_WAREHOUSES {
            return Err(GenError::config(format!(
                "n_warehouses must be between 1 and {}",
                MAX_WAREHOUSES
            )));
        }
        Ok(())
    }
}

/// SKU catalog and location directory, with lookups by id and role
#[derive(Debug, Clone)]
pub struct MasterData {
    skus: Vec<Sku>,
    locations: Vec<Location>,
    sku_index: FxHashMap<SkuId, usize>,
}

impl MasterData {
    pub fn new(skus: Vec<Sku>, locations: Vec<Location>) -> Self {
        let sku_index = skus.iter().enumerate().map(|(i, s)| (s.sku_id.clone(), i)).collect();
        Self { skus, locations, sku_index }
    }

    pub fn skus(&self) -> &[Sku] {
        &self.skus
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn sku(&self, sku_id: &SkuId) -> Option<&Sku> {
        self.sku_index.get(sku_id).map(|&i| &self.skus[i])
    }

    /// Locations of one type, in directory order
    pub fn of_type(&self, location_type: LocationType) -> Vec<&Location> {
        self.locations.iter().filter(|l| l.location_type == location_type).collect()
    }

    pub fn factories(&self) -> Vec<&Location> {
        self.of_type(LocationType::Factory)
    }

    pub fn warehouses(&self) -> Vec<&Location> {
        self.of_type(LocationType::Warehouse)
    }

    pub fn stores(&self) -> Vec<&Location> {
        self.of_type(LocationType::Store)
    }
}

pub(crate) fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}

/// Cost and volume distributions per category: (cost mean, cost sd, vol mean, vol sd)
fn category_profile(category: Category) -> (f64, f64, f64, f64) {
    match category {
        Category::Garment => (18.0, 6.0, 0.004, 0.001),
        Category::Bag => (45.0, 14.0, 0.012, 0.004),
        Category::Accessory => (9.0, 3.0, 0.0015, 0.0006),
    }
}

/// Generate the SKU catalog.
///
/// Draw order: every category first, then cost and volume per SKU, then
/// every launch week.
pub fn generate_skus(n_skus: u32, draws: &mut DrawService) -> GenResult<Vec<Sku>> {
    let mut categories = Vec::with_capacity(n_skus as usize);
    for _ in 0..n_skus {
        categories.push(Category::ALL[draws.weighted_index(&CATEGORY_WEIGHTS)?]);
    }

    let mut costs = Vec::with_capacity(categories.len());
    for &category in &categories {
        let (cost_mean, cost_sd, vol_mean, vol_sd) = category_profile(category);
        let cost = draws.normal(cost_mean, cost_sd)?;
        let volume = draws.normal(vol_mean, vol_sd)?;
        costs.push((round_to(cost.max(2.0), 2), round_to(volume.max(0.0005), 5)));
    }

    let mut skus = Vec::with_capacity(categories.len());
    for (i, (category, (unit_cost, unit_volume_m3))) in categories.into_iter().zip(costs).enumerate() {
        skus.push(Sku {
            sku_id: SkuId(format!("SKU{:04}", i + 1)),
            category,
            unit_cost,
            unit_volume_m3,
            launch_week: draws.int_range(1, 18) as u32,
        });
    }
    Ok(skus)
}

/// Generate factories, the fixed warehouses, then stores
pub fn generate_locations(spec: &MasterDataSpec, draws: &mut DrawService) -> GenResult<Vec<Location>> {
    let mut locations = Vec::with_capacity((spec.n_factories + spec.n_warehouses + spec.n_stores) as usize);

    for i in 0..spec.n_factories {
        let lat = draws.uniform_range(10.0, 30.0);
        let lon = draws.uniform_range(100.0, 120.0);
        locations.push(Location {
            location_id: LocationId(format!("F{}", i + 1)),
            location_type: LocationType::Factory,
            region: Region::Asia,
            lat,
            lon,
        });
    }

    for &(id, region, lat, lon) in WAREHOUSE_SITES.iter().take(spec.n_warehouses as usize) {
        locations.push(Location {
            location_id: LocationId(id.to_string()),
            location_type: LocationType::Warehouse,
            region,
            lat,
            lon,
        });
    }

    for i in 0..spec.n_stores {
        let region = if draws.weighted_index(&STORE_REGION_WEIGHTS)? == 0 { Region::Eu } else { Region::Us };
        let (lat, lon) = match region {
            Region::Eu => (draws.normal(48.8, 3.5)?, draws.normal(2.3, 6.0)?),
            _ => (draws.normal(39.0, 4.0)?, draws.normal(-95.0, 10.0)?),
        };
        locations.push(Location {
            location_id: LocationId(format!("S{:03}", i + 1)),
            location_type: LocationType::Store,
            region,
            lat,
            lon,
        });
    }

    Ok(locations)
}

/// Generate the full master data set
pub fn generate_master_data(spec: &MasterDataSpec, draws: &mut DrawService) -> GenResult<MasterData> {
    spec.validate()?;
    let skus = generate_skus(spec.n_skus, draws)?;
    let locations = generate_locations(spec, draws)?;
    info!(skus = %skus.len(), locations = %locations.len(), "master_data_generated");
    Ok(MasterData::new(skus, locations))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64) -> MasterData {
        let mut draws = DrawService::new(seed);
        generate_master_data(&MasterDataSpec::default(), &mut draws).unwrap()
    }

    #[test]
    fn test_counts_and_ids() {
        let md = generate(42);
        assert_eq!(md.skus().len(), 250);
        assert_eq!(md.factories().len(), 3);
        assert_eq!(md.warehouses().len(), 2);
        assert_eq!(md.stores().len(), 80);
        assert_eq!(md.skus()[0].sku_id.0, "SKU0001");
        assert_eq!(md.skus()[249].sku_id.0, "SKU0250");
        assert_eq!(md.stores()[0].location_id.0, "S001");
        assert_eq!(md.factories()[2].location_id.0, "F3");
    }

    #[test]
    fn test_sku_attribute_floors() {
        let md = generate(7);
        for sku in md.skus() {
            assert!(sku.unit_cost >= 2.0);
            assert!(sku.unit_volume_m3 >= 0.0005);
            assert!((1..=17).contains(&sku.launch_week));
        }
    }

    #[test]
    fn test_category_mix() {
        let mut draws = DrawService::new(11);
        let skus = generate_skus(5_000, &mut draws).unwrap();
        let garments = skus.iter().filter(|s| s.category == Category::Garment).count();
        let frac = garments as f64 / 5_000.0;
        assert!((frac - 0.62).abs() < 0.03, "garment fraction {}", frac);
    }

    #[test]
    fn test_location_regions() {
        let md = generate(42);
        assert!(md.factories().iter().all(|f| f.region == Region::Asia));
        assert!(md.factories().iter().all(|f| (10.0..30.0).contains(&f.lat)));
        assert!(md.stores().iter().all(|s| matches!(s.region, Region::Eu | Region::Us)));
        let w1 = md.warehouses()[0];
        assert_eq!(w1.location_id.0, "W1");
        assert_eq!(w1.region, Region::Eu);
        assert_eq!(w1.lat, 50.1);
    }

    #[test]
    fn test_single_warehouse() {
        let spec = MasterDataSpec { n_warehouses: 1, ..MasterDataSpec::default() };
        let mut draws = DrawService::new(1);
        let md = generate_master_data(&spec, &mut draws).unwrap();
        assert_eq!(md.warehouses().len(), 1);
    }

    #[test]
    fn test_invalid_spec_rejected() {
        let mut draws = DrawService::new(1);
        for spec in [
            MasterDataSpec { n_skus: 0, ..MasterDataSpec::default() },
            MasterDataSpec { n_stores: 0, ..MasterDataSpec::default() },
            MasterDataSpec { n_warehouses: 3, ..MasterDataSpec::default() },
        ] {
            assert!(matches!(generate_master_data(&spec, &mut draws), Err(GenError::Config(_))));
        }
        assert_eq!(draws.draws(), 0);
    }

    #[test]
    fn test_sku_lookup() {
        let md = generate(42);
        let id = SkuId("SKU0100".to_string());
        assert_eq!(md.sku(&id).map(|s| &s.sku_id), Some(&id));
        assert!(md.sku(&SkuId("SKU9999".to_string())).is_none());
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(generate(5).skus(), generate(5).skus());
        assert_eq!(generate(5).locations(), generate(5).locations());
    }
}
