//! Shared master-data types: SKUs, locations and their enums

use serde::{Deserialize, Serialize};

/// Newtype wrapper for SKU identifiers (e.g. `SKU0042`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkuId(pub String);

impl std::fmt::Display for SkuId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype wrapper for location identifiers (e.g. `F1`, `W2`, `S017`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub String);

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Garment,
    Bag,
    Accessory,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Garment, Category::Bag, Category::Accessory];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Garment => "GARMENT",
            Category::Bag => "BAG",
            Category::Accessory => "ACCESSORY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    Factory,
    Warehouse,
    Store,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Region {
    Asia,
    Eu,
    Us,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Asia => "ASIA",
            Region::Eu => "EU",
            Region::Us => "US",
        }
    }
}

/// Catalog entry. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sku {
    pub sku_id: SkuId,
    pub category: Category,
    pub unit_cost: f64,
    pub unit_volume_m3: f64,
    pub launch_week: u32,
}

/// Directory entry. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: LocationId,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub region: Region,
    pub lat: f64,
    pub lon: f64,
}
