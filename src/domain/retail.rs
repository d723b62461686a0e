//! Weekly sales and inventory snapshot records

use crate::domain::types::{Category, LocationId, SkuId};
use chrono::NaiveDate;
use serde::Serialize;

/// Units sold of one SKU at one store in one week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub week_start: NaiveDate,
    pub store_id: LocationId,
    pub sku_id: SkuId,
    pub category: Category,
    pub units_sold: u32,
    pub unit_price: f64,
    pub promo_flag: bool,
}

/// On-hand level and reorder policy of one SKU at one store in one week.
/// `reorder_point >= safety_stock` holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRecord {
    pub week_start: NaiveDate,
    pub store_id: LocationId,
    pub sku_id: SkuId,
    pub on_hand_units: u32,
    pub safety_stock: u32,
    pub reorder_point: u32,
}
