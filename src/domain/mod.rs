//! Domain models - generated records and their vocabularies
//!
//! This module contains the row types every dataset is built from:
//! - `Sku`, `Location` - master data and its enums
//! - `Shipment` - header plus lane-specific stage timestamps
//! - `SalesRecord`, `InventoryRecord` - weekly store snapshots

pub mod retail;
pub mod shipment;
pub mod types;

// Re-export commonly used types at module level
pub use retail::{InventoryRecord, SalesRecord};
pub use shipment::{
    DelayCause, DelayReason, F2wStages, Lane, LaneStages, LateStage, Shipment, ShipmentHeader,
    ShipmentRow, W2sStages,
};
pub use types::{Category, Location, LocationId, LocationType, Region, Sku, SkuId};
