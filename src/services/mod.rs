//! Services - generation logic
//!
//! - `draws` - Seeded random draw service and the bounded-duration primitive
//! - `calendar` - Horizon days/weeks and promo calendars
//! - `master_data` - SKU catalog and location directory
//! - `simulator` - Shipment lifecycle simulation (F2W and W2S cascades)
//! - `sales_inventory` - Weekly store sales and inventory snapshots
//! - `generation` - Runs all generators on one draw stream

pub mod calendar;
pub mod draws;
pub mod generation;
pub mod master_data;
pub mod sales_inventory;
pub mod simulator;

// Re-export commonly used types
pub use calendar::{Horizon, PromoCalendar};
pub use draws::{DrawService, DurationSpec};
pub use generation::{generate, Datasets, GenerationSettings};
pub use master_data::{generate_master_data, MasterData, MasterDataSpec};
pub use sales_inventory::{generate_sales_inventory, SalesInventory, SalesParams};
pub use simulator::{simulate_shipments, ShipmentSimulator, SimulatorParams};
