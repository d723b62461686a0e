//! shipgen library
//!
//! Synthetic logistics datasets: master data, shipment lifecycles on the
//! F2W and W2S lanes, weekly sales and inventory. Exposes modules for
//! integration testing and binary reuse.

pub mod domain;
pub mod error;
pub mod infra;
pub mod io;
pub mod services;

pub use error::{GenError, GenResult};
