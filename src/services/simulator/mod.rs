//! Shipment lifecycle simulation
//!
//! For each day in the horizon the simulator emits a noisy number of
//! shipments. Each one is assigned a lane and carried through that lane's
//! stage cascade:
//! - F2W: pickup, export clearance, flight, import clearance (optionally
//!   congested), warehouse receipt
//! - W2S: pick, pack, cutoff check, ship-out, store receipt
//!
//! Records are checked against their ordering invariants before they are
//! kept; the first violation aborts the run.

mod f2w;
pub mod params;
mod w2s;

pub use params::{F2wParams, SimulatorParams, W2sParams};

use crate::domain::shipment::{Lane, Shipment};
use crate::domain::types::{Location, Sku};
use crate::error::{GenError, GenResult};
use crate::services::calendar::{Horizon, PromoCalendar};
use crate::services::draws::DrawService;
use crate::services::master_data::MasterData;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

/// Timestamp at `hour:minute` on `day`
pub(crate) fn at_time(day: NaiveDate, hour: u32, minute: u32) -> GenResult<NaiveDateTime> {
    day.and_hms_opt(hour, minute, 0)
        .ok_or_else(|| GenError::invariant(day.to_string(), format!("invalid time {}:{:02}", hour, minute)))
}

#[inline]
pub(crate) fn plus_minutes(ts: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    ts + Duration::minutes(minutes)
}

/// Generates shipment records from master data over a horizon
pub struct ShipmentSimulator<'a> {
    pub(crate) params: &'a SimulatorParams,
    pub(crate) horizon: Horizon,
    pub(crate) skus: &'a [Sku],
    pub(crate) factories: Vec<&'a Location>,
    pub(crate) warehouses: Vec<&'a Location>,
    pub(crate) stores: Vec<&'a Location>,
    /// Drawn once per run, before the first day
    pub(crate) promo: PromoCalendar,
    pub(crate) issued_ids: FxHashSet<String>,
}

impl<'a> ShipmentSimulator<'a> {
    /// Validate inputs and draw the promo calendar.
    ///
    /// Rejected configuration returns before any draw is taken.
    pub fn new(
        params: &'a SimulatorParams,
        master: &'a MasterData,
        horizon: Horizon,
        draws: &mut DrawService,
    ) -> GenResult<Self> {
        params.validate()?;
        if horizon.num_days() <= 0 {
            return Err(GenError::config("horizon has no days"));
        }

        let factories = master.factories();
        let warehouses = master.warehouses();
        let stores = master.stores();
        if master.skus().is_empty() || factories.is_empty() || warehouses.is_empty() || stores.is_empty() {
            return Err(GenError::config(
                "master data needs at least one SKU, factory, warehouse and store",
            ));
        }

        let promo = PromoCalendar::draw(&horizon.weeks(), params.promo_weeks_ratio, draws);
        debug!(promo_weeks = %promo.len(), "shipment_promo_calendar_drawn");

        Ok(Self {
            params,
            horizon,
            skus: master.skus(),
            factories,
            warehouses,
            stores,
            promo,
            issued_ids: FxHashSet::default(),
        })
    }

    pub fn promo_calendar(&self) -> &PromoCalendar {
        &self.promo
    }

    /// Simulate every day of the horizon in order
    pub fn run(&mut self, draws: &mut DrawService) -> GenResult<Vec<Shipment>> {
        let expected = self.horizon.num_days() as usize * self.params.shipments_per_day as usize;
        let mut shipments = Vec::with_capacity(expected);

        for day in self.horizon.days() {
            let n = self.daily_volume(draws)?;
            for _ in 0..n {
                shipments.push(self.simulate_shipment(day, draws)?);
            }
            debug!(day = %day, shipments = %n, "day_simulated");
        }

        info!(
            days = %self.horizon.num_days(),
            shipments = %shipments.len(),
            draws = %draws.draws(),
            "shipments_generated"
        );
        Ok(shipments)
    }

    /// Base target plus bounded normal noise, floored so no day is empty
    pub(crate) fn daily_volume(&self, draws: &mut DrawService) -> GenResult<usize> {
        let base = f64::from(self.params.shipments_per_day);
        let sd = base * self.params.volume_noise_ratio;
        let bound = (sd * self.params.volume_noise_sigmas).floor() as i64;
        let noise = draws.bounded_jitter(0.0, sd, bound)?;
        let n = (i64::from(self.params.shipments_per_day) + noise).max(self.params.daily_floor());
        Ok(n as usize)
    }

    /// One shipment: id, SKU, lane, then the lane cascade
    pub(crate) fn simulate_shipment(&mut self, day: NaiveDate, draws: &mut DrawService) -> GenResult<Shipment> {
        let shipment_id = self.next_shipment_id(draws);
        let skus = self.skus;
        let sku = draws
            .pick(skus)
            .ok_or_else(|| GenError::config("SKU catalog is empty"))?;

        let lane = if draws.chance(self.params.f2w_probability) { Lane::F2W } else { Lane::W2S };

        let shipment = match lane {
            Lane::F2W => self.simulate_f2w(shipment_id, sku, day, draws)?,
            Lane::W2S => self.simulate_w2s(shipment_id, sku, day, draws)?,
        };

        shipment.check_invariants()?;
        Ok(shipment)
    }

    /// Short opaque id, re-drawn on the rare collision
    fn next_shipment_id(&mut self, draws: &mut DrawService) -> String {
        loop {
            let id = draws.token();
            if self.issued_ids.insert(id.clone()) {
                return id;
            }
            debug!(shipment_id = %id, "shipment_id_collision");
        }
    }
}

/// Convenience wrapper: build a simulator and run it
pub fn simulate_shipments(
    params: &SimulatorParams,
    master: &MasterData,
    horizon: Horizon,
    draws: &mut DrawService,
) -> GenResult<Vec<Shipment>> {
    ShipmentSimulator::new(params, master, horizon, draws)?.run(draws)
}
