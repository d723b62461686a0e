//! Weekly sales and inventory snapshots per store
//!
//! Each (week, store) pair carries a random SKU subset. Expected demand is
//! category base x region x promo x seasonality; units sold, price and
//! on-hand levels are single draws around it. The promo calendar here is
//! drawn independently of the shipment simulator's.

use crate::domain::retail::{InventoryRecord, SalesRecord};
use crate::domain::types::{Category, Location, Region, Sku};
use crate::error::{GenError, GenResult};
use crate::services::calendar::{Horizon, PromoCalendar};
use crate::services::draws::{clamp_round, DrawService};
use crate::services::master_data::{round_to, MasterData};
use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;
use tracing::{debug, info};

/// Tunables of the sales and inventory synthesizer
#[derive(Debug, Clone, PartialEq)]
pub struct SalesParams {
    pub promo_weeks_ratio: f64,
    /// Share of the catalog a store carries in a given week
    pub carried_ratio: f64,
    pub carried_min: i64,
    pub carried_max: i64,
    /// Chance a store joins a promo week
    pub promo_store_probability: f64,
    pub promo_demand_uplift: f64,
    pub us_demand_multiplier: f64,
    pub seasonal_amplitude: f64,
    /// Units sold sd as a fraction of expected units
    pub demand_cv: f64,
    pub max_units_sold: i64,
    pub price_cv: f64,
    pub price_floor: f64,
    pub promo_discount: (f64, f64),
    pub safety_factor: f64,
    pub safety_stock_bounds: (i64, i64),
    pub reorder_point_bounds: (i64, i64),
    pub on_hand_ratio: f64,
    pub on_hand_cv: f64,
    pub max_on_hand: i64,
}

impl Default for SalesParams {
    fn default() -> Self {
        Self {
            promo_weeks_ratio: 0.18,
            carried_ratio: 0.12,
            carried_min: 12,
            carried_max: 60,
            promo_store_probability: 0.55,
            promo_demand_uplift: 1.55,
            us_demand_multiplier: 1.05,
            seasonal_amplitude: 0.18,
            demand_cv: 0.55,
            max_units_sold: 80,
            price_cv: 0.12,
            price_floor: 5.0,
            promo_discount: (0.75, 0.9),
            safety_factor: 0.35,
            safety_stock_bounds: (2, 60),
            reorder_point_bounds: (5, 200),
            on_hand_ratio: 0.9,
            on_hand_cv: 0.35,
            max_on_hand: 350,
        }
    }
}

impl SalesParams {
    pub fn validate(&self) -> GenResult<()> {
        for (name, p) in [
            ("promo_weeks_ratio", self.promo_weeks_ratio),
            ("carried_ratio", self.carried_ratio),
            ("promo_store_probability", self.promo_store_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GenError::config(format!("{} must be within [0, 1], got {}", name, p)));
            }
        }
        if self.carried_min < 1 || self.carried_min > self.carried_max {
            return Err(GenError::config("carried SKU bounds must satisfy 1 <= min <= max"));
        }
        let (lo, hi) = self.promo_discount;
        if !(lo > 0.0 && lo <= hi && hi <= 1.0) {
            return Err(GenError::config("promo_discount must satisfy 0 < lo <= hi <= 1"));
        }
        if self.price_floor <= 0.0 {
            return Err(GenError::config("price_floor must be positive"));
        }
        let (ss_lo, ss_hi) = self.safety_stock_bounds;
        let (rp_lo, rp_hi) = self.reorder_point_bounds;
        if ss_lo < 0 || ss_lo > ss_hi || rp_lo > rp_hi || rp_hi < ss_hi {
            return Err(GenError::config(
                "stock bounds must satisfy 0 <= ss_min <= ss_max <= rp_max and rp_min <= rp_max",
            ));
        }
        Ok(())
    }

    /// Number of SKUs a store carries per week, capped at the catalog size
    pub fn carried_count(&self, n_skus: usize) -> usize {
        let n = clamp_round(n_skus as f64 * self.carried_ratio, self.carried_min, self.carried_max);
        (n as usize).min(n_skus)
    }

    /// `1 + amplitude * sin(2 pi * day_of_year / 365)`
    pub fn seasonal_multiplier(&self, week_start: NaiveDate) -> f64 {
        1.0 + self.seasonal_amplitude * (f64::from(week_start.ordinal()) / 365.0 * 2.0 * PI).sin()
    }

    pub fn expected_units(&self, category: Category, region: Region, promo: bool, week_start: NaiveDate) -> f64 {
        let region_mult = if region == Region::Us { self.us_demand_multiplier } else { 1.0 };
        let promo_mult = if promo { self.promo_demand_uplift } else { 1.0 };
        base_weekly_units(category) * region_mult * promo_mult * self.seasonal_multiplier(week_start)
    }
}

fn base_weekly_units(category: Category) -> f64 {
    match category {
        Category::Garment => 4.5,
        Category::Bag => 1.4,
        Category::Accessory => 2.3,
    }
}

fn list_price(category: Category) -> f64 {
    match category {
        Category::Bag => 55.0,
        Category::Garment => 30.0,
        Category::Accessory => 18.0,
    }
}

/// Replenishment lead time in weeks
fn lead_time_weeks(region: Region) -> f64 {
    match region {
        Region::Eu => 2.0,
        _ => 3.0,
    }
}

/// Sales and inventory rows, one pair per (week, store, carried SKU)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesInventory {
    pub sales: Vec<SalesRecord>,
    pub inventory: Vec<InventoryRecord>,
}

struct Synthesizer<'a> {
    params: &'a SalesParams,
    skus: &'a [Sku],
    carried: usize,
}

impl Synthesizer<'_> {
    fn store_week(
        &self,
        week_start: NaiveDate,
        store: &Location,
        promo_week: bool,
        out: &mut SalesInventory,
        draws: &mut DrawService,
    ) -> GenResult<()> {
        let p = self.params;
        let carried = draws.sample_indices(self.skus.len(), self.carried);
        // No draw for stores outside promo weeks
        let promo_flag = promo_week && draws.chance(p.promo_store_probability);

        for idx in carried {
            let sku = &self.skus[idx];
            let mean_units = p.expected_units(sku.category, store.region, promo_flag, week_start);
            let units = clamp_round(draws.normal(mean_units, mean_units * p.demand_cv)?.abs(), 0, p.max_units_sold);

            let price = list_price(sku.category);
            let mut unit_price = draws.normal(price, price * p.price_cv)?.max(p.price_floor);
            if promo_flag {
                let (lo, hi) = p.promo_discount;
                unit_price *= draws.uniform_range(lo, hi);
            }

            out.sales.push(SalesRecord {
                week_start,
                store_id: store.location_id.clone(),
                sku_id: sku.sku_id.clone(),
                category: sku.category,
                units_sold: units as u32,
                unit_price: round_to(unit_price, 2),
                promo_flag,
            });

            let lead_time = lead_time_weeks(store.region);
            let (ss_lo, ss_hi) = p.safety_stock_bounds;
            let (rp_lo, rp_hi) = p.reorder_point_bounds;
            let safety_stock = clamp_round(mean_units * lead_time * p.safety_factor, ss_lo, ss_hi);
            let reorder_point = clamp_round(mean_units * lead_time + safety_stock as f64, rp_lo, rp_hi);
            let rp = reorder_point as f64;
            let on_hand = clamp_round(
                draws.normal(rp * p.on_hand_ratio, rp * p.on_hand_cv)?.abs(),
                0,
                p.max_on_hand,
            );

            out.inventory.push(InventoryRecord {
                week_start,
                store_id: store.location_id.clone(),
                sku_id: sku.sku_id.clone(),
                on_hand_units: on_hand as u32,
                safety_stock: safety_stock as u32,
                reorder_point: reorder_point as u32,
            });
        }
        Ok(())
    }
}

/// Generate weekly sales and inventory for every store.
///
/// Draw order: promo calendar, then per week and per store (directory
/// order) the carried subset, the promo flag, and per SKU units, price,
/// discount (promo only) and on-hand.
pub fn generate_sales_inventory(
    params: &SalesParams,
    master: &MasterData,
    horizon: Horizon,
    draws: &mut DrawService,
) -> GenResult<SalesInventory> {
    params.validate()?;
    let stores = master.stores();
    if master.skus().is_empty() || stores.is_empty() {
        return Err(GenError::config("sales need at least one SKU and one store"));
    }

    let weeks = horizon.weeks();
    let promo = PromoCalendar::draw(&weeks, params.promo_weeks_ratio, draws);
    debug!(promo_weeks = %promo.len(), "sales_promo_calendar_drawn");

    let synth = Synthesizer {
        params,
        skus: master.skus(),
        carried: params.carried_count(master.skus().len()),
    };
    let rows = weeks.len() * stores.len() * synth.carried;
    let mut out = SalesInventory { sales: Vec::with_capacity(rows), inventory: Vec::with_capacity(rows) };

    for &week_start in &weeks {
        let promo_week = promo.is_promo_week(week_start);
        for &store in &stores {
            synth.store_week(week_start, store, promo_week, &mut out, draws)?;
        }
    }

    info!(
        weeks = %weeks.len(),
        stores = %stores.len(),
        sales_rows = %out.sales.len(),
        inventory_rows = %out.inventory.len(),
        "sales_inventory_generated"
    );
    Ok(out)
}
