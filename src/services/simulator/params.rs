//! Stage-duration bounds and lane rules for the shipment simulator
//!
//! All durations are minutes. Every `DurationSpec` is drawn through
//! `DrawService::bounded_minutes`, so the bounds here are the only thing
//! standing between a draw and a non-monotonic record.

use crate::domain::types::Region;
use crate::error::{GenError, GenResult};
use crate::services::draws::DurationSpec;

fn check_probability(name: &str, p: f64) -> GenResult<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(GenError::config(format!("{} must be within [0, 1], got {}", name, p)));
    }
    Ok(())
}

fn check_hours(name: &str, (lo, hi): (u32, u32)) -> GenResult<()> {
    if lo >= hi || hi > 24 {
        return Err(GenError::config(format!("{} hours [{}, {}) are not a valid window", name, lo, hi)));
    }
    Ok(())
}

/// Factory -> warehouse air freight
#[derive(Debug, Clone, PartialEq)]
pub struct F2wParams {
    /// Planned departure hour window `[lo, hi)`
    pub departure_hours: (u32, u32),
    pub qty: DurationSpec,
    /// Planned door-to-door time before noise (~3 days)
    pub planned_transit_minutes: i64,
    pub planned_arrival_noise_sd: f64,
    pub planned_arrival_noise_bound: i64,
    pub pickup_jitter_sd: f64,
    pub pickup_jitter_bound: i64,
    pub export_clearance: DurationSpec,
    pub import_clearance: DurationSpec,
    /// Extra import clearance added when congestion is injected
    pub congestion_extra: DurationSpec,
    pub congestion_probability_eu: f64,
    pub congestion_probability_other: f64,
    /// Export clearance longer than this is blamed on export
    pub slow_export_minutes: i64,
    pub transfer_gap: DurationSpec,
    pub ground_to_air_gap: DurationSpec,
    pub flight: DurationSpec,
    pub unload_gap: DurationSpec,
    pub final_transfer_gap: DurationSpec,
}

impl Default for F2wParams {
    fn default() -> Self {
        Self {
            departure_hours: (6, 14),
            qty: DurationSpec::new(180.0, 90.0, 20, 800),
            planned_transit_minutes: 3 * 24 * 60,
            planned_arrival_noise_sd: 8.0 * 60.0,
            planned_arrival_noise_bound: 24 * 60,
            pickup_jitter_sd: 90.0,
            pickup_jitter_bound: 4 * 60,
            export_clearance: DurationSpec::new(6.0 * 60.0, 3.0 * 60.0, 60, 16 * 60),
            import_clearance: DurationSpec::new(8.0 * 60.0, 4.0 * 60.0, 90, 24 * 60),
            congestion_extra: DurationSpec::new(10.0 * 60.0, 4.0 * 60.0, 180, 22 * 60),
            congestion_probability_eu: 0.10,
            congestion_probability_other: 0.12,
            slow_export_minutes: 10 * 60,
            transfer_gap: DurationSpec::new(60.0, 30.0, 10, 3 * 60),
            ground_to_air_gap: DurationSpec::new(6.0 * 60.0, 2.0 * 60.0, 60, 16 * 60),
            flight: DurationSpec::new(11.0 * 60.0, 2.0 * 60.0, 6 * 60, 18 * 60),
            unload_gap: DurationSpec::new(90.0, 60.0, 20, 5 * 60),
            final_transfer_gap: DurationSpec::new(4.0 * 60.0, 2.0 * 60.0, 60, 12 * 60),
        }
    }
}

impl F2wParams {
    pub fn congestion_probability(&self, region: Region) -> f64 {
        match region {
            Region::Eu => self.congestion_probability_eu,
            _ => self.congestion_probability_other,
        }
    }

    pub fn validate(&self) -> GenResult<()> {
        check_hours("f2w.departure", self.departure_hours)?;
        self.qty.validate_positive("f2w.qty")?;
        if self.planned_transit_minutes <= 0 {
            return Err(GenError::config("f2w.planned_transit_minutes must be positive"));
        }
        if !self.planned_arrival_noise_sd.is_finite() || self.planned_arrival_noise_sd < 0.0 {
            return Err(GenError::config("f2w.planned_arrival_noise_sd must be >= 0"));
        }
        if !self.pickup_jitter_sd.is_finite() || self.pickup_jitter_sd < 0.0 {
            return Err(GenError::config("f2w.pickup_jitter_sd must be >= 0"));
        }
        check_probability("f2w.congestion_probability_eu", self.congestion_probability_eu)?;
        check_probability("f2w.congestion_probability_other", self.congestion_probability_other)?;

        self.export_clearance.validate_positive("f2w.export_clearance")?;
        self.import_clearance.validate_positive("f2w.import_clearance")?;
        self.flight.validate_positive("f2w.flight")?;
        self.congestion_extra.validate("f2w.congestion_extra")?;
        self.transfer_gap.validate("f2w.transfer_gap")?;
        self.ground_to_air_gap.validate("f2w.ground_to_air_gap")?;
        self.unload_gap.validate("f2w.unload_gap")?;
        self.final_transfer_gap.validate("f2w.final_transfer_gap")?;
        Ok(())
    }
}

/// Warehouse -> store replenishment
#[derive(Debug, Clone, PartialEq)]
pub struct W2sParams {
    pub departure_hours: (u32, u32),
    pub qty: DurationSpec,
    pub planned_transit: DurationSpec,
    /// Added to the 1.0 workload multiplier in promo weeks
    pub promo_workload_uplift: f64,
    pub pick: DurationSpec,
    pub pack: DurationSpec,
    /// Pick starts this long before planned departure
    pub lead_gap: DurationSpec,
    pub handoff_gap: DurationSpec,
    /// Packing that ends after this hour misses the day's truck
    pub cutoff_hour: u32,
    /// Missed-cutoff shipments leave the next day within this hour
    pub next_day_ship_hour: u32,
    pub same_day_gap: DurationSpec,
    pub transit: DurationSpec,
}

impl Default for W2sParams {
    fn default() -> Self {
        Self {
            departure_hours: (8, 18),
            qty: DurationSpec::new(22.0, 12.0, 1, 120),
            planned_transit: DurationSpec::new(30.0 * 60.0, 6.0 * 60.0, 60, 60 * 60),
            promo_workload_uplift: 0.7,
            pick: DurationSpec::new(45.0, 20.0, 10, 4 * 60),
            pack: DurationSpec::new(55.0, 25.0, 10, 6 * 60),
            lead_gap: DurationSpec::new(140.0, 60.0, 30, 7 * 60),
            handoff_gap: DurationSpec::new(20.0, 15.0, 0, 2 * 60),
            cutoff_hour: 18,
            next_day_ship_hour: 9,
            same_day_gap: DurationSpec::new(30.0, 25.0, 0, 3 * 60),
            transit: DurationSpec::new(18.0 * 60.0, 6.0 * 60.0, 4 * 60, 48 * 60),
        }
    }
}

impl W2sParams {
    pub fn workload_multiplier(&self, promo_week: bool) -> f64 {
        if promo_week {
            1.0 + self.promo_workload_uplift
        } else {
            1.0
        }
    }

    pub fn validate(&self) -> GenResult<()> {
        check_hours("w2s.departure", self.departure_hours)?;
        self.qty.validate_positive("w2s.qty")?;
        self.planned_transit.validate_positive("w2s.planned_transit")?;
        if !self.promo_workload_uplift.is_finite() || self.promo_workload_uplift < 0.0 {
            return Err(GenError::config("w2s.promo_workload_uplift must be >= 0"));
        }
        self.pick.validate_positive("w2s.pick")?;
        self.pack.validate_positive("w2s.pack")?;
        self.transit.validate_positive("w2s.transit")?;
        self.lead_gap.validate("w2s.lead_gap")?;
        self.handoff_gap.validate("w2s.handoff_gap")?;
        self.same_day_gap.validate("w2s.same_day_gap")?;
        if self.cutoff_hour > 23 || self.next_day_ship_hour > 23 {
            return Err(GenError::config("w2s cutoff and next-day ship hours must be < 24"));
        }
        Ok(())
    }
}

/// Everything the shipment simulator needs beyond master data and horizon
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorParams {
    pub shipments_per_day: u32,
    /// Daily volume noise sd as a fraction of `shipments_per_day`
    pub volume_noise_ratio: f64,
    /// Noise is clamped to this many standard deviations
    pub volume_noise_sigmas: f64,
    /// Minimum daily volume as a fraction of `shipments_per_day`
    pub volume_floor_ratio: f64,
    pub f2w_probability: f64,
    pub promo_weeks_ratio: f64,
    pub f2w: F2wParams,
    pub w2s: W2sParams,
}

impl Default for SimulatorParams {
    fn default() -> Self {
        Self {
            shipments_per_day: 120,
            volume_noise_ratio: 0.12,
            volume_noise_sigmas: 3.0,
            volume_floor_ratio: 0.25,
            f2w_probability: 0.38,
            promo_weeks_ratio: 0.18,
            f2w: F2wParams::default(),
            w2s: W2sParams::default(),
        }
    }
}

impl SimulatorParams {
    pub fn validate(&self) -> GenResult<()> {
        if self.shipments_per_day == 0 {
            return Err(GenError::config("shipments_per_day must be positive"));
        }
        if !self.volume_noise_ratio.is_finite() || self.volume_noise_ratio < 0.0 {
            return Err(GenError::config("volume_noise_ratio must be >= 0"));
        }
        if !self.volume_noise_sigmas.is_finite() || self.volume_noise_sigmas < 0.0 {
            return Err(GenError::config("volume_noise_sigmas must be >= 0"));
        }
        if !(self.volume_floor_ratio > 0.0 && self.volume_floor_ratio <= 1.0) {
            return Err(GenError::config("volume_floor_ratio must be within (0, 1]"));
        }
        check_probability("f2w_probability", self.f2w_probability)?;
        check_probability("promo_weeks_ratio", self.promo_weeks_ratio)?;
        self.f2w.validate()?;
        self.w2s.validate()?;
        Ok(())
    }

    /// Lowest number of shipments any day may have (at least one)
    pub fn daily_floor(&self) -> i64 {
        ((f64::from(self.shipments_per_day) * self.volume_floor_ratio).ceil() as i64).max(1)
    }
}
