//! Run summary statistics
//!
//! Computed once from the generated datasets, logged, and written next to
//! them as `run_summary.json`.

use crate::domain::shipment::{DelayCause, Lane, Shipment};
use crate::services::generation::Datasets;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Delay histogram bucket boundaries (minutes, inclusive upper bounds)
/// Buckets: ≤-240, ≤0, ≤60, ≤240, ≤720, ≤1440, ≤2160, ≤2880, ≤4320, ≤5760, >5760
const DELAY_BOUNDS: [i64; 10] = [-240, 0, 60, 240, 720, 1440, 2160, 2880, 4320, 5760];
const NUM_BUCKETS: usize = 11;

/// Reported upper bound per bucket (last bucket uses 2x the previous bound)
const DELAY_UPPER_BOUNDS: [i64; NUM_BUCKETS] =
    [-240, 0, 60, 240, 720, 1440, 2160, 2880, 4320, 5760, 11520];

/// Compute bucket index for a delay value using binary search
#[inline]
fn bucket_index(delay_minutes: i64) -> usize {
    DELAY_BOUNDS.partition_point(|&bound| bound < delay_minutes)
}

/// Upper bound of the bucket containing the percentile
fn percentile_from_buckets(buckets: &[u64; NUM_BUCKETS], percentile: f64) -> i64 {
    let total: u64 = buckets.iter().sum();
    if total == 0 {
        return 0;
    }

    let target = ((total as f64 * percentile) as u64).max(1);
    let mut cumulative = 0u64;
    for (i, &count) in buckets.iter().enumerate() {
        cumulative += count;
        if cumulative >= target {
            return DELAY_UPPER_BOUNDS[i];
        }
    }
    DELAY_UPPER_BOUNDS[NUM_BUCKETS - 1]
}

/// Per-lane counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaneStats {
    pub shipments: u64,
    pub late: u64,
    pub avg_delay_minutes: f64,
    pub max_delay_minutes: i64,
    #[serde(skip)]
    delay_sum: i64,
}

impl LaneStats {
    fn record(&mut self, shipment: &Shipment) {
        let delay = shipment.header.delay_minutes;
        if self.shipments == 0 || delay > self.max_delay_minutes {
            self.max_delay_minutes = delay;
        }
        self.shipments += 1;
        self.delay_sum += delay;
        if shipment.header.delivered_late {
            self.late += 1;
        }
    }

    fn finish(&mut self) {
        if self.shipments > 0 {
            self.avg_delay_minutes = self.delay_sum as f64 / self.shipments as f64;
        }
    }

    /// Late share in [0, 1]
    pub fn late_rate(&self) -> f64 {
        if self.shipments == 0 {
            return 0.0;
        }
        self.late as f64 / self.shipments as f64
    }
}

/// Summary of one generation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub seed: u64,
    pub draws: u64,
    pub skus: usize,
    pub locations: usize,
    pub shipments: usize,
    pub f2w: LaneStats,
    pub w2s: LaneStats,
    pub customs_congestion: u64,
    pub missed_cutoff: u64,
    pub promo_surge: u64,
    /// Shipments per SKU category, keyed by wire name
    pub by_category: BTreeMap<&'static str, u64>,
    /// Late shipments per destination region
    pub late_by_region: BTreeMap<&'static str, u64>,
    /// Shipments per blamed stage (`ON_TIME` included)
    pub by_late_stage: BTreeMap<&'static str, u64>,
    pub sales_rows: usize,
    pub inventory_rows: usize,
    /// Bounds: ≤-240, ≤0, ≤60, ≤240, ≤720, ≤1440, ≤2160, ≤2880, ≤4320, ≤5760, >5760 min
    pub delay_buckets: [u64; NUM_BUCKETS],
    pub delay_p50_minutes: i64,
    pub delay_p95_minutes: i64,
}

impl RunStats {
    pub fn from_datasets(seed: u64, datasets: &Datasets) -> Self {
        let mut stats = Self {
            seed,
            draws: datasets.draws,
            skus: datasets.master.skus().len(),
            locations: datasets.master.locations().len(),
            shipments: datasets.shipments.len(),
            sales_rows: datasets.sales.len(),
            inventory_rows: datasets.inventory.len(),
            ..Self::default()
        };

        for shipment in &datasets.shipments {
            stats.record(shipment);
        }
        stats.f2w.finish();
        stats.w2s.finish();
        stats.delay_p50_minutes = percentile_from_buckets(&stats.delay_buckets, 0.50);
        stats.delay_p95_minutes = percentile_from_buckets(&stats.delay_buckets, 0.95);
        stats
    }

    fn record(&mut self, shipment: &Shipment) {
        match shipment.lane() {
            Lane::F2W => self.f2w.record(shipment),
            Lane::W2S => self.w2s.record(shipment),
        }

        let reason = shipment.header.delay_reason;
        match reason.cause {
            DelayCause::CustomsCongestion => self.customs_congestion += 1,
            DelayCause::MissedCutoffPacking => self.missed_cutoff += 1,
            DelayCause::NormalVariance => {}
        }
        if reason.promo_surge {
            self.promo_surge += 1;
        }

        let header = &shipment.header;
        *self.by_category.entry(header.category.as_str()).or_default() += 1;
        *self.by_late_stage.entry(header.late_stage.as_str()).or_default() += 1;
        if header.delivered_late {
            *self.late_by_region.entry(header.region.as_str()).or_default() += 1;
        }

        self.delay_buckets[bucket_index(shipment.header.delay_minutes)] += 1;
    }

    pub fn log(&self) {
        info!(
            seed = %self.seed,
            draws = %self.draws,
            skus = %self.skus,
            locations = %self.locations,
            shipments = %self.shipments,
            f2w = %self.f2w.shipments,
            f2w_late_pct = format!("{:.1}", self.f2w.late_rate() * 100.0),
            w2s = %self.w2s.shipments,
            w2s_late_pct = format!("{:.1}", self.w2s.late_rate() * 100.0),
            customs_congestion = %self.customs_congestion,
            missed_cutoff = %self.missed_cutoff,
            promo_surge = %self.promo_surge,
            delay_p50_min = %self.delay_p50_minutes,
            delay_p95_min = %self.delay_p95_minutes,
            sales_rows = %self.sales_rows,
            inventory_rows = %self.inventory_rows,
            "run_summary"
        );
        debug!(
            by_category = ?self.by_category,
            late_by_region = ?self.late_by_region,
            by_late_stage = ?self.by_late_stage,
            "run_summary_breakdown"
        );
    }
}
