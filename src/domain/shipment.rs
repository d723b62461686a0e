//! Shipment data model: a shared header plus one lane-specific stage group
//!
//! The two lanes populate disjoint timestamp groups. Holding them in
//! `LaneStages` means a record cannot carry both, and the flat tabular shape
//! only exists at the output edge (`ShipmentRow`).

use crate::domain::types::{Category, LocationId, Region, SkuId};
use crate::error::{GenError, GenResult};
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// F2W shipments are late once more than 12 hours behind plan
pub const F2W_LATE_THRESHOLD_MINUTES: i64 = 12 * 60;

/// W2S shipments are late once more than 4 hours behind plan
pub const W2S_LATE_THRESHOLD_MINUTES: i64 = 4 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Lane {
    /// Factory to warehouse, air freight through customs
    #[serde(rename = "F2W")]
    F2W,
    /// Warehouse to store replenishment
    #[serde(rename = "W2S")]
    W2S,
}

impl Lane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lane::F2W => "F2W",
            Lane::W2S => "W2S",
        }
    }

    #[inline]
    pub fn late_threshold_minutes(&self) -> i64 {
        match self {
            Lane::F2W => F2W_LATE_THRESHOLD_MINUTES,
            Lane::W2S => W2S_LATE_THRESHOLD_MINUTES,
        }
    }

    /// Strictly greater than the threshold; landing exactly on it is on time
    #[inline]
    pub fn is_late(&self, delay_minutes: i64) -> bool {
        delay_minutes > self.late_threshold_minutes()
    }
}

/// Stage blamed for lateness. F2W uses the clearance/transport vocabulary,
/// W2S uses packing/transport/on-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LateStage {
    ImportClearance,
    ExportClearance,
    Transport,
    Packing,
    OnTime,
}

impl LateStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LateStage::ImportClearance => "IMPORT_CLEARANCE",
            LateStage::ExportClearance => "EXPORT_CLEARANCE",
            LateStage::Transport => "TRANSPORT",
            LateStage::Packing => "PACKING",
            LateStage::OnTime => "ON_TIME",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelayCause {
    CustomsCongestion,
    MissedCutoffPacking,
    NormalVariance,
}

impl DelayCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelayCause::CustomsCongestion => "CUSTOMS_CONGESTION",
            DelayCause::MissedCutoffPacking => "MISSED_CUTOFF_PACKING",
            DelayCause::NormalVariance => "NORMAL_VARIANCE",
        }
    }
}

/// Base cause plus an optional promo-surge suffix
/// (`MISSED_CUTOFF_PACKING_PROMO_SURGE`, `NORMAL_VARIANCE_PROMO_SURGE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelayReason {
    pub cause: DelayCause,
    pub promo_surge: bool,
}

impl DelayReason {
    pub fn new(cause: DelayCause) -> Self {
        Self { cause, promo_surge: false }
    }

    pub fn with_promo_surge(mut self, promo_surge: bool) -> Self {
        self.promo_surge = promo_surge;
        self
    }
}

impl std::fmt::Display for DelayReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.promo_surge {
            write!(f, "{}_PROMO_SURGE", self.cause.as_str())
        } else {
            f.write_str(self.cause.as_str())
        }
    }
}

impl Serialize for DelayReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fields common to both lanes
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentHeader {
    pub shipment_id: String,
    pub sku_id: SkuId,
    pub category: Category,
    pub origin: LocationId,
    pub destination: LocationId,
    pub region: Region,
    pub qty: u32,
    pub planned_departure: NaiveDateTime,
    pub planned_arrival: NaiveDateTime,
    pub delivered_late: bool,
    pub late_stage: LateStage,
    /// Minutes between final receipt and planned arrival; negative is early
    pub delay_minutes: i64,
    pub delay_reason: DelayReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct F2wStages {
    pub pickup: NaiveDateTime,
    pub export_clearance_start: NaiveDateTime,
    pub export_clearance_end: NaiveDateTime,
    pub flight_departure: NaiveDateTime,
    pub flight_arrival: NaiveDateTime,
    pub import_clearance_start: NaiveDateTime,
    pub import_clearance_end: NaiveDateTime,
    pub warehouse_receive: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct W2sStages {
    pub pick_start: NaiveDateTime,
    pub pick_end: NaiveDateTime,
    pub pack_start: NaiveDateTime,
    pub pack_end: NaiveDateTime,
    pub ship_out: NaiveDateTime,
    pub store_receive: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LaneStages {
    F2w(F2wStages),
    W2s(W2sStages),
}

/// One fully timestamped, labelled shipment
#[derive(Debug, Clone, PartialEq)]
pub struct Shipment {
    pub header: ShipmentHeader,
    pub stages: LaneStages,
}

fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_minutes()
}

impl Shipment {
    pub fn lane(&self) -> Lane {
        match self.stages {
            LaneStages::F2w(_) => Lane::F2W,
            LaneStages::W2s(_) => Lane::W2S,
        }
    }

    /// Final receipt: warehouse receive for F2W, store receive for W2S
    pub fn receive_time(&self) -> NaiveDateTime {
        match &self.stages {
            LaneStages::F2w(s) => s.warehouse_receive,
            LaneStages::W2s(s) => s.store_receive,
        }
    }

    /// Stage timestamps in cascade order
    pub fn timeline(&self) -> Vec<(&'static str, NaiveDateTime)> {
        match &self.stages {
            LaneStages::F2w(s) => vec![
                ("pickup_time", s.pickup),
                ("export_clearance_start", s.export_clearance_start),
                ("export_clearance_end", s.export_clearance_end),
                ("flight_departure", s.flight_departure),
                ("flight_arrival", s.flight_arrival),
                ("import_clearance_start", s.import_clearance_start),
                ("import_clearance_end", s.import_clearance_end),
                ("warehouse_receive_time", s.warehouse_receive),
            ],
            LaneStages::W2s(s) => vec![
                ("pick_start", s.pick_start),
                ("pick_end", s.pick_end),
                ("pack_start", s.pack_start),
                ("pack_end", s.pack_end),
                ("ship_out_time", s.ship_out),
                ("store_receive_time", s.store_receive),
            ],
        }
    }

    /// Timed work stages that must take a positive number of minutes
    fn timed_stages(&self) -> Vec<(&'static str, NaiveDateTime, NaiveDateTime)> {
        match &self.stages {
            LaneStages::F2w(s) => vec![
                ("export_clearance", s.export_clearance_start, s.export_clearance_end),
                ("flight", s.flight_departure, s.flight_arrival),
                ("import_clearance", s.import_clearance_start, s.import_clearance_end),
            ],
            LaneStages::W2s(s) => vec![
                ("pick", s.pick_start, s.pick_end),
                ("pack", s.pack_start, s.pack_end),
                ("transit", s.ship_out, s.store_receive),
            ],
        }
    }

    /// Check ordering, positivity and label consistency.
    ///
    /// Downstream stage-duration computations assume every populated stage
    /// is monotonic, so a failing record must never be emitted.
    pub fn check_invariants(&self) -> GenResult<()> {
        let record = format!("{} {}", self.lane().as_str(), self.header.shipment_id);
        let id = record.as_str();

        for pair in self.timeline().windows(2) {
            let (prev_name, prev) = pair[0];
            let (name, ts) = pair[1];
            if ts < prev {
                return Err(GenError::invariant(
                    id,
                    format!("{} ({}) precedes {} ({})", name, ts, prev_name, prev),
                ));
            }
        }

        for (stage, start, end) in self.timed_stages() {
            if end <= start {
                return Err(GenError::invariant(
                    id,
                    format!("{} duration is {} minutes", stage, minutes_between(start, end)),
                ));
            }
        }

        let expected_delay = minutes_between(self.header.planned_arrival, self.receive_time());
        if expected_delay != self.header.delay_minutes {
            return Err(GenError::invariant(
                id,
                format!(
                    "delay_minutes {} disagrees with timestamps ({})",
                    self.header.delay_minutes, expected_delay
                ),
            ));
        }

        if self.lane().is_late(self.header.delay_minutes) != self.header.delivered_late {
            return Err(GenError::invariant(id, "delivered_late disagrees with lane threshold"));
        }

        Ok(())
    }

    pub fn export_clearance_minutes(&self) -> Option<i64> {
        match &self.stages {
            LaneStages::F2w(s) => {
                Some(minutes_between(s.export_clearance_start, s.export_clearance_end))
            }
            LaneStages::W2s(_) => None,
        }
    }

    pub fn import_clearance_minutes(&self) -> Option<i64> {
        match &self.stages {
            LaneStages::F2w(s) => {
                Some(minutes_between(s.import_clearance_start, s.import_clearance_end))
            }
            LaneStages::W2s(_) => None,
        }
    }

    pub fn pick_minutes(&self) -> Option<i64> {
        match &self.stages {
            LaneStages::W2s(s) => Some(minutes_between(s.pick_start, s.pick_end)),
            LaneStages::F2w(_) => None,
        }
    }

    pub fn pack_minutes(&self) -> Option<i64> {
        match &self.stages {
            LaneStages::W2s(s) => Some(minutes_between(s.pack_start, s.pack_end)),
            LaneStages::F2w(_) => None,
        }
    }

    /// Flatten into the fixed output column set
    pub fn to_row(&self) -> ShipmentRow {
        let h = &self.header;
        let mut row = ShipmentRow {
            shipment_id: h.shipment_id.clone(),
            lane: self.lane(),
            sku_id: h.sku_id.clone(),
            category: h.category,
            origin: h.origin.clone(),
            destination: h.destination.clone(),
            region: h.region,
            qty: h.qty,
            planned_departure: h.planned_departure,
            planned_arrival: h.planned_arrival,
            pickup_time: None,
            export_clearance_start: None,
            export_clearance_end: None,
            flight_departure: None,
            flight_arrival: None,
            import_clearance_start: None,
            import_clearance_end: None,
            warehouse_receive_time: None,
            pick_start: None,
            pick_end: None,
            pack_start: None,
            pack_end: None,
            ship_out_time: None,
            store_receive_time: None,
            delivered_late: h.delivered_late,
            late_stage: h.late_stage,
            delay_minutes: h.delay_minutes,
            delay_reason: h.delay_reason,
        };

        match &self.stages {
            LaneStages::F2w(s) => {
                row.pickup_time = Some(s.pickup);
                row.export_clearance_start = Some(s.export_clearance_start);
                row.export_clearance_end = Some(s.export_clearance_end);
                row.flight_departure = Some(s.flight_departure);
                row.flight_arrival = Some(s.flight_arrival);
                row.import_clearance_start = Some(s.import_clearance_start);
                row.import_clearance_end = Some(s.import_clearance_end);
                row.warehouse_receive_time = Some(s.warehouse_receive);
            }
            LaneStages::W2s(s) => {
                row.pick_start = Some(s.pick_start);
                row.pick_end = Some(s.pick_end);
                row.pack_start = Some(s.pack_start);
                row.pack_end = Some(s.pack_end);
                row.ship_out_time = Some(s.ship_out);
                row.store_receive_time = Some(s.store_receive);
            }
        }

        row
    }
}

/// Flat output row; the other lane's timestamps are empty cells
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentRow {
    pub shipment_id: String,
    pub lane: Lane,
    pub sku_id: SkuId,
    pub category: Category,
    pub origin: LocationId,
    pub destination: LocationId,
    pub region: Region,
    pub qty: u32,
    pub planned_departure: NaiveDateTime,
    pub planned_arrival: NaiveDateTime,
    pub pickup_time: Option<NaiveDateTime>,
    pub export_clearance_start: Option<NaiveDateTime>,
    pub export_clearance_end: Option<NaiveDateTime>,
    pub flight_departure: Option<NaiveDateTime>,
    pub flight_arrival: Option<NaiveDateTime>,
    pub import_clearance_start: Option<NaiveDateTime>,
    pub import_clearance_end: Option<NaiveDateTime>,
    pub warehouse_receive_time: Option<NaiveDateTime>,
    pub pick_start: Option<NaiveDateTime>,
    pub pick_end: Option<NaiveDateTime>,
    pub pack_start: Option<NaiveDateTime>,
    pub pack_end: Option<NaiveDateTime>,
    pub ship_out_time: Option<NaiveDateTime>,
    pub store_receive_time: Option<NaiveDateTime>,
    pub delivered_late: bool,
    pub late_stage: LateStage,
    pub delay_minutes: i64,
    pub delay_reason: DelayReason,
}
