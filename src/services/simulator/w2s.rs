//! Warehouse -> store stage cascade
//!
//! Promo weeks scale pick and pack work. Packing that finishes after the
//! cutoff hour pushes ship-out to the next morning, which is what the
//! PACKING label and MISSED_CUTOFF_PACKING reason record.

use super::{at_time, plus_minutes, ShipmentSimulator};
use crate::domain::shipment::{
    DelayCause, DelayReason, Lane, LaneStages, LateStage, Shipment, ShipmentHeader, W2sStages,
};
use crate::domain::types::{Location, Region, Sku};
use crate::error::{GenError, GenResult};
use crate::services::draws::DrawService;
use chrono::{Duration, NaiveDate};

/// W1 serves EU stores, W2 serves US stores
fn serving_warehouse_id(region: Region) -> &'static str {
    match region {
        Region::Eu => "W1",
        _ => "W2",
    }
}

impl ShipmentSimulator<'_> {
    /// Warehouse that replenishes a store; the first warehouse when the
    /// region's own site is not in the directory
    pub(crate) fn origin_for(&self, store: &Location) -> GenResult<&Location> {
        let wanted = serving_warehouse_id(store.region);
        self.warehouses
            .iter()
            .find(|w| w.location_id.0 == wanted)
            .or_else(|| self.warehouses.first())
            .copied()
            .ok_or_else(|| GenError::config("no warehouses"))
    }

    pub(crate) fn simulate_w2s(
        &self,
        shipment_id: String,
        sku: &Sku,
        day: NaiveDate,
        draws: &mut DrawService,
    ) -> GenResult<Shipment> {
        let p = &self.params.w2s;

        let store = *draws.pick(&self.stores).ok_or_else(|| GenError::config("no stores"))?;
        let region = store.region;
        let origin = self.origin_for(store)?;
        let qty = draws.bounded_units(&p.qty)?;

        let (lo, hi) = p.departure_hours;
        let hour = draws.int_range(i64::from(lo), i64::from(hi)) as u32;
        let minute = draws.int_range(0, 60) as u32;
        let planned_departure = at_time(day, hour, minute)?;
        let planned_arrival =
            plus_minutes(planned_departure, draws.bounded_minutes(&p.planned_transit, 1.0)?);

        let promo_week = self.promo.covers(day);
        let workload = p.workload_multiplier(promo_week);
        let pick_minutes = draws.bounded_minutes(&p.pick, workload)?;
        let pack_minutes = draws.bounded_minutes(&p.pack, workload)?;

        let pick_start = plus_minutes(planned_departure, -draws.bounded_minutes(&p.lead_gap, 1.0)?);
        let pick_end = plus_minutes(pick_start, pick_minutes);
        let pack_start = plus_minutes(pick_end, draws.bounded_minutes(&p.handoff_gap, 1.0)?);
        let pack_end = plus_minutes(pack_start, pack_minutes);

        let departure_day = planned_departure.date();
        let cutoff = at_time(departure_day, p.cutoff_hour, 0)?;
        let missed_cutoff = pack_end > cutoff;

        let ship_out = if missed_cutoff {
            let next_day = departure_day + Duration::days(1);
            let minute = draws.int_range(0, 60) as u32;
            at_time(next_day, p.next_day_ship_hour, minute)?
        } else {
            let ready = planned_departure.max(pack_end);
            plus_minutes(ready, draws.bounded_minutes(&p.same_day_gap, 1.0)?)
        };

        let store_receive = plus_minutes(ship_out, draws.bounded_minutes(&p.transit, 1.0)?);

        let delay_minutes = (store_receive - planned_arrival).num_minutes();
        let late_stage = if missed_cutoff {
            LateStage::Packing
        } else if delay_minutes > 0 {
            LateStage::Transport
        } else {
            LateStage::OnTime
        };
        let cause = if missed_cutoff { DelayCause::MissedCutoffPacking } else { DelayCause::NormalVariance };

        Ok(Shipment {
            header: ShipmentHeader {
                shipment_id,
                sku_id: sku.sku_id.clone(),
                category: sku.category,
                origin: origin.location_id.clone(),
                destination: store.location_id.clone(),
                region,
                qty,
                planned_departure,
                planned_arrival,
                delivered_late: Lane::W2S.is_late(delay_minutes),
                late_stage,
                delay_minutes,
                delay_reason: DelayReason::new(cause).with_promo_surge(promo_week),
            },
            stages: LaneStages::W2s(W2sStages {
                pick_start,
                pick_end,
                pack_start,
                pack_end,
                ship_out,
                store_receive,
            }),
        })
    }
}
