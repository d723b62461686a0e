//! Factory -> warehouse stage cascade
//!
//! Import congestion is the main delay driver on this lane: when injected
//! it inflates import clearance and owns the late-stage label.

use super::{at_time, plus_minutes, ShipmentSimulator};
use crate::domain::shipment::{
    DelayCause, DelayReason, F2wStages, Lane, LaneStages, LateStage, Shipment, ShipmentHeader,
};
use crate::domain::types::Sku;
use crate::error::{GenError, GenResult};
use crate::services::draws::DrawService;
use chrono::NaiveDate;

impl ShipmentSimulator<'_> {
    pub(crate) fn simulate_f2w(
        &self,
        shipment_id: String,
        sku: &Sku,
        day: NaiveDate,
        draws: &mut DrawService,
    ) -> GenResult<Shipment> {
        let p = &self.params.f2w;

        let origin = draws
            .pick(&self.factories)
            .ok_or_else(|| GenError::config("no factories"))?;
        let warehouse = draws
            .pick(&self.warehouses)
            .ok_or_else(|| GenError::config("no warehouses"))?;
        let region = warehouse.region;
        let qty = draws.bounded_units(&p.qty)?;

        let (lo, hi) = p.departure_hours;
        let hour = draws.int_range(i64::from(lo), i64::from(hi)) as u32;
        let minute = draws.int_range(0, 60) as u32;
        let planned_departure = at_time(day, hour, minute)?;
        let arrival_noise =
            draws.bounded_jitter(0.0, p.planned_arrival_noise_sd, p.planned_arrival_noise_bound)?;
        let planned_arrival = plus_minutes(planned_departure, p.planned_transit_minutes + arrival_noise);

        let export_clearance = draws.bounded_minutes(&p.export_clearance, 1.0)?;
        let mut import_clearance = draws.bounded_minutes(&p.import_clearance, 1.0)?;
        let congested = draws.chance(p.congestion_probability(region));
        if congested {
            import_clearance += draws.bounded_minutes(&p.congestion_extra, 1.0)?;
        }

        let pickup = plus_minutes(
            planned_departure,
            draws.bounded_jitter(0.0, p.pickup_jitter_sd, p.pickup_jitter_bound)?,
        );
        let export_clearance_start = plus_minutes(pickup, draws.bounded_minutes(&p.transfer_gap, 1.0)?);
        let export_clearance_end = plus_minutes(export_clearance_start, export_clearance);

        let flight_departure =
            plus_minutes(export_clearance_end, draws.bounded_minutes(&p.ground_to_air_gap, 1.0)?);
        let flight_arrival = plus_minutes(flight_departure, draws.bounded_minutes(&p.flight, 1.0)?);

        let import_clearance_start =
            plus_minutes(flight_arrival, draws.bounded_minutes(&p.unload_gap, 1.0)?);
        let import_clearance_end = plus_minutes(import_clearance_start, import_clearance);

        let warehouse_receive =
            plus_minutes(import_clearance_end, draws.bounded_minutes(&p.final_transfer_gap, 1.0)?);

        let delay_minutes = (warehouse_receive - planned_arrival).num_minutes();
        let late_stage = if congested {
            LateStage::ImportClearance
        } else if export_clearance > p.slow_export_minutes {
            LateStage::ExportClearance
        } else {
            LateStage::Transport
        };
        let cause = if congested { DelayCause::CustomsCongestion } else { DelayCause::NormalVariance };

        Ok(Shipment {
            header: ShipmentHeader {
                shipment_id,
                sku_id: sku.sku_id.clone(),
                category: sku.category,
                origin: origin.location_id.clone(),
                destination: warehouse.location_id.clone(),
                region,
                qty,
                planned_departure,
                planned_arrival,
                delivered_late: Lane::F2W.is_late(delay_minutes),
                late_stage,
                delay_minutes,
                delay_reason: DelayReason::new(cause),
            },
            stages: LaneStages::F2w(F2wStages {
                pickup,
                export_clearance_start,
                export_clearance_end,
                flight_departure,
                flight_arrival,
                import_clearance_start,
                import_clearance_end,
                warehouse_receive,
            }),
        })
    }
}
