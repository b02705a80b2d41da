use motorpool_shared::TimeSlot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The pre-provisioned motor pool. Overridable through configuration.
pub const DEFAULT_FLEET: [i64; 10] = [
    4116, 4367, 4597, 405006, 405007, 405014, 405331, 405332, 405333, 405437,
];

/// One vehicle of the fixed fleet with its committed reservation intervals.
///
/// Invariant: no two slots in `busy` overlap. The registry enforces this on
/// every commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: i64,
    pub busy: Vec<TimeSlot>,
}

impl Vehicle {
    pub fn is_free_for(&self, slot: &TimeSlot) -> bool {
        !self.busy.iter().any(|held| held.overlaps(slot))
    }
}

/// Registry over the fixed fleet. Keyed by a `BTreeMap` so that enumeration
/// order, and therefore the first-free tie-break, is deterministic.
#[derive(Debug, Default)]
pub struct FleetRegistry {
    vehicles: BTreeMap<i64, Vehicle>,
}

impl FleetRegistry {
    /// Build the registry from the provisioned vehicle ids. Vehicles are not
    /// user-creatable; this happens once at startup.
    pub fn provision(vehicle_ids: impl IntoIterator<Item = i64>) -> Self {
        let vehicles = vehicle_ids
            .into_iter()
            .map(|vehicle_id| {
                (
                    vehicle_id,
                    Vehicle {
                        vehicle_id,
                        busy: Vec::new(),
                    },
                )
            })
            .collect();
        Self { vehicles }
    }

    pub fn get(&self, vehicle_id: i64) -> Option<&Vehicle> {
        self.vehicles.get(&vehicle_id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// First vehicle whose committed slots do not overlap the requested one.
    pub fn find_available(&self, slot: &TimeSlot) -> Option<i64> {
        self.vehicles
            .values()
            .find(|v| v.is_free_for(slot))
            .map(|v| v.vehicle_id)
    }

    /// Append a committed interval. Refuses to commit over an overlapping
    /// slot so the no-double-booking invariant cannot be broken even by a
    /// buggy caller.
    pub fn commit(&mut self, vehicle_id: i64, slot: TimeSlot) -> Result<(), FleetError> {
        let vehicle = self
            .vehicles
            .get_mut(&vehicle_id)
            .ok_or(FleetError::UnknownVehicle(vehicle_id))?;

        if !vehicle.is_free_for(&slot) {
            return Err(FleetError::SlotConflict(vehicle_id));
        }

        vehicle.busy.push(slot);
        Ok(())
    }

    /// Remove the committed interval matching `slot` exactly. A miss means
    /// the booking and the registry disagree about what was committed; that
    /// is logged as an anomaly and otherwise ignored so the caller's return
    /// flow is not stranded.
    pub fn release(&mut self, vehicle_id: i64, slot: &TimeSlot) {
        let Some(vehicle) = self.vehicles.get_mut(&vehicle_id) else {
            tracing::warn!(vehicle_id, "release against unknown vehicle");
            return;
        };

        let before = vehicle.busy.len();
        vehicle
            .busy
            .retain(|held| !(held.start == slot.start && held.end == slot.end));

        if vehicle.busy.len() == before {
            tracing::warn!(
                vehicle_id,
                start = %slot.start,
                end = %slot.end,
                "release found no matching committed interval"
            );
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("Vehicle not in fleet: {0}")]
    UnknownVehicle(i64),

    #[error("Vehicle {0} already committed for an overlapping interval")]
    SlotConflict(i64),
}
