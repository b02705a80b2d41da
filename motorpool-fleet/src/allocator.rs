use crate::registry::FleetRegistry;
use motorpool_shared::TimeSlot;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Return datetime must be after pickup datetime")]
    InvalidSlot,

    #[error("All vehicles are busy at the requested time interval")]
    NoVehicleAvailable,
}

impl FleetRegistry {
    /// Find an uncommitted vehicle for the slot and commit it, in one step.
    ///
    /// The `&mut self` receiver makes find+commit a single critical section;
    /// callers that share the registry across requests must hold it behind
    /// one lock so that two in-flight requests cannot both observe the same
    /// vehicle as free. No retry on exhaustion, the caller surfaces
    /// `NoVehicleAvailable` as-is.
    pub fn allocate(&mut self, slot: TimeSlot) -> Result<i64, AllocationError> {
        if !slot.is_well_formed() {
            return Err(AllocationError::InvalidSlot);
        }

        let vehicle_id = self
            .find_available(&slot)
            .ok_or(AllocationError::NoVehicleAvailable)?;

        // Cannot conflict: found under the same exclusive borrow.
        self.commit(vehicle_id, slot)
            .map_err(|_| AllocationError::NoVehicleAvailable)?;

        tracing::debug!(vehicle_id, start = %slot.start, end = %slot.end, "vehicle allocated");
        Ok(vehicle_id)
    }
}
