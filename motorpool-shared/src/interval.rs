use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time range `[start, end)` during which a vehicle is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// A slot is usable only when the return datetime is strictly after pickup.
    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// Two half-open intervals overlap iff each starts before the other ends.
    /// Slots that merely touch at a boundary do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}
