pub mod allocator;
pub mod registry;

pub use allocator::AllocationError;
pub use registry::{FleetError, FleetRegistry, Vehicle, DEFAULT_FLEET};
