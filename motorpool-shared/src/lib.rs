pub mod identity;
pub mod interval;

pub use identity::{RequestContext, Role};
pub use interval::TimeSlot;
