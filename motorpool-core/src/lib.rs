pub mod app_config;
pub mod blob;
pub mod engine;

pub use app_config::Config;
pub use blob::{BlobError, EvidenceStore, MemoryEvidenceStore};
pub use engine::{
    CreateBookingRequest, DriverApplicationRequest, EngineError, EnginePolicies,
    ReservationEngine, ReviewRequest,
};
