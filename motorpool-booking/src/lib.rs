pub mod manager;
pub mod models;
pub mod returns;

pub use manager::{BookingError, BookingManager};
pub use models::{Booking, BookingStatus};
pub use returns::{
    ReturnChecklist, ReturnError, ReturnManager, ReturnPolicy, ReturnSubmission, VehicleReturn,
};
