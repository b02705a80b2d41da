pub mod application;
pub mod directory;
pub mod eligibility;

pub use application::DriverApplication;
pub use directory::{
    DirectoryError, ResubmissionPolicy, ReviewDecision, SubmissionOutcome, User, UserDirectory,
    UserStatus,
};
pub use eligibility::{evaluate, EligibilityOutcome};
