use crate::application::DriverApplication;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Months of license validity that must remain, exclusive.
pub const MIN_MONTHS_TO_EXPIRY: f64 = 4.0;
/// Maximum age of the last safety training, inclusive.
pub const MAX_TRAINING_AGE_YEARS: f64 = 2.0;
/// The only license-issuing state eligible for auto-approval.
pub const AUTO_APPROVE_STATE: &str = "CA";

/// Per-condition evaluation result, kept alongside the decision so a manual
/// reviewer can see exactly which rule failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EligibilityOutcome {
    pub license_valid_long_enough: bool,
    pub in_state_license: bool,
    pub clean_driving_record: bool,
    pub training_current: bool,
    pub auto_approve: bool,
}

/// Decide whether an application qualifies for auto-approval.
///
/// Pure function of the application and the supplied clock; all four
/// conditions must hold. Months and years are computed the way the policy
/// defines them: days divided by 30 and 365 respectively.
pub fn evaluate(app: &DriverApplication, now: DateTime<Utc>) -> EligibilityOutcome {
    let today = now.date_naive();

    let days_until_expiry = app.license_expiry.signed_duration_since(today).num_days();
    let license_valid_long_enough = days_until_expiry as f64 / 30.0 > MIN_MONTHS_TO_EXPIRY;

    let in_state_license = app.license_state.eq_ignore_ascii_case(AUTO_APPROVE_STATE);

    let clean_driving_record = app.driving_points == 0;

    let training_age_days = today
        .signed_duration_since(app.safety_training_date)
        .num_days();
    let training_current = training_age_days as f64 / 365.0 <= MAX_TRAINING_AGE_YEARS;

    EligibilityOutcome {
        license_valid_long_enough,
        in_state_license,
        clean_driving_record,
        training_current,
        auto_approve: license_valid_long_enough
            && in_state_license
            && clean_driving_record
            && training_current,
    }
}
