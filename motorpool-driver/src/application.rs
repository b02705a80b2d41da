use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One driver application, created or overwritten wholesale on each
/// submission. `submitted_at` records the decision basis the evaluator used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverApplication {
    pub full_name: String,
    pub license_number: String,
    pub license_state: String,
    pub phone_number: String,
    pub project: String,
    pub license_expiry: NaiveDate,
    pub date_of_birth: NaiveDate,
    pub driving_points: u32,
    /// Most recent defensive/safety training completion date.
    pub safety_training_date: NaiveDate,
    /// Opaque refs into the external blob store (license scan etc).
    #[serde(default)]
    pub evidence: Vec<Uuid>,
    pub submitted_at: DateTime<Utc>,
}
