use motorpool_core::{EvidenceStore, ReservationEngine};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReservationEngine>,
    pub evidence: Arc<dyn EvidenceStore>,
    /// Emails granted the admin role on registration; stands in for the
    /// upstream identity provider's role claim.
    pub admin_emails: Arc<Vec<String>>,
}

impl AppState {
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|e| e == email)
    }
}
