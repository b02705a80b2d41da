use crate::application::DriverApplication;
use crate::eligibility::{self, EligibilityOutcome};
use chrono::{DateTime, Utc};
use motorpool_shared::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Driving-eligibility status of a member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    NotSubmitted,
    Pending,
    Approved,
    Rejected,
}

/// What a resubmission does to an already-decided user.
///
/// Fleet offices differ on whether a correction should cost a driver their
/// manually granted approval, so both behaviors are selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResubmissionPolicy {
    /// Any resubmission that does not auto-approve drops the user to PENDING,
    /// even if an administrator had approved them before.
    ResetAlways,
    /// A standing manual APPROVED survives a resubmission; everyone else
    /// lands in PENDING as usual.
    DemoteOnly,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub uid: u64,
    pub role: Role,
    pub status: UserStatus,
    pub is_auto_approved: bool,
    pub application: Option<DriverApplication>,
}

/// Result of one application submission, returned to the caller verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub status: UserStatus,
    pub auto_approved: bool,
    pub evaluation: EligibilityOutcome,
}

/// Tracks members and their driving-eligibility state machine.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// First contact: create the member record in NOT_SUBMITTED.
    pub fn register(&mut self, email: &str, uid: u64, role: Role) -> Result<&User, DirectoryError> {
        if self.users.contains_key(email) {
            return Err(DirectoryError::AlreadyRegistered(email.to_string()));
        }
        let user = User {
            email: email.to_string(),
            uid,
            role,
            status: UserStatus::NotSubmitted,
            is_auto_approved: false,
            application: None,
        };
        self.users.insert(email.to_string(), user);
        Ok(&self.users[email])
    }

    pub fn get(&self, email: &str) -> Option<&User> {
        self.users.get(email)
    }

    pub fn is_approved(&self, email: &str) -> bool {
        self.users
            .get(email)
            .is_some_and(|u| u.status == UserStatus::Approved)
    }

    /// Applications awaiting manual review, for the admin queue.
    pub fn pending_applications(&self) -> Vec<&User> {
        let mut pending: Vec<&User> = self
            .users
            .values()
            .filter(|u| u.status == UserStatus::Pending && u.application.is_some())
            .collect();
        pending.sort_by(|a, b| a.email.cmp(&b.email));
        pending
    }

    /// Store (or wholesale overwrite) the application, run the evaluator and
    /// transition the user accordingly. `is_auto_approved` is persisted for
    /// audit either way.
    pub fn submit_application(
        &mut self,
        email: &str,
        application: DriverApplication,
        now: DateTime<Utc>,
        policy: ResubmissionPolicy,
    ) -> Result<SubmissionOutcome, DirectoryError> {
        let user = self
            .users
            .get_mut(email)
            .ok_or_else(|| DirectoryError::UserNotFound(email.to_string()))?;

        let evaluation = eligibility::evaluate(&application, now);
        user.application = Some(application);

        user.status = if evaluation.auto_approve {
            UserStatus::Approved
        } else {
            match (policy, user.status) {
                (ResubmissionPolicy::DemoteOnly, UserStatus::Approved) => UserStatus::Approved,
                _ => UserStatus::Pending,
            }
        };
        user.is_auto_approved = evaluation.auto_approve;

        tracing::info!(
            email,
            status = ?user.status,
            auto_approved = evaluation.auto_approve,
            "driver application processed"
        );

        Ok(SubmissionOutcome {
            status: user.status,
            auto_approved: user.is_auto_approved,
            evaluation,
        })
    }

    /// Manual review: PENDING moves to APPROVED or REJECTED.
    pub fn review(
        &mut self,
        email: &str,
        decision: ReviewDecision,
    ) -> Result<UserStatus, DirectoryError> {
        let user = self
            .users
            .get_mut(email)
            .ok_or_else(|| DirectoryError::UserNotFound(email.to_string()))?;

        if user.status != UserStatus::Pending {
            return Err(DirectoryError::NotPendingReview {
                email: email.to_string(),
                status: user.status,
            });
        }

        user.status = match decision {
            ReviewDecision::Approve => UserStatus::Approved,
            ReviewDecision::Reject => UserStatus::Rejected,
        };
        user.is_auto_approved = false;
        Ok(user.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already registered: {0}")]
    AlreadyRegistered(String),

    #[error("User {email} is not awaiting review (status {status:?})")]
    NotPendingReview { email: String, status: UserStatus },
}
