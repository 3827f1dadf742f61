use chrono::NaiveDate;
use serde::Serialize;

use super::domain::Venue;
use super::policy::DenialReason;
use crate::domain::{MedicalExam, Member, PersonStatus};

/// Named eligibility checks in their fixed evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRule {
    GuardianStatus,
    SubjectStatus,
    Delinquency,
    MedicalClearance,
}

impl AccessRule {
    pub const ORDER: [AccessRule; 4] = [
        AccessRule::GuardianStatus,
        AccessRule::SubjectStatus,
        AccessRule::Delinquency,
        AccessRule::MedicalClearance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AccessRule::GuardianStatus => "guardian_status",
            AccessRule::SubjectStatus => "subject_status",
            AccessRule::Delinquency => "delinquency",
            AccessRule::MedicalClearance => "medical_clearance",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    Pass,
    Deny(DenialReason),
}

/// A dependent is gated by the standing of the member responsible for it.
pub fn guardian_status(guardian: &Member) -> RuleOutcome {
    if guardian.status.is_active() {
        RuleOutcome::Pass
    } else {
        RuleOutcome::Deny(DenialReason::GuardianNotActive {
            status: guardian.status,
        })
    }
}

pub fn subject_status(status: PersonStatus) -> RuleOutcome {
    if status.is_active() {
        RuleOutcome::Pass
    } else {
        RuleOutcome::Deny(DenialReason::NotActive { status })
    }
}

/// Any overdue due blocks every venue, the club entrance included.
pub fn delinquency(overdue_dues: u64) -> RuleOutcome {
    if overdue_dues == 0 {
        RuleOutcome::Pass
    } else {
        RuleOutcome::Deny(DenialReason::Delinquent { overdue_dues })
    }
}

/// `exam` is the subject's most recent exam by expiry among fit, unexpired ones.
pub fn medical_clearance(venue: &Venue, exam: Option<&MedicalExam>, today: NaiveDate) -> RuleOutcome {
    if !venue.requires_medical_clearance() {
        return RuleOutcome::Pass;
    }
    match exam {
        Some(exam) if exam.clears_on(today) => RuleOutcome::Pass,
        _ => RuleOutcome::Deny(DenialReason::MissingMedicalClearance {
            venue: venue.clone(),
        }),
    }
}
