use serde::{Deserialize, Serialize};

use super::domain::Venue;
use super::rules::AccessRule;
use crate::domain::{PersonRecord, PersonStatus};

/// Why a passage was refused, one variant per blocking rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DenialReason {
    GuardianNotActive { status: PersonStatus },
    NotActive { status: PersonStatus },
    Delinquent { overdue_dues: u64 },
    MissingMedicalClearance { venue: Venue },
}

impl DenialReason {
    pub fn rule(&self) -> AccessRule {
        match self {
            DenialReason::GuardianNotActive { .. } => AccessRule::GuardianStatus,
            DenialReason::NotActive { .. } => AccessRule::SubjectStatus,
            DenialReason::Delinquent { .. } => AccessRule::Delinquency,
            DenialReason::MissingMedicalClearance { .. } => AccessRule::MedicalClearance,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            DenialReason::GuardianNotActive { status } => {
                format!("guardian member is {status} - access denied")
            }
            DenialReason::NotActive { status } => format!("status is {status} - access denied"),
            DenialReason::Delinquent { .. } => "delinquent".to_string(),
            DenialReason::MissingMedicalClearance { venue } => {
                format!("medical exam required for {venue} is missing or expired")
            }
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        match self {
            DenialReason::Delinquent { overdue_dues } => {
                vec![format!("{overdue_dues} overdue due(s)")]
            }
            _ => Vec::new(),
        }
    }
}

/// Outcome of an eligibility evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub admitted: bool,
    pub reason: String,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial: Option<DenialReason>,
    pub venue: Venue,
    pub subject: PersonRecord,
}

impl Decision {
    pub(crate) fn admitted(subject: PersonRecord, venue: Venue, warnings: Vec<String>) -> Self {
        Self {
            admitted: true,
            reason: format!("access granted to {venue}"),
            warnings,
            denial: None,
            venue,
            subject,
        }
    }

    pub(crate) fn denied(
        subject: PersonRecord,
        venue: Venue,
        reason: DenialReason,
        mut warnings: Vec<String>,
    ) -> Self {
        warnings.extend(reason.warnings());
        Self {
            admitted: false,
            reason: reason.summary(),
            warnings,
            denial: Some(reason),
            venue,
            subject,
        }
    }

    pub fn denied_by(&self) -> Option<AccessRule> {
        self.denial.as_ref().map(DenialReason::rule)
    }
}
