use super::common::*;

use crate::access::domain::Venue;
use crate::access::policy::{Decision, DenialReason};
use crate::access::rules::{self, AccessRule, RuleOutcome};
use crate::domain::{ExamResult, MedicalExam, Member, PersonRecord, PersonStatus};

fn member(status: PersonStatus) -> Member {
    Member {
        id: "m-1".to_string(),
        title_number: Some(1042),
        tax_id: None,
        name: "Ana Souza".to_string(),
        plan: None,
        status,
        phone: None,
        email: None,
    }
}

fn exam(expiry: chrono::NaiveDate, result: ExamResult) -> MedicalExam {
    MedicalExam {
        id: "e-1".to_string(),
        member_id: Some("m-1".to_string()),
        dependent_id: None,
        exam_date: None,
        expiry_date: expiry,
        result,
    }
}

#[test]
fn rules_run_guardian_first_and_clearance_last() {
    assert_eq!(
        AccessRule::ORDER,
        [
            AccessRule::GuardianStatus,
            AccessRule::SubjectStatus,
            AccessRule::Delinquency,
            AccessRule::MedicalClearance,
        ]
    );
}

#[test]
fn only_active_standing_passes() {
    assert_eq!(rules::subject_status(PersonStatus::Active), RuleOutcome::Pass);
    for status in [
        PersonStatus::Inactive,
        PersonStatus::Suspended,
        PersonStatus::Expelled,
    ] {
        assert_eq!(
            rules::subject_status(status),
            RuleOutcome::Deny(DenialReason::NotActive { status })
        );
        assert_eq!(
            rules::guardian_status(&member(status)),
            RuleOutcome::Deny(DenialReason::GuardianNotActive { status })
        );
    }
}

#[test]
fn any_overdue_due_denies() {
    assert_eq!(rules::delinquency(0), RuleOutcome::Pass);
    assert_eq!(
        rules::delinquency(3),
        RuleOutcome::Deny(DenialReason::Delinquent { overdue_dues: 3 })
    );
}

#[test]
fn clearance_window_includes_expiry_day() {
    let today = today();
    let yesterday = today.pred_opt().expect("valid");
    let fit_today = exam(today, ExamResult::Fit);
    let fit_yesterday = exam(yesterday, ExamResult::Fit);

    assert_eq!(
        rules::medical_clearance(&Venue::Pool, Some(&fit_today), today),
        RuleOutcome::Pass
    );
    assert!(matches!(
        rules::medical_clearance(&Venue::Gym, Some(&fit_yesterday), today),
        RuleOutcome::Deny(DenialReason::MissingMedicalClearance { .. })
    ));
    assert!(matches!(
        rules::medical_clearance(&Venue::Pool, None, today),
        RuleOutcome::Deny(DenialReason::MissingMedicalClearance { .. })
    ));
}

#[test]
fn club_and_unknown_venues_skip_clearance() {
    let today = today();
    assert_eq!(rules::medical_clearance(&Venue::Club, None, today), RuleOutcome::Pass);
    assert_eq!(
        rules::medical_clearance(&Venue::parse("sauna"), None, today),
        RuleOutcome::Pass
    );
}

#[test]
fn denial_reasons_render_readable_text() {
    let subject = PersonRecord::Member(member(PersonStatus::Active));

    let delinquent = Decision::denied(
        subject.clone(),
        Venue::Club,
        DenialReason::Delinquent { overdue_dues: 2 },
        Vec::new(),
    );
    assert!(!delinquent.admitted);
    assert_eq!(delinquent.reason, "delinquent");
    assert_eq!(delinquent.warnings, vec!["2 overdue due(s)".to_string()]);
    assert_eq!(delinquent.denied_by(), Some(AccessRule::Delinquency));

    let guardian = DenialReason::GuardianNotActive {
        status: PersonStatus::Suspended,
    };
    assert_eq!(guardian.summary(), "guardian member is suspended - access denied");

    let admitted = Decision::admitted(subject, Venue::Gym, Vec::new());
    assert!(admitted.admitted);
    assert_eq!(admitted.reason, "access granted to gym");
    assert_eq!(admitted.denied_by(), None);
}
