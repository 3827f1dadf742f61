use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use super::domain::{PersonKind, Venue};
use super::policy::Decision;
use super::rules::{self, AccessRule, RuleOutcome};
use crate::domain::{Dependent, ExamResult, MedicalExam, Member, PersonRecord};
use crate::error::ClubError;
use crate::finance::overdue_due_count;
use crate::gateway::{decode, decode_all, Order, PersistenceGateway, Predicate, Query, Table};

/// Resolved subject of an evaluation.
struct Subject {
    record: PersonRecord,
    kind: PersonKind,
    guardian: Option<Member>,
}

impl Subject {
    /// Member whose dues decide the financial standing.
    fn financial_party_id(&self) -> &str {
        match &self.guardian {
            Some(guardian) => &guardian.id,
            None => self.record.id(),
        }
    }
}

/// Runs the access rules in order against store facts, stopping at the first denial.
///
/// Facts are fetched only when the rule needing them is reached. No writes.
pub struct AccessEvaluator<G> {
    gateway: Arc<G>,
}

impl<G> AccessEvaluator<G>
where
    G: PersistenceGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn evaluate(
        &self,
        person_id: &str,
        kind: PersonKind,
        venue: Venue,
    ) -> Result<Decision, ClubError> {
        self.evaluate_on(person_id, kind, venue, Local::now().date_naive())
            .await
    }

    pub async fn evaluate_on(
        &self,
        person_id: &str,
        kind: PersonKind,
        venue: Venue,
        today: NaiveDate,
    ) -> Result<Decision, ClubError> {
        let subject = self.resolve(person_id, kind).await?;
        let warnings = Vec::new();

        for rule in AccessRule::ORDER {
            let outcome = self.check(rule, &subject, &venue, today).await?;
            debug!(person_id, rule = rule.name(), ?outcome, "access rule checked");
            if let RuleOutcome::Deny(reason) = outcome {
                warn!(
                    person_id,
                    kind = %kind,
                    venue = %venue,
                    rule = rule.name(),
                    "access denied"
                );
                return Ok(Decision::denied(subject.record, venue, reason, warnings));
            }
        }

        info!(person_id, kind = %kind, venue = %venue, "access granted");
        Ok(Decision::admitted(subject.record, venue, warnings))
    }

    async fn check(
        &self,
        rule: AccessRule,
        subject: &Subject,
        venue: &Venue,
        today: NaiveDate,
    ) -> Result<RuleOutcome, ClubError> {
        let outcome = match rule {
            AccessRule::GuardianStatus => match &subject.guardian {
                Some(guardian) => rules::guardian_status(guardian),
                None => RuleOutcome::Pass,
            },
            AccessRule::SubjectStatus => rules::subject_status(subject.record.status()),
            AccessRule::Delinquency => {
                let overdue =
                    overdue_due_count(self.gateway.as_ref(), subject.financial_party_id()).await?;
                rules::delinquency(overdue)
            }
            AccessRule::MedicalClearance => {
                if venue.requires_medical_clearance() {
                    let exam = self.latest_valid_exam(subject, today).await?;
                    rules::medical_clearance(venue, exam.as_ref(), today)
                } else {
                    RuleOutcome::Pass
                }
            }
        };
        Ok(outcome)
    }

    async fn resolve(&self, person_id: &str, kind: PersonKind) -> Result<Subject, ClubError> {
        match kind {
            PersonKind::Member => {
                let member = self.member(person_id, "member").await?;
                Ok(Subject {
                    record: PersonRecord::Member(member),
                    kind,
                    guardian: None,
                })
            }
            PersonKind::Dependent => {
                let row = self
                    .gateway
                    .find_one(Table::Dependents, &Predicate::new().eq("id", person_id))
                    .await
                    .map_err(ClubError::lookup("dependent", person_id))?;
                let dependent: Dependent = decode(Table::Dependents, row)?;
                let guardian = self.member(&dependent.guardian_id, "guardian member").await?;
                Ok(Subject {
                    record: PersonRecord::Dependent(dependent),
                    kind,
                    guardian: Some(guardian),
                })
            }
            PersonKind::Guest => Err(ClubError::Validation(
                "guests are not evaluated; record their passage directly".to_string(),
            )),
        }
    }

    async fn member(&self, id: &str, entity: &'static str) -> Result<Member, ClubError> {
        let row = self
            .gateway
            .find_one(Table::Members, &Predicate::new().eq("id", id))
            .await
            .map_err(ClubError::lookup(entity, id))?;
        Ok(decode(Table::Members, row)?)
    }

    /// The subject's own exam, never the guardian's.
    async fn latest_valid_exam(
        &self,
        subject: &Subject,
        today: NaiveDate,
    ) -> Result<Option<MedicalExam>, ClubError> {
        let query = Query::from(
            Predicate::new()
                .eq(subject.kind.link_column(), subject.record.id())
                .eq("resultado", ExamResult::Fit.store_value())
                .gte("data_validade", today.format("%Y-%m-%d").to_string()),
        )
        .order_by(Order::desc("data_validade"))
        .limit(1);
        let rows = self.gateway.find_many(Table::MedicalExams, &query).await?;
        Ok(decode_all::<MedicalExam>(Table::MedicalExams, rows)?.into_iter().next())
    }
}
