use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::domain::{Ballot, Candidate, Election, ElectionStatus, Slate, TallyResult};
use super::tally::tally_ballots;
use crate::domain::Member;
use crate::error::ClubError;
use crate::gateway::{
    decode, decode_all, Condition, Order, PersistenceGateway, Predicate, Query, Table,
};

/// Read-only election queries. Nothing here writes to the store.
pub struct ElectionService<G> {
    gateway: Arc<G>,
}

impl<G> ElectionService<G>
where
    G: PersistenceGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Counts the ballots visible at read time; repeatable with no side effects.
    pub async fn tally(&self, election_id: &str) -> Result<TallyResult, ClubError> {
        let row = self
            .gateway
            .find_one(Table::Elections, &Predicate::new().eq("id", election_id))
            .await
            .map_err(ClubError::lookup("election", election_id))?;
        let election: Election = decode(Table::Elections, row)?;

        let slates = self.slates(election_id).await?;
        let rows = self
            .gateway
            .find_many(
                Table::Ballots,
                &Query::from(Predicate::new().eq("eleicao_id", election_id)),
            )
            .await?;
        let ballots: Vec<Ballot> = decode_all(Table::Ballots, rows)?;

        let result = tally_ballots(election, slates, &ballots);
        info!(
            election_id,
            total_votes = result.total_votes,
            blank_votes = result.blank_votes,
            stray_votes = result.stray_votes,
            slates = result.slates.len(),
            "election tallied"
        );
        Ok(result)
    }

    /// Elections newest first.
    pub async fn list(&self, status: Option<ElectionStatus>) -> Result<Vec<Election>, ClubError> {
        let mut predicate = Predicate::new();
        if let Some(status) = status {
            predicate = predicate.eq("status", status.store_value());
        }
        let query = Query::from(predicate).order_by(Order::desc("data_inicio"));
        let rows = self.gateway.find_many(Table::Elections, &query).await?;
        Ok(decode_all(Table::Elections, rows)?)
    }

    /// Slates of one election in store order, each with its candidates.
    pub async fn slates(&self, election_id: &str) -> Result<Vec<Slate>, ClubError> {
        let rows = self
            .gateway
            .find_many(
                Table::Slates,
                &Query::from(Predicate::new().eq("eleicao_id", election_id)),
            )
            .await?;
        let mut slates: Vec<Slate> = decode_all(Table::Slates, rows)?;
        if slates.is_empty() {
            return Ok(slates);
        }

        let mut candidates = self.candidates(&slates).await?;
        for slate in &mut slates {
            slate.candidates = candidates.remove(&slate.id).unwrap_or_default();
        }
        Ok(slates)
    }

    async fn candidates(&self, slates: &[Slate]) -> Result<HashMap<String, Vec<Candidate>>, ClubError> {
        let by_slate = slates
            .iter()
            .map(|slate| Condition::eq("chapa_id", slate.id.as_str()))
            .collect();
        let rows = self
            .gateway
            .find_many(
                Table::Candidates,
                &Query::from(Predicate::new().any_of(by_slate)),
            )
            .await?;
        let mut candidates: Vec<Candidate> = decode_all(Table::Candidates, rows)?;

        if !candidates.is_empty() {
            let names = self.member_names(&candidates).await?;
            for candidate in &mut candidates {
                candidate.member_name = names.get(&candidate.member_id).cloned();
            }
        }

        let mut grouped: HashMap<String, Vec<Candidate>> = HashMap::new();
        for candidate in candidates {
            grouped
                .entry(candidate.slate_id.clone())
                .or_default()
                .push(candidate);
        }
        Ok(grouped)
    }

    async fn member_names(&self, candidates: &[Candidate]) -> Result<HashMap<String, String>, ClubError> {
        let by_id = candidates
            .iter()
            .map(|candidate| Condition::eq("id", candidate.member_id.as_str()))
            .collect();
        let rows = self
            .gateway
            .find_many(Table::Members, &Query::from(Predicate::new().any_of(by_id)))
            .await?;
        let members: Vec<Member> = decode_all(Table::Members, rows)?;
        Ok(members
            .into_iter()
            .map(|member| (member.id, member.name))
            .collect())
    }
}
