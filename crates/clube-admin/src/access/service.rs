use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::info;

use super::domain::{
    AccessPoint, AccessRecord, AccessRecordFilter, Direction, GateStatistics, NewAccessRecord,
    PassageRequest, PersonKind, Venue,
};
use super::evaluator::AccessEvaluator;
use super::policy::Decision;
use crate::error::ClubError;
use crate::gateway::{
    decode, decode_all, encode, Condition, Order, PersistenceGateway, Predicate, Query, Table,
};

const DEFAULT_RECORD_LIMIT: usize = 50;

/// Front-desk operations over an injected gateway.
///
/// Calendar days are read in the club's timezone: the host's local zone unless
/// a fixed offset is set with [`AccessService::with_utc_offset`].
pub struct AccessService<G> {
    gateway: Arc<G>,
    evaluator: AccessEvaluator<G>,
    utc_offset: Option<FixedOffset>,
}

impl<G> AccessService<G>
where
    G: PersistenceGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        let evaluator = AccessEvaluator::new(gateway.clone());
        Self {
            gateway,
            evaluator,
            utc_offset: None,
        }
    }

    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = Some(offset);
        self
    }

    pub fn evaluator(&self) -> &AccessEvaluator<G> {
        &self.evaluator
    }

    /// Eligibility decision; errors are never reported as denials.
    pub async fn evaluate(
        &self,
        person_id: &str,
        kind: PersonKind,
        venue: Venue,
    ) -> Result<Decision, ClubError> {
        self.evaluator.evaluate(person_id, kind, venue).await
    }

    /// Appends an access record. Callers decide whether to gate this on a decision.
    pub async fn record_passage(&self, request: PassageRequest) -> Result<AccessRecord, ClubError> {
        let PassageRequest {
            person_id,
            person_kind,
            direction,
            venue,
            note,
        } = request;

        if person_id.trim().is_empty() {
            return Err(ClubError::Validation("person_id must not be empty".to_string()));
        }

        let point = self.active_access_point(&venue).await?;
        let note = note.filter(|text| !text.trim().is_empty());
        let record = NewAccessRecord::new(
            point.id,
            &person_id,
            person_kind,
            direction,
            note,
            Utc::now(),
        );
        let stored = self
            .gateway
            .insert(Table::AccessRecords, encode(Table::AccessRecords, &record)?)
            .await?;
        let stored: AccessRecord = decode(Table::AccessRecords, stored)?;

        info!(
            person_id = %person_id,
            kind = %person_kind,
            direction = direction.store_value(),
            venue = %venue,
            record_id = %stored.id,
            "passage recorded"
        );
        Ok(stored)
    }

    /// First active access point for the venue.
    pub async fn active_access_point(&self, venue: &Venue) -> Result<AccessPoint, ClubError> {
        let query = Query::from(
            Predicate::new()
                .eq("tipo", venue.store_value())
                .eq("ativo", true),
        )
        .limit(1);
        let rows = self.gateway.find_many(Table::AccessPoints, &query).await?;
        decode_all::<AccessPoint>(Table::AccessPoints, rows)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ClubError::Configuration(format!(
                    "no active access point for venue '{venue}'; register one first"
                ))
            })
    }

    /// Newest records first. A venue filter spans every access point of that
    /// venue type, active or not.
    pub async fn recent_records(
        &self,
        filter: AccessRecordFilter,
    ) -> Result<Vec<AccessRecord>, ClubError> {
        let mut predicate = Predicate::new();
        if let Some(venue) = &filter.venue {
            let points = self.access_point_ids(venue).await?;
            if points.is_empty() {
                return Ok(Vec::new());
            }
            predicate = predicate.any_of(
                points
                    .into_iter()
                    .map(|id| Condition::eq("ponto_acesso_id", id))
                    .collect(),
            );
        }
        if let Some(direction) = filter.direction {
            predicate = predicate.eq("tipo", direction.store_value());
        }
        if let Some(member_id) = &filter.member_id {
            predicate = predicate.eq("associado_id", member_id.as_str());
        }
        if let Some(from) = filter.from {
            predicate = predicate.gte("created_at", timestamp_bound(self.day_start(from)));
        }
        if let Some(next_day) = filter.to.and_then(|to| to.succ_opt()) {
            predicate = predicate.lt("created_at", timestamp_bound(self.day_start(next_day)));
        }

        let query = Query::from(predicate)
            .order_by(Order::desc("created_at"))
            .limit(filter.limit.unwrap_or(DEFAULT_RECORD_LIMIT));
        let rows = self.gateway.find_many(Table::AccessRecords, &query).await?;
        Ok(decode_all(Table::AccessRecords, rows)?)
    }

    async fn access_point_ids(&self, venue: &Venue) -> Result<Vec<String>, ClubError> {
        let query = Query::from(Predicate::new().eq("tipo", venue.store_value()));
        let rows = self.gateway.find_many(Table::AccessPoints, &query).await?;
        let points: Vec<AccessPoint> = decode_all(Table::AccessPoints, rows)?;
        Ok(points.into_iter().map(|point| point.id).collect())
    }

    /// First instant of `date` in the club's timezone.
    fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        let start = match self.utc_offset {
            Some(offset) => offset
                .from_local_datetime(&midnight)
                .earliest()
                .map(|start| start.with_timezone(&Utc)),
            None => Local
                .from_local_datetime(&midnight)
                .earliest()
                .map(|start| start.with_timezone(&Utc)),
        };
        start.unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }

    pub async fn gate_statistics(&self, venue: Option<Venue>) -> Result<GateStatistics, ClubError> {
        let today = match self.utc_offset {
            Some(offset) => Utc::now().with_timezone(&offset).date_naive(),
            None => Local::now().date_naive(),
        };
        self.gate_statistics_on(venue, today).await
    }

    /// Entries and exits logged since the start of `date` in the club's timezone.
    pub async fn gate_statistics_on(
        &self,
        venue: Option<Venue>,
        date: NaiveDate,
    ) -> Result<GateStatistics, ClubError> {
        let mut base = Predicate::new().gte("created_at", timestamp_bound(self.day_start(date)));
        if let Some(venue) = &venue {
            let point = self.active_access_point(venue).await?;
            base = base.eq("ponto_acesso_id", point.id);
        }

        let entries = self
            .gateway
            .count(
                Table::AccessRecords,
                &base.clone().eq("tipo", Direction::In.store_value()),
            )
            .await?;
        let exits = self
            .gateway
            .count(
                Table::AccessRecords,
                &base.eq("tipo", Direction::Out.store_value()),
            )
            .await?;

        Ok(GateStatistics {
            date,
            venue,
            entries,
            exits,
            estimated_present: entries as i64 - exits as i64,
        })
    }
}

/// UTC timestamp rendered so it orders correctly against stored `created_at` text.
fn timestamp_bound(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
}
