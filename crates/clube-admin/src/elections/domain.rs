use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionStatus {
    #[serde(rename = "agendada", alias = "scheduled")]
    Scheduled,
    #[serde(rename = "em_andamento", alias = "in_progress")]
    InProgress,
    #[serde(rename = "encerrada", alias = "closed")]
    Closed,
    #[serde(rename = "cancelada", alias = "canceled")]
    Canceled,
}

impl ElectionStatus {
    pub fn store_value(&self) -> &'static str {
        match self {
            ElectionStatus::Scheduled => "agendada",
            ElectionStatus::InProgress => "em_andamento",
            ElectionStatus::Closed => "encerrada",
            ElectionStatus::Canceled => "cancelada",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Election {
    pub id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "data_inicio")]
    pub starts_at: DateTime<Utc>,
    #[serde(rename = "data_fim", default)]
    pub ends_at: Option<DateTime<Utc>>,
    pub status: ElectionStatus,
    #[serde(rename = "mandato_inicio", default, skip_serializing_if = "Option::is_none")]
    pub term_start: Option<NaiveDate>,
    #[serde(rename = "mandato_fim", default, skip_serializing_if = "Option::is_none")]
    pub term_end: Option<NaiveDate>,
}

/// Board position a candidate runs for, kept as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(rename = "chapa_id")]
    pub slate_id: String,
    #[serde(rename = "associado_id")]
    pub member_id: String,
    #[serde(rename = "cargo")]
    pub role: String,
    /// Filled from the member roster when the slate is loaded.
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
}

/// Ticket competing in one election.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slate {
    pub id: String,
    #[serde(rename = "eleicao_id")]
    pub election_id: String,
    #[serde(rename = "numero")]
    pub number: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "proposta", default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<String>,
    #[serde(rename = "candidatos", default)]
    pub candidates: Vec<Candidate>,
}

/// One cast vote; no slate means a blank ballot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub id: String,
    #[serde(rename = "eleicao_id")]
    pub election_id: String,
    #[serde(rename = "associado_id")]
    pub member_id: String,
    #[serde(rename = "chapa_id", default)]
    pub slate_id: Option<String>,
}

impl Ballot {
    pub fn is_blank(&self) -> bool {
        self.slate_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlateResult {
    #[serde(flatten)]
    pub slate: Slate,
    pub votes: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyResult {
    pub election: Election,
    pub slates: Vec<SlateResult>,
    pub total_votes: u64,
    /// Ballots without a slate.
    pub blank_votes: u64,
    /// Ballots naming a slate that does not belong to the election.
    pub stray_votes: u64,
}

impl TallyResult {
    /// Slate, blank and stray votes together; always equals `total_votes`.
    pub fn accounted_votes(&self) -> u64 {
        self.slates.iter().map(|entry| entry.votes).sum::<u64>() + self.blank_votes + self.stray_votes
    }
}
