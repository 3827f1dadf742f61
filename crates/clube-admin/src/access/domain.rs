use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClubError;

/// Which table a person id refers to. Accepts English or stored names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PersonKind {
    Member,
    Dependent,
    Guest,
}

impl PersonKind {
    pub fn label(&self) -> &'static str {
        match self {
            PersonKind::Member => "member",
            PersonKind::Dependent => "dependent",
            PersonKind::Guest => "guest",
        }
    }

    /// Column linking an access record or exam to this kind of person.
    pub fn link_column(&self) -> &'static str {
        match self {
            PersonKind::Member => "associado_id",
            PersonKind::Dependent => "dependente_id",
            PersonKind::Guest => "convidado_id",
        }
    }
}

impl FromStr for PersonKind {
    type Err = ClubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "member" | "associado" => Ok(PersonKind::Member),
            "dependent" | "dependente" => Ok(PersonKind::Dependent),
            "guest" | "convidado" => Ok(PersonKind::Guest),
            other => Err(ClubError::Validation(format!(
                "unknown person kind '{other}' (expected member, dependent or guest)"
            ))),
        }
    }
}

impl TryFrom<String> for PersonKind {
    type Error = ClubError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PersonKind> for String {
    fn from(value: PersonKind) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for PersonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Venue behind an access point.
///
/// Unrecognized venue names are kept rather than rejected; they require no
/// medical clearance and only resolve if an access point of that type exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Venue {
    #[default]
    Club,
    Pool,
    Gym,
    Other(String),
}

impl Venue {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "club" | "clube" => Venue::Club,
            "pool" | "piscina" => Venue::Pool,
            "gym" | "academia" => Venue::Gym,
            other => Venue::Other(other.to_string()),
        }
    }

    /// Value of `pontos_acesso.tipo` for this venue.
    pub fn store_value(&self) -> &str {
        match self {
            Venue::Club => "clube",
            Venue::Pool => "piscina",
            Venue::Gym => "academia",
            Venue::Other(raw) => raw.as_str(),
        }
    }

    pub fn requires_medical_clearance(&self) -> bool {
        matches!(self, Venue::Pool | Venue::Gym)
    }
}

impl From<String> for Venue {
    fn from(value: String) -> Self {
        Venue::parse(&value)
    }
}

impl From<Venue> for String {
    fn from(value: Venue) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Club => f.write_str("club"),
            Venue::Pool => f.write_str("pool"),
            Venue::Gym => f.write_str("gym"),
            Venue::Other(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn store_value(&self) -> &'static str {
        match self {
            Direction::In => "entrada",
            Direction::Out => "saida",
        }
    }
}

impl FromStr for Direction {
    type Err = ClubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in" | "entrada" => Ok(Direction::In),
            "out" | "saida" | "saída" => Ok(Direction::Out),
            other => Err(ClubError::Validation(format!(
                "unknown direction '{other}' (expected in or out)"
            ))),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = ClubError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Direction> for String {
    fn from(value: Direction) -> Self {
        value.store_value().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub id: String,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "tipo")]
    pub venue: Venue,
    #[serde(rename = "ativo")]
    pub active: bool,
}

/// Entrance or exit event as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRecord {
    pub id: String,
    #[serde(rename = "ponto_acesso_id")]
    pub access_point_id: String,
    #[serde(rename = "associado_id", default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    #[serde(rename = "dependente_id", default, skip_serializing_if = "Option::is_none")]
    pub dependent_id: Option<String>,
    #[serde(rename = "convidado_id", default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
    #[serde(rename = "tipo")]
    pub direction: Direction,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Row written when a passage is recorded; exactly one person link is set.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewAccessRecord {
    #[serde(rename = "ponto_acesso_id")]
    pub access_point_id: String,
    #[serde(rename = "associado_id", skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    #[serde(rename = "dependente_id", skip_serializing_if = "Option::is_none")]
    pub dependent_id: Option<String>,
    #[serde(rename = "convidado_id", skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<String>,
    #[serde(rename = "tipo")]
    pub direction: Direction,
    #[serde(rename = "observacoes", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewAccessRecord {
    pub(crate) fn new(
        access_point_id: String,
        person_id: &str,
        kind: PersonKind,
        direction: Direction,
        note: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let link = Some(person_id.to_string());
        let (member_id, dependent_id, guest_id) = match kind {
            PersonKind::Member => (link, None, None),
            PersonKind::Dependent => (None, link, None),
            PersonKind::Guest => (None, None, link),
        };
        Self {
            access_point_id,
            member_id,
            dependent_id,
            guest_id,
            direction,
            note,
            created_at,
        }
    }
}

/// Request to log an entrance or exit.
#[derive(Debug, Clone, Deserialize)]
pub struct PassageRequest {
    pub person_id: String,
    pub person_kind: PersonKind,
    pub direction: Direction,
    #[serde(default)]
    pub venue: Venue,
    #[serde(default)]
    pub note: Option<String>,
}

/// Filters for the recent access log.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessRecordFilter {
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Front-desk counters for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateStatistics {
    pub date: NaiveDate,
    pub venue: Option<Venue>,
    pub entries: u64,
    pub exits: u64,
    /// Entries minus exits; negative when exits were logged without entries.
    pub estimated_present: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn person_kind_accepts_both_vocabularies() {
        assert_eq!("associado".parse::<PersonKind>().ok(), Some(PersonKind::Member));
        assert_eq!("Dependent".parse::<PersonKind>().ok(), Some(PersonKind::Dependent));
        assert!(matches!(
            "staff".parse::<PersonKind>(),
            Err(ClubError::Validation(_))
        ));
    }

    #[test]
    fn unknown_venues_are_kept_and_need_no_clearance() {
        let venue = Venue::parse("Sauna");
        assert_eq!(venue, Venue::Other("sauna".to_string()));
        assert!(!venue.requires_medical_clearance());
        assert!(Venue::parse("piscina").requires_medical_clearance());
        assert_eq!(Venue::Gym.store_value(), "academia");
    }

    #[test]
    fn new_record_links_only_the_matching_column() {
        let record = NewAccessRecord::new(
            "p-1".to_string(),
            "d-7",
            PersonKind::Dependent,
            Direction::In,
            None,
            Utc::now(),
        );
        let value = serde_json::to_value(&record).expect("serializes");
        assert_eq!(value["dependente_id"], json!("d-7"));
        assert_eq!(value["tipo"], json!("entrada"));
        assert!(value.get("associado_id").is_none());
        assert!(value.get("observacoes").is_none());
    }

    #[test]
    fn passage_request_defaults_to_club() {
        let request: PassageRequest = serde_json::from_value(json!({
            "person_id": "m-1",
            "person_kind": "member",
            "direction": "out"
        }))
        .expect("request decodes");
        assert_eq!(request.venue, Venue::Club);
        assert_eq!(request.direction, Direction::Out);
    }
}
