//! Member directory lookups.

pub mod router;

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::domain::{Member, PersonStatus, Plan};
use crate::error::ClubError;
use crate::gateway::{decode, decode_all, Condition, Order, PersistenceGateway, Predicate, Query, Table};

pub use router::member_router;

const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Strips formatting from a tax ID; `"123.456.789-01"` becomes `"12345678901"`.
pub fn normalize_tax_id(raw: &str) -> Result<String, ClubError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ClubError::Validation(format!(
            "tax id '{raw}' contains no digits"
        )));
    }
    Ok(digits)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberSearch {
    /// Matched against name, or against the tax ID when it looks like one.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<PersonStatus>,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub limit: Option<usize>,
}

pub struct MemberDirectory<G> {
    gateway: Arc<G>,
}

impl<G> MemberDirectory<G>
where
    G: PersistenceGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn find_by_tax_id(&self, raw: &str) -> Result<Member, ClubError> {
        let tax_id = normalize_tax_id(raw)?;
        debug!(tax_id = %tax_id, "member lookup by tax id");
        let row = self
            .gateway
            .find_one(Table::Members, &Predicate::new().eq("cpf", tax_id.as_str()))
            .await
            .map_err(ClubError::lookup("member", &tax_id))?;
        Ok(decode(Table::Members, row)?)
    }

    /// Members ordered by name.
    pub async fn search(&self, filter: MemberSearch) -> Result<Vec<Member>, ClubError> {
        let mut predicate = Predicate::new();
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let mut terms = vec![Condition::contains("nome", term)];
            if looks_like_tax_id(term) {
                terms.push(Condition::contains("cpf", &normalize_tax_id(term)?));
            } else {
                terms.push(Condition::contains("cpf", term));
            }
            predicate = predicate.any_of(terms);
        }
        if let Some(status) = filter.status {
            predicate = predicate.eq("status", status.store_value());
        }
        if let Some(plan) = filter.plan {
            predicate = predicate.eq("plano", plan.store_value());
        }

        let query = Query::from(predicate)
            .order_by(Order::asc("nome"))
            .limit(filter.limit.unwrap_or(DEFAULT_SEARCH_LIMIT));
        let rows = self.gateway.find_many(Table::Members, &query).await?;
        Ok(decode_all(Table::Members, rows)?)
    }
}

fn looks_like_tax_id(term: &str) -> bool {
    term.chars().any(|c| c.is_ascii_digit())
        && term
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | ' '))
}
