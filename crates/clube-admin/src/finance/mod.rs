//! Dues standing: delinquency counts used by the front desk, the delinquent
//! roster, and payment recording.

pub mod router;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Due, DueStatus, Member};
use crate::error::ClubError;
use crate::gateway::{
    decode, decode_all, encode, GatewayError, Order, PersistenceGateway, Predicate, Query, Table,
};

pub use router::finance_router;

/// Number of overdue dues owed by `member_id`.
pub async fn overdue_due_count<G>(gateway: &G, member_id: &str) -> Result<u64, ClubError>
where
    G: PersistenceGateway + ?Sized,
{
    let predicate = Predicate::new()
        .eq("associado_id", member_id)
        .eq("status", DueStatus::Overdue.store_value());
    Ok(gateway.count(Table::Dues, &predicate).await?)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdueDue {
    pub due_id: String,
    pub reference: String,
    pub amount: f64,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delinquent {
    pub member_id: String,
    /// `None` when the member row has since been removed.
    pub member: Option<Member>,
    pub overdue: Vec<OverdueDue>,
    pub total_owed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "dinheiro", alias = "cash")]
    Cash,
    #[serde(rename = "pix")]
    Pix,
    #[serde(rename = "cartao_credito", alias = "credit_card")]
    CreditCard,
    #[serde(rename = "cartao_debito", alias = "debit_card")]
    DebitCard,
    #[serde(rename = "boleto")]
    BankSlip,
    #[serde(rename = "transferencia", alias = "transfer")]
    Transfer,
}

/// Payment details supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInput {
    pub paid_amount: f64,
    pub method: PaymentMethod,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Partial update written to a due; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DuePatch {
    #[serde(rename = "valor_pago", skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<f64>,
    #[serde(rename = "forma_pagamento", skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(rename = "data_pagamento", skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DueStatus>,
    #[serde(rename = "observacao", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<chrono::DateTime<Utc>>,
}

impl DuePatch {
    pub fn payment(input: PaymentInput, today: NaiveDate) -> Self {
        Self {
            paid_amount: Some(input.paid_amount),
            method: Some(input.method),
            payment_date: Some(input.payment_date.unwrap_or(today)),
            status: Some(DueStatus::Paid),
            note: input.note,
            updated_at: Some(Utc::now()),
        }
    }
}

pub struct FinanceService<G> {
    gateway: Arc<G>,
}

impl<G> FinanceService<G>
where
    G: PersistenceGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Members with at least `min_overdue` overdue dues, earliest debt first.
    pub async fn delinquents(&self, min_overdue: usize) -> Result<Vec<Delinquent>, ClubError> {
        let query = Query::from(
            Predicate::new().eq("status", DueStatus::Overdue.store_value()),
        )
        .order_by(Order::asc("data_vencimento"));
        let dues: Vec<Due> = decode_all(
            Table::Dues,
            self.gateway.find_many(Table::Dues, &query).await?,
        )?;

        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut roster: Vec<Delinquent> = Vec::new();
        for due in dues {
            let index = *positions.entry(due.member_id.clone()).or_insert_with(|| {
                roster.push(Delinquent {
                    member_id: due.member_id.clone(),
                    member: None,
                    overdue: Vec::new(),
                    total_owed: 0.0,
                });
                roster.len() - 1
            });
            let entry = &mut roster[index];
            entry.total_owed += due.amount;
            entry.overdue.push(OverdueDue {
                due_id: due.id,
                reference: due.reference,
                amount: due.amount,
                due_date: due.due_date,
            });
        }

        roster.retain(|entry| entry.overdue.len() >= min_overdue.max(1));
        for entry in &mut roster {
            entry.member = self.member(&entry.member_id).await?;
        }
        Ok(roster)
    }

    /// Marks a due as paid and returns the updated row.
    pub async fn record_payment(&self, due_id: &str, input: PaymentInput) -> Result<Due, ClubError> {
        if !(input.paid_amount.is_finite() && input.paid_amount > 0.0) {
            return Err(ClubError::Validation(
                "paid amount must be a positive number".to_string(),
            ));
        }
        let patch = encode(
            Table::Dues,
            &DuePatch::payment(input, Local::now().date_naive()),
        )?;
        let updated = self
            .gateway
            .update(Table::Dues, &Predicate::new().eq("id", due_id), patch)
            .await?;
        let row = updated.into_iter().next().ok_or_else(|| ClubError::NotFound {
            entity: "due",
            id: due_id.to_string(),
        })?;
        let due: Due = decode(Table::Dues, row)?;
        info!(due_id, member_id = %due.member_id, "payment recorded");
        Ok(due)
    }

    async fn member(&self, member_id: &str) -> Result<Option<Member>, ClubError> {
        match self
            .gateway
            .find_one(Table::Members, &Predicate::new().eq("id", member_id))
            .await
        {
            Ok(row) => Ok(Some(decode(Table::Members, row)?)),
            Err(GatewayError::NotFound { .. }) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }
}
