//! Records shared by the access, finance and member modules, mapped onto the
//! store's column names.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Membership standing shared by members and dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonStatus {
    #[serde(rename = "ativo")]
    Active,
    #[serde(rename = "inativo")]
    Inactive,
    #[serde(rename = "suspenso")]
    Suspended,
    #[serde(rename = "expulso")]
    Expelled,
}

impl PersonStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, PersonStatus::Active)
    }

    pub fn store_value(&self) -> &'static str {
        match self {
            PersonStatus::Active => "ativo",
            PersonStatus::Inactive => "inativo",
            PersonStatus::Suspended => "suspenso",
            PersonStatus::Expelled => "expulso",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PersonStatus::Active => "active",
            PersonStatus::Inactive => "inactive",
            PersonStatus::Suspended => "suspended",
            PersonStatus::Expelled => "expelled",
        }
    }
}

impl fmt::Display for PersonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    #[serde(rename = "individual")]
    Individual,
    #[serde(rename = "familiar")]
    Family,
    #[serde(rename = "patrimonial")]
    Estate,
}

impl Plan {
    pub fn store_value(&self) -> &'static str {
        match self {
            Plan::Individual => "individual",
            Plan::Family => "familiar",
            Plan::Estate => "patrimonial",
        }
    }
}

/// Primary account holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(rename = "numero_titulo", default)]
    pub title_number: Option<i64>,
    #[serde(rename = "cpf", default)]
    pub tax_id: Option<String>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "plano", default)]
    pub plan: Option<Plan>,
    pub status: PersonStatus,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Person attached to a member's account. Financial standing is the guardian's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependent {
    pub id: String,
    #[serde(rename = "associado_id")]
    pub guardian_id: String,
    #[serde(rename = "nome")]
    pub name: String,
    pub status: PersonStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DueStatus {
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "pago")]
    Paid,
    #[serde(rename = "atrasado")]
    Overdue,
    #[serde(rename = "cancelado")]
    Canceled,
}

impl DueStatus {
    pub fn store_value(&self) -> &'static str {
        match self {
            DueStatus::Pending => "pendente",
            DueStatus::Paid => "pago",
            DueStatus::Overdue => "atrasado",
            DueStatus::Canceled => "cancelado",
        }
    }
}

/// One billing-period charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Due {
    pub id: String,
    #[serde(rename = "associado_id")]
    pub member_id: String,
    /// Billing period as `YYYY-MM`.
    #[serde(rename = "referencia")]
    pub reference: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "valor_pago", default)]
    pub paid_amount: Option<f64>,
    #[serde(rename = "data_vencimento")]
    pub due_date: NaiveDate,
    #[serde(rename = "data_pagamento", default)]
    pub payment_date: Option<NaiveDate>,
    pub status: DueStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamResult {
    #[serde(rename = "apto")]
    Fit,
    #[serde(rename = "inapto")]
    Unfit,
    #[serde(rename = "pendente")]
    Pending,
}

impl ExamResult {
    pub fn store_value(&self) -> &'static str {
        match self {
            ExamResult::Fit => "apto",
            ExamResult::Unfit => "inapto",
            ExamResult::Pending => "pendente",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalExam {
    pub id: String,
    #[serde(rename = "associado_id", default)]
    pub member_id: Option<String>,
    #[serde(rename = "dependente_id", default)]
    pub dependent_id: Option<String>,
    #[serde(rename = "data_exame", default)]
    pub exam_date: Option<NaiveDate>,
    #[serde(rename = "data_validade")]
    pub expiry_date: NaiveDate,
    #[serde(rename = "resultado")]
    pub result: ExamResult,
}

impl MedicalExam {
    /// Fit and not expired; the expiry day itself still counts.
    pub fn clears_on(&self, today: NaiveDate) -> bool {
        self.result == ExamResult::Fit && self.expiry_date >= today
    }
}

/// Either kind of person the front desk evaluates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PersonRecord {
    Member(Member),
    Dependent(Dependent),
}

impl PersonRecord {
    pub fn id(&self) -> &str {
        match self {
            PersonRecord::Member(member) => &member.id,
            PersonRecord::Dependent(dependent) => &dependent.id,
        }
    }

    pub fn status(&self) -> PersonStatus {
        match self {
            PersonRecord::Member(member) => member.status,
            PersonRecord::Dependent(dependent) => dependent.status,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PersonRecord::Member(member) => &member.name,
            PersonRecord::Dependent(dependent) => &dependent.name,
        }
    }
}
