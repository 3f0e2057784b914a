// src/models/lead.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::models::site_visit::SiteVisit;

// --- ENUMS ---

// Mapeia o CREATE TYPE lead_status do banco.
// A taxonomia restringe os valores, não as transições: qualquer status pode ser gravado a qualquer momento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Assigned,
    InProgress,
    SiteVisitScheduled,
    SiteVisitDone,
    Converted,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 7] = [
        LeadStatus::New,
        LeadStatus::Assigned,
        LeadStatus::InProgress,
        LeadStatus::SiteVisitScheduled,
        LeadStatus::SiteVisitDone,
        LeadStatus::Converted,
        LeadStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Assigned => "assigned",
            LeadStatus::InProgress => "in_progress",
            LeadStatus::SiteVisitScheduled => "site_visit_scheduled",
            LeadStatus::SiteVisitDone => "site_visit_done",
            LeadStatus::Converted => "converted",
            LeadStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("'{}' is not a valid lead status", s))
    }
}

// Mapeia o CREATE TYPE lead_quality do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_quality", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadQuality {
    Hot,
    Warm,
    Cold,
}

impl LeadQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadQuality::Hot => "hot",
            LeadQuality::Warm => "warm",
            LeadQuality::Cold => "cold",
        }
    }
}

impl fmt::Display for LeadQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot" => Ok(LeadQuality::Hot),
            "warm" => Ok(LeadQuality::Warm),
            "cold" => Ok(LeadQuality::Cold),
            other => Err(format!("'{}' is not a valid lead quality", other)),
        }
    }
}

// --- LEAD (O Dado) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,

    #[schema(example = "Rahul Mehta")]
    pub name: String,
    #[schema(example = "rahul@mail.example")]
    pub email: Option<String>,
    #[schema(example = "9876543210")]
    pub mobile: String,
    #[schema(example = "Pune")]
    pub city: String,

    #[schema(example = "2BHK apartment")]
    pub what_to_buy: Option<String>,
    #[schema(example = "75 lakhs")]
    pub budget: Option<String>,
    pub professional_background: Option<String>,
    pub notes: Option<String>,

    pub quality: Option<LeadQuality>,
    pub status: LeadStatus,

    // Referência fraca ao perfil responsável (NULL = sem responsável)
    pub assigned_to: Option<Uuid>,

    pub followup_date: Option<NaiveDate>,
    pub buying_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lead com o nome do responsável já resolvido (LEFT JOIN em profiles).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub lead: Lead,
    #[schema(example = "Priya Sharma")]
    pub assignee_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetail {
    #[serde(flatten)]
    pub lead: LeadView,
    pub site_visits: Vec<SiteVisit>,
}

// --- PAYLOADS ---

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("This field is required".into());
        return Err(err);
    }
    Ok(())
}

// E-mail é opcional e o formulário manda "" quando fica em branco
fn email_or_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Rahul Mehta")]
    pub name: String,

    #[validate(custom(function = "email_or_blank"))]
    pub email: Option<String>,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "9876543210")]
    pub mobile: String,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Pune")]
    pub city: String,

    pub what_to_buy: Option<String>,
    pub budget: Option<String>,
    pub professional_background: Option<String>,
    pub notes: Option<String>,
    pub quality: Option<LeadQuality>,

    #[schema(value_type = Option<String>, format = Date, example = "2025-03-15")]
    pub followup_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date, example = "2025-06-01")]
    pub buying_date: Option<NaiveDate>,

    // Só é considerado quando quem cria é admin
    pub assigned_to: Option<Uuid>,
}

// Substitui todos os campos editáveis (a tela de edição envia o formulário inteiro)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[validate(custom(function = "email_or_blank"))]
    pub email: Option<String>,

    #[validate(custom(function = "not_blank"))]
    pub mobile: String,

    #[validate(custom(function = "not_blank"))]
    pub city: String,

    pub status: LeadStatus,
    pub quality: Option<LeadQuality>,

    pub what_to_buy: Option<String>,
    pub budget: Option<String>,
    pub professional_background: Option<String>,
    pub notes: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub followup_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub buying_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    #[schema(example = "converted")]
    pub status: LeadStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignLeadPayload {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    #[schema(example = 42)]
    pub inserted: u64,
    #[schema(example = 3)]
    pub skipped: usize,
}

/// Campos normalizados prontos para o INSERT.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub name: String,
    pub email: Option<String>,
    pub mobile: String,
    pub city: String,
    pub what_to_buy: Option<String>,
    pub budget: Option<String>,
    pub professional_background: Option<String>,
    pub notes: Option<String>,
    pub quality: Option<LeadQuality>,
    pub status: LeadStatus,
    pub assigned_to: Option<Uuid>,
    pub followup_date: Option<NaiveDate>,
    pub buying_date: Option<NaiveDate>,
}

/// Texto opcional vazio (ou só espaços) vira NULL.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
