// src/models/site_visit.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::lead::Lead;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteVisit {
    pub id: Uuid,
    pub lead_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2025-03-20")]
    pub scheduled_date: NaiveDate,
    #[schema(value_type = String, example = "11:30:00")]
    pub scheduled_time: NaiveTime,
    pub notes: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Visita com os dados de contato do lead (agenda de hoje/amanhã)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingSiteVisit {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub visit: SiteVisit,
    pub lead_name: String,
    pub lead_mobile: String,
    pub lead_city: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSiteVisitPayload {
    #[schema(value_type = String, format = Date, example = "2025-03-20")]
    pub scheduled_date: NaiveDate,
    #[schema(value_type = String, example = "11:30:00")]
    pub scheduled_time: NaiveTime,
    #[validate(length(max = 2000, message = "too_long"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSiteVisit {
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub notes: Option<String>,
}

/// Resultado das duas escritas pareadas (status do lead + visita).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteVisitOutcome {
    pub lead: Lead,
    pub site_visit: SiteVisit,
}
