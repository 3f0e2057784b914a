// src/models/task.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::lead::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub user_id: Uuid,
    // Categoria livre: call, meeting, site_visit, follow_up, documentation...
    #[schema(example = "call")]
    pub task_type: String,
    #[schema(value_type = String, format = Date, example = "2025-03-20")]
    pub task_date: NaiveDate,
    #[schema(value_type = Option<String>, example = "10:00:00")]
    pub task_time: Option<NaiveTime>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithLead {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub task: Task,
    pub lead_name: String,
    pub lead_mobile: String,
    pub lead_city: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    pub lead_id: Uuid,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "follow_up")]
    pub task_type: String,

    #[schema(value_type = String, format = Date, example = "2025-03-20")]
    pub task_date: NaiveDate,

    #[schema(value_type = Option<String>, example = "10:00:00")]
    pub task_time: Option<NaiveTime>,
}
