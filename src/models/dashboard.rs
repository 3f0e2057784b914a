// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

// 1. Cards do painel do admin
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub total_leads: i64,
    pub new_leads: i64,
    pub in_progress_leads: i64,
    pub converted_leads: i64,
    pub total_users: i64,
    pub today_tasks: i64,
}

// 2. Cards do painel do vendedor
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub assigned_leads: i64,
    pub in_progress_leads: i64,
    pub converted_leads: i64,
    pub today_tasks: i64,
}

// 3. Desempenho de um vendedor (visão do admin)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPerformance {
    pub user_id: Uuid,
    #[schema(example = "Priya Sharma")]
    pub user_name: String,
    pub assigned_leads: i64,
    pub converted_leads: i64,
    // None quando não há leads atribuídos
    #[schema(example = 25)]
    pub conversion_rate: Option<i64>,
    #[schema(example = "25% conversion rate")]
    pub conversion_label: String,
}

impl UserPerformance {
    pub fn new(user_id: Uuid, user_name: String, assigned_leads: i64, converted_leads: i64) -> Self {
        let conversion_rate = conversion_rate(assigned_leads, converted_leads);
        let conversion_label = match conversion_rate {
            Some(rate) => format!("{}% conversion rate", rate),
            None => "No leads assigned".to_string(),
        };

        Self {
            user_id,
            user_name,
            assigned_leads,
            converted_leads,
            conversion_rate,
            conversion_label,
        }
    }
}

/// Percentual inteiro (arredondado) de convertidos sobre atribuídos.
pub fn conversion_rate(assigned: i64, converted: i64) -> Option<i64> {
    if assigned <= 0 {
        return None;
    }
    Some(((converted as f64 / assigned as f64) * 100.0).round() as i64)
}
