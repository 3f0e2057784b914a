// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        dashboard::{AdminSummary, UserSummary},
        lead::LeadStatus,
    },
};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // 1. Cards do admin
    pub async fn admin_summary<'e, E>(&self, executor: E, today: NaiveDate) -> Result<AdminSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Transação só de leitura: snapshot consistente entre as contagens
        let mut tx = executor.begin().await?;

        let total_leads = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads")
            .fetch_one(&mut *tx)
            .await?;

        let mut by_status = Vec::with_capacity(3);
        for status in [LeadStatus::New, LeadStatus::InProgress, LeadStatus::Converted] {
            let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leads WHERE status = $1")
                .bind(status)
                .fetch_one(&mut *tx)
                .await?;
            by_status.push(count);
        }

        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles")
            .fetch_one(&mut *tx)
            .await?;

        let today_tasks = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE task_date = $1")
            .bind(today)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(AdminSummary {
            total_leads,
            new_leads: by_status[0],
            in_progress_leads: by_status[1],
            converted_leads: by_status[2],
            total_users,
            today_tasks,
        })
    }

    // 2. Cards do vendedor
    pub async fn user_summary<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<UserSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let (assigned_leads, in_progress_leads, converted_leads) = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'in_progress'),
                COUNT(*) FILTER (WHERE status = 'converted')
            FROM leads
            WHERE assigned_to = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let today_tasks = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND task_date = $2",
        )
        .bind(user_id)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(UserSummary {
            assigned_leads,
            in_progress_leads,
            converted_leads,
            today_tasks,
        })
    }

    // 3. (atribuídos, convertidos) de um vendedor
    pub async fn conversion_counts<'e, E>(&self, executor: E, user_id: Uuid) -> Result<(i64, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = $2)
            FROM leads
            WHERE assigned_to = $1
            "#,
        )
        .bind(user_id)
        .bind(LeadStatus::Converted)
        .fetch_one(executor)
        .await?;

        Ok(counts)
    }
}
