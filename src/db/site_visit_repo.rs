// src/db/site_visit_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::site_visit::{NewSiteVisit, SiteVisit, UpcomingSiteVisit},
};

#[derive(Clone, Default)]
pub struct SiteVisitRepository;

impl SiteVisitRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        visit: &NewSiteVisit,
    ) -> Result<SiteVisit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, SiteVisit>(
            r#"
            INSERT INTO site_visits (lead_id, scheduled_date, scheduled_time, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(lead_id)
        .bind(visit.scheduled_date)
        .bind(visit.scheduled_time)
        .bind(&visit.notes)
        .fetch_one(executor)
        .await?;

        Ok(created)
    }

    pub async fn find<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<SiteVisit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visit = sqlx::query_as::<_, SiteVisit>("SELECT * FROM site_visits WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(visit)
    }

    pub async fn mark_completed<'e, E>(&self, executor: E, id: Uuid) -> Result<SiteVisit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SiteVisit>(
            "UPDATE site_visits SET completed = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Site visit {}", id)))
    }

    pub async fn list_for_lead<'e, E>(&self, executor: E, lead_id: Uuid) -> Result<Vec<SiteVisit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visits = sqlx::query_as::<_, SiteVisit>(
            r#"
            SELECT * FROM site_visits
            WHERE lead_id = $1
            ORDER BY scheduled_date ASC, scheduled_time ASC
            "#,
        )
        .bind(lead_id)
        .fetch_all(executor)
        .await?;

        Ok(visits)
    }

    /// Visitas pendentes dos leads do usuário entre `from` e `to` (inclusive)
    pub async fn upcoming_for_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<UpcomingSiteVisit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visits = sqlx::query_as::<_, UpcomingSiteVisit>(
            r#"
            SELECT
                sv.*,
                l.name AS lead_name,
                l.mobile AS lead_mobile,
                l.city AS lead_city
            FROM site_visits sv
            INNER JOIN leads l ON l.id = sv.lead_id
            WHERE l.assigned_to = $1
              AND sv.completed = FALSE
              AND sv.scheduled_date BETWEEN $2 AND $3
            ORDER BY sv.scheduled_date ASC, sv.scheduled_time ASC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;

        Ok(visits)
    }
}
