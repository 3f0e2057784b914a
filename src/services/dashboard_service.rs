// src/services/dashboard_service.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DashboardRepository, ProfileRepository},
    models::dashboard::{AdminSummary, UserPerformance, UserSummary},
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    profile_repo: ProfileRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, profile_repo: ProfileRepository) -> Self {
        Self { repo, profile_repo }
    }

    pub async fn admin_summary<'e, E>(&self, executor: E, today: NaiveDate) -> Result<AdminSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.repo.admin_summary(executor, today).await
    }

    pub async fn user_summary<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<UserSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.repo.user_summary(executor, user_id, today).await
    }

    pub async fn performance(&self, pool: &PgPool, user_id: Uuid) -> Result<UserPerformance, AppError> {
        let profile = self.profile_repo.get(pool, user_id).await?;
        let (assigned, converted) = self.repo.conversion_counts(pool, user_id).await?;

        Ok(UserPerformance::new(profile.id, profile.full_name, assigned, converted))
    }
}
