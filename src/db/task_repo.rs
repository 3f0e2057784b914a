// src/db/task_repo.rs

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::task::{Task, TaskWithLead},
};

#[derive(Clone, Default)]
pub struct TaskRepository;

impl TaskRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        user_id: Uuid,
        task_type: &str,
        task_date: NaiveDate,
        task_time: Option<NaiveTime>,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (lead_id, user_id, task_type, task_date, task_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(lead_id)
        .bind(user_id)
        .bind(task_type)
        .bind(task_date)
        .bind(task_time)
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    pub async fn find<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(task)
    }

    // Inverte o flag no próprio UPDATE (sem ler antes)
    pub async fn toggle_completed<'e, E>(&self, executor: E, id: Uuid) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET completed = NOT completed, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Task {}", id)))
    }

    /// Tarefas do usuário no dia, por horário (sem horário por último)
    pub async fn for_user_on<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<Vec<TaskWithLead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tasks = sqlx::query_as::<_, TaskWithLead>(
            r#"
            SELECT
                t.*,
                l.name AS lead_name,
                l.mobile AS lead_mobile,
                l.city AS lead_city
            FROM tasks t
            INNER JOIN leads l ON l.id = t.lead_id
            WHERE t.user_id = $1 AND t.task_date = $2
            ORDER BY t.task_time ASC NULLS LAST
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_all(executor)
        .await?;

        Ok(tasks)
    }
}
