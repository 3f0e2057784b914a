// src/services/task_service.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeadRepository, TaskRepository},
    models::{
        profile::Profile,
        task::{CreateTaskPayload, Task, TaskWithLead},
    },
    services::lead_service::ensure_lead_access,
};

// Tarefa é pessoal: só o dono (ou um admin) mexe nela
fn ensure_task_owner(caller: &Profile, task: &Task) -> Result<(), AppError> {
    if caller.is_admin() || task.user_id == caller.id {
        Ok(())
    } else {
        Err(AppError::Forbidden("This task belongs to another user".to_string()))
    }
}

#[derive(Clone)]
pub struct TaskService {
    repo: TaskRepository,
    lead_repo: LeadRepository,
}

impl TaskService {
    pub fn new(repo: TaskRepository, lead_repo: LeadRepository) -> Self {
        Self { repo, lead_repo }
    }

    /// Cria a tarefa em nome de quem chamou, num lead que ele pode ver.
    pub async fn create(&self, pool: &PgPool, caller: &Profile, payload: CreateTaskPayload) -> Result<Task, AppError> {
        let lead = self
            .lead_repo
            .find(pool, payload.lead_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Lead {}", payload.lead_id)))?;
        ensure_lead_access(caller, &lead.lead)?;

        self.repo
            .create(
                pool,
                payload.lead_id,
                caller.id,
                payload.task_type.trim(),
                payload.task_date,
                payload.task_time,
            )
            .await
    }

    pub async fn for_day(&self, pool: &PgPool, caller: &Profile, day: NaiveDate) -> Result<Vec<TaskWithLead>, AppError> {
        self.repo.for_user_on(pool, caller.id, day).await
    }

    pub async fn toggle(&self, pool: &PgPool, caller: &Profile, id: Uuid) -> Result<Task, AppError> {
        let task = self
            .repo
            .find(pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Task {}", id)))?;
        ensure_task_owner(caller, &task)?;

        self.repo.toggle_completed(pool, id).await
    }
}
