// src/handlers/tasks.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::task::{CreateTaskPayload, Task, TaskWithLead},
};

#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    request_body = CreateTaskPayload,
    responses(
        (status = 201, description = "Tarefa criada para o usuário logado", body = Task),
        (status = 403, description = "Lead de outro vendedor")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let task = app_state
        .task_service
        .create(&app_state.db_pool, &caller, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    get,
    path = "/api/tasks/today",
    tag = "Tasks",
    responses((status = 200, description = "Tarefas de hoje, por horário", body = Vec<TaskWithLead>)),
    security(("api_jwt" = []))
)]
pub async fn todays_tasks(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let tasks = app_state
        .task_service
        .for_day(&app_state.db_pool, &caller, Utc::now().date_naive())
        .await?;

    Ok(Json(tasks))
}

#[utoipa::path(
    patch,
    path = "/api/tasks/{id}/toggle",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Tarefa com 'completed' invertido", body = Task),
        (status = 403, description = "Tarefa de outro usuário"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_task(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let task = app_state.task_service.toggle(&app_state.db_pool, &caller, id).await?;
    Ok(Json(task))
}
