// src/handlers/dashboard.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::dashboard::{AdminSummary, UserPerformance, UserSummary},
};

#[utoipa::path(
    get,
    path = "/api/dashboard/admin",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contadores gerais do funil", body = AdminSummary),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn admin_summary(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state
        .dashboard_service
        .admin_summary(&app_state.db_pool, Utc::now().date_naive())
        .await?;

    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/me",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contadores do vendedor logado", body = UserSummary),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn my_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state
        .dashboard_service
        .user_summary(&app_state.db_pool, caller.id, Utc::now().date_naive())
        .await?;

    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/users/{id}/performance",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "ID do perfil")),
    responses(
        (status = 200, description = "Taxa de conversão do vendedor", body = UserPerformance),
        (status = 404, description = "Perfil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn user_performance(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let performance = app_state
        .dashboard_service
        .performance(&app_state.db_pool, id)
        .await?;

    Ok(Json(performance))
}
