// src/handlers/profiles.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::profile::{Profile, ProfileWithStats, SalesUser, UpdateRolePayload},
};

#[utoipa::path(
    get,
    path = "/api/profiles/me",
    tag = "Profiles",
    responses(
        (status = 200, description = "Perfil do usuário logado", body = Profile),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(profile): AuthenticatedUser) -> impl IntoResponse {
    Json(profile)
}

#[utoipa::path(
    get,
    path = "/api/profiles",
    tag = "Profiles",
    responses(
        (status = 200, description = "Perfis com contadores de leads", body = Vec<ProfileWithStats>),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_profiles(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let profiles = app_state.profile_repo.list_with_stats(&app_state.db_pool).await?;
    Ok(Json(profiles))
}

#[utoipa::path(
    get,
    path = "/api/profiles/sales",
    tag = "Profiles",
    responses((status = 200, description = "Vendedores para o seletor de responsável", body = Vec<SalesUser>)),
    security(("api_jwt" = []))
)]
pub async fn list_sales_users(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.profile_repo.list_sales_users(&app_state.db_pool).await?;
    Ok(Json(users))
}

#[utoipa::path(
    patch,
    path = "/api/profiles/{id}/role",
    tag = "Profiles",
    params(("id" = Uuid, Path, description = "ID do perfil")),
    request_body = UpdateRolePayload,
    responses(
        (status = 200, description = "Papel alterado", body = Profile),
        (status = 404, description = "Perfil não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state
        .profile_repo
        .update_role(&app_state.db_pool, id, payload.role)
        .await?;

    tracing::info!("Papel do perfil {} alterado para {}", profile.id, profile.role);
    Ok(Json(profile))
}
