// src/handlers/site_visits.rs

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
    middleware::auth::AuthenticatedUser,
    models::site_visit::{SiteVisitOutcome, UpcomingSiteVisit},
};

#[utoipa::path(
    get,
    path = "/api/site-visits/upcoming",
    tag = "Site Visits",
    responses(
        (status = 200, description = "Visitas pendentes de hoje e amanhã", body = Vec<UpcomingSiteVisit>)
    ),
    security(("api_jwt" = []))
)]
pub async fn upcoming_site_visits(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let visits = app_state
        .site_visit_service
        .upcoming(&app_state.db_pool, &caller, Utc::now().date_naive())
        .await?;

    Ok(Json(visits))
}

#[utoipa::path(
    post,
    path = "/api/site-visits/{id}/complete",
    tag = "Site Visits",
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita concluída e lead em 'site_visit_done'", body = SiteVisitOutcome),
        (status = 404, description = "Visita não encontrada"),
        (status = 500, description = "Uma das duas escritas falhou; a mensagem diz qual")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_site_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state
        .site_visit_service
        .complete(&app_state.db_pool, &caller, id)
        .await?;

    Ok(Json(outcome))
}
