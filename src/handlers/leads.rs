// src/handlers/leads.rs

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::{
        lead::{
            blank_to_none, AssignLeadPayload, CreateLeadPayload, ImportSummary, Lead, LeadDetail, LeadView,
            UpdateLeadPayload, UpdateStatusPayload,
        },
        lead_filter::{LeadFilter, LeadFilterParams},
        site_visit::{NewSiteVisit, ScheduleSiteVisitPayload, SiteVisitOutcome},
    },
    services::lead_export::EXPORT_FILENAME,
};

// =============================================================================
//  CADASTRO
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Campos obrigatórios ausentes"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state
        .lead_service
        .create(&app_state.db_pool, &caller, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(LeadFilterParams, Pagination),
    responses(
        (status = 200, description = "Leads do filtro, mais recentes primeiro", body = Vec<LeadView>),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(params): Query<LeadFilterParams>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let filter = LeadFilter::try_from(params)?;

    let leads = app_state
        .lead_service
        .list(&app_state.db_pool, &caller, filter, page)
        .await?;

    Ok(Json(leads))
}

#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead com as visitas", body = LeadDetail),
        (status = 403, description = "Lead de outro vendedor"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.lead_service.get(&app_state.db_pool, &caller, id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 403, description = "Lead de outro vendedor"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state
        .lead_service
        .update(&app_state.db_pool, &caller, id, payload)
        .await?;

    Ok(Json(lead))
}

#[utoipa::path(
    patch,
    path = "/api/leads/{id}/status",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status gravado", body = Lead),
        (status = 403, description = "Lead de outro vendedor"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_service
        .set_status(&app_state.db_pool, &caller, id, payload.status)
        .await?;

    Ok(Json(lead))
}

#[utoipa::path(
    post,
    path = "/api/leads/{id}/assign",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = AssignLeadPayload,
    responses(
        (status = 200, description = "Responsável trocado, status 'in_progress'", body = Lead),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Lead ou usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_lead(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_service
        .assign(&app_state.db_pool, id, payload.user_id)
        .await?;

    Ok(Json(lead))
}

#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 204, description = "Lead removido (visitas e tarefas junto)"),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.lead_service.delete(&app_state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  VISITAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/leads/{id}/site-visits",
    tag = "Site Visits",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = ScheduleSiteVisitPayload,
    responses(
        (status = 201, description = "Lead em 'site_visit_scheduled' e visita criada", body = SiteVisitOutcome),
        (status = 403, description = "Lead de outro vendedor"),
        (status = 500, description = "Uma das duas escritas falhou; a mensagem diz qual")
    ),
    security(("api_jwt" = []))
)]
pub async fn schedule_site_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleSiteVisitPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let visit = NewSiteVisit {
        scheduled_date: payload.scheduled_date,
        scheduled_time: payload.scheduled_time,
        notes: blank_to_none(payload.notes),
    };

    let outcome = app_state
        .site_visit_service
        .schedule(&app_state.db_pool, &caller, id, visit)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

// =============================================================================
//  APOIO (agenda e filtros)
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/leads/cities",
    tag = "Leads",
    responses((status = 200, description = "Cidades distintas, em ordem alfabética", body = Vec<String>)),
    security(("api_jwt" = []))
)]
pub async fn list_cities(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, AppError> {
    let cities = app_state.lead_service.cities(&app_state.db_pool).await?;
    Ok(Json(cities))
}

#[utoipa::path(
    get,
    path = "/api/leads/followups/today",
    tag = "Leads",
    responses((status = 200, description = "Leads do usuário com follow-up hoje", body = Vec<Lead>)),
    security(("api_jwt" = []))
)]
pub async fn todays_followups(
    State(app_state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let leads = app_state
        .lead_service
        .followups(&app_state.db_pool, &caller, today)
        .await?;

    Ok(Json(leads))
}

// =============================================================================
//  PLANILHAS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/leads/export",
    tag = "Leads",
    params(LeadFilterParams),
    responses(
        (status = 200, description = "CSV com todos os leads do filtro", content_type = "text/csv", body = String),
        (status = 422, description = "Nenhum lead no filtro")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_leads(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Query(params): Query<LeadFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = LeadFilter::try_from(params)?;
    let csv = app_state.lead_service.export_csv(&app_state.db_pool, filter).await?;

    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

#[utoipa::path(
    post,
    path = "/api/leads/import",
    tag = "Leads",
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "Arquivo .xlsx/.xls/.ods"),
    responses(
        (status = 201, description = "Linhas válidas inseridas", body = ImportSummary),
        (status = 400, description = "Arquivo ilegível"),
        (status = 422, description = "Nenhuma linha válida")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_leads(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if body.is_empty() {
        return Err(AppError::InvalidInput("Upload a spreadsheet file".to_string()));
    }

    let summary = app_state
        .lead_service
        .import_workbook(&app_state.db_pool, &body)
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}
