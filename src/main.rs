//src/main.rs

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

// Planilhas de importação passam fácil do limite padrão de 2 MB
const IMPORT_BODY_LIMIT: usize = 20 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realty_crm=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(&config)
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = build_router(app_state, cors_layer(&config)?);

    // Inicia o servidor
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .context("Falha ao iniciar o listener TCP")?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await.context("Erro no servidor Axum")?;

    Ok(())
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let origin = match &config.cors_origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin).with_context(|| format!("CORS_ORIGIN inválida: {}", origin))?,
        ),
        // sem origem configurada (desenvolvimento): libera qualquer uma
        None => AllowOrigin::from(Any),
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_DISPOSITION]))
}

fn build_router(app_state: AppState, cors: CorsLayer) -> Router {
    let profile_routes = Router::new()
        .route("/", get(handlers::profiles::list_profiles))
        .route("/me", get(handlers::profiles::get_me))
        .route("/sales", get(handlers::profiles::list_sales_users))
        .route("/{id}/role", patch(handlers::profiles::update_role));

    let lead_routes = Router::new()
        .route(
            "/",
            post(handlers::leads::create_lead).get(handlers::leads::list_leads),
        )
        .route("/cities", get(handlers::leads::list_cities))
        .route("/followups/today", get(handlers::leads::todays_followups))
        .route("/export", get(handlers::leads::export_leads))
        .route(
            "/import",
            post(handlers::leads::import_leads).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
        .route(
            "/{id}",
            get(handlers::leads::get_lead)
                .put(handlers::leads::update_lead)
                .delete(handlers::leads::delete_lead),
        )
        .route("/{id}/status", patch(handlers::leads::update_status))
        .route("/{id}/assign", post(handlers::leads::assign_lead))
        .route("/{id}/site-visits", post(handlers::leads::schedule_site_visit));

    let site_visit_routes = Router::new()
        .route("/upcoming", get(handlers::site_visits::upcoming_site_visits))
        .route("/{id}/complete", post(handlers::site_visits::complete_site_visit));

    let task_routes = Router::new()
        .route("/", post(handlers::tasks::create_task))
        .route("/today", get(handlers::tasks::todays_tasks))
        .route("/{id}/toggle", patch(handlers::tasks::toggle_task));

    let dashboard_routes = Router::new()
        .route("/admin", get(handlers::dashboard::admin_summary))
        .route("/me", get(handlers::dashboard::my_summary))
        .route("/users/{id}/performance", get(handlers::dashboard::user_performance));

    // Tudo abaixo de /api (menos o health) exige token
    let protected = Router::new()
        .nest("/profiles", profile_routes)
        .nest("/leads", lead_routes)
        .nest("/site-visits", site_visit_routes)
        .nest("/tasks", task_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
