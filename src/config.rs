// src/config.rs

use crate::{
    db::{
        DashboardRepository, LeadRepository, ProfileRepository, SiteVisitRepository, TaskRepository,
    },
    services::{
        auth::AuthService, dashboard_service::DashboardService, lead_service::LeadService,
        site_visit_service::SiteVisitService, task_service::TaskService,
    },
};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

/// Configuração lida do ambiente (.env é carregado se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("APP_PORT") {
            Ok(raw) => raw.parse().context("APP_PORT inválida")?,
            Err(_) => 3000,
        };
        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().context("DB_MAX_CONNECTIONS inválido")?,
            Err(_) => 5,
        };
        let cors_origin = env::var("CORS_ORIGIN").ok().filter(|o| !o.trim().is_empty());

        Ok(Self {
            database_url,
            jwt_secret,
            host,
            port,
            max_connections,
            cors_origin,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub profile_repo: ProfileRepository,
    pub lead_service: LeadService,
    pub site_visit_service: SiteVisitService,
    pub task_service: TaskService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config.jwt_secret.clone()))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let profile_repo = ProfileRepository::new();
        let lead_repo = LeadRepository::new();
        let site_visit_repo = SiteVisitRepository::new();

        let auth_service = AuthService::new(profile_repo.clone(), jwt_secret);
        let lead_service = LeadService::new(lead_repo.clone(), site_visit_repo.clone(), profile_repo.clone());
        let site_visit_service = SiteVisitService::new(lead_repo.clone(), site_visit_repo);
        let task_service = TaskService::new(TaskRepository::new(), lead_repo);
        let dashboard_service = DashboardService::new(DashboardRepository::new(), profile_repo.clone());

        Self {
            db_pool,
            auth_service,
            profile_repo,
            lead_service,
            site_visit_service,
            task_service,
            dashboard_service,
        }
    }
}
