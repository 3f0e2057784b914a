// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Profiles ---
        handlers::profiles::get_me,
        handlers::profiles::list_profiles,
        handlers::profiles::list_sales_users,
        handlers::profiles::update_role,

        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::list_leads,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::update_status,
        handlers::leads::assign_lead,
        handlers::leads::delete_lead,
        handlers::leads::list_cities,
        handlers::leads::todays_followups,
        handlers::leads::export_leads,
        handlers::leads::import_leads,

        // --- Site Visits ---
        handlers::leads::schedule_site_visit,
        handlers::site_visits::upcoming_site_visits,
        handlers::site_visits::complete_site_visit,

        // --- Tasks ---
        handlers::tasks::create_task,
        handlers::tasks::todays_tasks,
        handlers::tasks::toggle_task,

        // --- Dashboard ---
        handlers::dashboard::admin_summary,
        handlers::dashboard::my_summary,
        handlers::dashboard::user_performance,
    ),
    components(
        schemas(
            // --- Profiles ---
            models::profile::UserRole,
            models::profile::Profile,
            models::profile::ProfileWithStats,
            models::profile::SalesUser,
            models::profile::UpdateRolePayload,

            // --- Leads ---
            models::lead::LeadStatus,
            models::lead::LeadQuality,
            models::lead::Lead,
            models::lead::LeadView,
            models::lead::LeadDetail,
            models::lead::CreateLeadPayload,
            models::lead::UpdateLeadPayload,
            models::lead::UpdateStatusPayload,
            models::lead::AssignLeadPayload,
            models::lead::ImportSummary,

            // --- Site Visits ---
            models::site_visit::SiteVisit,
            models::site_visit::UpcomingSiteVisit,
            models::site_visit::ScheduleSiteVisitPayload,
            models::site_visit::SiteVisitOutcome,

            // --- Tasks ---
            models::task::Task,
            models::task::TaskWithLead,
            models::task::CreateTaskPayload,

            // --- Dashboard ---
            models::dashboard::AdminSummary,
            models::dashboard::UserSummary,
            models::dashboard::UserPerformance,
        )
    ),
    tags(
        (name = "Profiles", description = "Perfis e Papéis (admin / vendedor)"),
        (name = "Leads", description = "Cadastro, Filtros, Atribuição e Planilhas"),
        (name = "Site Visits", description = "Agenda de Visitas aos Imóveis"),
        (name = "Tasks", description = "Lembretes Diários"),
        (name = "Dashboard", description = "Indicadores do Funil")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
