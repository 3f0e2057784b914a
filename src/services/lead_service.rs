// src/services/lead_service.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    db::{LeadRepository, ProfileRepository, SiteVisitRepository},
    models::{
        lead::{
            blank_to_none, CreateLeadPayload, ImportSummary, Lead, LeadDetail, LeadStatus, LeadView,
            NewLead, UpdateLeadPayload,
        },
        lead_filter::LeadFilter,
        profile::Profile,
    },
    services::{lead_export, lead_import},
};

/// Admin enxerga tudo; usuário comum só os leads atribuídos a ele.
pub fn ensure_lead_access(caller: &Profile, lead: &Lead) -> Result<(), AppError> {
    if caller.is_admin() || lead.assigned_to == Some(caller.id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("You do not have access to this lead".to_string()))
    }
}

// Usuário comum nunca lista além dos próprios leads, qualquer que seja o filtro pedido
fn scope_filter(caller: &Profile, mut filter: LeadFilter) -> LeadFilter {
    if !caller.is_admin() {
        filter.assigned_to = Some(caller.id);
    }
    filter
}

// Regras de criação:
// - usuário comum: o lead nasce 'assigned' e atribuído a ele mesmo
// - admin com responsável: 'assigned'
// - admin sem responsável: 'new'
fn new_lead_from(caller: &Profile, payload: CreateLeadPayload) -> NewLead {
    let assigned_to = if caller.is_admin() { payload.assigned_to } else { Some(caller.id) };
    let status = if assigned_to.is_some() { LeadStatus::Assigned } else { LeadStatus::New };

    NewLead {
        name: payload.name.trim().to_string(),
        email: blank_to_none(payload.email),
        mobile: payload.mobile.trim().to_string(),
        city: payload.city.trim().to_string(),
        what_to_buy: blank_to_none(payload.what_to_buy),
        budget: blank_to_none(payload.budget),
        professional_background: blank_to_none(payload.professional_background),
        notes: blank_to_none(payload.notes),
        quality: payload.quality,
        status,
        assigned_to,
        followup_date: payload.followup_date,
        buying_date: payload.buying_date,
    }
}

fn updated_lead_from(payload: UpdateLeadPayload) -> NewLead {
    NewLead {
        name: payload.name.trim().to_string(),
        email: blank_to_none(payload.email),
        mobile: payload.mobile.trim().to_string(),
        city: payload.city.trim().to_string(),
        what_to_buy: blank_to_none(payload.what_to_buy),
        budget: blank_to_none(payload.budget),
        professional_background: blank_to_none(payload.professional_background),
        notes: blank_to_none(payload.notes),
        quality: payload.quality,
        status: payload.status,
        assigned_to: None, // ignorado pelo UPDATE
        followup_date: payload.followup_date,
        buying_date: payload.buying_date,
    }
}

#[derive(Clone)]
pub struct LeadService {
    repo: LeadRepository,
    visit_repo: SiteVisitRepository,
    profile_repo: ProfileRepository,
}

impl LeadService {
    pub fn new(repo: LeadRepository, visit_repo: SiteVisitRepository, profile_repo: ProfileRepository) -> Self {
        Self { repo, visit_repo, profile_repo }
    }

    // =========================================================================
    //  CADASTRO E EDIÇÃO
    // =========================================================================

    pub async fn create(&self, pool: &PgPool, caller: &Profile, payload: CreateLeadPayload) -> Result<Lead, AppError> {
        let new_lead = new_lead_from(caller, payload);

        if let Some(assignee) = new_lead.assigned_to.filter(|id| *id != caller.id) {
            // responsável precisa existir
            self.profile_repo.get(pool, assignee).await?;
        }

        let lead = self.repo.create(pool, &new_lead).await?;
        tracing::info!("✅ Lead {} criado por {} (status {})", lead.id, caller.email, lead.status);
        Ok(lead)
    }

    async fn accessible(&self, pool: &PgPool, caller: &Profile, id: Uuid) -> Result<LeadView, AppError> {
        let view = self
            .repo
            .find(pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Lead {}", id)))?;
        ensure_lead_access(caller, &view.lead)?;
        Ok(view)
    }

    pub async fn get(&self, pool: &PgPool, caller: &Profile, id: Uuid) -> Result<LeadDetail, AppError> {
        let lead = self.accessible(pool, caller, id).await?;
        let site_visits = self.visit_repo.list_for_lead(pool, id).await?;
        Ok(LeadDetail { lead, site_visits })
    }

    pub async fn update(
        &self,
        pool: &PgPool,
        caller: &Profile,
        id: Uuid,
        payload: UpdateLeadPayload,
    ) -> Result<Lead, AppError> {
        self.accessible(pool, caller, id).await?;
        self.repo.update(pool, id, &updated_lead_from(payload)).await
    }

    pub async fn set_status(
        &self,
        pool: &PgPool,
        caller: &Profile,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<Lead, AppError> {
        self.accessible(pool, caller, id).await?;
        self.repo.set_status(pool, id, status).await
    }

    /// Sobrescreve o responsável e move o lead para 'in_progress'.
    pub async fn assign(&self, pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Lead, AppError> {
        let assignee = self.profile_repo.get(pool, user_id).await?;
        let lead = self.repo.assign(pool, id, assignee.id, LeadStatus::InProgress).await?;

        tracing::info!("Lead {} atribuído a {}", lead.id, assignee.full_name);
        Ok(lead)
    }

    pub async fn delete(&self, pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        self.repo.delete(pool, id).await?;
        tracing::info!("🗑️ Lead {} removido", id);
        Ok(())
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn list(
        &self,
        pool: &PgPool,
        caller: &Profile,
        filter: LeadFilter,
        page: Pagination,
    ) -> Result<Vec<LeadView>, AppError> {
        self.repo.list(pool, &scope_filter(caller, filter), Some(page)).await
    }

    pub async fn cities(&self, pool: &PgPool) -> Result<Vec<String>, AppError> {
        self.repo.distinct_cities(pool).await
    }

    pub async fn followups(&self, pool: &PgPool, caller: &Profile, today: NaiveDate) -> Result<Vec<Lead>, AppError> {
        self.repo.followups_for(pool, caller.id, today).await
    }

    // =========================================================================
    //  PLANILHAS
    // =========================================================================

    /// CSV com todos os leads do filtro (sem paginação). Filtro vazio de resultado é falha "suave".
    pub async fn export_csv(&self, pool: &PgPool, filter: LeadFilter) -> Result<String, AppError> {
        let leads = self.repo.list(pool, &filter, None).await?;
        if leads.is_empty() {
            return Err(AppError::NoMatchingData("No data found with the selected filters".to_string()));
        }

        tracing::info!("📤 Exportando {} leads", leads.len());
        Ok(lead_export::to_csv(&leads))
    }

    pub async fn import_workbook(&self, pool: &PgPool, bytes: &[u8]) -> Result<ImportSummary, AppError> {
        let sheet = lead_import::parse_rows(lead_import::read_workbook(bytes)?);
        if sheet.rows.is_empty() {
            return Err(AppError::NoMatchingData("No valid leads found in the file".to_string()));
        }

        let inserted = self.repo.insert_many(pool, sheet.rows).await?;
        tracing::info!("📥 Importação: {} inseridos, {} linhas descartadas", inserted, sheet.skipped);

        Ok(ImportSummary { inserted, skipped: sheet.skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{lead_filter::tests::sample_lead, profile::UserRole};
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn profile(role: UserRole) -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            full_name: "Test User".into(),
            email: "test@crm.example".into(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    fn payload(assigned_to: Option<Uuid>) -> CreateLeadPayload {
        CreateLeadPayload {
            name: "  Asha Menon ".into(),
            email: Some("   ".into()),
            mobile: "9000000010".into(),
            city: "Kochi".into(),
            what_to_buy: Some("2BHK".into()),
            budget: Some("".into()),
            professional_background: None,
            notes: None,
            quality: None,
            followup_date: None,
            buying_date: None,
            assigned_to,
        }
    }

    #[test]
    fn user_created_lead_is_self_assigned() {
        let user = profile(UserRole::User);
        // usuário comum não escolhe responsável
        let lead = new_lead_from(&user, payload(Some(Uuid::new_v4())));

        assert_eq!(lead.status, LeadStatus::Assigned);
        assert_eq!(lead.assigned_to, Some(user.id));
    }

    #[test]
    fn admin_created_lead_status_depends_on_assignee() {
        let admin = profile(UserRole::Admin);

        let unassigned = new_lead_from(&admin, payload(None));
        assert_eq!(unassigned.status, LeadStatus::New);
        assert_eq!(unassigned.assigned_to, None);

        let sales = Uuid::new_v4();
        let assigned = new_lead_from(&admin, payload(Some(sales)));
        assert_eq!(assigned.status, LeadStatus::Assigned);
        assert_eq!(assigned.assigned_to, Some(sales));
    }

    #[test]
    fn create_normalizes_text_fields() {
        let lead = new_lead_from(&profile(UserRole::Admin), payload(None));
        assert_eq!(lead.name, "Asha Menon");
        assert_eq!(lead.email, None);
        assert_eq!(lead.budget, None);
        assert_eq!(lead.what_to_buy.as_deref(), Some("2BHK"));
    }

    #[test]
    fn users_only_reach_their_own_leads() {
        let user = profile(UserRole::User);
        let mut lead = sample_lead("Mine", LeadStatus::Assigned, "Pune");

        assert_matches!(ensure_lead_access(&user, &lead), Err(AppError::Forbidden(_)));

        lead.assigned_to = Some(user.id);
        assert!(ensure_lead_access(&user, &lead).is_ok());
        assert!(ensure_lead_access(&profile(UserRole::Admin), &lead).is_ok());
    }

    #[test]
    fn non_admin_listing_is_pinned_to_the_caller() {
        let user = profile(UserRole::User);
        let asked = LeadFilter { assigned_to: Some(Uuid::new_v4()), ..Default::default() };

        assert_eq!(scope_filter(&user, asked.clone()).assigned_to, Some(user.id));
        assert_eq!(scope_filter(&profile(UserRole::Admin), asked.clone()), asked);
    }

    #[test]
    fn update_keeps_requested_status_and_clears_blank_text() {
        let payload = UpdateLeadPayload {
            name: "Asha".into(),
            email: Some("".into()),
            mobile: "9000000010".into(),
            city: "Kochi".into(),
            status: LeadStatus::Converted,
            quality: None,
            what_to_buy: None,
            budget: None,
            professional_background: None,
            notes: Some("  ".into()),
            followup_date: None,
            buying_date: None,
        };

        let lead = updated_lead_from(payload);
        assert_eq!(lead.status, LeadStatus::Converted);
        assert_eq!(lead.notes, None);
        assert_eq!(lead.email, None);
    }
}
