// src/services/site_visit_service.rs
//
// Agendar e concluir visitas mexem em duas tabelas (status do lead + visita)
// com escritas independentes, sem transação e sem desfazer nada.

use std::fmt;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeadRepository, SiteVisitRepository},
    models::{
        lead::{Lead, LeadStatus},
        profile::Profile,
        site_visit::{NewSiteVisit, SiteVisit, SiteVisitOutcome, UpcomingSiteVisit},
    },
    services::lead_service::ensure_lead_access,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingPhase {
    LeadStatus,
    SiteVisitInsert,
    SiteVisitComplete,
}

impl fmt::Display for PairingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PairingPhase::LeadStatus => "updating the lead status",
            PairingPhase::SiteVisitInsert => "creating the site visit",
            PairingPhase::SiteVisitComplete => "completing the site visit",
        };
        f.write_str(label)
    }
}

/// Qual fase falhou e qual (se alguma) já tinha sido gravada.
#[derive(Debug)]
pub struct PairingError {
    pub phase: PairingPhase,
    pub applied: Option<PairingPhase>,
    pub source: Box<AppError>,
}

impl fmt::Display for PairingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.applied {
            None => write!(f, "Failed while {}; no changes were made", self.phase),
            Some(done) => write!(
                f,
                "Failed while {} after {} had already been saved; the earlier change was kept",
                self.phase, done
            ),
        }
    }
}

impl std::error::Error for PairingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl PairingError {
    fn at(phase: PairingPhase, source: AppError) -> Self {
        Self { phase, applied: None, source: Box::new(source) }
    }

    fn after(phase: PairingPhase, applied: PairingPhase, source: AppError) -> Self {
        tracing::warn!("Pareamento pela metade: '{}' gravado, '{}' falhou: {}", applied, phase, source);
        Self { phase, applied: Some(applied), source: Box::new(source) }
    }
}

// As três escritas envolvidas (e as leituras que as precedem), atrás de um trait
// para os testes rodarem sem banco
#[async_trait]
pub trait PairingStore: Send + Sync {
    async fn find_lead(&self, lead_id: Uuid) -> Result<Lead, AppError>;
    async fn find_site_visit(&self, visit_id: Uuid) -> Result<SiteVisit, AppError>;
    async fn set_lead_status(&self, lead_id: Uuid, status: LeadStatus) -> Result<Lead, AppError>;
    async fn insert_site_visit(&self, lead_id: Uuid, visit: &NewSiteVisit) -> Result<SiteVisit, AppError>;
    async fn complete_site_visit(&self, visit_id: Uuid) -> Result<SiteVisit, AppError>;
}

pub struct PgPairingStore<'a> {
    pool: &'a PgPool,
    leads: &'a LeadRepository,
    visits: &'a SiteVisitRepository,
}

#[async_trait]
impl PairingStore for PgPairingStore<'_> {
    async fn find_lead(&self, lead_id: Uuid) -> Result<Lead, AppError> {
        self.leads
            .find(self.pool, lead_id)
            .await?
            .map(|view| view.lead)
            .ok_or_else(|| AppError::ResourceNotFound(format!("Lead {}", lead_id)))
    }

    async fn find_site_visit(&self, visit_id: Uuid) -> Result<SiteVisit, AppError> {
        self.visits
            .find(self.pool, visit_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Site visit {}", visit_id)))
    }

    async fn set_lead_status(&self, lead_id: Uuid, status: LeadStatus) -> Result<Lead, AppError> {
        self.leads.set_status(self.pool, lead_id, status).await
    }

    async fn insert_site_visit(&self, lead_id: Uuid, visit: &NewSiteVisit) -> Result<SiteVisit, AppError> {
        self.visits.insert(self.pool, lead_id, visit).await
    }

    async fn complete_site_visit(&self, visit_id: Uuid) -> Result<SiteVisit, AppError> {
        self.visits.mark_completed(self.pool, visit_id).await
    }
}

/// Fase 1: lead -> site_visit_scheduled. Fase 2: cria a visita.
pub async fn schedule_pairing(
    store: &dyn PairingStore,
    lead_id: Uuid,
    visit: &NewSiteVisit,
) -> Result<SiteVisitOutcome, PairingError> {
    let lead = store
        .set_lead_status(lead_id, LeadStatus::SiteVisitScheduled)
        .await
        .map_err(|e| PairingError::at(PairingPhase::LeadStatus, e))?;

    let site_visit = store
        .insert_site_visit(lead_id, visit)
        .await
        .map_err(|e| PairingError::after(PairingPhase::SiteVisitInsert, PairingPhase::LeadStatus, e))?;

    Ok(SiteVisitOutcome { lead, site_visit })
}

/// Fase 1: visita concluída. Fase 2: lead -> site_visit_done.
///
/// Visita já concluída não grava nada: o status que o lead tiver hoje fica como está.
pub async fn complete_pairing(
    store: &dyn PairingStore,
    visit_id: Uuid,
) -> Result<SiteVisitOutcome, PairingError> {
    let current = store
        .find_site_visit(visit_id)
        .await
        .map_err(|e| PairingError::at(PairingPhase::SiteVisitComplete, e))?;

    if current.completed {
        let lead = store
            .find_lead(current.lead_id)
            .await
            .map_err(|e| PairingError::at(PairingPhase::LeadStatus, e))?;
        tracing::info!("Visita {} já estava concluída; nada gravado", visit_id);
        return Ok(SiteVisitOutcome { lead, site_visit: current });
    }

    let site_visit = store
        .complete_site_visit(visit_id)
        .await
        .map_err(|e| PairingError::at(PairingPhase::SiteVisitComplete, e))?;

    let lead = store
        .set_lead_status(site_visit.lead_id, LeadStatus::SiteVisitDone)
        .await
        .map_err(|e| PairingError::after(PairingPhase::LeadStatus, PairingPhase::SiteVisitComplete, e))?;

    Ok(SiteVisitOutcome { lead, site_visit })
}

#[derive(Clone)]
pub struct SiteVisitService {
    leads: LeadRepository,
    visits: SiteVisitRepository,
}

impl SiteVisitService {
    pub fn new(leads: LeadRepository, visits: SiteVisitRepository) -> Self {
        Self { leads, visits }
    }

    fn store<'a>(&'a self, pool: &'a PgPool) -> PgPairingStore<'a> {
        PgPairingStore { pool, leads: &self.leads, visits: &self.visits }
    }

    async fn accessible_lead(&self, pool: &PgPool, caller: &Profile, lead_id: Uuid) -> Result<(), AppError> {
        let view = self
            .leads
            .find(pool, lead_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Lead {}", lead_id)))?;
        ensure_lead_access(caller, &view.lead)
    }

    pub async fn schedule(
        &self,
        pool: &PgPool,
        caller: &Profile,
        lead_id: Uuid,
        visit: NewSiteVisit,
    ) -> Result<SiteVisitOutcome, AppError> {
        self.accessible_lead(pool, caller, lead_id).await?;

        let outcome = schedule_pairing(&self.store(pool), lead_id, &visit).await?;
        tracing::info!(
            "📅 Visita {} agendada para {} ({})",
            outcome.site_visit.id,
            outcome.site_visit.scheduled_date,
            lead_id
        );
        Ok(outcome)
    }

    pub async fn complete(
        &self,
        pool: &PgPool,
        caller: &Profile,
        visit_id: Uuid,
    ) -> Result<SiteVisitOutcome, AppError> {
        let store = self.store(pool);
        let visit = store.find_site_visit(visit_id).await?;
        self.accessible_lead(pool, caller, visit.lead_id).await?;

        Ok(complete_pairing(&store, visit_id).await?)
    }

    /// Visitas não concluídas de hoje e amanhã nos leads do usuário.
    pub async fn upcoming(
        &self,
        pool: &PgPool,
        caller: &Profile,
        today: NaiveDate,
    ) -> Result<Vec<UpcomingSiteVisit>, AppError> {
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        self.visits.upcoming_for_user(pool, caller.id, today, tomorrow).await
    }
}
