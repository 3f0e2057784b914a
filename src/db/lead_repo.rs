// src/db/lead_repo.rs

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    models::{
        lead::{Lead, LeadStatus, LeadView, NewLead},
        lead_filter::LeadFilter,
    },
    services::lead_import::ImportRow,
};

// Lead + nome do responsável numa ida só ao banco
const LEAD_VIEW_SELECT: &str = r#"
    SELECT l.*, p.full_name AS assignee_name
    FROM leads l
    LEFT JOIN profiles p ON p.id = l.assigned_to
    WHERE TRUE"#;

// Limite de parâmetros do Postgres é 65535; 4 colunas por linha
const IMPORT_CHUNK: usize = 1000;

#[derive(Clone, Default)]
pub struct LeadRepository;

impl LeadRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create<'e, E>(&self, executor: E, lead: &NewLead) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                name, email, mobile, city,
                what_to_buy, budget, professional_background, notes,
                quality, status, assigned_to, followup_date, buying_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.mobile)
        .bind(&lead.city)
        .bind(&lead.what_to_buy)
        .bind(&lead.budget)
        .bind(&lead.professional_background)
        .bind(&lead.notes)
        .bind(lead.quality)
        .bind(lead.status)
        .bind(lead.assigned_to)
        .bind(lead.followup_date)
        .bind(lead.buying_date)
        .fetch_one(executor)
        .await?;

        Ok(created)
    }

    /// Substitui todos os campos editáveis. `assigned_to` não é tocado aqui.
    pub async fn update<'e, E>(&self, executor: E, id: Uuid, lead: &NewLead) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                name = $2, email = $3, mobile = $4, city = $5,
                what_to_buy = $6, budget = $7, professional_background = $8, notes = $9,
                quality = $10, status = $11, followup_date = $12, buying_date = $13,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.mobile)
        .bind(&lead.city)
        .bind(&lead.what_to_buy)
        .bind(&lead.budget)
        .bind(&lead.professional_background)
        .bind(&lead.notes)
        .bind(lead.quality)
        .bind(lead.status)
        .bind(lead.followup_date)
        .bind(lead.buying_date)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Lead {}", id)))
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Lead>(
            "UPDATE leads SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Lead {}", id)))
    }

    /// Sobrescreve o responsável (sem histórico) e grava o status junto.
    pub async fn assign<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        user_id: Uuid,
        status: LeadStatus,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET assigned_to = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("Lead {}", id)))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Lead {}", id)));
        }
        Ok(())
    }

    /// Inserção em massa da planilha. Tudo ou nada, como um único INSERT.
    pub async fn insert_many<'e, E>(&self, executor: E, rows: Vec<ImportRow>) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let mut inserted = 0;

        for chunk in rows.chunks(IMPORT_CHUNK) {
            let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO leads (name, email, mobile, city) ");
            qb.push_values(chunk, |mut b, row| {
                b.push_bind(row.name.clone())
                    .push_bind(row.email.clone())
                    .push_bind(row.mobile.clone())
                    .push_bind(row.city.clone());
            });
            inserted += qb.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn find<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<LeadView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(LEAD_VIEW_SELECT);
        qb.push(" AND l.id = ").push_bind(id);

        let lead = qb.build_query_as::<LeadView>().fetch_optional(executor).await?;
        Ok(lead)
    }

    /// Busca filtrada, mais recentes primeiro. Sem `page` traz o conjunto inteiro (exportação).
    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &LeadFilter,
        page: Option<Pagination>,
    ) -> Result<Vec<LeadView>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(LEAD_VIEW_SELECT);
        filter.push_constraints(&mut qb);
        qb.push(" ORDER BY l.created_at DESC");

        if let Some(page) = page {
            qb.push(" LIMIT ")
                .push_bind(page.limit())
                .push(" OFFSET ")
                .push_bind(page.offset());
        }

        let leads = qb.build_query_as::<LeadView>().fetch_all(executor).await?;
        Ok(leads)
    }

    pub async fn distinct_cities<'e, E>(&self, executor: E) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cities = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT city FROM leads WHERE city IS NOT NULL ORDER BY city ASC",
        )
        .fetch_all(executor)
        .await?;

        Ok(cities)
    }

    /// Leads do usuário com follow-up marcado para o dia
    pub async fn followups_for<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<Vec<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE assigned_to = $1 AND followup_date = $2
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_all(executor)
        .await?;

        Ok(leads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::fixtures::{insert_profile, new_lead, set_created_at},
        models::{lead::LeadQuality, profile::UserRole},
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use sqlx::PgPool;
    use std::str::FromStr;

    async fn seed(pool: &PgPool, leads: Vec<NewLead>) -> Vec<Lead> {
        let repo = LeadRepository::new();
        let mut created = Vec::with_capacity(leads.len());
        for lead in &leads {
            created.push(repo.create(pool, lead).await.unwrap());
        }
        created
    }

    async fn names(pool: &PgPool, filter: LeadFilter) -> Vec<String> {
        let mut names: Vec<String> = LeadRepository::new()
            .list(pool, &filter, None)
            .await
            .unwrap()
            .into_iter()
            .map(|view| view.lead.name)
            .collect();
        names.sort();
        names
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn filter_is_a_conjunction_of_fields(pool: PgPool) {
        seed(
            &pool,
            vec![
                new_lead("A", LeadStatus::New, "Pune"),
                new_lead("B", LeadStatus::New, "Mumbai"),
                new_lead("C", LeadStatus::Converted, "Pune"),
            ],
        )
        .await;

        let filter = LeadFilter {
            status: Some(LeadStatus::New),
            city: Some("Pune".into()),
            ..Default::default()
        };
        assert_eq!(names(&pool, filter).await, vec!["A"]);
        assert_eq!(names(&pool, LeadFilter::default()).await, vec!["A", "B", "C"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn search_matches_name_email_or_city_case_insensitively(pool: PgPool) {
        let mut with_email = new_lead("Rahul", LeadStatus::New, "Nashik");
        with_email.email = Some("Deals@Mehta.example".into());
        seed(
            &pool,
            vec![
                new_lead("Kavya Iyer", LeadStatus::New, "Chennai"),
                with_email,
                new_lead("Sunil", LeadStatus::Lost, "Mehtapur"),
                new_lead("100% Mehta", LeadStatus::Lost, "Goa"),
            ],
        )
        .await;

        let filter = LeadFilter { search: Some("MEHTA".into()), ..Default::default() };
        assert_eq!(names(&pool, filter).await, vec!["100% Mehta", "Rahul", "Sunil"]);

        let narrowed = LeadFilter {
            search: Some("mehta".into()),
            status: Some(LeadStatus::New),
            ..Default::default()
        };
        assert_eq!(names(&pool, narrowed).await, vec!["Rahul"]);

        // % digitado pelo usuário é literal
        let literal = LeadFilter { search: Some("0%".into()), ..Default::default() };
        assert_eq!(names(&pool, literal).await, vec!["100% Mehta"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn date_only_upper_bound_covers_the_whole_day(pool: PgPool) {
        let leads = seed(
            &pool,
            vec![
                new_lead("Late", LeadStatus::New, "Pune"),
                new_lead("Next", LeadStatus::New, "Pune"),
                new_lead("First", LeadStatus::New, "Pune"),
                new_lead("Before", LeadStatus::New, "Pune"),
            ],
        )
        .await;
        set_created_at(&pool, leads[0].id, Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 30).unwrap()).await;
        set_created_at(&pool, leads[1].id, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()).await;
        set_created_at(&pool, leads[2].id, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()).await;
        set_created_at(&pool, leads[3].id, Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()).await;

        let filter = LeadFilter {
            date_from: Some("2025-01-01".parse().unwrap()),
            date_to: Some("2025-01-31".parse().unwrap()),
            ..Default::default()
        };
        assert_eq!(names(&pool, filter).await, vec!["First", "Late"]);

        let instant = LeadFilter {
            date_to: Some("2025-01-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        assert_eq!(names(&pool, instant).await, vec!["Before", "First"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn budget_bounds_use_the_first_number_and_skip_vague_budgets(pool: PgPool) {
        let mut lakhs = new_lead("Lakhs", LeadStatus::New, "Pune");
        lakhs.budget = Some("75,00,000".into());
        let mut crore = new_lead("Crore", LeadStatus::New, "Pune");
        crore.budget = Some("1.5 Cr".into());
        let mut vague = new_lead("Vague", LeadStatus::New, "Pune");
        vague.budget = Some("flexible".into());
        let unset = new_lead("Unset", LeadStatus::New, "Pune");
        seed(&pool, vec![lakhs, crore, vague, unset]).await;

        let around_one_crore = LeadFilter {
            budget_min: Some(Decimal::from(1)),
            budget_max: Some(Decimal::from(2)),
            ..Default::default()
        };
        assert_eq!(names(&pool, around_one_crore).await, vec!["Crore"]);

        let at_least = LeadFilter {
            budget_min: Some(Decimal::from_str("5000000").unwrap()),
            ..Default::default()
        };
        assert_eq!(names(&pool, at_least).await, vec!["Lakhs"]);

        let at_most = LeadFilter {
            budget_max: Some(Decimal::from(10_000_000)),
            ..Default::default()
        };
        assert_eq!(names(&pool, at_most).await, vec!["Crore", "Lakhs"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn what_to_buy_and_quality_narrow_the_list(pool: PgPool) {
        let mut villa = new_lead("Villa", LeadStatus::New, "Goa");
        villa.what_to_buy = Some("Sea-facing Villa".into());
        villa.quality = Some(LeadQuality::Hot);
        let mut cold_villa = new_lead("Cold", LeadStatus::New, "Goa");
        cold_villa.what_to_buy = Some("villa plot".into());
        cold_villa.quality = Some(LeadQuality::Cold);
        seed(&pool, vec![villa, cold_villa, new_lead("Plain", LeadStatus::New, "Goa")]).await;

        let filter = LeadFilter { what_to_buy: Some("VILLA".into()), ..Default::default() };
        assert_eq!(names(&pool, filter).await, vec!["Cold", "Villa"]);

        let hot = LeadFilter {
            what_to_buy: Some("villa".into()),
            quality: Some(LeadQuality::Hot),
            ..Default::default()
        };
        assert_eq!(names(&pool, hot).await, vec!["Villa"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn reassignment_overwrites_the_previous_assignee(pool: PgPool) {
        let first = insert_profile(&pool, "Asha Menon", UserRole::User).await;
        let second = insert_profile(&pool, "Bilal Khan", UserRole::User).await;
        let repo = LeadRepository::new();
        let lead = seed(&pool, vec![new_lead("Dev", LeadStatus::New, "Pune")]).await.remove(0);

        repo.assign(&pool, lead.id, first.id, LeadStatus::InProgress).await.unwrap();
        let reassigned = repo.assign(&pool, lead.id, second.id, LeadStatus::InProgress).await.unwrap();
        assert_eq!(reassigned.assigned_to, Some(second.id));

        let view = repo.find(&pool, lead.id).await.unwrap().unwrap();
        assert_eq!(view.lead.assigned_to, Some(second.id));
        assert_eq!(view.lead.status, LeadStatus::InProgress);
        assert_eq!(view.assignee_name.as_deref(), Some("Bilal Khan"));

        let mine = LeadFilter { assigned_to: Some(first.id), ..Default::default() };
        assert!(names(&pool, mine).await.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn bulk_insert_lands_new_and_unassigned(pool: PgPool) {
        let repo = LeadRepository::new();
        let rows = vec![
            ImportRow {
                name: "Anita Rao".into(),
                email: Some("anita@mail.example".into()),
                mobile: "9000000001".into(),
                city: "Pune".into(),
            },
            ImportRow {
                name: "Meera".into(),
                email: None,
                mobile: "9000000002".into(),
                city: "Nagpur".into(),
            },
        ];

        let inserted = repo.insert_many(&pool, rows).await.unwrap();
        assert_eq!(inserted, 2);

        let leads = repo.list(&pool, &LeadFilter::default(), None).await.unwrap();
        assert_eq!(leads.len(), 2);
        for view in &leads {
            assert_eq!(view.lead.status, LeadStatus::New);
            assert_eq!(view.lead.assigned_to, None);
            assert_eq!(view.assignee_name, None);
        }
        let meera = leads.iter().find(|v| v.lead.name == "Meera").unwrap();
        assert_eq!(meera.lead.email, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn bulk_insert_is_all_or_nothing(pool: PgPool) {
        let repo = LeadRepository::new();
        let rows = vec![
            ImportRow {
                name: "Valid".into(),
                email: None,
                mobile: "9000000001".into(),
                city: "Pune".into(),
            },
            // viola o CHECK de cidade obrigatória
            ImportRow {
                name: "Broken".into(),
                email: None,
                mobile: "9000000002".into(),
                city: " ".into(),
            },
        ];

        assert!(repo.insert_many(&pool, rows).await.is_err());
        assert!(repo.list(&pool, &LeadFilter::default(), None).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn listing_is_newest_first_and_paginated(pool: PgPool) {
        let leads = seed(
            &pool,
            vec![
                new_lead("Old", LeadStatus::New, "Pune"),
                new_lead("Mid", LeadStatus::New, "Pune"),
                new_lead("Recent", LeadStatus::New, "Pune"),
            ],
        )
        .await;
        for (lead, day) in leads.iter().zip([1, 2, 3]) {
            set_created_at(&pool, lead.id, Utc.with_ymd_and_hms(2025, 1, day, 9, 0, 0).unwrap()).await;
        }

        let page = Pagination { limit: Some(2), offset: Some(1) };
        let listed: Vec<String> = LeadRepository::new()
            .list(&pool, &LeadFilter::default(), Some(page))
            .await
            .unwrap()
            .into_iter()
            .map(|view| view.lead.name)
            .collect();
        assert_eq!(listed, vec!["Mid", "Old"]);
    }
}
