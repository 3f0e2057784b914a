// src/db/profile_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::profile::{Profile, ProfileWithStats, SalesUser, UserRole},
};

// O repositório de perfis, responsável por todas as interações com a tabela 'profiles'
#[derive(Clone, Default)]
pub struct ProfileRepository;

impl ProfileRepository {
    pub fn new() -> Self {
        Self
    }

    // Usado pelo middleware de autenticação a cada requisição
    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Profile>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, full_name, email, role, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(maybe_profile)
    }

    /// Perfis com os contadores de leads (tela de gestão de usuários)
    pub async fn list_with_stats<'e, E>(&self, executor: E) -> Result<Vec<ProfileWithStats>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profiles = sqlx::query_as::<_, ProfileWithStats>(
            r#"
            SELECT
                p.id, p.full_name, p.email, p.role, p.created_at, p.updated_at,
                COUNT(l.id) AS assigned_leads,
                COUNT(l.id) FILTER (WHERE l.status = 'in_progress') AS in_progress_leads,
                COUNT(l.id) FILTER (WHERE l.status = 'converted') AS converted_leads
            FROM profiles p
            LEFT JOIN leads l ON l.assigned_to = p.id
            GROUP BY p.id
            ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(profiles)
    }

    /// Vendedores (role = user) para o seletor de responsável
    pub async fn list_sales_users<'e, E>(&self, executor: E) -> Result<Vec<SalesUser>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, SalesUser>(
            r#"
            SELECT id, full_name
            FROM profiles
            WHERE role = $1
            ORDER BY full_name ASC
            "#,
        )
        .bind(UserRole::User)
        .fetch_all(executor)
        .await?;

        Ok(users)
    }

    pub async fn get<'e, E>(&self, executor: E, id: Uuid) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Profile>(
            "SELECT id, full_name, email, role, created_at, updated_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("User {}", id)))
    }

    pub async fn update_role<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        role: UserRole,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, full_name, email, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(role)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound(format!("User {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::insert_profile;
    use assert_matches::assert_matches;
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations")]
    async fn find_by_id_runs_on_any_executor(pool: PgPool) {
        let created = insert_profile(&pool, "Priya Sharma", UserRole::User).await;
        let repo = ProfileRepository::new();

        let found = repo.find_by_id(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(found.full_name, "Priya Sharma");

        let mut tx = pool.begin().await.unwrap();
        assert!(repo.find_by_id(&mut *tx, created.id).await.unwrap().is_some());
        assert!(repo.find_by_id(&mut *tx, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn role_change_and_sales_listing(pool: PgPool) {
        let admin = insert_profile(&pool, "Root Admin", UserRole::Admin).await;
        let seller = insert_profile(&pool, "Sana Patel", UserRole::User).await;
        let repo = ProfileRepository::new();

        let sales = repo.list_sales_users(&pool).await.unwrap();
        assert_eq!(sales.iter().map(|s| s.id).collect::<Vec<_>>(), vec![seller.id]);

        let promoted = repo.update_role(&pool, seller.id, UserRole::Admin).await.unwrap();
        assert_eq!(promoted.role, UserRole::Admin);
        assert!(repo.list_sales_users(&pool).await.unwrap().is_empty());

        assert_eq!(repo.get(&pool, admin.id).await.unwrap().role, UserRole::Admin);
        assert_matches!(repo.get(&pool, Uuid::new_v4()).await, Err(AppError::ResourceNotFound(_)));
    }
}
