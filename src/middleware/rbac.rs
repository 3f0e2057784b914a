// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser, models::profile::UserRole};

/// 1. O trait que define qual papel uma rota exige
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> UserRole;
}

/// 2. O extractor (guardião). Roda depois do `auth_guard`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        check_role(user.0.role, T::role())?;
        Ok(RequireRole(PhantomData))
    }
}

fn check_role(actual: UserRole, required: UserRole) -> Result<(), AppError> {
    if actual == required {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("This action requires the '{}' role", required)))
    }
}

// ---
// PAPÉIS
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn role() -> UserRole { UserRole::Admin }
}

pub type RequireAdmin = RequireRole<AdminOnly>;
