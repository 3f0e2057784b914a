// src/services/auth.rs

use jsonwebtoken::{decode, DecodingKey, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::ProfileRepository,
    models::{auth::Claims, profile::Profile},
};

// Só valida tokens: emissão, cadastro e login ficam com o provedor de identidade.
#[derive(Clone)]
pub struct AuthService {
    profile_repo: ProfileRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(profile_repo: ProfileRepository, jwt_secret: String) -> Self {
        Self { profile_repo, jwt_secret }
    }

    pub async fn validate_token(&self, pool: &PgPool, token: &str) -> Result<Profile, AppError> {
        let claims = decode_claims(token, &self.jwt_secret)?;

        self.profile_repo
            .find_by_id(pool, claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }
}

/// HS256 + expiração. Qualquer falha vira `InvalidToken`.
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::default();
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::fixtures::insert_profile, models::profile::UserRole};
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    fn token_for(sub: Uuid, expires_in: Duration, secret: &str) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub,
            exp: (now + expires_in).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref())).unwrap()
    }

    #[test]
    fn valid_token_yields_the_subject() {
        let sub = Uuid::new_v4();
        let token = token_for(sub, Duration::hours(1), "s3cret");
        let claims = decode_claims(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, sub);
    }

    #[test]
    fn wrong_secret_or_expired_token_is_rejected() {
        let sub = Uuid::new_v4();
        let token = token_for(sub, Duration::hours(1), "s3cret");
        assert_matches!(decode_claims(&token, "other"), Err(AppError::InvalidToken));

        let expired = token_for(sub, Duration::hours(-2), "s3cret");
        assert_matches!(decode_claims(&expired, "s3cret"), Err(AppError::InvalidToken));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn token_resolves_to_the_stored_profile(pool: sqlx::PgPool) {
        let profile = insert_profile(&pool, "Priya Sharma", UserRole::User).await;
        let service = AuthService::new(ProfileRepository::new(), "s3cret".into());

        let token = token_for(profile.id, Duration::hours(1), "s3cret");
        let resolved = service.validate_token(&pool, &token).await.unwrap();
        assert_eq!(resolved.id, profile.id);

        // token válido de alguém sem perfil
        let stranger = token_for(Uuid::new_v4(), Duration::hours(1), "s3cret");
        assert_matches!(service.validate_token(&pool, &stranger).await, Err(AppError::InvalidToken));
    }
}
