// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Claims esperados no JWT emitido pelo provedor de identidade
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // ID do perfil
    pub exp: usize,
    pub iat: usize,
}
