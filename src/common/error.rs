use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::site_visit_service::PairingError;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    // Entrada inválida detectada fora do `validator` (query string, planilha...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    // Falha "branda": nenhum dado para exportar, nenhuma linha válida na planilha
    #[error("{0}")]
    NoMatchingData(String),

    #[error(transparent)]
    SiteVisitPairing(#[from] PairingError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    // Variante para erros de banco de dados
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid authentication token.".to_string(),
            ),
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            AppError::ResourceNotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found.", what)),
            AppError::NoMatchingData(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::Spreadsheet(ref e) => {
                tracing::warn!("Planilha ilegível: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    "The uploaded file is not a readable .xlsx/.xls workbook.".to_string(),
                )
            }
            // A fase que falhou vai na mensagem: o chamador decide se refaz ou desfaz.
            AppError::SiteVisitPairing(ref e) => {
                tracing::error!("Escrita pareada incompleta: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }

            // Todos os outros erros (DatabaseError, InternalServerError, JwtError) viram 500.
            // A causa não é exposta: o detalhe fica no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
