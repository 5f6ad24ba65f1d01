use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::reservation::{Availability, ReservationStatus};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Token expirado")]
    TokenExpired,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("{0} não encontrado(a)")]
    ResourceNotFound(String),

    #[error("Capacidade excedida")]
    CapacityExceeded(Availability),

    #[error("Transição inválida de '{from}' para '{to}'")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Não é possível cancelar uma reserva com status '{0}'")]
    NotCancellable(ReservationStatus),

    #[error("Não é possível alterar uma reserva com status '{0}'")]
    NotEditable(ReservationStatus),

    // Lotação nova menor que os lugares já aprovados em algum slot
    #[error("A lotação {requested} é menor que os {approved} lugares já aprovados em um horário")]
    CapacityBelowApproved { requested: i32, approved: i64 },

    // Outra requisição mudou o status entre a leitura e a escrita
    #[error("O status da reserva mudou para '{0}' durante a operação")]
    StatusChanged(ReservationStatus),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Corpo da requisição inválido: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(format!("Parâmetro de rota inválido: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(format!("Parâmetros inválidos: {}", rejection.body_text()))
    }
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
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::CapacityExceeded(availability) => {
                let body = Json(json!({
                    "error": "Reserva recusada: o restaurante não tem lugares suficientes neste horário.",
                    "details": availability,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            AppError::ResourceNotFound(what) => (StatusCode::NOT_FOUND, format!("{} não encontrado(a).", what)),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso.".into()),
            AppError::UsernameAlreadyExists => (StatusCode::CONFLICT, "Este nome de usuário já está em uso.".into()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".into()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.".into()),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token de autenticação expirado.".into()),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado.".into()),
            AppError::CapacityBelowApproved { requested, approved } => {
                let body = Json(json!({
                    "error": format!(
                        "A lotação {} é menor que os {} lugares já aprovados em um horário.",
                        requested, approved
                    ),
                    "details": { "requested": requested, "approved": approved },
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            ref e @ (AppError::InvalidTransition { .. }
            | AppError::NotCancellable(_)
            | AppError::NotEditable(_)
            | AppError::StatusChanged(_)) => (StatusCode::CONFLICT, e.to_string()),

            // Todos os outros erros (banco, bcrypt, jwt, anyhow) viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".into())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
