// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, models::auth::Identity};

/// Guardião das rotas de gerente/admin.
/// Depende do `auth_guard` ter colocado a `Identity` nos extensions.
pub struct PrivilegedUser(pub Identity);

impl<S> FromRequestParts<S> for PrivilegedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai a identidade
        let identity = parts
            .extensions
            .get::<Identity>()
            .copied()
            .ok_or(AppError::InvalidToken)?;

        // B. Checa o papel
        if !identity.role.is_privileged() {
            return Err(AppError::Forbidden("Requer papel de gerente ou admin.".into()));
        }

        Ok(PrivilegedUser(identity))
    }
}
