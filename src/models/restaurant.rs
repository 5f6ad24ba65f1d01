// src/models/restaurant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Uuid,
    #[schema(example = "Cantina da Nonna")]
    pub name: String,
    #[schema(example = "Rua Augusta, 120")]
    pub location: String,
    pub description: Option<String>,
    #[schema(example = 40)]
    pub total_seats: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A localização é obrigatória."))]
    pub location: String,

    pub description: Option<String>,

    #[validate(range(min = 1, message = "A capacidade deve ser um inteiro positivo."))]
    #[schema(example = 40)]
    pub total_seats: i32,
}

// Atualização parcial: só os campos enviados mudam
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRestaurantPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "A localização não pode ser vazia."))]
    pub location: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 1, message = "A capacidade deve ser um inteiro positivo."))]
    pub total_seats: Option<i32>,
}

impl UpdateRestaurantPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.total_seats.is_none()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RestaurantSearch {
    /// Filtra por nome ou localização
    pub search: Option<String>,
}
