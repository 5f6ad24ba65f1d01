// src/services/restaurant_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{restaurant_repo::RestaurantUpdate, RestaurantRepository},
    models::restaurant::{CreateRestaurantPayload, Restaurant, UpdateRestaurantPayload},
};

#[derive(Clone)]
pub struct RestaurantService {
    repo: RestaurantRepository,
}

impl RestaurantService {
    pub fn new(repo: RestaurantRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Restaurant>, AppError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repo.list(search).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Restaurant, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Restaurante".into()))
    }

    pub async fn create(&self, payload: &CreateRestaurantPayload) -> Result<Restaurant, AppError> {
        let restaurant = self.repo.create(payload).await?;
        tracing::info!(restaurant_id = %restaurant.id, seats = restaurant.total_seats, "Restaurante criado");
        Ok(restaurant)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateRestaurantPayload) -> Result<Restaurant, AppError> {
        if payload.is_empty() {
            return Err(AppError::BadRequest("Nenhum campo enviado para atualização.".into()));
        }
        match self.repo.update(id, payload).await? {
            RestaurantUpdate::Updated(restaurant) => Ok(restaurant),
            RestaurantUpdate::NotFound => Err(AppError::ResourceNotFound("Restaurante".into())),
            RestaurantUpdate::BelowApproved { approved } => {
                let requested = payload.total_seats.unwrap_or_default();
                tracing::info!(
                    restaurant_id = %id,
                    requested,
                    approved,
                    "Redução de lotação recusada"
                );
                Err(AppError::CapacityBelowApproved { requested, approved })
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if self.repo.delete(id).await? == 0 {
            return Err(AppError::ResourceNotFound("Restaurante".into()));
        }
        tracing::info!(restaurant_id = %id, "Restaurante removido");
        Ok(())
    }
}
