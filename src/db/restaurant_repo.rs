// src/db/restaurant_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::reservation_repo::{busiest_slot_seats, lock_capacity},
    models::restaurant::{CreateRestaurantPayload, Restaurant, UpdateRestaurantPayload},
};

#[derive(Debug)]
pub enum RestaurantUpdate {
    Updated(Restaurant),
    NotFound,
    /// A lotação pedida não comporta os lugares já aprovados no slot mais cheio.
    BelowApproved { approved: i64 },
}

#[derive(Clone)]
pub struct RestaurantRepository {
    pool: PgPool,
}

impl RestaurantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lista ordenada por nome. `search` filtra por nome ou localização (ILIKE).
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Restaurant>, AppError> {
        let restaurants = match search {
            Some(term) => {
                let pattern = format!("%{}%", term);
                sqlx::query_as::<_, Restaurant>(
                    r#"
                    SELECT * FROM restaurants
                    WHERE name ILIKE $1 OR location ILIKE $1
                    ORDER BY name ASC
                    "#,
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants ORDER BY name ASC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(restaurants)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, AppError> {
        let restaurant = sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(restaurant)
    }

    pub async fn create(&self, payload: &CreateRestaurantPayload) -> Result<Restaurant, AppError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            r#"
            INSERT INTO restaurants (name, location, description, total_seats)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.location)
        .bind(payload.description.as_deref())
        .bind(payload.total_seats)
        .fetch_one(&self.pool)
        .await?;
        Ok(restaurant)
    }

    // COALESCE mantém o valor atual para os campos não enviados.
    // Mesma trava da admissão: nenhuma aprovação entra entre a checagem da lotação e o UPDATE.
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateRestaurantPayload,
    ) -> Result<RestaurantUpdate, AppError> {
        let mut tx = self.pool.begin().await?;

        if lock_capacity(&mut *tx, id).await?.is_none() {
            return Ok(RestaurantUpdate::NotFound);
        }

        if let Some(total_seats) = payload.total_seats {
            let approved = busiest_slot_seats(&mut *tx, id).await?;
            if i64::from(total_seats) < approved {
                return Ok(RestaurantUpdate::BelowApproved { approved });
            }
        }

        let restaurant = sqlx::query_as::<_, Restaurant>(
            r#"
            UPDATE restaurants SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                description = COALESCE($4, description),
                total_seats = COALESCE($5, total_seats),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name.as_deref())
        .bind(payload.location.as_deref())
        .bind(payload.description.as_deref())
        .bind(payload.total_seats)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(restaurant) = restaurant else {
            return Ok(RestaurantUpdate::NotFound);
        };
        tx.commit().await?;
        Ok(RestaurantUpdate::Updated(restaurant))
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
