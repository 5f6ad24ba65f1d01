// src/handlers/restaurants.rs

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::PrivilegedUser},
    models::{
        reservation::{Availability, AvailabilityQuery, Slot},
        restaurant::{CreateRestaurantPayload, Restaurant, RestaurantSearch, UpdateRestaurantPayload},
    },
};

// GET /api/restaurants (pública)
#[utoipa::path(
    get,
    path = "/api/restaurants",
    tag = "Restaurants",
    params(RestaurantSearch),
    responses((status = 200, description = "Lista de restaurantes", body = [Restaurant]))
)]
pub async fn list_restaurants(
    State(app_state): State<AppState>,
    query: Result<Query<RestaurantSearch>, QueryRejection>,
) -> Result<Json<Vec<Restaurant>>, AppError> {
    let Query(query) = query?;
    let restaurants = app_state
        .restaurant_service
        .list(query.search.as_deref())
        .await?;
    Ok(Json(restaurants))
}

#[utoipa::path(
    get,
    path = "/api/restaurants/{id}",
    tag = "Restaurants",
    params(("id" = Uuid, Path, description = "ID do restaurante")),
    responses(
        (status = 200, description = "Restaurante", body = Restaurant),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_restaurant(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Restaurant>, AppError> {
    let Path(id) = path?;
    Ok(Json(app_state.restaurant_service.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/restaurants",
    tag = "Restaurants",
    request_body = CreateRestaurantPayload,
    responses(
        (status = 201, description = "Restaurante criado", body = Restaurant),
        (status = 403, description = "Requer gerente/admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_restaurant(
    State(app_state): State<AppState>,
    _guard: PrivilegedUser,
    payload: Result<Json<CreateRestaurantPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let restaurant = app_state.restaurant_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

#[utoipa::path(
    put,
    path = "/api/restaurants/{id}",
    tag = "Restaurants",
    request_body = UpdateRestaurantPayload,
    params(("id" = Uuid, Path, description = "ID do restaurante")),
    responses(
        (status = 200, description = "Restaurante atualizado", body = Restaurant),
        (status = 400, description = "Nenhum campo enviado"),
        (status = 404, description = "Não encontrado"),
        (status = 409, description = "Lotação menor que os lugares já aprovados em um horário")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_restaurant(
    State(app_state): State<AppState>,
    _guard: PrivilegedUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateRestaurantPayload>, JsonRejection>,
) -> Result<Json<Restaurant>, AppError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    payload.validate()?;

    Ok(Json(app_state.restaurant_service.update(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/restaurants/{id}",
    tag = "Restaurants",
    params(("id" = Uuid, Path, description = "ID do restaurante")),
    responses(
        (status = 200, description = "Restaurante removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_restaurant(
    State(app_state): State<AppState>,
    _guard: PrivilegedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    app_state.restaurant_service.delete(id).await?;
    Ok(Json(json!({ "message": "Restaurante removido com sucesso." })))
}

// GET /api/restaurants/{id}/availability?date=&time=&peopleCount=
#[utoipa::path(
    get,
    path = "/api/restaurants/{id}/availability",
    tag = "Restaurants",
    params(
        ("id" = Uuid, Path, description = "ID do restaurante"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Disponibilidade do slot", body = Availability),
        (status = 400, description = "Data, horário ou quantidade inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_availability(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<Availability>, AppError> {
    let Path(id) = path?;
    let Query(query) = query?;
    let slot = Slot::parse(id, &query.date, &query.time)?;

    let availability = app_state
        .reservation_service
        .check_availability(slot, query.people_count)
        .await?;
    Ok(Json(availability))
}
