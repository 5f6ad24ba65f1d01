// src/handlers/reservations.rs

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
    models::reservation::{
        parse_date, parse_time, CreateReservationPayload, ReservationDetail, ReservationFilter,
        ReservationResponse, ReservationStatus, Slot, UpdateReservationPayload, UpdateStatusPayload,
    },
};

// =============================================================================
//  1. USUÁRIO
// =============================================================================

// POST /api/reservations
#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = "Reservations",
    request_body = CreateReservationPayload,
    responses(
        (status = 201, description = "Pedido de reserva recebido (pendente)", body = ReservationResponse),
        (status = 400, description = "Campos ausentes ou inválidos"),
        (status = 404, description = "Restaurante não encontrado"),
        (status = 409, description = "Sem lugares suficientes no slot")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_reservation(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    payload: Result<Json<CreateReservationPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    // `validate` garante que os campos obrigatórios vieram
    let (Some(restaurant_id), Some(date), Some(time), Some(people_count)) = (
        payload.restaurant_id,
        payload.date.as_deref(),
        payload.time.as_deref(),
        payload.people_count,
    ) else {
        return Err(AppError::BadRequest("Campos obrigatórios ausentes.".into()));
    };
    let slot = Slot::parse(restaurant_id, date, time)?;

    let reservation = app_state
        .reservation_service
        .create(&identity, slot, people_count)
        .await?;

    let body = ReservationResponse {
        message: "Pedido de reserva recebido. Aguardando aprovação.".into(),
        reservation,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

// GET /api/reservations/my
#[utoipa::path(
    get,
    path = "/api/reservations/my",
    tag = "Reservations",
    responses((status = 200, description = "Reservas do usuário", body = [ReservationDetail])),
    security(("api_jwt" = []))
)]
pub async fn list_my_reservations(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<Vec<ReservationDetail>>, AppError> {
    Ok(Json(app_state.reservation_service.list_mine(&identity).await?))
}

// PATCH /api/reservations/{id}/cancel
#[utoipa::path(
    patch,
    path = "/api/reservations/{id}/cancel",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva cancelada", body = ReservationResponse),
        (status = 403, description = "A reserva não é sua"),
        (status = 404, description = "Não encontrada"),
        (status = 409, description = "Status atual não permite cancelamento")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_my_reservation(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ReservationResponse>, AppError> {
    let Path(reservation_id) = path?;
    let reservation = app_state
        .reservation_service
        .cancel_own(&identity, reservation_id)
        .await?;

    Ok(Json(ReservationResponse {
        message: format!("Reserva {} cancelada com sucesso.", reservation_id),
        reservation,
    }))
}

// PATCH /api/reservations/{id}
#[utoipa::path(
    patch,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    request_body = UpdateReservationPayload,
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva alterada", body = ReservationResponse),
        (status = 400, description = "Campos ausentes ou inválidos"),
        (status = 403, description = "A reserva não é sua"),
        (status = 404, description = "Não encontrada"),
        (status = 409, description = "Status não permite edição ou slot sem lugares")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_my_reservation(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateReservationPayload>, JsonRejection>,
) -> Result<Json<ReservationResponse>, AppError> {
    let Path(reservation_id) = path?;
    let Json(payload) = payload?;
    payload.validate()?;

    let (Some(date), Some(time), Some(people_count)) =
        (payload.date.as_deref(), payload.time.as_deref(), payload.people_count)
    else {
        return Err(AppError::BadRequest("Campos obrigatórios ausentes.".into()));
    };

    let reservation = app_state
        .reservation_service
        .update_details(&identity, reservation_id, parse_date(date)?, parse_time(time)?, people_count)
        .await?;

    Ok(Json(ReservationResponse {
        message: format!("Reserva {} alterada com sucesso.", reservation_id),
        reservation,
    }))
}

// DELETE /api/reservations/{id}
#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva removida"),
        (status = 403, description = "A reserva não é sua"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_my_reservation(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(reservation_id) = path?;
    app_state
        .reservation_service
        .delete_own(&identity, reservation_id)
        .await?;
    Ok(Json(json!({ "message": "Reserva removida com sucesso." })))
}

// =============================================================================
//  2. GERENTE / ADMIN
// =============================================================================

// GET /api/reservations/all?status=
#[utoipa::path(
    get,
    path = "/api/reservations/all",
    tag = "Reservations",
    params(ReservationFilter),
    responses(
        (status = 200, description = "Todas as reservas", body = [ReservationDetail]),
        (status = 403, description = "Requer gerente/admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_all_reservations(
    State(app_state): State<AppState>,
    PrivilegedUser(identity): PrivilegedUser,
    query: Result<Query<ReservationFilter>, QueryRejection>,
) -> Result<Json<Vec<ReservationDetail>>, AppError> {
    let Query(filter) = query?;
    let status = filter
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<ReservationStatus>)
        .transpose()?;

    Ok(Json(app_state.reservation_service.list_all(&identity, status).await?))
}

// PATCH /api/reservations/{id}/status
#[utoipa::path(
    patch,
    path = "/api/reservations/{id}/status",
    tag = "Reservations",
    request_body = UpdateStatusPayload,
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Status alterado", body = ReservationResponse),
        (status = 400, description = "Status inválido"),
        (status = 403, description = "Requer gerente/admin"),
        (status = 404, description = "Não encontrada"),
        (status = 409, description = "Transição não permitida ou capacidade excedida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_reservation_status(
    State(app_state): State<AppState>,
    PrivilegedUser(identity): PrivilegedUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateStatusPayload>, JsonRejection>,
) -> Result<Json<ReservationResponse>, AppError> {
    let Path(reservation_id) = path?;
    let Json(payload) = payload?;
    payload.validate()?;
    let status = payload.manager_status()?;

    let reservation = app_state
        .reservation_service
        .update_status(&identity, reservation_id, status)
        .await?;

    Ok(Json(ReservationResponse {
        message: format!("Reserva {} atualizada para {}.", reservation_id, status),
        reservation,
    }))
}

// PATCH /api/reservations/{id}/complete
#[utoipa::path(
    patch,
    path = "/api/reservations/{id}/complete",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva concluída", body = ReservationResponse),
        (status = 404, description = "Não encontrada"),
        (status = 409, description = "Só reservas aprovadas podem ser concluídas")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_reservation(
    State(app_state): State<AppState>,
    PrivilegedUser(identity): PrivilegedUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ReservationResponse>, AppError> {
    let Path(reservation_id) = path?;
    let reservation = app_state
        .reservation_service
        .update_status(&identity, reservation_id, ReservationStatus::Completed)
        .await?;

    Ok(Json(ReservationResponse {
        message: format!("Reserva {} concluída.", reservation_id),
        reservation,
    }))
}
