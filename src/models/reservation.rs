// src/models/reservation.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

// --- Estados da reserva ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum ReservationStatus {
    Pending,
    #[serde(alias = "confirmed")]
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    /// Valores que o endpoint de status (gerente/admin) aceita.
    pub const MANAGER_SETTABLE: [ReservationStatus; 3] = [
        ReservationStatus::Approved,
        ReservationStatus::Rejected,
        ReservationStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Approved => "approved",
            ReservationStatus::Rejected => "rejected",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }

    /// Só reservas aprovadas ocupam lugares na soma do slot.
    pub fn consumes_capacity(self) -> bool {
        self == ReservationStatus::Approved
    }

    /// O dono só pode cancelar enquanto a reserva está pendente ou aprovada.
    pub fn is_self_cancellable(self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Approved)
    }

    /// Data, horário e pessoas só mudam enquanto a reserva segue ativa.
    pub fn is_editable(self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Approved)
    }

    /// Tabela de transições para papéis privilegiados.
    /// Estados finais (rejected, cancelled, completed) não saem do lugar.
    pub fn can_move_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Approved, Cancelled)
                | (Approved, Completed)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ReservationStatus::Pending),
            "approved" | "confirmed" => Ok(ReservationStatus::Approved),
            "rejected" => Ok(ReservationStatus::Rejected),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "completed" => Ok(ReservationStatus::Completed),
            other => Err(AppError::BadRequest(format!("Status desconhecido: '{}'.", other))),
        }
    }
}

// --- Slot ---

/// (restaurante, data, horário): a unidade sobre a qual a capacidade é somada.
/// O horário tem precisão de minuto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub restaurant_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Slot {
    pub fn new(restaurant_id: Uuid, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            restaurant_id,
            date,
            time: truncate_to_minute(time),
        }
    }

    pub fn parse(restaurant_id: Uuid, date: &str, time: &str) -> Result<Self, AppError> {
        Ok(Self::new(restaurant_id, parse_date(date)?, parse_time(time)?))
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Data inválida '{}'. Use AAAA-MM-DD.", value)))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map(truncate_to_minute)
        .map_err(|_| AppError::BadRequest(format!("Horário inválido '{}'. Use HH:MM.", value)))
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

// --- Registro da reserva ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    #[schema(value_type = String, example = "2025-06-14")]
    pub reservation_date: NaiveDate,
    #[schema(value_type = String, example = "20:30:00")]
    pub reservation_time: NaiveTime,
    #[schema(example = 4)]
    pub people_count: i32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn slot(&self) -> Slot {
        Slot::new(self.restaurant_id, self.reservation_date, self.reservation_time)
    }
}

// Reserva com dados de exibição (listagens)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub restaurant_name: String,
    pub restaurant_location: String,
    pub user_name: String,
    pub user_email: String,
    #[schema(value_type = String, example = "2025-06-14")]
    pub reservation_date: NaiveDate,
    #[schema(value_type = String, example = "20:30:00")]
    pub reservation_time: NaiveTime,
    pub people_count: i32,
    pub status: ReservationStatus,
}

// --- Disponibilidade ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityReason {
    SeatsAvailable,
    NotEnoughSeats,
    RestaurantNotFound,
}

/// Resultado da checagem de admissão para um slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub available: bool,
    pub reason: AvailabilityReason,
    pub message: String,
    pub current_reserved: i64,
    pub capacity: i32,
    pub requested: i32,
}

impl Availability {
    pub fn evaluate(capacity: i32, current_reserved: i64, requested: i32) -> Self {
        if current_reserved + i64::from(requested) > i64::from(capacity) {
            return Self {
                available: false,
                reason: AvailabilityReason::NotEnoughSeats,
                message: format!(
                    "Lugares insuficientes. Reservados: {}, capacidade: {}, solicitados: {}.",
                    current_reserved, capacity, requested
                ),
                current_reserved,
                capacity,
                requested,
            };
        }

        Self {
            available: true,
            reason: AvailabilityReason::SeatsAvailable,
            message: "Lugares disponíveis.".to_string(),
            current_reserved,
            capacity,
            requested,
        }
    }

    pub fn restaurant_not_found(requested: i32) -> Self {
        Self {
            available: false,
            reason: AvailabilityReason::RestaurantNotFound,
            message: "Restaurante não encontrado.".to_string(),
            current_reserved: 0,
            capacity: 0,
            requested,
        }
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationPayload {
    #[validate(required(message = "O campo 'restaurantId' é obrigatório."))]
    pub restaurant_id: Option<Uuid>,

    #[validate(required(message = "O campo 'date' é obrigatório."))]
    #[schema(example = "2025-06-14")]
    pub date: Option<String>,

    #[validate(required(message = "O campo 'time' é obrigatório."))]
    #[schema(example = "20:30")]
    pub time: Option<String>,

    #[validate(
        required(message = "O campo 'peopleCount' é obrigatório."),
        range(min = 1, message = "A quantidade de pessoas deve ser positiva.")
    )]
    #[schema(example = 4)]
    pub people_count: Option<i32>,
}

// Edição pelo dono: os três campos juntos, como no pedido original
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationPayload {
    #[validate(required(message = "O campo 'date' é obrigatório."))]
    #[schema(example = "2025-06-15")]
    pub date: Option<String>,

    #[validate(required(message = "O campo 'time' é obrigatório."))]
    #[schema(example = "21:00")]
    pub time: Option<String>,

    #[validate(
        required(message = "O campo 'peopleCount' é obrigatório."),
        range(min = 1, message = "A quantidade de pessoas deve ser positiva.")
    )]
    #[schema(example = 2)]
    pub people_count: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusPayload {
    #[validate(required(message = "O campo 'status' é obrigatório."))]
    #[schema(example = "approved")]
    pub status: Option<String>,
}

impl UpdateStatusPayload {
    /// Converte e restringe ao conjunto aceito pelo endpoint de gerente.
    pub fn manager_status(&self) -> Result<ReservationStatus, AppError> {
        let raw = self.status.as_deref().unwrap_or_default();
        let status: ReservationStatus = raw.parse()?;
        if !ReservationStatus::MANAGER_SETTABLE.contains(&status) {
            return Err(AppError::BadRequest(format!(
                "Status inválido '{}'. Use um de: approved, rejected, cancelled.",
                raw
            )));
        }
        Ok(status)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    /// AAAA-MM-DD
    pub date: String,
    /// HH:MM
    pub time: String,
    pub people_count: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReservationFilter {
    /// pending, approved, rejected, cancelled ou completed
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationResponse {
    pub message: String,
    pub reservation: Reservation,
}
