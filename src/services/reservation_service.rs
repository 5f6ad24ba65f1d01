// src/services/reservation_service.rs

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::reservation_repo::{Admission, ReservationStore, Transition},
    models::{
        auth::Identity,
        reservation::{Availability, AvailabilityReason, Reservation, ReservationDetail, ReservationStatus, Slot},
    },
};

/// Admissão e ciclo de vida das reservas.
///
/// Toda operação que altera estado recebe a `Identity` explicitamente; nada aqui
/// lê estado global de autenticação.
#[derive(Clone)]
pub struct ReservationService {
    store: Arc<dyn ReservationStore>,
}

impl ReservationService {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    pub async fn check_availability(&self, slot: Slot, requested: i32) -> Result<Availability, AppError> {
        ensure_positive(requested)?;
        self.store.check_availability(slot, requested).await
    }

    // --- CRIAÇÃO ---

    /// Sempre nasce `pending`. A checagem olha só a demanda aprovada do slot,
    /// então vários pedidos pendentes podem coexistir.
    pub async fn create(&self, actor: &Identity, slot: Slot, people_count: i32) -> Result<Reservation, AppError> {
        ensure_positive(people_count)?;

        match self.store.admit(actor.user_id, slot, people_count).await? {
            Admission::Admitted(reservation) => {
                tracing::info!(
                    reservation_id = %reservation.id,
                    user_id = %actor.user_id,
                    restaurant_id = %slot.restaurant_id,
                    people = people_count,
                    "Reserva criada (pendente)"
                );
                Ok(reservation)
            }
            Admission::Refused(availability) if availability.reason == AvailabilityReason::RestaurantNotFound => {
                Err(AppError::ResourceNotFound("Restaurante".into()))
            }
            Admission::Refused(availability) => {
                tracing::info!(
                    restaurant_id = %slot.restaurant_id,
                    reserved = availability.current_reserved,
                    capacity = availability.capacity,
                    requested = availability.requested,
                    "Reserva recusada por capacidade"
                );
                Err(AppError::CapacityExceeded(availability))
            }
        }
    }

    // --- LEITURA ---

    pub async fn list_mine(&self, actor: &Identity) -> Result<Vec<ReservationDetail>, AppError> {
        self.store.list_for_user(actor.user_id).await
    }

    pub async fn list_all(
        &self,
        actor: &Identity,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<ReservationDetail>, AppError> {
        require_privileged(actor)?;
        self.store.list_all(status).await
    }

    // --- TRANSIÇÕES ---

    /// Transição feita por gerente/admin, independente de quem é o dono.
    pub async fn update_status(
        &self,
        actor: &Identity,
        reservation_id: Uuid,
        next: ReservationStatus,
    ) -> Result<Reservation, AppError> {
        require_privileged(actor)?;

        let current = self.load(reservation_id).await?;
        if !current.status.can_move_to(next) {
            return Err(AppError::InvalidTransition {
                from: current.status,
                to: next,
            });
        }

        let updated = self.apply(reservation_id, current.status, next).await?;
        tracing::info!(
            reservation_id = %reservation_id,
            actor = %actor.user_id,
            from = %current.status,
            to = %next,
            "Status da reserva alterado"
        );
        Ok(updated)
    }

    /// Cancelamento pelo próprio dono. Papel não importa: só o dono cancela por aqui.
    pub async fn cancel_own(&self, actor: &Identity, reservation_id: Uuid) -> Result<Reservation, AppError> {
        let current = self.load(reservation_id).await?;

        if current.user_id != actor.user_id {
            tracing::warn!(
                reservation_id = %reservation_id,
                actor = %actor.user_id,
                owner = %current.user_id,
                "Tentativa de cancelar reserva de outro usuário"
            );
            return Err(AppError::Forbidden("Você só pode cancelar as suas próprias reservas.".into()));
        }

        if !current.status.is_self_cancellable() {
            return Err(AppError::NotCancellable(current.status));
        }

        let updated = self
            .apply(reservation_id, current.status, ReservationStatus::Cancelled)
            .await?;
        tracing::info!(reservation_id = %reservation_id, "Reserva cancelada pelo dono");
        Ok(updated)
    }

    /// Troca de data, horário ou pessoas pelo dono, enquanto pendente ou aprovada.
    /// O status não muda; a admissão roda de novo no slot de destino.
    pub async fn update_details(
        &self,
        actor: &Identity,
        reservation_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        people_count: i32,
    ) -> Result<Reservation, AppError> {
        ensure_positive(people_count)?;
        let current = self.load(reservation_id).await?;

        if current.user_id != actor.user_id {
            tracing::warn!(
                reservation_id = %reservation_id,
                actor = %actor.user_id,
                owner = %current.user_id,
                "Tentativa de alterar reserva de outro usuário"
            );
            return Err(AppError::Forbidden("Você só pode alterar as suas próprias reservas.".into()));
        }

        if !current.status.is_editable() {
            return Err(AppError::NotEditable(current.status));
        }

        let slot = Slot::new(current.restaurant_id, date, time);
        let outcome = self
            .store
            .update_details(reservation_id, current.status, slot, people_count)
            .await?;
        let updated = settle(outcome)?;
        tracing::info!(
            reservation_id = %reservation_id,
            date = %slot.date,
            time = %slot.time,
            people = people_count,
            "Reserva alterada pelo dono"
        );
        Ok(updated)
    }

    /// Remoção física pelo dono; fora das regras de ciclo de vida.
    pub async fn delete_own(&self, actor: &Identity, reservation_id: Uuid) -> Result<(), AppError> {
        let current = self.load(reservation_id).await?;
        if current.user_id != actor.user_id {
            return Err(AppError::Forbidden("Você só pode remover as suas próprias reservas.".into()));
        }

        if self.store.delete(reservation_id).await? == 0 {
            return Err(AppError::ResourceNotFound("Reserva".into()));
        }
        Ok(())
    }

    async fn load(&self, reservation_id: Uuid) -> Result<Reservation, AppError> {
        self.store
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Reserva".into()))
    }

    async fn apply(
        &self,
        reservation_id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> Result<Reservation, AppError> {
        settle(self.store.transition(reservation_id, from, to).await?)
    }
}

fn settle(outcome: Transition) -> Result<Reservation, AppError> {
    match outcome {
        Transition::Applied(reservation) => Ok(reservation),
        Transition::NotFound => Err(AppError::ResourceNotFound("Reserva".into())),
        Transition::StatusChanged(now) => Err(AppError::StatusChanged(now)),
        Transition::Refused(availability) => Err(AppError::CapacityExceeded(availability)),
    }
}

fn require_privileged(actor: &Identity) -> Result<(), AppError> {
    if !actor.role.is_privileged() {
        return Err(AppError::Forbidden("Requer papel de gerente ou admin.".into()));
    }
    Ok(())
}

fn ensure_positive(people_count: i32) -> Result<(), AppError> {
    if people_count <= 0 {
        return Err(AppError::BadRequest("A quantidade de pessoas deve ser positiva.".into()));
    }
    Ok(())
}
