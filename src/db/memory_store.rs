// src/db/memory_store.rs
//
// ReservationStore em memória para os testes do serviço e das rotas.
// Um único Mutex cobre checagem + escrita, o equivalente da trava de linha do Postgres.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::reservation_repo::{Admission, ReservationStore, Transition},
    models::reservation::{Availability, Reservation, ReservationDetail, ReservationStatus, Slot},
};

struct StoredRestaurant {
    name: String,
    location: String,
    total_seats: i32,
}

#[derive(Default)]
struct State {
    restaurants: HashMap<Uuid, StoredRestaurant>,
    users: HashMap<Uuid, (String, String)>,
    reservations: HashMap<Uuid, Reservation>,
}

impl State {
    fn reserved(&self, slot: &Slot) -> i64 {
        self.reserved_excluding(slot, None)
    }

    fn reserved_excluding(&self, slot: &Slot, exclude: Option<Uuid>) -> i64 {
        self.reservations
            .values()
            .filter(|r| r.slot() == *slot && r.status.consumes_capacity())
            .filter(|r| exclude != Some(r.id))
            .map(|r| i64::from(r.people_count))
            .sum()
    }

    fn detail(&self, r: &Reservation) -> ReservationDetail {
        let (restaurant_name, restaurant_location) = self
            .restaurants
            .get(&r.restaurant_id)
            .map(|s| (s.name.clone(), s.location.clone()))
            .unwrap_or_default();
        let (user_name, user_email) = self.users.get(&r.user_id).cloned().unwrap_or_default();
        ReservationDetail {
            id: r.id,
            user_id: r.user_id,
            restaurant_id: r.restaurant_id,
            restaurant_name,
            restaurant_location,
            user_name,
            user_email,
            reservation_date: r.reservation_date,
            reservation_time: r.reservation_time,
            people_count: r.people_count,
            status: r.status,
        }
    }
}

#[derive(Default)]
pub struct MemoryReservationStore {
    state: Mutex<State>,
}

impl MemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_restaurant(&self, name: &str, total_seats: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().restaurants.insert(
            id,
            StoredRestaurant {
                name: name.to_string(),
                location: "Centro".to_string(),
                total_seats,
            },
        );
        id
    }

    pub fn add_user(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state
            .lock()
            .unwrap()
            .users
            .insert(id, (name.to_string(), format!("{}@exemplo.com", name)));
        id
    }

    /// Força um status direto, sem regras (montagem de cenários).
    pub fn force_status(&self, id: Uuid, status: ReservationStatus) {
        if let Some(r) = self.state.lock().unwrap().reservations.get_mut(&id) {
            r.status = status;
        }
    }

    pub fn approved_seats(&self, slot: &Slot) -> i64 {
        self.state.lock().unwrap().reserved(slot)
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn check_availability(&self, slot: Slot, requested: i32) -> Result<Availability, AppError> {
        let state = self.state.lock().unwrap();
        Ok(match state.restaurants.get(&slot.restaurant_id) {
            Some(r) => Availability::evaluate(r.total_seats, state.reserved(&slot), requested),
            None => Availability::restaurant_not_found(requested),
        })
    }

    async fn admit(&self, user_id: Uuid, slot: Slot, people_count: i32) -> Result<Admission, AppError> {
        let mut state = self.state.lock().unwrap();
        let Some(capacity) = state.restaurants.get(&slot.restaurant_id).map(|r| r.total_seats) else {
            return Ok(Admission::Refused(Availability::restaurant_not_found(people_count)));
        };

        let availability = Availability::evaluate(capacity, state.reserved(&slot), people_count);
        if !availability.available {
            return Ok(Admission::Refused(availability));
        }

        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id,
            restaurant_id: slot.restaurant_id,
            reservation_date: slot.date,
            reservation_time: slot.time,
            people_count,
            status: ReservationStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        state.reservations.insert(reservation.id, reservation.clone());
        Ok(Admission::Admitted(reservation))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, AppError> {
        Ok(self.state.lock().unwrap().reservations.get(&id).cloned())
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: ReservationStatus,
        next: ReservationStatus,
    ) -> Result<Transition, AppError> {
        let mut state = self.state.lock().unwrap();
        let Some(current) = state.reservations.get(&id).cloned() else {
            return Ok(Transition::NotFound);
        };
        if current.status != expected {
            return Ok(Transition::StatusChanged(current.status));
        }

        if next.consumes_capacity() && !current.status.consumes_capacity() {
            let Some(capacity) = state.restaurants.get(&current.restaurant_id).map(|r| r.total_seats)
            else {
                return Ok(Transition::NotFound);
            };
            let availability =
                Availability::evaluate(capacity, state.reserved(&current.slot()), current.people_count);
            if !availability.available {
                return Ok(Transition::Refused(availability));
            }
        }

        let Some(stored) = state.reservations.get_mut(&id) else {
            return Ok(Transition::NotFound);
        };
        stored.status = next;
        stored.updated_at = Utc::now();
        Ok(Transition::Applied(stored.clone()))
    }

    async fn update_details(
        &self,
        id: Uuid,
        expected: ReservationStatus,
        slot: Slot,
        people_count: i32,
    ) -> Result<Transition, AppError> {
        let mut state = self.state.lock().unwrap();
        let Some(capacity) = state.restaurants.get(&slot.restaurant_id).map(|r| r.total_seats) else {
            return Ok(Transition::NotFound);
        };
        let Some(current) = state.reservations.get(&id).cloned() else {
            return Ok(Transition::NotFound);
        };
        if current.restaurant_id != slot.restaurant_id {
            return Ok(Transition::NotFound);
        }
        if current.status != expected {
            return Ok(Transition::StatusChanged(current.status));
        }

        let availability =
            Availability::evaluate(capacity, state.reserved_excluding(&slot, Some(id)), people_count);
        if !availability.available {
            return Ok(Transition::Refused(availability));
        }

        let Some(stored) = state.reservations.get_mut(&id) else {
            return Ok(Transition::NotFound);
        };
        stored.reservation_date = slot.date;
        stored.reservation_time = slot.time;
        stored.people_count = people_count;
        stored.updated_at = Utc::now();
        Ok(Transition::Applied(stored.clone()))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ReservationDetail>, AppError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<ReservationDetail> = state
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .map(|r| state.detail(r))
            .collect();
        rows.sort_by(|a, b| {
            (b.reservation_date, b.reservation_time).cmp(&(a.reservation_date, a.reservation_time))
        });
        Ok(rows)
    }

    async fn list_all(&self, status: Option<ReservationStatus>) -> Result<Vec<ReservationDetail>, AppError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<ReservationDetail> = state
            .reservations
            .values()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .map(|r| state.detail(r))
            .collect();
        rows.sort_by(|a, b| {
            (b.reservation_date, b.reservation_time).cmp(&(a.reservation_date, a.reservation_time))
        });
        Ok(rows)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let removed = self.state.lock().unwrap().reservations.remove(&id);
        Ok(u64::from(removed.is_some()))
    }
}
