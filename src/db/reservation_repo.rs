// src/db/reservation_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::reservation::{Availability, Reservation, ReservationDetail, ReservationStatus, Slot},
};

/// Resultado de uma tentativa de admissão (checagem + inserção atômicas).
#[derive(Debug)]
pub enum Admission {
    Admitted(Reservation),
    Refused(Availability),
}

/// Resultado de uma troca de status condicional.
#[derive(Debug)]
pub enum Transition {
    Applied(Reservation),
    /// Nenhuma linha afetada: a reserva sumiu antes do commit.
    NotFound,
    /// O status atual não era o esperado (outra requisição chegou antes).
    StatusChanged(ReservationStatus),
    /// A aprovação estouraria a capacidade do slot.
    Refused(Availability),
}

/// Persistência consumida pelo núcleo de reservas.
///
/// `admit` e `transition` precisam ser atômicas: a leitura da soma do slot e a
/// escrita que ela protege acontecem sob a mesma trava, senão duas requisições
/// concorrentes podem ver lugares livres e as duas passarem.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Retrato da disponibilidade do slot, sem travar nada.
    async fn check_availability(&self, slot: Slot, requested: i32) -> Result<Availability, AppError>;

    /// Checa a capacidade e, se couber, insere uma reserva `pending`.
    async fn admit(&self, user_id: Uuid, slot: Slot, people_count: i32) -> Result<Admission, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, AppError>;

    /// Move `id` de `expected` para `next`. Se `next` ocupa lugares, a
    /// capacidade é rechecada dentro da mesma transação.
    async fn transition(
        &self,
        id: Uuid,
        expected: ReservationStatus,
        next: ReservationStatus,
    ) -> Result<Transition, AppError>;

    /// Edição de data, horário e pessoas. A admissão roda de novo contra o
    /// slot novo, sem contar os lugares da própria reserva.
    async fn update_details(
        &self,
        id: Uuid,
        expected: ReservationStatus,
        slot: Slot,
        people_count: i32,
    ) -> Result<Transition, AppError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ReservationDetail>, AppError>;

    async fn list_all(&self, status: Option<ReservationStatus>) -> Result<Vec<ReservationDetail>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<u64, AppError>;
}

const DETAIL_SELECT: &str = r#"
    SELECT
        r.id, r.user_id, r.restaurant_id,
        res.name AS restaurant_name, res.location AS restaurant_location,
        u.name AS user_name, u.email AS user_email,
        r.reservation_date, r.reservation_time, r.people_count, r.status
    FROM reservations r
    JOIN restaurants res ON r.restaurant_id = res.id
    JOIN users u ON r.user_id = u.id
"#;

#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Soma dos lugares ocupados (status aprovado) em um slot exato.
// `exclude` tira uma reserva da conta (edição da própria reserva).
async fn reserved_seats<'e, E>(executor: E, slot: &Slot, exclude: Option<Uuid>) -> Result<i64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let reserved: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(people_count), 0)::BIGINT
        FROM reservations
        WHERE restaurant_id = $1
          AND reservation_date = $2
          AND reservation_time = $3
          AND status = $4
          AND ($5::uuid IS NULL OR id <> $5)
        "#,
    )
    .bind(slot.restaurant_id)
    .bind(slot.date)
    .bind(slot.time)
    .bind(ReservationStatus::Approved)
    .bind(exclude)
    .fetch_one(executor)
    .await?;
    Ok(reserved)
}

/// Maior soma de lugares aprovados entre todos os slots do restaurante.
pub(crate) async fn busiest_slot_seats<'e, E>(executor: E, restaurant_id: Uuid) -> Result<i64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let seats: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(MAX(seats), 0)::BIGINT
        FROM (
            SELECT SUM(people_count) AS seats
            FROM reservations
            WHERE restaurant_id = $1 AND status = $2
            GROUP BY reservation_date, reservation_time
        ) per_slot
        "#,
    )
    .bind(restaurant_id)
    .bind(ReservationStatus::Approved)
    .fetch_one(executor)
    .await?;
    Ok(seats)
}

// Trava a linha do restaurante: serializa admissões, aprovações e mudanças de lotação
pub(crate) async fn lock_capacity<'e, E>(executor: E, restaurant_id: Uuid) -> Result<Option<i32>, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let capacity: Option<i32> =
        sqlx::query_scalar("SELECT total_seats FROM restaurants WHERE id = $1 FOR UPDATE")
            .bind(restaurant_id)
            .fetch_optional(executor)
            .await?;
    Ok(capacity)
}

#[async_trait]
impl ReservationStore for ReservationRepository {
    async fn check_availability(&self, slot: Slot, requested: i32) -> Result<Availability, AppError> {
        let capacity: Option<i32> =
            sqlx::query_scalar("SELECT total_seats FROM restaurants WHERE id = $1")
                .bind(slot.restaurant_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(capacity) = capacity else {
            return Ok(Availability::restaurant_not_found(requested));
        };

        let reserved = reserved_seats(&self.pool, &slot, None).await?;
        Ok(Availability::evaluate(capacity, reserved, requested))
    }

    async fn admit(&self, user_id: Uuid, slot: Slot, people_count: i32) -> Result<Admission, AppError> {
        // 1. Inicia Transação (rollback automático no drop)
        let mut tx = self.pool.begin().await?;

        // 2. Trava o restaurante e lê a capacidade
        let Some(capacity) = lock_capacity(&mut *tx, slot.restaurant_id).await? else {
            return Ok(Admission::Refused(Availability::restaurant_not_found(people_count)));
        };

        // 3. Soma o que já está ocupado no slot
        let reserved = reserved_seats(&mut *tx, &slot, None).await?;
        let availability = Availability::evaluate(capacity, reserved, people_count);
        if !availability.available {
            return Ok(Admission::Refused(availability));
        }

        // 4. Insere a reserva pendente
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations
                (user_id, restaurant_id, reservation_date, reservation_time, people_count, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(slot.restaurant_id)
        .bind(slot.date)
        .bind(slot.time)
        .bind(people_count)
        .bind(ReservationStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        // 5. Commit
        tx.commit().await?;
        Ok(Admission::Admitted(reservation))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, AppError> {
        let reservation = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reservation)
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: ReservationStatus,
        next: ReservationStatus,
    ) -> Result<Transition, AppError> {
        let mut tx = self.pool.begin().await?;

        // Mesma ordem de travas do `admit`: restaurante antes da reserva
        let restaurant_id: Option<Uuid> =
            sqlx::query_scalar("SELECT restaurant_id FROM reservations WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(restaurant_id) = restaurant_id else {
            return Ok(Transition::NotFound);
        };
        let Some(capacity) = lock_capacity(&mut *tx, restaurant_id).await? else {
            return Ok(Transition::NotFound);
        };

        let current = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(current) = current else {
            return Ok(Transition::NotFound);
        };

        if current.status != expected {
            return Ok(Transition::StatusChanged(current.status));
        }

        if next.consumes_capacity() && !current.status.consumes_capacity() {
            let reserved = reserved_seats(&mut *tx, &current.slot(), None).await?;
            let availability = Availability::evaluate(capacity, reserved, current.people_count);
            if !availability.available {
                return Ok(Transition::Refused(availability));
            }
        }

        let updated = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(next)
        .bind(id)
        .bind(expected)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            return Ok(Transition::NotFound);
        };

        tx.commit().await?;
        Ok(Transition::Applied(updated))
    }

    async fn update_details(
        &self,
        id: Uuid,
        expected: ReservationStatus,
        slot: Slot,
        people_count: i32,
    ) -> Result<Transition, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(capacity) = lock_capacity(&mut *tx, slot.restaurant_id).await? else {
            return Ok(Transition::NotFound);
        };

        let current = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1 AND restaurant_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(slot.restaurant_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(current) = current else {
            return Ok(Transition::NotFound);
        };

        if current.status != expected {
            return Ok(Transition::StatusChanged(current.status));
        }

        let reserved = reserved_seats(&mut *tx, &slot, Some(id)).await?;
        let availability = Availability::evaluate(capacity, reserved, people_count);
        if !availability.available {
            return Ok(Transition::Refused(availability));
        }

        let updated = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET reservation_date = $1, reservation_time = $2, people_count = $3, updated_at = NOW()
            WHERE id = $4 AND status = $5
            RETURNING *
            "#,
        )
        .bind(slot.date)
        .bind(slot.time)
        .bind(people_count)
        .bind(id)
        .bind(expected)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            return Ok(Transition::NotFound);
        };

        tx.commit().await?;
        Ok(Transition::Applied(updated))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ReservationDetail>, AppError> {
        let query = format!(
            "{} WHERE r.user_id = $1 ORDER BY r.reservation_date DESC, r.reservation_time DESC",
            DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, ReservationDetail>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_all(&self, status: Option<ReservationStatus>) -> Result<Vec<ReservationDetail>, AppError> {
        let query = format!(
            "{} WHERE ($1::reservation_status IS NULL OR r.status = $1) \
             ORDER BY r.reservation_date DESC, r.reservation_time DESC",
            DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, ReservationDetail>(&query)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
