// src/db/test_db.rs
//
// Apoio aos testes que rodam contra um Postgres de verdade.
// Sem DATABASE_URL o teste retorna cedo e não falha.

use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

pub async fn pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL não definida; teste de banco ignorado");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(12)
        .connect(&url)
        .await
        .expect("falha ao conectar no banco de teste");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("falha ao rodar as migrações no banco de teste");
    Some(pool)
}

// Nomes únicos: os testes dividem o mesmo banco
pub async fn insert_user(pool: &PgPool) -> Uuid {
    let tag = Uuid::new_v4().simple().to_string();
    sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, 'x') RETURNING id",
    )
    .bind(format!("teste-{}", tag))
    .bind(format!("{}@teste.local", tag))
    .fetch_one(pool)
    .await
    .expect("falha ao inserir usuário de teste")
}

pub async fn insert_restaurant(pool: &PgPool, total_seats: i32) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO restaurants (name, location, total_seats) VALUES ($1, 'Centro', $2) RETURNING id",
    )
    .bind(format!("Cantina {}", Uuid::new_v4().simple()))
    .bind(total_seats)
    .fetch_one(pool)
    .await
    .expect("falha ao inserir restaurante de teste")
}
