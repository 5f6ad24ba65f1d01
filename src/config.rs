// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{ReservationRepository, ReservationStore, RestaurantRepository, UserRepository},
    services::{
        auth::AuthService, reservation_service::ReservationService,
        restaurant_service::RestaurantService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub max_connections: u32,
    pub jwt_ttl_hours: i64,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        Ok(Self {
            database_url,
            jwt_secret,
            port: parse_or("PORT", 5001)?,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_ttl_hours: parse_or("JWT_TTL_HOURS", 1)?,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} inválido: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Settings,
    pub auth_service: AuthService,
    pub restaurant_service: RestaurantService,
    pub reservation_service: ReservationService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let reservation_store = Arc::new(ReservationRepository::new(db_pool.clone()));
        Ok(Self::assemble(db_pool, settings, reservation_store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn assemble(
        db_pool: PgPool,
        settings: Settings,
        reservation_store: Arc<dyn ReservationStore>,
    ) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let auth_service = AuthService::new(user_repo, settings.jwt_secret.clone(), settings.jwt_ttl_hours);
        let restaurant_service = RestaurantService::new(RestaurantRepository::new(db_pool.clone()));
        let reservation_service = ReservationService::new(reservation_store);

        Self {
            db_pool,
            settings,
            auth_service,
            restaurant_service,
            reservation_service,
        }
    }
}
