// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_password,
        handlers::auth::update_username,

        // --- Restaurants ---
        handlers::restaurants::list_restaurants,
        handlers::restaurants::get_restaurant,
        handlers::restaurants::create_restaurant,
        handlers::restaurants::update_restaurant,
        handlers::restaurants::delete_restaurant,
        handlers::restaurants::check_availability,

        // --- Reservations ---
        handlers::reservations::create_reservation,
        handlers::reservations::list_my_reservations,
        handlers::reservations::update_my_reservation,
        handlers::reservations::cancel_my_reservation,
        handlers::reservations::delete_my_reservation,
        handlers::reservations::list_all_reservations,
        handlers::reservations::update_reservation_status,
        handlers::reservations::complete_reservation,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::UserProfile,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdatePasswordPayload,
            models::auth::UpdateUsernamePayload,
            models::auth::RegisterResponse,
            models::auth::AuthResponse,

            // --- Restaurants ---
            models::restaurant::Restaurant,
            models::restaurant::CreateRestaurantPayload,
            models::restaurant::UpdateRestaurantPayload,

            // --- Reservations ---
            models::reservation::ReservationStatus,
            models::reservation::Reservation,
            models::reservation::ReservationDetail,
            models::reservation::AvailabilityReason,
            models::reservation::Availability,
            models::reservation::CreateReservationPayload,
            models::reservation::UpdateReservationPayload,
            models::reservation::UpdateStatusPayload,
            models::reservation::ReservationResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Restaurants", description = "Restaurantes e Disponibilidade"),
        (name = "Reservations", description = "Pedidos de Reserva e Ciclo de Vida")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
