pub mod auth;
pub mod reservation_service;
pub mod restaurant_service;
