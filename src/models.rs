pub mod auth;
pub mod reservation;
pub mod restaurant;
