pub mod auth;
pub mod reservations;
pub mod restaurants;
