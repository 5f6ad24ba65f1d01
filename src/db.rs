pub mod user_repo;
pub use user_repo::UserRepository;
pub mod restaurant_repo;
pub use restaurant_repo::RestaurantRepository;
pub mod reservation_repo;
pub use reservation_repo::{ReservationRepository, ReservationStore};

#[cfg(test)]
pub mod memory_store;
#[cfg(test)]
pub mod test_db;
