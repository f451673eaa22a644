mod lifecycle;
mod manager;
mod memory;
mod rules;
mod search;

use abi::{
  ConflictQuery, Error, NewReservation, Reservation, ReservationId, RestaurantListing, Table,
  TableId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub use lifecycle::{cancel_reservation, create_group_reservation, create_reservation};
pub use memory::MemoryStore;
pub use rules::{has_diner_conflict, has_table_conflict, reserve, reserve_group};
pub use search::search_restaurants;

/// Reservation store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct ReservationManager {
  pool: PgPool,
}

#[async_trait]
pub trait Rsvp: Send + Sync {
  /// get a table by id
  async fn find_table(&self, id: TableId) -> Result<Option<Table>, Error>;
  /// get a reservation by id
  async fn find_reservation(&self, id: ReservationId) -> Result<Option<Reservation>, Error>;
  /// first existing reservation whose occupancy window intersects the queried one
  async fn find_conflict(&self, query: ConflictQuery) -> Result<Option<Reservation>, Error>;
  /// restaurants carrying every endorsement in `endorsements`, with their tables
  /// and the reservations starting at `at`
  async fn find_restaurants(
    &self,
    endorsements: &[String],
    at: DateTime<Utc>,
  ) -> Result<Vec<RestaurantListing>, Error>;
  /// persist a reservation
  async fn save(&self, rsvp: NewReservation) -> Result<Reservation, Error>;
  /// persist all reservations or none of them
  async fn save_all(&self, rsvps: Vec<NewReservation>) -> Result<Vec<Reservation>, Error>;
  /// delete a reservation
  async fn remove(&self, id: ReservationId) -> Result<(), Error>;
}
