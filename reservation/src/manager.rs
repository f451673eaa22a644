use abi::{
  ConflictQuery, Error, NewReservation, Reservation, ReservationId, Restaurant, RestaurantListing,
  Table, TableId, TableSchedule,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use crate::{ReservationManager, Rsvp};

const RESERVATION_COLUMNS: &str = "id, diner_name, reservation_time, table_id, group_id";

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
  restaurant_id: i32,
  name: String,
  endorsements: Vec<String>,
  table_id: Option<TableId>,
  capacity: Option<i32>,
  reservation_time: Option<DateTime<Utc>>,
}

#[async_trait]
impl Rsvp for ReservationManager {
  async fn find_table(&self, id: TableId) -> Result<Option<Table>, Error> {
    let table = sqlx::query_as(
      "SELECT id, capacity, restaurant_id FROM rsvp.dining_tables WHERE id = $1"
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(table)
  }

  async fn find_reservation(&self, id: ReservationId) -> Result<Option<Reservation>, Error> {
    let rsvp = sqlx::query_as(
      &format!("SELECT {RESERVATION_COLUMNS} FROM rsvp.reservations WHERE id = $1")
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(rsvp)
  }

  async fn find_conflict(&self, query: ConflictQuery) -> Result<Option<Reservation>, Error> {
    // half-open windows: an existing booking ending exactly at `start` is not a conflict
    let window = query.window();
    let rsvp = sqlx::query_as(&format!(
      "SELECT {RESERVATION_COLUMNS} FROM rsvp.reservations \
       WHERE ($1::int4 IS NULL OR table_id = $1) \
         AND ($2::text IS NULL OR diner_name = $2) \
         AND reservation_time < $3 AND ends_at > $4 \
       ORDER BY reservation_time LIMIT 1"
    ))
    .bind(query.table_id)
    .bind(query.diner_name)
    .bind(window.end)
    .bind(window.start)
    .fetch_optional(&self.pool)
    .await?;
    Ok(rsvp)
  }

  async fn find_restaurants(
    &self,
    endorsements: &[String],
    at: DateTime<Utc>,
  ) -> Result<Vec<RestaurantListing>, Error> {
    let rows: Vec<ListingRow> = sqlx::query_as(
      "SELECT r.id AS restaurant_id, r.name, r.endorsements, \
              t.id AS table_id, t.capacity, v.reservation_time \
       FROM rsvp.restaurants r \
       LEFT JOIN rsvp.dining_tables t ON t.restaurant_id = r.id \
       LEFT JOIN rsvp.reservations v ON v.table_id = t.id AND v.reservation_time = $2 \
       WHERE r.endorsements @> $1::text[] \
       ORDER BY r.id, t.id"
    )
    .bind(endorsements)
    .bind(at)
    .fetch_all(&self.pool)
    .await?;
    Ok(group_listings(rows))
  }

  async fn save(&self, rsvp: NewReservation) -> Result<Reservation, Error> {
    let mut tx = self.pool.begin().await?;
    let rsvp = insert(&mut tx, rsvp).await?;
    tx.commit().await?;
    Ok(rsvp)
  }

  async fn save_all(&self, rsvps: Vec<NewReservation>) -> Result<Vec<Reservation>, Error> {
    // dropping the transaction on error rolls back the rows inserted so far
    let mut tx = self.pool.begin().await?;
    let mut saved = Vec::with_capacity(rsvps.len());
    for rsvp in rsvps {
      saved.push(insert(&mut tx, rsvp).await?);
    }
    tx.commit().await?;
    Ok(saved)
  }

  async fn remove(&self, id: ReservationId) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM rsvp.reservations WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(Error::ReservationNotFound);
    }
    Ok(())
  }
}

impl ReservationManager {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

async fn insert(
  tx: &mut Transaction<'_, Postgres>,
  rsvp: NewReservation,
) -> Result<Reservation, Error> {
  let window = rsvp.window();
  let id: ReservationId = sqlx::query(
    "INSERT INTO rsvp.reservations (diner_name, reservation_time, ends_at, table_id, group_id) \
     VALUES ($1, $2, $3, $4, $5) RETURNING id"
  )
  .bind(&rsvp.diner_name)
  .bind(window.start)
  .bind(window.end)
  .bind(rsvp.table_id)
  .bind(&rsvp.group_id)
  .fetch_one(&mut **tx)
  .await?
  .get(0);
  Ok(rsvp.into_reservation(id))
}

/// fold the flat join rows (ordered by restaurant then table) into listings
fn group_listings(rows: Vec<ListingRow>) -> Vec<RestaurantListing> {
  let mut listings: Vec<RestaurantListing> = Vec::new();
  for row in rows {
    let is_new = listings.last().map_or(true, |l| l.restaurant.id != row.restaurant_id);
    if is_new {
      listings.push(RestaurantListing {
        restaurant: Restaurant {
          id: row.restaurant_id,
          name: row.name,
          endorsements: row.endorsements,
        },
        tables: Vec::new(),
      });
    }
    let Some(listing) = listings.last_mut() else { continue };
    let (Some(table_id), Some(capacity)) = (row.table_id, row.capacity) else { continue };

    if listing.tables.last().map_or(true, |t| t.table.id != table_id) {
      listing.tables.push(TableSchedule {
        table: Table::new(table_id, capacity, row.restaurant_id),
        starts: Vec::new(),
      });
    }
    if let (Some(schedule), Some(start)) = (listing.tables.last_mut(), row.reservation_time) {
      schedule.starts.push(start);
    }
  }
  listings
}
