use abi::{
  ConflictQueryBuilder, Error, GroupBooking, NewReservation, Reservation, Table, TableId,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::Rsvp;

/// Whether any reservation on `table_id` overlaps the window starting at `start`.
pub async fn has_table_conflict<S>(
  store: &S,
  table_id: TableId,
  start: DateTime<Utc>,
) -> Result<bool, Error>
where
  S: Rsvp + ?Sized,
{
  let query = ConflictQueryBuilder::default()
    .table_id(table_id)
    .start(start)
    .build()?;
  let conflict = store.find_conflict(query).await?;
  if let Some(existing) = &conflict {
    debug!(table_id, existing = existing.id, "table already taken");
  }
  Ok(conflict.is_some())
}

/// Whether `diner_name` already holds a reservation, on any table, overlapping
/// the window starting at `start`.
pub async fn has_diner_conflict<S>(
  store: &S,
  diner_name: &str,
  start: DateTime<Utc>,
) -> Result<bool, Error>
where
  S: Rsvp + ?Sized,
{
  let query = ConflictQueryBuilder::default()
    .diner_name(diner_name)
    .start(start)
    .build()?;
  let conflict = store.find_conflict(query).await?;
  if let Some(existing) = &conflict {
    debug!(diner_name, existing = existing.id, "diner already booked");
  }
  Ok(conflict.is_some())
}

/// Persist a reservation. Conflicts must have been checked by the caller; the
/// store only rejects what its own constraints catch.
pub async fn reserve<S>(
  store: &S,
  diner_name: impl Into<String>,
  start: DateTime<Utc>,
  table: &Table,
  group_id: Option<String>,
) -> Result<Reservation, Error>
where
  S: Rsvp + ?Sized,
{
  let rsvp = store
    .save(NewReservation::new(diner_name, start, table.id, group_id))
    .await?;
  info!(id = rsvp.id, table_id = table.id, diner = %rsvp.diner_name, "reservation created");
  Ok(rsvp)
}

/// Persist one row per diner of `booking`, all or nothing.
pub async fn reserve_group<S>(
  store: &S,
  booking: &GroupBooking,
) -> Result<Vec<Reservation>, Error>
where
  S: Rsvp + ?Sized,
{
  let rsvps = store.save_all(booking.reservations()).await?;
  info!(
    group_id = %booking.group_id,
    table_id = booking.table_id,
    size = rsvps.len(),
    "group reservation created"
  );
  Ok(rsvps)
}
