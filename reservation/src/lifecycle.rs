use std::collections::HashSet;

use abi::{
  Confirmation, Error, GroupReservation, GroupReserveRequest, Reservation, ReservationId,
  ReserveRequest, Validator,
};
use tracing::{info, warn};

use crate::{has_diner_conflict, has_table_conflict, reserve, reserve_group, Rsvp};

/// Book a single diner on a table.
pub async fn create_reservation<S>(
  store: &S,
  req: ReserveRequest,
) -> Result<Reservation, Error>
where
  S: Rsvp + ?Sized,
{
  let draft = req.validate()?;
  let table = store
    .find_table(draft.table_id)
    .await?
    .ok_or(Error::TableNotFound)?;

  if has_table_conflict(store, table.id, draft.reservation_time).await? {
    warn!(table_id = table.id, time = %draft.reservation_time, "table already reserved");
    return Err(Error::TableAlreadyReserved);
  }
  if has_diner_conflict(store, &draft.diner_name, draft.reservation_time).await? {
    warn!(
      diner = %draft.diner_name,
      time = %draft.reservation_time,
      "diner has overlapping reservation"
    );
    return Err(Error::DinerOverlap(None));
  }

  reserve(store, draft.diner_name, draft.reservation_time, &table, None).await
}

/// Book every diner of a group on one table, or nobody.
pub async fn create_group_reservation<S>(
  store: &S,
  req: GroupReserveRequest,
) -> Result<GroupReservation, Error>
where
  S: Rsvp + ?Sized,
{
  let booking = req.validate()?;
  let table = store
    .find_table(booking.table_id)
    .await?
    .ok_or(Error::TableNotFound)?;

  // diners first, in request order; a name listed twice would double book itself
  let mut seen = HashSet::new();
  for diner in &booking.diners {
    if !seen.insert(diner.as_str())
      || has_diner_conflict(store, diner, booking.reservation_time).await?
    {
      warn!(group_id = %booking.group_id, diner = %diner, "diner has overlapping reservation");
      return Err(Error::DinerOverlap(Some(diner.clone())));
    }
  }
  if has_table_conflict(store, table.id, booking.reservation_time).await? {
    warn!(group_id = %booking.group_id, table_id = table.id, "table already reserved");
    return Err(Error::TableAlreadyReserved);
  }

  let rsvps = reserve_group(store, &booking).await?;
  let reservation_id = rsvps.first().map(|r| r.id).ok_or(Error::InvalidInput)?;
  Ok(GroupReservation {
    reservation_id,
    group_id: booking.group_id,
    diners: rsvps.into_iter().map(|r| r.diner_name).collect(),
  })
}

/// Cancel a reservation given the raw id from the request path.
pub async fn cancel_reservation<S>(store: &S, id: &str) -> Result<Confirmation, Error>
where
  S: Rsvp + ?Sized,
{
  let id = parse_reservation_id(id)?;
  let rsvp = store
    .find_reservation(id)
    .await?
    .ok_or(Error::ReservationNotFound)?;
  store.remove(rsvp.id).await?;
  info!(id = rsvp.id, diner = %rsvp.diner_name, "reservation cancelled");
  Ok(Confirmation::cancelled())
}

/// a malformed id can never name a reservation, so it is simply not found
fn parse_reservation_id(id: &str) -> Result<ReservationId, Error> {
  id.trim()
    .parse::<ReservationId>()
    .ok()
    .filter(|id| *id > 0)
    .ok_or(Error::ReservationNotFound)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::MemoryStore;

  fn single(diner: &str, time: &str, table_id: i32) -> ReserveRequest {
    ReserveRequest {
      diner_name: Some(diner.into()),
      reservation_time: Some(time.into()),
      table_id: Some(table_id),
    }
  }

  fn group(name: &str, time: &str, table_id: i32, diners: &[&str]) -> GroupReserveRequest {
    GroupReserveRequest {
      group_name: Some(name.into()),
      reservation_time: Some(time.into()),
      table_id: Some(table_id),
      diners: Some(diners.iter().map(|d| d.to_string()).collect()),
    }
  }

  #[tokio::test]
  async fn booking_walkthrough_should_enforce_both_invariants() {
    let store = MemoryStore::seeded();

    let alice = create_reservation(&store, single("Alice", "2024-06-19T12:00:00Z", 1))
      .await
      .unwrap();
    assert_eq!(alice.table_id, 1);

    let err = create_reservation(&store, single("Bob", "2024-06-19T13:00:00Z", 1))
      .await
      .unwrap_err();
    assert_eq!(err, Error::TableAlreadyReserved);
    assert_eq!(err.to_string(), "Table is already reserved at this time");

    let err = create_reservation(&store, single("Alice", "2024-06-19T13:30:00Z", 2))
      .await
      .unwrap_err();
    assert_eq!(err.to_string(), "User has overlapping reservations");

    create_reservation(&store, single("Bob", "2024-06-19T14:00:00Z", 1))
      .await
      .unwrap();
    assert_eq!(store.reservations().await.len(), 2);
  }

  #[tokio::test]
  async fn table_check_should_run_before_diner_check() {
    let store = MemoryStore::seeded();
    create_reservation(&store, single("Alice", "2024-06-19T12:00:00Z", 1))
      .await
      .unwrap();
    let err = create_reservation(&store, single("Alice", "2024-06-19T12:30:00Z", 1))
      .await
      .unwrap_err();
    assert_eq!(err, Error::TableAlreadyReserved);
  }

  #[tokio::test]
  async fn unknown_table_should_be_not_found() {
    let store = MemoryStore::seeded();
    let err = create_reservation(&store, single("Alice", "2024-06-19T12:00:00Z", 99))
      .await
      .unwrap_err();
    assert_eq!(err, Error::TableNotFound);

    let req = group("party", "2024-06-19T12:00:00Z", 99, &["Ann"]);
    let err = create_group_reservation(&store, req).await.unwrap_err();
    assert_eq!(err, Error::TableNotFound);
  }

  #[tokio::test]
  async fn negative_table_id_should_be_not_found() {
    let store = MemoryStore::seeded();
    let err = create_reservation(&store, single("Alice", "2024-06-19T12:00:00Z", -5))
      .await
      .unwrap_err();
    assert_eq!(err, Error::TableNotFound);

    let req = group("party", "2024-06-19T12:00:00Z", -5, &["Ann"]);
    let err = create_group_reservation(&store, req).await.unwrap_err();
    assert_eq!(err, Error::TableNotFound);

    let err = create_reservation(&store, single("Alice", "2024-06-19T12:00:00Z", 0))
      .await
      .unwrap_err();
    assert_eq!(err, Error::InvalidInput);
    assert!(store.reservations().await.is_empty());
  }

  #[tokio::test]
  async fn group_reservation_should_create_one_row_per_diner() {
    let store = MemoryStore::seeded();
    let created = create_group_reservation(
      &store,
      group("party", "2024-06-19T18:00:00Z", 7, &["Ann", "Ben", "Cat"]),
    )
    .await
    .unwrap();
    assert_eq!(created.group_id, "party");
    assert_eq!(created.diners, vec!["Ann", "Ben", "Cat"]);

    let rows = store.reservations().await;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].id, created.reservation_id);
    assert!(rows
      .iter()
      .all(|r| r.table_id == 7 && r.group_id.as_deref() == Some("party")));
  }

  #[tokio::test]
  async fn conflicting_diner_should_abort_whole_group() {
    let store = MemoryStore::seeded();
    create_reservation(&store, single("Ben", "2024-06-19T17:00:00Z", 3))
      .await
      .unwrap();

    let err = create_group_reservation(
      &store,
      group("party", "2024-06-19T18:00:00Z", 7, &["Ann", "Ben", "Cat"]),
    )
    .await
    .unwrap_err();
    assert_eq!(err, Error::DinerOverlap(Some("Ben".into())));
    assert_eq!(err.to_string(), "User Ben has overlapping reservations");
    assert_eq!(store.reservations().await.len(), 1);
  }

  #[tokio::test]
  async fn diner_check_should_run_before_table_check() {
    let store = MemoryStore::seeded();
    create_reservation(&store, single("Ann", "2024-06-19T18:00:00Z", 7))
      .await
      .unwrap();
    // table 7 is taken too, but the diner is reported first
    let req = group("party", "2024-06-19T18:00:00Z", 7, &["Ben", "Ann"]);
    let err = create_group_reservation(&store, req).await.unwrap_err();
    assert_eq!(err, Error::DinerOverlap(Some("Ann".into())));

    let req = group("party", "2024-06-19T19:00:00Z", 7, &["Ben", "Cat"]);
    let err = create_group_reservation(&store, req).await.unwrap_err();
    assert_eq!(err, Error::TableAlreadyReserved);
  }

  #[tokio::test]
  async fn repeated_diner_should_be_an_overlap() {
    let store = MemoryStore::seeded();
    let req = group("party", "2024-06-19T18:00:00Z", 7, &["Ann", "Ben", "Ann"]);
    let err = create_group_reservation(&store, req).await.unwrap_err();
    assert_eq!(err, Error::DinerOverlap(Some("Ann".into())));
    assert!(store.reservations().await.is_empty());
  }

  #[tokio::test]
  async fn cancel_should_remove_the_row() {
    let store = MemoryStore::seeded();
    let rsvp = create_reservation(&store, single("Alice", "2024-06-19T12:00:00Z", 1))
      .await
      .unwrap();
    let confirmation = cancel_reservation(&store, &rsvp.id.to_string()).await.unwrap();
    assert_eq!(confirmation.message, "Your reservation has been cancelled");
    assert!(store.reservations().await.is_empty());

    // the slot is free again
    create_reservation(&store, single("Bob", "2024-06-19T12:00:00Z", 1))
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn cancel_with_bad_or_unknown_id_should_be_not_found() {
    let store = MemoryStore::seeded();
    for id in ["42", "abc", "", "-1", "0", "1.5"] {
      let err = cancel_reservation(&store, id).await.unwrap_err();
      assert_eq!(err, Error::ReservationNotFound, "{id}");
    }
  }
}
