use std::collections::BTreeMap;

use abi::{
  covers, ConflictQuery, Error, NewReservation, Reservation, ReservationId, Restaurant,
  RestaurantListing, Table, TableId, TableSchedule,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::Rsvp;

/// Process-local store with the same constraints as the PostgreSQL schema.
#[derive(Debug)]
pub struct MemoryStore {
  inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
  restaurants: BTreeMap<i32, Restaurant>,
  tables: BTreeMap<TableId, Table>,
  reservations: BTreeMap<ReservationId, Reservation>,
  next_id: ReservationId,
}

/// (name, endorsements, table capacities) of the reference data set
const SEED: [(&str, &[&str], &[i32]); 5] = [
  ("Lardo", &["Gluten Free Options"], &[2, 2, 2, 2, 4, 4, 6]),
  (
    "Panadería Rosetta",
    &["Vegetarian-Friendly", "Gluten Free Options"],
    &[2, 2, 2, 4, 4],
  ),
  (
    "Tetetlán",
    &["Paleo-friendly", "Gluten Free Options"],
    &[2, 2, 2, 2, 4, 4, 6],
  ),
  (
    "Falling Piano Brewing Co",
    &[],
    &[2, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 6],
  ),
  ("u.to.pi.a", &["Vegan-Friendly", "Vegetarian-Friendly"], &[2, 2]),
];

impl MemoryStore {
  pub fn new(restaurants: Vec<Restaurant>, tables: Vec<Table>) -> Self {
    let inner = Inner {
      restaurants: restaurants.into_iter().map(|r| (r.id, r)).collect(),
      tables: tables.into_iter().map(|t| (t.id, t)).collect(),
      reservations: BTreeMap::new(),
      next_id: 1,
    };
    Self {
      inner: RwLock::new(inner),
    }
  }

  /// the same restaurants and tables the seed migration inserts, with the same ids
  pub fn seeded() -> Self {
    let mut restaurants = Vec::new();
    let mut tables = Vec::new();
    for (idx, (name, endorsements, capacities)) in SEED.iter().enumerate() {
      let restaurant_id = idx as i32 + 1;
      restaurants.push(Restaurant::new(restaurant_id, *name, endorsements));
      for capacity in capacities.iter() {
        tables.push(Table::new(tables.len() as TableId + 1, *capacity, restaurant_id));
      }
    }
    Self::new(restaurants, tables)
  }

  /// snapshot of every stored reservation, ordered by id
  pub async fn reservations(&self) -> Vec<Reservation> {
    self.inner.read().await.reservations.values().cloned().collect()
  }
}

impl Default for MemoryStore {
  fn default() -> Self {
    Self::new(Vec::new(), Vec::new())
  }
}

impl Inner {
  /// mirrors the exclusion constraints on `rsvp.reservations`
  fn violation(&self, rsvp: &NewReservation) -> Option<Error> {
    let window = rsvp.window();
    let overlapping = self
      .reservations
      .values()
      .filter(|existing| existing.window().overlaps(&window));
    for existing in overlapping {
      let same_group = rsvp.group_id.is_some() && existing.group_id == rsvp.group_id;
      if existing.table_id == rsvp.table_id && !same_group {
        return Some(Error::TableAlreadyReserved);
      }
      if existing.diner_name == rsvp.diner_name {
        return Some(Error::DinerOverlap(None));
      }
    }
    None
  }

  fn insert(&mut self, rsvp: NewReservation) -> Result<Reservation, Error> {
    if !self.tables.contains_key(&rsvp.table_id) {
      return Err(Error::TableNotFound);
    }
    if let Some(err) = self.violation(&rsvp) {
      return Err(err);
    }
    let rsvp = rsvp.into_reservation(self.next_id);
    self.next_id += 1;
    self.reservations.insert(rsvp.id, rsvp.clone());
    Ok(rsvp)
  }
}

#[async_trait]
impl Rsvp for MemoryStore {
  async fn find_table(&self, id: TableId) -> Result<Option<Table>, Error> {
    Ok(self.inner.read().await.tables.get(&id).copied())
  }

  async fn find_reservation(&self, id: ReservationId) -> Result<Option<Reservation>, Error> {
    Ok(self.inner.read().await.reservations.get(&id).cloned())
  }

  async fn find_conflict(&self, query: ConflictQuery) -> Result<Option<Reservation>, Error> {
    let inner = self.inner.read().await;
    let mut conflicts: Vec<&Reservation> = inner
      .reservations
      .values()
      .filter(|rsvp| query.matches(rsvp))
      .collect();
    conflicts.sort_by_key(|rsvp| rsvp.reservation_time);
    Ok(conflicts.first().map(|rsvp| (*rsvp).clone()))
  }

  async fn find_restaurants(
    &self,
    endorsements: &[String],
    at: DateTime<Utc>,
  ) -> Result<Vec<RestaurantListing>, Error> {
    let inner = self.inner.read().await;
    let listings = inner
      .restaurants
      .values()
      .filter(|r| covers(&r.endorsements, endorsements))
      .map(|restaurant| RestaurantListing {
        restaurant: restaurant.clone(),
        tables: inner
          .tables
          .values()
          .filter(|t| t.restaurant_id == restaurant.id)
          .map(|table| TableSchedule {
            table: *table,
            starts: inner
              .reservations
              .values()
              .filter(|rsvp| rsvp.table_id == table.id && rsvp.reservation_time == at)
              .map(|rsvp| rsvp.reservation_time)
              .collect(),
          })
          .collect(),
      })
      .collect();
    Ok(listings)
  }

  async fn save(&self, rsvp: NewReservation) -> Result<Reservation, Error> {
    self.inner.write().await.insert(rsvp)
  }

  async fn save_all(&self, rsvps: Vec<NewReservation>) -> Result<Vec<Reservation>, Error> {
    let mut inner = self.inner.write().await;
    let mut saved = Vec::with_capacity(rsvps.len());
    for rsvp in rsvps {
      match inner.insert(rsvp) {
        Ok(rsvp) => saved.push(rsvp),
        Err(e) => {
          for rsvp in &saved {
            inner.reservations.remove(&rsvp.id);
          }
          return Err(e);
        }
      }
    }
    Ok(saved)
  }

  async fn remove(&self, id: ReservationId) -> Result<(), Error> {
    match self.inner.write().await.reservations.remove(&id) {
      Some(_) => Ok(()),
      None => Err(Error::ReservationNotFound),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
  }

  #[tokio::test]
  async fn seeded_store_should_match_reference_data() {
    let store = MemoryStore::seeded();
    let all = store.find_restaurants(&[], at("2024-06-19T12:00:00Z")).await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all.iter().map(|l| l.tables.len()).sum::<usize>(), 36);
    assert_eq!(all[4].restaurant.name, "u.to.pi.a");
    assert_eq!(all[4].tables[0].table.id, 35);
    assert_eq!(store.find_table(36).await.unwrap().unwrap().restaurant_id, 5);
    assert_eq!(store.find_table(37).await.unwrap(), None);
  }

  #[tokio::test]
  async fn overlapping_save_should_be_rejected() {
    let store = MemoryStore::seeded();
    store
      .save(NewReservation::new("Alice", at("2024-06-19T12:00:00Z"), 1, None))
      .await
      .unwrap();
    let err = store
      .save(NewReservation::new("Bob", at("2024-06-19T13:59:59Z"), 1, None))
      .await
      .unwrap_err();
    assert_eq!(err, Error::TableAlreadyReserved);
    store
      .save(NewReservation::new("Bob", at("2024-06-19T14:00:00Z"), 1, None))
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn failed_batch_should_leave_no_rows() {
    let store = MemoryStore::seeded();
    let time = at("2024-06-19T18:00:00Z");
    let group = Some("party".to_string());
    let err = store
      .save_all(vec![
        NewReservation::new("Ann", time, 7, group.clone()),
        NewReservation::new("Ben", time, 7, group.clone()),
        NewReservation::new("Ann", time, 7, group),
      ])
      .await
      .unwrap_err();
    assert_eq!(err, Error::DinerOverlap(None));
    assert!(store.reservations().await.is_empty());
  }

  #[tokio::test]
  async fn remove_should_report_missing_rows() {
    let store = MemoryStore::seeded();
    let rsvp = store
      .save(NewReservation::new("Alice", at("2024-06-19T12:00:00Z"), 1, None))
      .await
      .unwrap();
    store.remove(rsvp.id).await.unwrap();
    assert_eq!(store.remove(rsvp.id).await.unwrap_err(), Error::ReservationNotFound);
  }
}
