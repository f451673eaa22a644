use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{RestaurantId, TableId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub endorsements: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: TableId,
    pub capacity: i32,
    pub restaurant_id: RestaurantId,
}

/// A table together with the start times of the reservations held on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchedule {
    pub table: Table,
    pub starts: Vec<DateTime<Utc>>,
}

/// A candidate restaurant returned by the store for a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantListing {
    pub restaurant: Restaurant,
    pub tables: Vec<TableSchedule>,
}

/// One row of the search response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantAvailability {
    pub id: RestaurantId,
    pub name: String,
    pub endorsements: Vec<String>,
    pub available_tables: usize,
}

impl Restaurant {
    pub fn new(id: RestaurantId, name: impl Into<String>, endorsements: &[&str]) -> Self {
        Self {
            id,
            name: name.into(),
            endorsements: endorsements.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Table {
    pub fn new(id: TableId, capacity: i32, restaurant_id: RestaurantId) -> Self {
        Self {
            id,
            capacity,
            restaurant_id,
        }
    }
}

impl TableSchedule {
    /// free at `at` unless some reservation starts exactly then
    pub fn is_free_at(&self, at: DateTime<Utc>) -> bool {
        !self.starts.iter().any(|start| *start == at)
    }
}

impl RestaurantListing {
    pub fn available_at(&self, at: DateTime<Utc>) -> RestaurantAvailability {
        RestaurantAvailability {
            id: self.restaurant.id,
            name: self.restaurant.name.clone(),
            endorsements: self.restaurant.endorsements.clone(),
            available_tables: self.tables.iter().filter(|t| t.is_free_at(at)).count(),
        }
    }
}
