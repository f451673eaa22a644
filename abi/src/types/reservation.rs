use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{Error, OccupancyWindow, ReservationId, TableId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: ReservationId,
    pub diner_name: String,
    pub reservation_time: DateTime<Utc>,
    pub table_id: TableId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// A reservation that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub diner_name: String,
    pub reservation_time: DateTime<Utc>,
    pub table_id: TableId,
    pub group_id: Option<String>,
}

/// Look up an existing reservation whose occupancy window intersects the one
/// starting at `start`, optionally narrowed to a table and/or a diner.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(build_fn(error = "crate::Error"))]
pub struct ConflictQuery {
    #[builder(setter(into, strip_option), default)]
    pub table_id: Option<TableId>,
    #[builder(setter(into, strip_option), default)]
    pub diner_name: Option<String>,
    #[builder(setter(into))]
    pub start: DateTime<Utc>,
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(_: derive_builder::UninitializedFieldError) -> Self {
        Error::InvalidInput
    }
}

impl Reservation {
    pub fn window(&self) -> OccupancyWindow {
        OccupancyWindow::starting_at(self.reservation_time)
    }
}

impl NewReservation {
    pub fn new(
        diner_name: impl Into<String>,
        reservation_time: DateTime<Utc>,
        table_id: TableId,
        group_id: Option<String>,
    ) -> Self {
        Self {
            diner_name: diner_name.into(),
            reservation_time,
            table_id,
            group_id,
        }
    }

    pub fn window(&self) -> OccupancyWindow {
        OccupancyWindow::starting_at(self.reservation_time)
    }

    pub fn into_reservation(self, id: ReservationId) -> Reservation {
        Reservation {
            id,
            diner_name: self.diner_name,
            reservation_time: self.reservation_time,
            table_id: self.table_id,
            group_id: self.group_id,
        }
    }
}

impl ConflictQuery {
    pub fn window(&self) -> OccupancyWindow {
        OccupancyWindow::starting_at(self.start)
    }

    /// whether `rsvp` would conflict with a booking described by this query
    pub fn matches(&self, rsvp: &Reservation) -> bool {
        self.table_id.map_or(true, |id| id == rsvp.table_id)
            && self
                .diner_name
                .as_deref()
                .map_or(true, |name| name == rsvp.diner_name)
            && rsvp.window().overlaps(&self.window())
    }
}
