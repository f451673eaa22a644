use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    parse_timestamp, required_endorsements, Error, NewReservation, ReservationId, TableId,
    Validator,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    #[serde(default)]
    pub diner_name: Option<String>,
    #[serde(default)]
    pub reservation_time: Option<String>,
    #[serde(default)]
    pub table_id: Option<TableId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReserveRequest {
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub reservation_time: Option<String>,
    #[serde(default)]
    pub table_id: Option<TableId>,
    #[serde(default)]
    pub diners: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eater {
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub eaters: Option<Vec<Eater>>,
    #[serde(default)]
    pub time: Option<String>,
}

/// A validated group booking: every diner shares table, time and group id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBooking {
    pub group_id: String,
    pub reservation_time: DateTime<Utc>,
    pub table_id: TableId,
    pub diners: Vec<String>,
}

/// A validated restaurant search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub endorsements: Vec<String>,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReservation {
    pub reservation_id: ReservationId,
    pub group_id: String,
    pub diners: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    pub fn cancelled() -> Self {
        Self {
            message: "Your reservation has been cancelled".to_string(),
        }
    }
}

/// present and not the empty string
fn required(s: Option<String>) -> Result<String, Error> {
    s.filter(|s| !s.is_empty()).ok_or(Error::InvalidInput)
}

/// present and non-zero; other ids are left to the table lookup
fn required_id(id: Option<TableId>) -> Result<TableId, Error> {
    id.filter(|id| *id != 0).ok_or(Error::InvalidInput)
}

impl Validator for ReserveRequest {
    type Output = NewReservation;

    fn validate(self) -> Result<NewReservation, Error> {
        let diner_name = required(self.diner_name)?;
        let time = required(self.reservation_time)?;
        let table_id = required_id(self.table_id)?;
        let reservation_time = parse_timestamp(&time)?;
        Ok(NewReservation::new(diner_name, reservation_time, table_id, None))
    }
}

impl Validator for GroupReserveRequest {
    type Output = GroupBooking;

    fn validate(self) -> Result<GroupBooking, Error> {
        let group_id = required(self.group_name)?;
        let time = required(self.reservation_time)?;
        let table_id = required_id(self.table_id)?;
        let diners = self
            .diners
            .filter(|d| !d.is_empty())
            .ok_or(Error::InvalidInput)?;
        if diners.iter().any(|d| d.is_empty()) {
            return Err(Error::InvalidInput);
        }
        Ok(GroupBooking {
            group_id,
            reservation_time: parse_timestamp(&time)?,
            table_id,
            diners,
        })
    }
}

impl Validator for SearchRequest {
    type Output = SearchQuery;

    fn validate(self) -> Result<SearchQuery, Error> {
        let time = self
            .time
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingTime)?;
        let eaters = self
            .eaters
            .filter(|e| !e.is_empty())
            .ok_or(Error::NoEaters)?;
        Ok(SearchQuery {
            endorsements: required_endorsements(eaters.iter().map(|e| &e.dietary_restrictions)),
            time: parse_timestamp(&time)?,
        })
    }
}

impl GroupBooking {
    pub fn reservations(&self) -> Vec<NewReservation> {
        self.diners
            .iter()
            .map(|diner| {
                NewReservation::new(
                    diner.clone(),
                    self.reservation_time,
                    self.table_id,
                    Some(self.group_id.clone()),
                )
            })
            .collect()
    }
}
