use sqlx::postgres::PgDatabaseError;
use thiserror::Error;

pub const TABLE_WINDOW_CONSTRAINT: &str = "reservations_table_window_excl";
pub const DINER_WINDOW_CONSTRAINT: &str = "reservations_diner_window_excl";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data")]
    InvalidInput,

    #[error("Please specify a time")]
    MissingTime,

    #[error("Eaters are required")]
    NoEaters,

    #[error("Table not found")]
    TableNotFound,

    #[error("Reservation not found")]
    ReservationNotFound,

    #[error("Table is already reserved at this time")]
    TableAlreadyReserved,

    #[error("{}", diner_overlap_message(.0))]
    DinerOverlap(Option<String>),

    #[error("Database error")]
    DbError(sqlx::Error),

    #[error("Failed to read configuration file")]
    ConfigRead,

    #[error("Failed to parse configuration file")]
    ConfigParse,
}

fn diner_overlap_message(diner: &Option<String>) -> String {
    match diner {
        Some(name) => format!("User {name} has overlapping reservations"),
        None => "User has overlapping reservations".to_string(),
    }
}

impl Error {
    /// errors caused by the store or the environment rather than by the request
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::DbError(_) | Error::ConfigRead | Error::ConfigParse)
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::DinerOverlap(a), Self::DinerOverlap(b)) => a == b,
            (Self::DbError(_), Self::DbError(_)) => true,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(e) => {
                let err: &PgDatabaseError = e.downcast_ref();
                match (err.code(), err.constraint()) {
                    ("23P01", Some(TABLE_WINDOW_CONSTRAINT)) => Error::TableAlreadyReserved,
                    ("23P01", Some(DINER_WINDOW_CONSTRAINT)) => Error::DinerOverlap(None),
                    _ => Error::DbError(sqlx::Error::Database(e)),
                }
            }
            _ => Error::DbError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_should_match_api_contract() {
        assert_eq!(Error::InvalidInput.to_string(), "Invalid data");
        assert_eq!(
            Error::TableAlreadyReserved.to_string(),
            "Table is already reserved at this time"
        );
        assert_eq!(
            Error::DinerOverlap(None).to_string(),
            "User has overlapping reservations"
        );
        assert_eq!(
            Error::DinerOverlap(Some("Bob".into())).to_string(),
            "User Bob has overlapping reservations"
        );
        assert_eq!(Error::ReservationNotFound.to_string(), "Reservation not found");
    }

    #[test]
    fn diner_overlap_should_compare_names() {
        assert_eq!(
            Error::DinerOverlap(Some("a".into())),
            Error::DinerOverlap(Some("a".into()))
        );
        assert_ne!(
            Error::DinerOverlap(Some("a".into())),
            Error::DinerOverlap(Some("b".into()))
        );
        assert_ne!(Error::TableNotFound, Error::ReservationNotFound);
    }

    #[test]
    fn non_database_sqlx_error_should_be_internal() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(err, Error::DbError(sqlx::Error::PoolClosed));
        assert!(err.is_internal());
        assert!(!Error::NoEaters.is_internal());
    }
}
