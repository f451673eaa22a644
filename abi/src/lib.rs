mod config;
mod error;
mod types;
mod utils;

pub use config::*;
pub use error::Error;
pub use types::*;
pub use utils::*;

pub type RestaurantId = i32;
pub type TableId = i32;
pub type ReservationId = i32;

/// validate the data structure, raise error if invalid
pub trait Validator {
    type Output;

    fn validate(self) -> Result<Self::Output, Error>;
}
