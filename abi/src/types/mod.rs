mod request;
mod reservation;
mod restaurant;

pub use request::*;
pub use reservation::*;
pub use restaurant::*;
