use abi::{Error, RestaurantAvailability, SearchQuery};
use tracing::debug;

use crate::Rsvp;

/// Restaurants covering every requested endorsement with at least one table
/// that has no reservation starting exactly at the requested time.
pub async fn search_restaurants<S>(
  store: &S,
  query: SearchQuery,
) -> Result<Vec<RestaurantAvailability>, Error>
where
  S: Rsvp + ?Sized,
{
  let listings = store.find_restaurants(&query.endorsements, query.time).await?;
  let candidates = listings.len();
  let found: Vec<_> = listings
    .iter()
    .map(|listing| listing.available_at(query.time))
    .filter(|r| r.available_tables > 0)
    .collect();
  debug!(
    endorsements = ?query.endorsements,
    candidates,
    found = found.len(),
    "restaurant search"
  );
  Ok(found)
}
