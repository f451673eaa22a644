use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::collections::BTreeSet;

use crate::Error;

/// Length of the occupancy window, in hours, applied to every reservation.
pub const OCCUPANCY_HOURS: i64 = 2;

pub fn occupancy() -> Duration {
    Duration::hours(OCCUPANCY_HOURS)
}

/// Half-open occupancy window `[start, end)` of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl OccupancyWindow {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: start + occupancy(),
        }
    }

    /// touching windows do not overlap
    pub fn overlaps(&self, other: &OccupancyWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Parse a client supplied timestamp. RFC 3339 is preferred, a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` is taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, Error> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::InvalidInput)
}

/// Union of every eater's restrictions, deduplicated and sorted.
pub fn required_endorsements<'a, I, T>(restrictions: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a T>,
    T: AsRef<[String]> + 'a,
{
    restrictions
        .into_iter()
        .flat_map(|tags| tags.as_ref().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// whether `endorsements` is a superset of `required`
pub fn covers(endorsements: &[String], required: &[String]) -> bool {
    required.iter().all(|tag| endorsements.contains(tag))
}
