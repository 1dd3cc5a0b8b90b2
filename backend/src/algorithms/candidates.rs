//! Distance filtering of known parking zones around a destination.

use super::geo::distance_km;
use crate::models::{parse_rows, Candidate, Location, ParkingZoneRecord, ZoneRow};

/// Zones must lie strictly closer than this to the destination.
pub const SEARCH_RADIUS_KM: f64 = 1.0;

/// Candidates for every zone whose south-west corner is strictly within
/// [`SEARCH_RADIUS_KM`] of `destination`.
///
/// Source order is preserved; the selector relies on it for tie-breaking.
/// Every returned candidate is unassessed (no slots, zero grade).
pub fn find_candidates<'a, I>(destination: &Location, zones: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = &'a ParkingZoneRecord>,
{
    zones
        .into_iter()
        .filter(|zone| distance_km(destination, &zone.sw_corner) < SEARCH_RADIUS_KM)
        .map(|zone| Candidate::new(zone.sw_corner))
        .collect()
}

/// Same as [`find_candidates`] over raw source rows.
///
/// Malformed rows are logged with their row number and skipped.
pub fn find_candidates_in_rows(destination: &Location, rows: &[ZoneRow]) -> Vec<Candidate> {
    let (records, _skipped) = parse_rows(rows);
    find_candidates(destination, &records)
}
