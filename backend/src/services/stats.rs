//! Historical statistics lookup for a zone.

use std::sync::Arc;

use crate::algorithms::grading::TIME_BUDGET_MINUTES;
use crate::db::ZoneIndex;
use crate::error::{ParkingError, ParkingResult};
use crate::models::{Hour, Location, ZoneStats};

/// Average park time assumed for a zone missing from the index.
///
/// Equal to the grading time budget, so the park-time term contributes nothing.
pub const MISSING_AVG_TIME_TO_PARK: f64 = TIME_BUDGET_MINUTES;

/// Resolves zone statistics from a shared [`ZoneIndex`].
#[derive(Debug, Clone)]
pub struct StatsLookup {
    index: Arc<ZoneIndex>,
}

impl StatsLookup {
    pub fn new(index: Arc<ZoneIndex>) -> Self {
        Self { index }
    }

    /// Statistics of the zone with corner `zone` at hour `now`.
    ///
    /// `searching_by_hour` is `None` when the zone has no entry for `now`.
    ///
    /// # Errors
    /// `StatsNotFound` when no zone has this corner.
    pub fn lookup(&self, zone: &Location, now: Hour) -> ParkingResult<ZoneStats> {
        let record = self
            .index
            .get(zone)
            .ok_or_else(|| ParkingError::stats_not_found(zone))?;

        Ok(ZoneStats {
            avg_time_to_park: record.avg_time_to_park,
            searching_by_hour: record.searching_by_hour.get(now),
        })
    }

    /// Like [`lookup`](Self::lookup), falling back to neutral statistics without hourly
    /// intensity when the zone is unknown.
    pub fn lookup_or_neutral(&self, zone: &Location, now: Hour) -> ZoneStats {
        self.lookup(zone, now).unwrap_or_else(|e| {
            log::warn!("{}; grading without historical stats", e);
            ZoneStats {
                avg_time_to_park: MISSING_AVG_TIME_TO_PARK,
                searching_by_hour: None,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DEFAULT_KEY_PRECISION;
    use crate::models::ZoneRow;

    fn lookup() -> StatsLookup {
        let rows = vec![
            ZoneRow::from_values(51.0536, -114.07, 10.0, r#"{"8": 0.2, "9": 0.5}"#),
            ZoneRow::from_values(51.0572, -114.07, 7.0, ""),
        ];
        StatsLookup::new(Arc::new(ZoneIndex::from_rows(&rows, DEFAULT_KEY_PRECISION)))
    }

    fn hour(h: u8) -> Hour {
        Hour::new(h).unwrap()
    }

    #[test]
    fn test_lookup_with_hourly_entry() {
        let stats = lookup().lookup(&Location::new(51.0536, -114.07), hour(9)).unwrap();
        assert_eq!(stats.avg_time_to_park, 10.0);
        assert_eq!(stats.searching_by_hour, Some(0.5));
    }

    #[test]
    fn test_lookup_without_hourly_entry() {
        let stats = lookup().lookup(&Location::new(51.0536, -114.07), hour(3)).unwrap();
        assert_eq!(stats.searching_by_hour, None);

        let stats = lookup().lookup(&Location::new(51.0572, -114.07), hour(8)).unwrap();
        assert_eq!(stats.avg_time_to_park, 7.0);
        assert_eq!(stats.searching_by_hour, None);
    }

    #[test]
    fn test_unknown_zone() {
        let err = lookup().lookup(&Location::new(0.0, 0.0), hour(8)).unwrap_err();
        assert!(matches!(err, ParkingError::StatsNotFound { .. }));

        let neutral = lookup().lookup_or_neutral(&Location::new(0.0, 0.0), hour(8));
        assert_eq!(neutral.avg_time_to_park, MISSING_AVG_TIME_TO_PARK);
        assert_eq!(neutral.searching_by_hour, None);
    }
}
