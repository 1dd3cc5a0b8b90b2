//! In-memory index of parsed parking zones.
//!
//! Built once from the zone source and shared, read-only, by candidate search and stats
//! lookup. Zones are found by their south-west corner, rounded to a fixed number of
//! decimal places so that a coordinate that went through text formatting and back still
//! matches.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::models::{parse_rows, Location, ParkingZoneRecord, ZoneRow};

/// Decimal places used for coordinate keys unless configured otherwise.
pub const DEFAULT_KEY_PRECISION: u32 = 6;

/// Precisions that keep distinct corners apart without overflowing an `i64` key.
pub const KEY_PRECISION_RANGE: RangeInclusive<u32> = 1..=9;

type CoordinateKey = (i64, i64);

/// Parsed zones in source order plus a coordinate lookup table.
#[derive(Debug, Clone)]
pub struct ZoneIndex {
    records: Vec<ParkingZoneRecord>,
    by_corner: HashMap<CoordinateKey, usize>,
    precision: u32,
    skipped: usize,
}

impl ZoneIndex {
    /// Parse `rows` and index the valid ones. Malformed rows are logged and dropped.
    pub fn from_rows(rows: &[ZoneRow], precision: u32) -> Self {
        let (records, skipped) = parse_rows(rows);
        if skipped > 0 {
            log::warn!("{} of {} zone rows were malformed and skipped", skipped, rows.len());
        }
        let mut index = Self::from_records(records, precision);
        index.skipped = skipped;
        index
    }

    /// Index already parsed records.
    ///
    /// When two records share a corner the first one is kept for lookups; both still
    /// take part in candidate search.
    pub fn from_records(records: Vec<ParkingZoneRecord>, precision: u32) -> Self {
        let mut by_corner = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let key = coordinate_key(&record.sw_corner, precision);
            if by_corner.contains_key(&key) {
                log::debug!("Duplicate zone corner {}; keeping first", record.sw_corner);
                continue;
            }
            by_corner.insert(key, position);
        }

        Self {
            records,
            by_corner,
            precision,
            skipped: 0,
        }
    }

    /// All zones in source order.
    pub fn records(&self) -> &[ParkingZoneRecord] {
        &self.records
    }

    /// The zone whose corner matches `corner` at the index precision.
    pub fn get(&self, corner: &Location) -> Option<&ParkingZoneRecord> {
        self.by_corner
            .get(&coordinate_key(corner, self.precision))
            .map(|&position| &self.records[position])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of malformed rows dropped while building.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }
}

impl Default for ZoneIndex {
    fn default() -> Self {
        Self::from_records(Vec::new(), DEFAULT_KEY_PRECISION)
    }
}

fn coordinate_key(location: &Location, precision: u32) -> CoordinateKey {
    let scale = 10f64.powi(precision as i32);
    (
        (location.latitude() * scale).round() as i64,
        (location.longitude() * scale).round() as i64,
    )
}
