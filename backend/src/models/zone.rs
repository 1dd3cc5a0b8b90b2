//! Parking zone records as they come out of the zone source.
//!
//! The source is tabular and untyped: a [`ZoneRow`] holds the raw cell text of the
//! `Latitude_SW`, `Longitude_SW`, `AvgTimeToPark` and `SearchingByHour` columns.
//! [`ZoneRow::parse`] turns it into a typed [`ParkingZoneRecord`] or reports a
//! `MalformedRecord` error for that row.

use serde_json::Value;
use std::collections::BTreeMap;

use super::location::Location;
use super::time::Hour;
use crate::error::{ParkingError, ParkingResult};

pub const COLUMN_LATITUDE_SW: &str = "Latitude_SW";
pub const COLUMN_LONGITUDE_SW: &str = "Longitude_SW";
pub const COLUMN_AVG_TIME_TO_PARK: &str = "AvgTimeToPark";
pub const COLUMN_SEARCHING_BY_HOUR: &str = "SearchingByHour";

/// Historical search intensity per hour of day for one zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchingByHour(BTreeMap<Hour, f64>);

impl SearchingByHour {
    /// Intensity recorded for `hour`, if any.
    pub fn get(&self, hour: Hour) -> Option<f64> {
        self.0.get(&hour).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the string-encoded mapping stored in a `SearchingByHour` cell.
    ///
    /// The cell holds a JSON object keyed by hour (`{"8": 0.25, "17": 0.9}`). Python-style
    /// single-quoted dictionaries are accepted as well. `null` entries are ignored and an
    /// empty cell yields an empty mapping.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let value: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(_) => serde_json::from_str(&trimmed.replace('\'', "\""))
                .map_err(|e| format!("invalid SearchingByHour mapping: {}", e))?,
        };

        let object = value
            .as_object()
            .ok_or_else(|| "SearchingByHour is not a mapping".to_string())?;

        let mut hours = BTreeMap::new();
        for (key, value) in object {
            let hour: Hour = key.parse()?;
            let intensity = match value {
                Value::Null => continue,
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .ok_or_else(|| format!("non-numeric intensity for hour {}", key))?;
            hours.insert(hour, intensity);
        }

        Ok(Self(hours))
    }
}

impl FromIterator<(Hour, f64)> for SearchingByHour {
    fn from_iter<T: IntoIterator<Item = (Hour, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A parking zone with its historical statistics, keyed by its south-west corner.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingZoneRecord {
    pub sw_corner: Location,
    /// Historical average minutes spent finding parking in this zone
    pub avg_time_to_park: f64,
    pub searching_by_hour: SearchingByHour,
}

/// One raw row of the zone source. Cells are `None` when empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneRow {
    pub latitude_sw: Option<String>,
    pub longitude_sw: Option<String>,
    pub avg_time_to_park: Option<String>,
    pub searching_by_hour: Option<String>,
}

impl ZoneRow {
    /// Build a row from already-typed values.
    pub fn from_values(
        latitude: f64,
        longitude: f64,
        avg_time_to_park: f64,
        searching_by_hour: &str,
    ) -> Self {
        Self {
            latitude_sw: Some(latitude.to_string()),
            longitude_sw: Some(longitude.to_string()),
            avg_time_to_park: Some(avg_time_to_park.to_string()),
            searching_by_hour: Some(searching_by_hour.to_string()),
        }
    }

    /// Parse this row into a typed record.
    ///
    /// # Arguments
    /// * `row` - Row number in the source, used for error reporting
    ///
    /// # Returns
    /// * `Ok(ParkingZoneRecord)` when coordinates and average time parse
    /// * `Err(ParkingError::MalformedRecord)` otherwise
    ///
    /// An unparsable `SearchingByHour` cell does not reject the row: it is logged and the
    /// zone keeps an empty hourly mapping.
    pub fn parse(&self, row: usize) -> ParkingResult<ParkingZoneRecord> {
        let latitude = parse_number(self.latitude_sw.as_deref(), COLUMN_LATITUDE_SW, row)?;
        let longitude = parse_number(self.longitude_sw.as_deref(), COLUMN_LONGITUDE_SW, row)?;
        let sw_corner = Location::new(latitude, longitude);
        if !sw_corner.is_valid() {
            return Err(ParkingError::malformed_record(
                row,
                format!("coordinates out of range: {}", sw_corner),
            ));
        }

        let avg_time_to_park =
            parse_number(self.avg_time_to_park.as_deref(), COLUMN_AVG_TIME_TO_PARK, row)?;

        let searching_by_hour = match self.searching_by_hour.as_deref() {
            None => SearchingByHour::default(),
            Some(raw) => SearchingByHour::parse(raw).unwrap_or_else(|e| {
                log::warn!("Zone row {} at {}: {}; hourly stats ignored", row, sw_corner, e);
                SearchingByHour::default()
            }),
        };

        Ok(ParkingZoneRecord {
            sw_corner,
            avg_time_to_park,
            searching_by_hour,
        })
    }
}

/// Parse every row in source order, skipping malformed ones.
///
/// Each skipped row is logged with its row number. Returns the parsed records together
/// with the number of rows that were dropped.
pub fn parse_rows(rows: &[ZoneRow]) -> (Vec<ParkingZoneRecord>, usize) {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for (row_number, row) in rows.iter().enumerate() {
        match row.parse(row_number) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::warn!("Skipping zone row {}: {}", row_number, e);
                skipped += 1;
            }
        }
    }
    (records, skipped)
}

fn parse_number(cell: Option<&str>, column: &str, row: usize) -> ParkingResult<f64> {
    let raw = cell
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParkingError::malformed_record(row, format!("{} is empty", column)))?;
    let value: f64 = raw.parse().map_err(|_| {
        ParkingError::malformed_record(row, format!("{} is not a number: '{}'", column, raw))
    })?;
    if !value.is_finite() {
        return Err(ParkingError::malformed_record(
            row,
            format!("{} is not finite: '{}'", column, raw),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(h: u8) -> Hour {
        Hour::new(h).unwrap()
    }

    #[test]
    fn test_parse_searching_by_hour_json() {
        let parsed = SearchingByHour::parse(r#"{"8": 0.25, "17": 0.9, "3": null}"#).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get(hour(8)), Some(0.25));
        assert_eq!(parsed.get(hour(17)), Some(0.9));
        assert_eq!(parsed.get(hour(3)), None);
    }

    #[test]
    fn test_parse_searching_by_hour_python_dict() {
        let parsed = SearchingByHour::parse("{'0': 0.1, '23': '0.4'}").unwrap();
        assert_eq!(parsed.get(hour(0)), Some(0.1));
        assert_eq!(parsed.get(hour(23)), Some(0.4));
    }

    #[test]
    fn test_parse_searching_by_hour_rejects_garbage() {
        assert!(SearchingByHour::parse("[1, 2]").is_err());
        assert!(SearchingByHour::parse(r#"{"25": 0.1}"#).is_err());
        assert!(SearchingByHour::parse(r#"{"4": "busy"}"#).is_err());
        assert!(SearchingByHour::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_row_parse_ok() {
        let row = ZoneRow::from_values(51.0447, -114.0719, 7.5, r#"{"12": 0.3}"#);
        let record = row.parse(0).unwrap();
        assert_eq!(record.sw_corner, Location::new(51.0447, -114.0719));
        assert_eq!(record.avg_time_to_park, 7.5);
        assert_eq!(record.searching_by_hour.get(hour(12)), Some(0.3));
    }

    #[test]
    fn test_row_parse_bad_coordinates_is_malformed() {
        let row = ZoneRow {
            latitude_sw: Some("north-ish".to_string()),
            longitude_sw: Some("-114.07".to_string()),
            avg_time_to_park: Some("5".to_string()),
            searching_by_hour: None,
        };
        let err = row.parse(3).unwrap_err();
        assert!(matches!(err, ParkingError::MalformedRecord { .. }));
        assert_eq!(err.context().entity_id.as_deref(), Some("3"));
    }

    #[test]
    fn test_row_parse_missing_cell_is_malformed() {
        let row = ZoneRow {
            latitude_sw: Some("51.0".to_string()),
            longitude_sw: None,
            avg_time_to_park: Some("5".to_string()),
            searching_by_hour: None,
        };
        assert!(matches!(
            row.parse(0),
            Err(ParkingError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_row_parse_out_of_range_is_malformed() {
        let row = ZoneRow::from_values(123.0, 10.0, 5.0, "{}");
        assert!(matches!(
            row.parse(0),
            Err(ParkingError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_parse_rows_skips_malformed_and_keeps_order() {
        let rows = vec![
            ZoneRow::from_values(1.0, 1.0, 5.0, "{}"),
            ZoneRow {
                latitude_sw: Some("??".to_string()),
                ..ZoneRow::from_values(0.0, 0.0, 5.0, "{}")
            },
            ZoneRow::from_values(2.0, 2.0, 6.0, "{}"),
        ];
        let (records, skipped) = parse_rows(&rows);
        assert_eq!(skipped, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sw_corner, Location::new(1.0, 1.0));
        assert_eq!(records[1].sw_corner, Location::new(2.0, 2.0));
    }

    #[test]
    fn test_row_parse_bad_hourly_cell_keeps_record() {
        let row = ZoneRow::from_values(51.0, -114.0, 5.0, "not a mapping");
        let record = row.parse(0).unwrap();
        assert!(record.searching_by_hour.is_empty());
    }
}
