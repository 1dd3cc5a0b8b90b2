//! In-memory zone source.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::db::repository::ZoneRepository;
use crate::error::ParkingResult;
use crate::models::ZoneRow;

/// Zone rows held in memory.
///
/// Rows can be replaced while the service runs; each `load_rows` returns a snapshot.
#[derive(Debug, Default)]
pub struct LocalZoneRepository {
    rows: RwLock<Vec<ZoneRow>>,
}

impl LocalZoneRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<ZoneRow>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Append a row at the end of the source.
    pub fn push_row(&self, row: ZoneRow) {
        self.rows.write().push(row);
    }

    /// Replace every row.
    pub fn replace_rows(&self, rows: Vec<ZoneRow>) {
        *self.rows.write() = rows;
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl ZoneRepository for LocalZoneRepository {
    async fn load_rows(&self) -> ParkingResult<Vec<ZoneRow>> {
        Ok(self.rows.read().clone())
    }

    async fn health_check(&self) -> ParkingResult<bool> {
        Ok(true)
    }

    fn describe(&self) -> String {
        format!("in-memory zones ({} rows)", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rows_round_trip_in_order() {
        let repo = LocalZoneRepository::with_rows(vec![
            ZoneRow::from_values(1.0, 2.0, 10.0, "{}"),
            ZoneRow::from_values(3.0, 4.0, 12.0, "{}"),
        ]);
        repo.push_row(ZoneRow::from_values(5.0, 6.0, 8.0, ""));

        let rows = repo.load_rows().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].latitude_sw.as_deref(), Some("1"));
        assert_eq!(rows[2].latitude_sw.as_deref(), Some("5"));
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_rows() {
        let repo = LocalZoneRepository::new();
        assert!(repo.is_empty());
        repo.replace_rows(vec![ZoneRow::default()]);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.describe(), "in-memory zones (1 rows)");
    }
}
