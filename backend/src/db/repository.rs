//! Zone source trait.

use async_trait::async_trait;

use crate::error::ParkingResult;
use crate::models::ZoneRow;

/// Source of raw parking zone rows.
///
/// Rows are returned unparsed and in source order; row numbers reported for malformed
/// records are positions in this list.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so one source can be shared by every run.
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    /// Load every row of the source.
    ///
    /// # Returns
    /// * `Ok(Vec<ZoneRow>)` - All rows, malformed ones included
    /// * `Err(ParkingError)` - If the source cannot be read
    async fn load_rows(&self) -> ParkingResult<Vec<ZoneRow>>;

    /// Check that the source is reachable.
    async fn health_check(&self) -> ParkingResult<bool>;

    /// Short human readable description used in logs.
    fn describe(&self) -> String;
}
