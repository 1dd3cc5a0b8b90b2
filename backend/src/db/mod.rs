//! Parking zone storage.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Pipeline (candidate search, stats lookup)              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  ZoneIndex (index.rs) - parsed zones keyed by corner     │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  ZoneRepository trait (repository.rs) - raw rows         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │  CSV file   │   In-memory     │
//!     └──────────────────────────────┘
//! ```

pub mod factory;
pub mod index;
pub mod repositories;
pub mod repository;

pub use factory::{load_index, ZoneRepositoryBuilder, ZoneRepositoryFactory, ZoneSourceType};
pub use index::{ZoneIndex, DEFAULT_KEY_PRECISION, KEY_PRECISION_RANGE};
#[cfg(feature = "csv-zones")]
pub use repositories::CsvZoneRepository;
pub use repositories::LocalZoneRepository;
pub use repository::ZoneRepository;
