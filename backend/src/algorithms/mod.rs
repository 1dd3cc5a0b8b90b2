//! Pure recommendation algorithms: distance, candidate filtering, grading and selection.

pub mod candidates;
pub mod geo;
pub mod grading;
pub mod selection;

pub use candidates::{find_candidates, find_candidates_in_rows, SEARCH_RADIUS_KM};
pub use geo::distance_km;
pub use grading::grade;
pub use selection::select;
