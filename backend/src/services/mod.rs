//! Service layer: the recommendation pipeline and what it is built from.
//!
//! - `pipeline`: [`ParkingService`], the single entry point used by every front end
//! - `context`: explicit wiring of collaborators ([`ServiceContextBuilder`], [`ServiceFactory`])
//! - `enrichment`: bounded, cancellable parallel assessment of candidates
//! - `stats`: historical statistics lookup
//! - `retry`: per-call timeouts and retry with backoff
//! - `reply`: user-facing text

pub mod context;
pub mod enrichment;
pub mod pipeline;
pub mod reply;
pub mod retry;
pub mod stats;

pub use context::{ServiceContext, ServiceContextBuilder, ServiceFactory};
pub use enrichment::CandidateEnricher;
pub use pipeline::{ParkingService, Recommendation};
pub use reply::{Outcome, Reply};
pub use retry::{call_with_timeout, with_retry, RetryPolicy};
pub use stats::{StatsLookup, MISSING_AVG_TIME_TO_PARK};
