//! The recommendation pipeline.
//!
//! geocode destination → find candidates → enrich and grade (parallel) → select →
//! reverse geocode the winner.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::context::ServiceContext;
use super::enrichment::CandidateEnricher;
use super::reply::Reply;
use super::retry::{with_retry, RetryPolicy};
use super::stats::StatsLookup;
use crate::algorithms::{find_candidates, select, SEARCH_RADIUS_KM};
use crate::db::{load_index, ZoneIndex};
use crate::error::{ParkingError, ParkingResult};
use crate::models::{Candidate, CandidateId, Hour, Location};

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub run_id: Uuid,
    pub destination_address: String,
    pub destination: Location,
    /// Hour of day used for the historical stats
    pub hour: Hour,
    pub best: Candidate,
    /// Reverse geocoded address of the best candidate
    pub best_address: String,
    /// Every evaluated candidate in source order
    pub candidates: Vec<Candidate>,
}

/// Parking recommendation service shared by all front ends.
pub struct ParkingService {
    context: ServiceContext,
    index: RwLock<Arc<ZoneIndex>>,
}

impl ParkingService {
    /// Create the service and build the zone index from the zone source.
    pub async fn new(context: ServiceContext) -> ParkingResult<Self> {
        let index = load_index(context.zones.as_ref(), context.key_precision).await?;
        Ok(Self {
            context,
            index: RwLock::new(Arc::new(index)),
        })
    }

    pub fn context(&self) -> &ServiceContext {
        &self.context
    }

    /// Number of zones in the current index.
    pub fn zone_count(&self) -> usize {
        self.index.read().len()
    }

    /// Whether the zone source is reachable.
    pub async fn health_check(&self) -> ParkingResult<bool> {
        self.context.zones.health_check().await
    }

    /// Recommend the best parking near `address`.
    ///
    /// # Errors
    /// * `AddressNotFound` - The destination cannot be geocoded
    /// * `NoSuitableParkingFound` - No candidate graded above zero
    /// * `NoAddressForLocation` - The winner has no address
    /// * `Cancelled` - `cancel` fired before the run finished
    /// * `Timeout` / `Transport` - Retries of a fatal call were exhausted
    pub async fn recommend(
        &self,
        address: &str,
        cancel: &CancellationToken,
    ) -> ParkingResult<Recommendation> {
        let run_id = Uuid::new_v4();
        let address = address.trim();
        if cancel.is_cancelled() {
            return Err(ParkingError::cancelled("run cancelled before start"));
        }
        if address.is_empty() {
            return Err(ParkingError::address_not_found(address));
        }
        log::info!("[{}] Looking for parking near '{}'", run_id, address);

        let policy = RetryPolicy::from_config(&self.context.pipeline);
        let geocoder = &self.context.geocoder;
        let destination =
            with_retry(&policy, "geocode", cancel, || geocoder.resolve(address)).await?;
        log::debug!("[{}] Destination {} -> {}", run_id, address, destination);

        let index = self.current_index().await?;
        let candidates = find_candidates(&destination, index.records());
        log::info!(
            "[{}] {} of {} zones within {} km",
            run_id,
            candidates.len(),
            index.len(),
            SEARCH_RADIUS_KM
        );
        if candidates.is_empty() {
            return Err(ParkingError::no_suitable_parking(format!(
                "no parking zone within {} km of {}",
                SEARCH_RADIUS_KM, destination
            )));
        }

        self.prepare_availability(run_id, &candidates, cancel).await?;

        let hour = self.context.current_hour();
        let enricher = Arc::new(CandidateEnricher {
            availability: Arc::clone(&self.context.availability),
            reverse_geocoder: Arc::clone(&self.context.reverse_geocoder),
            travel_time: Arc::clone(&self.context.travel_time),
            stats: StatsLookup::new(index),
            call_timeout: self.context.pipeline.call_timeout(),
            workers: self.context.pipeline.workers,
        });
        let evaluated = enricher
            .enrich_all(candidates, address, hour, cancel)
            .await?;

        let best = select(&evaluated)?.clone();
        log::info!("[{}] Best: {} (grade {:.2})", run_id, best, best.grade());

        let reverse_geocoder = &self.context.reverse_geocoder;
        let location = best.location;
        let best_address = with_retry(&policy, "reverse_geocode", cancel, || {
            reverse_geocoder.resolve(location)
        })
        .await?;

        Ok(Recommendation {
            run_id,
            destination_address: address.to_string(),
            destination,
            hour,
            best,
            best_address,
            candidates: evaluated,
        })
    }

    /// Recommend parking near `address` and render the result for a user.
    pub async fn submit(&self, address: &str) -> Reply {
        self.submit_with_cancel(address, &CancellationToken::new())
            .await
    }

    /// [`submit`](Self::submit) that can be cancelled.
    pub async fn submit_with_cancel(&self, address: &str, cancel: &CancellationToken) -> Reply {
        match self.recommend(address, cancel).await {
            Ok(recommendation) => Reply::found(&recommendation.best_address),
            Err(e) => {
                log::warn!("Recommendation for '{}' failed: {}", address.trim(), e);
                Reply::from_error(&e)
            }
        }
    }

    /// Zone index for this run, rebuilt from the source when configured to.
    async fn current_index(&self) -> ParkingResult<Arc<ZoneIndex>> {
        if self.context.reload_zones_each_run {
            let fresh = Arc::new(
                load_index(self.context.zones.as_ref(), self.context.key_precision).await?,
            );
            *self.index.write() = Arc::clone(&fresh);
            return Ok(fresh);
        }
        Ok(Arc::clone(&self.index.read()))
    }

    /// Let the availability service prepare all candidates at once.
    ///
    /// A failure is logged; detection then fails per candidate and degrades it.
    async fn prepare_availability(
        &self,
        run_id: Uuid,
        candidates: &[Candidate],
        cancel: &CancellationToken,
    ) -> ParkingResult<()> {
        let ids: Vec<CandidateId> = candidates.iter().map(|c| c.id.clone()).collect();
        let prepared = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(ParkingError::cancelled("run cancelled during detection")
                    .with_operation("prepare"));
            }
            result = self.context.availability.prepare(&ids) => result,
        };
        if let Err(e) = prepared {
            log::warn!("[{}] Availability preparation failed: {}", run_id, e);
        }
        Ok(())
    }
}
