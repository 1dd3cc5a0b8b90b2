//! Parallel per-candidate enrichment and grading.
//!
//! Every candidate is assessed on its own task, at most `workers` at a time. Tasks own
//! their inputs and share nothing mutable; results are written back by original position
//! so completion order never affects selection. A candidate whose assessment fails, times
//! out or panics keeps zero slots and a zero grade.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::retry::call_with_timeout;
use super::stats::StatsLookup;
use crate::adapters::{AvailabilityService, ReverseGeocodingService, TravelTimeService};
use crate::error::{ParkingError, ParkingResult};
use crate::models::{Candidate, GradeInputs, Hour};

/// Collaborators and limits for one run's enrichment.
#[derive(Clone)]
pub struct CandidateEnricher {
    pub availability: Arc<dyn AvailabilityService>,
    pub reverse_geocoder: Arc<dyn ReverseGeocodingService>,
    pub travel_time: Arc<dyn TravelTimeService>,
    pub stats: StatsLookup,
    pub call_timeout: Duration,
    pub workers: usize,
}

impl CandidateEnricher {
    /// Assess one candidate.
    ///
    /// Slots are detected first; a zone with no free slot is graded zero without any
    /// further call. Otherwise stats are looked up, the zone is reverse geocoded and the
    /// travel time from `destination_address` to it is estimated before grading.
    pub async fn assess(
        &self,
        mut candidate: Candidate,
        destination_address: &str,
        hour: Hour,
    ) -> Candidate {
        match self.grade_inputs(&candidate, destination_address, hour).await {
            Ok(inputs) => {
                candidate.record_assessment(&inputs);
                log::debug!(
                    "Candidate {}: {} slots, grade {:.2}",
                    candidate.id,
                    candidate.available_slots(),
                    candidate.grade()
                );
            }
            Err(e) => {
                log::warn!("Candidate {} degraded: {}", candidate.id, e);
                candidate.record_unavailable();
            }
        }
        candidate
    }

    async fn grade_inputs(
        &self,
        candidate: &Candidate,
        destination_address: &str,
        hour: Hour,
    ) -> ParkingResult<GradeInputs> {
        let available_slots = call_with_timeout(
            self.call_timeout,
            "detect",
            self.availability.detect(&candidate.id),
        )
        .await?;
        if available_slots == 0 {
            return Ok(GradeInputs::unavailable());
        }

        let stats = self.stats.lookup_or_neutral(&candidate.location, hour);

        let address = call_with_timeout(
            self.call_timeout,
            "reverse_geocode",
            self.reverse_geocoder.resolve(candidate.location),
        )
        .await?;

        let travel_time_minutes = call_with_timeout(
            self.call_timeout,
            "travel_time",
            self.travel_time.estimate(destination_address, &address),
        )
        .await?;

        Ok(GradeInputs {
            available_slots,
            avg_time_to_park: stats.avg_time_to_park,
            searching_by_hour: stats.searching_by_hour,
            travel_time_minutes,
        })
    }

    /// Assess every candidate in parallel and return them in their original order.
    ///
    /// # Errors
    /// `Cancelled` when `cancel` fires; every in-flight task is aborted and no partial
    /// result is returned.
    pub async fn enrich_all(
        self: &Arc<Self>,
        candidates: Vec<Candidate>,
        destination_address: &str,
        hour: Hour,
        cancel: &CancellationToken,
    ) -> ParkingResult<Vec<Candidate>> {
        let semaphore = Arc::new(Semaphore::new(self.workers.max(1)));
        let destination: Arc<str> = Arc::from(destination_address);
        let mut tasks = JoinSet::new();

        for (position, candidate) in candidates.iter().cloned().enumerate() {
            let enricher = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let destination = Arc::clone(&destination);
            tasks.spawn(async move {
                // Never closed, so acquiring only waits for a free worker.
                let _permit = semaphore.acquire_owned().await.ok();
                let assessed = enricher.assess(candidate, &destination, hour).await;
                (position, assessed)
            });
        }

        // Unfinished slots keep the unassessed candidate: zero slots, zero grade.
        let mut results = candidates;
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(ParkingError::cancelled("run cancelled during enrichment")
                        .with_operation("enrich"));
                }
                joined = tasks.join_next() => joined,
            };

            match joined {
                None => break,
                Some(Ok((position, candidate))) => results[position] = candidate,
                Some(Err(e)) => log::warn!("Enrichment task failed: {}", e),
            }
        }

        Ok(results)
    }
}
