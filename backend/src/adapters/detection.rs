//! Slot counts from an object-detection run over zone images.
//!
//! The detector writes one label file per image, `<candidate id>.txt`, with one detected
//! object per line and the object class as the first token. Lines whose class is the
//! configured empty-slot class are counted as available slots.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::AvailabilityService;
use crate::config::DetectionConfig;
use crate::error::{ErrorContext, ParkingError, ParkingResult};
use crate::models::CandidateId;

/// Availability read from detection label files, optionally after running the detector.
#[derive(Debug, Clone)]
pub struct DetectionAvailability {
    config: DetectionConfig,
}

impl DetectionAvailability {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn labels_dir(&self) -> &Path {
        &self.config.labels_dir
    }

    fn label_path(&self, candidate: &CandidateId) -> PathBuf {
        self.config
            .labels_dir
            .join(format!("{}.txt", candidate.as_str()))
    }

    /// Delete every file in the labels directory.
    ///
    /// Files that cannot be removed are logged and left behind.
    async fn clean_labels(&self) -> ParkingResult<usize> {
        let dir = &self.config.labels_dir;
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(ParkingError::from(e).with_operation("clean_labels")),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Failed to delete label file {}: {}", path.display(), e),
            }
        }
        Ok(removed)
    }

    async fn run_detector(&self) -> ParkingResult<()> {
        let Some((program, args)) = self.config.command.split_first() else {
            return Ok(());
        };
        let context = || {
            ErrorContext::new("run_detector")
                .with_entity("command")
                .with_entity_id(program)
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|e| {
            ParkingError::configuration_with_context(
                format!("Failed to start detector: {}", e),
                context(),
            )
        })?;

        let output = tokio::time::timeout(self.config.command_timeout(), child.wait_with_output())
            .await
            .map_err(|_| {
                ParkingError::timeout(format!(
                    "detector did not finish within {}s",
                    self.config.command_timeout_sec
                ))
                .with_operation("run_detector")
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ParkingError::internal_with_context(
                format!("detector exited with {}", output.status),
                context().with_details(stderr.trim().to_string()),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AvailabilityService for DetectionAvailability {
    async fn prepare(&self, candidates: &[CandidateId]) -> ParkingResult<()> {
        if self.config.command.is_empty() {
            log::debug!("No detector command configured; reading existing labels");
            return Ok(());
        }

        if self.config.clean_labels {
            let removed = self.clean_labels().await?;
            log::debug!("Removed {} stale label files", removed);
        }

        log::info!("Running detector for {} candidates", candidates.len());
        self.run_detector().await
    }

    async fn detect(&self, candidate: &CandidateId) -> ParkingResult<u32> {
        let path = self.label_path(candidate);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ParkingError::detection_unavailable(
                candidate,
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;
        Ok(count_empty_slots(&content, &self.config.empty_slot_class))
    }
}

/// Number of label lines whose class token equals `empty_class`.
pub fn count_empty_slots(labels: &str, empty_class: &str) -> u32 {
    labels
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|class| *class == empty_class)
        .count() as u32
}
