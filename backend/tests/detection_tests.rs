//! Detection-backed availability: label files and the detector command.

use std::path::Path;

use parkwise::adapters::{AvailabilityService, DetectionAvailability};
use parkwise::config::DetectionConfig;
use parkwise::error::ParkingError;
use parkwise::models::{CandidateId, Location};

fn config(labels_dir: &Path) -> DetectionConfig {
    DetectionConfig {
        labels_dir: labels_dir.to_path_buf(),
        ..DetectionConfig::default()
    }
}

#[tokio::test]
async fn test_detect_counts_empty_slot_lines() {
    let dir = tempfile::tempdir().unwrap();
    let id = CandidateId::from_location(&Location::new(51.0536, -114.07));
    std::fs::write(
        dir.path().join(format!("{}.txt", id)),
        "0 0.51 0.42 0.10 0.08\n1 0.20 0.30 0.10 0.08\n0 0.71 0.44 0.09 0.08\n\n",
    )
    .unwrap();

    let availability = DetectionAvailability::new(config(dir.path()));
    availability.prepare(&[id.clone()]).await.unwrap();
    assert_eq!(availability.detect(&id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_missing_label_file_is_detection_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let availability = DetectionAvailability::new(config(dir.path()));

    let err = availability
        .detect(&CandidateId::from("1,1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ParkingError::DetectionUnavailable { .. }));
}

#[tokio::test]
async fn test_custom_empty_slot_class() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("z.txt"), "3 0.1 0.1 0.1 0.1\n0 0.2 0.2 0.2 0.2\n").unwrap();

    let availability = DetectionAvailability::new(DetectionConfig {
        empty_slot_class: "3".to_string(),
        ..config(dir.path())
    });
    assert_eq!(availability.detect(&CandidateId::from("z")).await.unwrap(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_prepare_cleans_labels_and_runs_detector() {
    let dir = tempfile::tempdir().unwrap();
    let labels = dir.path().join("labels");
    std::fs::create_dir_all(&labels).unwrap();
    std::fs::write(labels.join("stale.txt"), "0 0 0 0 0\n").unwrap();

    let script = format!(
        "printf '0 0.1 0.1 0.1 0.1\\n0 0.2 0.2 0.2 0.2\\n' > '{}/zone.txt'",
        labels.display()
    );
    let availability = DetectionAvailability::new(DetectionConfig {
        command: vec!["sh".to_string(), "-c".to_string(), script],
        ..config(&labels)
    });

    availability
        .prepare(&[CandidateId::from("zone")])
        .await
        .unwrap();

    assert!(!labels.join("stale.txt").exists());
    assert_eq!(availability.detect(&CandidateId::from("zone")).await.unwrap(), 2);
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_detector_command() {
    let dir = tempfile::tempdir().unwrap();
    let availability = DetectionAvailability::new(DetectionConfig {
        command: vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo 'model not found' >&2; exit 3".to_string(),
        ],
        ..config(dir.path())
    });

    let err = availability.prepare(&[]).await.unwrap_err();
    assert!(matches!(err, ParkingError::Internal { .. }));
    assert!(err.to_string().contains("model not found"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_detector_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let availability = DetectionAvailability::new(DetectionConfig {
        command: vec!["sleep".to_string(), "5".to_string()],
        command_timeout_sec: 1,
        ..config(dir.path())
    });

    let err = availability.prepare(&[]).await.unwrap_err();
    assert!(matches!(err, ParkingError::Timeout { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unknown_detector_program() {
    let dir = tempfile::tempdir().unwrap();
    let availability = DetectionAvailability::new(DetectionConfig {
        command: vec!["parkwise-no-such-detector".to_string()],
        ..config(dir.path())
    });

    let err = availability.prepare(&[]).await.unwrap_err();
    assert!(matches!(err, ParkingError::Configuration { .. }));
}
