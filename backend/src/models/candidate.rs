use serde::{Deserialize, Serialize};
use std::fmt;

use super::location::Location;
use crate::algorithms::grading;

/// Stable identifier of a candidate zone, `"{lat},{lng}"` of its south-west corner.
///
/// The detection step names each zone's image and label file after this identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(String);

impl CandidateId {
    /// Derive the identifier from a zone corner.
    pub fn from_location(location: &Location) -> Self {
        CandidateId(format!("{},{}", location.latitude(), location.longitude()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CandidateId {
    fn from(value: String) -> Self {
        CandidateId(value)
    }
}

impl From<&str> for CandidateId {
    fn from(value: &str) -> Self {
        CandidateId(value.to_string())
    }
}

/// Historical statistics of a zone at a given hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneStats {
    pub avg_time_to_park: f64,
    /// `None` when the zone has no entry for the requested hour
    pub searching_by_hour: Option<f64>,
}

/// Everything the grader needs for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeInputs {
    pub available_slots: u32,
    pub avg_time_to_park: f64,
    pub searching_by_hour: Option<f64>,
    pub travel_time_minutes: f64,
}

impl GradeInputs {
    /// Inputs for a candidate whose availability could not be established.
    pub fn unavailable() -> Self {
        Self {
            available_slots: 0,
            avg_time_to_park: 0.0,
            searching_by_hour: None,
            travel_time_minutes: 0.0,
        }
    }
}

/// A zone inside the search radius during one pipeline run.
///
/// Created with no slots and a zero grade. [`Candidate::record_assessment`] is the only
/// way to change either, so a grade always corresponds to populated slots and
/// `available_slots == 0` always means `grade == 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub location: Location,
    available_slots: u32,
    grade: f64,
}

impl Candidate {
    /// New, not yet assessed candidate for a zone corner.
    pub fn new(location: Location) -> Self {
        Self {
            id: CandidateId::from_location(&location),
            location,
            available_slots: 0,
            grade: 0.0,
        }
    }

    /// Candidate restored from an earlier assessment.
    ///
    /// A zero slot count forces the grade to zero.
    pub fn assessed(location: Location, available_slots: u32, grade: f64) -> Self {
        Self {
            id: CandidateId::from_location(&location),
            location,
            available_slots,
            grade: if available_slots == 0 { 0.0 } else { grade },
        }
    }

    pub fn available_slots(&self) -> u32 {
        self.available_slots
    }

    pub fn grade(&self) -> f64 {
        self.grade
    }

    /// Store the detected slots and the grade computed from `inputs`.
    pub fn record_assessment(&mut self, inputs: &GradeInputs) {
        self.available_slots = inputs.available_slots;
        self.grade = grading::grade(inputs);
    }

    /// Mark the candidate as unusable for this run (no slots, grade zero).
    pub fn record_unavailable(&mut self) {
        self.record_assessment(&GradeInputs::unavailable());
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}, Location: {} - {} available slots",
            self.id, self.location, self.available_slots
        )
    }
}
