//! Best-candidate selection.

use crate::error::{ParkingError, ParkingResult};
use crate::models::Candidate;

/// Pick the candidate with the highest grade.
///
/// Scans in order starting from a best grade of `0` and only replaces the current best on
/// a strictly greater grade, so the first of several equal grades wins and a candidate
/// graded `<= 0` can never be chosen.
///
/// # Errors
/// `NoSuitableParkingFound` when no candidate has a positive grade (including an empty
/// list).
pub fn select(candidates: &[Candidate]) -> ParkingResult<&Candidate> {
    let mut best: Option<&Candidate> = None;
    let mut best_grade = 0.0;

    for candidate in candidates {
        if candidate.grade() > best_grade {
            best_grade = candidate.grade();
            best = Some(candidate);
        }
    }

    best.ok_or_else(|| {
        ParkingError::no_suitable_parking(format!(
            "none of {} candidates has a positive grade",
            candidates.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn graded(lat: f64, slots: u32, grade: f64) -> Candidate {
        Candidate::assessed(Location::new(lat, 0.0), slots, grade)
    }

    #[test]
    fn test_select_highest() {
        let list = vec![graded(1.0, 3, 12.3), graded(2.0, 5, 15.8), graded(3.0, 1, 4.0)];
        let best = select(&list).unwrap();
        assert_eq!(best.location, Location::new(2.0, 0.0));
    }

    #[test]
    fn test_tie_keeps_first() {
        let list = vec![graded(1.0, 5, 15.8), graded(2.0, 5, 15.8)];
        let best = select(&list).unwrap();
        assert_eq!(best.location, Location::new(1.0, 0.0));
    }

    #[test]
    fn test_all_zero_is_error() {
        let list = vec![graded(1.0, 0, 0.0), graded(2.0, 0, 0.0)];
        let err = select(&list).unwrap_err();
        assert!(matches!(err, ParkingError::NoSuitableParkingFound { .. }));
    }

    #[test]
    fn test_negative_grades_are_never_selected() {
        let list = vec![graded(1.0, 1, -3.0), graded(2.0, 2, -0.5)];
        assert!(select(&list).is_err());
    }

    #[test]
    fn test_empty_is_error() {
        assert!(matches!(
            select(&[]),
            Err(ParkingError::NoSuitableParkingFound { .. })
        ));
    }
}
