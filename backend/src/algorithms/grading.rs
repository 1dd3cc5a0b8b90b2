//! Candidate suitability score.
//!
//! More open slots and a shorter trip raise the grade; a long historical search time and
//! heavy competition at the current hour lower it. The weights are fixed design constants.
//! Nothing is clamped, so far or slow candidates can grade below zero.

use crate::models::GradeInputs;

/// Reference time budget in minutes the time-based terms are measured against.
pub const TIME_BUDGET_MINUTES: f64 = 60.0;

/// Weights used when hourly search intensity is known for the zone.
pub mod with_hourly_stats {
    pub const SLOT_WEIGHT: f64 = 0.6;
    pub const PARK_TIME_WEIGHT: f64 = 0.1;
    pub const SEARCHING_WEIGHT: f64 = 6.0;
    pub const TRAVEL_WEIGHT: f64 = 0.2;
}

/// Weights used when the zone has no search intensity for the hour.
pub mod without_hourly_stats {
    pub const SLOT_WEIGHT: f64 = 0.65;
    pub const PARK_TIME_WEIGHT: f64 = 0.1;
    pub const TRAVEL_WEIGHT: f64 = 0.25;
}

/// Grade a candidate.
///
/// Returns `0` as soon as `available_slots` is zero, without looking at any other input.
pub fn grade(inputs: &GradeInputs) -> f64 {
    if inputs.available_slots == 0 {
        return 0.0;
    }

    let slots = f64::from(inputs.available_slots);
    let park_time_slack = TIME_BUDGET_MINUTES - inputs.avg_time_to_park;
    let travel_slack = TIME_BUDGET_MINUTES - inputs.travel_time_minutes;

    match inputs.searching_by_hour {
        Some(searching) => {
            use with_hourly_stats::*;
            slots * SLOT_WEIGHT + park_time_slack * PARK_TIME_WEIGHT - searching * SEARCHING_WEIGHT
                + travel_slack * TRAVEL_WEIGHT
        }
        None => {
            use without_hourly_stats::*;
            slots * SLOT_WEIGHT + park_time_slack * PARK_TIME_WEIGHT + travel_slack * TRAVEL_WEIGHT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(slots: u32, avg: f64, searching: Option<f64>, travel: f64) -> GradeInputs {
        GradeInputs {
            available_slots: slots,
            avg_time_to_park: avg,
            searching_by_hour: searching,
            travel_time_minutes: travel,
        }
    }

    #[test]
    fn test_grade_with_hourly_stats() {
        // 5*0.6 + 50*0.1 - 0.2*6 + 45*0.2 = 3 + 5 - 1.2 + 9
        let g = grade(&inputs(5, 10.0, Some(0.2), 15.0));
        assert!((g - 15.8).abs() < 1e-9, "got {}", g);
    }

    #[test]
    fn test_grade_without_hourly_stats() {
        // 5*0.65 + 50*0.1 + 45*0.25 = 3.25 + 5 + 11.25
        let g = grade(&inputs(5, 10.0, None, 15.0));
        assert!((g - 19.5).abs() < 1e-9, "got {}", g);
    }

    #[test]
    fn test_zero_slots_short_circuits() {
        assert_eq!(grade(&inputs(0, 10.0, Some(0.2), 15.0)), 0.0);
        assert_eq!(grade(&inputs(0, -1e9, None, -1e9)), 0.0);
        assert_eq!(grade(&inputs(0, f64::NAN, Some(f64::INFINITY), f64::NAN)), 0.0);
    }

    #[test]
    fn test_negative_grades_are_not_clamped() {
        // 1*0.65 + (60-90)*0.1 + (60-120)*0.25 = 0.65 - 3 - 15
        let g = grade(&inputs(1, 90.0, None, 120.0));
        assert!((g - (-17.35)).abs() < 1e-9, "got {}", g);
    }

    #[test]
    fn test_search_intensity_lowers_grade() {
        let calm = grade(&inputs(3, 10.0, Some(0.1), 10.0));
        let busy = grade(&inputs(3, 10.0, Some(0.9), 10.0));
        assert!(calm > busy);
        assert!((calm - busy - 0.8 * 6.0).abs() < 1e-9);
    }
}
