//! Priority classification for incoming reports.
//!
//! Priority is derived from the reported facility type and damage category.
//! Critical facilities block teaching or campus operations outright, common
//! facilities degrade them, and anything unrecognized starts at the bottom.
//! Severe damage escalates the base priority one level.

use crate::features::reports::models::{DamageCategory, Priority};

const CRITICAL_FACILITIES: [&str; 7] = [
    "proyektor",
    "ac",
    "komputer",
    "listrik",
    "internet",
    "jaringan",
    "server",
];

const COMMON_FACILITIES: [&str; 8] = [
    "kursi",
    "meja",
    "papan tulis",
    "pintu",
    "jendela",
    "toilet",
    "lampu",
    "washtafel",
];

/// Classify a report into a handling priority.
///
/// Facility matching is a case-insensitive substring check, so "AC ruang 301"
/// matches "ac" and "Papan Tulis" matches "papan tulis".
pub fn classify(facility_type: &str, category: DamageCategory) -> Priority {
    let facility = facility_type.to_lowercase();

    let base = if CRITICAL_FACILITIES.iter().any(|f| facility.contains(f)) {
        Priority::High
    } else if COMMON_FACILITIES.iter().any(|f| facility.contains(f)) {
        Priority::Medium
    } else {
        Priority::Low
    };

    match category {
        DamageCategory::Severe => base.escalate(),
        DamageCategory::Minor => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_facility_severe_is_high() {
        assert_eq!(classify("Proyektor", DamageCategory::Severe), Priority::High);
    }

    #[test]
    fn critical_facility_minor_is_high() {
        assert_eq!(classify("proyektor", DamageCategory::Minor), Priority::High);
    }

    #[test]
    fn common_facility_minor_is_medium() {
        assert_eq!(classify("Kursi", DamageCategory::Minor), Priority::Medium);
    }

    #[test]
    fn common_facility_severe_is_high() {
        assert_eq!(classify("kursi kuliah", DamageCategory::Severe), Priority::High);
    }

    #[test]
    fn unknown_facility_minor_is_low() {
        assert_eq!(classify("Gordyn", DamageCategory::Minor), Priority::Low);
    }

    #[test]
    fn unknown_facility_severe_is_medium() {
        assert_eq!(classify("Gordyn", DamageCategory::Severe), Priority::Medium);
    }

    #[test]
    fn matching_is_substring_and_case_insensitive() {
        assert_eq!(
            classify("AC ruang 301", DamageCategory::Minor),
            Priority::High
        );
        assert_eq!(
            classify("Papan Tulis lantai 2", DamageCategory::Minor),
            Priority::Medium
        );
    }
}
