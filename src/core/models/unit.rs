//! Unit models: catalogue entries and units placed in a plan

use super::{Offering, Prereq, Semester};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Credit points carried by a standard unit
pub const DEFAULT_CREDIT_POINTS: u32 = 12;

/// A unit as described in the catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unit code (e.g., "CAB201")
    pub code: String,

    /// Unit title (e.g., "Programming Principles")
    pub title: String,

    /// Credit points earned on completion
    pub credit_points: u32,

    /// Offerings in which the unit is taught
    pub offered: BTreeSet<Offering>,

    /// Prerequisite requirement
    pub prerequisites: Prereq,
}

impl Unit {
    /// Create a new unit with the standard credit points, no offerings and no prerequisites
    #[must_use]
    pub fn new(code: String, title: String) -> Self {
        Self {
            code,
            title,
            credit_points: DEFAULT_CREDIT_POINTS,
            offered: BTreeSet::new(),
            prerequisites: Prereq::None,
        }
    }

    /// Builder: set the offerings
    #[must_use]
    pub fn offered_in(mut self, offerings: &[Offering]) -> Self {
        self.offered = offerings.iter().copied().collect();
        self
    }

    /// Builder: set the prerequisite requirement
    #[must_use]
    pub fn with_prerequisites(mut self, prerequisites: Prereq) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    /// Builder: set the credit points
    #[must_use]
    pub const fn with_credit_points(mut self, credit_points: u32) -> Self {
        self.credit_points = credit_points;
        self
    }

    /// Whether the unit is taught in the given semester
    #[must_use]
    pub fn is_offered_in(&self, semester: Semester) -> bool {
        self.offered.contains(&semester.offering)
    }

    /// Offerings formatted as `S1;S2`
    #[must_use]
    pub fn offered_label(&self) -> String {
        self.offered
            .iter()
            .map(|o| o.label())
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// One unit placed in one semester of a study plan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitInPlan {
    /// Unit code
    pub code: String,

    /// Study area the unit counts towards (e.g., "IT Core", "Elective")
    pub study_area: String,

    /// Semester the unit is planned for
    pub semester: Semester,
}

impl UnitInPlan {
    /// Create a new unit placement
    #[must_use]
    pub const fn new(code: String, study_area: String, semester: Semester) -> Self {
        Self {
            code,
            study_area,
            semester,
        }
    }

    /// Copy of this placement moved to another semester
    #[must_use]
    pub fn moved_to(&self, semester: Semester) -> Self {
        Self {
            semester,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_creation() {
        let unit = Unit::new("CAB201".to_string(), "Programming Principles".to_string());

        assert_eq!(unit.code, "CAB201");
        assert_eq!(unit.credit_points, DEFAULT_CREDIT_POINTS);
        assert!(unit.offered.is_empty());
        assert!(unit.prerequisites.is_none());
    }

    #[test]
    fn test_offerings() {
        let unit = Unit::new("CAB202".to_string(), "Microprocessors".to_string())
            .offered_in(&[Offering::Semester2, Offering::Semester1]);

        assert!(unit.is_offered_in(Semester::new(2020, Offering::Semester1)));
        assert!(!unit.is_offered_in(Semester::new(2020, Offering::Summer)));
        assert_eq!(unit.offered_label(), "S1;S2");
    }

    #[test]
    fn test_moved_to_keeps_study_area() {
        let placed = UnitInPlan::new(
            "CAB201".to_string(),
            "IT Core".to_string(),
            Semester::new(2021, Offering::Semester1),
        );
        let moved = placed.moved_to(Semester::new(2020, Offering::Semester2));

        assert_eq!(moved.code, "CAB201");
        assert_eq!(moved.study_area, "IT Core");
        assert_eq!(moved.semester, Semester::new(2020, Offering::Semester2));
    }
}
