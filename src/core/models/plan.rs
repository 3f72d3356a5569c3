//! Study plan model

use super::{Semester, UnitInPlan};
use serde::{Deserialize, Serialize};

/// An ordered sequence of unit placements making up a student's enrollment plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlan {
    units: Vec<UnitInPlan>,
}

impl StudyPlan {
    /// Create a new empty plan
    #[must_use]
    pub const fn new() -> Self {
        Self { units: Vec::new() }
    }

    /// Add a unit placement to the end of the plan
    pub fn push(&mut self, unit: UnitInPlan) {
        self.units.push(unit);
    }

    /// Iterate over the placements in plan order
    pub fn iter(&self) -> std::slice::Iter<'_, UnitInPlan> {
        self.units.iter()
    }

    /// Number of placements
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the plan has no placements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Placements scheduled for `semester`
    pub fn units_in(&self, semester: Semester) -> impl Iterator<Item = &UnitInPlan> {
        self.units.iter().filter(move |u| u.semester == semester)
    }

    /// Semester a unit is planned for, if present
    #[must_use]
    pub fn semester_of(&self, code: &str) -> Option<Semester> {
        self.units
            .iter()
            .find(|u| u.code == code)
            .map(|u| u.semester)
    }

    /// Whether the plan contains a unit
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.units.iter().any(|u| u.code == code)
    }

    /// Earliest semester referenced by the plan
    #[must_use]
    pub fn first_semester(&self) -> Option<Semester> {
        self.units.iter().map(|u| u.semester).min()
    }

    /// Latest semester referenced by the plan (`None` for an empty plan)
    #[must_use]
    pub fn last_semester(&self) -> Option<Semester> {
        self.units.iter().map(|u| u.semester).max()
    }

    /// Distinct semesters used by the plan, ascending
    #[must_use]
    pub fn semesters(&self) -> Vec<Semester> {
        let mut semesters: Vec<_> = self.units.iter().map(|u| u.semester).collect();
        semesters.sort_unstable();
        semesters.dedup();
        semesters
    }

    /// Copy of the plan ordered by semester, then unit code
    #[must_use]
    pub fn sorted(&self) -> Self {
        let mut units = self.units.clone();
        units.sort_by(|a, b| a.semester.cmp(&b.semester).then_with(|| a.code.cmp(&b.code)));
        Self { units }
    }
}

impl From<Vec<UnitInPlan>> for StudyPlan {
    fn from(units: Vec<UnitInPlan>) -> Self {
        Self { units }
    }
}

impl FromIterator<UnitInPlan> for StudyPlan {
    fn from_iter<I: IntoIterator<Item = UnitInPlan>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a StudyPlan {
    type Item = &'a UnitInPlan;
    type IntoIter = std::slice::Iter<'a, UnitInPlan>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

impl IntoIterator for StudyPlan {
    type Item = UnitInPlan;
    type IntoIter = std::vec::IntoIter<UnitInPlan>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Offering;

    fn placed(code: &str, year: u16, offering: Offering) -> UnitInPlan {
        UnitInPlan::new(
            code.to_string(),
            "IT Core".to_string(),
            Semester::new(year, offering),
        )
    }

    #[test]
    fn test_empty_plan() {
        let plan = StudyPlan::new();
        assert!(plan.is_empty());
        assert!(plan.first_semester().is_none());
        assert!(plan.last_semester().is_none());
        assert!(plan.semesters().is_empty());
    }

    #[test]
    fn test_first_and_last_semester() {
        let plan: StudyPlan = vec![
            placed("CAB202", 2020, Offering::Semester2),
            placed("CAB201", 2020, Offering::Semester1),
            placed("CAB301", 2021, Offering::Semester1),
        ]
        .into();

        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan.first_semester(),
            Some(Semester::new(2020, Offering::Semester1))
        );
        assert_eq!(
            plan.last_semester(),
            Some(Semester::new(2021, Offering::Semester1))
        );
    }

    #[test]
    fn test_lookup() {
        let plan: StudyPlan = vec![
            placed("CAB201", 2020, Offering::Semester1),
            placed("CAB202", 2020, Offering::Semester1),
        ]
        .into();

        assert!(plan.contains("CAB201"));
        assert!(!plan.contains("CAB301"));
        assert_eq!(
            plan.semester_of("CAB202"),
            Some(Semester::new(2020, Offering::Semester1))
        );
        assert_eq!(
            plan.units_in(Semester::new(2020, Offering::Semester1)).count(),
            2
        );
    }

    #[test]
    fn test_sorted() {
        let plan: StudyPlan = vec![
            placed("CAB301", 2021, Offering::Semester1),
            placed("CAB202", 2020, Offering::Semester1),
            placed("CAB201", 2020, Offering::Semester1),
        ]
        .into();

        let codes: Vec<_> = plan.sorted().iter().map(|u| u.code.clone()).collect();
        assert_eq!(codes, vec!["CAB201", "CAB202", "CAB301"]);
    }
}
