//! Plan legality checks
//!
//! Units planned before the current semester are treated as completed and are
//! never checked. Every other placement must be in the catalogue, appear once,
//! be offered in its semester, have its prerequisites met by units in strictly
//! earlier semesters, and fit within the per-semester unit limit.

use crate::core::models::{Semester, StudyPlan, UnitCatalog};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// A single reason a plan is not legal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanViolation {
    /// The unit is not in the catalogue
    UnknownUnit {
        /// Unit code
        code: String,
    },
    /// The unit is planned more than once
    DuplicateUnit {
        /// Unit code
        code: String,
    },
    /// The unit is not taught in the semester it is planned for
    NotOffered {
        /// Unit code
        code: String,
        /// Planned semester
        semester: Semester,
    },
    /// The unit's prerequisites are not met before its semester
    PrerequisitesNotMet {
        /// Unit code
        code: String,
        /// Planned semester
        semester: Semester,
        /// Prerequisite expression as written
        requirement: String,
    },
    /// A semester holds more units than allowed
    Overloaded {
        /// Semester over the limit
        semester: Semester,
        /// Units planned in the semester
        units: usize,
        /// Allowed maximum
        max: usize,
    },
}

impl fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownUnit { code } => write!(f, "{code} is not in the unit catalogue"),
            Self::DuplicateUnit { code } => write!(f, "{code} is planned more than once"),
            Self::NotOffered { code, semester } => {
                write!(f, "{code} is not offered in {semester}")
            }
            Self::PrerequisitesNotMet {
                code,
                semester,
                requirement,
            } => write!(
                f,
                "{code} in {semester} does not meet its prerequisites ({requirement})"
            ),
            Self::Overloaded {
                semester,
                units,
                max,
            } => write!(f, "{semester} has {units} units (maximum {max})"),
        }
    }
}

/// Which units are done, and how many credit points were earned, by each semester
pub(crate) struct CompletionIndex<'a> {
    placed: HashMap<&'a str, Semester>,
    catalog: &'a UnitCatalog,
}

impl<'a> CompletionIndex<'a> {
    pub(crate) fn new(plan: &'a StudyPlan, catalog: &'a UnitCatalog) -> Self {
        let mut placed = HashMap::new();
        for unit in plan {
            placed
                .entry(unit.code.as_str())
                .and_modify(|s: &mut Semester| *s = (*s).min(unit.semester))
                .or_insert(unit.semester);
        }
        Self { placed, catalog }
    }

    /// Whether `code` is completed before `semester` starts
    pub(crate) fn completed_before(&self, code: &str, semester: Semester) -> bool {
        self.placed.get(code).is_some_and(|s| *s < semester)
    }

    /// Credit points completed before `semester` starts
    pub(crate) fn credit_points_before(&self, semester: Semester) -> u32 {
        self.placed
            .iter()
            .filter(|(_, s)| **s < semester)
            .map(|(code, _)| self.catalog.credit_points(code))
            .sum()
    }

    /// Whether the unit's prerequisites hold when it is taken in `semester`
    pub(crate) fn prerequisites_met(&self, code: &str, semester: Semester) -> bool {
        self.catalog.get(code).is_some_and(|unit| {
            unit.prerequisites.is_satisfied(
                &|c: &str| self.completed_before(c, semester),
                self.credit_points_before(semester),
            )
        })
    }
}

/// Collect every legality violation in `plan`
#[must_use]
pub fn check_plan(
    plan: &StudyPlan,
    catalog: &UnitCatalog,
    current: Semester,
    max_units_per_semester: usize,
) -> Vec<PlanViolation> {
    let mut violations = Vec::new();
    let index = CompletionIndex::new(plan, catalog);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut load: BTreeMap<Semester, usize> = BTreeMap::new();

    for placed in plan {
        if !seen.insert(placed.code.as_str()) {
            violations.push(PlanViolation::DuplicateUnit {
                code: placed.code.clone(),
            });
            continue;
        }

        if placed.semester < current {
            continue;
        }
        *load.entry(placed.semester).or_default() += 1;

        let Some(unit) = catalog.get(&placed.code) else {
            violations.push(PlanViolation::UnknownUnit {
                code: placed.code.clone(),
            });
            continue;
        };

        if !unit.is_offered_in(placed.semester) {
            violations.push(PlanViolation::NotOffered {
                code: placed.code.clone(),
                semester: placed.semester,
            });
        }

        if !index.prerequisites_met(&placed.code, placed.semester) {
            violations.push(PlanViolation::PrerequisitesNotMet {
                code: placed.code.clone(),
                semester: placed.semester,
                requirement: unit.prerequisites.to_string(),
            });
        }
    }

    for (semester, units) in load {
        if units > max_units_per_semester {
            violations.push(PlanViolation::Overloaded {
                semester,
                units,
                max: max_units_per_semester,
            });
        }
    }

    violations
}

/// Whether `plan` has no legality violations
#[must_use]
pub fn is_legal_plan(
    plan: &StudyPlan,
    catalog: &UnitCatalog,
    current: Semester,
    max_units_per_semester: usize,
) -> bool {
    check_plan(plan, catalog, current, max_units_per_semester).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Offering, Prereq, Unit, UnitInPlan};

    const S1_2020: Semester = Semester::new(2020, Offering::Semester1);
    const S2_2020: Semester = Semester::new(2020, Offering::Semester2);

    fn catalog() -> UnitCatalog {
        let mut catalog = UnitCatalog::new();
        catalog.add(
            Unit::new("CAB201".to_string(), "Programming".to_string())
                .offered_in(&[Offering::Semester1, Offering::Semester2]),
        );
        catalog.add(
            Unit::new("CAB202".to_string(), "Microprocessors".to_string())
                .offered_in(&[Offering::Semester1, Offering::Semester2])
                .with_prerequisites(Prereq::Unit("CAB201".to_string())),
        );
        catalog.add(
            Unit::new("CAB401".to_string(), "Parallel".to_string())
                .offered_in(&[Offering::Semester2])
                .with_prerequisites(Prereq::CreditPoints(24)),
        );
        catalog
    }

    fn placed(code: &str, semester: Semester) -> UnitInPlan {
        UnitInPlan::new(code.to_string(), "Core".to_string(), semester)
    }

    #[test]
    fn test_legal_plan() {
        let plan: StudyPlan = vec![placed("CAB201", S1_2020), placed("CAB202", S2_2020)].into();
        assert!(is_legal_plan(&plan, &catalog(), S1_2020, 4));
    }

    #[test]
    fn test_prerequisite_in_same_semester_is_not_enough() {
        let plan: StudyPlan = vec![placed("CAB201", S1_2020), placed("CAB202", S1_2020)].into();
        let violations = check_plan(&plan, &catalog(), S1_2020, 4);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            &violations[0],
            PlanViolation::PrerequisitesNotMet { code, .. } if code == "CAB202"
        ));
    }

    #[test]
    fn test_not_offered() {
        let plan: StudyPlan = vec![placed("CAB201", Semester::new(2020, Offering::Summer))].into();
        let violations = check_plan(&plan, &catalog(), S1_2020, 4);
        assert!(matches!(violations[0], PlanViolation::NotOffered { .. }));
    }

    #[test]
    fn test_credit_points_requirement() {
        let early: StudyPlan = vec![placed("CAB201", S1_2020), placed("CAB401", S2_2020)].into();
        assert!(!is_legal_plan(&early, &catalog(), S1_2020, 4));

        let late: StudyPlan = vec![
            placed("CAB201", S1_2020),
            placed("CAB202", S2_2020),
            placed("CAB401", Semester::new(2021, Offering::Semester2)),
        ]
        .into();
        assert!(is_legal_plan(&late, &catalog(), S1_2020, 4));
    }

    #[test]
    fn test_completed_units_are_not_checked() {
        // CAB201 in a past summer is not offered then, but it is already done
        let plan: StudyPlan = vec![
            placed("CAB201", Semester::new(2019, Offering::Summer)),
            placed("CAB202", S1_2020),
        ]
        .into();
        assert!(is_legal_plan(&plan, &catalog(), S1_2020, 4));
    }

    #[test]
    fn test_overloaded_and_duplicate() {
        let plan: StudyPlan = vec![
            placed("CAB201", S1_2020),
            placed("CAB201", S2_2020),
        ]
        .into();
        let violations = check_plan(&plan, &catalog(), S1_2020, 4);
        assert_eq!(
            violations,
            vec![PlanViolation::DuplicateUnit {
                code: "CAB201".to_string()
            }]
        );

        let single: StudyPlan = vec![placed("CAB201", S1_2020)].into();
        let violations = check_plan(&single, &catalog(), S1_2020, 0);
        assert!(matches!(
            violations[0],
            PlanViolation::Overloaded { units: 1, max: 0, .. }
        ));
    }

    #[test]
    fn test_unknown_unit() {
        let plan: StudyPlan = vec![placed("XYZ999", S1_2020)].into();
        let violations = check_plan(&plan, &catalog(), S1_2020, 4);
        assert_eq!(
            violations[0].to_string(),
            "XYZ999 is not in the unit catalogue"
        );
    }
}
