//! Earliest/latest semester bounds for units in a plan
//!
//! A unit's earliest semester follows from when its prerequisites can first be
//! complete; its latest semester follows from the target graduation semester
//! and from the latest semesters of the units that depend on it. The search in
//! [`super::search`] only ever places a unit within its bounds.

use crate::core::models::{Prereq, Semester, StudyPlan, Unit, UnitCatalog};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use thiserror::Error;

/// Errors raised while bounding a plan
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundsError {
    /// A unit depends on itself through its prerequisites
    #[error("Cyclic prerequisites involving {0}")]
    CyclicPrerequisites(String),
}

/// Range of semesters a unit may occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitBounds {
    /// First semester the unit can be taken, if any
    pub earliest: Option<Semester>,
    /// Last semester the unit can be taken while still finishing on time, if any
    pub latest: Option<Semester>,
}

impl UnitBounds {
    /// Whether at least one semester lies within the bounds
    #[must_use]
    pub fn is_schedulable(&self) -> bool {
        matches!((self.earliest, self.latest), (Some(e), Some(l)) if e <= l)
    }

    /// Semesters within the bounds, ascending
    pub fn semesters(&self) -> impl Iterator<Item = Semester> {
        let range = match (self.earliest, self.latest) {
            (Some(e), Some(l)) => Some((e, l)),
            _ => None,
        };
        range
            .into_iter()
            .flat_map(|(first, last)| Semester::sequence(first, last))
    }
}

/// Bounds for every movable unit in a plan
#[derive(Debug, Clone, Default)]
pub struct PlanBounds {
    bounds: BTreeMap<String, UnitBounds>,
}

impl PlanBounds {
    /// Bounds for a unit
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&UnitBounds> {
        self.bounds.get(code)
    }

    /// Iterate over `(code, bounds)` in code order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UnitBounds)> {
        self.bounds.iter().map(|(code, b)| (code.as_str(), b))
    }

    /// Number of bounded units
    #[must_use]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Whether no units were bounded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Codes of units with an empty range
    #[must_use]
    pub fn unschedulable(&self) -> Vec<&str> {
        self.bounds
            .iter()
            .filter(|(_, b)| !b.is_schedulable())
            .map(|(code, _)| code.as_str())
            .collect()
    }

    /// Whether every unit has a non-empty range
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.bounds.values().all(UnitBounds::is_schedulable)
    }
}

/// Computes [`PlanBounds`] for a plan against a target semester
pub struct BoundsOptimizer<'a> {
    catalog: &'a UnitCatalog,
    current: Semester,
    target: Semester,
    max_units_per_semester: usize,
    completed: HashSet<&'a str>,
    movable: BTreeSet<&'a str>,
    completed_cp: u32,
    movable_cp: u32,
    earliest: HashMap<&'a str, Option<Semester>>,
    latest: HashMap<&'a str, Option<Semester>>,
    visiting: HashSet<&'a str>,
}

impl<'a> BoundsOptimizer<'a> {
    /// Bound every unit planned at or after `current` so that the plan finishes by `target`
    ///
    /// Units planned before `current` are completed and contribute only to
    /// prerequisites and credit points.
    ///
    /// # Errors
    /// Returns [`BoundsError::CyclicPrerequisites`] if planned units depend on each other in a cycle
    pub fn bound_units_in_plan(
        plan: &'a StudyPlan,
        catalog: &'a UnitCatalog,
        current: Semester,
        target: Semester,
        max_units_per_semester: usize,
    ) -> Result<PlanBounds, BoundsError> {
        let (completed, movable): (Vec<_>, Vec<_>) =
            plan.iter().partition(|u| u.semester < current);

        let completed: HashSet<&str> = completed.into_iter().map(|u| u.code.as_str()).collect();
        let movable: BTreeSet<&str> = movable.into_iter().map(|u| u.code.as_str()).collect();

        let mut optimizer = Self {
            catalog,
            current,
            target,
            max_units_per_semester,
            completed_cp: completed.iter().map(|c| catalog.credit_points(c)).sum(),
            movable_cp: movable.iter().map(|c| catalog.credit_points(c)).sum(),
            completed,
            movable,
            earliest: HashMap::new(),
            latest: HashMap::new(),
            visiting: HashSet::new(),
        };

        let codes: Vec<&'a str> = optimizer.movable.iter().copied().collect();
        for &code in &codes {
            optimizer.earliest(code)?;
        }
        for &code in &codes {
            optimizer.latest(code)?;
        }

        let bounds = codes
            .into_iter()
            .map(|code| {
                let bounds = UnitBounds {
                    earliest: optimizer.earliest.get(code).copied().flatten(),
                    latest: optimizer.latest.get(code).copied().flatten(),
                };
                (code.to_string(), bounds)
            })
            .collect();

        Ok(PlanBounds { bounds })
    }

    fn earliest(&mut self, code: &'a str) -> Result<Option<Semester>, BoundsError> {
        if let Some(found) = self.earliest.get(code) {
            return Ok(*found);
        }
        if !self.visiting.insert(code) {
            return Err(BoundsError::CyclicPrerequisites(code.to_string()));
        }

        let catalog = self.catalog;
        let result = match catalog.get(code) {
            Some(unit) => self
                .ready(&unit.prerequisites, code)?
                .and_then(|ready| first_offered_from(unit, ready)),
            None => None,
        };

        self.visiting.remove(code);
        self.earliest.insert(code, result);
        Ok(result)
    }

    /// First semester in which `prereq` can hold for `code`
    fn ready(&mut self, prereq: &'a Prereq, code: &'a str) -> Result<Option<Semester>, BoundsError> {
        Ok(match prereq {
            Prereq::None => Some(self.current),
            Prereq::Unit(required) => {
                if self.completed.contains(required.as_str()) {
                    Some(self.current)
                } else if self.movable.contains(required.as_str()) {
                    self.earliest(required)?.map(Semester::next)
                } else {
                    None
                }
            }
            Prereq::CreditPoints(needed) => self.credit_points_ready(*needed, code),
            Prereq::And(parts) => {
                let mut ready = Some(self.current);
                for part in parts {
                    let part_ready = self.ready(part, code)?;
                    ready = match (ready, part_ready) {
                        (Some(a), Some(b)) => Some(a.max(b)),
                        _ => None,
                    };
                }
                ready
            }
            Prereq::Or(alternatives) => {
                let mut best: Option<Semester> = None;
                for alternative in alternatives {
                    if let Some(r) = self.ready(alternative, code)? {
                        best = Some(best.map_or(r, |b| b.min(r)));
                    }
                }
                best
            }
        })
    }

    /// Lower bound on when `needed` credit points can be complete, at the maximum load
    fn credit_points_ready(&self, needed: u32, code: &str) -> Option<Semester> {
        if self.completed_cp >= needed {
            return Some(self.current);
        }
        let missing = needed - self.completed_cp;
        let available = self
            .movable_cp
            .saturating_sub(self.catalog.credit_points(code));
        if available < missing {
            return None;
        }

        let per_semester = u32::try_from(self.max_units_per_semester)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.catalog.max_credit_points());
        if per_semester == 0 {
            return None;
        }

        let semesters = usize::try_from(missing.div_ceil(per_semester)).ok()?;
        Some(self.current.advance(semesters))
    }

    fn latest(&mut self, code: &'a str) -> Result<Option<Semester>, BoundsError> {
        if let Some(found) = self.latest.get(code) {
            return Ok(*found);
        }
        if !self.visiting.insert(code) {
            return Err(BoundsError::CyclicPrerequisites(code.to_string()));
        }

        let catalog = self.catalog;
        let dependents: Vec<&'a str> = self
            .movable
            .iter()
            .copied()
            .filter(|d| *d != code)
            .filter(|d| {
                catalog
                    .get(d)
                    .is_some_and(|u| u.prerequisites.requires(code))
            })
            .collect();

        let mut cap = Some(self.target);
        for dependent in dependents {
            cap = match (cap, self.latest(dependent)?) {
                (Some(c), Some(l)) => Some(c.min(l.previous())),
                _ => None,
            };
        }

        let result = match (catalog.get(code), cap) {
            (Some(unit), Some(cap)) => {
                Semester::sequence_rev(cap, self.current).find(|s| unit.is_offered_in(*s))
            }
            _ => None,
        };

        self.visiting.remove(code);
        self.latest.insert(code, result);
        Ok(result)
    }
}

/// First semester at or after `from` in which `unit` is offered
fn first_offered_from(unit: &Unit, from: Semester) -> Option<Semester> {
    if unit.offered.is_empty() {
        return None;
    }
    std::iter::successors(Some(from), |s| Some(s.next()))
        .take(3)
        .find(|s| unit.is_offered_in(*s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Offering, UnitInPlan};

    const S1_2020: Semester = Semester::new(2020, Offering::Semester1);
    const S2_2020: Semester = Semester::new(2020, Offering::Semester2);
    const S1_2021: Semester = Semester::new(2021, Offering::Semester1);
    const S2_2021: Semester = Semester::new(2021, Offering::Semester2);

    fn unit(code: &str, offered: &[Offering], prereq: &str) -> Unit {
        Unit::new(code.to_string(), code.to_string())
            .offered_in(offered)
            .with_prerequisites(prereq.parse().unwrap())
    }

    fn placed(code: &str, semester: Semester) -> UnitInPlan {
        UnitInPlan::new(code.to_string(), String::new(), semester)
    }

    fn chain_catalog() -> UnitCatalog {
        let both = [Offering::Semester1, Offering::Semester2];
        let mut catalog = UnitCatalog::new();
        catalog.add(unit("A", &both, ""));
        catalog.add(unit("B", &both, "A"));
        catalog.add(unit("C", &[Offering::Semester1], "B"));
        catalog
    }

    #[test]
    fn test_chain_bounds() {
        let catalog = chain_catalog();
        let plan: StudyPlan = vec![
            placed("A", S1_2020),
            placed("B", S2_2020),
            placed("C", S1_2021),
        ]
        .into();

        let bounds =
            BoundsOptimizer::bound_units_in_plan(&plan, &catalog, S1_2020, S2_2021, 4).unwrap();

        let a = bounds.get("A").unwrap();
        assert_eq!(a.earliest, Some(S1_2020));
        // C must be in a semester-1 offering no later than 2021/S2, so 2021/S1; B before that
        assert_eq!(bounds.get("C").unwrap().latest, Some(S1_2021));
        assert_eq!(bounds.get("B").unwrap().latest, Some(S2_2020));
        assert_eq!(a.latest, Some(S1_2020));
        // Summer is skipped for B's earliest since B is not offered then
        assert_eq!(bounds.get("B").unwrap().earliest, Some(S2_2020));
        assert_eq!(bounds.get("C").unwrap().earliest, Some(S1_2021));
        assert!(bounds.is_feasible());
    }

    #[test]
    fn test_target_too_early_is_infeasible() {
        let catalog = chain_catalog();
        let plan: StudyPlan = vec![
            placed("A", S1_2020),
            placed("B", S2_2020),
            placed("C", S1_2021),
        ]
        .into();

        let bounds =
            BoundsOptimizer::bound_units_in_plan(&plan, &catalog, S1_2020, S2_2020, 4).unwrap();
        assert!(!bounds.is_feasible());
        assert!(bounds.unschedulable().contains(&"C"));
    }

    #[test]
    fn test_completed_units_satisfy_prerequisites() {
        let catalog = chain_catalog();
        let plan: StudyPlan = vec![
            placed("A", Semester::new(2019, Offering::Semester2)),
            placed("B", S1_2020),
        ]
        .into();

        let bounds =
            BoundsOptimizer::bound_units_in_plan(&plan, &catalog, S1_2020, S2_2021, 4).unwrap();
        assert!(bounds.get("A").is_none());
        assert_eq!(bounds.get("B").unwrap().earliest, Some(S1_2020));
    }

    #[test]
    fn test_missing_prerequisite_has_no_earliest() {
        let catalog = chain_catalog();
        let plan: StudyPlan = vec![placed("B", S1_2020)].into();

        let bounds =
            BoundsOptimizer::bound_units_in_plan(&plan, &catalog, S1_2020, S2_2021, 4).unwrap();
        assert_eq!(bounds.get("B").unwrap().earliest, None);
        assert!(!bounds.is_feasible());
    }

    #[test]
    fn test_or_takes_earliest_alternative() {
        let both = [Offering::Semester1, Offering::Semester2];
        let mut catalog = chain_catalog();
        catalog.add(unit("D", &both, "B or A"));
        let plan: StudyPlan = vec![
            placed("A", S1_2020),
            placed("B", S2_2020),
            placed("D", S1_2021),
        ]
        .into();

        let bounds =
            BoundsOptimizer::bound_units_in_plan(&plan, &catalog, S1_2020, S2_2021, 4).unwrap();
        assert_eq!(bounds.get("D").unwrap().earliest, Some(S2_2020));
        // D does not strictly require A, so A is only capped by B
        assert_eq!(bounds.get("A").unwrap().latest, Some(S1_2021));
    }

    #[test]
    fn test_credit_points_lower_bound() {
        let both = [Offering::Semester1, Offering::Semester2];
        let mut catalog = UnitCatalog::new();
        for code in ["A", "B", "C"] {
            catalog.add(unit(code, &both, ""));
        }
        catalog.add(unit("Z", &both, "36cp"));
        let plan: StudyPlan = ["A", "B", "C", "Z"]
            .iter()
            .map(|c| placed(c, S1_2020))
            .collect();

        // Two units per semester at 12cp: 36cp needs two semesters of study
        let bounds =
            BoundsOptimizer::bound_units_in_plan(&plan, &catalog, S1_2020, S2_2021, 2).unwrap();
        assert_eq!(
            bounds.get("Z").unwrap().earliest,
            Some(Semester::new(2021, Offering::Semester1))
        );
    }

    #[test]
    fn test_cycle_detected() {
        let both = [Offering::Semester1, Offering::Semester2];
        let mut catalog = UnitCatalog::new();
        catalog.add(unit("X", &both, "Y"));
        catalog.add(unit("Y", &both, "X"));
        let plan: StudyPlan = vec![placed("X", S1_2020), placed("Y", S2_2020)].into();

        let result = BoundsOptimizer::bound_units_in_plan(&plan, &catalog, S1_2020, S2_2021, 4);
        assert!(matches!(result, Err(BoundsError::CyclicPrerequisites(_))));
    }
}
