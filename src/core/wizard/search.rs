//! Backtracking search that reschedules movable units within their bounds
//!
//! Units are placed in prerequisite order (Kahn's algorithm over the planned
//! units each prerequisite mentions). Among units that are ready, the one with
//! the tightest latest bound goes first, then the lexicographically smallest
//! code. Each unit tries its candidate semesters earliest first, so the first
//! complete assignment found is also a compact one.

use super::bounds::PlanBounds;
use super::legality::is_legal_plan;
use crate::core::models::{Offering, Semester, StudyPlan, UnitCatalog, UnitInPlan};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Priority queue item for ordering units before the search
#[derive(Eq, PartialEq)]
struct UnitPQItem {
    /// Latest permitted semester (earlier = more urgent)
    latest: Semester,
    /// Unit code (for tiebreaking)
    code: String,
    /// Index into the movable units
    idx: usize,
}

impl Ord for UnitPQItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse so the tightest bound pops first
        other
            .latest
            .cmp(&self.latest)
            .then_with(|| other.code.cmp(&self.code))
    }
}

impl PartialOrd for UnitPQItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of a search run
#[derive(Debug)]
pub(crate) enum SearchOutcome {
    /// A legal plan was found
    Found(StudyPlan),
    /// Every assignment within the bounds was tried
    Exhausted,
    /// The step limit was reached before the search finished
    LimitReached,
}

pub(crate) struct ScheduleSearch<'a> {
    catalog: &'a UnitCatalog,
    bounds: &'a PlanBounds,
    current: Semester,
    max_units_per_semester: usize,
    step_limit: usize,
    steps: usize,
    completed: Vec<&'a UnitInPlan>,
    order: Vec<&'a UnitInPlan>,
    /// Credit points of `order[i..]`
    remaining_cp: Vec<u32>,
    completed_cp: u32,
    placed: HashMap<&'a str, Semester>,
    load: HashMap<Semester, usize>,
}

impl<'a> ScheduleSearch<'a> {
    pub(crate) fn new(
        plan: &'a StudyPlan,
        catalog: &'a UnitCatalog,
        bounds: &'a PlanBounds,
        current: Semester,
        max_units_per_semester: usize,
        step_limit: usize,
    ) -> Option<Self> {
        let (completed, movable): (Vec<_>, Vec<_>) =
            plan.iter().partition(|u| u.semester < current);

        let order = placement_order(&movable, catalog, bounds)?;

        let mut remaining_cp = vec![0; order.len() + 1];
        for (i, unit) in order.iter().enumerate().rev() {
            remaining_cp[i] = remaining_cp[i + 1] + catalog.credit_points(&unit.code);
        }
        let completed_cp: u32 = completed
            .iter()
            .map(|u| catalog.credit_points(&u.code))
            .sum();

        Some(Self {
            catalog,
            bounds,
            current,
            max_units_per_semester,
            step_limit,
            steps: 0,
            completed,
            order,
            remaining_cp,
            completed_cp,
            placed: HashMap::new(),
            load: HashMap::new(),
        })
    }

    /// Number of candidate placements tried so far
    pub(crate) const fn steps(&self) -> usize {
        self.steps
    }

    pub(crate) fn run(&mut self) -> SearchOutcome {
        self.place(0)
    }

    fn place(&mut self, depth: usize) -> SearchOutcome {
        if depth == self.order.len() {
            return self.finish();
        }

        let unit = self.order[depth];
        let Some(bounds) = self.bounds.get(&unit.code).copied() else {
            return SearchOutcome::Exhausted;
        };
        let Some(catalog_unit) = self.catalog.get(&unit.code) else {
            return SearchOutcome::Exhausted;
        };

        for semester in bounds.semesters() {
            self.steps += 1;
            if self.steps > self.step_limit {
                return SearchOutcome::LimitReached;
            }

            if !catalog_unit.is_offered_in(semester)
                || self.load.get(&semester).copied().unwrap_or(0) >= self.max_units_per_semester
                || !self.prerequisites_may_hold(depth, semester)
            {
                continue;
            }

            self.placed.insert(unit.code.as_str(), semester);
            *self.load.entry(semester).or_default() += 1;

            match self.place(depth + 1) {
                SearchOutcome::Exhausted => {}
                outcome => return outcome,
            }

            self.placed.remove(unit.code.as_str());
            if let Some(count) = self.load.get_mut(&semester) {
                *count -= 1;
            }
        }

        SearchOutcome::Exhausted
    }

    /// Unit prerequisites are exact because every mentioned unit is already
    /// placed; credit points count every not-yet-placed unit as if it were
    /// early, and the finished plan is checked in full.
    fn prerequisites_may_hold(&self, depth: usize, semester: Semester) -> bool {
        let unit = self.order[depth];
        let Some(catalog_unit) = self.catalog.get(&unit.code) else {
            return false;
        };

        let completed_before = |code: &str| {
            self.completed.iter().any(|u| u.code == code)
                || self.placed.get(code).is_some_and(|s| *s < semester)
        };

        let placed_cp: u32 = self
            .placed
            .iter()
            .filter(|(_, s)| **s < semester)
            .map(|(code, _)| self.catalog.credit_points(code))
            .sum();
        let optimistic_cp = self.completed_cp + placed_cp + self.remaining_cp[depth + 1];

        catalog_unit
            .prerequisites
            .is_satisfied(&completed_before, optimistic_cp)
    }

    fn finish(&self) -> SearchOutcome {
        let plan: StudyPlan = self
            .completed
            .iter()
            .map(|u| (*u).clone())
            .chain(
                self.order
                    .iter()
                    .filter_map(|u| self.placed.get(u.code.as_str()).map(|s| u.moved_to(*s))),
            )
            .collect::<StudyPlan>()
            .sorted();

        if is_legal_plan(
            &plan,
            self.catalog,
            self.current,
            self.max_units_per_semester,
        ) {
            SearchOutcome::Found(plan)
        } else {
            SearchOutcome::Exhausted
        }
    }
}

/// Order movable units so that every planned unit a prerequisite mentions comes first.
///
/// Returns `None` if the mentions form a cycle.
fn placement_order<'a>(
    movable: &[&'a UnitInPlan],
    catalog: &UnitCatalog,
    bounds: &PlanBounds,
) -> Option<Vec<&'a UnitInPlan>> {
    let index: HashMap<&str, usize> = movable
        .iter()
        .enumerate()
        .map(|(i, u)| (u.code.as_str(), i))
        .collect();

    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); movable.len()];
    let mut indeg: Vec<usize> = vec![0; movable.len()];

    for (b_idx, unit) in movable.iter().enumerate() {
        let Some(catalog_unit) = catalog.get(&unit.code) else {
            continue;
        };
        for mentioned in catalog_unit.prerequisites.mentions() {
            if let Some(&a_idx) = index.get(mentioned) {
                if a_idx != b_idx {
                    adj[a_idx].push(b_idx);
                    indeg[b_idx] += 1;
                }
            }
        }
    }

    let item = |idx: usize| UnitPQItem {
        latest: bounds
            .get(&movable[idx].code)
            .and_then(|b| b.latest)
            .unwrap_or(Semester::new(u16::MAX, Offering::Summer)),
        code: movable[idx].code.clone(),
        idx,
    };

    let mut heap: BinaryHeap<UnitPQItem> = (0..movable.len())
        .filter(|&i| indeg[i] == 0)
        .map(item)
        .collect();

    let mut order = Vec::with_capacity(movable.len());
    while let Some(UnitPQItem { idx, .. }) = heap.pop() {
        order.push(movable[idx]);
        for &v in &adj[idx] {
            indeg[v] -= 1;
            if indeg[v] == 0 {
                heap.push(item(v));
            }
        }
    }

    (order.len() == movable.len()).then_some(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Offering, Unit};
    use crate::core::wizard::bounds::BoundsOptimizer;

    const S1_2020: Semester = Semester::new(2020, Offering::Semester1);
    const S2_2020: Semester = Semester::new(2020, Offering::Semester2);
    const S1_2021: Semester = Semester::new(2021, Offering::Semester1);

    fn catalog() -> UnitCatalog {
        let both = [Offering::Semester1, Offering::Semester2];
        let mut catalog = UnitCatalog::new();
        for (code, prereq) in [("A", ""), ("B", "A"), ("C", ""), ("D", "")] {
            catalog.add(
                Unit::new(code.to_string(), code.to_string())
                    .offered_in(&both)
                    .with_prerequisites(prereq.parse().unwrap()),
            );
        }
        catalog
    }

    fn placed(code: &str, semester: Semester) -> UnitInPlan {
        UnitInPlan::new(code.to_string(), String::new(), semester)
    }

    #[test]
    fn test_placement_order_puts_prerequisites_first() {
        let catalog = catalog();
        let plan: StudyPlan = vec![placed("B", S1_2021), placed("A", S2_2020)].into();
        let bounds =
            BoundsOptimizer::bound_units_in_plan(&plan, &catalog, S1_2020, S1_2021, 4).unwrap();
        let movable: Vec<_> = plan.iter().collect();

        let order = placement_order(&movable, &catalog, &bounds).unwrap();
        let codes: Vec<_> = order.iter().map(|u| u.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B"]);
    }

    #[test]
    fn test_search_compacts_plan() {
        let catalog = catalog();
        let plan: StudyPlan = vec![
            placed("A", S1_2020),
            placed("B", S1_2021),
            placed("C", S1_2021),
        ]
        .into();
        let bounds =
            BoundsOptimizer::bound_units_in_plan(&plan, &catalog, S1_2020, S2_2020, 4).unwrap();

        let mut search =
            ScheduleSearch::new(&plan, &catalog, &bounds, S1_2020, 4, 1_000).unwrap();
        let SearchOutcome::Found(found) = search.run() else {
            panic!("expected a plan");
        };

        assert_eq!(found.semester_of("A"), Some(S1_2020));
        assert_eq!(found.semester_of("B"), Some(S2_2020));
        assert_eq!(found.semester_of("C"), Some(S1_2020));
        assert!(search.steps() > 0);
    }

    #[test]
    fn test_search_respects_load_limit() {
        let catalog = catalog();
        let plan: StudyPlan = vec![
            placed("A", S1_2020),
            placed("C", S1_2021),
            placed("D", S1_2021),
        ]
        .into();
        let bounds =
            BoundsOptimizer::bound_units_in_plan(&plan, &catalog, S1_2020, S2_2020, 1).unwrap();

        let mut search = ScheduleSearch::new(&plan, &catalog, &bounds, S1_2020, 1, 1_000).unwrap();
        assert!(matches!(search.run(), SearchOutcome::Exhausted));
    }

    #[test]
    fn test_step_limit() {
        let catalog = catalog();
        let plan: StudyPlan = vec![placed("A", S1_2020), placed("C", S1_2021)].into();
        let bounds =
            BoundsOptimizer::bound_units_in_plan(&plan, &catalog, S1_2020, S2_2020, 4).unwrap();

        let mut search = ScheduleSearch::new(&plan, &catalog, &bounds, S1_2020, 4, 0).unwrap();
        assert!(matches!(search.run(), SearchOutcome::LimitReached));
    }
}
