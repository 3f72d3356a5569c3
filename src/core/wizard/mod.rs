//! Scheduling wizard
//!
//! Checks study plans, reschedules them to finish by a target semester, and
//! produces successively shorter plans.

pub mod bounds;
pub mod legality;
mod search;

pub use bounds::{BoundsError, BoundsOptimizer, PlanBounds, UnitBounds};
pub use legality::{check_plan, is_legal_plan, PlanViolation};

use crate::core::models::{Semester, StudyPlan, UnitCatalog, DEFAULT_CURRENT_SEMESTER};
use crate::{debug, info, warn};
use search::{ScheduleSearch, SearchOutcome};
use std::iter::FusedIterator;

/// Default maximum number of units in one semester
pub const DEFAULT_MAX_UNITS_PER_SEMESTER: usize = 4;

/// Default number of candidate placements tried before a search gives up
pub const DEFAULT_SEARCH_STEP_LIMIT: usize = 200_000;

/// Latest semester referenced by `plan`, or `None` for an empty plan
#[must_use]
pub fn last_semester(plan: &StudyPlan) -> Option<Semester> {
    plan.last_semester()
}

/// Reschedules study plans against a unit catalogue
#[derive(Debug, Clone)]
pub struct SchedulingWizard<'a> {
    catalog: &'a UnitCatalog,
    current_semester: Semester,
    max_units_per_semester: usize,
    search_step_limit: usize,
}

impl<'a> SchedulingWizard<'a> {
    /// Create a wizard with the default current semester and limits
    #[must_use]
    pub const fn new(catalog: &'a UnitCatalog) -> Self {
        Self {
            catalog,
            current_semester: DEFAULT_CURRENT_SEMESTER,
            max_units_per_semester: DEFAULT_MAX_UNITS_PER_SEMESTER,
            search_step_limit: DEFAULT_SEARCH_STEP_LIMIT,
        }
    }

    /// Builder: set the current semester
    #[must_use]
    pub const fn with_current_semester(mut self, current: Semester) -> Self {
        self.current_semester = current;
        self
    }

    /// Builder: set the maximum units per semester
    #[must_use]
    pub const fn with_max_units_per_semester(mut self, max: usize) -> Self {
        self.max_units_per_semester = max;
        self
    }

    /// Builder: set the search step limit
    #[must_use]
    pub const fn with_search_step_limit(mut self, limit: usize) -> Self {
        self.search_step_limit = limit;
        self
    }

    /// The semester treated as "now"; units planned earlier are completed
    #[must_use]
    pub const fn current_semester(&self) -> Semester {
        self.current_semester
    }

    /// Maximum number of units in one semester
    #[must_use]
    pub const fn max_units_per_semester(&self) -> usize {
        self.max_units_per_semester
    }

    /// The unit catalogue plans are checked against
    #[must_use]
    pub const fn catalog(&self) -> &'a UnitCatalog {
        self.catalog
    }

    /// Every legality violation in `plan`
    #[must_use]
    pub fn check(&self, plan: &StudyPlan) -> Vec<PlanViolation> {
        check_plan(
            plan,
            self.catalog,
            self.current_semester,
            self.max_units_per_semester,
        )
    }

    /// Whether `plan` is legal
    #[must_use]
    pub fn is_legal(&self, plan: &StudyPlan) -> bool {
        self.check(plan).is_empty()
    }

    /// Earliest/latest semester bounds for each movable unit when finishing by `target`
    ///
    /// # Errors
    /// Returns an error if the planned units have cyclic prerequisites
    pub fn bounds(&self, plan: &StudyPlan, target: Semester) -> Result<PlanBounds, BoundsError> {
        BoundsOptimizer::bound_units_in_plan(
            plan,
            self.catalog,
            self.current_semester,
            target,
            self.max_units_per_semester,
        )
    }

    /// Try to produce a legal plan containing the same units that finishes by `target`.
    ///
    /// Returns the plan unchanged when it is already legal and finishes in
    /// time, a rescheduled plan when one exists, and `None` otherwise
    /// (including when `target` is before the current semester).
    #[must_use]
    pub fn try_to_complete_by(&self, target: Semester, plan: &StudyPlan) -> Option<StudyPlan> {
        if target < self.current_semester {
            debug!(
                "Target {target} is before the current semester {}",
                self.current_semester
            );
            return None;
        }

        let finishes_in_time = !matches!(plan.last_semester(), Some(last) if last > target);
        if finishes_in_time && self.is_legal(plan) {
            debug!("Plan already completes by {target}");
            return Some(plan.clone());
        }

        let bounds = match self.bounds(plan, target) {
            Ok(bounds) => bounds,
            Err(e) => {
                warn!("Cannot bound plan: {e}");
                return None;
            }
        };

        if !bounds.is_feasible() {
            debug!(
                "No placement by {target} for: {}",
                bounds.unschedulable().join(", ")
            );
            return None;
        }

        let Some(mut search) = ScheduleSearch::new(
            plan,
            self.catalog,
            &bounds,
            self.current_semester,
            self.max_units_per_semester,
            self.search_step_limit,
        ) else {
            warn!("Planned units have cyclic prerequisites");
            return None;
        };

        let outcome = search.run();
        debug!(
            "Search for {target} finished after {} placements",
            search.steps()
        );

        match outcome {
            SearchOutcome::Found(found) => {
                info!("Found a plan completing by {target}");
                Some(found)
            }
            SearchOutcome::Exhausted => None,
            SearchOutcome::LimitReached => {
                warn!(
                    "Gave up searching for a plan completing by {target} after {} placements",
                    self.search_step_limit
                );
                None
            }
        }
    }

    /// Lazily produce plans that each finish at least one semester earlier than the last
    #[must_use]
    pub fn try_to_improve_schedule(&self, plan: &StudyPlan) -> ImprovedSchedules<'_, 'a> {
        ImprovedSchedules {
            wizard: self,
            plan: plan.clone(),
            done: false,
        }
    }
}

/// Iterator returned by [`SchedulingWizard::try_to_improve_schedule`]
#[derive(Debug, Clone)]
pub struct ImprovedSchedules<'w, 'a> {
    wizard: &'w SchedulingWizard<'a>,
    plan: StudyPlan,
    done: bool,
}

impl Iterator for ImprovedSchedules<'_, '_> {
    type Item = StudyPlan;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let target = match self.plan.last_semester() {
            Some(last) if last > self.wizard.current_semester => last.previous(),
            _ => {
                self.done = true;
                return None;
            }
        };

        if let Some(improved) = self.wizard.try_to_complete_by(target, &self.plan) {
            self.plan = improved.clone();
            Some(improved)
        } else {
            self.done = true;
            None
        }
    }
}

impl FusedIterator for ImprovedSchedules<'_, '_> {}
