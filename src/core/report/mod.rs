//! Report generation for study plans
//!
//! Renders a plan, its legality status and the bounds of each remaining unit.

pub mod formats;

use crate::core::models::{Semester, StudyPlan};
use crate::core::planner::PlanFile;
use crate::core::wizard::{PlanBounds, PlanViolation, SchedulingWizard};
use std::error::Error;
use std::path::Path;

pub use formats::{MarkdownReporter, ReportFormat};

/// Data context for report generation
///
/// Aggregates everything a report template needs so that generators do not
/// recompute legality or bounds themselves.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    /// Parsed plan file (name, student, catalogue)
    pub file: &'a PlanFile,
    /// Plan being reported (may differ from `file.plan` after rescheduling)
    pub plan: &'a StudyPlan,
    /// Current semester used for the checks
    pub current_semester: Semester,
    /// Legality violations in `plan`
    pub violations: Vec<PlanViolation>,
    /// Bounds of each remaining unit against the plan's own last semester
    pub bounds: Option<PlanBounds>,
}

impl<'a> ReportContext<'a> {
    /// Build a report context by checking and bounding `plan` with `wizard`
    #[must_use]
    pub fn new(file: &'a PlanFile, plan: &'a StudyPlan, wizard: &SchedulingWizard) -> Self {
        let bounds = plan
            .last_semester()
            .and_then(|last| wizard.bounds(plan, last.max(wizard.current_semester())).ok());

        Self {
            file,
            plan,
            current_semester: wizard.current_semester(),
            violations: wizard.check(plan),
            bounds,
        }
    }

    /// Student identifier or a placeholder
    #[must_use]
    pub fn student(&self) -> &str {
        self.file.student.as_deref().unwrap_or("-")
    }

    /// Total credit points of planned units
    #[must_use]
    pub fn total_credit_points(&self) -> u32 {
        self.plan
            .iter()
            .map(|u| self.file.catalog.credit_points(&u.code))
            .sum()
    }

    /// Whether the plan has no violations
    #[must_use]
    pub fn is_legal(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Generate a report to a file
    ///
    /// # Errors
    /// Returns an error if report generation or file writing fails
    fn generate(&self, ctx: &ReportContext, output_path: &Path) -> Result<(), Box<dyn Error>>;

    /// Generate report content as a string
    ///
    /// # Errors
    /// Returns an error if report generation fails
    fn render(&self, ctx: &ReportContext) -> Result<String, Box<dyn Error>>;
}
