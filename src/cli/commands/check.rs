//! Check command handler

use super::{build_wizard, load_plan};
use study_planner::config::Config;
use study_planner::core::models::Semester;
use study_planner::{info, verbose, warn};
use std::path::Path;

/// Check a plan and print every violation.
///
/// # Errors
/// Returns a message when the plan cannot be loaded or is not legal
pub fn run(input_file: &Path, config: &Config, current: Option<Semester>) -> Result<(), String> {
    let file = load_plan(input_file, config)?;
    let wizard = build_wizard(&file, config, current)?;

    verbose!(
        "Checking {} against {} (max {} units per semester)",
        file.name,
        wizard.current_semester(),
        wizard.max_units_per_semester()
    );

    let violations = wizard.check(&file.plan);
    if violations.is_empty() {
        info!("Plan {} is legal", file.name);
        let last = file
            .plan
            .last_semester()
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        println!("✓ {} is legal (finishes {last})", file.name);
        return Ok(());
    }

    warn!(
        "Plan {} has {} violation(s)",
        file.name,
        violations.len()
    );
    for violation in &violations {
        println!("  - {violation}");
    }
    Err(format!(
        "{} is not legal: {} violation(s)",
        file.name,
        violations.len()
    ))
}
