//! Complete command handler
//!
//! Reschedules a plan to finish by a target semester and writes it out.

use super::{build_wizard, default_output, load_plan, semester_slug};
use study_planner::config::Config;
use study_planner::core::models::Semester;
use study_planner::core::planner::write_plan_file;
use study_planner::{error, info, verbose};
use std::path::Path;

/// Run the complete command.
///
/// # Errors
/// Returns a message when the target is invalid, no plan finishes in time,
/// or the result cannot be written
pub fn run(
    input_file: &Path,
    by: &str,
    output_file: Option<&Path>,
    config: &Config,
    current: Option<Semester>,
) -> Result<(), String> {
    let target: Semester = by
        .parse()
        .map_err(|e| format!("Invalid target semester '{by}': {e}"))?;

    let file = load_plan(input_file, config)?;
    let wizard = build_wizard(&file, config, current)?;

    verbose!(
        "Rescheduling {} to finish by {target} (current semester {})",
        file.name,
        wizard.current_semester()
    );

    let Some(plan) = wizard.try_to_complete_by(target, &file.plan) else {
        info!("No plan for {} finishes by {target}", file.name);
        return Err(format!("No legal plan for {} finishes by {target}", file.name));
    };

    let output = output_file.map_or_else(
        || {
            default_output(
                input_file,
                config,
                &format!("-by-{}", semester_slug(target)),
                "csv",
            )
        },
        Path::to_path_buf,
    );

    write_plan_file(&file.with_plan(plan.clone()), &output).map_err(|e| {
        error!("Failed to write {}: {e}", output.display());
        format!("Failed to write {}: {e}", output.display())
    })?;

    let last = plan
        .last_semester()
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    println!("✓ Plan finishing {last} written to {}", output.display());
    Ok(())
}
