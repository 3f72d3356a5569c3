//! Improve command handler
//!
//! Walks the sequence of progressively shorter plans and writes the best one,
//! or all of them.

use super::{build_wizard, default_output, load_plan};
use study_planner::config::Config;
use study_planner::core::models::Semester;
use study_planner::core::planner::{write_plan_file, PlanFile};
use study_planner::core::wizard::PlanViolation;
use study_planner::{error, info, verbose};
use std::path::{Path, PathBuf};

/// Run the improve command.
///
/// # Errors
/// Returns a message when the plan cannot be loaded or a result cannot be written
pub fn run(
    input_file: &Path,
    output_file: Option<&Path>,
    all: bool,
    config: &Config,
    current: Option<Semester>,
) -> Result<(), String> {
    let file = load_plan(input_file, config)?;
    let wizard = build_wizard(&file, config, current)?;

    let start = file
        .plan
        .last_semester()
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    verbose!("Improving {} (currently finishes {start})", file.name);

    let base = output_file.map_or_else(
        || default_output(input_file, config, "-improved", "csv"),
        Path::to_path_buf,
    );

    let mut best = None;
    let mut found = 0usize;
    for plan in wizard.try_to_improve_schedule(&file.plan) {
        found += 1;
        let last = plan
            .last_semester()
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        verbose!("  #{found}: finishes {last}");

        if all {
            let output = numbered(&base, found);
            write(&file.with_plan(plan.clone()), &output)?;
            println!("✓ Plan finishing {last} written to {}", output.display());
        }
        best = Some(plan);
    }

    let Some(best) = best else {
        info!("No earlier plan found for {}", file.name);
        let violations = wizard.check(&file.plan);
        for violation in &violations {
            println!("  - {violation}");
        }
        println!("✓ {}", nothing_earlier(&file.name, &start, &violations)?);
        return Ok(());
    };

    info!("Found {found} improved plan(s) for {}", file.name);
    if !all {
        let last = best
            .last_semester()
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        write(&file.with_plan(best), &base)?;
        println!(
            "✓ Plan finishing {last} (was {start}) written to {}",
            base.display()
        );
    }
    Ok(())
}

/// Outcome when no earlier plan exists: fine for a legal plan, a failure otherwise
fn nothing_earlier(name: &str, start: &str, violations: &[PlanViolation]) -> Result<String, String> {
    if violations.is_empty() {
        return Ok(format!("{name} already finishes as early as possible ({start})"));
    }
    Err(format!(
        "{name} is not legal ({} violation(s)) and no legal plan finishes before {start}",
        violations.len()
    ))
}

fn write(file: &PlanFile, output: &Path) -> Result<(), String> {
    write_plan_file(file, output).map_err(|e| {
        error!("Failed to write {}: {e}", output.display());
        format!("Failed to write {}: {e}", output.display())
    })
}

/// `dir/name.csv` becomes `dir/name-<n>.csv`
fn numbered(base: &Path, n: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map_or_else(|| "plan".to_string(), |s| s.to_string_lossy().to_string());
    let name = base.extension().map_or_else(
        || format!("{stem}-{n}"),
        |ext| format!("{stem}-{n}.{}", ext.to_string_lossy()),
    );
    base.with_file_name(name)
}
