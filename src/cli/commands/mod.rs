//! CLI command handlers for `studyplan`.
//!
//! Each command is implemented in its own submodule. Plan commands return
//! `Err(message)` on failure and `main` exits non-zero.

pub mod check;
pub mod complete;
pub mod config;
pub mod improve;
pub mod report;

use study_planner::config::Config;
use study_planner::core::models::Semester;
use study_planner::core::planner::{parse_plan_file, PlanFile};
use study_planner::core::wizard::SchedulingWizard;
use study_planner::{error, info};
use std::path::{Path, PathBuf};

/// Resolve a plan path, falling back to the configured plans directory
///
/// A path that exists as given is used unchanged. A relative path that does
/// not exist is looked up in `paths.plans_dir`.
pub fn resolve_input(input_file: &Path, config: &Config) -> PathBuf {
    if input_file.exists() || input_file.is_absolute() || config.paths.plans_dir.is_empty() {
        return input_file.to_path_buf();
    }
    let candidate = Path::new(&config.paths.plans_dir).join(input_file);
    if candidate.exists() {
        candidate
    } else {
        input_file.to_path_buf()
    }
}

/// Load a plan file, logging the outcome
pub fn load_plan(input_file: &Path, config: &Config) -> Result<PlanFile, String> {
    let path = resolve_input(input_file, config);
    let file = parse_plan_file(&path).map_err(|e| {
        error!("Failed to load plan {}: {e}", path.display());
        format!("Failed to load {}: {e}", path.display())
    })?;
    info!(
        "Plan loaded: {} ({} units in catalogue, {} planned)",
        path.display(),
        file.catalog.len(),
        file.plan.len()
    );
    Ok(file)
}

/// Current semester for a plan
///
/// `--current-semester` wins, then the file's own `Current Semester` line,
/// then `planning.current_semester` from configuration.
pub fn current_semester(
    file: &PlanFile,
    config: &Config,
    from_cli: Option<Semester>,
) -> Result<Semester, String> {
    if let Some(current) = from_cli.or(file.current_semester) {
        return Ok(current);
    }
    config
        .current_semester()
        .map_err(|e| format!("Invalid current semester in configuration: {e}"))
}

/// Build a wizard for `file` using configured limits
pub fn build_wizard<'a>(
    file: &'a PlanFile,
    config: &Config,
    from_cli: Option<Semester>,
) -> Result<SchedulingWizard<'a>, String> {
    let current = current_semester(file, config, from_cli)?;
    Ok(SchedulingWizard::new(&file.catalog)
        .with_current_semester(current)
        .with_max_units_per_semester(config.max_units_per_semester())
        .with_search_step_limit(config.search_step_limit()))
}

/// Semester formatted for use in a file name (e.g., `2021-S2`)
pub fn semester_slug(semester: Semester) -> String {
    semester.to_string().replace('/', "-")
}

/// Default output path: `<out_dir>/<input stem><suffix>.<extension>`
///
/// Falls back to the input file's directory when `out_dir` is unset.
pub fn default_output(input_file: &Path, config: &Config, suffix: &str, extension: &str) -> PathBuf {
    let stem = input_file
        .file_stem()
        .map_or_else(|| "plan".to_string(), |s| s.to_string_lossy().to_string());
    let dir = if config.paths.out_dir.is_empty() {
        input_file
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf)
    } else {
        PathBuf::from(&config.paths.out_dir)
    };
    dir.join(format!("{stem}{suffix}.{extension}"))
}
