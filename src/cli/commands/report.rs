//! Report command handler

use super::{build_wizard, default_output, load_plan};
use study_planner::config::Config;
use study_planner::core::models::Semester;
use study_planner::core::report::{MarkdownReporter, ReportContext, ReportFormat, ReportGenerator};
use study_planner::{error, info};
use std::path::Path;

/// Run the report command.
///
/// # Errors
/// Returns a message when the format is unknown, the plan cannot be loaded,
/// or the report cannot be written
pub fn run(
    input_file: &Path,
    output_file: Option<&Path>,
    format_str: &str,
    config: &Config,
    current: Option<Semester>,
) -> Result<(), String> {
    let format: ReportFormat = format_str.parse()?;

    let file = load_plan(input_file, config)?;
    let wizard = build_wizard(&file, config, current)?;
    let ctx = ReportContext::new(&file, &file.plan, &wizard);

    let output = output_file.map_or_else(
        || default_output(input_file, config, "", format.extension()),
        Path::to_path_buf,
    );

    let reporter = match format {
        ReportFormat::Markdown => MarkdownReporter::new(),
    };
    reporter.generate(&ctx, &output).map_err(|e| {
        error!("Report generation failed for {}: {e}", input_file.display());
        format!("Failed to write report {}: {e}", output.display())
    })?;

    info!("Report written: {}", output.display());
    println!("✓ Report generated: {}", output.display());
    Ok(())
}
