//! Markdown report generator
//!
//! Renders a study plan as Markdown tables that display well on GitHub,
//! GitLab and in VS Code.

use crate::core::report::{ReportContext, ReportGenerator};
use std::error::Error;
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// Embedded Markdown report template
const MARKDOWN_TEMPLATE: &str = include_str!("../templates/plan_report.md");

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Create a new Markdown reporter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Render the report using template substitution
    ///
    /// Placeholders are expanded in one pass over the template, so plan text
    /// that happens to contain `{{...}}` is written out literally.
    #[allow(clippy::unused_self)]
    fn render_template(&self, ctx: &ReportContext) -> String {
        let last = ctx
            .plan
            .last_semester()
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        let status = if ctx.is_legal() { "Legal" } else { "Not legal" };

        fill_template(MARKDOWN_TEMPLATE, |key| {
            let value = match key {
                "plan_name" => ctx.file.name.clone(),
                "student" => escape_cell(ctx.student()),
                "current_semester" => ctx.current_semester.to_string(),
                "unit_count" => ctx.plan.len().to_string(),
                "total_credit_points" => ctx.total_credit_points().to_string(),
                "last_semester" => last.clone(),
                "status" => status.to_string(),
                "violations" => Self::generate_violations(ctx),
                "schedule" => Self::generate_schedule_table(ctx),
                "bounds" => Self::generate_bounds_table(ctx),
                _ => return None,
            };
            Some(value)
        })
    }

    fn generate_violations(ctx: &ReportContext) -> String {
        if ctx.violations.is_empty() {
            return "None.\n".to_string();
        }

        let mut list = String::new();
        for violation in &ctx.violations {
            let _ = writeln!(list, "- {violation}");
        }
        list
    }

    /// Generate the semester-by-semester schedule table
    fn generate_schedule_table(ctx: &ReportContext) -> String {
        let mut table = String::new();

        table.push_str("| Semester | Unit | Title | Study Area | Credit Points |\n");
        table.push_str("|---|---|---|---|---|\n");

        for semester in ctx.plan.semesters() {
            let mut units: Vec<_> = ctx.plan.units_in(semester).collect();
            units.sort_by(|a, b| a.code.cmp(&b.code));

            for placed in units {
                let (title, cp) = ctx
                    .file
                    .catalog
                    .get(&placed.code)
                    .map_or(("", 0), |u| (u.title.as_str(), u.credit_points));
                let marker = if semester < ctx.current_semester {
                    " (completed)"
                } else {
                    ""
                };

                let _ = writeln!(
                    table,
                    "| {semester}{marker} | {} | {} | {} | {cp} |",
                    escape_cell(&placed.code),
                    escape_cell(title),
                    escape_cell(&placed.study_area)
                );
            }
        }

        table
    }

    /// Generate the per-unit bounds table
    fn generate_bounds_table(ctx: &ReportContext) -> String {
        let Some(bounds) = &ctx.bounds else {
            return "No remaining units.\n".to_string();
        };
        if bounds.is_empty() {
            return "No remaining units.\n".to_string();
        }

        let mut table = String::new();
        table.push_str("| Unit | Planned | Earliest | Latest |\n");
        table.push_str("|---|---|---|---|\n");

        let show = |s: Option<crate::core::models::Semester>| {
            s.map_or_else(|| "none".to_string(), |s| s.to_string())
        };

        for (code, unit_bounds) in bounds.iter() {
            let _ = writeln!(
                table,
                "| {} | {} | {} | {} |",
                escape_cell(code),
                show(ctx.plan.semester_of(code)),
                show(unit_bounds.earliest),
                show(unit_bounds.latest)
            );
        }

        table
    }
}

/// Replace each `{{key}}` in `template` with `value(key)`
///
/// Unknown keys and an unterminated `{{` are copied through unchanged.
fn fill_template(template: &str, value: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            rest = &rest[open..];
            break;
        };

        let key = &after[..close];
        match value(key) {
            Some(v) => out.push_str(&v),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[close + 2..];
    }

    out.push_str(rest);
    out
}

/// Escape text for a Markdown table cell
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for MarkdownReporter {
    fn generate(&self, ctx: &ReportContext, output_path: &Path) -> Result<(), Box<dyn Error>> {
        let content = self.render(ctx)?;
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, content)?;
        Ok(())
    }

    fn render(&self, ctx: &ReportContext) -> Result<String, Box<dyn Error>> {
        Ok(self.render_template(ctx))
    }
}
