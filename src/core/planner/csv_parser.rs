//! CSV parser for study plan files
//!
//! A plan file has a short metadata header followed by two sections:
//!
//! ```text
//! Plan,Bachelor of IT - Computer Science
//! Student,n1234567
//! Current Semester,2020/S1
//! Units
//! Code,Title,Credit Points,Offered,Prerequisites
//! CAB201,Programming Principles,12,S1;S2,
//! Study Plan
//! Code,Study Area,Semester
//! CAB201,IT Core,2020/S1
//! ```

use crate::core::models::{
    Offering, Prereq, PrereqParseError, Semester, SemesterParseError, StudyPlan, Unit,
    UnitCatalog, UnitInPlan,
};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;

const UNITS_SECTION: &str = "units";
const PLAN_SECTION: &str = "study plan";

/// Errors raised while reading or writing a plan file
#[derive(Debug, Error)]
pub enum PlanFileError {
    /// The file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The `Plan` metadata line is missing
    #[error("Missing Plan name")]
    MissingPlanName,

    /// A required section is missing
    #[error("No '{0}' section found")]
    MissingSection(&'static str),

    /// A section header row lacks a required column
    #[error("Section '{section}' is missing the '{column}' column")]
    MissingColumn {
        /// Section name
        section: &'static str,
        /// Column name
        column: &'static str,
    },

    /// A semester or offering value could not be parsed
    #[error("Line {line}: {source}")]
    Semester {
        /// 1-based line number
        line: usize,
        /// Underlying parse error
        source: SemesterParseError,
    },

    /// A prerequisite expression could not be parsed
    #[error("Line {line}: invalid prerequisites: {source}")]
    Prerequisite {
        /// 1-based line number
        line: usize,
        /// Underlying parse error
        source: PrereqParseError,
    },

    /// Credit points were not a whole number
    #[error("Line {line}: invalid credit points '{value}'")]
    CreditPoints {
        /// 1-based line number
        line: usize,
        /// Offending value
        value: String,
    },

    /// A row lacked a required value
    #[error("Line {line}: missing {field}")]
    MissingValue {
        /// 1-based line number
        line: usize,
        /// Field name
        field: &'static str,
    },

    /// The same unit code appears twice in the catalogue
    #[error("Line {line}: duplicate unit '{code}' in catalogue")]
    DuplicateUnit {
        /// 1-based line number
        line: usize,
        /// Unit code
        code: String,
    },

    /// A planned unit is not in the catalogue
    #[error("Line {line}: planned unit '{code}' is not in the catalogue")]
    UnknownUnit {
        /// 1-based line number
        line: usize,
        /// Unit code
        code: String,
    },
}

/// A parsed plan file
#[derive(Debug, Clone)]
pub struct PlanFile {
    /// Plan name
    pub name: String,
    /// Student identifier, if given
    pub student: Option<String>,
    /// Current semester declared by the file, if given
    pub current_semester: Option<Semester>,
    /// Units the plan may use
    pub catalog: UnitCatalog,
    /// The study plan itself
    pub plan: StudyPlan,
}

impl PlanFile {
    /// Copy of this file with a different study plan
    #[must_use]
    pub fn with_plan(&self, plan: StudyPlan) -> Self {
        Self {
            plan,
            ..self.clone()
        }
    }
}

/// Parse a plan file from disk
///
/// # Errors
/// Returns an error if the file cannot be read or its contents are invalid
pub fn parse_plan_file<P: AsRef<Path>>(path: P) -> Result<PlanFile, PlanFileError> {
    let content = fs::read_to_string(path)?;
    parse_plan_str(&content)
}

/// Parse plan file contents
///
/// # Errors
/// Returns an error describing the first invalid line or missing section
pub fn parse_plan_str(content: &str) -> Result<PlanFile, PlanFileError> {
    let lines: Vec<&str> = content.lines().collect();

    let units_start = find_section(&lines, UNITS_SECTION).ok_or(PlanFileError::MissingSection("Units"))?;
    let plan_start =
        find_section(&lines, PLAN_SECTION).ok_or(PlanFileError::MissingSection("Study Plan"))?;

    let (name, student, current_semester) = parse_metadata(&lines[..units_start.min(plan_start)])?;

    let units_end = if plan_start > units_start {
        plan_start
    } else {
        lines.len()
    };
    let plan_end = if units_start > plan_start {
        units_start
    } else {
        lines.len()
    };

    let catalog = parse_units(&lines, units_start, units_end)?;
    let plan = parse_plan_rows(&lines, plan_start, plan_end, &catalog)?;

    Ok(PlanFile {
        name,
        student,
        current_semester,
        catalog,
        plan,
    })
}

/// Index of the line that opens a section
fn find_section(lines: &[&str], section: &str) -> Option<usize> {
    lines.iter().position(|line| {
        parse_csv_line(line)
            .first()
            .is_some_and(|first| first.eq_ignore_ascii_case(section))
    })
}

fn parse_metadata(
    lines: &[&str],
) -> Result<(String, Option<String>, Option<Semester>), PlanFileError> {
    let mut name = String::new();
    let mut student = None;
    let mut current_semester = None;

    for (idx, line) in lines.iter().enumerate() {
        let fields = parse_csv_line(line);
        if fields.len() < 2 || fields[1].is_empty() {
            continue;
        }

        match fields[0].to_lowercase().as_str() {
            "plan" => name.clone_from(&fields[1]),
            "student" => student = Some(fields[1].clone()),
            "current semester" => {
                current_semester = Some(fields[1].parse().map_err(|source| {
                    PlanFileError::Semester {
                        line: idx + 1,
                        source,
                    }
                })?);
            }
            _ => {}
        }
    }

    if name.is_empty() {
        return Err(PlanFileError::MissingPlanName);
    }

    Ok((name, student, current_semester))
}

/// Column positions resolved from a section header row
struct Columns {
    headers: Vec<String>,
}

impl Columns {
    fn new(line: Option<&&str>) -> Self {
        Self {
            headers: line.map(|l| parse_csv_line(l)).unwrap_or_default(),
        }
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    fn require(&self, section: &'static str, column: &'static str) -> Result<usize, PlanFileError> {
        self.index(column)
            .ok_or(PlanFileError::MissingColumn { section, column })
    }
}

fn field(fields: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| fields.get(i)).map_or("", String::as_str)
}

fn parse_units(lines: &[&str], start: usize, end: usize) -> Result<UnitCatalog, PlanFileError> {
    let columns = Columns::new(lines.get(start + 1));
    let code_idx = columns.require("Units", "Code")?;
    let offered_idx = columns.require("Units", "Offered")?;
    let title_idx = columns.index("Title");
    let cp_idx = columns.index("Credit Points");
    let prereq_idx = columns.index("Prerequisites");

    let mut catalog = UnitCatalog::new();

    for (idx, line) in lines.iter().enumerate().take(end).skip(start + 2) {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let fields = parse_csv_line(line);

        let code = field(&fields, Some(code_idx)).to_ascii_uppercase();
        if code.is_empty() {
            return Err(PlanFileError::MissingValue {
                line: line_no,
                field: "unit code",
            });
        }

        let mut unit = Unit::new(code.clone(), field(&fields, title_idx).to_string());

        let cp = field(&fields, cp_idx);
        if !cp.is_empty() {
            unit.credit_points = cp.parse().map_err(|_| PlanFileError::CreditPoints {
                line: line_no,
                value: cp.to_string(),
            })?;
        }

        unit.offered = field(&fields, Some(offered_idx))
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<Offering>)
            .collect::<Result<_, _>>()
            .map_err(|source| PlanFileError::Semester {
                line: line_no,
                source,
            })?;

        unit.prerequisites = field(&fields, prereq_idx)
            .parse::<Prereq>()
            .map_err(|source| PlanFileError::Prerequisite {
                line: line_no,
                source,
            })?;

        if !catalog.add(unit) {
            return Err(PlanFileError::DuplicateUnit {
                line: line_no,
                code,
            });
        }
    }

    Ok(catalog)
}

fn parse_plan_rows(
    lines: &[&str],
    start: usize,
    end: usize,
    catalog: &UnitCatalog,
) -> Result<StudyPlan, PlanFileError> {
    let columns = Columns::new(lines.get(start + 1));
    let code_idx = columns.require("Study Plan", "Code")?;
    let semester_idx = columns.require("Study Plan", "Semester")?;
    let area_idx = columns.index("Study Area");

    let mut plan = StudyPlan::new();

    for (idx, line) in lines.iter().enumerate().take(end).skip(start + 2) {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let fields = parse_csv_line(line);

        let code = field(&fields, Some(code_idx)).to_ascii_uppercase();
        if code.is_empty() {
            return Err(PlanFileError::MissingValue {
                line: line_no,
                field: "unit code",
            });
        }
        if !catalog.contains(&code) {
            return Err(PlanFileError::UnknownUnit {
                line: line_no,
                code,
            });
        }

        let semester_text = field(&fields, Some(semester_idx));
        if semester_text.is_empty() {
            return Err(PlanFileError::MissingValue {
                line: line_no,
                field: "semester",
            });
        }
        let semester = semester_text
            .parse::<Semester>()
            .map_err(|source| PlanFileError::Semester {
                line: line_no,
                source,
            })?;

        plan.push(UnitInPlan::new(
            code,
            field(&fields, area_idx).to_string(),
            semester,
        ));
    }

    Ok(plan)
}

/// Split a CSV line into trimmed fields, honouring double-quoted fields
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Quote a field if it contains a delimiter
fn quote_field(value: &str) -> String {
    if value.contains([',', '"']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render a plan file in the same format [`parse_plan_str`] reads
#[must_use]
pub fn render_plan_file(file: &PlanFile) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Plan,{}", quote_field(&file.name));
    if let Some(student) = &file.student {
        let _ = writeln!(out, "Student,{}", quote_field(student));
    }
    if let Some(current) = file.current_semester {
        let _ = writeln!(out, "Current Semester,{current}");
    }

    out.push_str("Units\n");
    out.push_str("Code,Title,Credit Points,Offered,Prerequisites\n");
    for unit in file.catalog.iter() {
        let _ = writeln!(
            out,
            "{},{},{},{},{}",
            unit.code,
            quote_field(&unit.title),
            unit.credit_points,
            unit.offered_label(),
            quote_field(&unit.prerequisites.to_string())
        );
    }

    out.push_str("Study Plan\n");
    out.push_str("Code,Study Area,Semester\n");
    for placed in &file.plan {
        let _ = writeln!(
            out,
            "{},{},{}",
            placed.code,
            quote_field(&placed.study_area),
            placed.semester
        );
    }

    out
}

/// Write a plan file to disk
///
/// # Errors
/// Returns an error if the file cannot be written
pub fn write_plan_file<P: AsRef<Path>>(file: &PlanFile, path: P) -> Result<(), PlanFileError> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, render_plan_file(file))?;
    Ok(())
}
