//! Data models for the study planner

pub mod catalog;
pub mod plan;
pub mod prereq;
pub mod semester;
pub mod unit;

pub use catalog::UnitCatalog;
pub use plan::StudyPlan;
pub use prereq::{Prereq, PrereqParseError};
pub use semester::{Offering, Semester, SemesterParseError};
pub use unit::{Unit, UnitInPlan};

/// The semester treated as "now" unless configured otherwise
pub const DEFAULT_CURRENT_SEMESTER: Semester = Semester::new(2020, Offering::Semester1);
