//! Core module: plan models, plan files, scheduling and reporting

pub mod models;
pub mod planner;
pub mod report;
pub mod wizard;

/// Returns the current version of the `study-planner` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
