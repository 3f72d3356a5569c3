//! Shared library for `study-planner`
//! Contains the plan models, scheduling wizard, configuration and logger used by the CLI

pub mod config;
pub mod core;
pub mod logger;

pub use core::get_version;
