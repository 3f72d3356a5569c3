//! Plan file loading and saving

pub mod csv_parser;

pub use csv_parser::{
    parse_plan_file, parse_plan_str, render_plan_file, write_plan_file, PlanFile, PlanFileError,
};
