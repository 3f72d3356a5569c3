//! Command-line interface entry point for `studyplan`

mod args;
mod commands;

use args::{Cli, Command};
use clap::Parser;
use study_planner::config::Config;
use study_planner::info;
use study_planner::logger::{enable_debug, enable_verbose, init_file_logging, set_level, Level};

fn main() {
    let args = Cli::parse();

    // Load configuration once at startup and apply CLI overrides to it
    let mut config = Config::load();
    let defaults = Config::from_defaults();
    config.apply_overrides(&args.to_config_overrides());

    // CLI flag overrides config; otherwise use config logging.level; fallback warn
    let mut level = args
        .log_level
        .map(Level::from)
        .or_else(|| config.logging.level.parse().ok())
        .unwrap_or(Level::Warn);

    if args.debug_flag || level == Level::Debug {
        level = Level::Debug;
        enable_debug();
    }

    let verbose = args.verbose || config.logging.verbose;
    if verbose {
        enable_verbose();
    }
    set_level(level);

    // CLI flag wins, otherwise use config logging.file if set
    let config_log_path: Option<std::path::PathBuf> = if config.logging.file.is_empty() {
        None
    } else {
        Some(std::path::PathBuf::from(&config.logging.file))
    };

    if let Some(log_path) = args.log_file.as_ref().or(config_log_path.as_ref()) {
        let display_path = log_path.to_string_lossy();
        if init_file_logging(log_path) {
            if verbose {
                eprintln!("✓ File logging initialized at: {display_path}");
            } else {
                info!("File logging initialized at: {display_path}");
            }
        } else {
            eprintln!("✗ Failed to initialize file logging at: {display_path}");
        }
    }

    // Per-run value, kept out of the stored config
    let current = args.current_semester;
    let result = match args.command {
        Command::Config { subcommand } => {
            // Edit the stored file, not the per-run overrides
            let mut stored = Config::load();
            commands::config::run(subcommand, &mut stored, &defaults)
        }
        Command::Check { input_file } => commands::check::run(&input_file, &config, current),
        Command::Complete {
            input_file,
            by,
            output,
        } => commands::complete::run(&input_file, &by, output.as_deref(), &config, current),
        Command::Improve {
            input_file,
            output,
            all,
        } => commands::improve::run(&input_file, output.as_deref(), all, &config, current),
        Command::Report {
            input_file,
            output,
            format,
        } => commands::report::run(&input_file, output.as_deref(), &format, &config, current),
    };

    if let Err(message) = result {
        eprintln!("✗ {message}");
        std::process::exit(1);
    }
}
