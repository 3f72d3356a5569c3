//! Config command handler
//!
//! Reads and edits the stored configuration file. Per-run flags such as
//! `--max-units` never reach this handler.

use crate::args::ConfigSubcommand;
use study_planner::config::Config;
use study_planner::info;
use std::io::{self, BufRead, Write};

/// Run a config subcommand against the stored configuration.
///
/// # Errors
/// Returns a message for unknown keys, invalid values, a failed save, or a
/// cancelled reset
pub fn run(
    subcommand: Option<ConfigSubcommand>,
    stored: &mut Config,
    defaults: &Config,
) -> Result<(), String> {
    match subcommand {
        None | Some(ConfigSubcommand::Get { key: None }) => {
            println!(
                "\n=== Configuration ({}) ===\n",
                Config::get_config_file_path().display()
            );
            print!("{stored}");
        }
        Some(ConfigSubcommand::Get { key: Some(key) }) => {
            println!("{}", lookup(stored, &key)?);
        }
        Some(ConfigSubcommand::Set { key, value }) => {
            stored.set(&key, &value)?;
            persist(stored)?;
            // Echo the normalised value, e.g. `2022 summer` becomes `2022/SUM`
            let shown = stored.get(&key).unwrap_or(value);
            println!("✓ {key} = {shown}");
        }
        Some(ConfigSubcommand::Unset { key }) => {
            stored.unset(&key, defaults)?;
            persist(stored)?;
            println!("✓ {key} restored to its default");
        }
        Some(ConfigSubcommand::Reset) => {
            let stdin = io::stdin();
            reset(stdin.lock(), &mut io::stdout())?;
        }
    }
    Ok(())
}

fn lookup(config: &Config, key: &str) -> Result<String, String> {
    config
        .get(key)
        .ok_or_else(|| format!("Unknown config key '{key}'"))
}

fn persist(config: &Config) -> Result<(), String> {
    let path = Config::get_config_file_path();
    config
        .save()
        .map_err(|e| format!("Could not save {}: {e}", path.display()))?;
    info!("Config saved: {}", path.display());
    Ok(())
}

fn reset(input: impl BufRead, out: &mut impl Write) -> Result<(), String> {
    let path = Config::get_config_file_path();
    if !path.exists() {
        println!("✓ No config file at {}, built-in defaults apply", path.display());
        return Ok(());
    }

    if !confirm(
        &format!("Delete {} and return to built-in defaults? [y/N] ", path.display()),
        input,
        out,
    ) {
        return Err("Reset cancelled, config file kept".to_string());
    }

    Config::reset().map_err(|e| format!("Could not delete {}: {e}", path.display()))?;
    info!("Config file removed: {}", path.display());
    println!("✓ Config reset to built-in defaults");
    Ok(())
}

/// Print `question` and read one answer; only `y`/`yes` confirm
fn confirm(question: &str, mut input: impl BufRead, out: &mut impl Write) -> bool {
    let _ = write!(out, "{question}");
    let _ = out.flush();

    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
