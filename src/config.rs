//! Configuration module for `study-planner`

use crate::core::models::{Semester, SemesterParseError, DEFAULT_CURRENT_SEMESTER};
use crate::core::wizard::{DEFAULT_MAX_UNITS_PER_SEMESTER, DEFAULT_SEARCH_STEP_LIMIT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Placeholder expanded to the config directory
const DIR_VARIABLE: &str = "$STUDY_PLANNER";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Planning configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Semester treated as "now" (e.g., "2020/S1")
    #[serde(default)]
    pub current_semester: String,
    /// Maximum units in one semester (0 = use default)
    #[serde(default)]
    pub max_units_per_semester: usize,
    /// Candidate placements tried before a search gives up (0 = use default)
    #[serde(default)]
    pub search_step_limit: usize,
}

/// Paths configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory plan files are looked up in when a relative name does not exist
    #[serde(default)]
    pub plans_dir: String,
    /// Directory for rescheduled plans and reports
    #[serde(default)]
    pub out_dir: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Planning settings
    #[serde(default)]
    pub planning: PlanningConfig,
    /// Path settings
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override maximum units per semester
    pub max_units: Option<usize>,
    /// Override output directory
    pub out_dir: Option<String>,
}

impl Config {
    /// Get the `$STUDY_PLANNER` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/studyplanner`
    /// - macOS: `~/Library/Application Support/studyplanner`
    /// - Windows: `%APPDATA%\studyplanner`
    #[must_use]
    pub fn get_studyplanner_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studyplanner")
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Only fields that are empty (or zero) here and set in `defaults` are
    /// updated, so upgrading adds new settings without touching existing ones.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    #[allow(clippy::useless_let_if_seq)]
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;

        if self.logging.level.is_empty() && !defaults.logging.level.is_empty() {
            self.logging.level.clone_from(&defaults.logging.level);
            changed = true;
        }
        if self.logging.file.is_empty() && !defaults.logging.file.is_empty() {
            self.logging.file.clone_from(&defaults.logging.file);
            changed = true;
        }

        if self.planning.current_semester.is_empty()
            && !defaults.planning.current_semester.is_empty()
        {
            self.planning
                .current_semester
                .clone_from(&defaults.planning.current_semester);
            changed = true;
        }
        if self.planning.max_units_per_semester == 0 && defaults.planning.max_units_per_semester != 0
        {
            self.planning.max_units_per_semester = defaults.planning.max_units_per_semester;
            changed = true;
        }
        if self.planning.search_step_limit == 0 && defaults.planning.search_step_limit != 0 {
            self.planning.search_step_limit = defaults.planning.search_step_limit;
            changed = true;
        }

        if self.paths.plans_dir.is_empty() && !defaults.paths.plans_dir.is_empty() {
            self.paths.plans_dir.clone_from(&defaults.paths.plans_dir);
            changed = true;
        }
        if self.paths.out_dir.is_empty() && !defaults.paths.out_dir.is_empty() {
            self.paths.out_dir.clone_from(&defaults.paths.out_dir);
            changed = true;
        }

        changed
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Overrides last for this run only; the configuration file is untouched.
    /// Only non-`None` values replace config values.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }

        if let Some(max_units) = overrides.max_units {
            self.planning.max_units_per_semester = max_units;
        }

        if let Some(out_dir) = &overrides.out_dir {
            self.paths.out_dir.clone_from(out_dir);
        }
    }

    /// Get the user config file path
    ///
    /// `config.toml` for release builds, `dconfig.toml` for debug builds, in
    /// the directory returned by [`get_studyplanner_dir`](Self::get_studyplanner_dir).
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_studyplanner_dir().join(CONFIG_FILE_NAME)
    }

    /// Expand `$STUDY_PLANNER` in a string to the config directory
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let app_dir = Self::get_studyplanner_dir();
            value.replace(DIR_VARIABLE, app_dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Missing fields take their serde defaults (empty strings, zero, false).
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        config.logging.file = Self::expand_variables(&config.logging.file);
        config.paths.plans_dir = Self::expand_variables(&config.paths.plans_dir);
        config.paths.out_dir = Self::expand_variables(&config.paths.out_dir);

        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from the user config file, or create it from defaults on first run
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_file_path())
    }

    /// Load configuration from `config_file`, or create it from defaults if missing
    ///
    /// Falls back to defaults if the file exists but cannot be read or parsed.
    #[must_use]
    pub fn load_from(config_file: &Path) -> Self {
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save_to(config_file);
                    }
                    return config;
                }
            }
        } else {
            let _ = defaults.save_to(config_file);
            return defaults;
        }

        defaults
    }

    /// Save configuration to the user config file
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file cannot be written
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::get_config_file_path())
    }

    /// Save configuration to `config_file`
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file cannot be written
    pub fn save_to(&self, config_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(config_file, toml_str)?;
        Ok(())
    }

    /// The configured current semester, or the built-in default when unset
    ///
    /// # Errors
    /// Returns an error if the configured value is not a valid semester
    pub fn current_semester(&self) -> Result<Semester, SemesterParseError> {
        if self.planning.current_semester.is_empty() {
            Ok(DEFAULT_CURRENT_SEMESTER)
        } else {
            self.planning.current_semester.parse()
        }
    }

    /// Maximum units per semester, or the built-in default when unset
    #[must_use]
    pub const fn max_units_per_semester(&self) -> usize {
        if self.planning.max_units_per_semester == 0 {
            DEFAULT_MAX_UNITS_PER_SEMESTER
        } else {
            self.planning.max_units_per_semester
        }
    }

    /// Search step limit, or the built-in default when unset
    #[must_use]
    pub const fn search_step_limit(&self) -> usize {
        if self.planning.search_step_limit == 0 {
            DEFAULT_SEARCH_STEP_LIMIT
        } else {
            self.planning.search_step_limit
        }
    }

    /// Get a configuration value by key
    ///
    /// Supported keys: `level`, `file`, `verbose`, `current_semester`,
    /// `max_units`, `search_step_limit`, `plans_dir`, `out_dir`
    /// (dashed spellings are accepted too).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "level" => Some(self.logging.level.clone()),
            "file" => Some(self.logging.file.clone()),
            "verbose" => Some(self.logging.verbose.to_string()),
            "current_semester" | "current-semester" => {
                Some(self.planning.current_semester.clone())
            }
            "max_units" | "max-units" => Some(self.planning.max_units_per_semester.to_string()),
            "search_step_limit" | "search-step-limit" => {
                Some(self.planning.search_step_limit.to_string())
            }
            "plans_dir" | "plans-dir" => Some(self.paths.plans_dir.clone()),
            "out_dir" | "out-dir" => Some(self.paths.out_dir.clone()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// Updates the in-memory config; call [`save()`](Config::save) to persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value is invalid for it
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "level" => {
                value
                    .parse::<crate::logger::Level>()
                    .map_err(|e| format!("Invalid value for 'level': {e}"))?;
                self.logging.level = value.to_ascii_lowercase();
            }
            "file" => self.logging.file = value.to_string(),
            "verbose" => {
                self.logging.verbose = value
                    .parse::<bool>()
                    .map_err(|_| format!("Invalid boolean value for 'verbose': '{value}'"))?;
            }
            "current_semester" | "current-semester" => {
                let semester = value
                    .parse::<Semester>()
                    .map_err(|e| format!("Invalid value for 'current_semester': {e}"))?;
                self.planning.current_semester = semester.to_string();
            }
            "max_units" | "max-units" => {
                self.planning.max_units_per_semester = parse_positive(key, value)?;
            }
            "search_step_limit" | "search-step-limit" => {
                self.planning.search_step_limit = parse_positive(key, value)?;
            }
            "plans_dir" | "plans-dir" => self.paths.plans_dir = value.to_string(),
            "out_dir" | "out-dir" => self.paths.out_dir = value.to_string(),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to default)
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match key {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "current_semester" | "current-semester" => self
                .planning
                .current_semester
                .clone_from(&defaults.planning.current_semester),
            "max_units" | "max-units" => {
                self.planning.max_units_per_semester = defaults.planning.max_units_per_semester;
            }
            "search_step_limit" | "search-step-limit" => {
                self.planning.search_step_limit = defaults.planning.search_step_limit;
            }
            "plans_dir" | "plans-dir" => self.paths.plans_dir.clone_from(&defaults.paths.plans_dir),
            "out_dir" | "out-dir" => self.paths.out_dir.clone_from(&defaults.paths.out_dir),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset all configuration to defaults by deleting the config file
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be deleted
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!(
            "Invalid value for '{key}': '{value}' (expected a positive whole number)"
        )),
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[planning]")?;
        writeln!(
            f,
            "  current_semester = \"{}\"",
            self.planning.current_semester
        )?;
        writeln!(
            f,
            "  max_units_per_semester = {}",
            self.planning.max_units_per_semester
        )?;
        writeln!(
            f,
            "  search_step_limit = {}",
            self.planning.search_step_limit
        )?;

        writeln!(f, "\n[paths]")?;
        writeln!(f, "  plans_dir = \"{}\"", self.paths.plans_dir)?;
        writeln!(f, "  out_dir = \"{}\"", self.paths.out_dir)?;

        Ok(())
    }
}
