//! Configuration management for smartcsv.
//!
//! Handles:
//! - Command-line argument parsing
//! - Project configuration (`.smartcsv.toml`)
//! - Rule file resolution against rule directories

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration file
pub const PROJECT_CONFIG_FILE: &str = ".smartcsv.toml";

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "smartcsv")]
#[command(about = "Validate and edit CSV files against column rules")]
#[command(version)]
pub struct Args {
    /// CSV file to open
    pub file: PathBuf,

    /// Rule file to validate against
    #[arg(long, help = "Rule file (path, or name looked up in the rule directories)")]
    pub rules: Option<String>,

    /// Extra directory to search for rule files
    #[arg(long, help = "Directory containing rule files")]
    pub rules_dir: Option<PathBuf>,

    /// Field delimiter
    #[arg(long, help = "Field delimiter (single character)")]
    pub delimiter: Option<char>,

    /// Cell edits to apply after loading
    #[arg(long = "set", value_name = "ROW:COLUMN=VALUE", help = "Edit a cell, e.g. 0:age=9")]
    pub edits: Vec<String>,

    /// Where to save the document after edits
    #[arg(long, short, help = "Save the document to this path")]
    pub output: Option<PathBuf>,

    /// Keep running and revalidate when the rule file changes
    #[arg(long)]
    pub watch: bool,

    /// Log level
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Contents of `.smartcsv.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProjectConfig {
    pub rules: Option<String>,
    pub delimiter: Option<char>,
}

/// A single `--set ROW:COLUMN=VALUE` edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub row: usize,
    pub column: String,
    pub value: String,
}

impl std::str::FromStr for CellEdit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (target, value) = s
            .split_once('=')
            .with_context(|| format!("Edit '{}' is missing '='", s))?;
        let (row, column) = target
            .split_once(':')
            .with_context(|| format!("Edit '{}' is missing ':' between row and column", s))?;
        let row = row
            .trim()
            .parse()
            .with_context(|| format!("Edit '{}' has an invalid row number", s))?;
        if column.is_empty() {
            bail!("Edit '{}' has an empty column name", s);
        }

        Ok(Self {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub file: PathBuf,
    /// Rule file named on the command line
    pub cli_rules: Option<String>,
    /// Rule file named in the project configuration
    pub project_rules: Option<String>,
    /// Path of the project configuration, if one was found
    pub project_config_path: Option<PathBuf>,
    /// Directories searched for rule files given by name
    pub rules_dirs: Vec<PathBuf>,
    pub delimiter: u8,
    pub edits: Vec<CellEdit>,
    pub output: Option<PathBuf>,
    pub watch: bool,
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::from_args(Args::parse(), &cwd)
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args, cwd: &Path) -> Result<Self> {
        let project_config_path = find_project_config(cwd);
        let project = match &project_config_path {
            Some(path) => load_project_config(path)?,
            None => ProjectConfig::default(),
        };

        // Determine rule directories
        let mut rules_dirs = Vec::new();
        if let Some(custom_dir) = args.rules_dir {
            rules_dirs.push(custom_dir);
        }
        if let Some(project_dir) = project_config_path.as_ref().and_then(|p| p.parent()) {
            rules_dirs.push(project_dir.to_path_buf());
        }
        if let Some(config_dir) = dirs::config_dir() {
            rules_dirs.push(config_dir.join("smartcsv").join("rules"));
        }

        let delimiter = args.delimiter.or(project.delimiter).unwrap_or(',');
        if !delimiter.is_ascii() {
            bail!("Delimiter '{}' must be a single ASCII character", delimiter);
        }

        let edits = args
            .edits
            .iter()
            .map(|e| e.parse())
            .collect::<Result<Vec<CellEdit>>>()?;

        Ok(Config {
            file: args.file,
            cli_rules: args.rules,
            project_rules: project.rules,
            project_config_path,
            rules_dirs,
            delimiter: delimiter as u8,
            edits,
            output: args.output,
            watch: args.watch,
            log_level: args.log_level,
        })
    }

    /// Rule file to use: command line first, then project configuration.
    pub fn get_effective_rules(&self) -> Option<&str> {
        self.cli_rules.as_deref().or(self.project_rules.as_deref())
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }

    /// Resolve the effective rule file to a path on disk.
    ///
    /// An existing path is used as is; otherwise the name is looked up as
    /// `<name>`, `<name>.json` or `<name>.toml` in each rule directory.
    pub fn resolve_rules_path(&self) -> Result<Option<PathBuf>> {
        let Some(rules) = self.get_effective_rules() else {
            return Ok(None);
        };

        let direct = PathBuf::from(rules);
        if direct.is_file() {
            return Ok(Some(direct));
        }

        for dir in &self.rules_dirs {
            for candidate in [
                dir.join(rules),
                dir.join(format!("{}.json", rules)),
                dir.join(format!("{}.toml", rules)),
            ] {
                if candidate.is_file() {
                    log::debug!("Resolved rules '{}' to {}", rules, candidate.display());
                    return Ok(Some(candidate));
                }
            }
        }

        bail!("Rule file '{}' not found", rules)
    }
}

/// Look for `.smartcsv.toml` in `start` and its ancestors.
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project config: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse project config: {}", path.display()))
}
