//! Configuration schema (sqlmagic.toml) and the OPTION command

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest grid window the host will render
pub const MIN_GRID_ROWS: usize = 5;

/// How plain query results are presented by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Plain table, limited to `maxrows`
    Table,

    /// Scrollable grid
    Grid,
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::Table
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "TABLE"),
            Self::Grid => write!(f, "GRID"),
        }
    }
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Maximum rows displayed (-1 = all)
    #[serde(default = "default_maxrows")]
    pub maxrows: i64,

    /// Visible rows of the grid display
    #[serde(default = "default_maxgrid")]
    pub maxgrid: usize,

    /// Seconds a statement is repeated for when timed with `-t`
    #[serde(default = "default_runtime")]
    pub runtime: u64,

    /// Result presentation
    #[serde(default)]
    pub display: DisplayMode,

    /// Macro libraries loaded when a session starts
    #[serde(default)]
    pub macros: Vec<PathBuf>,
}

fn default_maxrows() -> i64 {
    10
}

fn default_maxgrid() -> usize {
    MIN_GRID_ROWS
}

fn default_runtime() -> u64 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            maxrows: default_maxrows(),
            maxgrid: default_maxgrid(),
            runtime: default_runtime(),
            display: DisplayMode::default(),
            macros: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    ///
    /// `runtime` and `maxgrid` are per-session values and are reset to their
    /// defaults. Relative macro paths resolve against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut settings = Self::from_toml(&contents)?;
        settings.runtime = default_runtime();
        settings.maxgrid = default_maxgrid();

        if let Some(parent) = path.parent() {
            settings.macros = settings
                .macros
                .into_iter()
                .map(|p| if p.is_relative() { parent.join(p) } else { p })
                .collect();
        }

        Ok(settings)
    }

    /// Load settings from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save settings to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Apply the arguments of an OPTION command
    ///
    /// Keywords are case-insensitive: `MAXROWS n`, `MAXGRID n`, `RUNTIME n`,
    /// `DISPLAY GRID|PANDAS|TABLE` and `LIST`. An invalid value is reported and
    /// skipped; a keyword without a value stops parsing. Unknown tokens are
    /// ignored.
    pub fn apply_options(&mut self, text: &str) -> OptionsOutcome {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut outcome = OptionsOutcome::default();
        let mut i = 0;

        while i < tokens.len() {
            let keyword = tokens[i].to_uppercase();
            let value = tokens.get(i + 1).copied();

            match keyword.as_str() {
                "MAXROWS" | "MAXGRID" | "RUNTIME" | "DISPLAY" => {
                    let Some(value) = value else {
                        outcome.errors.push(ConfigError::MissingValue(keyword));
                        return outcome;
                    };
                    if let Err(e) = self.set_option(&keyword, value) {
                        outcome.errors.push(e);
                    } else {
                        outcome.changed = true;
                    }
                    i += 2;
                }
                "LIST" => {
                    outcome.listing = Some(self.listing());
                    return outcome;
                }
                _ => i += 1,
            }
        }

        outcome
    }

    fn set_option(&mut self, keyword: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            option: keyword.to_string(),
            value: value.to_string(),
        };

        match keyword {
            "MAXROWS" => self.maxrows = value.parse().map_err(|_| invalid())?,
            "MAXGRID" => {
                let rows: usize = value.parse().map_err(|_| invalid())?;
                self.maxgrid = rows.max(MIN_GRID_ROWS);
            }
            "RUNTIME" => self.runtime = value.parse().map_err(|_| invalid())?,
            "DISPLAY" => {
                self.display = match value.to_uppercase().as_str() {
                    "GRID" => DisplayMode::Grid,
                    "PANDAS" | "TABLE" => DisplayMode::Table,
                    _ => return Err(invalid()),
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Human-readable listing of the current settings
    pub fn listing(&self) -> String {
        format!(
            "(MAXROWS) Maximum number of rows displayed: {}\n\
             (MAXGRID) Maximum grid display size: {}\n\
             (RUNTIME) How many seconds to run a statement for performance testing: {}\n\
             (DISPLAY) Use TABLE or GRID display format for output: {}",
            self.maxrows, self.maxgrid, self.runtime, self.display
        )
    }
}

/// Result of applying an OPTION command
#[derive(Debug, Default)]
pub struct OptionsOutcome {
    /// At least one setting changed
    pub changed: bool,

    /// Listing requested with LIST
    pub listing: Option<String>,

    /// Problems found while parsing
    pub errors: Vec<ConfigError>,
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("No value provided for the {0} option.")]
    MissingValue(String),

    #[error("Invalid {option} value provided: {value}")]
    InvalidValue { option: String, value: String },
}
