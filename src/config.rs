use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::{
    is_allowed_amount, DEFAULT_AMOUNT_ML, DEFAULT_API_PORT, DEFAULT_DATABASE_FILE,
    DEFAULT_WEIGHT_KG, MIN_WEIGHT_KG,
};
use crate::error::DynError;

fn default_database() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_FILE)
}

fn default_weight_kg() -> f64 {
    DEFAULT_WEIGHT_KG
}

fn default_amount_ml() -> u32 {
    DEFAULT_AMOUNT_ML
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

/// Configuration file structure
///
/// Format:
/// ```toml
/// database = "/home/me/.local/share/drink_log/log.sqlite"
/// default_weight_kg = 72
/// default_amount_ml = 500
/// api_port = 3000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// SQLite file holding the drink log (default: drink_log.sqlite)
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// Body weight preselected on the form (default: 65)
    #[serde(default = "default_weight_kg")]
    pub default_weight_kg: f64,
    /// Volume preselected on the form (default: 350)
    #[serde(default = "default_amount_ml")]
    pub default_amount_ml: u32,
    /// HTTP API port for `serve` (default: 3000)
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            default_weight_kg: default_weight_kg(),
            default_amount_ml: default_amount_ml(),
            api_port: default_api_port(),
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, DynError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, DynError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;
        Self::from_toml_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e).into())
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, DynError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate the form defaults against what the form accepts
    pub fn validate(&self) -> Result<(), String> {
        if !self.default_weight_kg.is_finite() || self.default_weight_kg < MIN_WEIGHT_KG {
            return Err(format!(
                "default_weight_kg must be at least {}, got {}",
                MIN_WEIGHT_KG, self.default_weight_kg
            ));
        }
        if !is_allowed_amount(self.default_amount_ml) {
            return Err(format!(
                "default_amount_ml {} is not one of the offered volumes",
                self.default_amount_ml
            ));
        }
        Ok(())
    }
}
