use crate::errors::{FormError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Method used when the form tag carries no `method` attribute.
    pub default_method: String,
    /// Fail on unnamed controls instead of skipping them.
    pub strict_names: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub query_key: String,
    pub body_key: String,
    pub file_channel: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_method: "get".to_string(),
            strict_names: false,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            query_key: "params".to_string(),
            body_key: "data".to_string(),
            file_channel: "files".to_string(),
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.parser.default_method.trim().is_empty() {
            return Err(FormError::Configuration(
                "parser.default_method must not be empty".to_string(),
            ));
        }

        let export = &self.export;
        for (key, value) in [
            ("export.query_key", &export.query_key),
            ("export.body_key", &export.body_key),
            ("export.file_channel", &export.file_channel),
        ] {
            if value.is_empty() {
                return Err(FormError::Configuration(format!("{} must not be empty", key)));
            }
        }

        Ok(())
    }
}
