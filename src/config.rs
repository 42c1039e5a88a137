use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::constants::{API_URL_ENV, DEFAULT_OUTPUT_PATH, DEFAULT_TIMEOUT_SECONDS};
use crate::error::{NormalizerError, Result};
use crate::pipeline::normalize::policy::{
    default_date_formats, NormalizationPolicy, PhonePolicy, UnknownExperiencePolicy,
    UnseenColumnPolicy,
};
use crate::types::SchemaVariant;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub normalizer: NormalizerConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
}

/// Normalizer settings. Unset policy overrides fall back to the variant preset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub variant: SchemaVariant,
    pub unseen_columns: Option<UnseenColumnPolicy>,
    pub phone: Option<PhonePolicy>,
    pub enforce_age: Option<bool>,
    pub unknown_experience: UnknownExperiencePolicy,
    pub date_formats: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            variant: SchemaVariant::default(),
            unseen_columns: None,
            phone: None,
            enforce_age: None,
            unknown_experience: UnknownExperiencePolicy::default(),
            date_formats: default_date_formats(),
        }
    }
}

impl NormalizerConfig {
    /// Resolve the variant preset and apply any explicit overrides
    pub fn policy(&self) -> NormalizationPolicy {
        let mut policy = NormalizationPolicy::for_variant(self.variant);
        if let Some(unseen) = self.unseen_columns {
            policy.unseen_columns = unseen;
        }
        if let Some(phone) = self.phone {
            policy.phone = phone;
        }
        if let Some(enforce_age) = self.enforce_age {
            policy.enforce_age = enforce_age;
        }
        policy.unknown_experience = self.unknown_experience.clone();
        if !self.date_formats.is_empty() {
            policy.date_formats = self.date_formats.clone();
        }
        policy
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            format: OutputFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => f.write_str("csv"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}' (expected 'csv' or 'json')", other)),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            NormalizerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the file when it exists; a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Apply environment overrides on top of the file configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                debug!("Source URL overridden by {}", API_URL_ENV);
                self.source.url = Some(url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.normalizer.variant, SchemaVariant::Manual);
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.output.path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert_eq!(config.source.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.normalizer.policy(), NormalizationPolicy::default());
    }

    #[test]
    fn test_overrides_apply_on_top_of_preset() {
        let config: Config = toml::from_str(
            r#"
            [normalizer]
            variant = "experience_bucketed"
            enforce_age = true
            unknown_experience = { label = "Unassigned" }

            [output]
            path = "out/employees.json"
            format = "json"
            "#,
        )
        .unwrap();

        let policy = config.normalizer.policy();
        assert_eq!(policy.variant, SchemaVariant::ExperienceBucketed);
        assert!(policy.enforce_age);
        assert_eq!(policy.phone, PhonePolicy::RequireDigits);
        assert_eq!(
            policy.unknown_experience,
            UnknownExperiencePolicy::Label("Unassigned".to_string())
        );
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let result: std::result::Result<Config, _> =
            toml::from_str("[normalizer]\nvariant = \"pivot\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default(Path::new("does/not/exist.toml")).unwrap();
        assert!(config.source.url.is_none());
    }
}
