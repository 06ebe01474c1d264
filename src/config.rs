use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bedrock: BedrockConfig,
    pub analysis: AnalysisConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BedrockConfig {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub region: String,
    /// Maximum number of in-flight Bedrock requests
    pub concurrency: usize,
    pub include_hidden_costs: bool,
    pub include_data_transfer_costs: bool,
    pub include_recommendations: bool,
    /// Resource types to analyze. Empty analyzes every type.
    pub resource_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bedrock: BedrockConfig::default(),
            analysis: AnalysisConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_tokens: 4000,
            temperature: 0.1,
            top_p: 0.9,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            concurrency: 4,
            include_hidden_costs: true,
            include_data_transfer_costs: true,
            include_recommendations: true,
            resource_types: Vec::new(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl Config {
    /// Load config from an explicit path, `./.tfcost.toml`, or
    /// `~/.config/tfcost/config.toml`, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            let local = PathBuf::from(".tfcost.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("tfcost").join("config.toml"))
                    .unwrap_or(local)
            }
        };

        if !config_path.exists() {
            if path.is_some() {
                warn!(
                    "Config file not found: {}, using defaults. Run 'tfcost init' to create one.",
                    config_path.display()
                );
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ConfigError::ParseError(format!("{}: {}", config_path.display(), e))
        })?;
        config.validate()?;
        debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.concurrency == 0 {
            return Err(invalid("analysis.concurrency", "must be at least 1"));
        }
        if self.analysis.region.trim().is_empty() {
            return Err(invalid("analysis.region", "must not be empty"));
        }
        if self.bedrock.model_id.trim().is_empty() {
            return Err(invalid("bedrock.model_id", "must not be empty"));
        }
        if self.bedrock.max_tokens == 0 {
            return Err(invalid("bedrock.max_tokens", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.bedrock.temperature) {
            return Err(invalid("bedrock.temperature", "must be between 0 and 1"));
        }
        if self.bedrock.top_p <= 0.0 || self.bedrock.top_p > 1.0 {
            return Err(invalid("bedrock.top_p", "must be in (0, 1]"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        Ok(())
    }

    /// Whether a resource type passes the configured allowlist
    pub fn analyzes_type(&self, resource_type: &str) -> bool {
        self.analysis.resource_types.is_empty()
            || self.analysis.resource_types.iter().any(|t| t == resource_type)
    }
}

fn invalid(field: &str, reason: &str) -> crate::error::AnalyzerError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}
