use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use draftloop::llm::anthropic::{AnthropicConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use draftloop::llm::RetryPolicy;
use draftloop::orchestrator::DEFAULT_MAX_ROUNDS;

/// Environment variable that overrides `llm.model`
pub const MODEL_ENV: &str = "MODEL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    #[serde(rename = "loop")]
    pub loop_config: LoopConfig,
    pub output: OutputConfig,
    pub prompts_dir: Option<PathBuf>,
    pub journal_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_ms: 300000,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub max_rounds: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub normalize: bool,
    pub fence_language: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            fence_language: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmConfig::default(),
            loop_config: LoopConfig::default(),
            output: OutputConfig::default(),
            prompts_dir: None,
            journal_dir: None,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            log::info!("Model overridden by {}: {}", MODEL_ENV, model);
            self.llm.model = model;
        }
        self
    }

    pub fn anthropic_config(&self) -> AnthropicConfig {
        AnthropicConfig {
            model: self.llm.model.clone(),
            max_tokens: self.llm.max_tokens,
            timeout: Duration::from_millis(self.llm.timeout_ms),
            ..Default::default()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.llm.retry.max_attempts,
            base_delay: Duration::from_millis(self.llm.retry.base_delay_ms),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.loop_config.max_rounds, 5);
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert!(config.output.normalize);
        assert!(config.prompts_dir.is_none());
        assert!(config.journal_dir.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str(
            "loop:\n  max_rounds: 8\noutput:\n  fence_language: python\nllm:\n  retry:\n    max_attempts: 6\n",
        )
        .unwrap();
        assert_eq!(config.loop_config.max_rounds, 8);
        assert_eq!(config.output.fence_language.as_deref(), Some("python"));
        assert!(config.output.normalize);
        assert_eq!(config.llm.retry.max_attempts, 6);
        assert_eq!(config.llm.retry.base_delay_ms, 1000);
        assert_eq!(config.llm.max_tokens, 8192);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("draftloop.yml");
        fs::write(&path, "log_level: debug\njournal_dir: /tmp/journal\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.journal_dir, Some(PathBuf::from("/tmp/journal")));
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let path = PathBuf::from("/nonexistent/draftloop.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yml");
        fs::write(&path, "loop: [not, a, map").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_model_env_override() {
        let config = Config::default().with_env_from(|key| (key == MODEL_ENV).then(|| "claude-3-haiku".to_string()));
        assert_eq!(config.llm.model, "claude-3-haiku");

        let config = Config::default().with_env_from(|_| Some("  ".to_string()));
        assert_eq!(config.llm.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_client_settings() {
        let mut config = Config::default();
        config.llm.timeout_ms = 1500;
        config.llm.retry.base_delay_ms = 250;

        assert_eq!(config.anthropic_config().timeout, Duration::from_millis(1500));
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
    }
}
