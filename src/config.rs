use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::OptimizerError;
use crate::rewrite::RewriteConfig;
use crate::scoring::{default_signal_rules, DetectorConfig, LexiconConfig, SignalRule};
use crate::ScoringStrategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub name: String,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            name: "weighted".to_string(),
        }
    }
}

impl StrategyConfig {
    pub fn to_strategy(&self) -> Result<ScoringStrategy, OptimizerError> {
        self.name.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightedConfig {
    pub signals: Vec<SignalRule>,
}

impl Default for WeightedConfig {
    fn default() -> Self {
        Self {
            signals: default_signal_rules(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub timeout_ms: u64,
    pub min_text_chars: usize,
    pub query_chars: usize,
    pub max_articles: usize,
    pub language: String,
    pub newsapi_base: String,
    pub newsdata_base: String,
    pub twinword_base: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            min_text_chars: 20,
            query_chars: 100,
            max_articles: 3,
            language: "es".to_string(),
            newsapi_base: "https://newsapi.org/v2".to_string(),
            newsdata_base: "https://newsdata.io/api/1".to_string(),
            twinword_base: "https://api.twinword.com/api".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategy: StrategyConfig,
    pub detectors: DetectorConfig,
    pub weighted: WeightedConfig,
    pub lexicon: LexiconConfig,
    pub rewrite: RewriteConfig,
    pub enrichment: EnrichmentConfig,
}

impl EngineConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), OptimizerError> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path).map_err(|err| {
                    OptimizerError::Config(format!("failed to read config: {}", err))
                })?;
                Self::from_toml(&contents)?
            } else {
                EngineConfig::default()
            }
        } else {
            EngineConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn from_toml(contents: &str) -> Result<Self, OptimizerError> {
        toml::from_str(contents)
            .map_err(|err| OptimizerError::Config(format!("failed to parse config: {}", err)))
    }

    pub fn write(&self, path: &Path) -> Result<(), OptimizerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    OptimizerError::Config(format!("failed to create config dir: {}", err))
                })?;
            }
        }
        let payload = toml::to_string_pretty(self).map_err(|err| {
            OptimizerError::Config(format!("failed to serialize config: {}", err))
        })?;
        std::fs::write(path, payload)
            .map_err(|err| OptimizerError::Config(format!("failed to write config: {}", err)))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(strategy) = env::var("SCORING_STRATEGY") {
            if !strategy.trim().is_empty() {
                self.strategy.name = strategy;
            }
        }
        if let Ok(threshold) = env::var("DIVERSITY_THRESHOLD") {
            match threshold.parse::<f64>() {
                Ok(value) if value.is_finite() => self.detectors.diversity_threshold = value,
                _ => warn!(value = %threshold, "ignoring invalid DIVERSITY_THRESHOLD"),
            }
        }
        if let Ok(timeout) = env::var("ENRICHMENT_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.enrichment.timeout_ms = value;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("OPTIMIZER_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/optimizer.toml")))
}
