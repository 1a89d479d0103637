use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const ENV_CONFIG_PATH: &str = "CLAIM_INVESTIGATOR_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

// Per-field environment overrides
const ENV_RISK_THRESHOLD: &str = "RISK_THRESHOLD";
const ENV_EXTERNAL_REASONING_ENABLED: &str = "EXTERNAL_REASONING_ENABLED";
const ENV_EXTERNAL_TIMEOUT_MS: &str = "EXTERNAL_TIMEOUT_MS";
const ENV_HOP_DEPTH: &str = "HOP_DEPTH";
const ENV_REASONING_MODEL: &str = "REASONING_MODEL";

const DEFAULT_RISK_THRESHOLD: f64 = 0.8;
const DEFAULT_EXTERNAL_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_HOP_DEPTH: usize = 2;
const DEFAULT_REASONING_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("risk_threshold must lie in [0, 1], got {0}")]
    InvalidRiskThreshold(f64),

    #[error("hop_depth must be at least 1")]
    InvalidHopDepth,

    #[error("external_timeout_ms must be greater than zero")]
    InvalidTimeout,
}

/// Options recognized by a single investigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigationConfig {
    /// Scores strictly above this value are rejected by the deterministic path
    pub risk_threshold: f64,
    /// Consult the external reasoning capability before falling back
    pub external_reasoning_enabled: bool,
    /// Upper bound for one external reasoning call
    pub external_timeout_ms: u64,
    /// Subgraph radius around the claim node
    pub hop_depth: usize,
}

impl Default for InvestigationConfig {
    fn default() -> Self {
        Self {
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            external_reasoning_enabled: false,
            external_timeout_ms: DEFAULT_EXTERNAL_TIMEOUT_MS,
            hop_depth: DEFAULT_HOP_DEPTH,
        }
    }
}

impl InvestigationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.risk_threshold) {
            return Err(ConfigError::InvalidRiskThreshold(self.risk_threshold));
        }
        if self.hop_depth == 0 {
            return Err(ConfigError::InvalidHopDepth);
        }
        if self.external_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    pub fn external_timeout(&self) -> Duration {
        Duration::from_millis(self.external_timeout_ms)
    }
}

/// Where subgraphs come from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStoreConfig {
    /// Remote graph service; takes precedence over `fixture_path`
    #[serde(default)]
    pub base_url: Option<Url>,
    /// JSON file holding pre-materialized subgraphs
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,
    /// Put the Redis subgraph cache in front of the store
    #[serde(default)]
    pub cache: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// YAML rule table; the built-in table is used when unset
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
}

/// Where node feature vectors come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMode {
    /// Derived from each node's kind and flag
    #[default]
    Profile,
    /// Precomputed by the graph store
    Store,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// JSON model artifact; the reference model is used when unset
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default)]
    pub features: FeatureMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    #[serde(default = "default_reasoning_model")]
    pub model: String,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            model: default_reasoning_model(),
        }
    }
}

fn default_reasoning_model() -> String {
    DEFAULT_REASONING_MODEL.to_string()
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub investigation: InvestigationConfig,
    #[serde(default)]
    pub graph_store: GraphStoreConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub scorer: ScorerConfig,
    #[serde(default)]
    pub reasoning: ReasoningConfig,
}

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub investigation: InvestigationConfig,
    pub graph_store: GraphStoreConfig,
    pub policy: PolicyConfig,
    pub scorer: ScorerConfig,
    pub reasoning: ReasoningConfig,
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        Self {
            investigation: file.investigation,
            graph_store: file.graph_store,
            policy: file.policy,
            scorer: file.scorer,
            reasoning: file.reasoning,
        }
    }
}

impl Config {
    /// Load configuration from the config file, then apply environment overrides
    pub fn from_env() -> Self {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config: Config = Self::load_config_file(&config_path)
            .unwrap_or_default()
            .into();
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Apply per-field overrides; unparsable values are ignored with a warning
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = parse_override(&lookup, ENV_RISK_THRESHOLD) {
            self.investigation.risk_threshold = value;
        }
        if let Some(value) = parse_override(&lookup, ENV_EXTERNAL_REASONING_ENABLED) {
            self.investigation.external_reasoning_enabled = value;
        }
        if let Some(value) = parse_override(&lookup, ENV_EXTERNAL_TIMEOUT_MS) {
            self.investigation.external_timeout_ms = value;
        }
        if let Some(value) = parse_override(&lookup, ENV_HOP_DEPTH) {
            self.investigation.hop_depth = value;
        }
        if let Some(model) = lookup(ENV_REASONING_MODEL) {
            self.reasoning.model = model;
        }
    }

    /// Parse configuration from YAML text; blank text yields defaults
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        let contents = contents.trim();
        if contents.is_empty() {
            return Ok(Self::default());
        }
        let file: ConfigFile = serde_yaml::from_str(contents)?;
        Ok(file.into())
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config file, using defaults"
                        );
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read config file, using defaults"
                );
                None
            }
        }
    }
}

fn parse_override<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparsable override");
            None
        }
    }
}
