/// Configuration module for CodeMentor.
///
/// Handles loading, validating, and providing default configuration values.
/// The API key itself never lives in the file; only the name of the
/// environment variable that holds it.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "codementor.json";

/// Consulted when the configured variable is unset.
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";

// ── Default value functions ──────────────────────────────────────────

fn default_model_name() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_analyze_temperature() -> f32 {
    0.2
}

fn default_trace_temperature() -> f32 {
    0.1
}

fn default_refine_temperature() -> f32 {
    0.3
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    /// Environment variable holding the Gemini API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP timeout for a single model call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    #[serde(default = "default_analyze_temperature")]
    pub analyze_temperature: f32,

    #[serde(default = "default_trace_temperature")]
    pub trace_temperature: f32,

    #[serde(default = "default_refine_temperature")]
    pub refine_temperature: f32,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            generation: GenerationConfig::default(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            analyze_temperature: default_analyze_temperature(),
            trace_temperature: default_trace_temperature(),
            refine_temperature: default_refine_temperature(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, tries `codementor.json` in the working
    /// directory, then the per-user config file. If neither exists, returns
    /// a default config and generates a template at `codementor.json`.
    pub fn load(config_path: &str) -> Result<Self> {
        let path: PathBuf = if !config_path.is_empty() {
            PathBuf::from(config_path)
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            PathBuf::from(DEFAULT_CONFIG_FILE)
        } else if let Some(user) = Self::user_config_path().filter(|p| p.exists()) {
            user
        } else {
            PathBuf::from(DEFAULT_CONFIG_FILE)
        };

        if !path.exists() {
            info!("{} not found, using defaults", path.display());
            let cfg = Self::default();

            // Generate template only for the default path
            if config_path.is_empty() {
                match cfg.save(&path) {
                    Ok(()) => info!("Generated config template: {}", path.display()),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {}: {e}", path.display());
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// `<config dir>/codementor/config.json`, if the platform has a config dir.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("codementor").join("config.json"))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.model.name.trim().is_empty(), "model.name must not be empty");
        anyhow::ensure!(
            self.model.base_url.starts_with("http://") || self.model.base_url.starts_with("https://"),
            "model.base_url must be an http(s) URL"
        );
        anyhow::ensure!(self.model.timeout_secs > 0, "model.timeout_secs must be positive");
        for (name, t) in [
            ("analyze_temperature", self.generation.analyze_temperature),
            ("trace_temperature", self.generation.trace_temperature),
            ("refine_temperature", self.generation.refine_temperature),
        ] {
            anyhow::ensure!((0.0..=2.0).contains(&t), "generation.{name} must be within [0, 2]");
        }
        anyhow::ensure!(!self.api_key_env.trim().is_empty(), "api_key_env must not be empty");
        Ok(())
    }

    /// Read the API key from the process environment.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the key through `lookup`; blank values count as absent.
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        [self.api_key_env.as_str(), FALLBACK_API_KEY_ENV]
            .into_iter()
            .filter_map(|name| lookup(name))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }

    /// Human-readable list of the variables consulted for the key.
    #[must_use]
    pub fn key_sources(&self) -> String {
        if self.api_key_env == FALLBACK_API_KEY_ENV {
            self.api_key_env.clone()
        } else {
            format!("{} or {FALLBACK_API_KEY_ENV}", self.api_key_env)
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
