//! Configuration module
//!
//! `config.toml` is looked up in `.edcards/` (walking up from the current
//! directory), then in `~/.edcards/`. Every field has a default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::normalize::Normalizer;
use crate::generator::{
    ContentGenerator, ModelCatalog, ModelProfile, PromptCatalog, PromptTemplates,
    DEFAULT_BASE_URL,
};

/// Directory holding config and database, locally or in the home directory
pub const APP_DIR: &str = ".edcards";
pub const CONFIG_FILE: &str = "config.toml";
pub const DB_FILE: &str = "cards.db";

pub const DATABASE_ENV: &str = "EDCARDS_DATABASE";
pub const TOKEN_ENV: &str = "HUGGINGFACEHUB_API_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub normalizer: Normalizer,

    #[serde(default = "default_models")]
    pub models: Vec<ModelProfile>,

    /// Extra or replacement prompt templates, keyed by language code
    #[serde(default)]
    pub prompts: BTreeMap<String, PromptTemplates>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            generator: GeneratorConfig::default(),
            normalizer: Normalizer::default(),
            models: default_models(),
            prompts: BTreeMap::new(),
        }
    }
}

fn default_models() -> Vec<ModelProfile> {
    vec![ModelProfile::llama3_8b()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file (overrides local/global discovery)
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_limit")]
    pub default_limit: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            default_limit: default_limit(),
        }
    }
}

fn default_limit() -> i64 {
    crate::core::store::DEFAULT_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token (the environment variable wins)
    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_language")]
    pub default_language: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How long a built client is reused
    #[serde(default = "default_client_ttl_secs")]
    pub client_ttl_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            default_model: default_model(),
            default_language: default_language(),
            timeout_secs: default_timeout_secs(),
            client_ttl_secs: default_client_ttl_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    ModelProfile::llama3_8b().name
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_client_ttl_secs() -> u64 {
    crate::generator::DEFAULT_CLIENT_TTL.as_secs()
}

impl Config {
    /// Load config from default locations
    pub fn load() -> Result<Self> {
        if let Some(local) = Self::find_local_config() {
            return Self::load_from(&local);
        }

        if let Some(global) = Self::global_config_path() {
            if global.exists() {
                return Self::load_from(&global);
            }
        }

        Ok(Self::default())
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Find local .edcards/config.toml walking up directories
    pub fn find_local_config() -> Option<PathBuf> {
        find_up(&Path::new(APP_DIR).join(CONFIG_FILE))
    }

    /// Find local .edcards/cards.db walking up directories
    pub fn find_local_db() -> Option<PathBuf> {
        find_up(&Path::new(APP_DIR).join(DB_FILE))
    }

    /// ~/.edcards
    pub fn global_dir() -> Option<PathBuf> {
        directories::UserDirs::new().map(|u| u.home_dir().join(APP_DIR))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|d| d.join(CONFIG_FILE))
    }

    pub fn global_db_path() -> Option<PathBuf> {
        Self::global_dir().map(|d| d.join(DB_FILE))
    }

    /// Database path with priority:
    /// 1. EDCARDS_DATABASE env var
    /// 2. `override_path` (the --db flag)
    /// 3. [store].path
    /// 4. Local .edcards/cards.db (walking up from CWD), or a local .edcards/ dir
    /// 5. Global ~/.edcards/cards.db
    pub fn db_path(&self, override_path: Option<&Path>) -> PathBuf {
        if let Ok(env_path) = std::env::var(DATABASE_ENV) {
            if !env_path.is_empty() {
                return PathBuf::from(env_path);
            }
        }

        if let Some(path) = override_path {
            return path.to_path_buf();
        }

        if let Some(path) = &self.store.path {
            return path.clone();
        }

        if let Some(local_db) = Self::find_local_db() {
            return local_db;
        }

        if let Some(local_dir) = Self::find_local_config().and_then(|c| c.parent().map(Path::to_path_buf)) {
            return local_dir.join(DB_FILE);
        }

        if let Some(global) = Self::global_db_path() {
            return global;
        }

        Path::new(APP_DIR).join(DB_FILE)
    }

    /// API token: explicit value (flag or env via clap) first, then config
    pub fn api_token(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.generator.api_token.clone())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn model_catalog(&self) -> ModelCatalog {
        ModelCatalog::new(self.models.clone())
    }

    pub fn prompt_catalog(&self) -> PromptCatalog {
        PromptCatalog::with_languages(
            self.prompts.clone(),
            self.generator.default_language.clone(),
        )
    }

    pub fn content_generator(&self) -> ContentGenerator {
        ContentGenerator::new(self.prompt_catalog(), self.normalizer)
    }
}

/// Walk up from the current directory looking for `relative`
fn find_up(relative: &Path) -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join(relative);
        if candidate.exists() {
            return Some(candidate);
        }

        if !current.pop() {
            break;
        }
    }

    None
}
