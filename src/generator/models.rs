//! Model profiles
//!
//! A model name selects an endpoint repository and default generation
//! parameters. Callers may override the parameters per request.

use serde::{Deserialize, Serialize};

use super::error::{GenerationError, Result};

pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=1.0;
pub const MAX_TOKENS_RANGE: std::ops::RangeInclusive<u32> = 100..=2048;

/// Model entry from `[[models]]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Name shown to users and stored on cards
    pub name: String,

    /// Repository id sent to the endpoint
    pub repo_id: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f64 {
    crate::core::card::DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    crate::core::card::DEFAULT_MAX_TOKENS
}

impl ModelProfile {
    pub fn llama3_8b() -> Self {
        Self {
            name: "meta-llama/Meta-Llama-3-8B-Instruct".to_string(),
            repo_id: "meta-llama/Meta-Llama-3-8B-Instruct".to_string(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Everything needed to build a client for one request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub repo_id: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationParams {
    pub fn validate(&self) -> Result<()> {
        if !TEMPERATURE_RANGE.contains(&self.temperature) {
            return Err(GenerationError::InvalidParameters(format!(
                "temperature {} outside [{}, {}]",
                self.temperature,
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            )));
        }
        if !MAX_TOKENS_RANGE.contains(&self.max_tokens) {
            return Err(GenerationError::InvalidParameters(format!(
                "max tokens {} outside [{}, {}]",
                self.max_tokens,
                MAX_TOKENS_RANGE.start(),
                MAX_TOKENS_RANGE.end()
            )));
        }
        Ok(())
    }
}

/// Known models, looked up by name
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    profiles: Vec<ModelProfile>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(vec![ModelProfile::llama3_8b()])
    }
}

impl ModelCatalog {
    pub fn new(profiles: Vec<ModelProfile>) -> Self {
        Self { profiles }
    }

    pub fn get(&self, name: &str) -> Option<&ModelProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    /// Resolve a model and apply per-request overrides, then validate
    pub fn params(
        &self,
        name: &str,
        temperature: Option<f64>,
        max_tokens: Option<u32>,
    ) -> Result<GenerationParams> {
        let profile = self
            .get(name)
            .ok_or_else(|| GenerationError::UnknownModel(name.to_string()))?;

        let params = GenerationParams {
            model: profile.name.clone(),
            repo_id: profile.repo_id.clone(),
            temperature: temperature.unwrap_or(profile.temperature),
            max_tokens: max_tokens.unwrap_or(profile.max_tokens),
        };
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults_and_overrides() {
        let catalog = ModelCatalog::default();
        let name = "meta-llama/Meta-Llama-3-8B-Instruct";

        let defaults = catalog.params(name, None, None).unwrap();
        assert_eq!(defaults.temperature, 0.3);
        assert_eq!(defaults.max_tokens, 800);

        let tuned = catalog.params(name, Some(1.0), Some(100)).unwrap();
        assert_eq!((tuned.temperature, tuned.max_tokens), (1.0, 100));
    }

    #[test]
    fn test_rejects_out_of_range_params() {
        let catalog = ModelCatalog::default();
        let name = "meta-llama/Meta-Llama-3-8B-Instruct";

        for (temperature, max_tokens) in [(Some(1.5), None), (Some(-0.1), None), (None, Some(99)), (None, Some(4096))] {
            assert!(matches!(
                catalog.params(name, temperature, max_tokens),
                Err(GenerationError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn test_unknown_model() {
        assert!(matches!(
            ModelCatalog::default().params("gpt-nothing", None, None),
            Err(GenerationError::UnknownModel(name)) if name == "gpt-nothing"
        ));
    }
}
