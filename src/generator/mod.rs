//! Generator module - Summary and subtopic generation
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            ContentGenerator              │
//! │  PromptCatalog ──► ChatModel ──► text    │
//! │                        │                 │
//! │                    Normalizer (subtopics)│
//! └──────────────────────────────────────────┘
//! ```
//!
//! Remote failures propagate unchanged; nothing here retries.

pub mod cache;
pub mod client;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod prompts;

use tracing::debug;

use crate::core::normalize::Normalizer;

pub use cache::{ClientCache, ClientKey, DEFAULT_CLIENT_TTL};
pub use client::{ChatModel, HfChatClient, DEFAULT_BASE_URL};
pub use error::GenerationError;
pub use models::{GenerationParams, ModelCatalog, ModelProfile};
pub use prompts::{PromptCatalog, PromptKind, PromptTemplates};

use error::Result;

/// Produces card content for a topic in a given language
#[derive(Debug, Clone, Default)]
pub struct ContentGenerator {
    prompts: PromptCatalog,
    normalizer: Normalizer,
}

impl ContentGenerator {
    pub fn new(prompts: PromptCatalog, normalizer: Normalizer) -> Self {
        Self {
            prompts,
            normalizer,
        }
    }

    pub fn prompts(&self) -> &PromptCatalog {
        &self.prompts
    }

    /// Explanatory summary of `topic`. Blank output is an error.
    pub fn generate_summary(
        &self,
        model: &dyn ChatModel,
        topic: &str,
        language: &str,
    ) -> Result<String> {
        debug!(topic, language, "generating summary");
        let prompt = self.prompts.render(PromptKind::Summary, language, topic);

        let summary = model.complete(&prompt)?.trim().to_string();
        if summary.is_empty() {
            return Err(GenerationError::EmptySummary);
        }
        Ok(summary)
    }

    /// Up to three related subtopics, cleaned by the normalizer.
    /// May be empty; the caller decides what that means.
    pub fn generate_subtopics(
        &self,
        model: &dyn ChatModel,
        topic: &str,
        language: &str,
    ) -> Result<Vec<String>> {
        debug!(topic, language, "generating subtopics");
        let prompt = self.prompts.render(PromptKind::Subtopics, language, topic);

        let raw = model.complete(&prompt)?;
        debug!(raw = %raw, "raw subtopics response");

        let subtopics = self.normalizer.normalize(&raw);
        debug!(?subtopics, "parsed subtopics");
        Ok(subtopics)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses and records the prompts it saw
    pub struct ScriptedModel {
        responses: Mutex<VecDeque<Result<String>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl ChatModel for ScriptedModel {
        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::Malformed("script exhausted".into())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;

    #[test]
    fn test_summary_is_trimmed() {
        let model = ScriptedModel::new(vec![Ok("\n  Dropout randomly disables units.  \n".into())]);
        let summary = ContentGenerator::default()
            .generate_summary(&model, "Dropout", "en")
            .unwrap();
        assert_eq!(summary, "Dropout randomly disables units.");
    }

    #[test]
    fn test_blank_summary_is_an_error() {
        let model = ScriptedModel::new(vec![Ok(" \n ".into())]);
        assert!(matches!(
            ContentGenerator::default().generate_summary(&model, "Dropout", "en"),
            Err(GenerationError::EmptySummary)
        ));
    }

    #[test]
    fn test_subtopics_are_normalized() {
        let model = ScriptedModel::new(vec![Ok(
            "1. Convolutional layers\n2. Pooling\n- Batch normalization techniques".into(),
        )]);
        let subtopics = ContentGenerator::default()
            .generate_subtopics(&model, "CNNs", "pt")
            .unwrap();

        assert_eq!(subtopics, vec!["Convolutional layers", "Batch normalization techniques"]);
        assert!(model.prompts.lock().unwrap()[0].contains("subtemas"));
    }

    #[test]
    fn test_unknown_language_uses_fallback_prompt() {
        let model = ScriptedModel::new(vec![Ok("A summary.".into())]);
        ContentGenerator::default()
            .generate_summary(&model, "GANs", "fr")
            .unwrap();

        assert!(model.prompts.lock().unwrap()[0].contains("**English**"));
    }

    #[test]
    fn test_remote_failures_propagate() {
        let model = ScriptedModel::new(vec![Err(GenerationError::Auth("HTTP 401".into()))]);
        let err = ContentGenerator::default()
            .generate_subtopics(&model, "GANs", "en")
            .unwrap_err();
        assert!(err.is_auth());
    }
}
