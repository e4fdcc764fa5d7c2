//! Prompt templates per language
//!
//! Built-in `en` and `pt` templates; `[prompts.<code>]` in the config adds or
//! replaces languages. Templates use a `{topic}` placeholder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

const TOPIC_PLACEHOLDER: &str = "{topic}";

const EN_SUMMARY: &str = r#"You are an expert educator. Explain the concept of "{topic}" clearly, objectively, and educationally.
Your response must be in **English**.

Include the following:
1.  Main definition
2.  Key related concepts
3.  Practical applications

Keep the entire response to a maximum of 150 words."#;

const EN_SUBTOPICS: &str = r#"You are a curriculum designer. List EXACTLY 3 specific and relevant subtopics related to "{topic}".
Your response must be in **English**.

Expected format:
1. [Specific Subtopic 1]
2. [Specific Subtopic 2]
3. [Specific Subtopic 3]

Be specific and educational. Respond ONLY with the 3 items, with no introduction or conclusion."#;

const PT_SUMMARY: &str = r#"Você é um educador especialista. Explique o conceito de "{topic}" de forma clara, objetiva e educacional.
Sua resposta deve ser em **Português**.

Inclua o seguinte:
1.  Definição principal
2.  Conceitos relacionados importantes
3.  Aplicações práticas

Mantenha a resposta inteira com um máximo de 150 palavras."#;

const PT_SUBTOPICS: &str = r#"Você é um designer instrucional. Liste EXATAMENTE 3 subtemas específicos e relevantes relacionados a "{topic}".
Sua resposta deve ser em **Português**.

Formato esperado:
1. [Subtema específico 1]
2. [Subtema específico 2]
3. [Subtema específico 3]

Seja específico e educacional. Responda APENAS com os 3 itens, sem introdução ou conclusão."#;

/// Templates for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplates {
    pub summary: String,
    pub subtopics: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Summary,
    Subtopics,
}

#[derive(Debug, Clone)]
pub struct PromptCatalog {
    languages: BTreeMap<String, PromptTemplates>,
    fallback: String,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        let languages = BTreeMap::from([
            (
                "en".to_string(),
                PromptTemplates {
                    summary: EN_SUMMARY.to_string(),
                    subtopics: EN_SUBTOPICS.to_string(),
                },
            ),
            (
                "pt".to_string(),
                PromptTemplates {
                    summary: PT_SUMMARY.to_string(),
                    subtopics: PT_SUBTOPICS.to_string(),
                },
            ),
        ]);

        Self {
            languages,
            fallback: "en".to_string(),
        }
    }
}

impl PromptCatalog {
    /// Built-ins plus `extra`, which wins on conflicts.
    ///
    /// A `fallback` with no templates is replaced by `en`.
    pub fn with_languages(
        extra: impl IntoIterator<Item = (String, PromptTemplates)>,
        fallback: impl Into<String>,
    ) -> Self {
        let mut catalog = Self::default();
        catalog.languages.extend(extra);

        let fallback = fallback.into();
        if catalog.supports(&fallback) {
            catalog.fallback = fallback;
        } else {
            warn!(fallback = %fallback, "no prompt templates for fallback language, using en");
        }
        catalog
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn supports(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }

    /// Render the prompt for `topic`, falling back to the default language
    /// when `language` has no templates
    pub fn render(&self, kind: PromptKind, language: &str, topic: &str) -> String {
        let templates = self.languages.get(language).or_else(|| {
            warn!(language, fallback = %self.fallback, "no prompt templates for language, using fallback");
            self.languages.get(&self.fallback)
        });

        let template = match (templates, kind) {
            (Some(t), PromptKind::Summary) => t.summary.as_str(),
            (Some(t), PromptKind::Subtopics) => t.subtopics.as_str(),
            (None, PromptKind::Summary) => EN_SUMMARY,
            (None, PromptKind::Subtopics) => EN_SUBTOPICS,
        };
        template.replace(TOPIC_PLACEHOLDER, topic)
    }
}
