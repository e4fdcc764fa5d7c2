//! Generation pipeline
//!
//! topic -> summary -> subtopics -> save. The store is only touched after
//! both generation calls succeeded, and never while a call is in flight.

use thiserror::Error;
use tracing::{info, warn};

use super::cache::ClientCache;
use super::error::GenerationError;
use super::models::GenerationParams;
use super::ContentGenerator;
use crate::core::card::{Card, NewCard};
use crate::core::error::StoreError;
use crate::core::store::CardStore;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Generation(e) if e.is_auth())
    }
}

/// Progress reported to the caller between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summary,
    Subtopics,
    Saving,
    Done,
}

impl Stage {
    /// Rough completion percentage, for progress bars
    pub fn percent(self) -> u8 {
        match self {
            Stage::Summary => 0,
            Stage::Subtopics => 50,
            Stage::Saving => 90,
            Stage::Done => 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CardRequest {
    pub topic: String,
    pub language: String,
    pub params: GenerationParams,
}

/// Generate a card for `request` and persist it.
///
/// Returns the stored card. On any generation failure, or when no subtopic
/// survives normalization, nothing is saved.
pub fn generate_card(
    store: &CardStore,
    generator: &ContentGenerator,
    clients: &ClientCache,
    request: &CardRequest,
    mut progress: impl FnMut(Stage),
) -> Result<Card, PipelineError> {
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(StoreError::InvalidCard("topic must not be empty").into());
    }
    let params = &request.params;
    params.validate()?;

    let model = clients.get(params)?;

    progress(Stage::Summary);
    let summary = generator.generate_summary(model.as_ref(), topic, &request.language)?;

    progress(Stage::Subtopics);
    let subtopics = generator.generate_subtopics(model.as_ref(), topic, &request.language)?;
    if subtopics.is_empty() {
        warn!(topic, "generation produced no usable subtopics");
        return Err(GenerationError::NoUsableSubtopics.into());
    }

    progress(Stage::Saving);
    let new = NewCard::new(
        topic,
        summary,
        subtopics,
        &params.model,
        &request.language,
    )
    .with_params(params.temperature, params.max_tokens);
    let id = store.save(&new)?;

    let card = store.get(id)?.ok_or(StoreError::Corrupt {
        id,
        reason: "card vanished right after saving".to_string(),
    })?;

    progress(Stage::Done);
    info!(card_id = id, topic, model = %params.model, "card generated");
    Ok(card)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::generator::client::ChatModel;
    use crate::generator::models::ModelCatalog;
    use crate::generator::testing::ScriptedModel;

    fn setup(responses: Vec<Result<String, GenerationError>>) -> (TempDir, CardStore, ClientCache) {
        let dir = tempdir().unwrap();
        let store = CardStore::open(dir.path().join("cards.db")).unwrap();
        let model: Arc<dyn ChatModel> = Arc::new(ScriptedModel::new(responses));
        let clients = ClientCache::new(Duration::from_secs(60), move |_| Ok(Arc::clone(&model)));
        (dir, store, clients)
    }

    fn request(topic: &str) -> CardRequest {
        CardRequest {
            topic: topic.to_string(),
            language: "pt".to_string(),
            params: ModelCatalog::default()
                .params("meta-llama/Meta-Llama-3-8B-Instruct", Some(0.5), Some(512))
                .unwrap(),
        }
    }

    #[test]
    fn test_generates_and_saves() {
        let (_dir, store, clients) = setup(vec![
            Ok("Redes que aprendem filtros.".into()),
            Ok("1. Camadas convolucionais\n2. Pooling\n3. Normalização em lote".into()),
        ]);

        let mut stages = Vec::new();
        let card = generate_card(
            &store,
            &ContentGenerator::default(),
            &clients,
            &request("  Redes Convolucionais "),
            |stage| stages.push(stage),
        )
        .unwrap();

        assert_eq!(card.topic, "Redes Convolucionais");
        assert_eq!(card.summary, "Redes que aprendem filtros.");
        assert_eq!(card.subtopics, vec!["Camadas convolucionais", "Normalização em lote"]);
        assert_eq!(card.language, "pt");
        assert_eq!((card.temperature, card.max_tokens), (0.5, 512));
        assert_eq!(
            stages,
            vec![Stage::Summary, Stage::Subtopics, Stage::Saving, Stage::Done]
        );
        assert_eq!(store.get_all(10).unwrap(), vec![card]);
    }

    #[test]
    fn test_failed_generation_saves_nothing() {
        let (_dir, store, clients) = setup(vec![
            Ok("A fine summary.".into()),
            Err(GenerationError::Api {
                status: 503,
                body: "model overloaded".into(),
            }),
        ]);

        let err = generate_card(
            &store,
            &ContentGenerator::default(),
            &clients,
            &request("GANs"),
            |_| {},
        )
        .unwrap_err();

        assert!(!err.is_auth());
        assert_eq!(store.get_statistics().total_count, 0);
    }

    #[test]
    fn test_auth_failure_is_distinguished() {
        let (_dir, store, clients) = setup(vec![Err(GenerationError::Auth("HTTP 401".into()))]);

        let err = generate_card(
            &store,
            &ContentGenerator::default(),
            &clients,
            &request("GANs"),
            |_| {},
        )
        .unwrap_err();

        assert!(err.is_auth());
        assert_eq!(store.get_statistics().total_count, 0);
    }

    #[test]
    fn test_no_usable_subtopics_saves_nothing() {
        let (_dir, store, clients) = setup(vec![
            Ok("A fine summary.".into()),
            Ok("1. CNN\n2. RNN".into()),
        ]);

        let err = generate_card(
            &store,
            &ContentGenerator::default(),
            &clients,
            &request("Deep Learning"),
            |_| {},
        )
        .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Generation(GenerationError::NoUsableSubtopics)
        ));
        assert!(store.get_all(10).unwrap().is_empty());
    }

    #[test]
    fn test_stage_percentages_increase() {
        let stages = [Stage::Summary, Stage::Subtopics, Stage::Saving, Stage::Done];
        assert!(stages.windows(2).all(|w| w[0].percent() < w[1].percent()));
    }
}
