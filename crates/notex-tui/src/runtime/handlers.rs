//! Async task bodies. Each handler runs one backend call to completion
//! and reports back as a single event; the reducer decides whether the
//! result still matters by the time it arrives.

use notex_core::catalog::{Catalog, NoteMeta, NotesBackend};
use notex_core::config::GeneratorConfig;
use notex_core::generate::{
    GeminiClient, GeminiConfig, GenerateRequest, GeneratorError, GeneratorErrorKind,
};
use notex_core::hierarchy::LoadRequest;

use crate::events::UiEvent;

pub async fn load_level(catalog: Catalog, request: LoadRequest) -> UiEvent {
    let result = match &request.parent_id {
        Some(parent_id) => catalog.fetch_children(request.level, parent_id).await,
        None => catalog.fetch_root().await,
    };
    UiEvent::LevelLoaded {
        level: request.level,
        ticket: request.ticket,
        result,
    }
}

pub async fn load_notes(notes: NotesBackend, topic_id: String, exam_id: String) -> UiEvent {
    let result = notes.read_notes(&topic_id, Some(&exam_id)).await;
    UiEvent::NotesLoaded { topic_id, result }
}

pub async fn load_questions(catalog: Catalog, topic_id: String) -> UiEvent {
    let result = catalog.fetch_related_questions(&topic_id).await;
    UiEvent::QuestionsLoaded { topic_id, result }
}

/// The client is built per request so the app runs without a key; a
/// missing `GEMINI_API_KEY` surfaces here as a retryable failure.
pub async fn generate_notes(
    generator: GeneratorConfig,
    topic_id: String,
    request: GenerateRequest,
) -> UiEvent {
    let result = match GeminiConfig::from_env(&generator) {
        Ok(config) => GeminiClient::new(config).generate_notes(&request).await,
        Err(err) => Err(GeneratorError::new(
            GeneratorErrorKind::ApiError,
            err.to_string(),
        )),
    };
    UiEvent::GenerationFinished { topic_id, result }
}

pub async fn save_notes(
    notes: NotesBackend,
    topic_id: String,
    exam_id: String,
    text: String,
) -> UiEvent {
    let meta = NoteMeta::now();
    let result = notes.write_notes(&topic_id, Some(&exam_id), &text, &meta).await;
    UiEvent::SaveFinished {
        topic_id,
        text,
        result,
    }
}

#[cfg(test)]
mod tests {
    use notex_core::catalog::{LocalNotesStore, MemoryCatalog};
    use notex_core::hierarchy::Level;

    use super::*;

    #[tokio::test]
    async fn load_level_carries_the_ticket_through() {
        let catalog = Catalog::Builtin(MemoryCatalog::sample());
        let request = LoadRequest {
            level: Level::Exam,
            parent_id: None,
            ticket: 7,
        };
        let UiEvent::LevelLoaded {
            level,
            ticket,
            result,
        } = load_level(catalog, request).await
        else {
            panic!("wrong event");
        };
        assert_eq!(level, Level::Exam);
        assert_eq!(ticket, 7);
        assert!(!result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn questions_for_unknown_topics_are_empty() {
        let catalog = Catalog::Builtin(MemoryCatalog::sample());
        let UiEvent::QuestionsLoaded { result, .. } =
            load_questions(catalog, "no-such-topic".to_string()).await
        else {
            panic!("wrong event");
        };
        assert_eq!(result.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn saved_notes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let notes = NotesBackend::Local(LocalNotesStore::new(dir.path().to_path_buf()));

        let UiEvent::SaveFinished { result, .. } = save_notes(
            notes.clone(),
            "t1".to_string(),
            "jee".to_string(),
            "kinematics".to_string(),
        )
        .await
        else {
            panic!("wrong event");
        };
        result.unwrap();

        let UiEvent::NotesLoaded { result, .. } =
            load_notes(notes, "t1".to_string(), "jee".to_string()).await
        else {
            panic!("wrong event");
        };
        assert_eq!(result.unwrap().as_deref(), Some("kinematics"));
    }
}
