use axum::{Json, extract::{Path, State}, http::StatusCode, response::{IntoResponse, Response}};
use std::{collections::HashMap, sync::Arc};
use parking_lot::RwLock;
use uuid::Uuid;
use chrono::Utc;

use crate::{
    models::{FavoriteRequest, GeneratedName, GenerationResult, NameRequest, PetDescriptor, Session},
    openai::TextGenerator,
    pipeline::NameGenerator,
};

pub const DEFAULT_CREATIVITY: f32 = 0.7;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    pub service: Arc<dyn TextGenerator>,
}

pub async fn generate_name(State(state): State<AppState>, Json(body): Json<NameRequest>) -> Json<GenerationResult> {
    let format = body.format.unwrap_or_default();
    let creativity = body.creativity.unwrap_or(DEFAULT_CREATIVITY);
    let descriptor = body.descriptor();

    tracing::info!("🚀 Name requested for a {} {}", body.color, body.species);

    // One pipeline instance per invocation; nothing is shared between
    // requests except the service client.
    let generator = NameGenerator::new(state.service.clone(), format);
    let result = generator.generate(&descriptor, creativity).await;

    if result.is_success() {
        if let Some(session_id) = body.session_id {
            record_in_history(&state, session_id, &descriptor.normalized(), &result);
        }
    }
    Json(result)
}

fn record_in_history(state: &AppState, id: Uuid, descriptor: &PetDescriptor, result: &GenerationResult) {
    let mut guard = state.sessions.write();
    if let Some(session) = guard.get_mut(&id) {
        session.history.push(GeneratedName {
            name: result.name.clone().unwrap_or_default(),
            explanation: result.explanation.clone().unwrap_or_default(),
            fun_fact: result.fun_fact.clone(),
            nickname: result.nickname.clone(),
            species: descriptor.species.clone(),
            color: descriptor.color.clone(),
            gender: descriptor.gender.clone(),
            created_at: Utc::now(),
        });
        session.updated_at = Utc::now();
        tracing::info!("📝 Recorded result in session {} ({} entries)", id, session.history.len());
    } else {
        tracing::warn!("Unknown session {}; result not recorded", id);
    }
}

// Create a new empty session (no generation yet)
pub async fn create_session(State(state): State<AppState>) -> Json<Session> {
    let id = Uuid::new_v4();
    let session = Session {
        id,
        history: Vec::new(),
        favorites: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    state.sessions.write().insert(id, session.clone());
    tracing::info!("✅ Created session {}", id);
    Json(session)
}

pub async fn get_session(Path(id): Path<Uuid>, State(state): State<AppState>) -> Response {
    if let Some(s) = state.sessions.read().get(&id).cloned() { Json(s).into_response() } else { StatusCode::NOT_FOUND.into_response() }
}

#[axum::debug_handler]
pub async fn add_favorite(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<FavoriteRequest>,
) -> Result<Json<Session>, StatusCode> {
    let mut guard = state.sessions.write();
    let session = guard.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    let entry = session
        .history
        .get(body.history_index)
        .cloned()
        .ok_or(StatusCode::BAD_REQUEST)?;
    session.favorites.push(entry);
    session.updated_at = Utc::now();
    Ok(Json(session.clone()))
}

pub async fn remove_favorite(
    Path((id, index)): Path<(Uuid, usize)>,
    State(state): State<AppState>,
) -> Result<Json<Session>, StatusCode> {
    let mut guard = state.sessions.write();
    let session = guard.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if index >= session.favorites.len() {
        return Err(StatusCode::BAD_REQUEST);
    }
    session.favorites.remove(index);
    session.updated_at = Utc::now();
    Ok(Json(session.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use crate::openai::OpenAiError;

    struct FixedService(&'static str);

    #[async_trait]
    impl TextGenerator for FixedService {
        async fn complete(&self, _prompt: &str, _temperature: f32) -> Result<String, OpenAiError> {
            Ok(self.0.to_string())
        }
    }

    fn state() -> AppState {
        AppState {
            sessions: Arc::default(),
            service: Arc::new(FixedService(
                "Shadow | A sleek name matching her dark coat | \
                 Black cats were revered in ancient Egypt | Shadie",
            )),
        }
    }

    fn request(session_id: Option<Uuid>) -> NameRequest {
        NameRequest {
            species: "Cat".into(),
            color: "Black".into(),
            gender: Some("Female".into()),
            traits: None,
            creativity: None,
            format: None,
            session_id,
        }
    }

    #[tokio::test]
    async fn successful_generation_lands_in_session_history() {
        let state = state();
        let Json(session) = create_session(State(state.clone())).await;

        let Json(result) = generate_name(State(state.clone()), Json(request(Some(session.id)))).await;
        assert_eq!(result.error, None);
        assert_eq!(result.name.as_deref(), Some("Shadow"));

        let stored = state.sessions.read().get(&session.id).cloned().unwrap();
        assert_eq!(stored.history.len(), 1);
        assert_eq!(stored.history[0].name, "Shadow");
        // Descriptor values are stored normalized.
        assert_eq!(stored.history[0].species, "cat");
        assert_eq!(stored.history[0].gender.as_deref(), Some("female"));
    }

    #[tokio::test]
    async fn generation_without_a_session_touches_no_store() {
        let state = state();
        let Json(result) = generate_name(State(state.clone()), Json(request(None))).await;
        assert_eq!(result.error, None);
        assert!(state.sessions.read().is_empty());
    }

    #[tokio::test]
    async fn favorites_can_be_added_from_history_and_removed() {
        let state = state();
        let Json(session) = create_session(State(state.clone())).await;
        generate_name(State(state.clone()), Json(request(Some(session.id)))).await;

        let Json(updated) = add_favorite(
            Path(session.id),
            State(state.clone()),
            Json(FavoriteRequest { history_index: 0 }),
        )
        .await
        .unwrap();
        assert_eq!(updated.favorites.len(), 1);
        assert_eq!(updated.favorites[0].name, "Shadow");

        let Json(updated) = remove_favorite(Path((session.id, 0)), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(updated.favorites.len(), 0);
    }

    #[tokio::test]
    async fn favoriting_an_out_of_range_entry_is_a_bad_request() {
        let state = state();
        let Json(session) = create_session(State(state.clone())).await;

        let err = add_favorite(
            Path(session.id),
            State(state.clone()),
            Json(FavoriteRequest { history_index: 3 }),
        )
        .await
        .unwrap_err();
        assert_eq!(err, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let state = state();
        let err = add_favorite(
            Path(Uuid::new_v4()),
            State(state.clone()),
            Json(FavoriteRequest { history_index: 0 }),
        )
        .await
        .unwrap_err();
        assert_eq!(err, StatusCode::NOT_FOUND);
    }
}
