use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    state::AppState,
    thoughts::{
        dto::{CreateThoughtRequest, Envelope, UpdateThoughtRequest},
        repo_types::Thought,
        services,
    },
};

pub fn thought_routes() -> Router<AppState> {
    Router::new()
        .route("/thoughts", get(list_thoughts).post(create_thought))
        .route("/thoughts/:id", patch(update_thought).delete(delete_thought))
        .route("/thoughts/:id/like", post(like_thought))
}

/// A malformed id cannot name any thought.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Thought not found".into()))
}

#[instrument(skip(state))]
pub async fn list_thoughts(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Thought>>>, AppError> {
    let thoughts = services::list(state.thoughts.as_ref()).await?;
    Ok(Json(Envelope::ok("Thoughts available.", thoughts)))
}

#[instrument(skip(state, payload))]
pub async fn create_thought(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateThoughtRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Thought>>), AppError> {
    let Json(payload) = payload?;
    if payload.hearts.is_some() || payload.created_at.is_some() {
        debug!("ignoring client-supplied hearts/createdAt");
    }

    let thought = services::create(state.thoughts.as_ref(), &payload.message, Some(user_id)).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("Thought posted successfully.", thought)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_thought(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateThoughtRequest>, JsonRejection>,
) -> Result<Json<Envelope<Thought>>, AppError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let thought =
        services::update(state.thoughts.as_ref(), id, &payload.new_message, user_id).await?;
    Ok(Json(Envelope::ok("Thought updated successfully.", thought)))
}

#[instrument(skip(state))]
pub async fn delete_thought(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Thought>>, AppError> {
    let id = parse_id(&id)?;
    let thought = services::delete(state.thoughts.as_ref(), id, user_id).await?;
    Ok(Json(Envelope::ok("Thought deleted successfully.", thought)))
}

#[instrument(skip(state))]
pub async fn like_thought(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Envelope<Thought>>), AppError> {
    let id = parse_id(&id)?;
    let thought = services::like(state.thoughts.as_ref(), id).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok("New like added.", thought)),
    ))
}
