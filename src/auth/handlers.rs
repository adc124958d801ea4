use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MeResponse, PublicUser, RegisterRequest, RegisterResponse},
        extractors::AuthUser,
        repo::UserStore,
        services,
    },
    error::AppError,
    state::AppState,
    thoughts::{dto::Envelope, repo_types::Thought, services as thoughts},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/register", post(register))
        .route("/users/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me))
        .route("/users/my-thoughts", get(my_thoughts))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, AppError> {
    let Json(payload) = payload?;
    let session = services::register(
        state.users.as_ref(),
        payload.username.as_deref().unwrap_or_default(),
        payload.password.as_deref().unwrap_or_default(),
        payload.email.as_deref(),
    )
    .await?;

    Ok(Json(RegisterResponse {
        success: true,
        message: "Signup success".into(),
        id: session.user_id,
        access_token: session.access_token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let Json(payload) = payload?;
    let session = services::login(
        state.users.as_ref(),
        payload.username.as_deref().unwrap_or_default(),
        payload.password.as_deref().unwrap_or_default(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            success: true,
            message: "User successfully logged in".into(),
            user_id: session.user_id,
            access_token: session.access_token,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let user = state.users.find_by_id(user_id).await?.ok_or_else(|| {
        error!(%user_id, "authenticated user vanished");
        AppError::Unauthorized("invalid token".into())
    })?;

    Ok(Json(MeResponse {
        success: true,
        message: "Current user".into(),
        user: PublicUser {
            username: user.username,
            email: user.email,
            id: user.id,
        },
    }))
}

#[instrument(skip(state))]
pub async fn my_thoughts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Envelope<Vec<Thought>>>, AppError> {
    let list = thoughts::list_by_owner(state.thoughts.as_ref(), user_id).await?;
    Ok(Json(Envelope::ok("Your thoughts.", list)))
}
