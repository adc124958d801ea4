use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::{repo::UserStore, repo_types::User},
    error::AppError,
    state::AppState,
};

/// Pulls the token out of an `Authorization` header. Both a bare token and
/// `Bearer <token>` are accepted. `Ok(None)` means no token was sent.
fn bearer_token(header: Option<&HeaderValue>) -> Result<Option<&str>, AppError> {
    let Some(value) = header else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("invalid token".into()))?
        .trim();

    let token = match raw.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if raw.eq_ignore_ascii_case("bearer") => "",
        _ => raw,
    };
    Ok((!token.is_empty()).then_some(token))
}

/// Resolves the request's token to a user, or short-circuits with `Unauthorized`.
/// Reads only.
pub async fn authenticate(
    users: &dyn UserStore,
    header: Option<&HeaderValue>,
) -> Result<User, AppError> {
    let token = bearer_token(header)?
        .ok_or_else(|| AppError::Unauthorized("missing token".into()))?;

    match users.find_by_token(token).await? {
        Some(user) => Ok(user),
        None => {
            warn!("request with unknown access token");
            Err(AppError::Unauthorized("invalid token".into()))
        }
    }
}

/// Id of the authenticated caller. Declaring it in a handler puts the route behind
/// [`authenticate`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(state.users.as_ref(), parts.headers.get(AUTHORIZATION)).await?;
        Ok(AuthUser(user.id))
    }
}
