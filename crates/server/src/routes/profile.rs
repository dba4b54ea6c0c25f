use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::get,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use sso::{SessionToken, UserProfile};

use crate::{AppState, error::ApiError};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/profile", get(get_profile))
}

/// Proxies the profile request with the caller's bearer token.
async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let token = headers
        .typed_get::<Authorization<Bearer>>()
        .and_then(|auth| SessionToken::new(auth.token()).ok())
        .ok_or(ApiError::Unauthorized)?;

    let profile = state.fetch_profile(&token).await?;
    Ok(Json(profile))
}
