use std::collections::HashMap;

use axum::{
    Router,
    extract::{Query, State},
    response::{Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{AppState, error::ApiError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", get(logout))
}

async fn login(State(state): State<AppState>) -> Redirect {
    Redirect::to(state.sso().login_url().as_str())
}

async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let token = state.sso().extract_token(&params)?;
    tracing::info!(delivery = %state.delivery().mode(), "sign-in callback accepted");
    Ok(state.delivery().deliver(jar, &token))
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    tracing::debug!(delivery = %state.delivery().mode(), "signing out");
    state.delivery().clear(jar)
}
