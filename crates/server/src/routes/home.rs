use axum::{
    Router,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    delivery::{TokenDelivery, remove_token_cookie},
    views,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

async fn home(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let TokenDelivery::ClientStorage = state.delivery() {
        return Html(views::client_home_page()).into_response();
    }

    let Some(token) = state.delivery().stored_token(&jar) else {
        return Redirect::to("/login").into_response();
    };

    match state.fetch_profile(&token).await {
        Ok(profile) => Html(views::home_page(&profile)).into_response(),
        Err(error) => {
            tracing::warn!(%error, "stored token rejected; clearing session");
            (remove_token_cookie(jar), Redirect::to("/login")).into_response()
        }
    }
}
