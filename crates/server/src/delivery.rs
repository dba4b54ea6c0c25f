//! How the session token reaches the browser and where it lives afterwards.

use axum::{
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sso::SessionToken;
use strum_macros::{Display, EnumString};

use crate::{config::Environment, views};

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DeliveryMode {
    Cookie,
    ClientStorage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDelivery {
    /// HTTP-only cookie set on the callback response.
    Cookie { secure: bool },
    /// Token handed to page script and kept in `localStorage`.
    ClientStorage,
}

impl TokenDelivery {
    pub fn new(mode: DeliveryMode, environment: Environment) -> Self {
        match mode {
            DeliveryMode::Cookie => Self::Cookie {
                secure: environment.is_production(),
            },
            DeliveryMode::ClientStorage => Self::ClientStorage,
        }
    }

    pub fn mode(&self) -> DeliveryMode {
        match self {
            Self::Cookie { .. } => DeliveryMode::Cookie,
            Self::ClientStorage => DeliveryMode::ClientStorage,
        }
    }

    /// Response for a successful callback.
    pub fn deliver(&self, jar: CookieJar, token: &SessionToken) -> Response {
        match self {
            Self::Cookie { secure } => {
                let cookie = Cookie::build((TOKEN_COOKIE, token.as_str().to_owned()))
                    .http_only(true)
                    .secure(*secure)
                    .same_site(SameSite::Strict)
                    .path("/")
                    .build();
                (jar.add(cookie), Redirect::to("/")).into_response()
            }
            Self::ClientStorage => no_store(Html(views::store_token_page(token))),
        }
    }

    /// Token held by the cookie, when this strategy uses one.
    pub fn stored_token(&self, jar: &CookieJar) -> Option<SessionToken> {
        match self {
            Self::Cookie { .. } => jar
                .get(TOKEN_COOKIE)
                .and_then(|cookie| SessionToken::new(cookie.value()).ok()),
            Self::ClientStorage => None,
        }
    }

    /// Drops the stored token and sends the browser back to `/login`.
    pub fn clear(&self, jar: CookieJar) -> Response {
        match self {
            Self::Cookie { .. } => (remove_token_cookie(jar), Redirect::to("/login")).into_response(),
            Self::ClientStorage => no_store(Html(views::clear_token_page())),
        }
    }
}

pub fn remove_token_cookie(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::build((TOKEN_COOKIE, "")).path("/").build();
    cookie.make_removal();
    jar.add(cookie)
}

fn no_store(page: Html<String>) -> Response {
    ([(header::CACHE_CONTROL, "no-store")], page).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header::SET_COOKIE};

    use super::*;

    fn token() -> SessionToken {
        SessionToken::new("xyz").unwrap()
    }

    fn set_cookie(response: &Response) -> String {
        response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn secure_flag_follows_environment() {
        assert_eq!(
            TokenDelivery::new(DeliveryMode::Cookie, Environment::Production),
            TokenDelivery::Cookie { secure: true }
        );
        assert_eq!(
            TokenDelivery::new(DeliveryMode::Cookie, Environment::Development),
            TokenDelivery::Cookie { secure: false }
        );
        assert_eq!(
            TokenDelivery::new(DeliveryMode::ClientStorage, Environment::Production).mode(),
            DeliveryMode::ClientStorage
        );
    }

    #[test]
    fn cookie_delivery_sets_hardened_cookie_and_redirects_home() {
        let response =
            TokenDelivery::Cookie { secure: true }.deliver(CookieJar::new(), &token());

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let cookie = set_cookie(&response);
        assert!(cookie.starts_with("token=xyz"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn development_cookie_is_not_secure() {
        let response =
            TokenDelivery::Cookie { secure: false }.deliver(CookieJar::new(), &token());
        assert!(!set_cookie(&response).contains("Secure"));
    }

    #[test]
    fn stored_token_ignores_empty_cookie() {
        let delivery = TokenDelivery::Cookie { secure: false };
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, ""));
        assert!(delivery.stored_token(&jar).is_none());

        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "abc"));
        assert_eq!(delivery.stored_token(&jar).unwrap().as_str(), "abc");

        assert!(TokenDelivery::ClientStorage.stored_token(&jar).is_none());
    }

    #[test]
    fn cookie_clear_expires_cookie_and_redirects_to_login() {
        let response = TokenDelivery::Cookie { secure: false }.clear(CookieJar::new());

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        let cookie = set_cookie(&response);
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn client_storage_pages_are_not_cached() {
        let response = TokenDelivery::ClientStorage.deliver(CookieJar::new(), &token());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
