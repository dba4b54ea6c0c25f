//! HTTP side of the SSO session: login redirect, callback token, profile fetch.

use std::{collections::HashMap, fmt, sync::Arc};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::{ConfigError, ProviderConfig},
    error::{MissingTokenError, ProfileFetchError},
    profile::UserProfile,
    token::SessionToken,
};

const USER_AGENT: &str = concat!("sso-client/", env!("CARGO_PKG_VERSION"));
const CLIENT_SECRET_HEADER: &str = "x-client-secret";
const TOKEN_PARAM: &str = "token";

/// `encodeURIComponent` set, except `'` is escaped as the URL parser would anyway.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

#[derive(Serialize)]
struct ProfileRequest<'a> {
    client_id: &'a str,
}

/// Client for one SSO provider registration.
///
/// Holds no per-user state, so a single instance is shared by every request.
#[derive(Clone)]
pub struct SsoClient {
    config: Arc<ProviderConfig>,
    http: Client,
}

impl fmt::Debug for SsoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoClient")
            .field("provider", &self.config.provider_base_url())
            .field("client_id", &self.config.client_id())
            .finish()
    }
}

impl SsoClient {
    /// Builds a client with its own connection pool and no request timeout.
    pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Uses a caller-configured HTTP client, e.g. one with a timeout.
    pub fn with_http_client(config: ProviderConfig, http: Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Provider login page carrying `client_id` and the encoded `callback_url`.
    pub fn login_url(&self) -> Url {
        let query = format!(
            "client_id={}&callback_url={}",
            utf8_percent_encode(self.config.client_id(), QUERY_COMPONENT),
            utf8_percent_encode(self.config.callback_url(), QUERY_COMPONENT),
        );
        let mut url = self.config.login_endpoint().clone();
        url.set_query(Some(&query));
        url
    }

    /// Pulls the session token out of the callback query parameters.
    pub fn extract_token(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<SessionToken, MissingTokenError> {
        let raw = params.get(TOKEN_PARAM).cloned().unwrap_or_default();
        let token = SessionToken::new(raw).inspect_err(|_| {
            debug!("callback query has no token");
        })?;
        debug!(token_len = token.as_str().len(), "token extracted from callback");
        Ok(token)
    }

    /// Fetches the current user's profile. One attempt, no retries.
    pub async fn fetch_user_profile(
        &self,
        token: &SessionToken,
    ) -> Result<UserProfile, ProfileFetchError> {
        let result = self.request_profile(token).await;
        match &result {
            Ok(profile) => debug!(fields = profile.as_map().len(), "fetched user profile"),
            Err(error) => warn!(
                %error,
                endpoint = %self.config.profile_endpoint(),
                "failed to fetch user profile"
            ),
        }
        result
    }

    async fn request_profile(&self, token: &SessionToken) -> Result<UserProfile, ProfileFetchError> {
        let mut request = self
            .http
            .post(self.config.profile_endpoint().clone())
            .bearer_auth(token.as_str())
            .json(&ProfileRequest {
                client_id: self.config.client_id(),
            });
        if let Some(secret) = self.config.client_secret_header() {
            request = request.header(CLIENT_SECRET_HEADER, secret);
        }

        let res = request.send().await.map_err(ProfileFetchError::from_reqwest)?;

        let status = res.status();
        if !status.is_success() {
            let body = match res.text().await {
                Ok(body) => body,
                Err(error) => {
                    debug!(%error, status = status.as_u16(), "could not read error response body");
                    String::new()
                }
            };
            return Err(ProfileFetchError::from_error_response(status, &body));
        }

        let body = res.bytes().await.map_err(ProfileFetchError::from_reqwest)?;
        serde_json::from_slice::<UserProfile>(&body)
            .map_err(|e| ProfileFetchError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALLBACK: &str = "http://localhost:4000/callback?next=/home";

    fn client() -> SsoClient {
        let config =
            ProviderConfig::new("abc123", "top-secret", "https://sso.test/", CALLBACK).unwrap();
        SsoClient::new(config).unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn login_url_carries_client_id_and_encoded_callback_once() {
        let url = client().login_url();
        let rendered = url.as_str();

        assert!(rendered.starts_with("https://sso.test/sso/login?"));
        assert!(rendered.contains("client_id=abc123"));

        let encoded = "http%3A%2F%2Flocalhost%3A4000%2Fcallback%3Fnext%3D%2Fhome";
        assert_eq!(rendered.matches(encoded).count(), 1);
        assert!(!rendered.contains(CALLBACK));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("client_id".to_string(), "abc123".to_string()),
                ("callback_url".to_string(), CALLBACK.to_string()),
            ]
        );
    }

    #[test]
    fn login_url_encodes_like_encode_uri_component() {
        let config = ProviderConfig::new(
            "my app",
            "top-secret",
            "https://sso.test",
            "http://rp.test/cb?x=a b~c(1)*",
        )
        .unwrap();
        let url = SsoClient::new(config).unwrap().login_url();

        assert_eq!(
            url.query(),
            Some("client_id=my%20app&callback_url=http%3A%2F%2Frp.test%2Fcb%3Fx%3Da%20b~c(1)*")
        );
        assert!(!url.as_str().contains('+'));
    }

    #[test]
    fn login_url_is_deterministic_and_keeps_secret_out() {
        let client = client();
        assert_eq!(client.login_url(), client.login_url());
        assert!(!client.login_url().as_str().contains("top-secret"));
    }

    #[test]
    fn extract_token_requires_non_empty_value() {
        let client = client();
        assert_eq!(client.extract_token(&params(&[])), Err(MissingTokenError));
        assert_eq!(
            client.extract_token(&params(&[("token", "")])),
            Err(MissingTokenError)
        );
        assert_eq!(
            client.extract_token(&params(&[("state", "abc")])),
            Err(MissingTokenError)
        );

        let token = client.extract_token(&params(&[("token", "abc")])).unwrap();
        assert_eq!(token.as_str(), "abc");
    }

    #[test]
    fn extract_token_accepts_any_non_empty_string() {
        let token = client()
            .extract_token(&params(&[("token", "not a jwt!")]))
            .unwrap();
        assert_eq!(token.as_str(), "not a jwt!");
    }

    #[test]
    fn debug_omits_secret() {
        assert!(!format!("{:?}", client()).contains("top-secret"));
    }
}
