use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const LOGIN_PATH: &str = "sso/login";
const PROFILE_PATH: &str = "api/user/me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{0}` must not be empty")]
    Empty(&'static str),
    #[error("`{field}` is not an absolute http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("`client_secret` contains characters that cannot be sent in a header")]
    InvalidSecret,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Registration of this relying party with the SSO provider.
///
/// Built once at startup and never mutated. The secret is only ever exposed
/// to build the outbound profile request.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    client_id: String,
    client_secret: SecretString,
    provider_base_url: String,
    callback_url: String,
    login_endpoint: Url,
    profile_endpoint: Url,
}

impl ProviderConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        provider_base_url: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let client_id = non_empty("client_id", client_id.into())?;
        let client_secret = non_empty("client_secret", client_secret.into())?;
        let provider_base_url = non_empty("provider_base_url", provider_base_url.into())?;
        let callback_url = non_empty("callback_url", callback_url.into())?;

        if HeaderValue::from_str(&client_secret).is_err() {
            return Err(ConfigError::InvalidSecret);
        }

        let base = parse_http_url("provider_base_url", &provider_base_url)?;
        if base.query().is_some() || base.fragment().is_some() {
            return Err(ConfigError::InvalidUrl {
                field: "provider_base_url",
                value: provider_base_url,
            });
        }
        parse_http_url("callback_url", &callback_url)?;

        // Keep any path prefix on the base; only the trailing slash is dropped.
        let provider_base_url = provider_base_url.trim_end_matches('/').to_string();
        let login_endpoint = endpoint(&provider_base_url, LOGIN_PATH)?;
        let profile_endpoint = endpoint(&provider_base_url, PROFILE_PATH)?;

        Ok(Self {
            client_id,
            client_secret: SecretString::new(client_secret.into()),
            provider_base_url,
            callback_url,
            login_endpoint,
            profile_endpoint,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }

    /// Provider base URL without a trailing slash.
    pub fn provider_base_url(&self) -> &str {
        &self.provider_base_url
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    pub(crate) fn login_endpoint(&self) -> &Url {
        &self.login_endpoint
    }

    pub(crate) fn profile_endpoint(&self) -> &Url {
        &self.profile_endpoint
    }

    pub(crate) fn client_secret_header(&self) -> Option<HeaderValue> {
        let mut value = HeaderValue::from_str(self.client_secret.expose_secret()).ok()?;
        value.set_sensitive(true);
        Some(value)
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(field));
    }
    Ok(value)
}

fn parse_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(invalid()),
    }
}

fn endpoint(base: &str, path: &str) -> Result<Url, ConfigError> {
    Url::parse(&format!("{base}/{path}")).map_err(|_| ConfigError::InvalidUrl {
        field: "provider_base_url",
        value: base.to_string(),
    })
}
