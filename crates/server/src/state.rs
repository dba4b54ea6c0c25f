use std::time::Duration;

use axum::http::HeaderValue;
use sso::{ProfileFetchError, SessionToken, SsoClient, UserProfile};

use crate::{config::AppConfig, delivery::TokenDelivery};

#[derive(Debug, Clone)]
pub struct AppState {
    sso: SsoClient,
    delivery: TokenDelivery,
    profile_fetch_timeout: Duration,
    cors_allowed_origins: Vec<HeaderValue>,
}

impl AppState {
    pub fn new(
        sso: SsoClient,
        delivery: TokenDelivery,
        profile_fetch_timeout: Duration,
        cors_allowed_origins: Vec<HeaderValue>,
    ) -> Self {
        Self {
            sso,
            delivery,
            profile_fetch_timeout,
            cors_allowed_origins,
        }
    }

    pub fn from_config(config: AppConfig) -> Result<Self, sso::ConfigError> {
        let delivery = TokenDelivery::new(config.token_delivery, config.environment);
        let sso = SsoClient::new(config.provider)?;
        Ok(Self::new(
            sso,
            delivery,
            config.profile_fetch_timeout,
            config.cors_allowed_origins,
        ))
    }

    pub fn sso(&self) -> &SsoClient {
        &self.sso
    }

    pub fn delivery(&self) -> &TokenDelivery {
        &self.delivery
    }

    pub fn cors_allowed_origins(&self) -> &[HeaderValue] {
        &self.cors_allowed_origins
    }

    /// Profile fetch bounded by the configured deadline.
    pub async fn fetch_profile(
        &self,
        token: &SessionToken,
    ) -> Result<UserProfile, ProfileFetchError> {
        match tokio::time::timeout(
            self.profile_fetch_timeout,
            self.sso.fetch_user_profile(token),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.profile_fetch_timeout.as_millis() as u64,
                    "profile fetch deadline elapsed"
                );
                Err(ProfileFetchError::Timeout)
            }
        }
    }
}
