use std::{env, time::Duration};

use axum::http::HeaderValue;
use sso::ProviderConfig;
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::delivery::DeliveryMode;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_PROFILE_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),
    #[error("invalid value for environment variable `{0}`")]
    InvalidVar(&'static str),
    #[error(transparent)]
    Provider(#[from] sso::ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub listen_addr: String,
    pub environment: Environment,
    pub token_delivery: DeliveryMode,
    pub cors_allowed_origins: Vec<HeaderValue>,
    pub profile_fetch_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::MissingVar(key));

        let provider = ProviderConfig::new(
            required("CLIENT_ID")?,
            required("CLIENT_SECRET")?,
            required("SSO_URL")?,
            required("CALLBACK_URL")?,
        )?;

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidVar("PORT"))?,
            None => DEFAULT_PORT,
        };

        let environment = match lookup("APP_ENV") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidVar("APP_ENV"))?,
            None => Environment::Development,
        };

        let token_delivery = match lookup("TOKEN_DELIVERY") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidVar("TOKEN_DELIVERY"))?,
            None => DeliveryMode::Cookie,
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                // Credentialed CORS needs explicit origins.
                if origin == "*" {
                    return Err(ConfigError::InvalidVar("CORS_ALLOWED_ORIGINS"));
                }
                HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::InvalidVar("CORS_ALLOWED_ORIGINS"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let profile_fetch_timeout = match lookup("PROFILE_FETCH_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidVar("PROFILE_FETCH_TIMEOUT_SECS")),
            },
            None => Duration::from_secs(DEFAULT_PROFILE_FETCH_TIMEOUT_SECS),
        };

        Ok(Self {
            provider,
            listen_addr: format!("{host}:{port}"),
            environment,
            token_delivery,
            cors_allowed_origins,
            profile_fetch_timeout,
        })
    }
}
