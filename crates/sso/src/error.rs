use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// The callback arrived without a usable `token` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no token received")]
pub struct MissingTokenError;

/// Why a single profile request to the provider failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileFetchError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {message}")]
    Http { status: u16, message: String },
    #[error("malformed profile response: {0}")]
    Malformed(String),
}

/// Error body the provider sends alongside non-2xx responses.
#[derive(Deserialize)]
struct ProviderErrorBody {
    message: String,
}

impl ProfileFetchError {
    pub(crate) fn from_error_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ProviderErrorBody>(body)
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });
        Self::Http {
            status: status.as_u16(),
            message,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        let err = err.without_url();
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Transport(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_message_is_surfaced() {
        let err = ProfileFetchError::from_error_response(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid token"}"#,
        );
        assert_eq!(
            err,
            ProfileFetchError::Http {
                status: 401,
                message: "Invalid token".to_string()
            }
        );
    }

    #[test]
    fn falls_back_to_status_reason() {
        let err =
            ProfileFetchError::from_error_response(StatusCode::INTERNAL_SERVER_ERROR, "<html/>");
        assert_eq!(err.to_string(), "http 500: Internal Server Error");
    }
}
