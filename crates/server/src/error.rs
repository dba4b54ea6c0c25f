use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sso::{MissingTokenError, ProfileFetchError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    MissingToken(#[from] MissingTokenError),
    #[error(transparent)]
    ProfileFetch(#[from] ProfileFetchError),
    #[error("Unauthorized")]
    Unauthorized,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingToken(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::ProfileFetch(ProfileFetchError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::ProfileFetch(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn user_message(&self) -> String {
        match self {
            ApiError::MissingToken(err) => err.to_string(),
            ApiError::Unauthorized => "Missing or invalid bearer token".to_string(),
            ApiError::ProfileFetch(err) => match err {
                ProfileFetchError::Timeout => {
                    "Identity provider timeout. Please try again.".to_string()
                }
                ProfileFetchError::Transport(_) => {
                    "Identity provider unavailable. Please try again.".to_string()
                }
                ProfileFetchError::Http { status, message } => {
                    format!("Failed to fetch user profile ({status}): {message}")
                }
                ProfileFetchError::Malformed(_) => {
                    "Unexpected response from identity provider.".to_string()
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, %status, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::from(MissingTokenError).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(ProfileFetchError::Timeout).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(ProfileFetchError::Http {
                status: 401,
                message: "Token expired".into()
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn transport_details_stay_in_the_logs() {
        let err = ApiError::from(ProfileFetchError::Transport(
            "error sending request: connection refused (10.0.0.7:443)".into(),
        ));
        assert!(!err.user_message().contains("10.0.0.7"));
    }

    #[test]
    fn missing_token_message() {
        assert_eq!(ApiError::from(MissingTokenError).user_message(), "no token received");
    }
}
