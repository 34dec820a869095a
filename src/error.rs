use crate::common::ApiResponse;
use crate::config::ConfigError;
use crate::lifecycle::LifecycleError;
use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebUiError>;

#[derive(Debug, Error)]
pub enum WebUiError {
    #[error("Collaborator not registered: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast collaborator: {type_name}")]
    DowncastFailed { type_name: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for WebUiError {
    fn into_response(self) -> axum::response::Response {
        let message = match &self {
            WebUiError::DependencyNotFound { .. } | WebUiError::DowncastFailed { .. } => {
                format!("System configuration error: {}", self)
            }
            _ => self.to_string(),
        };
        ApiResponse::<()>::error(StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}
