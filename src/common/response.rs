use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON envelope used by every endpoint the web UI itself serves
///
/// ```json
/// {"success": true, "data": {...}}
/// {"success": false, "error": {"code": "Not Found", "message": "..."}}
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    pub success: bool,

    #[serde(skip)]
    pub http_status: StatusCode,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK carrying `data`
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            success: true,
            http_status: StatusCode::OK,
        }
    }

    /// Error response; `code` is the canonical reason phrase of `status`
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(ApiError {
                code: status.canonical_reason().unwrap_or("Error").to_string(),
                message: message.into(),
            }),
            success: false,
            http_status: status,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_envelope_uses_reason_phrase() {
        let response: ApiResponse<()> = ApiResponse::error(StatusCode::NOT_FOUND, "no such page");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "error": {"code": "Not Found", "message": "no such page"},
                "success": false
            })
        );
    }

    #[test]
    fn success_envelope_skips_error() {
        let value = serde_json::to_value(ApiResponse::success(json!({"ok": 1}))).unwrap();
        assert_eq!(value, json!({"data": {"ok": 1}, "success": true}));
    }
}
