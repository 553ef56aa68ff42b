use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::counter::CounterError;
use crate::store::StoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    /// Operational errors are safe to show the caller; the rest are redacted.
    pub is_operational: bool,
}

impl AppError {
    fn new(status: StatusCode, code: &str, message: &str, is_operational: bool) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.to_string(),
            is_operational,
        }
    }

    pub fn bad_request(code: &str, message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message, true)
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message, true)
    }

    pub fn conflict(code: &str, message: &str) -> Self {
        Self::new(StatusCode::CONFLICT, code, message, true)
    }

    pub fn service_unavailable(message: &str) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "STORE_UNAVAILABLE",
            message,
            false,
        )
    }

    pub fn internal(message: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            message,
            false,
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let exposed_message = if self.is_operational {
            self.message.clone()
        } else {
            self.status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        };

        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        (
            self.status,
            Json(ErrorBody {
                success: false,
                code: self.code,
                message: exposed_message,
                trace_id: None,
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match &value {
            StoreError::Validation(msg) => AppError::bad_request("VALIDATION_ERROR", msg),
            StoreError::NotFound { entity, .. } => AppError::not_found(&format!("{entity} not found")),
            StoreError::Conflict { entity, key } => {
                AppError::conflict("CONFLICT", &format!("{entity} '{key}' already exists"))
            }
            StoreError::Sled(_) => AppError::service_unavailable(&value.to_string()),
            StoreError::Serialization(_) => AppError::internal(&value.to_string()),
        }
    }
}

impl From<CounterError> for AppError {
    fn from(value: CounterError) -> Self {
        match value {
            CounterError::Validation(e) => AppError::bad_request("VALIDATION_ERROR", &e.to_string()),
            CounterError::StoreUnavailable(e) => AppError::service_unavailable(&e.to_string()),
            CounterError::CorruptCounter { .. } => AppError::internal(&value.to_string()),
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    use crate::counter::ValidationError;

    use super::*;

    #[tokio::test]
    async fn internal_error_is_redacted() {
        let resp = AppError::internal("db crash").into_response();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("db crash"));
        assert!(text.contains("Internal Server Error"));
    }

    #[tokio::test]
    async fn missing_field_maps_to_400() {
        let err: AppError = CounterError::Validation(ValidationError::MissingField("keyId")).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let resp = err.into_response();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "missing required field: keyId");
    }

    #[test]
    fn store_outage_maps_to_503() {
        let err: AppError = CounterError::StoreUnavailable(StoreError::Sled(
            sled::Error::Unsupported("offline".into()),
        ))
        .into();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.is_operational);
    }

    #[test]
    fn conflict_maps_to_409() {
        let err: AppError = StoreError::Conflict {
            entity: "user".to_string(),
            key: "a@b.co".to_string(),
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
