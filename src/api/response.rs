use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Wrapper for API responses that adds the `{ success: 0|1, data }` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
    pub success: u8,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: StatusCode::OK,
            success: 1,
        }
    }

    /// 201 Created response
    pub fn created(data: T) -> Self {
        Self {
            data,
            status_code: StatusCode::CREATED,
            success: 1,
        }
    }

    /// 200 response whose envelope carries `success: 0`. Used for flows
    /// that complete but report a negative outcome (e.g. resending a
    /// verification mail for an account that is already verified).
    pub fn rejected(data: T) -> Self {
        Self {
            data,
            status_code: StatusCode::OK,
            success: 0,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": 0, "data": "Server side error" })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": self.success,
            "data": data_value,
        });

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
