//! HTTP Error Mapping
//!
//! Every launcher error becomes HTTP 500 with `{success: false, error}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cusf_core::LauncherError;
use thiserror::Error;
use tracing::error;

use crate::types::ErrorResponse;

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] pub LauncherError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        error!(error = %message, "Request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = std::result::Result<Json<T>, ApiError>;
