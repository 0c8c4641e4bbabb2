//! Unified error handling for the admin app.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::bigcommerce::BigCommerceError;
use crate::services::BundleError;

/// Message returned for every 5xx response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// BigCommerce API operation failed.
    #[error("BigCommerce error: {0}")]
    BigCommerce(#[from] BigCommerceError),

    /// Building the bundle report failed.
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// No store session could be resolved for the request.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Only GET is supported on the route.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body: `{"message": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BigCommerce(_) | Self::Bundle(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            _ if status.is_server_error() => INTERNAL_ERROR_MESSAGE.to_string(),
            Self::Unauthorized(msg)
            | Self::MethodNotAllowed(msg)
            | Self::Internal(msg) => msg.clone(),
            _ => self.to_string(),
        };

        let mut response = (status, Json(ErrorBody { message })).into_response();
        if status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET"));
        }
        response
    }
}
