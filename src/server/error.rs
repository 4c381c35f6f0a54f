//! Request errors and their HTTP mapping. Every error body is `{"error": "<message>"}`.

use crate::features::FeatureError;
use crate::model::ModelError;
use crate::report::ChartError;
use crate::risk::RiskError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file part in the request")]
    NoFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("Invalid file format. Please upload a CSV file.")]
    InvalidFormat,

    #[error("Upload could not be read: {message}")]
    Upload { status: StatusCode, message: String },

    #[error("Upload exceeds the size limit")]
    TooLarge,

    #[error(transparent)]
    Features(#[from] FeatureError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Risk(#[from] RiskError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoFilePart
            | ApiError::NoSelectedFile
            | ApiError::InvalidFormat
            | ApiError::Features(FeatureError::MissingColumns(_)) => StatusCode::BAD_REQUEST,
            ApiError::Upload { status, .. } => *status,
            ApiError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Features(FeatureError::Shape(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Features(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Model(_)
            | ApiError::Risk(_)
            | ApiError::Chart(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_errors_are_bad_request() {
        for e in [ApiError::NoFilePart, ApiError::NoSelectedFile, ApiError::InvalidFormat] {
            assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        }
        let missing = ApiError::from(FeatureError::MissingColumns(vec!["Stability".into()]));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.to_string(), "Missing required columns in the CSV");
    }

    #[test]
    fn malformed_data_is_unprocessable() {
        let e = ApiError::from(FeatureError::Empty);
        assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn upload_errors_keep_their_status() {
        let e = ApiError::Upload {
            status: StatusCode::BAD_REQUEST,
            message: "incomplete multipart stream".into(),
        };
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::TooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn scoring_failures_are_server_errors() {
        let e = ApiError::from(RiskError::UnknownClass(7));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let e = ApiError::from(ModelError::Inference("boom".into()));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
