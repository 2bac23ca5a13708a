//! Error taxonomy and HTTP response mapping.
//!
//! Every client-facing failure carries a stable `ErrorCode` so callers
//! can disambiguate without parsing message text. Validation and
//! procedure-level failures surface as structured 400 bodies;
//! infrastructure failures surface as generic 500 bodies that never
//! leak internal detail, except for the explicit `SqlError` path which
//! intentionally echoes the driver error and the request parameters.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{payload::PayloadError, procedure::ProcParams};

/// Failures surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The `action` query parameter is absent or blank.
    #[error("Missing required query parameter 'action'.")]
    MissingAction,

    /// Declared or actual payload size exceeds the limit.
    #[error("Request payload too large.")]
    PayloadTooLarge,

    /// Body is neither a JSON array of objects nor a single object, or
    /// the item list is empty.
    #[error("Invalid payload.")]
    InvalidPayload,

    /// An item is missing `internalID` and/or `changeValue`.
    #[error("Missing required params 'internalID' and/or 'changeValue'.")]
    MissingParams,

    /// Procedure execution failed; echoes the request parameters.
    #[error("{message}")]
    Sql {
        /// Driver error display text.
        message: String,
        /// Full driver error detail, for `AdditionalErrors`.
        detail: String,
        /// The parameters the call was made with.
        params: ProcParams,
    },

    /// The procedure returned zero rows.
    #[error("Stored procedure returned no results.")]
    NoResults,

    /// The procedure itself signalled failure through `ERR_` rows.
    #[error("{message}")]
    ProcedureFailure {
        /// First-seen result code, success or error.
        code: String,
        /// Combined success-then-error message text.
        message: String,
    },

    /// A pooled database connection could not be acquired.
    #[error("Database connection failed.")]
    ConnectionFailed,
}

impl ApiError {
    /// Stable code carried in the `ErrorCode` field.
    pub fn error_code(&self) -> &str {
        match self {
            Self::MissingAction => "MissingAction",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::InvalidPayload => "InvalidPayload",
            Self::MissingParams => "MissingParams",
            Self::Sql { .. } => "SqlError",
            Self::NoResults => "NoResults",
            Self::ProcedureFailure { code, .. } => code,
            Self::ConnectionFailed => "ConnectionFailed",
        }
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::Invalid => Self::InvalidPayload,
            PayloadError::MissingParams => Self::MissingParams,
        }
    }
}

/// Structured 400 body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    #[serde(rename = "ErrorCode")]
    error_code: String,
    #[serde(rename = "ErrorType")]
    error_type: u8,
    #[serde(rename = "Message")]
    message: String,
    #[serde(rename = "AdditionalErrors")]
    additional_errors: Vec<String>,
    #[serde(rename = "Data")]
    data: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, Self::ConnectionFailed) {
            let body = serde_json::json!({ "error": self.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }

        let (additional_errors, data) = match &self {
            Self::Sql { detail, params, .. } => {
                (vec![detail.clone()], serde_json::to_value(params).ok())
            },
            _ => (Vec::new(), None),
        };

        let body = ErrorBody {
            error_code: self.error_code().to_string(),
            error_type: 1,
            message: self.to_string(),
            additional_errors,
            data,
        };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ApiError::MissingAction.error_code(), "MissingAction");
        assert_eq!(ApiError::PayloadTooLarge.error_code(), "PayloadTooLarge");
        assert_eq!(ApiError::InvalidPayload.error_code(), "InvalidPayload");
        assert_eq!(ApiError::MissingParams.error_code(), "MissingParams");
        assert_eq!(ApiError::NoResults.error_code(), "NoResults");
    }

    #[test]
    fn procedure_failure_uses_first_seen_code() {
        let err = ApiError::ProcedureFailure {
            code: "OK_1".to_string(),
            message: "done bad".to_string(),
        };
        assert_eq!(err.error_code(), "OK_1");
        assert_eq!(err.to_string(), "done bad");
    }

    #[test]
    fn payload_errors_map_to_api_errors() {
        assert_eq!(ApiError::from(PayloadError::Invalid).error_code(), "InvalidPayload");
        assert_eq!(ApiError::from(PayloadError::MissingParams).error_code(), "MissingParams");
    }

    #[test]
    fn validation_errors_respond_with_400() {
        let response = ApiError::MissingAction.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn connection_failure_responds_with_500() {
        let response = ApiError::ConnectionFailed.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn sql_error_echoes_params_and_detail() {
        let err = ApiError::Sql {
            message: "syntax error".to_string(),
            detail: "Database(PgDatabaseError { ... })".to_string(),
            params: ProcParams {
                action: "release".to_string(),
                internal_id: "5,7".to_string(),
                change_value: "HOLD".to_string(),
                user_name: "bob".to_string(),
            },
        };

        assert_eq!(err.error_code(), "SqlError");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
