//! Batch change execution handler.
//!
//! Translates one HTTP request into one stored-procedure invocation:
//! normalizes the caller identity, validates the action parameter and
//! payload shape, joins the batch into a single parameter set, executes
//! `usp_UserAction`, and reduces the result rows into one JSON response.

use axum::{
    extract::{Query, State},
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApiError,
    identity::{normalize_user_name, ANONYMOUS_USER},
    payload::{self, ChangeItem, MAX_PAYLOAD_BYTES},
    procedure::{invoke_user_action, ProcParams},
    reduce::AggregatedResult,
    server::AppState,
};

/// Query string for the execution endpoint.
#[derive(Debug, Deserialize)]
pub struct ExecProcQuery {
    /// Name of the action the procedure should perform.
    #[serde(default)]
    pub action: Option<String>,
}

/// Success body for a fully successful batch.
#[derive(Debug, Serialize)]
pub struct ExecProcResponse {
    /// Always null; reserved confirmation slot in the upstream contract.
    #[serde(rename = "ConfirmationMessageCode")]
    pub confirmation_message_code: Option<String>,
    /// Always null; reserved confirmation slot in the upstream contract.
    #[serde(rename = "ConfirmationMessage")]
    pub confirmation_message: Option<String>,
    /// First-seen procedure result code.
    #[serde(rename = "MessageCode")]
    pub message_code: String,
    /// All result messages combined, successes first.
    #[serde(rename = "Message")]
    pub message: String,
}

/// Executes a batch of change items as one stored-procedure call.
///
/// Pipeline: Parse → Validate → Connect → Invoke → Reduce → Respond.
/// Every stage is a terminal failure point; there are no retries and no
/// partial successes beyond the mixed-message reduction.
#[instrument(
    name = "exec_proc",
    skip(state, query, headers, body),
    fields(
        content_length = headers.get(CONTENT_LENGTH).and_then(|v| v.to_str().ok()).unwrap_or("unknown"),
    )
)]
pub async fn exec_proc(
    Query(query): Query<ExecProcQuery>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let raw_user =
        headers.get("UserName").and_then(|v| v.to_str().ok()).unwrap_or(ANONYMOUS_USER);
    let user_name = normalize_user_name(raw_user).to_string();

    let action = match query.action {
        Some(ref action) if !action.trim().is_empty() => action.clone(),
        _ => {
            warn!("Missing or blank 'action' query parameter");
            return ApiError::MissingAction.into_response();
        },
    };

    if let Err(too_large) = check_payload_size(&headers, &body) {
        warn!(body_len = body.len(), limit = MAX_PAYLOAD_BYTES, "Payload exceeds size limit");
        return too_large.into_response();
    }

    let raw_items = match payload::parse_items(&body) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Payload rejected");
            return ApiError::from(e).into_response();
        },
    };

    // Required keys are checked before any database work.
    let items = match payload::validate_items(&raw_items) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Item validation failed");
            return ApiError::from(e).into_response();
        },
    };

    let params = build_params(action, &items, user_name);

    info!(
        action = %params.action,
        user_name = %params.user_name,
        item_count = items.len(),
        "Invoking user-action procedure"
    );

    let mut conn = match state.pool.acquire().await {
        Ok(conn) => conn,
        Err(e) => {
            warn!(error = %e, "Failed to acquire database connection");
            return ApiError::ConnectionFailed.into_response();
        },
    };

    let rows = match invoke_user_action(&mut *conn, &params).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, "Procedure execution failed");
            return ApiError::Sql { message: e.to_string(), detail: format!("{e:?}"), params }
                .into_response();
        },
    };

    let result = AggregatedResult::reduce(&rows);
    let Some(final_code) = result.final_code.clone() else {
        warn!("Procedure returned no result rows");
        return ApiError::NoResults.into_response();
    };

    debug!(
        final_code = %final_code,
        success_rows = result.success_messages.len(),
        error_rows = result.error_messages.len(),
        "Procedure result reduced"
    );

    if result.has_errors() {
        return ApiError::ProcedureFailure {
            code: final_code,
            message: result.combined_message(),
        }
        .into_response();
    }

    (
        StatusCode::OK,
        Json(ExecProcResponse {
            confirmation_message_code: None,
            confirmation_message: None,
            message_code: final_code,
            message: result.combined_message(),
        }),
    )
        .into_response()
}

/// Rejects payloads whose declared or actual size exceeds the limit.
///
/// The declared `Content-Length` is checked first so oversized bodies
/// are refused without parsing.
fn check_payload_size(headers: &HeaderMap, body: &Bytes) -> Result<(), ApiError> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());

    if declared.is_some_and(|len| len > MAX_PAYLOAD_BYTES) {
        return Err(ApiError::PayloadTooLarge);
    }

    if body.len() as u64 > MAX_PAYLOAD_BYTES {
        return Err(ApiError::PayloadTooLarge);
    }

    Ok(())
}

/// Builds the four-parameter set for the procedure call.
///
/// All items share the same change value; only the first item's value is
/// forwarded.
fn build_params(action: String, items: &[ChangeItem], user_name: String) -> ProcParams {
    ProcParams {
        action,
        internal_id: payload::join_internal_ids(items),
        change_value: items[0].change_value.to_param_string(),
        user_name,
    }
}
