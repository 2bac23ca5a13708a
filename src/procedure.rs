//! Stored-procedure invocation.
//!
//! The whole batch is forwarded as one call to `usp_UserAction`, which
//! takes the action name, the comma-joined identifier list, the shared
//! change value, and the normalized username, and returns zero or more
//! `(MessageCode, Message)` rows.

use serde::Serialize;
use sqlx::postgres::PgConnection;

/// Set-returning invocation of the user-action procedure.
const PROCEDURE_SQL: &str =
    r#"SELECT "MessageCode", "Message" FROM "usp_UserAction"($1, $2, $3, $4)"#;

/// One result row returned by the procedure.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProcedureRow {
    /// Row outcome code; `ERR_`-prefixed codes mark failures.
    #[sqlx(rename = "MessageCode")]
    pub message_code: String,
    /// Human-readable row message.
    #[sqlx(rename = "Message")]
    pub message: String,
}

/// The four procedure parameters, in canonical string form.
///
/// Serializes to the `{action, internalID, changeValue}` echo included
/// in `SqlError` responses; the username is never echoed back.
#[derive(Debug, Clone, Serialize)]
pub struct ProcParams {
    /// Action name from the query string.
    pub action: String,
    /// Comma-joined identifiers of every item in the batch.
    #[serde(rename = "internalID")]
    pub internal_id: String,
    /// The first item's change value.
    #[serde(rename = "changeValue")]
    pub change_value: String,
    /// Normalized caller identity.
    #[serde(skip)]
    pub user_name: String,
}

/// Executes the procedure once and reads every result row.
pub async fn invoke_user_action(
    conn: &mut PgConnection,
    params: &ProcParams,
) -> Result<Vec<ProcedureRow>, sqlx::Error> {
    sqlx::query_as::<_, ProcedureRow>(PROCEDURE_SQL)
        .bind(&params.action)
        .bind(&params.internal_id)
        .bind(&params.change_value)
        .bind(&params.user_name)
        .fetch_all(conn)
        .await
}
