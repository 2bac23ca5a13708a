//! Reduction of stored-procedure result rows into a single outcome.
//!
//! The procedure returns zero or more `(MessageCode, Message)` rows.
//! Codes prefixed `ERR_` (case-insensitive) mark failure rows. The
//! reduction keeps the first-seen code overall as the final code —
//! success or error, whichever came first in row order — and combines
//! every message into one string, successes first, errors second,
//! regardless of how the rows were interleaved.

use crate::procedure::ProcedureRow;

/// Per-request reduction of all procedure result rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregatedResult {
    /// Code of the first row seen, success or error.
    pub final_code: Option<String>,
    /// Messages from non-error rows, in row order.
    pub success_messages: Vec<String>,
    /// Messages from `ERR_`-coded rows, in row order.
    pub error_messages: Vec<String>,
}

impl AggregatedResult {
    /// Partitions rows into successes and errors and records the
    /// first-seen code.
    pub fn reduce(rows: &[ProcedureRow]) -> Self {
        let mut result = Self::default();
        for row in rows {
            if is_error_code(&row.message_code) {
                result.error_messages.push(row.message.clone());
            } else {
                result.success_messages.push(row.message.clone());
            }
            if result.final_code.is_none() {
                result.final_code = Some(row.message_code.clone());
            }
        }
        result
    }

    /// True when at least one `ERR_` row was returned; the whole request
    /// is then reported as failed.
    pub fn has_errors(&self) -> bool {
        !self.error_messages.is_empty()
    }

    /// All success messages followed by all error messages, joined with
    /// single spaces.
    pub fn combined_message(&self) -> String {
        self.success_messages
            .iter()
            .chain(self.error_messages.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `ERR_`-prefixed codes mark failure rows, case-insensitively.
fn is_error_code(code: &str) -> bool {
    code.len() >= 4 && code.as_bytes()[..4].eq_ignore_ascii_case(b"ERR_")
}
