use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Every way a registry or ledger operation can fail.
///
/// The message is what the client sees in `{"error": ...}`.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum LeaveError {
    /// Malformed, missing or out-of-rule input.
    #[display(fmt = "{}", _0)]
    Validation(String),

    /// Referenced employee or leave request does not exist.
    #[display(fmt = "{}", _0)]
    NotFound(String),

    /// Duplicate email, overlapping dates or an already decided request.
    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl LeaveError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LeaveError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        LeaveError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        LeaveError::Conflict(msg.into())
    }
}

impl std::error::Error for LeaveError {}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            // conflicts stay 400 on the wire, clients already depend on it
            LeaveError::Validation(_) | LeaveError::Conflict(_) => StatusCode::BAD_REQUEST,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}
