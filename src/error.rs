use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the API. Every variant maps to a fixed status code and
/// the message is surfaced verbatim in the JSON body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Immutable(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Failed to delete {failed} of {attempted} servers")]
    Aggregate { failed: usize, attempted: usize },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) | ApiError::Immutable(_) => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Duplicate(_) => Status::Conflict,
            ApiError::Upstream(_) | ApiError::Aggregate { .. } | ApiError::Internal(_) => {
                Status::InternalServerError
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        log::error!("{} {}: {}", req.method(), req.uri(), self);

        let body = match &self {
            // Ticket submission failures keep the shape the calendar UI reads.
            ApiError::Upstream(e) => json!({ "status": "Failed", "error": e }),
            ApiError::Aggregate { failed, attempted } => json!({
                "success": false,
                "message": self.to_string(),
                "failedCount": failed,
                "deletedCount": attempted - failed,
            }),
            _ => json!({ "success": false, "message": self.to_string() }),
        };

        let status = self.status();
        rocket::response::status::Custom(status, Json(body)).respond_to(req)
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => ApiError::NotFound("Record not found".into()),
            // cid is the only unique key in the schema
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => ApiError::Duplicate("Server with this CID already exists".into()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(e: r2d2::Error) -> Self {
        ApiError::Internal(format!("Failed to get DB connection: {e}"))
    }
}
