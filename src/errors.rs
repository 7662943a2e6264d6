// errors.rs
use serde::Serialize;
use thiserror::Error;

/// One problem found while validating an imported CSV file.
/// Rows are 1-based and count the header as row 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportIssue {
    pub row: usize,
    pub column: String,
    pub message: String,
}

/// Errors originating from either the server logic
/// (routing, missing resources, etc.) or downstream layers (DB, mail, insights).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// A write lost against existing state, e.g. an already-claimed floor.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Import rejected with {} problem(s)", .0.len())]
    Import(Vec<ImportIssue>),
    #[error("Database Error: {0}")]
    DbError(String),
    #[error("Spreadsheet Error: {0}")]
    XlsxError(String),
    #[error("Upstream Error: {0}")]
    Upstream(String),
    #[error("Service Unavailable: {0}")]
    Unavailable(String),
    #[error("Internal Server Error")]
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Unauthorized(_) => 401,
            ServerError::Forbidden(_) => 403,
            ServerError::Conflict(_) => 409,
            ServerError::Import(_) => 422,
            ServerError::Upstream(_) => 502,
            ServerError::Unavailable(_) => 503,
            ServerError::DbError(_) | ServerError::XlsxError(_) | ServerError::InternalError => 500,
        }
    }

    /// Short machine-readable name used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::NotFound => "not_found",
            ServerError::BadRequest(_) => "bad_request",
            ServerError::Unauthorized(_) => "unauthorized",
            ServerError::Forbidden(_) => "forbidden",
            ServerError::Conflict(_) => "conflict",
            ServerError::Import(_) => "import_rejected",
            ServerError::DbError(_) => "database",
            ServerError::XlsxError(_) => "spreadsheet",
            ServerError::Upstream(_) => "upstream",
            ServerError::Unavailable(_) => "unavailable",
            ServerError::InternalError => "internal",
        }
    }
}

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        ServerError::DbError(e.to_string())
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("invalid JSON: {e}"))
    }
}

/// True when a SQLite write failed on a UNIQUE / CHECK constraint.
pub fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
