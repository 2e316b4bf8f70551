use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futurist_core::error::CoreError;
use futurist_core::types::DbId;
use serde_json::json;

/// Message returned for every 500; details go to the log only.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error type returned by every handler and extractor.
///
/// Domain failures arrive as [`CoreError`]; the rest are HTTP or storage
/// concerns. Rendered as `{"error": message, "code": CODE}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed request the framework could not decode.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A missing resource not addressed by a numeric id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller is locked out; `retry_after_secs` becomes `Retry-After`.
    #[error("Too many requests: {message}")]
    TooManyRequests {
        message: String,
        retry_after_secs: u64,
    },

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Core(CoreError::Unauthorized(msg.into()))
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Core(CoreError::Forbidden(msg.into()))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Core(CoreError::Validation(msg.into()))
    }

    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        AppError::Core(CoreError::NotFound { entity, id })
    }

    fn classify(&self) -> ErrorBody {
        match self {
            AppError::Core(core) => ErrorBody::from_core(core),
            AppError::Database(err) => ErrorBody::from_sqlx(err),
            AppError::BadRequest(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::NotFound(msg) => {
                ErrorBody::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone())
            }
            AppError::TooManyRequests { message, .. } => ErrorBody::new(
                StatusCode::TOO_MANY_REQUESTS,
                "TOO_MANY_ATTEMPTS",
                message.clone(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorBody::internal()
            }
        }
    }
}

/// Status, machine-readable code and client-facing message of an error.
#[derive(Debug, PartialEq, Eq)]
struct ErrorBody {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ErrorBody {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            INTERNAL_MESSAGE,
        )
    }

    fn from_core(err: &CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),
            CoreError::Validation(msg) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            CoreError::DuplicateEmail => {
                Self::new(StatusCode::BAD_REQUEST, "DUPLICATE_EMAIL", err.to_string())
            }
            CoreError::Unauthorized(msg) => {
                Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            CoreError::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        }
    }

    /// Map storage failures by SQLSTATE and constraint name.
    ///
    /// Email uniqueness is reported like the pre-insert check so a race
    /// between two registrations still yields the same 400.
    fn from_sqlx(err: &sqlx::Error) -> Self {
        let db_err = match err {
            sqlx::Error::RowNotFound => {
                return Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found");
            }
            sqlx::Error::Database(db_err) => db_err,
            other => {
                tracing::error!(error = %other, "Database error");
                return Self::internal();
            }
        };

        let constraint = db_err.constraint().unwrap_or_default();
        match db_err.code().as_deref() {
            Some("23505") if constraint == "uq_users_email" => Self::new(
                StatusCode::BAD_REQUEST,
                "DUPLICATE_EMAIL",
                CoreError::DuplicateEmail.to_string(),
            ),
            Some("23505") if constraint.starts_with("uq_") || constraint.starts_with("pk_") => {
                Self::new(
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                )
            }
            Some("23503") => Self::new(
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                "Referenced resource does not exist",
            ),
            _ => {
                tracing::error!(error = %db_err, "Database error");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let ErrorBody {
            status,
            code,
            message,
        } = self.classify();

        let mut response =
            (status, axum::Json(json!({ "error": message, "code": code }))).into_response();

        if let AppError::TooManyRequests {
            retry_after_secs, ..
        } = self
        {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
