use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use remat_core::classification::ClassificationError;
use remat_core::deposit::DepositRejection;
use remat_core::error::CoreError;
use serde_json::{json, Value};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{"error": message, "code": CODE}`, plus variant-specific fields.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `remat_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx outside a deposit.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The image could not be read or the classifier could not be used.
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    /// The deposit engine refused the deposit.
    #[error(transparent)]
    Rejected(#[from] DepositRejection),

    /// A deposit's unit of work hit a transient store failure and was rolled
    /// back. Safe to retry. Build with [`AppError::from_deposit_failure`].
    #[error("Deposit could not be recorded: {0}")]
    Persistence(sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Map a failed deposit unit of work. Connection-level and
    /// transaction-rollback failures are retryable; constraint and data
    /// errors are not and go through the ordinary database mapping.
    pub fn from_deposit_failure(err: sqlx::Error) -> Self {
        if is_transient(&err) {
            AppError::Persistence(err)
        } else {
            AppError::Database(err)
        }
    }
}

/// Whether retrying the same statement could succeed.
fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        // Classes 08 (connection), 40 (serialization, deadlock), 53
        // (insufficient resources), 57P (server shutting down).
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| {
            code.starts_with("08")
                || code.starts_with("40")
                || code.starts_with("53")
                || code.starts_with("57P")
        }),
        _ => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut extra: Option<Value> = None;

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Classification ---
            AppError::Classification(ClassificationError::Input(msg)) => {
                (StatusCode::BAD_REQUEST, "INPUT_ERROR", msg.clone())
            }
            AppError::Classification(ClassificationError::ModelUnavailable(msg)) => {
                tracing::warn!(error = %msg, "Classifier unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MODEL_UNAVAILABLE",
                    "The classifier is unavailable".to_string(),
                )
            }

            // --- Deposit outcomes ---
            AppError::Rejected(rejection) => {
                extra = serde_json::to_value(rejection).ok();
                (
                    rejection_status(rejection),
                    rejection.code(),
                    rejection.to_string(),
                )
            }
            AppError::Persistence(err) => {
                tracing::error!(error = %err, "Deposit persistence failure");
                extra = Some(json!({ "retryable": true }));
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PERSISTENCE_FAILURE",
                    "The deposit could not be recorded; no changes were made".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let (Some(Value::Object(fields)), Value::Object(target)) = (extra, &mut body) {
            target.extend(fields);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// HTTP status for each deposit rejection.
fn rejection_status(rejection: &DepositRejection) -> StatusCode {
    match rejection {
        DepositRejection::BinNotFound { .. } | DepositRejection::UserNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        DepositRejection::BinUnavailable { .. } | DepositRejection::BinFull { .. } => {
            StatusCode::CONFLICT
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Check constraint violations (`ck_*`) map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // PostgreSQL unique constraint violation
                Some("23505") if constraint.starts_with("uq_") => {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
                // PostgreSQL check constraint violation
                Some("23514") if constraint.starts_with("ck_") => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        format!("Value violates check constraint: {constraint}"),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
