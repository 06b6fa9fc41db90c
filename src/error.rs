use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, AppError>;

/// Domain errors from the transfer core (spec.md §7).
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("account {0} not found")]
    AccountNotFound(Uuid),

    #[error("currency mismatch: source is {from}, destination is {to}")]
    CurrencyMismatch { from: String, to: String },

    #[error("insufficient funds on account {account_id}: {reason}")]
    InsufficientFunds { account_id: Uuid, reason: String },

    #[error("invalid transaction ({kind}): {detail}")]
    InvalidTransaction { kind: &'static str, detail: String },

    #[error("balance verification failed for account {account_id}: expected {expected}, got {actual}")]
    BalanceVerification {
        account_id: Uuid,
        expected: Decimal,
        actual: Decimal,
    },
}

/// Top-level application error, unifying domain errors with the ambient stack.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    status: u16,
    message: String,
    timestamp: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<std::collections::HashMap<String, String>>,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Transfer(TransferError::AccountNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Transfer(TransferError::CurrencyMismatch { .. }) => StatusCode::BAD_REQUEST,
            AppError::Transfer(TransferError::InsufficientFunds { .. }) => StatusCode::BAD_REQUEST,
            AppError::Transfer(TransferError::InvalidTransaction { .. }) => StatusCode::BAD_REQUEST,
            AppError::Transfer(TransferError::BalanceVerification { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Redis(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Renders the bit-exact error envelope from spec.md §6. `path` is filled in
/// by the handler via [`AppError::at_path`] where the route is known.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, AppError::Database(_) | AppError::Internal(_) | AppError::Redis(_)) {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let status = self.status_code();
        let envelope = ErrorEnvelope {
            status: status.as_u16(),
            message: self.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            path: String::new(),
            field_errors: None,
        };
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_not_found_maps_to_404() {
        let err = AppError::Transfer(TransferError::AccountNotFound(Uuid::nil()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn currency_mismatch_maps_to_400() {
        let err = AppError::Transfer(TransferError::CurrencyMismatch {
            from: "EUR".into(),
            to: "USD".into(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn balance_verification_maps_to_500() {
        let err = AppError::Transfer(TransferError::BalanceVerification {
            account_id: Uuid::nil(),
            expected: Decimal::ZERO,
            actual: Decimal::ONE,
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
