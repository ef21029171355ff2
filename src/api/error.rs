use crate::application::{
    library::LibraryApplicationError, notification::NotificationApplicationError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Library(LibraryApplicationError),
    Notification(NotificationApplicationError),
    /// リクエストが指すリソースが存在しない（読み取り系）
    NotFound(String),
    BadRequest(String),
}

impl From<LibraryApplicationError> for ApiError {
    fn from(err: LibraryApplicationError) -> Self {
        ApiError::Library(err)
    }
}

impl From<NotificationApplicationError> for ApiError {
    fn from(err: NotificationApplicationError) -> Self {
        ApiError::Notification(err)
    }
}

/// 500 Internal Server Error
///
/// 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
fn internal_error(
    error_type: &'static str,
    err: &(dyn std::error::Error + Send + Sync),
) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %err, error_type, "Store failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_type,
        "An unexpected error occurred".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 404 Not Found - リクエストされたリソースが存在しない
            ApiError::Library(ref e @ LibraryApplicationError::BookNotFound(_)) => {
                (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", e.to_string())
            }
            ApiError::Notification(ref e @ NotificationApplicationError::BookNotFound(_)) => {
                (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", e.to_string())
            }
            ApiError::Notification(ref e @ NotificationApplicationError::LoanNotFound(_)) => {
                (StatusCode::NOT_FOUND, "LOAN_NOT_FOUND", e.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),

            // 409 Conflict - 現在の状態では実行できない
            ApiError::Library(ref e @ LibraryApplicationError::BookHasActiveLoans(_)) => {
                (StatusCode::CONFLICT, "BOOK_HAS_ACTIVE_LOANS", e.to_string())
            }
            ApiError::Notification(ref e @ NotificationApplicationError::LoanNotOverdue(_)) => {
                (StatusCode::CONFLICT, "LOAN_NOT_OVERDUE", e.to_string())
            }

            // 400 Bad Request
            ApiError::Library(ref e @ LibraryApplicationError::InvalidLoanPeriod(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_LOAN_PERIOD", e.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),

            // 500 Internal Server Error - ストア障害
            ApiError::Library(LibraryApplicationError::BookStoreError(ref e))
            | ApiError::Notification(NotificationApplicationError::BookStoreError(ref e)) => {
                internal_error("BOOK_STORE_ERROR", e.as_ref())
            }
            ApiError::Library(LibraryApplicationError::LoanStoreError(ref e))
            | ApiError::Notification(NotificationApplicationError::LoanStoreError(ref e)) => {
                internal_error("LOAN_STORE_ERROR", e.as_ref())
            }
            ApiError::Notification(NotificationApplicationError::NotificationStoreError(ref e)) => {
                internal_error("NOTIFICATION_STORE_ERROR", e.as_ref())
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
