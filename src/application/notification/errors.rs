use crate::domain::{BookId, LoanId};
use thiserror::Error;

/// 延滞通知アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum NotificationApplicationError {
    /// 貸出が存在しない
    #[error("Loan {0} not found")]
    LoanNotFound(LoanId),

    /// 貸出が参照する書籍が存在しない
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    /// 延滞していない貸出には延滞通知を送れない
    #[error("Loan {0} is not overdue")]
    LoanNotOverdue(LoanId),

    #[error("Book store error")]
    BookStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Loan store error")]
    LoanStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Notification store error")]
    NotificationStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, NotificationApplicationError>;
