use crate::domain::BookId;
use thiserror::Error;

/// 蔵書・貸出アプリケーション層のエラー
///
/// 貸出可能冊数がない、返却対象の貸出がない、といった業務上の結果は
/// エラーではなく `Ok(false)` で表す。
#[derive(Debug, Error)]
pub enum LibraryApplicationError {
    /// 書籍が存在しない
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    /// 未返却の貸出があるため削除できない
    #[error("Book {0} has active loans")]
    BookHasActiveLoans(BookId),

    /// 返却期限が日時の範囲を超える貸出日数
    #[error("Loan period of {0} days is out of range")]
    InvalidLoanPeriod(u32),

    /// BookRepositoryのエラー
    #[error("Book store error")]
    BookStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// LoanRepositoryのエラー
    #[error("Loan store error")]
    LoanStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LibraryApplicationError>;
