use crate::domain::{BookId, LoanId, loan::BookLoan};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出ストアポート
///
/// すべての検索結果は格納順（= 貸出順）で返す。
/// 返却処理の「最初に一致した貸出」はこの順序に依存する。
#[async_trait]
pub trait LoanRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<BookLoan>>;

    async fn find_by_id(&self, id: LoanId) -> Result<Option<BookLoan>>;

    /// 書籍の全貸出（返却済みを含む）
    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<BookLoan>>;

    /// 借り手の全貸出。メールアドレスは大文字小文字を区別しない。
    async fn find_by_borrower_email(&self, email: &str) -> Result<Vec<BookLoan>>;

    /// 未返却の貸出
    async fn find_active(&self) -> Result<Vec<BookLoan>>;

    /// 未返却かつ `due_date < now` の貸出
    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<BookLoan>>;

    async fn allocate_id(&self) -> Result<LoanId>;

    async fn add(&self, loan: BookLoan) -> Result<()>;

    async fn update(&self, loan: BookLoan) -> Result<bool>;

    /// 通常の業務フローからは呼ばれない
    async fn delete(&self, id: LoanId) -> Result<bool>;

    async fn exists(&self, id: LoanId) -> Result<bool>;

    async fn commit(&self) -> Result<()>;
}
