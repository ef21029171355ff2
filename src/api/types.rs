use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::notification::OverdueLoanDetails;
use crate::domain::{
    BookId,
    book::Book,
    commands::{AddBook, BorrowBook, ReturnBook},
    loan::{BookLoan, LOAN_PERIOD_DAYS, LoanStatus},
    notification::BookNotification,
};

// ============================================================================
// Requests
// ============================================================================

/// 書籍検索のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct SearchBooksQuery {
    /// 検索語（省略時は全件）
    pub term: Option<String>,
    /// title, author, isbn, genre, all（省略・不明な値はall）
    pub field: Option<String>,
}

/// 書籍登録リクエスト（POST /books）
///
/// 貸出可能冊数は受け付けない（送られても無視される）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBookRequest {
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub genre: String,
    pub total_copies: u32,
}

impl AddBookRequest {
    pub fn to_command(&self) -> AddBook {
        AddBook {
            isbn: self.isbn.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            publisher: self.publisher.clone(),
            year: self.year,
            genre: self.genre.clone(),
            total_copies: self.total_copies,
        }
    }
}

/// 書籍更新リクエスト（PUT /books/:id）
///
/// レコード全体を置き換えるため、すべてのフィールドが必須。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookRequest {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i32,
    pub genre: String,
    pub total_copies: u32,
    pub available_copies: u32,
}

impl UpdateBookRequest {
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            isbn: self.isbn,
            title: self.title,
            author: self.author,
            publisher: self.publisher,
            year: self.year,
            genre: self.genre,
            total_copies: self.total_copies,
            available_copies: self.available_copies,
        }
    }
}

/// 貸出リクエスト（POST /books/:id/borrow）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowBookRequest {
    pub borrower_name: String,
    pub borrower_email: String,
    /// 省略時は14日
    pub loan_days: Option<u32>,
}

impl BorrowBookRequest {
    pub fn to_command(&self, book_id: BookId, borrowed_at: DateTime<Utc>) -> BorrowBook {
        BorrowBook {
            book_id,
            borrower_name: self.borrower_name.clone(),
            borrower_email: self.borrower_email.clone(),
            loan_days: self.loan_days.unwrap_or(LOAN_PERIOD_DAYS),
            borrowed_at,
        }
    }
}

/// 返却リクエスト（POST /books/:id/return）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnBookRequest {
    pub borrower_email: String,
}

impl ReturnBookRequest {
    pub fn to_command(&self, book_id: BookId, returned_at: DateTime<Utc>) -> ReturnBook {
        ReturnBook {
            book_id,
            borrower_email: self.borrower_email.clone(),
            returned_at,
        }
    }
}

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// 借り手のメールアドレスでフィルタリング
    pub borrower_email: Option<String>,
    /// ステータスでフィルタリング
    pub status: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// 貸出・返却の結果
///
/// 冊数不足や返却対象なしは `success: false` で返す（エラーではない）。
#[derive(Debug, Serialize, Deserialize)]
pub struct OutcomeResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: u32,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i32,
    pub genre: String,
    pub total_copies: u32,
    pub available_copies: u32,
    pub is_available: bool,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            is_available: book.is_available(),
            isbn: book.isbn,
            title: book.title,
            author: book.author,
            publisher: book.publisher,
            year: book.year,
            genre: book.genre,
            total_copies: book.total_copies,
            available_copies: book.available_copies,
        }
    }
}

/// 貸出レスポンス
///
/// `status` と `days_overdue` はレスポンス生成時刻で導出する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanResponse {
    pub id: u32,
    pub book_id: u32,
    pub borrower_name: String,
    pub borrower_email: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: String,
    pub days_overdue: i64,
}

impl LoanResponse {
    pub fn new(loan: BookLoan, now: DateTime<Utc>) -> Self {
        Self {
            id: loan.id.value(),
            book_id: loan.book_id.value(),
            status: loan.status(now).as_str().to_string(),
            days_overdue: loan.days_overdue(now),
            borrower_name: loan.borrower_name,
            borrower_email: loan.borrower_email,
            borrowed_at: loan.borrowed_at,
            due_date: loan.due_date,
            returned_at: loan.returned_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdueLoanResponse {
    pub loan: LoanResponse,
    pub book: BookResponse,
    pub days_overdue: i64,
}

impl OverdueLoanResponse {
    pub fn new(details: OverdueLoanDetails, now: DateTime<Utc>) -> Self {
        Self {
            loan: LoanResponse::new(details.loan, now),
            book: BookResponse::from(details.book),
            days_overdue: details.days_overdue,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: u32,
    pub loan_id: u32,
    pub sent_at: DateTime<Utc>,
    pub notification_type: String,
    pub content: String,
    pub is_successful: bool,
}

impl From<BookNotification> for NotificationResponse {
    fn from(notification: BookNotification) -> Self {
        Self {
            id: notification.id.value(),
            loan_id: notification.loan_id.value(),
            sent_at: notification.sent_at,
            notification_type: format!("{:?}", notification.notification_type),
            content: notification.content,
            is_successful: notification.is_successful,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// ステータスクエリパラメータのパースとバリデーション
pub fn parse_status_filter(status: &str) -> Result<LoanStatus, String> {
    status.parse::<LoanStatus>()
}
