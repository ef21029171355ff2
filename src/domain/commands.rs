use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BookId;

/// コマンド：書籍を登録する
///
/// 貸出可能冊数は持たない。登録時は常に総冊数と同じになる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i32,
    pub genre: String,
    pub total_copies: u32,
}

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub book_id: BookId,
    pub borrower_name: String,
    pub borrower_email: String,
    pub loan_days: u32,
    pub borrowed_at: DateTime<Utc>,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub book_id: BookId,
    pub borrower_email: String,
    pub returned_at: DateTime<Utc>,
}
