use serde::{Deserialize, Serialize};

use super::{BookId, CheckOutError, commands::AddBook};

/// Book集約 - 1タイトル分の蔵書と在庫数
///
/// 不変条件：操作の前後で `available_copies <= total_copies`
/// （負の値は型で排除している）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i32,
    pub genre: String,
    pub total_copies: u32,
    pub available_copies: u32,
}

impl Book {
    /// 1冊以上貸出可能か
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// 検索対象のフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    Title,
    Author,
    Isbn,
    Genre,
    /// 4フィールドのいずれかに一致
    #[default]
    All,
}

impl SearchField {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Author => "author",
            SearchField::Isbn => "isbn",
            SearchField::Genre => "genre",
            SearchField::All => "all",
        }
    }
}

/// 大文字小文字を区別しない。未知の値は `All` として扱う。
impl From<&str> for SearchField {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "title" => SearchField::Title,
            "author" => SearchField::Author,
            "isbn" => SearchField::Isbn,
            "genre" => SearchField::Genre,
            _ => SearchField::All,
        }
    }
}

/// 純粋関数：書籍を登録する
///
/// ビジネスルール：
/// - 貸出可能冊数は総冊数と同じ
/// - フィールド内容のバリデーションは行わない（空のタイトルも可）
pub fn register_book(id: BookId, cmd: AddBook) -> Book {
    Book {
        id,
        isbn: cmd.isbn,
        title: cmd.title,
        author: cmd.author,
        publisher: cmd.publisher,
        year: cmd.year,
        genre: cmd.genre,
        total_copies: cmd.total_copies,
        available_copies: cmd.total_copies,
    }
}

/// 純粋関数：1冊持ち出す
///
/// 副作用なし。貸出可能冊数を1減らした新しいBookを返す。
pub fn check_out_copy(book: &Book) -> Result<Book, CheckOutError> {
    if !book.is_available() {
        return Err(CheckOutError::NoCopiesAvailable);
    }

    Ok(Book {
        available_copies: book.available_copies - 1,
        ..book.clone()
    })
}

/// 純粋関数：1冊戻す
pub fn check_in_copy(book: &Book) -> Book {
    Book {
        available_copies: book.available_copies.saturating_add(1),
        ..book.clone()
    }
}

/// 純粋関数：検索条件に一致するか
///
/// `term` は小文字化済みであること。部分一致、大文字小文字は区別しない。
pub fn matches_search(book: &Book, term: &str, field: SearchField) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(term);

    match field {
        SearchField::Title => contains(&book.title),
        SearchField::Author => contains(&book.author),
        SearchField::Isbn => contains(&book.isbn),
        SearchField::Genre => contains(&book.genre),
        SearchField::All => {
            contains(&book.title)
                || contains(&book.author)
                || contains(&book.isbn)
                || contains(&book.genre)
        }
    }
}
