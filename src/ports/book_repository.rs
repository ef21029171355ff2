use crate::domain::{BookId, book::Book};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 検索条件（呼び出し側が組み立てる述語）
pub type BookPredicate<'a> = &'a (dyn Fn(&Book) -> bool + Send + Sync);

/// 書籍在庫ストアポート
///
/// メモリ上のコレクションを操作し、`commit` で永続化する。
/// 参照整合性の検証は行わない（アプリケーション層の責務）。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// すべての書籍を格納順に返す
    async fn find_all(&self) -> Result<Vec<Book>>;

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// 述語に一致する書籍を格納順に返す
    async fn search(&self, predicate: BookPredicate<'_>) -> Result<Vec<Book>>;

    /// 新しいIDを払い出す
    ///
    /// 単調増加。削除されたIDは再利用しない。
    async fn allocate_id(&self) -> Result<BookId>;

    async fn add(&self, book: Book) -> Result<()>;

    /// レコードを丸ごと置き換える。存在しなければ `false`。
    async fn update(&self, book: Book) -> Result<bool>;

    async fn delete(&self, id: BookId) -> Result<bool>;

    async fn exists(&self, id: BookId) -> Result<bool>;

    /// 現在のコレクション全体を永続化する
    async fn commit(&self) -> Result<()>;
}
