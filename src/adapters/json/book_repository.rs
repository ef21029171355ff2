use crate::domain::{BookId, book::Book};
use crate::ports::book_repository::{BookPredicate, BookRepository as BookRepositoryTrait, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use super::collection::{JsonCollection, Record};
use super::error::JsonStoreError;

impl Record for Book {
    fn record_id(&self) -> u32 {
        self.id.value()
    }
}

/// BookRepositoryのJSONファイル実装
pub struct BookRepository {
    books: JsonCollection<Book>,
}

impl BookRepository {
    /// ファイルから書籍一覧を読み込む（存在しなければ作成）
    pub async fn open(path: impl Into<PathBuf>) -> std::result::Result<Self, JsonStoreError> {
        Ok(Self {
            books: JsonCollection::open(path).await?,
        })
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn find_all(&self) -> Result<Vec<Book>> {
        Ok(self.books.all())
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.books.find(id.value()))
    }

    async fn search(&self, predicate: BookPredicate<'_>) -> Result<Vec<Book>> {
        Ok(self.books.filter(predicate))
    }

    async fn allocate_id(&self) -> Result<BookId> {
        Ok(BookId::new(self.books.allocate_id()?))
    }

    async fn add(&self, book: Book) -> Result<()> {
        self.books.insert(book)?;
        Ok(())
    }

    async fn update(&self, book: Book) -> Result<bool> {
        Ok(self.books.replace(book))
    }

    async fn delete(&self, id: BookId) -> Result<bool> {
        Ok(self.books.remove(id.value()))
    }

    async fn exists(&self, id: BookId) -> Result<bool> {
        Ok(self.books.contains(id.value()))
    }

    async fn commit(&self) -> Result<()> {
        self.books.commit().await?;
        Ok(())
    }
}
