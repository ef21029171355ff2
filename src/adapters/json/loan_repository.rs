use crate::domain::{BookId, LoanId, loan::BookLoan};
use crate::ports::loan_repository::{LoanRepository as LoanRepositoryTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

use super::collection::{JsonCollection, Record};
use super::error::JsonStoreError;

impl Record for BookLoan {
    fn record_id(&self) -> u32 {
        self.id.value()
    }
}

/// LoanRepositoryのJSONファイル実装
pub struct LoanRepository {
    loans: JsonCollection<BookLoan>,
}

impl LoanRepository {
    pub async fn open(path: impl Into<PathBuf>) -> std::result::Result<Self, JsonStoreError> {
        Ok(Self {
            loans: JsonCollection::open(path).await?,
        })
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn find_all(&self) -> Result<Vec<BookLoan>> {
        Ok(self.loans.all())
    }

    async fn find_by_id(&self, id: LoanId) -> Result<Option<BookLoan>> {
        Ok(self.loans.find(id.value()))
    }

    async fn find_by_book(&self, book_id: BookId) -> Result<Vec<BookLoan>> {
        Ok(self.loans.filter(|l| l.book_id == book_id))
    }

    async fn find_by_borrower_email(&self, email: &str) -> Result<Vec<BookLoan>> {
        Ok(self.loans.filter(|l| l.is_borrowed_by(email)))
    }

    async fn find_active(&self) -> Result<Vec<BookLoan>> {
        Ok(self.loans.filter(|l| !l.is_returned()))
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<BookLoan>> {
        Ok(self.loans.filter(|l| l.is_overdue(now)))
    }

    async fn allocate_id(&self) -> Result<LoanId> {
        Ok(LoanId::new(self.loans.allocate_id()?))
    }

    async fn add(&self, loan: BookLoan) -> Result<()> {
        self.loans.insert(loan)?;
        Ok(())
    }

    async fn update(&self, loan: BookLoan) -> Result<bool> {
        Ok(self.loans.replace(loan))
    }

    async fn delete(&self, id: LoanId) -> Result<bool> {
        Ok(self.loans.remove(id.value()))
    }

    async fn exists(&self, id: LoanId) -> Result<bool> {
        Ok(self.loans.contains(id.value()))
    }

    async fn commit(&self) -> Result<()> {
        self.loans.commit().await?;
        Ok(())
    }
}
