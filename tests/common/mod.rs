#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use library_lending::application::library::ServiceDependencies;
use library_lending::domain::{
    BookId, LoanId, NotificationId, book::Book, commands::AddBook, loan::BookLoan,
    notification::BookNotification,
};
use library_lending::ports::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type PortResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

// ============================================================================
// インメモリ実装（テスト用）
// ============================================================================

/// コミット失敗を注入できるインメモリコレクション
///
/// `committed` には最後に成功したコミット時点の内容が残る。
struct MemoryCollection<T> {
    records: Mutex<Vec<T>>,
    committed: Mutex<Vec<T>>,
    next_id: Mutex<u32>,
    fail_commits: AtomicBool,
    commit_count: AtomicUsize,
}

impl<T: Clone> MemoryCollection<T> {
    fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            committed: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
            fail_commits: AtomicBool::new(false),
            commit_count: AtomicUsize::new(0),
        }
    }

    fn all(&self) -> Vec<T> {
        self.records.lock().unwrap().clone()
    }

    fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    fn allocate_id(&self) -> u32 {
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        id
    }

    fn push(&self, record: T) {
        self.records.lock().unwrap().push(record);
    }

    fn replace(&self, matches: impl Fn(&T) -> bool, record: T) -> bool {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| matches(r)) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => false,
        }
    }

    fn remove(&self, matches: impl Fn(&T) -> bool) -> bool {
        let mut records = self.records.lock().unwrap();
        match records.iter().position(|r| matches(r)) {
            Some(index) => {
                records.remove(index);
                true
            }
            None => false,
        }
    }

    fn commit(&self, name: &str) -> PortResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(format!("{} commit failed", name).into());
        }
        *self.committed.lock().unwrap() = self.all();
        self.commit_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct InMemoryBookRepository {
    books: MemoryCollection<Book>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self {
            books: MemoryCollection::new(),
        }
    }

    pub fn fail_commits(&self, fail: bool) {
        self.books.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn commit_count(&self) -> usize {
        self.books.commit_count.load(Ordering::SeqCst)
    }

    /// 最後に成功したコミット時点の内容
    pub fn committed(&self) -> Vec<Book> {
        self.books.committed.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn find_all(&self) -> PortResult<Vec<Book>> {
        Ok(self.books.all())
    }

    async fn find_by_id(&self, id: BookId) -> PortResult<Option<Book>> {
        Ok(self.books.filter(|b| b.id == id).into_iter().next())
    }

    async fn search(&self, predicate: BookPredicate<'_>) -> PortResult<Vec<Book>> {
        Ok(self.books.filter(predicate))
    }

    async fn allocate_id(&self) -> PortResult<BookId> {
        Ok(BookId::new(self.books.allocate_id()))
    }

    async fn add(&self, book: Book) -> PortResult<()> {
        self.books.push(book);
        Ok(())
    }

    async fn update(&self, book: Book) -> PortResult<bool> {
        let id = book.id;
        Ok(self.books.replace(|b| b.id == id, book))
    }

    async fn delete(&self, id: BookId) -> PortResult<bool> {
        Ok(self.books.remove(|b| b.id == id))
    }

    async fn exists(&self, id: BookId) -> PortResult<bool> {
        Ok(!self.books.filter(|b| b.id == id).is_empty())
    }

    async fn commit(&self) -> PortResult<()> {
        self.books.commit("book store")
    }
}

pub struct InMemoryLoanRepository {
    loans: MemoryCollection<BookLoan>,
}

impl InMemoryLoanRepository {
    pub fn new() -> Self {
        Self {
            loans: MemoryCollection::new(),
        }
    }

    pub fn fail_commits(&self, fail: bool) {
        self.loans.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn commit_count(&self) -> usize {
        self.loans.commit_count.load(Ordering::SeqCst)
    }

    pub fn committed(&self) -> Vec<BookLoan> {
        self.loans.committed.lock().unwrap().clone()
    }
}

#[async_trait]
impl LoanRepository for InMemoryLoanRepository {
    async fn find_all(&self) -> PortResult<Vec<BookLoan>> {
        Ok(self.loans.all())
    }

    async fn find_by_id(&self, id: LoanId) -> PortResult<Option<BookLoan>> {
        Ok(self.loans.filter(|l| l.id == id).into_iter().next())
    }

    async fn find_by_book(&self, book_id: BookId) -> PortResult<Vec<BookLoan>> {
        Ok(self.loans.filter(|l| l.book_id == book_id))
    }

    async fn find_by_borrower_email(&self, email: &str) -> PortResult<Vec<BookLoan>> {
        Ok(self.loans.filter(|l| l.is_borrowed_by(email)))
    }

    async fn find_active(&self) -> PortResult<Vec<BookLoan>> {
        Ok(self.loans.filter(|l| !l.is_returned()))
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> PortResult<Vec<BookLoan>> {
        Ok(self.loans.filter(|l| l.is_overdue(now)))
    }

    async fn allocate_id(&self) -> PortResult<LoanId> {
        Ok(LoanId::new(self.loans.allocate_id()))
    }

    async fn add(&self, loan: BookLoan) -> PortResult<()> {
        self.loans.push(loan);
        Ok(())
    }

    async fn update(&self, loan: BookLoan) -> PortResult<bool> {
        let id = loan.id;
        Ok(self.loans.replace(|l| l.id == id, loan))
    }

    async fn delete(&self, id: LoanId) -> PortResult<bool> {
        Ok(self.loans.remove(|l| l.id == id))
    }

    async fn exists(&self, id: LoanId) -> PortResult<bool> {
        Ok(!self.loans.filter(|l| l.id == id).is_empty())
    }

    async fn commit(&self) -> PortResult<()> {
        self.loans.commit("loan store")
    }
}

pub struct InMemoryNotificationRepository {
    notifications: MemoryCollection<BookNotification>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self {
            notifications: MemoryCollection::new(),
        }
    }

    pub fn commit_count(&self) -> usize {
        self.notifications.commit_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn find_all(&self) -> PortResult<Vec<BookNotification>> {
        Ok(self.notifications.all())
    }

    async fn find_by_id(&self, id: NotificationId) -> PortResult<Option<BookNotification>> {
        Ok(self
            .notifications
            .filter(|n| n.id == id)
            .into_iter()
            .next())
    }

    async fn find_by_loan(&self, loan_id: LoanId) -> PortResult<Vec<BookNotification>> {
        Ok(self.notifications.filter(|n| n.loan_id == loan_id))
    }

    async fn allocate_id(&self) -> PortResult<NotificationId> {
        Ok(NotificationId::new(self.notifications.allocate_id()))
    }

    async fn add(&self, notification: BookNotification) -> PortResult<()> {
        self.notifications.push(notification);
        Ok(())
    }

    async fn update(&self, notification: BookNotification) -> PortResult<bool> {
        let id = notification.id;
        Ok(self.notifications.replace(|n| n.id == id, notification))
    }

    async fn delete(&self, id: NotificationId) -> PortResult<bool> {
        Ok(self.notifications.remove(|n| n.id == id))
    }

    async fn exists(&self, id: NotificationId) -> PortResult<bool> {
        Ok(!self.notifications.filter(|n| n.id == id).is_empty())
    }

    async fn commit(&self) -> PortResult<()> {
        self.notifications.commit("notification store")
    }
}

// ============================================================================
// テストヘルパー
// ============================================================================

/// テスト用の依存関係一式
///
/// 各リポジトリへの参照を保持し、テスト側から状態を確認できるようにする。
pub struct TestContext {
    pub books: Arc<InMemoryBookRepository>,
    pub loans: Arc<InMemoryLoanRepository>,
    pub notifications: Arc<InMemoryNotificationRepository>,
    pub deps: ServiceDependencies,
}

impl TestContext {
    pub fn new() -> Self {
        let books = Arc::new(InMemoryBookRepository::new());
        let loans = Arc::new(InMemoryLoanRepository::new());
        let notifications = Arc::new(InMemoryNotificationRepository::new());

        let deps = ServiceDependencies::new(books.clone(), loans.clone(), notifications.clone());

        Self {
            books,
            loans,
            notifications,
            deps,
        }
    }
}

pub fn add_book_cmd(title: &str, author: &str, total_copies: u32) -> AddBook {
    AddBook {
        isbn: format!("isbn-{}", title.to_lowercase().replace(' ', "-")),
        title: title.to_string(),
        author: author.to_string(),
        publisher: "Test Publisher".to_string(),
        year: 2020,
        genre: "Fiction".to_string(),
        total_copies,
    }
}
