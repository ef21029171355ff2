use crate::domain::{
    self, BookId, CheckOutError, OpenLoanError,
    book::{Book, SearchField},
    commands::*,
    loan::BookLoan,
};
use crate::ports::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::errors::{LibraryApplicationError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、各サービス関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub loan_repository: Arc<dyn LoanRepository>,
    pub notification_repository: Arc<dyn NotificationRepository>,
    /// 在庫・貸出を変更する操作の排他ロック
    ///
    /// 読み取りからコミットまで保持する。クローン間で共有される。
    pub lending_lock: Arc<Mutex<()>>,
}

impl ServiceDependencies {
    pub fn new(
        book_repository: Arc<dyn BookRepository>,
        loan_repository: Arc<dyn LoanRepository>,
        notification_repository: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            book_repository,
            loan_repository,
            notification_repository,
            lending_lock: Arc::new(Mutex::new(())),
        }
    }
}

// ============================================================================
// 書籍
// ============================================================================

pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.book_repository
        .find_all()
        .await
        .map_err(LibraryApplicationError::BookStoreError)
}

/// 書籍をIDで取得する。存在しなければ `None`。
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Option<Book>> {
    deps.book_repository
        .find_by_id(book_id)
        .await
        .map_err(LibraryApplicationError::BookStoreError)
}

/// 書籍を検索する（読み取りのみ）
///
/// - 大文字小文字を区別しない部分一致
/// - 空白のみの検索語は全件を返す
pub async fn search_books(
    deps: &ServiceDependencies,
    term: &str,
    field: SearchField,
) -> Result<Vec<Book>> {
    if term.trim().is_empty() {
        return list_books(deps).await;
    }

    let term = term.to_lowercase();
    let predicate = move |book: &Book| domain::book::matches_search(book, &term, field);

    deps.book_repository
        .search(&predicate)
        .await
        .map_err(LibraryApplicationError::BookStoreError)
}

/// 書籍を登録する
///
/// ビジネスルール：
/// - IDはストアの採番カウンタから払い出す（削除済みIDは再利用しない）
/// - 貸出可能冊数 = 総冊数
pub async fn add_book(deps: &ServiceDependencies, cmd: AddBook) -> Result<Book> {
    let _lending = deps.lending_lock.lock().await;

    let book_id = deps
        .book_repository
        .allocate_id()
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;

    let book = domain::book::register_book(book_id, cmd);

    deps.book_repository
        .add(book.clone())
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;
    deps.book_repository
        .commit()
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;

    tracing::info!(book_id = %book.id, title = %book.title, "Book added");
    Ok(book)
}

/// 書籍を丸ごと置き換える
///
/// フィールド単位のマージは行わない。変更しないフィールドも呼び出し側が渡すこと。
pub async fn update_book(deps: &ServiceDependencies, book: Book) -> Result<()> {
    let _lending = deps.lending_lock.lock().await;

    let book_id = book.id;

    let exists = deps
        .book_repository
        .exists(book_id)
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;

    if !exists {
        return Err(LibraryApplicationError::BookNotFound(book_id));
    }

    deps.book_repository
        .update(book)
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;
    deps.book_repository
        .commit()
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;

    tracing::info!(%book_id, "Book updated");
    Ok(())
}

/// 書籍を削除する
///
/// ビジネスルール：
/// - 未返却の貸出が1件でもあれば削除不可
pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let _lending = deps.lending_lock.lock().await;

    let exists = deps
        .book_repository
        .exists(book_id)
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;

    if !exists {
        return Err(LibraryApplicationError::BookNotFound(book_id));
    }

    let loans = get_loans_by_book(deps, book_id).await?;
    if loans.iter().any(|l| !l.is_returned()) {
        return Err(LibraryApplicationError::BookHasActiveLoans(book_id));
    }

    deps.book_repository
        .delete(book_id)
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;
    deps.book_repository
        .commit()
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;

    tracing::info!(%book_id, "Book deleted");
    Ok(())
}

// ============================================================================
// 貸出・返却
// ============================================================================

/// 書籍を貸し出す
///
/// 貸出可能冊数が0の場合は `Ok(false)` を返し、何も変更しない。
///
/// # 一貫性保証
///
/// 貸出ストアと在庫ストアは別々にコミットされる（貸出 → 在庫の順）。
/// 2つのコミットの間で失敗した場合、貸出は記録されるが在庫は減らない。
/// この不整合は起動時の `reconcile_inventory()` で修復される。
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<bool> {
    let _lending = deps.lending_lock.lock().await;

    let book = get_book(deps, cmd.book_id)
        .await?
        .ok_or(LibraryApplicationError::BookNotFound(cmd.book_id))?;

    let book = match domain::book::check_out_copy(&book) {
        Ok(book) => book,
        Err(CheckOutError::NoCopiesAvailable) => {
            tracing::info!(book_id = %cmd.book_id, "No copies available to borrow");
            return Ok(false);
        }
    };

    let loan_id = deps
        .loan_repository
        .allocate_id()
        .await
        .map_err(LibraryApplicationError::LoanStoreError)?;
    let loan = domain::loan::open_loan(loan_id, &cmd).map_err(
        |OpenLoanError::DueDateOutOfRange { loan_days }| {
            LibraryApplicationError::InvalidLoanPeriod(loan_days)
        },
    )?;

    deps.loan_repository
        .add(loan.clone())
        .await
        .map_err(LibraryApplicationError::LoanStoreError)?;
    deps.book_repository
        .update(book.clone())
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;

    commit_lending(deps).await?;

    tracing::info!(
        %loan_id,
        book_id = %book.id,
        due_date = %loan.due_date,
        available = book.available_copies,
        "Book borrowed"
    );
    Ok(true)
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 書籍IDとメールアドレス（大文字小文字を区別しない）が一致する未返却の貸出が対象
/// - 複数ある場合はストア上の並びで最初のもの
/// - 対象がなければ `Ok(false)` を返し、何も変更しない
///
/// # 一貫性保証
///
/// `borrow_book()` と同じく貸出 → 在庫の順に別々にコミットする。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<bool> {
    let _lending = deps.lending_lock.lock().await;

    let loans = get_loans_by_book(deps, cmd.book_id).await?;

    let Some(loan) = loans
        .into_iter()
        .find(|l| !l.is_returned() && l.is_borrowed_by(&cmd.borrower_email))
    else {
        tracing::info!(book_id = %cmd.book_id, "No active loan to return");
        return Ok(false);
    };

    // 参照先の書籍がなければ何も変更せずに失敗させる
    let book = get_book(deps, cmd.book_id)
        .await?
        .ok_or(LibraryApplicationError::BookNotFound(cmd.book_id))?;

    let loan = match domain::loan::close_loan(&loan, cmd.returned_at) {
        Ok(loan) => loan,
        Err(domain::ReturnLoanError::AlreadyReturned) => return Ok(false),
    };
    let book = domain::book::check_in_copy(&book);

    deps.loan_repository
        .update(loan.clone())
        .await
        .map_err(LibraryApplicationError::LoanStoreError)?;
    deps.book_repository
        .update(book.clone())
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;

    commit_lending(deps).await?;

    tracing::info!(
        loan_id = %loan.id,
        book_id = %book.id,
        available = book.available_copies,
        "Book returned"
    );
    Ok(true)
}

/// 貸出ストア、在庫ストアの順にコミットする
async fn commit_lending(deps: &ServiceDependencies) -> Result<()> {
    deps.loan_repository
        .commit()
        .await
        .map_err(LibraryApplicationError::LoanStoreError)?;

    if let Err(e) = deps.book_repository.commit().await {
        tracing::error!(
            error = %e,
            "Loan store committed but book store commit failed; inventory needs reconciliation"
        );
        return Err(LibraryApplicationError::BookStoreError(e));
    }

    Ok(())
}

// ============================================================================
// 貸出の照会
// ============================================================================

pub async fn get_active_loans(deps: &ServiceDependencies) -> Result<Vec<BookLoan>> {
    deps.loan_repository
        .find_active()
        .await
        .map_err(LibraryApplicationError::LoanStoreError)
}

/// 書籍の全貸出（返却済みを含む）
pub async fn get_loans_by_book(
    deps: &ServiceDependencies,
    book_id: BookId,
) -> Result<Vec<BookLoan>> {
    deps.loan_repository
        .find_by_book(book_id)
        .await
        .map_err(LibraryApplicationError::LoanStoreError)
}

/// 借り手の全貸出（メールアドレスは大文字小文字を区別しない）
pub async fn get_loans_by_borrower(
    deps: &ServiceDependencies,
    borrower_email: &str,
) -> Result<Vec<BookLoan>> {
    deps.loan_repository
        .find_by_borrower_email(borrower_email)
        .await
        .map_err(LibraryApplicationError::LoanStoreError)
}

/// `now` 時点で延滞している貸出（返却期限ちょうどは含まない）
pub async fn get_overdue_loans(
    deps: &ServiceDependencies,
    now: DateTime<Utc>,
) -> Result<Vec<BookLoan>> {
    deps.loan_repository
        .find_overdue(now)
        .await
        .map_err(LibraryApplicationError::LoanStoreError)
}
