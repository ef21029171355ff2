use crate::application::{
    library::{self, ServiceDependencies},
    notification,
};
use crate::domain::{BookId, LoanId, book::SearchField};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        AddBookRequest, BookResponse, BorrowBookRequest, ListLoansQuery, LoanResponse,
        NotificationResponse, OutcomeResponse, OverdueLoanResponse, ReturnBookRequest,
        SearchBooksQuery, UpdateBookRequest, parse_status_filter,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Books
// ============================================================================

/// GET /books - 書籍一覧（`term` 指定時は検索）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchBooksQuery>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = match query.term {
        Some(term) => {
            let field = query
                .field
                .as_deref()
                .map(SearchField::from)
                .unwrap_or_default();
            library::search_books(&state.service_deps, &term, field).await?
        }
        None => library::list_books(&state.service_deps).await?,
    };

    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id - 書籍詳細
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u32>,
) -> Result<Json<BookResponse>, ApiError> {
    let book_id = BookId::new(book_id);

    library::get_book(&state.service_deps, book_id)
        .await?
        .map(|book| Json(BookResponse::from(book)))
        .ok_or_else(|| ApiError::NotFound(format!("Book {} not found", book_id)))
}

/// POST /books - 書籍を登録
///
/// 貸出可能冊数は常に総冊数で初期化される。
pub async fn add_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = library::add_book(&state.service_deps, req.to_command()).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// PUT /books/:id - 書籍を丸ごと置き換える
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u32>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = req.into_book(BookId::new(book_id));

    library::update_book(&state.service_deps, book.clone()).await?;

    Ok(Json(BookResponse::from(book)))
}

/// DELETE /books/:id - 書籍を削除
///
/// 未返却の貸出がある場合は409。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    library::delete_book(&state.service_deps, BookId::new(book_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Lending
// ============================================================================

/// POST /books/:id/borrow - 書籍を貸し出す
///
/// 貸出可能冊数がなければ `success: false`。
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u32>,
    Json(req): Json<BorrowBookRequest>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let cmd = req.to_command(BookId::new(book_id), chrono::Utc::now());

    let success = library::borrow_book(&state.service_deps, cmd).await?;

    Ok(Json(OutcomeResponse { success }))
}

/// POST /books/:id/return - 書籍を返却する
///
/// 該当する未返却の貸出がなければ `success: false`。
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u32>,
    Json(req): Json<ReturnBookRequest>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let cmd = req.to_command(BookId::new(book_id), chrono::Utc::now());

    let success = library::return_book(&state.service_deps, cmd).await?;

    Ok(Json(OutcomeResponse { success }))
}

/// GET /books/:id/loans - 書籍の貸出履歴
pub async fn list_book_loans(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u32>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let now = chrono::Utc::now();
    let loans = library::get_loans_by_book(&state.service_deps, BookId::new(book_id)).await?;

    Ok(Json(
        loans.into_iter().map(|l| LoanResponse::new(l, now)).collect(),
    ))
}

/// GET /loans/active - 未返却の貸出
pub async fn list_active_loans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let now = chrono::Utc::now();
    let loans = library::get_active_loans(&state.service_deps).await?;

    Ok(Json(
        loans.into_iter().map(|l| LoanResponse::new(l, now)).collect(),
    ))
}

/// GET /loans/overdue - 延滞中の貸出
pub async fn list_overdue_loans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let now = chrono::Utc::now();
    let loans = library::get_overdue_loans(&state.service_deps, now).await?;

    Ok(Json(
        loans.into_iter().map(|l| LoanResponse::new(l, now)).collect(),
    ))
}

/// GET /loans - 借り手の貸出一覧
///
/// クエリパラメータ:
/// - borrower_email: 借り手のメールアドレス（必須）
/// - status: ステータスでフィルタリング（active, overdue, returned）（オプション）
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let borrower_email = query.borrower_email.ok_or_else(|| {
        ApiError::BadRequest("borrower_email query parameter is required".to_string())
    })?;

    let status = query
        .status
        .as_deref()
        .map(parse_status_filter)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let now = chrono::Utc::now();
    let loans = library::get_loans_by_borrower(&state.service_deps, &borrower_email).await?;

    Ok(Json(
        loans
            .into_iter()
            .filter(|loan| status.is_none_or(|s| loan.status(now) == s))
            .map(|loan| LoanResponse::new(loan, now))
            .collect(),
    ))
}

// ============================================================================
// Notifications
// ============================================================================

/// GET /notifications/overdue - 延滞中の貸出を書籍情報付きで取得
pub async fn list_overdue_details(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OverdueLoanResponse>>, ApiError> {
    let now = chrono::Utc::now();
    let details = notification::get_overdue_loans_with_details(&state.service_deps, now).await?;

    Ok(Json(
        details
            .into_iter()
            .map(|d| OverdueLoanResponse::new(d, now))
            .collect(),
    ))
}

/// POST /notifications/overdue - 延滞中のすべての借り手に通知を送る
pub async fn send_overdue_notifications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let sent =
        notification::send_overdue_notifications(&state.service_deps, chrono::Utc::now()).await?;

    Ok(Json(
        sent.into_iter().map(NotificationResponse::from).collect(),
    ))
}

/// POST /loans/:id/notifications - 延滞通知を送る
pub async fn send_loan_notification(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<u32>,
) -> Result<(StatusCode, Json<NotificationResponse>), ApiError> {
    let sent = notification::notify_overdue_loan(
        &state.service_deps,
        LoanId::new(loan_id),
        chrono::Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(NotificationResponse::from(sent))))
}

/// GET /loans/:id/notifications - 貸出の通知履歴
pub async fn list_loan_notifications(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<u32>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let notifications =
        notification::get_notifications_by_loan(&state.service_deps, LoanId::new(loan_id)).await?;

    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}
