use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use library_lending::adapters::json::{
    JsonBookRepository, JsonLoanRepository, JsonNotificationRepository,
};
use library_lending::api::handlers::AppState;
use library_lending::api::router::create_router;
use library_lending::api::types::*;
use library_lending::application::library::ServiceDependencies;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// 一時ディレクトリ上のJSONストアと実際のAPIルーターでアプリケーションを組み立てる
async fn setup_e2e_app(data_dir: &Path) -> axum::Router {
    let book_repository = Arc::new(
        JsonBookRepository::open(data_dir.join("books.json"))
            .await
            .unwrap(),
    );
    let loan_repository = Arc::new(
        JsonLoanRepository::open(data_dir.join("loans.json"))
            .await
            .unwrap(),
    );
    let notification_repository = Arc::new(
        JsonNotificationRepository::open(data_dir.join("notifications.json"))
            .await
            .unwrap(),
    );

    let service_deps =
        ServiceDependencies::new(book_repository, loan_repository, notification_repository);

    create_router(Arc::new(AppState { service_deps }))
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, Bytes) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes)
}

fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

fn book_json(title: &str, author: &str, total_copies: u32) -> serde_json::Value {
    json!({
        "isbn": "978-0441013593",
        "title": title,
        "author": author,
        "publisher": "Ace",
        "year": 1965,
        "genre": "Science Fiction",
        "total_copies": total_copies,
    })
}

// ============================================================================
// E2Eテスト: 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_e2e_full_lending_flow() {
    let dir = TempDir::new().unwrap();
    let app = setup_e2e_app(dir.path()).await;

    // Step 1: 書籍登録（POST /books）
    let (status, body) = send(&app, "POST", "/books", Some(book_json("Dune", "Frank Herbert", 2))).await;
    assert_eq!(status, StatusCode::CREATED);
    let book: BookResponse = parse(&body);
    assert_eq!(book.id, 1);
    assert_eq!(book.available_copies, 2);
    assert!(book.is_available);

    // Step 2: 貸出（POST /books/:id/borrow）
    let borrow = json!({
        "borrower_name": "Jane Reader",
        "borrower_email": "jane@example.com",
    });
    let (status, body) = send(&app, "POST", "/books/1/borrow", Some(borrow)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(parse::<OutcomeResponse>(&body).success);

    let (_, body) = send(&app, "GET", "/books/1", None).await;
    assert_eq!(parse::<BookResponse>(&body).available_copies, 1);

    // Step 3: 貸出一覧（GET /loans/active, GET /loans?borrower_email=）
    let (status, body) = send(&app, "GET", "/loans/active", None).await;
    assert_eq!(status, StatusCode::OK);
    let loans: Vec<LoanResponse> = parse(&body);
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].status, "active");
    assert_eq!(
        (loans[0].due_date - loans[0].borrowed_at).num_days(),
        14
    );

    let (_, body) = send(
        &app,
        "GET",
        "/loans?borrower_email=JANE@example.com&status=active",
        None,
    )
    .await;
    assert_eq!(parse::<Vec<LoanResponse>>(&body).len(), 1);

    // Step 4: 返却（POST /books/:id/return）
    let (status, body) = send(
        &app,
        "POST",
        "/books/1/return",
        Some(json!({ "borrower_email": "jane@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(parse::<OutcomeResponse>(&body).success);

    let (_, body) = send(&app, "GET", "/books/1/loans", None).await;
    let history: Vec<LoanResponse> = parse(&body);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, "returned");
    assert!(history[0].returned_at.is_some());

    // Step 5: 削除（DELETE /books/:id）
    let (status, _) = send(&app, "DELETE", "/books/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/books/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse::<ErrorResponse>(&body).error, "NOT_FOUND");
}

#[tokio::test]
async fn test_e2e_overdue_notification_flow() {
    let dir = TempDir::new().unwrap();
    let app = setup_e2e_app(dir.path()).await;

    send(&app, "POST", "/books", Some(book_json("Dune", "Frank Herbert", 1))).await;

    // 期限0日の貸出は直後から延滞になる
    let borrow = json!({
        "borrower_name": "Jane Reader",
        "borrower_email": "jane@example.com",
        "loan_days": 0,
    });
    send(&app, "POST", "/books/1/borrow", Some(borrow)).await;

    let (status, body) = send(&app, "GET", "/notifications/overdue", None).await;
    assert_eq!(status, StatusCode::OK);
    let overdue: Vec<OverdueLoanResponse> = parse(&body);
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].book.title, "Dune");
    assert_eq!(overdue[0].days_overdue, 0);
    assert_eq!(overdue[0].loan.status, "overdue");

    let (status, body) = send(&app, "POST", "/loans/1/notifications", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let sent: NotificationResponse = parse(&body);
    assert_eq!(sent.loan_id, 1);
    assert_eq!(sent.notification_type, "Overdue");
    assert!(sent.is_successful);
    assert!(sent.content.contains("\"Dune\" by Frank Herbert is now 0 days overdue"));

    let (status, body) = send(&app, "POST", "/notifications/overdue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<Vec<NotificationResponse>>(&body).len(), 1);

    let (_, body) = send(&app, "GET", "/loans/1/notifications", None).await;
    assert_eq!(parse::<Vec<NotificationResponse>>(&body).len(), 2);
}

#[tokio::test]
async fn test_e2e_state_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let app = setup_e2e_app(dir.path()).await;
        send(&app, "POST", "/books", Some(book_json("Dune", "Frank Herbert", 1))).await;
        send(&app, "POST", "/books", Some(book_json("Emma", "Jane Austen", 1))).await;
        send(&app, "DELETE", "/books/2", None).await;
        send(
            &app,
            "POST",
            "/books/1/borrow",
            Some(json!({ "borrower_name": "A", "borrower_email": "a@example.com" })),
        )
        .await;
    }

    let app = setup_e2e_app(dir.path()).await;

    let (_, body) = send(&app, "GET", "/books", None).await;
    let books: Vec<BookResponse> = parse(&body);
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].available_copies, 0);

    // 削除済みのIDは再利用されない
    let (_, body) = send(&app, "POST", "/books", Some(book_json("Persuasion", "Jane Austen", 1))).await;
    assert_eq!(parse::<BookResponse>(&body).id, 3);

    let (_, body) = send(&app, "GET", "/loans/active", None).await;
    assert_eq!(parse::<Vec<LoanResponse>>(&body).len(), 1);
}

// ============================================================================
// E2Eテスト: 検索
// ============================================================================

#[tokio::test]
async fn test_e2e_search_books() {
    let dir = TempDir::new().unwrap();
    let app = setup_e2e_app(dir.path()).await;

    send(&app, "POST", "/books", Some(book_json("Dune", "Frank Herbert", 1))).await;
    send(&app, "POST", "/books", Some(book_json("Emma", "Jane Austen", 1))).await;

    let (_, body) = send(&app, "GET", "/books?term=austen&field=author", None).await;
    let found: Vec<BookResponse> = parse(&body);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Emma");

    let (_, body) = send(&app, "GET", "/books?term=austen&field=title", None).await;
    assert!(parse::<Vec<BookResponse>>(&body).is_empty());

    let (_, body) = send(&app, "GET", "/books?term=", None).await;
    assert_eq!(parse::<Vec<BookResponse>>(&body).len(), 2);
}

// ============================================================================
// E2Eテスト: 異常系
// ============================================================================

#[tokio::test]
async fn test_e2e_borrow_without_copies_reports_failure() {
    let dir = TempDir::new().unwrap();
    let app = setup_e2e_app(dir.path()).await;

    send(&app, "POST", "/books", Some(book_json("Dune", "Frank Herbert", 1))).await;
    let borrow = json!({ "borrower_name": "A", "borrower_email": "a@example.com" });
    send(&app, "POST", "/books/1/borrow", Some(borrow.clone())).await;

    let (status, body) = send(&app, "POST", "/books/1/borrow", Some(borrow)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!parse::<OutcomeResponse>(&body).success);

    let (status, body) = send(
        &app,
        "POST",
        "/books/1/return",
        Some(json!({ "borrower_email": "nobody@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!parse::<OutcomeResponse>(&body).success);
}

#[tokio::test]
async fn test_e2e_borrow_with_out_of_range_loan_days_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = setup_e2e_app(dir.path()).await;

    send(&app, "POST", "/books", Some(book_json("Dune", "Frank Herbert", 1))).await;

    let borrow = json!({
        "borrower_name": "A",
        "borrower_email": "a@example.com",
        "loan_days": u32::MAX,
    });
    let (status, body) = send(&app, "POST", "/books/1/borrow", Some(borrow)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse::<ErrorResponse>(&body).error, "INVALID_LOAN_PERIOD");

    let (_, body) = send(&app, "GET", "/books/1", None).await;
    assert_eq!(parse::<BookResponse>(&body).available_copies, 1);

    let (_, body) = send(&app, "GET", "/loans/active", None).await;
    assert!(parse::<Vec<LoanResponse>>(&body).is_empty());
}

#[tokio::test]
async fn test_e2e_unknown_book_is_not_found() {
    let dir = TempDir::new().unwrap();
    let app = setup_e2e_app(dir.path()).await;

    let borrow = json!({ "borrower_name": "A", "borrower_email": "a@example.com" });
    let (status, body) = send(&app, "POST", "/books/42/borrow", Some(borrow)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse::<ErrorResponse>(&body).error, "BOOK_NOT_FOUND");

    let (status, _) = send(&app, "DELETE", "/books/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_delete_book_with_active_loan_conflicts() {
    let dir = TempDir::new().unwrap();
    let app = setup_e2e_app(dir.path()).await;

    send(&app, "POST", "/books", Some(book_json("Dune", "Frank Herbert", 1))).await;
    send(
        &app,
        "POST",
        "/books/1/borrow",
        Some(json!({ "borrower_name": "A", "borrower_email": "a@example.com" })),
    )
    .await;

    let (status, body) = send(&app, "DELETE", "/books/1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse::<ErrorResponse>(&body).error, "BOOK_HAS_ACTIVE_LOANS");

    let (status, _) = send(&app, "GET", "/books/1", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_e2e_notify_loan_not_overdue_conflicts() {
    let dir = TempDir::new().unwrap();
    let app = setup_e2e_app(dir.path()).await;

    send(&app, "POST", "/books", Some(book_json("Dune", "Frank Herbert", 1))).await;
    send(
        &app,
        "POST",
        "/books/1/borrow",
        Some(json!({ "borrower_name": "A", "borrower_email": "a@example.com" })),
    )
    .await;

    let (status, body) = send(&app, "POST", "/loans/1/notifications", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse::<ErrorResponse>(&body).error, "LOAN_NOT_OVERDUE");

    let (status, _) = send(&app, "POST", "/loans/99/notifications", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_list_loans_requires_borrower_email() {
    let dir = TempDir::new().unwrap();
    let app = setup_e2e_app(dir.path()).await;

    let (status, body) = send(&app, "GET", "/loans", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse::<ErrorResponse>(&body).error, "BAD_REQUEST");

    let (status, _) = send(&app, "GET", "/loans?borrower_email=a@example.com&status=lost", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
