use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, add_book, borrow_book, delete_book, get_book, list_active_loans, list_book_loans,
    list_books, list_loan_notifications, list_loans, list_overdue_details, list_overdue_loans,
    return_book, send_loan_notification, send_overdue_notifications, update_book,
};

/// Creates the API router with all library endpoints
///
/// Books:
/// - GET /books, POST /books
/// - GET/PUT/DELETE /books/:id
///
/// Lending:
/// - POST /books/:id/borrow, POST /books/:id/return
/// - GET /books/:id/loans, GET /loans, GET /loans/active, GET /loans/overdue
///
/// Notifications:
/// - GET/POST /notifications/overdue
/// - GET/POST /loans/:id/notifications
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Books
        .route("/books", get(list_books).post(add_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        // Lending
        .route("/books/:id/borrow", post(borrow_book))
        .route("/books/:id/return", post(return_book))
        .route("/books/:id/loans", get(list_book_loans))
        .route("/loans", get(list_loans))
        .route("/loans/active", get(list_active_loans))
        .route("/loans/overdue", get(list_overdue_loans))
        // Notifications
        .route(
            "/loans/:id/notifications",
            get(list_loan_notifications).post(send_loan_notification),
        )
        .route(
            "/notifications/overdue",
            get(list_overdue_details).post(send_overdue_notifications),
        )
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
