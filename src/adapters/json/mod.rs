pub mod book_repository;
mod collection;
pub mod error;
pub mod loan_repository;
pub mod notification_repository;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as JsonBookRepository;
pub use error::JsonStoreError;
pub use loan_repository::LoanRepository as JsonLoanRepository;
pub use notification_repository::NotificationRepository as JsonNotificationRepository;
