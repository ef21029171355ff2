pub mod book_repository;
pub mod loan_repository;
pub mod notification_repository;

pub use book_repository::{BookPredicate, BookRepository};
pub use loan_repository::LoanRepository;
pub use notification_repository::NotificationRepository;
