mod errors;
mod library_service;
mod reconciliation;

pub use errors::{LibraryApplicationError, Result};
pub use library_service::{
    ServiceDependencies, add_book, borrow_book, delete_book, get_active_loans, get_book,
    get_loans_by_book, get_loans_by_borrower, get_overdue_loans, list_books, return_book,
    search_books, update_book,
};
pub use reconciliation::{InventoryCorrection, reconcile_inventory};
