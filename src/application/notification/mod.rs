mod errors;
mod notification_service;

pub use errors::{NotificationApplicationError, Result};
pub use notification_service::{
    OverdueLoanDetails, get_notifications_by_loan, get_overdue_loans_with_details,
    notify_overdue_loan, send_overdue_notification, send_overdue_notifications,
};
