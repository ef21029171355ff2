use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LoanId, NotificationId, book::Book, loan::BookLoan};

/// 通知の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    Overdue,
}

/// BookNotification集約 - 送信済み通知の記録（作成後は不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookNotification {
    pub id: NotificationId,
    pub loan_id: LoanId,
    pub sent_at: DateTime<Utc>,
    pub notification_type: NotificationType,
    pub content: String,
    pub is_successful: bool,
}

/// 延滞通知メール
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueNotice {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// 純粋関数：延滞通知の本文を組み立てる
pub fn compose_overdue_notice(loan: &BookLoan, book: &Book, now: DateTime<Utc>) -> OverdueNotice {
    let days_overdue = (now - loan.due_date).num_days();

    let body = format!(
        "Dear {name},\n\
         \n\
         This is a friendly reminder that the book \"{title}\" by {author} is now {days} days overdue.\n\
         \n\
         The book was due on {due}.\n\
         \n\
         Please return the book to the library at your earliest convenience.\n\
         \n\
         Thank you,\n\
         Library Management System",
        name = loan.borrower_name,
        title = book.title,
        author = book.author,
        days = days_overdue,
        due = loan.due_date.format("%Y-%m-%d"),
    );

    OverdueNotice {
        to: loan.borrower_email.clone(),
        subject: format!("Overdue Book: {}", book.title),
        body,
    }
}

/// 純粋関数：送信した延滞通知を記録する
///
/// 実際の配送手段はないため、内容を生成した時点で成功とみなす。
pub fn record_notice(
    id: NotificationId,
    loan_id: LoanId,
    notice: &OverdueNotice,
    sent_at: DateTime<Utc>,
) -> BookNotification {
    BookNotification {
        id,
        loan_id,
        sent_at,
        notification_type: NotificationType::Overdue,
        content: notice.body.clone(),
        is_successful: true,
    }
}
