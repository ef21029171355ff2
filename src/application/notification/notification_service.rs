use crate::application::library::ServiceDependencies;
use crate::domain::{
    self, LoanId,
    book::Book,
    loan::BookLoan,
    notification::BookNotification,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{NotificationApplicationError, Result};

/// 延滞貸出と書籍の結合結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueLoanDetails {
    pub loan: BookLoan,
    pub book: Book,
    pub days_overdue: i64,
}

/// 延滞中の貸出を書籍情報付きで取得する
///
/// - 延滞日数（切り捨て）の降順
/// - 同じ日数なら貸出ストア上の並び順（安定ソート）
/// - 書籍が削除されている貸出はスキップし、警告ログを出す
pub async fn get_overdue_loans_with_details(
    deps: &ServiceDependencies,
    now: DateTime<Utc>,
) -> Result<Vec<OverdueLoanDetails>> {
    let overdue_loans = deps
        .loan_repository
        .find_overdue(now)
        .await
        .map_err(NotificationApplicationError::LoanStoreError)?;

    let mut details = Vec::with_capacity(overdue_loans.len());

    for loan in overdue_loans {
        let book = deps
            .book_repository
            .find_by_id(loan.book_id)
            .await
            .map_err(NotificationApplicationError::BookStoreError)?;

        let Some(book) = book else {
            tracing::warn!(
                loan_id = %loan.id,
                book_id = %loan.book_id,
                "Overdue loan references a missing book; skipping"
            );
            continue;
        };

        let days_overdue = domain::loan::days_overdue(&loan, now);
        details.push(OverdueLoanDetails {
            loan,
            book,
            days_overdue,
        });
    }

    details.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue));
    Ok(details)
}

/// 延滞通知を送信し、記録する
///
/// 実際の配送手段はない。本文を生成してログに出力し、
/// 成功として通知ストアに記録・コミットする。
pub async fn send_overdue_notification(
    deps: &ServiceDependencies,
    loan: &BookLoan,
    book: &Book,
    now: DateTime<Utc>,
) -> Result<BookNotification> {
    let notice = domain::notification::compose_overdue_notice(loan, book, now);

    tracing::info!(
        loan_id = %loan.id,
        to = %notice.to,
        subject = %notice.subject,
        "Sending overdue notification"
    );
    tracing::debug!(body = %notice.body, "Overdue notification content");

    let notification_id = deps
        .notification_repository
        .allocate_id()
        .await
        .map_err(NotificationApplicationError::NotificationStoreError)?;

    let notification = domain::notification::record_notice(notification_id, loan.id, &notice, now);

    deps.notification_repository
        .add(notification.clone())
        .await
        .map_err(NotificationApplicationError::NotificationStoreError)?;
    deps.notification_repository
        .commit()
        .await
        .map_err(NotificationApplicationError::NotificationStoreError)?;

    Ok(notification)
}

/// 延滞中のすべての貸出に通知を送る
///
/// `get_overdue_loans_with_details()` の並び順で送信する。
///
/// # 戻り値
/// 記録された通知の一覧
pub async fn send_overdue_notifications(
    deps: &ServiceDependencies,
    now: DateTime<Utc>,
) -> Result<Vec<BookNotification>> {
    let overdue = get_overdue_loans_with_details(deps, now).await?;

    let mut sent = Vec::with_capacity(overdue.len());
    for details in &overdue {
        let notification = send_overdue_notification(deps, &details.loan, &details.book, now).await?;
        sent.push(notification);
    }

    tracing::info!(sent = sent.len(), "Overdue notifications sent");
    Ok(sent)
}

/// 貸出IDを指定して延滞通知を送る
///
/// # エラー
/// - LoanNotFound: 貸出が存在しない
/// - LoanNotOverdue: 返却済み、または返却期限前
/// - BookNotFound: 参照先の書籍が削除されている
pub async fn notify_overdue_loan(
    deps: &ServiceDependencies,
    loan_id: LoanId,
    now: DateTime<Utc>,
) -> Result<BookNotification> {
    let loan = deps
        .loan_repository
        .find_by_id(loan_id)
        .await
        .map_err(NotificationApplicationError::LoanStoreError)?
        .ok_or(NotificationApplicationError::LoanNotFound(loan_id))?;

    if !loan.is_overdue(now) {
        return Err(NotificationApplicationError::LoanNotOverdue(loan_id));
    }

    let book = deps
        .book_repository
        .find_by_id(loan.book_id)
        .await
        .map_err(NotificationApplicationError::BookStoreError)?
        .ok_or(NotificationApplicationError::BookNotFound(loan.book_id))?;

    send_overdue_notification(deps, &loan, &book, now).await
}

/// 貸出に対して記録された通知
pub async fn get_notifications_by_loan(
    deps: &ServiceDependencies,
    loan_id: LoanId,
) -> Result<Vec<BookNotification>> {
    deps.notification_repository
        .find_by_loan(loan_id)
        .await
        .map_err(NotificationApplicationError::NotificationStoreError)
}
