use crate::domain::{LoanId, NotificationId, notification::BookNotification};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 通知ストアポート
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<BookNotification>>;

    async fn find_by_id(&self, id: NotificationId) -> Result<Option<BookNotification>>;

    async fn find_by_loan(&self, loan_id: LoanId) -> Result<Vec<BookNotification>>;

    async fn allocate_id(&self) -> Result<NotificationId>;

    async fn add(&self, notification: BookNotification) -> Result<()>;

    async fn update(&self, notification: BookNotification) -> Result<bool>;

    async fn delete(&self, id: NotificationId) -> Result<bool>;

    async fn exists(&self, id: NotificationId) -> Result<bool>;

    async fn commit(&self) -> Result<()>;
}
